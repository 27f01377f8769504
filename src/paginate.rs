//! Page paginator — packs an ordered list of raster images top-to-bottom
//! onto fixed-size white pages, overflowing to a new page when the next
//! image would not fit, and never reordering or splitting an image.

use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::Error;

// ═══════════════════════════════════════════════════════════════════════
// Geometry
// ═══════════════════════════════════════════════════════════════════════

/// Fixed page dimensions and packing parameters, all in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_width: u32,
    pub page_height: u32,
    /// Padding from every page edge.
    pub margin: u32,
    /// Extra vertical space between consecutive images.
    pub spacing: u32,
    /// Additional offset below the top margin where packing starts.
    #[serde(default)]
    pub top_offset: u32,
}

impl PageGeometry {
    /// 8 in × 11 in portrait page at the given resolution.
    pub fn letter(dpi: u32, margin: u32, spacing: u32) -> Self {
        Self {
            page_width: 8 * dpi,
            page_height: 11 * dpi,
            margin,
            spacing,
            top_offset: 0,
        }
    }

    /// Horizontal space available to an image.
    pub fn usable_width(&self) -> u32 {
        self.page_width.saturating_sub(2 * self.margin)
    }

    /// Y coordinate where packing starts on a fresh page.
    fn start_y(&self) -> u32 {
        self.margin + self.top_offset
    }

    /// Lowest Y coordinate an image may extend to.
    fn bottom_limit(&self) -> u32 {
        self.page_height.saturating_sub(self.margin)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Pages
// ═══════════════════════════════════════════════════════════════════════

/// A finished page. Sealed when appended to a [`PageSet`]; immutable
/// afterwards.
#[derive(Debug, Clone)]
pub struct Page {
    canvas: RgbImage,
}

impl Page {
    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    /// Raw RGB pixel view, row-major.
    pub fn image(&self) -> &RgbImage {
        &self.canvas
    }
}

/// The ordered pages of one output document.
#[derive(Debug, Clone, Default)]
pub struct PageSet {
    pub pages: Vec<Page>,
}

impl PageSet {
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Page> {
        self.pages.iter()
    }
}

/// A page still receiving images: white canvas plus the next paste
/// Y-offset.
struct OpenPage {
    canvas: RgbImage,
    cursor: u32,
}

impl OpenPage {
    fn new(geom: &PageGeometry) -> Self {
        Self {
            canvas: RgbImage::from_pixel(
                geom.page_width,
                geom.page_height,
                Rgb([255, 255, 255]),
            ),
            cursor: geom.start_y(),
        }
    }

    fn fits(&self, height: u32, geom: &PageGeometry) -> bool {
        self.cursor + height <= geom.bottom_limit()
    }

    fn place(&mut self, img: &RgbImage, geom: &PageGeometry) {
        imageops::replace(&mut self.canvas, img, geom.margin as i64, self.cursor as i64);
        self.cursor += img.height() + geom.spacing;
    }

    fn has_content(&self, geom: &PageGeometry) -> bool {
        self.cursor > geom.start_y()
    }

    fn seal(self) -> Page {
        Page {
            canvas: self.canvas,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Pagination
// ═══════════════════════════════════════════════════════════════════════

/// Pack images onto pages in input order, single pass, no backtracking.
///
/// An image wider than the usable width is downscaled (Lanczos, aspect
/// preserved) to exactly that width; height is never constrained, so an
/// image taller than a page is still placed and simply overflows
/// visually. Overflow always seals the current page, even when it is
/// still empty; the trailing page is emitted only if it received at
/// least one image.
pub fn paginate(images: &[RgbImage], geom: &PageGeometry) -> PageSet {
    let usable = geom.usable_width();
    let mut pages = Vec::new();
    let mut current = OpenPage::new(geom);

    for img in images {
        let fitted;
        let img = if img.width() > usable && usable > 0 {
            let ratio = usable as f64 / img.width() as f64;
            let height = ((img.height() as f64 * ratio) as u32).max(1);
            fitted = imageops::resize(img, usable, height, FilterType::Lanczos3);
            &fitted
        } else {
            img
        };

        if !current.fits(img.height(), geom) {
            pages.push(current.seal());
            current = OpenPage::new(geom);
        }
        current.place(img, geom);
    }

    if current.has_content(geom) {
        pages.push(current.seal());
    }

    PageSet { pages }
}

// ═══════════════════════════════════════════════════════════════════════
// Vertical stacking
// ═══════════════════════════════════════════════════════════════════════

/// Stack images onto one white canvas top-to-bottom with `padding`
/// pixels between them. The canvas takes the widest image's width and
/// narrower images are centered horizontally. Returns None for empty
/// input.
pub fn stack_images(images: &[RgbImage], padding: u32) -> Option<RgbImage> {
    let max_width = images.iter().map(RgbImage::width).max()?;
    let total_height: u32 = images.iter().map(RgbImage::height).sum::<u32>()
        + padding * (images.len() as u32 - 1);

    let mut canvas = RgbImage::from_pixel(max_width, total_height, Rgb([255, 255, 255]));
    let mut cursor = 0u32;
    for img in images {
        let x = (max_width - img.width()) / 2;
        imageops::replace(&mut canvas, img, x as i64, cursor as i64);
        cursor += img.height() + padding;
    }
    Some(canvas)
}

// ═══════════════════════════════════════════════════════════════════════
// Auto-cropping
// ═══════════════════════════════════════════════════════════════════════

/// Crop an image to the bounding box of its content, treating every
/// pixel within `tolerance` per channel of the top-left pixel as
/// background. An image with no content (or no pixels) is returned
/// unchanged.
pub fn auto_crop(img: &RgbImage, tolerance: u8) -> RgbImage {
    if img.width() == 0 || img.height() == 0 {
        return img.clone();
    }
    let background = *img.get_pixel(0, 0);

    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in img.enumerate_pixels() {
        if differs(*pixel, background, tolerance) {
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
    }

    match bounds {
        Some((x0, y0, x1, y1)) => {
            imageops::crop_imm(img, x0, y0, x1 - x0 + 1, y1 - y0 + 1).to_image()
        }
        None => img.clone(),
    }
}

fn differs(a: Rgb<u8>, b: Rgb<u8>, tolerance: u8) -> bool {
    a.0.iter()
        .zip(b.0.iter())
        .any(|(&p, &q)| p.abs_diff(q) > tolerance)
}

// ═══════════════════════════════════════════════════════════════════════
// Image loading
// ═══════════════════════════════════════════════════════════════════════

/// Decode one image and normalize it to opaque RGB. Anything carrying an
/// alpha channel is composited onto a white background first, since the
/// output document format has no transparency.
pub fn load_image(path: &Path) -> Result<RgbImage, Error> {
    let img = image::open(path).map_err(|source| Error::ImageDecode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(flatten_to_rgb(img))
}

/// Decode a list of image files in order. A file that cannot be decoded
/// is logged and skipped; one bad input never aborts the batch.
pub fn load_images(paths: &[PathBuf]) -> Vec<RgbImage> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        match load_image(path) {
            Ok(img) => images.push(img),
            Err(e) => log::warn!("skipping image: {e}"),
        }
    }
    images
}

fn flatten_to_rgb(img: DynamicImage) -> RgbImage {
    if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        let mut background = RgbaImage::from_pixel(
            rgba.width(),
            rgba.height(),
            Rgba([255, 255, 255, 255]),
        );
        imageops::overlay(&mut background, &rgba, 0, 0);
        DynamicImage::ImageRgba8(background).to_rgb8()
    } else {
        img.to_rgb8()
    }
}
