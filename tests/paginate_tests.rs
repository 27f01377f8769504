//! Integration tests for the page paginator: overflow behavior, order
//! preservation, width fitting and lossy-input handling.

use std::path::PathBuf;

use image::{Rgb, RgbImage};
use pretty_assertions::assert_eq;

use scalebook::{auto_crop, load_images, paginate, stack_images, PageGeometry};

fn output_dir() -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_output");
    std::fs::create_dir_all(&dir).ok();
    dir
}

/// A geometry with no margins so usable height equals page height.
fn bare_geometry(width: u32, height: u32) -> PageGeometry {
    PageGeometry {
        page_width: width,
        page_height: height,
        margin: 0,
        spacing: 0,
        top_offset: 0,
    }
}

fn solid(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(color))
}

// ═══════════════════════════════════════════════════════════════════════
// Overflow
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn three_500s_on_a_1200_page_split_two_and_one() {
    let geom = bare_geometry(400, 1200);
    let images = vec![
        solid(100, 500, [255, 0, 0]),
        solid(100, 500, [0, 255, 0]),
        solid(100, 500, [0, 0, 255]),
    ];
    let pages = paginate(&images, &geom);
    assert_eq!(pages.len(), 2);
}

#[test]
fn exact_fit_does_not_open_a_blank_trailing_page() {
    let geom = bare_geometry(400, 1200);
    let images = vec![solid(100, 1200, [0, 0, 0])];
    let pages = paginate(&images, &geom);
    assert_eq!(pages.len(), 1);
}

#[test]
fn taller_than_a_page_is_still_placed() {
    // Height is never a rejection criterion; the image just overflows.
    // Overflow seals the current page unconditionally, so the fresh
    // first page is emitted empty and the image lands on the second.
    let geom = bare_geometry(400, 1200);
    let images = vec![solid(100, 2000, [0, 0, 0])];
    let pages = paginate(&images, &geom);
    assert_eq!(pages.len(), 2);
    assert_eq!(pages.pages[0].image().get_pixel(0, 0).0, [255, 255, 255]);
    assert_eq!(pages.pages[1].image().get_pixel(0, 0).0, [0, 0, 0]);
}

#[test]
fn empty_input_yields_no_pages() {
    let geom = bare_geometry(400, 1200);
    let pages = paginate(&[], &geom);
    assert!(pages.is_empty());
}

#[test]
fn margin_and_top_offset_shrink_the_usable_height() {
    // Usable height 1200 - 100 (margin) - 50 (top offset) - 100 = 950,
    // so two 500-tall images no longer share a page.
    let geom = PageGeometry {
        page_width: 600,
        page_height: 1200,
        margin: 100,
        spacing: 0,
        top_offset: 50,
    };
    let images = vec![solid(100, 500, [0, 0, 0]), solid(100, 500, [0, 0, 0])];
    let pages = paginate(&images, &geom);
    assert_eq!(pages.len(), 2);
}

#[test]
fn spacing_counts_toward_the_cursor() {
    // 500 + 300 spacing + 500 = 1300 > 1200: the second image overflows.
    let geom = PageGeometry {
        page_width: 400,
        page_height: 1200,
        margin: 0,
        spacing: 300,
        top_offset: 0,
    };
    let images = vec![solid(100, 500, [0, 0, 0]), solid(100, 500, [0, 0, 0])];
    let pages = paginate(&images, &geom);
    assert_eq!(pages.len(), 2);
}

// ═══════════════════════════════════════════════════════════════════════
// Order preservation and placement
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn placement_preserves_input_order_across_pages() {
    let geom = bare_geometry(400, 1200);
    let red = [255, 0, 0];
    let green = [0, 255, 0];
    let blue = [0, 0, 255];
    let images = vec![
        solid(100, 500, red),
        solid(100, 500, green),
        solid(100, 500, blue),
    ];
    let pages = paginate(&images, &geom);

    // Page 1: red at the top, green 500px below; page 2: blue at the top.
    assert_eq!(pages.pages[0].image().get_pixel(0, 0).0, red);
    assert_eq!(pages.pages[0].image().get_pixel(0, 500).0, green);
    assert_eq!(pages.pages[1].image().get_pixel(0, 0).0, blue);
}

#[test]
fn images_are_pasted_at_the_left_margin() {
    let geom = PageGeometry {
        page_width: 400,
        page_height: 1200,
        margin: 40,
        spacing: 0,
        top_offset: 0,
    };
    let black = [0, 0, 0];
    let pages = paginate(&[solid(100, 100, black)], &geom);
    let canvas = pages.pages[0].image();
    assert_eq!(canvas.get_pixel(40, 40).0, black);
    // Left of the margin stays white.
    assert_eq!(canvas.get_pixel(39, 40).0, [255, 255, 255]);
}

#[test]
fn oversized_width_is_scaled_to_the_usable_width() {
    let geom = PageGeometry {
        page_width: 400,
        page_height: 1200,
        margin: 50,
        spacing: 0,
        top_offset: 0,
    };
    // 600x200 image into a 300px usable width: lands as 300x100.
    let black = [0, 0, 0];
    let pages = paginate(&[solid(600, 200, black)], &geom);
    let canvas = pages.pages[0].image();
    assert_eq!(canvas.get_pixel(50, 50).0, black);
    assert_eq!(canvas.get_pixel(349, 50).0, black);
    assert_eq!(canvas.get_pixel(350, 50).0, [255, 255, 255]);
    assert_eq!(canvas.get_pixel(50, 149).0, black);
    assert_eq!(canvas.get_pixel(50, 150).0, [255, 255, 255]);
}

// ═══════════════════════════════════════════════════════════════════════
// Vertical stacking
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn stacking_centers_narrower_images_on_the_widest() {
    let red = [255, 0, 0];
    let blue = [0, 0, 255];
    let images = vec![solid(100, 40, red), solid(60, 40, blue)];
    let stacked = stack_images(&images, 10).unwrap();

    // 100 wide, 40 + 10 + 40 tall; the 60-wide image starts at x = 20.
    assert_eq!(stacked.width(), 100);
    assert_eq!(stacked.height(), 90);
    assert_eq!(stacked.get_pixel(0, 0).0, red);
    assert_eq!(stacked.get_pixel(0, 50).0, [255, 255, 255]);
    assert_eq!(stacked.get_pixel(19, 50).0, [255, 255, 255]);
    assert_eq!(stacked.get_pixel(20, 50).0, blue);
    assert_eq!(stacked.get_pixel(79, 50).0, blue);
    assert_eq!(stacked.get_pixel(80, 50).0, [255, 255, 255]);
}

#[test]
fn stacking_padding_separates_images_with_white() {
    let black = [0, 0, 0];
    let images = vec![solid(50, 30, black), solid(50, 30, black)];
    let stacked = stack_images(&images, 20).unwrap();
    assert_eq!(stacked.height(), 80);
    assert_eq!(stacked.get_pixel(0, 29).0, black);
    assert_eq!(stacked.get_pixel(0, 30).0, [255, 255, 255]);
    assert_eq!(stacked.get_pixel(0, 49).0, [255, 255, 255]);
    assert_eq!(stacked.get_pixel(0, 50).0, black);
}

#[test]
fn stacking_empty_input_yields_nothing() {
    assert!(stack_images(&[], 50).is_none());
}

// ═══════════════════════════════════════════════════════════════════════
// Auto-cropping
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn crop_shrinks_to_the_content_bounding_box() {
    let black = [0, 0, 0];
    let mut img = solid(100, 100, [255, 255, 255]);
    for y in 20..50 {
        for x in 10..30 {
            img.put_pixel(x, y, Rgb(black));
        }
    }
    let cropped = auto_crop(&img, 10);
    assert_eq!(cropped.width(), 20);
    assert_eq!(cropped.height(), 30);
    assert_eq!(cropped.get_pixel(0, 0).0, black);
}

#[test]
fn crop_treats_near_background_pixels_as_background() {
    // 250 is within tolerance 10 of the white corner pixel; only the
    // black pixel counts as content.
    let mut img = solid(50, 50, [255, 255, 255]);
    img.put_pixel(5, 5, Rgb([250, 250, 250]));
    img.put_pixel(40, 40, Rgb([0, 0, 0]));
    let cropped = auto_crop(&img, 10);
    assert_eq!((cropped.width(), cropped.height()), (1, 1));
}

#[test]
fn crop_leaves_a_contentless_image_unchanged() {
    let img = solid(30, 20, [255, 255, 255]);
    let cropped = auto_crop(&img, 10);
    assert_eq!((cropped.width(), cropped.height()), (30, 20));
}

// ═══════════════════════════════════════════════════════════════════════
// Loading and normalization
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn one_corrupt_file_does_not_block_the_rest() {
    let dir = output_dir().join("mixed_inputs");
    std::fs::create_dir_all(&dir).unwrap();

    let good_a = dir.join("a.png");
    let good_b = dir.join("b.png");
    let bad = dir.join("broken.png");
    solid(60, 40, [10, 20, 30]).save(&good_a).unwrap();
    solid(60, 40, [40, 50, 60]).save(&good_b).unwrap();
    std::fs::write(&bad, b"this is not a png").unwrap();

    let images = load_images(&[good_a, bad, good_b]);
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].get_pixel(0, 0).0, [10, 20, 30]);
    assert_eq!(images[1].get_pixel(0, 0).0, [40, 50, 60]);
}

#[test]
fn missing_files_are_skipped() {
    let dir = output_dir().join("missing_inputs");
    std::fs::create_dir_all(&dir).unwrap();

    let good = dir.join("present.png");
    solid(20, 20, [1, 2, 3]).save(&good).unwrap();

    let images = load_images(&[dir.join("absent.png"), good]);
    assert_eq!(images.len(), 1);
}

#[test]
fn transparent_images_are_flattened_onto_white() {
    use image::{Rgba, RgbaImage};

    let dir = output_dir().join("alpha_inputs");
    std::fs::create_dir_all(&dir).unwrap();

    // Fully transparent pixels must come out white, opaque ones intact.
    let mut rgba = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 0]));
    rgba.put_pixel(5, 5, Rgba([200, 100, 50, 255]));
    let path = dir.join("alpha.png");
    rgba.save(&path).unwrap();

    let images = load_images(&[path]);
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].get_pixel(0, 0).0, [255, 255, 255]);
    assert_eq!(images[0].get_pixel(5, 5).0, [200, 100, 50]);
}
