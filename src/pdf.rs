//! PDF output — writes a [`PageSet`] as a multi-page PDF where every
//! page is a single full-page DeviceRGB image XObject.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::error::Error;
use crate::paginate::PageSet;

const POINTS_PER_INCH: f32 = 72.0;

/// Write the pages to `path` as one PDF document. `dpi` maps pixel
/// dimensions to physical page size (a 2400px-wide page at 300 dpi
/// becomes 8 in = 576 pt).
pub fn write_pdf(pages: &PageSet, path: &Path, dpi: u32) -> Result<(), Error> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());

    for page in pages.iter() {
        let img = page.image();
        let (width, height) = img.dimensions();
        let width_pt = width as f32 * POINTS_PER_INCH / dpi as f32;
        let height_pt = height as f32 * POINTS_PER_INCH / dpi as f32;

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            img.as_raw().clone(),
        ));

        // Draw the unit square scaled to the full page.
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        width_pt.into(),
                        0.into(),
                        0.into(),
                        height_pt.into(),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec!["Im0".into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                width_pt.into(),
                height_pt.into(),
            ],
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.compress();
    doc.save(path)?;
    Ok(())
}
