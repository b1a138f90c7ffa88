//! Single-page landscape PDF embedding one raster image.

use image::RgbImage;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

/// A4 landscape, in millimetres.
pub const PAGE_WIDTH_MM: f32 = 297.0;
pub const PAGE_HEIGHT_MM: f32 = 210.0;

const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Placement of the image on the page, in millimetres from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub image_width: f32,
    pub image_height: f32,
}

impl PageLayout {
    /// Fit an image of `pixel_width × pixel_height` to the page width.
    ///
    /// The height follows the aspect ratio; when it does not fit the
    /// standard page, the page grows to hold it.
    pub fn fit(pixel_width: u32, pixel_height: u32, margin: f32) -> Self {
        let image_width = PAGE_WIDTH_MM - 2.0 * margin;
        let image_height = if pixel_width == 0 {
            0.0
        } else {
            image_width * pixel_height as f32 / pixel_width as f32
        };

        Self {
            page_width: PAGE_WIDTH_MM,
            page_height: PAGE_HEIGHT_MM.max(image_height + 2.0 * margin),
            margin,
            image_width,
            image_height,
        }
    }
}

fn pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Build the PDF bytes for `image` placed according to `layout`.
pub fn render_pdf(image: &RgbImage, layout: &PageLayout) -> Result<Vec<u8>, lopdf::Error> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.width()),
            "Height" => i64::from(image.height()),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        image.as_raw().clone(),
    );
    let image_id = doc.add_object(image_stream);

    // PDF user space starts at the bottom-left corner.
    let x = pt(layout.margin);
    let y = pt(layout.page_height - layout.margin - layout.image_height);
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    pt(layout.image_width).into(),
                    0.into(),
                    0.into(),
                    pt(layout.image_height).into(),
                    x.into(),
                    y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im1".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! {
            "Im1" => image_id,
        },
    });

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            pt(layout.page_width).into(),
            pt(layout.page_height).into(),
        ],
    });

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_fits_page_width() {
        let layout = PageLayout::fit(2770, 1000, 10.0);
        assert_eq!(layout.image_width, 277.0);
        assert_eq!(layout.image_height, 100.0);
        assert_eq!(layout.page_height, PAGE_HEIGHT_MM);
    }

    #[test]
    fn test_layout_extends_tall_images() {
        let layout = PageLayout::fit(1000, 1000, 10.0);
        assert_eq!(layout.image_height, 277.0);
        assert_eq!(layout.page_height, 297.0);
        assert_eq!(layout.page_width, PAGE_WIDTH_MM);
    }

    #[test]
    fn test_layout_zero_width_image() {
        let layout = PageLayout::fit(0, 10, 10.0);
        assert_eq!(layout.image_height, 0.0);
        assert_eq!(layout.page_height, PAGE_HEIGHT_MM);
    }

    #[test]
    fn test_render_pdf_produces_document() {
        let image = RgbImage::from_pixel(40, 20, image::Rgb([255, 255, 255]));
        let layout = PageLayout::fit(40, 20, 10.0);

        let bytes = render_pdf(&image, &layout).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}
