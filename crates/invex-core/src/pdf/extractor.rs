//! PDF text and image extraction using lopdf and pdf-extract.

use image::{DynamicImage, ImageBuffer, Rgba};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace, warn};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Create an extractor and load `data` into it.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        Ok(extractor)
    }

    fn document(&self) -> Result<&Document> {
        self.document.as_ref().ok_or(PdfError::NotLoaded)
    }

    /// Page-by-page text through lopdf, used when pdf-extract gives up.
    fn extract_text_by_pages(&self) -> Result<String> {
        let mut text = String::new();
        for page in 1..=self.page_count() {
            text.push_str(&self.extract_page_text(page)?);
        }
        Ok(text)
    }

    fn try_extract_image_from_object(&self, doc: &Document, obj: &Object) -> Option<DynamicImage> {
        let Object::Stream(stream) = obj else {
            return None;
        };
        let dict = &stream.dict;

        if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
            return None;
        }

        let width = image_dimension(dict, b"Width")?;
        let height = image_dimension(dict, b"Height")?;

        trace!("Found image object: {}x{}", width, height);

        if let Ok(filter) = dict.get(b"Filter") {
            let filter_name = match filter {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                _ => None,
            };

            match filter_name {
                Some(b"DCTDecode") => {
                    // JPEG bytes are stored as-is
                    return image::load_from_memory_with_format(
                        &stream.content,
                        image::ImageFormat::Jpeg,
                    )
                    .ok();
                }
                Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                    trace!("Skipping image with unsupported filter");
                    return None;
                }
                _ => {}
            }
        }

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());

        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| match o {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
                _ => None,
            })
            .unwrap_or(b"DeviceRGB");

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8);

        if bits != 8 {
            trace!("Unsupported bits per component: {}", bits);
            return None;
        }

        decode_raw_image(&data, width, height, color_space)
    }

    /// Resources dictionary for a page, following `/Parent` inheritance.
    fn page_resources(&self, doc: &Document, node_id: ObjectId) -> Option<Dictionary> {
        let Object::Dictionary(dict) = doc.get_object(node_id).ok()? else {
            return None;
        };

        if let Ok(resources) = dict.get(b"Resources") {
            if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
                return Some(res_dict.clone());
            }
        }

        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => self.page_resources(doc, *parent_id),
            _ => None,
        }
    }
}

/// A positive `/Width` or `/Height` that fits in `u32`.
fn image_dimension(dict: &Dictionary, key: &[u8]) -> Option<u32> {
    let value = dict.get(key).ok()?.as_i64().ok()?;
    u32::try_from(value).ok().filter(|v| *v > 0)
}

fn decode_raw_image(
    data: &[u8],
    width: u32,
    height: u32,
    color_space: &[u8],
) -> Option<DynamicImage> {
    let pixels = (width as usize).checked_mul(height as usize)?;
    let rgb_len = pixels.checked_mul(3)?;

    let rgba: Vec<u8> = match color_space {
        b"DeviceRGB" | b"RGB" if data.len() >= rgb_len => data[..rgb_len]
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect(),
        b"DeviceGray" | b"G" if data.len() >= pixels => data[..pixels]
            .iter()
            .flat_map(|&gray| [gray, gray, gray, 255])
            .collect(),
        _ => {
            trace!(
                "Could not decode image: data_len={}, pixels={}, colorspace={:?}",
                data.len(),
                pixels,
                String::from_utf8_lossy(color_space)
            );
            return None;
        }
    };

    ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba).map(DynamicImage::ImageRgba8)
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // PDFs "encrypted" with an empty user password open normally in viewers
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract works on bytes, so keep a decrypted copy
            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        self.document()?;

        let data = &self.raw_data;
        // pdf-extract panics on some malformed font programs
        match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data)) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => {
                debug!("pdf-extract failed ({}), falling back to per-page extraction", e);
                self.extract_text_by_pages()
            }
            Err(_) => {
                warn!("pdf-extract panicked, falling back to per-page extraction");
                self.extract_text_by_pages()
            }
        }
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        let doc = self.document()?;
        if page == 0 || page > self.page_count() {
            return Err(PdfError::InvalidPage(page));
        }

        doc.extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let doc = self.document()?;

        let pages = doc.get_pages();
        let page_id = pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        let mut images = Vec::new();

        if let Some(resources) = self.page_resources(doc, *page_id) {
            if let Ok(xobjects) = resources.get(b"XObject") {
                if let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) {
                    for (_name, obj_ref) in xobj_dict.iter() {
                        if let Ok((_, obj)) = doc.dereference(obj_ref) {
                            if let Some(img) = self.try_extract_image_from_object(doc, obj) {
                                images.push(img);
                            }
                        }
                    }
                }
            }
        }

        debug!("Extracted {} images from page {}", images.len(), page);
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;
    use lopdf::{Stream, dictionary};

    /// One page whose resources carry a 2x2 grayscale image.
    fn pdf_with_image() -> Vec<u8> {
        pdf_with_raw_image(2, 2, "DeviceGray", vec![0, 255, 255, 0])
    }

    fn pdf_with_raw_image(width: i64, height: i64, color_space: &str, pixels: Vec<u8>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => color_space,
                "BitsPerComponent" => 8,
            },
            pixels,
        ));
        let content_id = doc.add_object(Stream::new(dictionary! {}, b"q 2 0 0 2 0 0 cm /Im1 Do Q".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im1" => image_id },
            },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 100.into(), 100.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();
        data
    }

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
        assert!(matches!(extractor.extract_text(), Err(PdfError::NotLoaded)));
    }

    #[test]
    fn test_load_empty_data_fails() {
        let err = PdfExtractor::from_bytes(&[]).err().unwrap();
        assert!(matches!(err, PdfError::Parse(_)));
    }

    #[test]
    fn test_load_garbage_fails() {
        let err = PdfExtractor::from_bytes(b"this is not a pdf").err().unwrap();
        assert!(matches!(err, PdfError::Parse(_)));
    }

    #[test]
    fn test_extract_page_image() {
        let extractor = PdfExtractor::from_bytes(&pdf_with_image()).unwrap();
        assert_eq!(extractor.page_count(), 1);

        let images = extractor.extract_images(1).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].dimensions(), (2, 2));
        assert_eq!(images[0].to_rgba8().get_pixel(1, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_invalid_page() {
        let extractor = PdfExtractor::from_bytes(&pdf_with_image()).unwrap();
        assert!(matches!(extractor.extract_images(2), Err(PdfError::InvalidPage(2))));
        assert!(matches!(extractor.extract_page_text(0), Err(PdfError::InvalidPage(0))));
    }

    #[test]
    fn test_decode_raw_rgb() {
        let image = decode_raw_image(&[10, 20, 30], 1, 1, b"DeviceRGB").unwrap();
        assert_eq!(image.to_rgba8().get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_raw_short_data() {
        assert!(decode_raw_image(&[10, 20], 1, 1, b"DeviceRGB").is_none());
        assert!(decode_raw_image(&[10], 1, 1, b"DeviceCMYK").is_none());
    }

    #[test]
    fn test_bad_image_dimensions_are_skipped() {
        for (width, height) in [(-1, -1), (0, 4), (4, 0), (i64::from(u32::MAX) + 1, 1)] {
            let data = pdf_with_raw_image(width, height, "DeviceRGB", vec![0; 12]);
            let extractor = PdfExtractor::from_bytes(&data).unwrap();
            assert!(extractor.extract_images(1).unwrap().is_empty(), "{}x{}", width, height);
        }
    }

    #[test]
    fn test_decode_raw_huge_dimensions() {
        assert!(decode_raw_image(&[0; 12], u32::MAX, u32::MAX, b"DeviceRGB").is_none());
    }
}
