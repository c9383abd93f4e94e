//! Image-backed PDF decode/encode via lopdf
//!
//! Scanned documents carry one raster image per page. Decode pulls each
//! page's largest image XObject out of the page resources; encode writes
//! masked pages back as JPEG XObjects, one page per input page, in the
//! original order. Vector-only pages have no raster content to mask and
//! fail that file's decode.

use std::path::Path;

use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use super::Page;
use crate::error::{Error, Result};

/// JPEG quality for re-encoded pages
const JPEG_QUALITY: u8 = 90;

type PageResult<T> = std::result::Result<T, String>;

/// Decode every page of a PDF into native-resolution pages, in order
pub fn decode(path: &Path) -> Result<Vec<Page>> {
    let doc = Document::load(path).map_err(|err| Error::decode(path, err))?;
    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(Error::decode(path, "document has no pages"));
    }

    let mut out = Vec::with_capacity(pages.len());
    for (&number, &page_id) in pages.iter() {
        let page = decode_page(&doc, page_id)
            .map_err(|msg| Error::decode(path, format!("page {number}: {msg}")))?;
        out.push(page);
    }
    Ok(out)
}

/// Encode masked pages into one PDF, one image XObject per page
pub fn encode(pages: &[Page], path: &Path) -> Result<()> {
    if pages.is_empty() {
        return Err(Error::encode(path, "no pages to encode"));
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for (index, page) in pages.iter().enumerate() {
        let page_id = encode_page(&mut doc, pages_id, page)
            .map_err(|msg| Error::encode(path, format!("page {}: {msg}", index + 1)))?;
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
    doc.save(path).map_err(|err| Error::encode(path, err))?;
    Ok(())
}

/// Follow a reference to its object, or return the object itself
fn resolve<'a>(doc: &'a Document, object: &'a Object) -> PageResult<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).map_err(|err| err.to_string()),
        _ => Ok(object),
    }
}

fn decode_page(doc: &Document, page_id: ObjectId) -> PageResult<Page> {
    let page = doc
        .get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(|err| err.to_string())?;

    let resources = page
        .get(b"Resources")
        .map_err(|_| "page has no resources".to_string())
        .and_then(|r| resolve(doc, r))?
        .as_dict()
        .map_err(|err| err.to_string())?;

    let xobjects = resources
        .get(b"XObject")
        .map_err(|_| "page has no XObject resources".to_string())
        .and_then(|x| resolve(doc, x))?
        .as_dict()
        .map_err(|err| err.to_string())?;

    // Largest image wins; scanned pages occasionally carry tiny stamps too
    let mut best: Option<(i64, &Stream)> = None;
    for (_name, object) in xobjects.iter() {
        let Ok(stream) = resolve(doc, object)?.as_stream() else {
            continue;
        };
        let Ok(subtype) = stream.dict.get(b"Subtype").and_then(Object::as_name) else {
            continue;
        };
        if subtype != b"Image" {
            continue;
        }
        let (width, height) = image_size(&stream.dict)?;
        let area = width * height;
        if best.is_none_or(|(largest, _)| area > largest) {
            best = Some((area, stream));
        }
    }

    match best {
        Some((_, stream)) => decode_image(stream),
        None => Err("page has no raster content".to_string()),
    }
}

fn image_size(dict: &Dictionary) -> PageResult<(i64, i64)> {
    let width = dict
        .get(b"Width")
        .and_then(Object::as_i64)
        .map_err(|_| "image is missing its width".to_string())?;
    let height = dict
        .get(b"Height")
        .and_then(Object::as_i64)
        .map_err(|_| "image is missing its height".to_string())?;
    if width <= 0 || height <= 0 {
        return Err(format!("bad image dimensions {width}x{height}"));
    }
    Ok((width, height))
}

fn first_filter(dict: &Dictionary) -> Option<&[u8]> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => Some(name.as_slice()),
        Ok(Object::Array(filters)) => filters.first().and_then(|f| f.as_name().ok()),
        _ => None,
    }
}

fn decode_image(stream: &Stream) -> PageResult<Page> {
    let (width, height) = image_size(&stream.dict)?;

    // JPEG-compressed pages: the stream content is the JPEG file itself
    if first_filter(&stream.dict) == Some(b"DCTDecode".as_slice()) {
        let img = image::load_from_memory(&stream.content).map_err(|err| err.to_string())?;
        return Ok(img.to_rgba8());
    }

    // Flate or raw samples, interpreted through the declared color space
    let data = stream
        .decompressed_content()
        .map_err(|err| err.to_string())?;

    let bits = stream
        .dict
        .get(b"BitsPerComponent")
        .and_then(Object::as_i64)
        .unwrap_or(8);
    if bits != 8 {
        return Err(format!("unsupported bit depth {bits}"));
    }

    let channels: usize = match stream.dict.get(b"ColorSpace").and_then(Object::as_name) {
        Ok(b"DeviceRGB") => 3,
        Ok(b"DeviceGray") => 1,
        Ok(other) => {
            return Err(format!(
                "unsupported color space {}",
                String::from_utf8_lossy(other)
            ));
        }
        Err(_) => return Err("image has no usable color space".to_string()),
    };

    let expected = width as usize * height as usize * channels;
    if data.len() < expected {
        return Err(format!(
            "image data truncated: {} bytes, expected {expected}",
            data.len()
        ));
    }

    let mut page = Page::new(width as u32, height as u32);
    for (i, px) in page.pixels_mut().enumerate() {
        let base = i * channels;
        let (r, g, b) = if channels == 3 {
            (data[base], data[base + 1], data[base + 2])
        } else {
            (data[base], data[base], data[base])
        };
        *px = image::Rgba([r, g, b, 255]);
    }
    Ok(page)
}

fn encode_page(doc: &mut Document, parent: ObjectId, page: &Page) -> PageResult<ObjectId> {
    let (width, height) = (page.width() as i64, page.height() as i64);

    let rgb = DynamicImage::ImageRgba8(page.clone()).to_rgb8();
    let mut jpeg = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|err| err.to_string())?;

    let image_id = doc.add_object(Object::Stream(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg,
    )));

    // Draw the image across the whole media box, one pixel per point
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    width.into(),
                    0.into(),
                    0.into(),
                    height.into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Object::Stream(Stream::new(
        dictionary! {},
        content.encode().map_err(|err| err.to_string())?,
    )));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
        "Contents" => content_id,
    }))
}
