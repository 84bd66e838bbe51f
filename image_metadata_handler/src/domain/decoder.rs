//! Reads camera details out of the EXIF data embedded in an image.

use exif::{Exif, In, Reader, Tag, Value};
use lambda_runtime::tracing;
use std::io::Cursor;

use crate::domain::models::{CameraMetadata, MetadataErr, MetadataField};

/// Parses the image container in `bytes` and returns its camera model and manufacturer.
/// Any container `kamadak-exif` recognises (JPEG, TIFF, PNG, HEIF, WebP) is accepted.
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn decode_camera_metadata(bytes: &[u8]) -> Result<CameraMetadata, MetadataErr> {
    let exif = Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .map_err(|e| MetadataErr::Decode(e.to_string()))?;

    tracing::debug!(tag_count = exif.fields().count(), "decoded EXIF data");

    let model = text_tag(&exif, Tag::Model).ok_or(MetadataErr::MissingField(MetadataField::Model))?;
    let make = text_tag(&exif, Tag::Make).ok_or(MetadataErr::MissingField(MetadataField::Make))?;

    Ok(CameraMetadata { model, make })
}

/// Text of a primary IFD tag, `None` only when the tag is absent.
/// ASCII values lose their NUL terminator and are otherwise kept as stored.
fn text_tag(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;

    let text = match &field.value {
        Value::Ascii(parts) => parts
            .iter()
            .map(|part| String::from_utf8_lossy(part))
            .collect::<Vec<_>>()
            .join(" ")
            .trim_end_matches('\0')
            .to_string(),
        _ => field.display_value().to_string(),
    };

    Some(text)
}
