use aws_lambda_events::s3::S3EventRecord;
use std::fmt::Display;
use thiserror::Error;

/// Where an uploaded object lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl Display for ObjectLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// One entry of an upload notification, with the object key already URL decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecord {
    pub location: ObjectLocation,
}

impl TryFrom<S3EventRecord> for NotificationRecord {
    type Error = IngestErr;

    fn try_from(record: S3EventRecord) -> Result<Self, Self::Error> {
        let bucket = record
            .s3
            .bucket
            .name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| IngestErr::InvalidRecord("missing bucket name".to_string()))?;

        let encoded_key = record
            .s3
            .object
            .key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                IngestErr::InvalidRecord(format!("missing object key in bucket {bucket}"))
            })?;

        let key = decode_object_key(&encoded_key)?;

        Ok(Self {
            location: ObjectLocation::new(bucket, key),
        })
    }
}

/// S3 notifications form-encode keys: spaces arrive as `+` and everything
/// else percent encoded, so a literal `+` shows up as `%2B`.
pub fn decode_object_key(encoded: &str) -> Result<String, IngestErr> {
    let spaced = encoded.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|key| key.into_owned())
        .map_err(|e| IngestErr::InvalidRecord(format!("unable to decode key {encoded}: {e}")))
}

/// The two EXIF tags every ingested image must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    /// camera model, EXIF `Model`
    Model,
    /// camera manufacturer, EXIF `Make`
    Make,
}

impl Display for MetadataField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataField::Model => write!(f, "Model"),
            MetadataField::Make => write!(f, "Make"),
        }
    }
}

/// Camera details decoded from an image's embedded metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraMetadata {
    pub model: String,
    pub make: String,
}

/// A row of the `images` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMetadataRow {
    pub bucket: String,
    pub key: String,
    pub model: String,
    pub make: String,
}

impl ImageMetadataRow {
    pub fn new(location: &ObjectLocation, metadata: CameraMetadata) -> Self {
        Self {
            bucket: location.bucket.clone(),
            key: location.key.clone(),
            model: metadata.model,
            make: metadata.make,
        }
    }
}

/// What a successful invocation accomplished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestSummary {
    pub rows_written: usize,
}

/// Error reading an object from storage
#[derive(Debug, Error)]
pub enum FetchErr {
    #[error("object does not exist")]
    NotFound,
    #[error(transparent)]
    Transfer(anyhow::Error),
}

/// Error decoding the embedded metadata of an image
#[derive(Debug, Error)]
pub enum MetadataErr {
    #[error("failed to decode EXIF data: {0}")]
    Decode(String),
    #[error("EXIF data has no {0} tag")]
    MissingField(MetadataField),
}

/// Every way an invocation can fail. The first one encountered aborts the invocation.
#[derive(Debug, Error)]
pub enum IngestErr {
    #[error("failed to connect: {0:#}")]
    Connection(anyhow::Error),
    #[error("invalid notification record: {0}")]
    InvalidRecord(String),
    #[error("object {location} not found")]
    NotFound { location: ObjectLocation },
    #[error("failed to read object {location}: {error:#}")]
    Transfer {
        location: ObjectLocation,
        error: anyhow::Error,
    },
    #[error("failed to decode EXIF data of {location}: {reason}")]
    Decode {
        location: ObjectLocation,
        reason: String,
    },
    #[error("object {location} has no {field} EXIF tag")]
    MissingField {
        location: ObjectLocation,
        field: MetadataField,
    },
    #[error("failed to insert metadata for {location}: {error:#}")]
    Write {
        location: ObjectLocation,
        error: anyhow::Error,
    },
}

impl From<std::convert::Infallible> for IngestErr {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

impl IngestErr {
    pub(crate) fn from_fetch(location: &ObjectLocation, err: FetchErr) -> Self {
        match err {
            FetchErr::NotFound => IngestErr::NotFound {
                location: location.clone(),
            },
            FetchErr::Transfer(error) => IngestErr::Transfer {
                location: location.clone(),
                error,
            },
        }
    }

    pub(crate) fn from_metadata(location: &ObjectLocation, err: MetadataErr) -> Self {
        match err {
            MetadataErr::Decode(reason) => IngestErr::Decode {
                location: location.clone(),
                reason,
            },
            MetadataErr::MissingField(field) => IngestErr::MissingField {
                location: location.clone(),
                field,
            },
        }
    }
}
