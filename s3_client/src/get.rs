use aws_sdk_s3 as s3;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStreamError;
use thiserror::Error;

/// The ways a whole-object read can fail
#[derive(Debug, Error)]
pub enum GetObjectErr {
    /// The bucket holds no object under the key
    #[error("item {key} does not exist in bucket {bucket}")]
    NotFound { bucket: String, key: String },
    /// The GetObject request itself failed
    #[error("could not get item {key} from bucket {bucket}")]
    Request {
        bucket: String,
        key: String,
        #[source]
        source: SdkError<GetObjectError>,
    },
    /// The response body was interrupted while being collected
    #[error("could not collect body of item {key} from bucket {bucket}")]
    Body {
        bucket: String,
        key: String,
        #[source]
        source: ByteStreamError,
    },
}

impl GetObjectErr {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GetObjectErr::NotFound { .. })
    }
}

/// Gets a given item from the bucket
#[tracing::instrument(skip(client))]
pub(crate) async fn get(
    client: &s3::Client,
    bucket: &str,
    key: &str,
) -> Result<Vec<u8>, GetObjectErr> {
    let resp = match client.get_object().bucket(bucket).key(key).send().await {
        Ok(resp) => resp,
        Err(e) => {
            if e.as_service_error().map(|e| e.is_no_such_key()) == Some(true) {
                return Err(GetObjectErr::NotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                });
            }

            return Err(GetObjectErr::Request {
                bucket: bucket.to_string(),
                key: key.to_string(),
                source: e,
            });
        }
    };

    let body = resp
        .body
        .collect()
        .await
        .map_err(|source| GetObjectErr::Body {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source,
        })?;

    let bytes = body.into_bytes();
    tracing::trace!(content_length = bytes.len(), "collected object body");

    Ok(bytes.to_vec())
}
