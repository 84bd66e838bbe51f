//! Thin wrapper over [aws_sdk_s3::Client] exposing the object operations the
//! lambdas in this workspace need.

mod get;

pub use get::GetObjectErr;

#[derive(Clone, Debug)]
pub struct S3 {
    inner: aws_sdk_s3::Client,
}

impl S3 {
    pub fn new(inner: aws_sdk_s3::Client) -> Self {
        Self { inner }
    }

    /// Retrieves the full content of the provided key from the bucket.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, GetObjectErr> {
        get::get(&self.inner, bucket, key).await
    }
}
