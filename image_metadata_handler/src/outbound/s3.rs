use lambda_runtime::tracing;

use crate::domain::{
    models::{FetchErr, ObjectLocation},
    ports::ObjectStore,
};

/// [ObjectStore] backed by S3
#[derive(Clone, Debug)]
pub struct S3ObjectStore {
    inner: s3_client::S3,
}

impl S3ObjectStore {
    pub fn new(inner: s3_client::S3) -> Self {
        Self { inner }
    }
}

impl ObjectStore for S3ObjectStore {
    #[tracing::instrument(skip(self), fields(bucket=%location.bucket, key=%location.key))]
    async fn get_object(&self, location: &ObjectLocation) -> Result<Vec<u8>, FetchErr> {
        self.inner
            .get(&location.bucket, &location.key)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    FetchErr::NotFound
                } else {
                    FetchErr::Transfer(e.into())
                }
            })
    }
}
