//! The outside world as the ingest pipeline sees it

use crate::domain::models::{FetchErr, ImageMetadataRow, ObjectLocation};

/// Read access to the object storage holding uploaded images
#[cfg_attr(test, mockall::automock)]
pub trait ObjectStore: Send + Sync + 'static {
    /// download the full content of the object
    fn get_object(
        &self,
        location: &ObjectLocation,
    ) -> impl Future<Output = Result<Vec<u8>, FetchErr>> + Send;
}

/// Write access to the `images` table through a single, invocation scoped connection
#[cfg_attr(test, mockall::automock)]
pub trait ImageMetadataRepo: Send + 'static {
    /// insert exactly one row. Duplicate rows are allowed.
    fn insert_image_metadata(
        &mut self,
        row: ImageMetadataRow,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// release the underlying connection
    fn close(self) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Opens the per invocation handles. Nothing returned here outlives the invocation.
#[cfg_attr(test, mockall::automock(type Store = MockObjectStore; type Repo = MockImageMetadataRepo;))]
pub trait ResourceConnector: Send + Sync + 'static {
    type Store: ObjectStore;
    type Repo: ImageMetadataRepo;

    /// open the database connection first, then the storage client
    fn connect(&self) -> impl Future<Output = anyhow::Result<(Self::Store, Self::Repo)>> + Send;
}
