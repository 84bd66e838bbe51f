//! The per invocation ingest pipeline

use lambda_runtime::tracing::{self, Instrument};

use crate::domain::{
    decoder::decode_camera_metadata,
    models::{ImageMetadataRow, IngestErr, IngestSummary, NotificationRecord},
    ports::{ImageMetadataRepo, ObjectStore, ResourceConnector},
};

#[cfg(test)]
mod tests;

/// Runs notification records through fetch, decode and insert with handles
/// opened fresh by the connector on every call.
pub struct ImageMetadataIngestor<C> {
    connector: C,
}

impl<C> ImageMetadataIngestor<C>
where
    C: ResourceConnector,
{
    pub fn new(connector: C) -> Self {
        ImageMetadataIngestor { connector }
    }

    /// Resolves and processes the records in order. The first failure, including
    /// a record that cannot be resolved, aborts the remaining records; rows
    /// written before it stay written. The database handle is closed on every
    /// path once it has been opened.
    #[tracing::instrument(skip_all)]
    pub async fn ingest<I>(&self, records: I) -> Result<IngestSummary, IngestErr>
    where
        I: IntoIterator,
        I::Item: TryInto<NotificationRecord>,
        IngestErr: From<<I::Item as TryInto<NotificationRecord>>::Error>,
    {
        let (store, mut repo) = self
            .connector
            .connect()
            .await
            .map_err(IngestErr::Connection)?;

        tracing::trace!("connected");

        let result = ingest_records(&store, &mut repo, records).await;

        if let Err(err) = repo.close().await {
            tracing::warn!(error=?err, "unable to close database connection");
        }

        result
    }
}

async fn ingest_records<S, R, I>(
    store: &S,
    repo: &mut R,
    records: I,
) -> Result<IngestSummary, IngestErr>
where
    S: ObjectStore,
    R: ImageMetadataRepo,
    I: IntoIterator,
    I::Item: TryInto<NotificationRecord>,
    IngestErr: From<<I::Item as TryInto<NotificationRecord>>::Error>,
{
    let mut summary = IngestSummary::default();

    for (index, record) in records.into_iter().enumerate() {
        let record: NotificationRecord = record
            .try_into()
            .map_err(IngestErr::from)
            .inspect_err(|err| tracing::error!(error=?err, index, "invalid notification record"))?;

        let location = &record.location;
        let span = tracing::info_span!("process_record", bucket=%location.bucket, key=%location.key);

        ingest_record(store, repo, &record)
            .instrument(span)
            .await
            .inspect_err(|err| tracing::error!(error=?err, "error processing record"))?;

        summary.rows_written += 1;
    }

    tracing::info!(rows_written = summary.rows_written, "processing complete");

    Ok(summary)
}

async fn ingest_record<S, R>(
    store: &S,
    repo: &mut R,
    record: &NotificationRecord,
) -> Result<(), IngestErr>
where
    S: ObjectStore,
    R: ImageMetadataRepo,
{
    let location = &record.location;

    let bytes = store
        .get_object(location)
        .await
        .map_err(|e| IngestErr::from_fetch(location, e))?;

    tracing::trace!(len = bytes.len(), "object retrieved");

    let metadata =
        decode_camera_metadata(&bytes).map_err(|e| IngestErr::from_metadata(location, e))?;

    tracing::info!(model=%metadata.model, make=%metadata.make, "retrieved camera metadata");

    repo.insert_image_metadata(ImageMetadataRow::new(location, metadata))
        .await
        .map_err(|error| IngestErr::Write {
            location: location.clone(),
            error,
        })?;

    tracing::trace!("row written");

    Ok(())
}
