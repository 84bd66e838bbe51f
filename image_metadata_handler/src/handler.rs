use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::{
    Error, LambdaEvent,
    tracing::{self},
};

use crate::domain::{ports::ResourceConnector, service::ImageMetadataIngestor};

/// Processes the s3 event. Records are resolved one at a time as the ingestor
/// reaches them; one that cannot be resolved fails the invocation.
#[tracing::instrument(skip_all)]
pub async fn handler<C>(
    ingestor: &ImageMetadataIngestor<C>,
    event: LambdaEvent<S3Event>,
) -> Result<(), Error>
where
    C: ResourceConnector,
{
    tracing::info!(
        "processing s3 records record_count={}",
        event.payload.records.len()
    );

    let summary = match ingestor.ingest(event.payload.records).await {
        Ok(summary) => summary,
        Err(err) => {
            tracing::error!(error=?err, "unable to ingest image metadata");
            return Err(err.into());
        }
    };

    tracing::info!(rows_written = summary.rows_written, "complete");

    Ok(())
}
