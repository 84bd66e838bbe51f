mod config;
mod domain;
mod handler;
mod logging;
mod outbound;

use std::sync::Arc;

use aws_lambda_events::s3::S3Event;
use config::Config;
use domain::service::ImageMetadataIngestor;
use handler::handler;
use lambda_runtime::{Error, LambdaEvent, run, service_fn, tracing};
use outbound::connector::AwsPostgresConnector;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let log_format = logging::init();

    tracing::trace!(log_format=?log_format, "initiating lambda");

    let config = Config::from_env()?;

    tracing::debug!(config=?config, "loaded config");

    let ingestor = Arc::new(ImageMetadataIngestor::new(AwsPostgresConnector::new(
        config,
    )));

    let func = service_fn(move |event: LambdaEvent<S3Event>| {
        let ingestor = ingestor.clone();
        async move { handler(ingestor.as_ref(), event).await }
    });

    run(func).await
}
