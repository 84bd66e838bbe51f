use anyhow::Context;
use aws_config::BehaviorVersion;
use aws_credential_types::provider::ProvideCredentials;
use lambda_runtime::tracing;
use sqlx::{Connection, PgConnection, postgres::PgConnectOptions};

use crate::{
    config::Config,
    domain::ports::ResourceConnector,
    outbound::{postgres::PgImageMetadataRepo, s3::S3ObjectStore},
};

/// Opens a Postgres connection and an S3 client from [Config] for every invocation.
/// Nothing is pooled or cached between invocations.
#[derive(Debug, Clone)]
pub struct AwsPostgresConnector {
    config: Config,
}

impl AwsPostgresConnector {
    pub fn new(config: Config) -> Self {
        AwsPostgresConnector { config }
    }
}

impl ResourceConnector for AwsPostgresConnector {
    type Store = S3ObjectStore;
    type Repo = PgImageMetadataRepo;

    #[tracing::instrument(skip(self))]
    async fn connect(&self) -> anyhow::Result<(S3ObjectStore, PgImageMetadataRepo)> {
        let conn = open_database(&self.config.database_url).await?;

        tracing::info!("successfully connected to the database");

        let s3 = match storage_client(self.config.s3_endpoint_url.as_deref()).await {
            Ok(s3) => s3,
            Err(e) => {
                if let Err(close_err) = conn.close().await {
                    tracing::warn!(error=?close_err, "unable to close database connection");
                }
                return Err(e);
            }
        };

        tracing::trace!("initialized s3 client");

        Ok((S3ObjectStore::new(s3), PgImageMetadataRepo::new(conn)))
    }
}

/// Opens and pings a single connection. A connection that fails the ping is dropped.
async fn open_database(database_url: &str) -> anyhow::Result<PgConnection> {
    let options: PgConnectOptions = database_url
        .parse()
        .context("malformed database connection string")?;

    let mut conn = PgConnection::connect_with(&options)
        .await
        .context("failed to open database")?;

    conn.ping().await.context("failed to ping database")?;

    Ok(conn)
}

/// Builds the S3 client from the ambient AWS configuration, resolving
/// credentials up front so a missing identity fails the connection phase.
async fn storage_client(endpoint_url: Option<&str>) -> anyhow::Result<s3_client::S3> {
    let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;

    let credentials = sdk_config
        .credentials_provider()
        .context("no AWS credentials provider configured")?;
    credentials
        .provide_credentials()
        .await
        .context("failed to resolve AWS credentials")?;

    let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
    if let Some(endpoint_url) = endpoint_url {
        builder = builder.endpoint_url(endpoint_url).force_path_style(true);
    }

    Ok(s3_client::S3::new(aws_sdk_s3::Client::from_conf(
        builder.build(),
    )))
}
