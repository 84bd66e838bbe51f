use anyhow::Context;
use sqlx::{Connection, PgConnection};

use crate::domain::{models::ImageMetadataRow, ports::ImageMetadataRepo};

mod insert_image_metadata;

/// [ImageMetadataRepo] over a single Postgres connection owned by one invocation
pub struct PgImageMetadataRepo {
    conn: PgConnection,
}

impl PgImageMetadataRepo {
    pub fn new(conn: PgConnection) -> Self {
        PgImageMetadataRepo { conn }
    }
}

impl ImageMetadataRepo for PgImageMetadataRepo {
    async fn insert_image_metadata(&mut self, row: ImageMetadataRow) -> anyhow::Result<()> {
        insert_image_metadata::insert_image_metadata(&mut self.conn, &row).await
    }

    async fn close(self) -> anyhow::Result<()> {
        self.conn
            .close()
            .await
            .context("unable to close database connection")
    }
}
