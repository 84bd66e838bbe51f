use anyhow::Context;
use lambda_runtime::tracing;
use sqlx::PgConnection;

use crate::domain::models::ImageMetadataRow;

/// Inserts a single row into `images`. `company` holds the camera make.
#[tracing::instrument(skip(conn))]
pub(super) async fn insert_image_metadata(
    conn: &mut PgConnection,
    row: &ImageMetadataRow,
) -> anyhow::Result<()> {
    sqlx::query(r#"INSERT INTO images (bucket, key, model, company) VALUES ($1, $2, $3, $4)"#)
        .bind(&row.bucket)
        .bind(&row.key)
        .bind(&row.model)
        .bind(&row.make)
        .execute(conn)
        .await
        .context("failed to execute SQL statement")?;

    Ok(())
}
