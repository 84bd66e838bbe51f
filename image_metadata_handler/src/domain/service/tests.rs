use cool_asserts::assert_matches;

use super::*;
use crate::domain::{
    decoder::test_images::{MODEL, camera_jpeg, jpeg_with_ascii_tags},
    models::{FetchErr, MetadataField, ObjectLocation, test_records::put_record},
    ports::{MockImageMetadataRepo, MockObjectStore, MockResourceConnector},
};

const BUCKET: &str = "camera-uploads";

fn record(key: &str) -> NotificationRecord {
    NotificationRecord {
        location: ObjectLocation::new(BUCKET, key),
    }
}

fn connector_with(store: MockObjectStore, repo: MockImageMetadataRepo) -> MockResourceConnector {
    let mut connector = MockResourceConnector::new();
    connector
        .expect_connect()
        .times(1)
        .return_once(move || Box::pin(async move { Ok((store, repo)) }));
    connector
}

fn store_returning(key: &'static str, bytes: Vec<u8>) -> MockObjectStore {
    let mut store = MockObjectStore::new();
    store
        .expect_get_object()
        .withf(move |location| location.bucket == BUCKET && location.key == key)
        .times(1)
        .return_once(move |_| Box::pin(async move { Ok(bytes) }));
    store
}

fn repo_expecting_close() -> MockImageMetadataRepo {
    let mut repo = MockImageMetadataRepo::new();
    repo.expect_close()
        .times(1)
        .returning(|| Box::pin(async { Ok(()) }));
    repo
}

#[tokio::test]
async fn it_should_insert_one_row_per_record() {
    let store = store_returning("trip/IMG_0001.jpg", camera_jpeg("Canon", "Canon EOS R5"));

    let mut repo = repo_expecting_close();
    repo.expect_insert_image_metadata()
        .withf(|row| {
            assert_eq!(
                row,
                &ImageMetadataRow {
                    bucket: BUCKET.to_string(),
                    key: "trip/IMG_0001.jpg".to_string(),
                    model: "Canon EOS R5".to_string(),
                    make: "Canon".to_string(),
                }
            );
            true
        })
        .times(1)
        .returning(|_| Box::pin(async { Ok(()) }));

    let summary = ImageMetadataIngestor::new(connector_with(store, repo))
        .ingest([record("trip/IMG_0001.jpg")])
        .await
        .unwrap();

    assert_eq!(summary.rows_written, 1);
}

#[tokio::test]
async fn it_should_not_insert_without_make() {
    let store = store_returning(
        "no-make.jpg",
        jpeg_with_ascii_tags(&[(MODEL, "DMC-GH4")]),
    );

    let mut repo = repo_expecting_close();
    repo.expect_insert_image_metadata().never();

    let err = ImageMetadataIngestor::new(connector_with(store, repo))
        .ingest([record("no-make.jpg")])
        .await
        .unwrap_err();

    assert_matches!(
        err,
        IngestErr::MissingField { location, field: MetadataField::Make } => {
            assert_eq!(location.key, "no-make.jpg");
        }
    );
}

#[tokio::test]
async fn it_should_not_insert_for_corrupt_objects() {
    let store = store_returning("notes.txt", b"shopping list: eggs, milk".to_vec());

    let mut repo = repo_expecting_close();
    repo.expect_insert_image_metadata().never();

    let err = ImageMetadataIngestor::new(connector_with(store, repo))
        .ingest([record("notes.txt")])
        .await
        .unwrap_err();

    assert_matches!(err, IngestErr::Decode { .. });
}

#[tokio::test]
async fn it_should_fail_with_connection_error_when_database_unreachable() {
    let mut connector = MockResourceConnector::new();
    connector.expect_connect().times(1).returning(|| {
        Box::pin(async { Err(anyhow::anyhow!("failed to open database: connection refused")) })
    });

    let err = ImageMetadataIngestor::new(connector)
        .ingest([record("IMG_0001.jpg")])
        .await
        .unwrap_err();

    assert!(err.to_string().contains("connection refused"));
    assert_matches!(err, IngestErr::Connection(_));
}

#[tokio::test]
async fn it_should_surface_write_errors_and_still_close() {
    let store = store_returning("IMG_0002.jpg", camera_jpeg("SONY", "ILCE-7M4"));

    let mut repo = repo_expecting_close();
    repo.expect_insert_image_metadata()
        .times(1)
        .returning(|_| Box::pin(async { Err(anyhow::anyhow!("connection reset by peer")) }));

    let err = ImageMetadataIngestor::new(connector_with(store, repo))
        .ingest([record("IMG_0002.jpg")])
        .await
        .unwrap_err();

    assert_matches!(err, IngestErr::Write { location, .. } => {
        assert_eq!(location.key, "IMG_0002.jpg");
    });
}

#[tokio::test]
async fn it_should_report_missing_objects() {
    let mut store = MockObjectStore::new();
    store
        .expect_get_object()
        .times(1)
        .returning(|_| Box::pin(async { Err(FetchErr::NotFound) }));

    let mut repo = repo_expecting_close();
    repo.expect_insert_image_metadata().never();

    let err = ImageMetadataIngestor::new(connector_with(store, repo))
        .ingest([record("deleted.jpg")])
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "object camera-uploads/deleted.jpg not found");
    assert_matches!(err, IngestErr::NotFound { .. });
}

#[tokio::test]
async fn it_should_report_interrupted_transfers() {
    let mut store = MockObjectStore::new();
    store.expect_get_object().times(1).returning(|_| {
        Box::pin(async { Err(FetchErr::Transfer(anyhow::anyhow!("body stream reset"))) })
    });

    let err = ImageMetadataIngestor::new(connector_with(store, repo_expecting_close()))
        .ingest([record("big.jpg")])
        .await
        .unwrap_err();

    assert_matches!(err, IngestErr::Transfer { .. });
}

#[tokio::test]
async fn it_should_stop_at_the_first_failing_record() {
    let mut store = store_returning("corrupt.jpg", vec![0xff, 0xd8, 0x00, 0x01]);
    store
        .expect_get_object()
        .withf(|location| location.key == "good.jpg")
        .never();

    let mut repo = repo_expecting_close();
    repo.expect_insert_image_metadata().never();

    let err = ImageMetadataIngestor::new(connector_with(store, repo))
        .ingest([record("corrupt.jpg"), record("good.jpg")])
        .await
        .unwrap_err();

    assert_matches!(err, IngestErr::Decode { location, .. } => {
        assert_eq!(location.key, "corrupt.jpg");
    });
}

#[tokio::test]
async fn it_should_keep_earlier_rows_when_a_later_record_is_invalid() {
    let store = store_returning("trip/IMG_0010.jpg", camera_jpeg("SONY", "ILCE-7M4"));

    let mut repo = repo_expecting_close();
    repo.expect_insert_image_metadata()
        .withf(|row| row.key == "trip/IMG_0010.jpg" && row.model == "ILCE-7M4")
        .times(1)
        .returning(|_| Box::pin(async { Ok(()) }));

    let err = ImageMetadataIngestor::new(connector_with(store, repo))
        .ingest([
            put_record(Some(BUCKET), Some("trip/IMG_0010.jpg")),
            put_record(Some(BUCKET), None),
        ])
        .await
        .unwrap_err();

    assert_matches!(err, IngestErr::InvalidRecord(_));
}

#[tokio::test]
async fn it_should_store_blank_values_that_are_present() {
    let store = store_returning("IMG_0020.jpg", camera_jpeg("   ", "Pixel 8"));

    let mut repo = repo_expecting_close();
    repo.expect_insert_image_metadata()
        .withf(|row| row.make == "   " && row.model == "Pixel 8")
        .times(1)
        .returning(|_| Box::pin(async { Ok(()) }));

    let summary = ImageMetadataIngestor::new(connector_with(store, repo))
        .ingest([record("IMG_0020.jpg")])
        .await
        .unwrap();

    assert_eq!(summary.rows_written, 1);
}

#[tokio::test]
async fn it_should_process_records_in_order() {
    let mut store = MockObjectStore::new();
    let mut sequence = mockall::Sequence::new();
    for (key, model) in [("first.jpg", "X100V"), ("second.jpg", "X-T5")] {
        store
            .expect_get_object()
            .withf(move |location| location.key == key)
            .times(1)
            .in_sequence(&mut sequence)
            .returning(move |_| {
                let bytes = camera_jpeg("FUJIFILM", model);
                Box::pin(async move { Ok(bytes) })
            });
    }

    let mut repo = repo_expecting_close();
    repo.expect_insert_image_metadata()
        .times(2)
        .returning(|_| Box::pin(async { Ok(()) }));

    let summary = ImageMetadataIngestor::new(connector_with(store, repo))
        .ingest([record("first.jpg"), record("second.jpg")])
        .await
        .unwrap();

    assert_eq!(summary.rows_written, 2);
}

#[tokio::test]
async fn it_should_not_deduplicate_repeated_notifications() {
    let mut connector = MockResourceConnector::new();
    connector.expect_connect().times(2).returning(|| {
        let store = store_returning("IMG_0003.jpg", camera_jpeg("Apple", "iPhone 15 Pro"));

        let mut repo = repo_expecting_close();
        repo.expect_insert_image_metadata()
            .withf(|row| row.key == "IMG_0003.jpg" && row.model == "iPhone 15 Pro")
            .times(1)
            .returning(|_| Box::pin(async { Ok(()) }));

        Box::pin(async move { Ok((store, repo)) })
    });

    let ingestor = ImageMetadataIngestor::new(connector);
    let notification = [record("IMG_0003.jpg")];

    let first = ingestor.ingest(notification.clone()).await.unwrap();
    let second = ingestor.ingest(notification).await.unwrap();

    assert_eq!(first.rows_written + second.rows_written, 2);
}

#[tokio::test]
async fn it_should_connect_and_close_for_empty_batches() {
    let ingestor = ImageMetadataIngestor::new(connector_with(
        MockObjectStore::new(),
        repo_expecting_close(),
    ));

    let summary = ingestor
        .ingest(Vec::<NotificationRecord>::new())
        .await
        .unwrap();

    assert_eq!(summary.rows_written, 0);
}

#[tokio::test]
async fn it_should_not_mask_the_result_when_close_fails() {
    let store = store_returning("IMG_0004.jpg", camera_jpeg("OLYMPUS", "E-M1"));

    let mut repo = MockImageMetadataRepo::new();
    repo.expect_insert_image_metadata()
        .times(1)
        .returning(|_| Box::pin(async { Ok(()) }));
    repo.expect_close()
        .times(1)
        .returning(|| Box::pin(async { Err(anyhow::anyhow!("already closed")) }));

    let summary = ImageMetadataIngestor::new(connector_with(store, repo))
        .ingest([record("IMG_0004.jpg")])
        .await
        .unwrap();

    assert_eq!(summary.rows_written, 1);
}
