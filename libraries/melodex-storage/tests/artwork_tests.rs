//! Integration tests for the artwork cache

mod test_helpers;

use melodex_core::types::ArtworkKind;
use melodex_storage::artwork;
use test_helpers::TestDb;

#[tokio::test]
async fn cached_bytes_round_trip_exactly() {
    let db = TestDb::new().await;
    let jpeg_header = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];

    artwork::cache(db.pool(), 42, ArtworkKind::Track, "jpg", &jpeg_header)
        .await
        .unwrap();

    let fetched = artwork::get(db.pool(), 42, ArtworkKind::Track, "jpg")
        .await
        .unwrap();
    assert_eq!(fetched, Some(jpeg_header));
}

#[tokio::test]
async fn caching_again_replaces_the_blob() {
    let db = TestDb::new().await;

    artwork::cache(db.pool(), 42, ArtworkKind::Album, "png", &[1, 2, 3])
        .await
        .unwrap();
    artwork::cache(db.pool(), 42, ArtworkKind::Album, "png", &[4, 5, 6, 7])
        .await
        .unwrap();

    let fetched = artwork::get(db.pool(), 42, ArtworkKind::Album, "png")
        .await
        .unwrap();
    assert_eq!(fetched, Some(vec![4, 5, 6, 7]));
}

#[tokio::test]
async fn every_key_component_must_match() {
    let db = TestDb::new().await;

    artwork::cache(db.pool(), 42, ArtworkKind::Track, "jpg", &[1, 2, 3])
        .await
        .unwrap();

    // Different format
    assert!(artwork::get(db.pool(), 42, ArtworkKind::Track, "png")
        .await
        .unwrap()
        .is_none());
    // Different kind
    assert!(artwork::get(db.pool(), 42, ArtworkKind::Album, "jpg")
        .await
        .unwrap()
        .is_none());
    // Different id
    assert!(artwork::get(db.pool(), 43, ArtworkKind::Track, "jpg")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn empty_blob_reads_as_absent() {
    let db = TestDb::new().await;

    artwork::cache(db.pool(), 42, ArtworkKind::Track, "jpg", &[])
        .await
        .unwrap();

    assert!(artwork::get(db.pool(), 42, ArtworkKind::Track, "jpg")
        .await
        .unwrap()
        .is_none());
}
