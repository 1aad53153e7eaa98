//! Integration tests for derived-table rebuilds and split artist identities

mod test_helpers;

use melodex_core::{ids, SortOrder};
use melodex_storage::{aggregate, albums, artists, genres, tracks};
use test_helpers::{insert_track, TestDb};

#[tokio::test]
async fn albums_roll_up_counts_and_positive_years() {
    let db = TestDb::new().await;

    insert_track(db.pool(), "/m/1.mp3", "T1", "A", "Discovery", "House", 2001).await;
    insert_track(db.pool(), "/m/2.mp3", "T2", "A", "Discovery", "House", 1999).await;
    // Unknown year must not become first_year
    insert_track(db.pool(), "/m/3.mp3", "T3", "A", "Discovery", "House", 0).await;
    insert_track(db.pool(), "/m/4.mp3", "T4", "B", "Other", "Jazz", 2010).await;

    aggregate::recompute(db.pool()).await.unwrap();

    let all = albums::all(db.pool(), SortOrder::Asc).await.unwrap();
    assert_eq!(all.len(), 2);

    let discovery = albums::get_by_id(db.pool(), ids::name_id("Discovery"))
        .await
        .unwrap()
        .expect("album should exist");
    assert_eq!(discovery.num_tracks, 3);
    assert_eq!(discovery.first_year, 1999);
    assert_eq!(discovery.last_year, 2001);
}

#[tokio::test]
async fn genres_roll_up_counts() {
    let db = TestDb::new().await;

    insert_track(db.pool(), "/m/1.mp3", "T1", "A", "X", "House", 0).await;
    insert_track(db.pool(), "/m/2.mp3", "T2", "A", "Y", "House", 0).await;
    insert_track(db.pool(), "/m/3.mp3", "T3", "B", "Z", "Jazz", 0).await;

    aggregate::recompute(db.pool()).await.unwrap();

    let all = genres::all(db.pool(), SortOrder::Asc).await.unwrap();
    assert_eq!(all.len(), 2);

    let house = genres::get_by_id(db.pool(), ids::name_id("House"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(house.num_tracks, 2);
}

#[tokio::test]
async fn recompute_replaces_rather_than_accumulates() {
    let db = TestDb::new().await;

    insert_track(db.pool(), "/m/1.mp3", "T1", "A", "X", "House", 0).await;
    aggregate::recompute(db.pool()).await.unwrap();
    aggregate::recompute(db.pool()).await.unwrap();

    let all = albums::all(db.pool(), SortOrder::Asc).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].num_tracks, 1);

    // Removing the only track empties the derived tables on the next pass
    tracks::delete_by_path(db.pool(), "/m/1.mp3").await.unwrap();
    aggregate::recompute(db.pool()).await.unwrap();
    assert!(albums::all(db.pool(), SortOrder::Asc).await.unwrap().is_empty());
    assert!(artists::all(db.pool(), SortOrder::Asc).await.unwrap().is_empty());
}

#[tokio::test]
async fn combined_credits_split_into_identities() {
    let db = TestDb::new().await;

    insert_track(db.pool(), "/m/1.mp3", "Solo", "Daft Punk", "Discovery", "House", 2001).await;
    insert_track(
        db.pool(),
        "/m/2.mp3",
        "Collab",
        "Daft Punk feat. Pharrell Williams",
        "RAM",
        "House",
        2013,
    )
    .await;
    insert_track(
        db.pool(),
        "/m/3.mp3",
        "Bridge",
        "Simon & Garfunkel",
        "Bridge Over Troubled Water",
        "Folk",
        1970,
    )
    .await;

    let resolver = aggregate::recompute(db.pool()).await.unwrap();

    let all = artists::all(db.pool(), SortOrder::Asc).await.unwrap();
    let names: Vec<&str> = all.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Daft Punk", "Pharrell Williams", "Simon & Garfunkel"]
    );

    // Daft Punk occurs as an unsplit credit, so it keeps the raw id and
    // merges the counts of both rows
    let daft = artists::get_by_id(db.pool(), ids::name_id("Daft Punk"))
        .await
        .unwrap()
        .expect("raw id should survive the merge");
    assert!(daft.id > 0);
    assert_eq!(daft.num_tracks, 2);
    assert_eq!(daft.num_albums, 2);

    // Pharrell only ever appears inside a combined credit: negative id
    let pharrell = all.iter().find(|a| a.name == "Pharrell Williams").unwrap();
    assert!(ids::is_split_id(pharrell.id));
    assert_eq!(pharrell.id, ids::split_artist_id("Pharrell Williams"));
    assert_eq!(pharrell.num_tracks, 1);

    // The known act is never split
    let simon = all.iter().find(|a| a.name == "Simon & Garfunkel").unwrap();
    assert!(simon.id > 0);

    // Resolver reconciles the split id back to raw credits
    let terms = resolver.credit_terms_for_id(pharrell.id).unwrap();
    assert_eq!(
        terms,
        vec![
            "Pharrell Williams".to_string(),
            "Daft Punk feat. Pharrell Williams".to_string()
        ]
    );

    let matched = tracks::by_artist_credits(db.pool(), &terms).await.unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].title, "Collab");

    // Unknown split ids resolve to nothing
    assert!(resolver.credit_terms_for_id(-123_456_789).is_none());
}

#[tokio::test]
async fn split_identities_are_stable_across_rebuilds() {
    let db = TestDb::new().await;

    insert_track(
        db.pool(),
        "/m/1.mp3",
        "Collab",
        "A feat. B",
        "X",
        "House",
        0,
    )
    .await;

    let first = aggregate::recompute(db.pool()).await.unwrap();
    let second = aggregate::recompute(db.pool()).await.unwrap();

    let id_b = ids::split_artist_id("B");
    assert_eq!(first.name_for_id(id_b), Some("B"));
    assert_eq!(second.name_for_id(id_b), Some("B"));

    let artists = artists::all(db.pool(), SortOrder::Asc).await.unwrap();
    assert_eq!(artists.len(), 2);
}

#[tokio::test]
async fn albums_for_split_artist_resolve_through_tracks() {
    let db = TestDb::new().await;

    insert_track(db.pool(), "/m/1.mp3", "Solo", "Daft Punk", "Discovery", "House", 2001).await;
    insert_track(
        db.pool(),
        "/m/2.mp3",
        "Collab",
        "Daft Punk feat. Pharrell Williams",
        "RAM",
        "House",
        2013,
    )
    .await;

    let resolver = aggregate::recompute(db.pool()).await.unwrap();

    let pharrell_id = ids::split_artist_id("Pharrell Williams");
    let terms = resolver.credit_terms_for_id(pharrell_id).unwrap();
    let pharrell_albums = albums::for_credits(db.pool(), &terms, SortOrder::Asc)
        .await
        .unwrap();
    assert_eq!(pharrell_albums.len(), 1);
    assert_eq!(pharrell_albums[0].name, "RAM");

    // A raw-credit artist still goes through the albums table directly
    let daft_albums = albums::for_artist(db.pool(), ids::name_id("Daft Punk"), SortOrder::Asc)
        .await
        .unwrap();
    assert_eq!(daft_albums.len(), 1);
    assert_eq!(daft_albums[0].name, "Discovery");
}
