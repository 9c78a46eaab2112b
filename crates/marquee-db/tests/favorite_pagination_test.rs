//! PostgreSQL integration tests for the favorite repository.
//!
//! Require a running database (`DATABASE_URL`, see
//! `marquee_db::test_fixtures::DEFAULT_TEST_DATABASE_URL`). Run with
//! `cargo test -p marquee-db --features migrations -- --ignored`.

use marquee_db::test_fixtures::TestDatabase;
use marquee_db::{
    Error, FavoritePatch, FavoriteRepository, MediaType, NewFavorite, PageRequest, TextField,
};

async fn seed(db: &TestDatabase, n: usize) -> Vec<i64> {
    let mut ids = Vec::new();
    for i in 0..n {
        let entry = db
            .favorites
            .create(NewFavorite::new(format!("Seed {}", i), MediaType::Movie))
            .await
            .expect("Failed to insert favorite");
        ids.push(entry.id);
    }
    ids
}

#[tokio::test]
#[ignore]
async fn test_create_and_fetch_round_trip() {
    let _ = dotenvy::dotenv();
    let db = TestDatabase::new().await;

    let created = db
        .favorites
        .create(
            NewFavorite::new("Breaking Bad", MediaType::TvShow)
                .with_text(TextField::YearTime, "2008-2013")
                .with_text(TextField::PosterUrl, "https://example.com/bb.jpg"),
        )
        .await
        .expect("Failed to create favorite");

    let fetched = db.favorites.fetch(created.id).await.unwrap();
    assert_eq!(fetched.title, "Breaking Bad");
    assert_eq!(fetched.media_type, MediaType::TvShow);
    assert_eq!(fetched.year_time.as_deref(), Some("2008-2013"));
    assert_eq!(fetched.director, None);

    db.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn test_keyset_walk_visits_every_row_once() {
    let _ = dotenvy::dotenv();
    let db = TestDatabase::new().await;
    let mut ids = seed(&db, 7).await;
    ids.reverse();

    let mut seen = Vec::new();
    let mut req = PageRequest::first(3);
    loop {
        let page = db.favorites.list_page(req).await.unwrap();
        seen.extend(page.data.iter().map(|e| e.id));
        match (page.has_more, page.next_cursor) {
            (true, Some(cursor)) => req = req.after(cursor),
            _ => break,
        }
    }

    assert_eq!(seen, ids, "pages should cover all rows in descending id order");
    db.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn test_concurrent_inserts_get_distinct_ids() {
    let _ = dotenvy::dotenv();
    let db = TestDatabase::new().await;

    let inserts = (0..10).map(|i| {
        db.favorites
            .create(NewFavorite::new(format!("Concurrent {}", i), MediaType::Movie))
    });
    let results = futures::future::join_all(inserts).await;

    let mut ids: Vec<i64> = results.into_iter().map(|r| r.unwrap().id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 10);

    db.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn test_update_null_clears_and_missing_is_not_found() {
    let _ = dotenvy::dotenv();
    let db = TestDatabase::new().await;

    let created = db
        .favorites
        .create(NewFavorite::new("Heat", MediaType::Movie).with_text(TextField::Budget, "$60M"))
        .await
        .unwrap();

    let mut patch = FavoritePatch::default();
    patch.set_text(TextField::Budget, None);
    patch.media_type = Some(MediaType::TvShow);
    let updated = db.favorites.update(created.id, patch).await.unwrap();
    assert_eq!(updated.budget, None);
    assert_eq!(updated.media_type, MediaType::TvShow);
    assert_eq!(updated.title, "Heat");
    assert!(updated.updated_at >= created.updated_at);

    let err = db
        .favorites
        .update(created.id + 1000, FavoritePatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::FavoriteNotFound(_)));

    db.favorites.delete(created.id).await.unwrap();
    let err = db.favorites.delete(created.id).await.unwrap_err();
    assert!(err.is_not_found());

    db.cleanup().await;
}
