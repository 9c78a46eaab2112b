//! Client stack against a live API server backed by the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use marquee_api::{app, AppState, ServerConfig};
use marquee_client::view::{FavoriteForm, FavoriteTable, TableView};
use marquee_client::{
    ClientError, FavoritesClient, InfiniteFavorites, Mutations, QueryCache, QueryStatus,
    ScrollTrigger, Sentinel, ViewportObserver,
};
use marquee_core::{EventBus, MediaType, NewFavorite, TextField};
use tokio::runtime::Handle;

const ROW_HEIGHT: f64 = 100.0;

struct Harness {
    client: FavoritesClient,
    cache: Arc<QueryCache>,
    mutations: Arc<Mutations>,
}

async fn start() -> Harness {
    let app = app(AppState::in_memory(), &ServerConfig::default());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give server a moment to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = FavoritesClient::new(format!("http://{}", addr));
    let events = Arc::new(EventBus::default());
    let cache = Arc::new(QueryCache::new(Arc::new(client.clone())));
    cache.clone().spawn_invalidation(events.subscribe());
    let mutations = Arc::new(Mutations::new(client.clone(), events));

    Harness {
        client,
        cache,
        mutations,
    }
}

async fn wait_until(what: &str, mut done: impl FnMut() -> bool) {
    let reached = tokio::time::timeout(Duration::from_secs(5), async {
        while !done() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(reached.is_ok(), "timed out waiting for: {}", what);
}

fn ids(listing: &InfiniteFavorites) -> Vec<i64> {
    listing.items().iter().map(|e| e.id).collect()
}

async fn seed(client: &FavoritesClient, count: usize) -> Vec<i64> {
    let mut created = Vec::new();
    for i in 0..count {
        let entry = client
            .create(&NewFavorite::new(format!("Film {}", i), MediaType::Movie))
            .await
            .expect("seed entry");
        created.push(entry.id);
    }
    created
}

#[tokio::test]
async fn test_scrolling_loads_every_page_once() {
    let harness = start().await;
    let mut created = seed(&harness.client, 40).await;
    created.reverse();

    let table = FavoriteTable::from_cache(&harness.cache, harness.mutations.clone());
    let listing = table.listing().clone();
    assert_eq!(listing.limit(), 15);
    assert_eq!(table.render(), TableView::Loading);

    listing.refetch().await;
    assert_eq!(ids(&listing), created[..15].to_vec());

    let observer = ViewportObserver::new(600.0);
    let trigger = ScrollTrigger::new(listing.clone(), observer.clone(), Handle::current());
    let sentinel = Sentinel::new(15.0 * ROW_HEIGHT);
    trigger.attach(sentinel);
    // 0..600 plus the 200px margin does not reach the sentinel at 1500.
    assert_eq!(listing.page_count(), 1);

    observer.scroll_to(1000.0);
    wait_until("second page", || listing.page_count() >= 2).await;

    // The sentinel stays in view as pages land, so loading continues on its
    // own until the last page.
    wait_until("last page", || !listing.is_fetching() && !listing.has_next_page()).await;
    assert_eq!(listing.page_count(), 3);

    assert_eq!(ids(&listing), created);
    assert!(!listing.has_next_page());
    match table.render() {
        TableView::Rows { rows, footer } => {
            assert_eq!(rows.len(), 40);
            assert_eq!(footer, "No more records");
        }
        other => panic!("unexpected view: {:?}", other),
    }

    // Scrolling further with nothing left issues no request.
    observer.move_sentinel(sentinel.id, 40.0 * ROW_HEIGHT);
    observer.scroll_to(3500.0);
    assert!(!trigger.recheck());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(listing.page_count(), 3);

    drop(trigger);
    assert_eq!(observer.observation_count(), 0);
}

#[tokio::test]
async fn test_add_edit_delete_refetch_from_first_page() {
    let harness = start().await;
    seed(&harness.client, 20).await;

    let mut table = FavoriteTable::from_cache(&harness.cache, harness.mutations.clone());
    let listing = table.listing().clone();
    listing.refetch().await;
    listing.fetch_next_page().await;
    assert_eq!(listing.items().len(), 20);

    // Add: the new entry shows up once, at the top of a fresh first page.
    let mut form = FavoriteForm::add();
    form.set_title("Paprika");
    form.set_media_type(MediaType::Movie);
    form.set_field(TextField::Director, "Satoshi Kon");
    form.set_field(TextField::Budget, "  ");
    let added = form.submit(&harness.mutations).await.expect("created");
    assert_eq!(added.budget, None);
    assert_eq!(form.draft().title, "", "add form resets after success");

    wait_until("refetch after create", || {
        listing.status() == QueryStatus::Success
            && !listing.is_fetching()
            && listing.items().first().map(|e| e.id) == Some(added.id)
    })
    .await;
    assert_eq!(listing.page_count(), 1);
    assert_eq!(ids(&listing).iter().filter(|id| **id == added.id).count(), 1);

    // Edit: every field is sent, a blank input clears the stored value.
    let mut edit = table.edit_form(added.id).expect("row loaded");
    assert_eq!(edit.submit_label(), "Save");
    edit.set_field(TextField::Director, "");
    edit.set_field(TextField::YearTime, "2006");
    let updated = edit.submit(&harness.mutations).await.expect("updated");
    assert_eq!(updated.director, None);
    assert_eq!(updated.year_time.as_deref(), Some("2006"));

    wait_until("refetch after update", || {
        !listing.is_fetching()
            && listing
                .items()
                .first()
                .map_or(false, |e| e.year_time.as_deref() == Some("2006"))
    })
    .await;

    // Delete through the confirmation dialog.
    table.request_delete(added.id);
    assert!(table.dialog().is_open());
    table
        .confirm_delete()
        .await
        .expect("a row was selected")
        .expect("deleted");
    assert!(!table.dialog().is_open());

    wait_until("refetch after delete", || {
        listing.status() == QueryStatus::Success
            && !listing.is_fetching()
            && !listing.items().is_empty()
            && !ids(&listing).contains(&added.id)
    })
    .await;
    assert!(table.mutation_error().is_none());
}

#[tokio::test]
async fn test_failed_mutations_are_reported() {
    let harness = start().await;

    let bad_url =
        NewFavorite::new("Alien", MediaType::Movie).with_text(TextField::PosterUrl, "nope");
    let err = harness.mutations.create(&bad_url).await.unwrap_err();
    match err {
        ClientError::Validation(fields) => assert_eq!(fields[0].field, "posterUrl"),
        other => panic!("expected validation error, got {:?}", other),
    }
    let feedback = harness.mutations.feedback().last_error.expect("feedback");
    assert!(feedback.starts_with("Create failed: posterUrl"), "{}", feedback);

    let err = harness.mutations.delete(424242).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(
        harness.mutations.feedback().last_error.as_deref(),
        Some("Delete failed: This entry no longer exists")
    );

    let err = harness.client.get(424242).await.unwrap_err();
    assert!(err.is_not_found());
}
