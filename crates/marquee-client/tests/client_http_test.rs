//! HTTP-level tests for `FavoritesClient` against a mock API.

use marquee_client::{ClientError, FavoritesClient};
use marquee_core::{FavoritePatch, MediaType, NewFavorite, TextField};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn entry_json(id: i64, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "type": "Movie",
        "director": null,
        "budget": null,
        "location": null,
        "duration": null,
        "yearTime": null,
        "posterUrl": null,
        "notes": null,
        "createdAt": "2026-01-01T00:00:00Z",
        "updatedAt": "2026-01-01T00:00:00Z"
    })
}

#[tokio::test]
async fn test_list_page_sends_limit_and_cursor() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .and(query_param("limit", "2"))
        .and(query_param("cursor", "9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [entry_json(8, "Heat"), entry_json(6, "Ronin")],
            "nextCursor": 6,
            "hasMore": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FavoritesClient::new(mock_server.uri());
    let page = client.list_page(2, Some(9)).await.expect("page");

    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].title, "Heat");
    assert_eq!(page.next_cursor, Some(6));
    assert!(page.has_more);
}

#[tokio::test]
async fn test_first_page_omits_cursor() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .and(query_param("limit", "15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [],
            "nextCursor": null,
            "hasMore": false
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FavoritesClient::new(mock_server.uri());
    let page = client.list_page(15, None).await.expect("page");
    assert!(page.data.is_empty());
    assert_eq!(page.next_cursor, None);

    let requests = mock_server.received_requests().await.expect("recording on");
    assert!(requests[0].url.query_pairs().all(|(k, _)| k != "cursor"));
}

#[tokio::test]
async fn test_create_posts_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/favorites"))
        .and(body_json(json!({
            "title": "Dark",
            "type": "TV Show",
            "location": "Germany"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(entry_json(1, "Dark")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FavoritesClient::new(mock_server.uri());
    let new = NewFavorite::new("Dark", MediaType::TvShow).with_text(TextField::Location, "Germany");
    let created = client.create(&new).await.expect("created");
    assert_eq!(created.id, 1);
}

#[tokio::test]
async fn test_update_sends_cleared_fields_as_null() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/favorites/4"))
        .and(body_json(json!({ "title": "Heat", "budget": null })))
        .respond_with(ResponseTemplate::new(200).set_body_json(entry_json(4, "Heat")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut patch = FavoritePatch {
        title: Some("Heat".into()),
        ..Default::default()
    };
    patch.set_text(TextField::Budget, None);

    let client = FavoritesClient::new(mock_server.uri());
    let updated = client.update(4, &patch).await.expect("updated");
    assert_eq!(updated.title, "Heat");
}

#[tokio::test]
async fn test_validation_error_maps_to_field_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/favorites"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Validation failed",
            "details": [
                { "field": "title", "message": "Title must not be empty" },
                { "field": "posterUrl", "message": "Must be a valid URL" }
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = FavoritesClient::new(mock_server.uri());
    let err = client
        .create(&NewFavorite::new("", MediaType::Movie))
        .await
        .unwrap_err();

    match err {
        ClientError::Validation(fields) => {
            assert_eq!(fields.len(), 2);
            assert_eq!(fields[0].field, "title");
            assert_eq!(fields[1].field, "posterUrl");
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_bad_request_without_details_is_http_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/favorites/7"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "Invalid id: 7" })),
        )
        .mount(&mock_server)
        .await;

    let client = FavoritesClient::new(mock_server.uri());
    let err = client
        .update(7, &FavoritePatch::default())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ClientError::Http {
            status: 400,
            message: "Invalid id: 7".into()
        }
    );
}

#[tokio::test]
async fn test_not_found_and_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/favorites/99"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "Favorite 99 not found" })),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/favorites/5"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "Server error" })))
        .mount(&mock_server)
        .await;

    let client = FavoritesClient::new(mock_server.uri());

    let err = client.delete(99).await.unwrap_err();
    assert_eq!(err, ClientError::NotFound("Favorite 99 not found".into()));
    assert!(err.is_not_found());

    let err = client.get(5).await.unwrap_err();
    assert_eq!(
        err,
        ClientError::Http {
            status: 500,
            message: "Server error".into()
        }
    );
}

#[tokio::test]
async fn test_delete_accepts_no_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/favorites/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FavoritesClient::new(mock_server.uri());
    client.delete(3).await.expect("deleted");
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/favorites/2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = FavoritesClient::new(mock_server.uri());
    let err = client.get(2).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}
