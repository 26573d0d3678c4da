//! Integration tests for like toggles shared across lists.

#[path = "support/api.rs"]
mod api;

use api::{gateway_for, page_body, post_json};
use blogify::{Endpoint, FeedError, FeedGateway, FeedStore, ItemId, ListKey, PaginatedList};
use rstest::rstest;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve_page(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(route))
        .and(body_json(page_body(0)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Loads the home and profile feeds, both holding `post-1`.
async fn store_with_shared_post(
    server: &MockServer,
    gateway: &dyn FeedGateway,
) -> FeedStore {
    serve_page(
        server,
        "/api/posts/home",
        json!([post_json("post-1", 4, 0), post_json("post-2", 0, 0)]),
    )
    .await;
    serve_page(server, "/api/users/user-alice/posts", json!([post_json("post-1", 4, 0)])).await;

    let alice = ItemId::new("user-alice");
    let mut store = FeedStore::new();
    for (key, endpoint) in [
        (ListKey::Home, Endpoint::home_feed()),
        (ListKey::Profile(alice.clone()), Endpoint::profile_feed(&alice)),
    ] {
        let mut list = PaginatedList::new(key, Some(endpoint));
        list.fetch_items(gateway).await;
        store.insert(list);
    }
    store
}

fn likes_in(store: &FeedStore, key: &ListKey) -> Option<(bool, u64)> {
    store
        .list(key)?
        .get(&ItemId::new("post-1"))?
        .like_state()
        .map(|like| (like.liked, like.likes))
}

#[rstest]
#[tokio::test]
async fn like_reaches_every_list_holding_the_post() -> Result<(), FeedError> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/posts/post-1/like"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let gateway = gateway_for(&server)?;
    let mut store = store_with_shared_post(&server, &gateway).await;

    let applied = store.toggle_like(&gateway, &ItemId::new("post-1")).await?;

    assert_eq!(applied.map(|like| like.likes), Some(5));
    let profile = ListKey::Profile(ItemId::new("user-alice"));
    assert_eq!(likes_in(&store, &ListKey::Home), Some((true, 5)));
    assert_eq!(likes_in(&store, &profile), Some((true, 5)));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn rejected_like_rolls_back_everywhere() -> Result<(), FeedError> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/posts/post-1/like"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "like service down" })),
        )
        .mount(&server)
        .await;
    let gateway = gateway_for(&server)?;
    let mut store = store_with_shared_post(&server, &gateway).await;

    let result = store.toggle_like(&gateway, &ItemId::new("post-1")).await;

    assert!(
        matches!(result, Err(FeedError::Api { status: 500, .. })),
        "unexpected result: {result:?}"
    );
    let profile = ListKey::Profile(ItemId::new("user-alice"));
    assert_eq!(likes_in(&store, &ListKey::Home), Some((false, 4)));
    assert_eq!(likes_in(&store, &profile), Some((false, 4)));
    Ok(())
}

fn listed_ids(store: &FeedStore, key: &ListKey) -> Vec<String> {
    store
        .list(key)
        .map(|list| {
            list.items()
                .iter()
                .map(|item| item.id().as_str().to_owned())
                .collect()
        })
        .unwrap_or_default()
}

#[rstest]
#[tokio::test]
async fn deleted_post_disappears_from_every_list() -> Result<(), FeedError> {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/posts/post-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let gateway = gateway_for(&server)?;
    let mut store = store_with_shared_post(&server, &gateway).await;

    assert!(store.delete_post(&gateway, &ItemId::new("post-1")).await?);

    let profile = ListKey::Profile(ItemId::new("user-alice"));
    assert_eq!(listed_ids(&store, &ListKey::Home), ["post-2"]);
    assert!(listed_ids(&store, &profile).is_empty());
    Ok(())
}

#[rstest]
#[tokio::test]
async fn rejected_post_deletion_restores_every_list() -> Result<(), FeedError> {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/posts/post-1"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({ "message": "already gone" })))
        .mount(&server)
        .await;
    let gateway = gateway_for(&server)?;
    let mut store = store_with_shared_post(&server, &gateway).await;

    let result = store.delete_post(&gateway, &ItemId::new("post-1")).await;

    assert!(
        matches!(result, Err(FeedError::Api { status: 409, .. })),
        "unexpected result: {result:?}"
    );
    let profile = ListKey::Profile(ItemId::new("user-alice"));
    assert_eq!(listed_ids(&store, &ListKey::Home), ["post-1", "post-2"]);
    assert_eq!(listed_ids(&store, &profile), ["post-1"]);
    Ok(())
}
