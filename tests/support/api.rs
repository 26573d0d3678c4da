//! Wire-format payloads and gateway wiring for tests run against Wiremock.

use std::time::Duration;

use blogify::{FeedError, GatewaySettings, HttpGateway};
use serde_json::{Value, json};
use url::Url;
use wiremock::MockServer;

/// Builds an [`HttpGateway`] pointed at the `/api` prefix of `server`.
///
/// # Errors
///
/// Returns an error when the server URI cannot be parsed or the client
/// cannot be built.
pub fn gateway_for(server: &MockServer) -> Result<HttpGateway, FeedError> {
    let api_base = Url::parse(&format!("{}/api/", server.uri()))
        .map_err(|error| FeedError::InvalidUrl(error.to_string()))?;
    HttpGateway::new(&GatewaySettings {
        api_base,
        token: Some("test-token".to_owned()),
        timeout: Duration::from_secs(5),
    })
}

/// Request body of a paginated list route.
#[must_use]
pub fn page_body(page_number: u32) -> Value {
    json!({ "pageNumber": page_number })
}

fn author(username: &str) -> Value {
    json!({ "id": format!("user-{username}"), "username": username, "name": username })
}

/// A post as the API returns it.
#[must_use]
pub fn post_json(id: &str, likes: u64, comments: u64) -> Value {
    json!({
        "id": id,
        "createdAt": "2026-01-05T10:00:00Z",
        "author": author("alice"),
        "body": format!("Post {id}"),
        "liked": false,
        "likes": likes,
        "comments": comments,
    })
}

/// Posts `post-<first>` onwards, `count` of them.
#[must_use]
pub fn posts_json(first: usize, count: usize) -> Value {
    Value::Array(
        (first..first.saturating_add(count))
            .map(|index| post_json(&format!("post-{index}"), 0, 0))
            .collect(),
    )
}

/// A top-level comment on `post-1` announcing `replies` replies.
#[must_use]
pub fn root_comment_json(id: &str, replies: u64) -> Value {
    json!({
        "id": id,
        "postId": "post-1",
        "createdAt": "2026-01-05T11:00:00Z",
        "author": author("bob"),
        "body": format!("Comment {id}"),
        "liked": false,
        "likes": 0,
        "replies": replies,
    })
}

/// A reply under `root_id` answering the root itself.
#[must_use]
pub fn reply_json(id: &str, root_id: &str) -> Value {
    json!({
        "id": id,
        "postId": "post-1",
        "createdAt": "2026-01-05T12:00:00Z",
        "author": author("carol"),
        "body": format!("Reply {id}"),
        "liked": false,
        "likes": 0,
        "replies": 0,
        "repliesTo": { "id": root_id, "username": "bob" },
        "rootId": root_id,
    })
}

/// Replies `<root>-r<first>` to `<root>-r<last>`.
#[must_use]
pub fn replies_json(root_id: &str, first: usize, last: usize) -> Value {
    Value::Array(
        (first..=last)
            .map(|number| reply_json(&format!("{root_id}-r{number}"), root_id))
            .collect(),
    )
}
