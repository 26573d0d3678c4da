//! `reqwest` implementation of the feed and mutation gateways.

use std::time::Duration;

use async_trait::async_trait;
use http::Method;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::endpoint::{Endpoint, join_segments};
use crate::api::error::FeedError;
use crate::api::models::{ApiComment, ApiPost, ApiUser, Comment, Item, ItemId, ItemKind, Post};

use super::error_mapping::{
    extract_api_message, map_decode_error, map_http_error, map_transport_error,
};
use super::{FeedGateway, LikeTarget, MutationGateway, NewReply};

/// Connection settings for [`HttpGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySettings {
    /// Base URL every route is joined onto.
    pub api_base: Url,
    /// Optional bearer token for the session.
    pub token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Request body shared by every paginated list route.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageRequestBody {
    page_number: u32,
}

#[derive(Debug, Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyBody<'a> {
    body: &'a str,
    replies_to: &'a ItemId,
}

/// Gateway issuing JSON requests to the Blogify API.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    api_base: Url,
    token: Option<String>,
}

impl HttpGateway {
    /// Builds a gateway for the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Configuration`] when the HTTP client cannot be
    /// constructed.
    pub fn new(settings: &GatewaySettings) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|error| FeedError::Configuration {
                message: format!("build HTTP client failed: {error}"),
            })?;

        Ok(Self {
            client,
            api_base: settings.api_base.clone(),
            token: settings.token.clone(),
        })
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match self.token.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn route(&self, segments: &[&str]) -> Result<Url, FeedError> {
        join_segments(&self.api_base, segments)
    }

    /// Sends a request and converts non-success statuses into errors.
    async fn send(operation: &str, builder: RequestBuilder) -> Result<Response, FeedError> {
        let response = builder
            .send()
            .await
            .map_err(|error| map_transport_error(operation, &error))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.ok();
        Err(map_http_error(
            operation,
            status,
            body.as_deref().and_then(extract_api_message),
        ))
    }

    async fn decode<T: DeserializeOwned>(
        operation: &str,
        response: Response,
    ) -> Result<T, FeedError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|error| map_transport_error(operation, &error))?;
        serde_json::from_slice(&bytes).map_err(|error| map_decode_error(operation, &error))
    }

    async fn decode_page(
        operation: &str,
        kind: ItemKind,
        response: Response,
    ) -> Result<Vec<Item>, FeedError> {
        let items = match kind {
            ItemKind::Post => Self::decode::<Vec<ApiPost>>(operation, response)
                .await?
                .into_iter()
                .map(|post| Item::Post(post.into()))
                .collect(),
            ItemKind::Comment => Self::decode::<Vec<ApiComment>>(operation, response)
                .await?
                .into_iter()
                .map(|comment| Item::Comment(comment.into()))
                .collect(),
            ItemKind::User => Self::decode::<Vec<ApiUser>>(operation, response)
                .await?
                .into_iter()
                .map(|user| Item::User(user.into()))
                .collect(),
        };
        Ok(items)
    }

    fn like_route(target: &LikeTarget) -> [&str; 3] {
        match target {
            LikeTarget::Post(id) => ["posts", id.as_str(), "like"],
            LikeTarget::Comment(id) => ["comments", id.as_str(), "like"],
        }
    }

    async fn delete(&self, operation: &str, segments: &[&str]) -> Result<(), FeedError> {
        let url = self.route(segments)?;
        Self::send(operation, self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}

#[async_trait]
impl FeedGateway for HttpGateway {
    async fn fetch_page(
        &self,
        endpoint: &Endpoint,
        page_number: u32,
    ) -> Result<Vec<Item>, FeedError> {
        let operation = format!("load {}", endpoint.path());
        let url = endpoint.resolve(&self.api_base)?;
        tracing::debug!("requesting page {page_number} of {url}");

        let builder = self
            .request(Method::POST, url)
            .json(&PageRequestBody { page_number });
        let response = Self::send(&operation, builder).await?;
        Self::decode_page(&operation, endpoint.kind(), response).await
    }

    async fn fetch_post(&self, id: &ItemId) -> Result<Post, FeedError> {
        let url = self.route(&["posts", id.as_str()])?;
        let response = Self::send("load post", self.request(Method::GET, url)).await?;
        let post: ApiPost = Self::decode("load post", response).await?;
        Ok(post.into())
    }
}

#[async_trait]
impl MutationGateway for HttpGateway {
    async fn set_like(&self, target: &LikeTarget, liked: bool) -> Result<(), FeedError> {
        let url = self.route(&Self::like_route(target))?;
        let method = if liked { Method::GET } else { Method::DELETE };
        Self::send("toggle like", self.request(method, url)).await?;
        Ok(())
    }

    async fn create_comment(&self, post_id: &ItemId, body: &str) -> Result<Comment, FeedError> {
        let url = self.route(&["posts", post_id.as_str(), "comments", "new"])?;
        let builder = self
            .request(Method::POST, url)
            .json(&CommentBody { body });
        let response = Self::send("create comment", builder).await?;
        let comment: ApiComment = Self::decode("create comment", response).await?;
        Ok(comment.into())
    }

    async fn create_reply(&self, reply: &NewReply) -> Result<Comment, FeedError> {
        let url = self.route(&["comments", reply.root_id.as_str(), "replies", "new"])?;
        let builder = self.request(Method::POST, url).json(&ReplyBody {
            body: &reply.body,
            replies_to: &reply.replies_to,
        });
        let response = Self::send("create reply", builder).await?;
        let comment: ApiComment = Self::decode("create reply", response).await?;
        Ok(comment.into())
    }

    async fn delete_comment(&self, id: &ItemId) -> Result<(), FeedError> {
        self.delete("delete comment", &["comments", id.as_str()]).await
    }

    async fn delete_reply(&self, id: &ItemId) -> Result<(), FeedError> {
        self.delete("delete reply", &["replies", id.as_str()]).await
    }

    async fn delete_post(&self, id: &ItemId) -> Result<(), FeedError> {
        self.delete("delete post", &["posts", id.as_str()]).await
    }
}
