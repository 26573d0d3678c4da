//! Application configuration loaded from CLI, environment, and files.
//!
//! Values merge through ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.blogify.toml` in the current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `BLOGIFY_API_BASE`, `BLOGIFY_TOKEN`, ...
//! 4. **Command-line arguments** – `--api-base`/`-a`, `--token`/`-t`, ...
//!
//! # Configuration File
//!
//! ```toml
//! api_base = "https://blogify.example/api/"
//! token = "session-token"
//! feed = "following"
//! pages = 2
//! viewport_height = 900
//! ```

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::{Endpoint, FeedError, GatewaySettings, ItemId};
use crate::feed::ListKey;
use crate::virtualizer::{ListViewOptions, VirtualizerOptions};

/// Operation mode determined by CLI arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// Page through a feed.
    Feed,
    /// Load one post and its comment thread.
    PostThread,
}

/// The feed selected with `--feed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSelection {
    /// Posts for the signed-in user.
    Home,
    /// Posts from followed accounts.
    Following,
    /// Posts by one user.
    Profile(ItemId),
    /// Most liked posts.
    Top,
}

impl FeedSelection {
    /// List key the feed is stored under.
    #[must_use]
    pub fn list_key(&self) -> ListKey {
        match self {
            Self::Home => ListKey::Home,
            Self::Following => ListKey::Following,
            Self::Profile(user) => ListKey::Profile(user.clone()),
            Self::Top => ListKey::TopPosts,
        }
    }

    /// Endpoint serving the feed.
    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Home => Endpoint::home_feed(),
            Self::Following => Endpoint::following_feed(),
            Self::Profile(user) => Endpoint::profile_feed(user),
            Self::Top => Endpoint::top_posts(),
        }
    }
}

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Example
///
/// ```no_run
/// use blogify::BlogifyConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = BlogifyConfig::load().expect("failed to load configuration");
/// config.validate().expect("invalid configuration");
/// let settings = config.gateway_settings().expect("invalid API base");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "BLOGIFY",
    discovery(
        dotfile_name = ".blogify.toml",
        config_file_name = "blogify.toml",
        app_name = "blogify"
    )
)]
pub struct BlogifyConfig {
    /// Base URL of the Blogify API. Routes are joined onto it.
    ///
    /// Can be provided via:
    /// - CLI: `--api-base <URL>` or `-a <URL>`
    /// - Environment: `BLOGIFY_API_BASE`
    /// - Config file: `api_base = "..."`
    #[ortho_config(cli_short = 'a')]
    pub api_base: String,

    /// Session token sent as a bearer token.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `BLOGIFY_TOKEN`
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Post whose comment thread should be loaded. Selects thread mode.
    #[ortho_config(cli_short = 'p')]
    pub post_id: Option<String>,

    /// Feed to load: `home`, `following`, `profile` or `top`.
    #[ortho_config(cli_short = 'f')]
    pub feed: Option<String>,

    /// User whose posts the `profile` feed shows.
    #[ortho_config(cli_short = 'u')]
    pub user_id: Option<String>,

    /// Number of pages to load before printing.
    #[ortho_config(cli_short = 'n')]
    pub pages: u32,

    /// Per-request timeout, in seconds.
    #[ortho_config()]
    pub request_timeout_seconds: u64,

    /// Viewport height used for windowing and skeleton counts.
    #[ortho_config()]
    pub viewport_height: u32,

    /// Size assumed for rows before they are measured.
    #[ortho_config()]
    pub estimated_row_height: u32,

    /// Rows rendered beyond each edge of the viewport.
    #[ortho_config()]
    pub overscan: usize,

    /// Quiet period before scroll snapshots are persisted, in milliseconds.
    #[ortho_config()]
    pub snapshot_debounce_ms: u64,

    /// Maximum reply length in characters.
    #[ortho_config()]
    pub reply_max_length: usize,

    /// Writes telemetry events to stderr as JSON lines.
    #[ortho_config()]
    pub telemetry: bool,
}

const DEFAULT_API_BASE: &str = "http://localhost:5000/api/";
const DEFAULT_PAGES: u32 = 1;
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_VIEWPORT_HEIGHT: u32 = 800;
const DEFAULT_ESTIMATED_ROW_HEIGHT: u32 = 120;
const DEFAULT_OVERSCAN: usize = 3;
const DEFAULT_SNAPSHOT_DEBOUNCE_MS: u64 = 500;

impl Default for BlogifyConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_owned(),
            token: None,
            post_id: None,
            feed: None,
            user_id: None,
            pages: DEFAULT_PAGES,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            estimated_row_height: DEFAULT_ESTIMATED_ROW_HEIGHT,
            overscan: DEFAULT_OVERSCAN,
            snapshot_debounce_ms: DEFAULT_SNAPSHOT_DEBOUNCE_MS,
            reply_max_length: crate::thread::DEFAULT_REPLY_MAX_LENGTH,
            telemetry: false,
        }
    }
}

impl BlogifyConfig {
    /// Determines the operation mode: a post ID selects thread mode.
    #[must_use]
    pub const fn operation_mode(&self) -> OperationMode {
        if self.post_id.is_some() {
            OperationMode::PostThread
        } else {
            OperationMode::Feed
        }
    }

    /// Checks that the configured values are usable together.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Configuration`] for zero sizes, a zero timeout, a
    /// zero reply length, zero pages, or an unknown feed.
    pub fn validate(&self) -> Result<(), FeedError> {
        let zero_field = [
            ("pages", u64::from(self.pages)),
            ("request_timeout_seconds", self.request_timeout_seconds),
            ("viewport_height", u64::from(self.viewport_height)),
            ("estimated_row_height", u64::from(self.estimated_row_height)),
            (
                "reply_max_length",
                u64::try_from(self.reply_max_length).unwrap_or(u64::MAX),
            ),
        ]
        .into_iter()
        .find_map(|(name, value)| (value == 0).then_some(name));

        if let Some(name) = zero_field {
            return Err(configuration(format!("{name} must be greater than zero")));
        }
        if self.operation_mode() == OperationMode::Feed {
            self.feed_selection()?;
        }
        Ok(())
    }

    /// Resolves `feed` and `user_id` into a feed.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Configuration`] for unknown feed names, or for
    /// the profile feed without a user.
    pub fn feed_selection(&self) -> Result<FeedSelection, FeedError> {
        match self.feed.as_deref().unwrap_or("home") {
            "home" => Ok(FeedSelection::Home),
            "following" => Ok(FeedSelection::Following),
            "top" => Ok(FeedSelection::Top),
            "profile" => self
                .user_id
                .as_deref()
                .map(|user| FeedSelection::Profile(ItemId::new(user)))
                .ok_or_else(|| configuration("the profile feed needs a user (use --user-id or -u)")),
            other => Err(configuration(format!(
                "unknown feed '{other}' (expected home, following, profile or top)"
            ))),
        }
    }

    /// Returns the configured post ID.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Configuration`] when no post is configured.
    pub fn require_post_id(&self) -> Result<ItemId, FeedError> {
        self.post_id
            .as_deref()
            .map(ItemId::new)
            .ok_or_else(|| configuration("post ID is required (use --post-id or -p)"))
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Settings for the HTTP gateway.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidUrl`] when `api_base` does not parse.
    pub fn gateway_settings(&self) -> Result<GatewaySettings, FeedError> {
        let api_base = Url::parse(&self.api_base)
            .map_err(|error| FeedError::InvalidUrl(format!("{}: {error}", self.api_base)))?;
        Ok(GatewaySettings {
            api_base,
            token: self.token.clone(),
            timeout: self.request_timeout(),
        })
    }

    /// Options for list views.
    #[must_use]
    pub const fn list_view_options(&self, create_slot: bool) -> ListViewOptions {
        ListViewOptions {
            layout: VirtualizerOptions {
                estimated_size: self.estimated_row_height,
                overscan: self.overscan,
            },
            viewport: self.viewport_height,
            create_slot,
            snapshot_debounce: Duration::from_millis(self.snapshot_debounce_ms),
        }
    }
}

fn configuration(message: impl Into<String>) -> FeedError {
    FeedError::Configuration {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests;
