//! Application-level owner of every paginated list.
//!
//! The same post can sit in the home, following and profile feeds at once.
//! There is no shared source of truth between them, so mutations are written
//! to every list holding the item, synchronously, after they are applied.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::api::{FeedError, Item, ItemId, LikeState, LikeTarget, MutationGateway};
use crate::telemetry::{NoopTelemetrySink, TelemetryEvent, TelemetrySink};

use super::list::PaginatedList;

/// Identifies a logical list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListKey {
    /// Home feed.
    Home,
    /// Feed of followed accounts.
    Following,
    /// Posts of one user.
    Profile(ItemId),
    /// Top-level comments of one post.
    Comments(ItemId),
    /// Search results for one query.
    Search(String),
    /// Dashboard top posts.
    TopPosts,
}

impl fmt::Display for ListKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => formatter.write_str("home"),
            Self::Following => formatter.write_str("following"),
            Self::Profile(user) => write!(formatter, "profile:{user}"),
            Self::Comments(post) => write!(formatter, "comments:{post}"),
            Self::Search(query) => write!(formatter, "search:{query}"),
            Self::TopPosts => formatter.write_str("top-posts"),
        }
    }
}

/// An optimistic like toggle that can be rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeToggle {
    /// What is being liked.
    pub target: LikeTarget,
    /// State before the toggle.
    pub previous: LikeState,
    /// State after the toggle.
    pub next: LikeState,
}

/// An optimistic post deletion awaiting the server's answer.
///
/// Records where the post sat in each list it was removed from.
#[derive(Debug, Clone)]
pub struct PostDeletion {
    id: ItemId,
    removed: Vec<(ListKey, usize, Item)>,
}

impl PostDeletion {
    /// Deleted post.
    #[must_use]
    pub const fn id(&self) -> &ItemId {
        &self.id
    }

    /// Number of lists the post was removed from.
    #[must_use]
    pub fn list_count(&self) -> usize {
        self.removed.len()
    }
}

/// All lists known to the application.
pub struct FeedStore {
    lists: HashMap<ListKey, PaginatedList>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl fmt::Debug for FeedStore {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("FeedStore")
            .field("lists", &self.lists)
            .finish_non_exhaustive()
    }
}

impl Default for FeedStore {
    fn default() -> Self {
        Self {
            lists: HashMap::new(),
            telemetry: Arc::new(NoopTelemetrySink),
        }
    }
}

impl FeedStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes rollback events to `sink`.
    #[must_use]
    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = sink;
        self
    }

    /// Registers `list`, replacing any list with the same key.
    pub fn insert(&mut self, list: PaginatedList) {
        self.lists.insert(list.key().clone(), list);
    }

    /// Returns the list for `key`.
    #[must_use]
    pub fn list(&self, key: &ListKey) -> Option<&PaginatedList> {
        self.lists.get(key)
    }

    /// Returns the list for `key` mutably.
    pub fn list_mut(&mut self, key: &ListKey) -> Option<&mut PaginatedList> {
        self.lists.get_mut(key)
    }

    /// Removes the list for `key`.
    pub fn remove(&mut self, key: &ListKey) -> Option<PaginatedList> {
        self.lists.remove(key)
    }

    /// Writes `item` into every list that holds an item with its ID.
    ///
    /// Returns how many lists were updated.
    pub fn fan_out_update(&mut self, item: &Item) -> usize {
        self.lists
            .values_mut()
            .map(|list| list.update_item(item.clone()))
            .filter(|updated| *updated)
            .count()
    }

    /// Sets the like state of `id` in every list. Returns the lists touched.
    pub fn apply_like(&mut self, id: &ItemId, like: LikeState) -> usize {
        self.lists
            .values_mut()
            .map(|list| {
                list.modify_item(id, |item| {
                    item.set_like_state(like);
                })
            })
            .filter(|updated| *updated)
            .count()
    }

    /// Applies a like toggle for `id` everywhere and returns it for the
    /// network call, or `None` if no list holds a likeable item with `id`.
    pub fn begin_like_toggle(&mut self, id: &ItemId) -> Option<LikeToggle> {
        let item = self.lists.values().find_map(|list| list.get(id))?;
        let previous = item.like_state()?;
        let target = match item {
            Item::Post(_) => LikeTarget::Post(id.clone()),
            Item::Comment(_) => LikeTarget::Comment(id.clone()),
            Item::User(_) => return None,
        };

        let toggle = LikeToggle {
            target,
            previous,
            next: previous.toggled(),
        };
        self.apply_like(id, toggle.next);
        Some(toggle)
    }

    /// Restores the pre-toggle state in every list.
    pub fn rollback_like(&mut self, toggle: &LikeToggle) {
        tracing::warn!("rolling back like on {}", toggle.target.id());
        self.apply_like(toggle.target.id(), toggle.previous);
        self.telemetry.record(TelemetryEvent::MutationRolledBack {
            operation: "toggle_like".to_owned(),
            item_id: toggle.target.id().to_string(),
        });
    }

    /// Removes post `id` from every list holding it.
    ///
    /// Returns `None` when no list holds a post with `id`.
    pub fn begin_delete_post(&mut self, id: &ItemId) -> Option<PostDeletion> {
        let removed: Vec<(ListKey, usize, Item)> = self
            .lists
            .iter_mut()
            .filter(|(_, list)| matches!(list.get(id), Some(Item::Post(_))))
            .filter_map(|(key, list)| {
                let (index, item) = list.remove_item(id)?;
                Some((key.clone(), index, item))
            })
            .collect();
        if removed.is_empty() {
            return None;
        }
        tracing::debug!("removed post {id} from {} lists", removed.len());
        Some(PostDeletion {
            id: id.clone(),
            removed,
        })
    }

    /// Puts a deleted post back at its old position in each list.
    ///
    /// Lists dropped since, or that hold the post again, are skipped. Items
    /// loaded while the deletion was pending stay.
    pub fn rollback_delete_post(&mut self, deletion: PostDeletion) {
        tracing::warn!("rolling back deletion of post {}", deletion.id);
        for (key, index, item) in deletion.removed {
            let Some(list) = self.lists.get_mut(&key) else {
                continue;
            };
            if list.position(&deletion.id).is_none() {
                list.insert_item(index, item);
            }
        }
        self.telemetry.record(TelemetryEvent::MutationRolledBack {
            operation: "delete_post".to_owned(),
            item_id: deletion.id.to_string(),
        });
    }

    /// Deletes post `id` from every list optimistically and confirms it with
    /// the server, rolling back on failure.
    ///
    /// Returns false when no list holds the post.
    ///
    /// # Errors
    ///
    /// Returns the gateway error after the rollback has been applied.
    pub async fn delete_post(
        &mut self,
        gateway: &dyn MutationGateway,
        id: &ItemId,
    ) -> Result<bool, FeedError> {
        let Some(deletion) = self.begin_delete_post(id) else {
            return Ok(false);
        };

        match gateway.delete_post(id).await {
            Ok(()) => Ok(true),
            Err(error) => {
                self.rollback_delete_post(deletion);
                Err(error)
            }
        }
    }

    /// Toggles the like on `id` optimistically and confirms it with the
    /// server, rolling back on failure.
    ///
    /// Returns the state that ends up applied, or `None` when no list holds a
    /// likeable item with `id`.
    ///
    /// # Errors
    ///
    /// Returns the gateway error after the rollback has been applied.
    pub async fn toggle_like(
        &mut self,
        gateway: &dyn MutationGateway,
        id: &ItemId,
    ) -> Result<Option<LikeState>, FeedError> {
        let Some(toggle) = self.begin_like_toggle(id) else {
            return Ok(None);
        };

        match gateway.set_like(&toggle.target, toggle.next.liked).await {
            Ok(()) => Ok(Some(toggle.next)),
            Err(error) => {
                self.rollback_like(&toggle);
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::{always, eq};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::api::models::test_support::post;
    use crate::api::{Endpoint, MockMutationGateway};
    use crate::telemetry::test_support::RecordingTelemetrySink;

    #[fixture]
    fn store() -> FeedStore {
        let mut home = PaginatedList::new(ListKey::Home, Some(Endpoint::home_feed()));
        home.restore_items(vec![
            Item::Post(post("p1", 3, 0)),
            Item::Post(post("p2", 0, 0)),
        ]);

        let author = ItemId::new("user-alice");
        let mut profile =
            PaginatedList::new(ListKey::Profile(author.clone()), Some(Endpoint::profile_feed(&author)));
        profile.restore_items(vec![Item::Post(post("p1", 3, 0))]);

        let mut store = FeedStore::new();
        store.insert(home);
        store.insert(profile);
        store
    }

    fn like_of(store: &FeedStore, key: &ListKey, id: &str) -> Option<LikeState> {
        store
            .list(key)
            .and_then(|list| list.get(&ItemId::new(id)))
            .and_then(Item::like_state)
    }

    fn profile_key() -> ListKey {
        ListKey::Profile(ItemId::new("user-alice"))
    }

    #[rstest]
    #[tokio::test]
    async fn like_fans_out_to_every_list(mut store: FeedStore) {
        let mut gateway = MockMutationGateway::new();
        gateway
            .expect_set_like()
            .with(always(), eq(true))
            .times(1)
            .returning(|_, _| Ok(()));

        let applied = store
            .toggle_like(&gateway, &ItemId::new("p1"))
            .await
            .expect("like should succeed");

        let expected = LikeState {
            liked: true,
            likes: 4,
        };
        assert_eq!(applied, Some(expected));
        assert_eq!(like_of(&store, &ListKey::Home, "p1"), Some(expected));
        assert_eq!(like_of(&store, &profile_key(), "p1"), Some(expected));
    }

    #[rstest]
    #[tokio::test]
    async fn rejected_like_is_rolled_back_everywhere(mut store: FeedStore) {
        let mut gateway = MockMutationGateway::new();
        gateway.expect_set_like().times(1).returning(|_, _| {
            Err(FeedError::Network {
                message: "offline".to_owned(),
            })
        });

        let result = store.toggle_like(&gateway, &ItemId::new("p1")).await;

        assert!(result.is_err());
        let original = LikeState {
            liked: false,
            likes: 3,
        };
        assert_eq!(like_of(&store, &ListKey::Home, "p1"), Some(original));
        assert_eq!(like_of(&store, &profile_key(), "p1"), Some(original));
    }

    fn ids(store: &FeedStore, key: &ListKey) -> Vec<String> {
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
    async fn deleted_post_leaves_every_list(mut store: FeedStore) {
        let mut gateway = MockMutationGateway::new();
        gateway
            .expect_delete_post()
            .with(eq(ItemId::new("p1")))
            .times(1)
            .returning(|_| Ok(()));

        let deleted = store
            .delete_post(&gateway, &ItemId::new("p1"))
            .await
            .expect("delete should succeed");

        assert!(deleted);
        assert_eq!(ids(&store, &ListKey::Home), ["p2"]);
        assert!(ids(&store, &profile_key()).is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn rejected_post_deletion_restores_positions(store: FeedStore) {
        let telemetry = Arc::new(RecordingTelemetrySink::default());
        let mut store = store.with_telemetry(Arc::clone(&telemetry) as _);
        let mut gateway = MockMutationGateway::new();
        gateway.expect_delete_post().times(1).returning(|_| {
            Err(FeedError::Api {
                status: 403,
                message: "not yours".to_owned(),
            })
        });

        let result = store.delete_post(&gateway, &ItemId::new("p1")).await;

        assert!(result.is_err());
        assert_eq!(ids(&store, &ListKey::Home), ["p1", "p2"]);
        assert_eq!(ids(&store, &profile_key()), ["p1"]);
        assert_eq!(
            telemetry.events(),
            [TelemetryEvent::MutationRolledBack {
                operation: "delete_post".to_owned(),
                item_id: "p1".to_owned(),
            }]
        );
    }

    #[rstest]
    fn post_deletion_rollback_keeps_items_loaded_meanwhile(mut store: FeedStore) {
        let deletion = store
            .begin_delete_post(&ItemId::new("p1"))
            .expect("p1 is listed");
        assert_eq!(deletion.list_count(), 2);
        if let Some(home) = store.list_mut(&ListKey::Home) {
            let request = home.request_next_page().expect("home has an endpoint");
            home.complete_page(request, Ok(vec![Item::Post(post("p3", 0, 0))]));
        }

        store.rollback_delete_post(deletion);

        assert_eq!(ids(&store, &ListKey::Home), ["p1", "p2", "p3"]);
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_an_unlisted_post_skips_the_server(mut store: FeedStore) {
        let gateway = MockMutationGateway::new();

        let deleted = store
            .delete_post(&gateway, &ItemId::new("nope"))
            .await
            .expect("nothing to send");

        assert!(!deleted);
    }

    #[rstest]
    fn fan_out_update_counts_lists(mut store: FeedStore) {
        let edited = Item::Post(post("p1", 3, 8));

        assert_eq!(store.fan_out_update(&edited), 2);
        assert_eq!(store.fan_out_update(&Item::Post(post("p2", 0, 1))), 1);
    }

    #[rstest]
    fn unknown_items_are_not_toggled(mut store: FeedStore) {
        assert!(store.begin_like_toggle(&ItemId::new("nope")).is_none());
    }

    #[test]
    fn list_keys_render_for_telemetry() {
        assert_eq!(ListKey::Comments(ItemId::new("p1")).to_string(), "comments:p1");
        assert_eq!(ListKey::TopPosts.to_string(), "top-posts");
    }
}
