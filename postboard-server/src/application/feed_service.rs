use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::data::follow_repository::FollowRepository;
use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::group::Group;
use crate::domain::post::{Post, PostFilter};
use crate::domain::user::User;

/// Which posts a feed shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedMode {
    Global,
    ByGroup(String),
    ByAuthor(String),
    /// Posts of the authors the viewer follows.
    Following,
}

/// What a composed feed was scoped to, resolved while composing.
#[derive(Debug, Clone)]
pub enum FeedScope {
    Global,
    Group(Group),
    Author(User),
    Following(Uuid),
}

#[derive(Debug, Clone)]
pub struct Feed {
    pub scope: FeedScope,
    /// Newest first, no duplicates.
    pub posts: Vec<Post>,
}

#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        groups: Arc<dyn GroupRepository>,
        users: Arc<dyn UserRepository>,
        follows: Arc<dyn FollowRepository>,
    ) -> Self {
        Self {
            posts,
            groups,
            users,
            follows,
        }
    }

    /// Resolves the ordered posts for `mode`. `viewer` is only consulted by
    /// [`FeedMode::Following`], which fails with `Unauthorized` without one.
    #[instrument(skip(self))]
    pub async fn compose(&self, mode: &FeedMode, viewer: Option<Uuid>) -> Result<Feed, DomainError> {
        let (scope, filter) = match mode {
            FeedMode::Global => (FeedScope::Global, PostFilter::All),
            FeedMode::ByGroup(slug) => {
                let group = self
                    .groups
                    .find_by_slug(slug)
                    .await?
                    .ok_or_else(|| DomainError::GroupNotFound(slug.clone()))?;
                let filter = PostFilter::Group(group.id);
                (FeedScope::Group(group), filter)
            }
            FeedMode::ByAuthor(username) => {
                let author = self
                    .users
                    .find_by_username(username)
                    .await?
                    .ok_or_else(|| DomainError::UserNotFound(username.clone()))?;
                let filter = PostFilter::Author(author.id);
                (FeedScope::Author(author), filter)
            }
            FeedMode::Following => {
                let viewer = viewer.ok_or(DomainError::Unauthorized)?;
                let mut authors = self.follows.list_follows(viewer).await?;
                authors.sort_unstable();
                authors.dedup();
                if authors.is_empty() {
                    return Ok(Feed {
                        scope: FeedScope::Following(viewer),
                        posts: Vec::new(),
                    });
                }
                (FeedScope::Following(viewer), PostFilter::Authors(authors))
            }
        };

        let posts = newest_first(self.posts.find_posts(&filter).await?);
        debug!(posts = posts.len(), "feed composed");

        Ok(Feed { scope, posts })
    }
}

/// Orders by id descending and drops repeated ids.
fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.id.cmp(&a.id));
    let mut seen = HashSet::with_capacity(posts.len());
    posts.retain(|post| seen.insert(post.id));
    posts
}
