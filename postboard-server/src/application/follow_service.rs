use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::data::follow_repository::FollowRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Followed,
    AlreadyFollowing,
    /// Following yourself is ignored.
    SelfFollow,
}

#[derive(Clone)]
pub struct FollowService {
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl FollowService {
    pub fn new(users: Arc<dyn UserRepository>, follows: Arc<dyn FollowRepository>) -> Self {
        Self { users, follows }
    }

    async fn author(&self, username: &str) -> Result<User, DomainError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(username.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn follow(&self, user_id: Uuid, username: &str) -> Result<FollowOutcome, DomainError> {
        let author = self.author(username).await?;
        if author.id == user_id {
            debug!("self-follow ignored");
            return Ok(FollowOutcome::SelfFollow);
        }

        if self.follows.create_follow(user_id, author.id).await? {
            Ok(FollowOutcome::Followed)
        } else {
            Ok(FollowOutcome::AlreadyFollowing)
        }
    }

    /// Returns whether a follow was removed.
    #[instrument(skip(self))]
    pub async fn unfollow(&self, user_id: Uuid, username: &str) -> Result<bool, DomainError> {
        let author = self.author(username).await?;
        self.follows.delete_follow(user_id, author.id).await
    }

    pub async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        if user_id == author_id {
            return Ok(false);
        }
        self.follows.exists(user_id, author_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryStore;

    async fn setup() -> (FollowService, User, User) {
        let store = Arc::new(MemoryStore::new());
        let service = FollowService::new(store.clone(), store.clone());
        let follower = UserRepository::create(
            &*store,
            User::new("follower".into(), "follower@example.com".into(), String::new()),
        )
        .await
        .unwrap();
        let following = UserRepository::create(
            &*store,
            User::new("following".into(), "following@example.com".into(), String::new()),
        )
        .await
        .unwrap();
        (service, follower, following)
    }

    #[tokio::test]
    async fn follow_is_idempotent() {
        let (service, follower, following) = setup().await;

        assert_eq!(
            service.follow(follower.id, "following").await.unwrap(),
            FollowOutcome::Followed
        );
        assert_eq!(
            service.follow(follower.id, "following").await.unwrap(),
            FollowOutcome::AlreadyFollowing
        );
        assert!(service.is_following(follower.id, following.id).await.unwrap());
    }

    #[tokio::test]
    async fn self_follow_is_a_no_op() {
        let (service, follower, _) = setup().await;

        assert_eq!(
            service.follow(follower.id, "follower").await.unwrap(),
            FollowOutcome::SelfFollow
        );
        assert!(!service.is_following(follower.id, follower.id).await.unwrap());
    }

    #[tokio::test]
    async fn unfollow_removes_the_link_once() {
        let (service, follower, following) = setup().await;
        service.follow(follower.id, "following").await.unwrap();

        assert!(service.unfollow(follower.id, "following").await.unwrap());
        assert!(!service.unfollow(follower.id, "following").await.unwrap());
        assert!(!service.is_following(follower.id, following.id).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_author_is_not_found() {
        let (service, follower, _) = setup().await;
        let result = service.follow(follower.id, "ghost").await;
        assert!(matches!(result, Err(DomainError::UserNotFound(name)) if name == "ghost"));
    }
}
