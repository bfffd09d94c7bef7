//! In-process store used when no `DATABASE_URL` is configured, and by the tests.
//!
//! One `RwLock` guards every table so each call observes a single snapshot.

use std::collections::{BTreeMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::data::comment_repository::CommentRepository;
use crate::data::follow_repository::FollowRepository;
use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::comment::{Comment, NewComment};
use crate::domain::error::DomainError;
use crate::domain::follow::Follow;
use crate::domain::group::{Group, NewGroup};
use crate::domain::post::{NewPost, Post, PostChanges, PostFilter};
use crate::domain::user::User;

#[derive(Default)]
struct Tables {
    users: BTreeMap<Uuid, User>,
    groups: BTreeMap<i64, Group>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    follows: HashSet<Follow>,
    next_group_id: i64,
    next_post_id: i64,
    next_comment_id: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self, op: &'static str) -> Result<RwLockReadGuard<'_, Tables>, DomainError> {
        self.tables.read().map_err(|_| {
            warn!(op, lock_kind = "rwlock.read", "memory store lock poisoned");
            DomainError::Internal(format!("memory store poisoned during {op}"))
        })
    }

    fn write(&self, op: &'static str) -> Result<RwLockWriteGuard<'_, Tables>, DomainError> {
        self.tables.write().map_err(|_| {
            warn!(op, lock_kind = "rwlock.write", "memory store lock poisoned");
            DomainError::Internal(format!("memory store poisoned during {op}"))
        })
    }
}

fn matches(filter: &PostFilter, post: &Post) -> bool {
    match filter {
        PostFilter::All => true,
        PostFilter::Group(group_id) => post.group_id == Some(*group_id),
        PostFilter::Author(author_id) => post.author_id == *author_id,
        PostFilter::Authors(authors) => authors.contains(&post.author_id),
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create(&self, post: NewPost) -> Result<Post, DomainError> {
        let mut tables = self.write("post.create")?;
        let id = Tables::next_id(&mut tables.next_post_id);
        let created = Post {
            id,
            author_id: post.author_id,
            text: post.text,
            group_id: post.group_id,
            image: post.image,
            created_at: Utc::now(),
        };
        tables.posts.insert(id, created.clone());

        info!(post_id = id, author_id = %created.author_id, "post created");
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, DomainError> {
        Ok(self.read("post.find_by_id")?.posts.get(&id).cloned())
    }

    async fn find_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, DomainError> {
        let tables = self.read("post.find_posts")?;
        Ok(tables
            .posts
            .values()
            .rev()
            .filter(|post| matches(filter, post))
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: i64,
        author_id: Uuid,
        changes: PostChanges,
    ) -> Result<Option<Post>, DomainError> {
        let mut tables = self.write("post.update")?;
        let Some(post) = tables
            .posts
            .get_mut(&id)
            .filter(|post| post.author_id == author_id)
        else {
            return Ok(None);
        };

        post.text = changes.text;
        post.group_id = changes.group_id;
        if changes.image.is_some() {
            post.image = changes.image;
        }

        info!(post_id = id, "post updated");
        Ok(Some(post.clone()))
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<i64, DomainError> {
        let tables = self.read("post.count_by_author")?;
        let count = tables
            .posts
            .values()
            .filter(|post| post.author_id == author_id)
            .count();
        Ok(count as i64)
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn create(&self, group: NewGroup) -> Result<Group, DomainError> {
        let mut tables = self.write("group.create")?;
        if tables.groups.values().any(|g| g.slug == group.slug) {
            return Err(DomainError::Conflict(format!("group slug {}", group.slug)));
        }
        let id = Tables::next_id(&mut tables.next_group_id);
        let created = Group {
            id,
            title: group.title,
            slug: group.slug,
            description: group.description,
        };
        tables.groups.insert(id, created.clone());

        info!(group_id = id, slug = %created.slug, "group created");
        Ok(created)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError> {
        let tables = self.read("group.find_by_slug")?;
        Ok(tables.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, DomainError> {
        Ok(self.read("group.find_by_id")?.groups.get(&id).cloned())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut tables = self.write("user.create")?;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(DomainError::Conflict("email already registered".to_string()));
        }
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(DomainError::Conflict("username already taken".to_string()));
        }
        tables.users.insert(user.id, user.clone());

        info!(user_id = %user.id, username = %user.username, "user created");
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let tables = self.read("user.find_by_email")?;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let tables = self.read("user.find_by_username")?;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.read("user.find_by_id")?.users.get(&id).cloned())
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, comment: NewComment) -> Result<Comment, DomainError> {
        let mut tables = self.write("comment.create")?;
        if !tables.posts.contains_key(&comment.post_id) {
            return Err(DomainError::PostNotFound(comment.post_id));
        }
        let id = Tables::next_id(&mut tables.next_comment_id);
        let created = Comment {
            id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text,
            created_at: Utc::now(),
        };
        tables.comments.insert(id, created.clone());

        info!(comment_id = id, post_id = created.post_id, "comment created");
        Ok(created)
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        let tables = self.read("comment.list_for_post")?;
        Ok(tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn list_follows(&self, user_id: Uuid) -> Result<Vec<Uuid>, DomainError> {
        let tables = self.read("follow.list")?;
        Ok(tables
            .follows
            .iter()
            .filter(|follow| follow.user_id == user_id)
            .map(|follow| follow.author_id)
            .collect())
    }

    async fn create_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        let created = self
            .write("follow.create")?
            .follows
            .insert(Follow { user_id, author_id });
        if created {
            info!(user_id = %user_id, author_id = %author_id, "follow created");
        }
        Ok(created)
    }

    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        let removed = self
            .write("follow.delete")?
            .follows
            .remove(&Follow { user_id, author_id });
        if removed {
            info!(user_id = %user_id, author_id = %author_id, "follow deleted");
        }
        Ok(removed)
    }

    async fn exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        Ok(self
            .read("follow.exists")?
            .follows
            .contains(&Follow { user_id, author_id }))
    }
}
