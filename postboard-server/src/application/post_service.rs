use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::application::forms::{CommentForm, DecodedImage, INVALID_CHOICE_MESSAGE, PostForm};
use crate::data::comment_repository::CommentRepository;
use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::comment::{Comment, NewComment};
use crate::domain::error::{DomainError, FieldErrors};
use crate::domain::group::Group;
use crate::domain::post::{NewPost, Post, PostChanges};
use crate::domain::user::User;
use crate::infrastructure::media::MediaStorage;

/// Result of an edit attempt. Edits by anyone but the author leave the post untouched.
#[derive(Debug, Clone)]
pub enum EditOutcome {
    Updated(Post),
    NotOwner(Post),
}

impl EditOutcome {
    pub fn post(&self) -> &Post {
        match self {
            EditOutcome::Updated(post) | EditOutcome::NotOwner(post) => post,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: Post,
    pub author: User,
    pub author_posts_count: i64,
    pub group: Option<Group>,
    pub comments: Vec<Comment>,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
    users: Arc<dyn UserRepository>,
    comments: Arc<dyn CommentRepository>,
    media: Arc<dyn MediaStorage>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        groups: Arc<dyn GroupRepository>,
        users: Arc<dyn UserRepository>,
        comments: Arc<dyn CommentRepository>,
        media: Arc<dyn MediaStorage>,
    ) -> Self {
        Self {
            posts,
            groups,
            users,
            comments,
            media,
        }
    }

    pub async fn get_post(&self, id: i64) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::PostNotFound(id))
    }

    pub async fn post_detail(&self, id: i64) -> Result<PostDetail, DomainError> {
        let post = self.get_post(id).await?;
        let author = self
            .users
            .find_by_id(post.author_id)
            .await?
            .ok_or_else(|| DomainError::Internal(format!("post {id} has no author")))?;
        let author_posts_count = self.posts.count_by_author(author.id).await?;
        let group = match post.group_id {
            Some(group_id) => self.groups.find_by_id(group_id).await?,
            None => None,
        };
        let comments = self.comments.list_for_post(id).await?;

        Ok(PostDetail {
            post,
            author,
            author_posts_count,
            group,
            comments,
        })
    }

    #[instrument(skip(self, form), fields(group = ?form.group))]
    pub async fn create_post(&self, author_id: Uuid, form: PostForm) -> Result<Post, DomainError> {
        let image = self.clean_post_form(&form).await?;
        let image = match image {
            Some(decoded) => Some(self.store_image(decoded).await?),
            None => None,
        };

        let post = NewPost {
            author_id,
            text: form.text,
            group_id: form.group,
            image: image.clone(),
        };
        match self.posts.create(post).await {
            Ok(post) => Ok(post),
            Err(err) => {
                self.discard_image(image.as_deref()).await;
                Err(err)
            }
        }
    }

    /// Applies the edit when `editor_id` wrote the post; anyone else gets the
    /// post back unchanged.
    #[instrument(skip(self, form))]
    pub async fn edit_post(
        &self,
        editor_id: Uuid,
        post_id: i64,
        form: PostForm,
    ) -> Result<EditOutcome, DomainError> {
        let current = self.get_post(post_id).await?;
        if current.author_id != editor_id {
            warn!(post_id, editor_id = %editor_id, "edit by non-author ignored");
            return Ok(EditOutcome::NotOwner(current));
        }

        let image = self.clean_post_form(&form).await?;
        let image = match image {
            Some(decoded) => Some(self.store_image(decoded).await?),
            None => None,
        };
        let changes = PostChanges {
            text: form.text,
            group_id: form.group,
            image: image.clone(),
        };

        match self.posts.update(post_id, editor_id, changes).await {
            Ok(Some(updated)) => Ok(EditOutcome::Updated(updated)),
            Ok(None) => {
                self.discard_image(image.as_deref()).await;
                Ok(EditOutcome::NotOwner(current))
            }
            Err(err) => {
                self.discard_image(image.as_deref()).await;
                Err(err)
            }
        }
    }

    #[instrument(skip(self, form))]
    pub async fn add_comment(
        &self,
        author_id: Uuid,
        post_id: i64,
        form: CommentForm,
    ) -> Result<Comment, DomainError> {
        self.get_post(post_id).await?;
        form.clean().map_err(DomainError::Validation)?;

        let comment = self
            .comments
            .create(NewComment {
                post_id,
                author_id,
                text: form.text,
            })
            .await?;
        info!(comment_id = comment.id, post_id, "comment added");
        Ok(comment)
    }

    async fn clean_post_form(&self, form: &PostForm) -> Result<Option<DecodedImage>, DomainError> {
        let mut errors = FieldErrors::default();
        let image = match form.clean() {
            Ok(image) => image,
            Err(field_errors) => {
                errors.merge(field_errors);
                None
            }
        };
        if let Some(group_id) = form.group {
            if self.groups.find_by_id(group_id).await?.is_none() {
                errors.add("group", INVALID_CHOICE_MESSAGE);
            }
        }
        errors.into_result()?;
        Ok(image)
    }

    async fn store_image(&self, image: DecodedImage) -> Result<String, DomainError> {
        let name = format!("posts/{}.{}", Uuid::new_v4(), image.format.extension());
        self.media.save(&name, &image.bytes).await
    }

    /// Drops an upload whose post row was never written.
    async fn discard_image(&self, image: Option<&str>) {
        let Some(name) = image else {
            return;
        };
        if let Err(err) = self.media.delete(name).await {
            warn!(image = name, error = %err, "orphaned upload left behind");
        }
    }
}
