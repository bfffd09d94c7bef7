#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use postboard_server::application::pagination::Paginator;
use postboard_server::application::response_cache::ResponseCache;
use postboard_server::data::Repositories;
use postboard_server::data::group_repository::GroupRepository;
use postboard_server::data::memory::MemoryStore;
use postboard_server::data::post_repository::PostRepository;
use postboard_server::data::user_repository::UserRepository;
use postboard_server::domain::group::{Group, NewGroup};
use postboard_server::domain::post::{NewPost, Post, PostFilter};
use postboard_server::domain::user::User;
use postboard_server::infrastructure::cache::MemoryCacheBackend;
use postboard_server::infrastructure::media::FileSystemStorage;
use postboard_server::infrastructure::security::JwtKeys;
use postboard_server::presentation::utils::ViewSettings;
use postboard_server::server::AppState;
use tempfile::TempDir;

pub const SMALL_GIF: &[u8] = b"\x47\x49\x46\x38\x39\x61\x02\x00\x01\x00\x80\x00\x00\x00\x00\x00\
\xFF\xFF\xFF\x21\xF9\x04\x00\x00\x00\x00\x00\x2C\x00\x00\x00\x00\x02\x00\x01\x00\x00\x02\x02\x0C\
\x0A\x00\x3B";

/// An application over the in-memory store with a real response cache and a
/// throwaway media directory.
pub struct TestEnv {
    pub store: Arc<MemoryStore>,
    pub cache: ResponseCache,
    pub keys: JwtKeys,
    pub media: TempDir,
    pub state: AppState,
}

impl TestEnv {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let cache = ResponseCache::new(Arc::new(MemoryCacheBackend::new(100)));
        let keys = JwtKeys::new("integration-secret".into());
        let media = tempfile::tempdir().expect("temp media dir");

        let settings = ViewSettings {
            paginator: Paginator::new(10),
            index_cache_ttl: Duration::from_secs(20),
            login_url: "/auth/login/".into(),
        };
        let state = AppState::new(
            Repositories::memory(store.clone()),
            keys.clone(),
            Arc::new(FileSystemStorage::new(media.path())),
            cache.clone(),
            settings,
        );

        Self {
            store,
            cache,
            keys,
            media,
            state,
        }
    }

    pub async fn user(&self, username: &str) -> User {
        UserRepository::create(
            &*self.store,
            User::new(
                username.to_string(),
                format!("{username}@example.com"),
                String::new(),
            ),
        )
        .await
        .expect("create user")
    }

    pub fn bearer(&self, user: &User) -> String {
        let token = self.keys.generate_token(user.id).expect("token");
        format!("Bearer {token}")
    }

    pub async fn group(&self, slug: &str) -> Group {
        GroupRepository::create(
            &*self.store,
            NewGroup {
                title: format!("Group {slug}"),
                slug: slug.to_string(),
                description: "test group".into(),
            },
        )
        .await
        .expect("create group")
    }

    pub async fn post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        PostRepository::create(
            &*self.store,
            NewPost {
                author_id: author.id,
                text: text.to_string(),
                group_id: group.map(|g| g.id),
                image: None,
            },
        )
        .await
        .expect("create post")
    }

    pub async fn all_posts(&self) -> Vec<Post> {
        PostRepository::find_posts(&*self.store, &PostFilter::All)
            .await
            .expect("list posts")
    }

    pub async fn fetch_post(&self, id: i64) -> Post {
        PostRepository::find_by_id(&*self.store, id)
            .await
            .expect("find post")
            .expect("post exists")
    }
}
