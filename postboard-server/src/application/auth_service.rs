use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::data::user_repository::UserRepository;
use crate::domain::error::{DomainError, FieldErrors};
use crate::domain::user::User;
use crate::infrastructure::security::{JwtKeys, hash_password, verify_password};

#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn UserRepository>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(repo: Arc<dyn UserRepository>, keys: JwtKeys) -> Self {
        Self { repo, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))
    }

    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, DomainError> {
        let mut errors = FieldErrors::default();
        if !is_valid_username(username.trim()) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }
        if !email.contains('@') {
            errors.add("email", "Enter a valid email address.");
        }
        if password.len() < 8 {
            errors.add("password", "Password must contain at least 8 characters.");
        }
        errors.into_result()?;

        let hash =
            hash_password(password).map_err(|err| DomainError::Internal(err.to_string()))?;
        let user = User::new(username.trim().to_string(), email.to_lowercase(), hash);
        let user = self.repo.create(user).await?;

        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Issues a token for `username` (an email address is accepted too).
    ///
    /// Usernames may contain `@`, so the username lookup always runs first.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<String, DomainError> {
        let mut found = self.repo.find_by_username(username).await?;
        if found.is_none() && username.contains('@') {
            found = self.repo.find_by_email(&username.to_lowercase()).await?;
        }
        let user = found.ok_or(DomainError::Unauthorized)?;

        let valid = verify_password(password, &user.password_hash)
            .map_err(|_| DomainError::Unauthorized)?;
        if !valid {
            return Err(DomainError::Unauthorized);
        }

        self.keys
            .generate_token(user.id)
            .map_err(|err| DomainError::Internal(err.to_string()))
    }
}

const USERNAME_MAX_LEN: usize = 150;

/// Letters, digits and `@ . + - _`, at most 150 characters.
fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.chars().count() <= USERNAME_MAX_LEN
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryStore;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryStore::new()),
            JwtKeys::new("test-secret".into()),
        )
    }

    #[tokio::test]
    async fn register_then_login_issues_a_verifiable_token() {
        let auth = service();
        let user = auth
            .register("reader", "Reader@Example.com", "correct horse")
            .await
            .unwrap();
        assert_eq!(user.email, "reader@example.com");

        let token = auth.login("reader", "correct horse").await.unwrap();
        let claims = auth.keys().verify_token(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());

        assert!(auth.login("reader@example.com", "correct horse").await.is_ok());
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let auth = service();
        auth.register("reader", "reader@example.com", "correct horse")
            .await
            .unwrap();

        let result = auth.login("reader", "battery staple").await;
        assert!(matches!(result, Err(DomainError::Unauthorized)));
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let auth = service();
        auth.register("reader", "a@example.com", "correct horse")
            .await
            .unwrap();

        let result = auth.register("reader", "b@example.com", "correct horse").await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn username_with_at_sign_logs_in_by_username() {
        let auth = service();
        let user = auth
            .register("bob@home", "bob@example.com", "correct horse")
            .await
            .unwrap();

        let token = auth.login("bob@home", "correct horse").await.unwrap();
        assert_eq!(auth.keys().verify_token(&token).unwrap().sub, user.id.to_string());
        assert!(auth.login("Bob@Example.com", "correct horse").await.is_ok());
    }

    #[tokio::test]
    async fn usernames_outside_the_allowed_characters_are_rejected() {
        let auth = service();
        let too_long = "x".repeat(151);
        for name in ["", "a/b", "who?", "hash#tag", "two words", too_long.as_str()] {
            match auth.register(name, "a@example.com", "correct horse").await {
                Err(DomainError::Validation(errors)) => {
                    assert!(errors.get("username").is_some(), "{name:?}")
                }
                other => panic!("expected validation error for {name:?}, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn short_password_is_a_validation_error() {
        let result = service().register("reader", "a@example.com", "short").await;
        match result {
            Err(DomainError::Validation(errors)) => assert!(errors.get("password").is_some()),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
