//! User directory service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use goty_common::{AppError, AppResult, IdGenerator};
use goty_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

/// Default page size for the admin user listing.
const DEFAULT_PAGE_SIZE: u64 = 20;

/// Upper bound on page size for the admin user listing.
const MAX_PAGE_SIZE: u64 = 100;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for registering a new user.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 3, max = 32))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// One page of users.
#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<user::Model>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

/// Aggregate user counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserStats {
    pub total: u64,
    pub verified: u64,
    pub unverified: u64,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user with a fresh API token.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        if !input
            .username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(AppError::BadRequest(
                "Username may only contain letters, digits and underscores".to_string(),
            ));
        }

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let email = input.email.to_lowercase();
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username_lower: Set(input.username.to_lowercase()),
            username: Set(input.username),
            email: Set(email),
            password_hash: Set(password_hash),
            token: Set(Some(self.id_gen.generate_token())),
            roles: Set(serde_json::json!([])),
            is_verified: Set(false),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        info!(user_id = %user.id, username = %user.username, "Registered user");

        Ok(user)
    }

    /// Check credentials and return the user with a usable token.
    pub async fn signin(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        if user.token.is_some() {
            return Ok(user);
        }

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(self.id_gen.generate_token()));
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        self.user_repo.update(active).await
    }

    /// Authenticate a user by token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// List users page by page. Pages start at 1.
    pub async fn list_users(&self, page: Option<u64>, limit: Option<u64>) -> AppResult<UserPage> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

        let users = self
            .user_repo
            .find_page(limit, (page - 1).saturating_mul(limit))
            .await?;
        let total = self.user_repo.count().await?;

        Ok(UserPage {
            users,
            total,
            page,
            limit,
        })
    }

    /// Total, verified and unverified user counts.
    pub async fn stats(&self) -> AppResult<UserStats> {
        let total = self.user_repo.count().await?;
        let verified = self.user_repo.count_verified().await?;

        Ok(UserStats {
            total,
            verified,
            unverified: total.saturating_sub(verified),
        })
    }

    /// Mark a user as verified.
    pub async fn verify_user(&self, id: &str) -> AppResult<user::Model> {
        let user = self.user_repo.get_by_id(id).await?;

        if user.is_verified {
            return Err(AppError::Conflict(format!("User {id} is already verified")));
        }

        let verified = self.user_repo.mark_verified(user).await?;
        info!(user_id = %id, "Verified user");

        Ok(verified)
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, username: &str, password_hash: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            email: format!("{}@example.com", username.to_lowercase()),
            password_hash: password_hash.to_string(),
            token: Some("test_token".to_string()),
            roles: serde_json::json!([]),
            is_verified: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        maplit::btreemap! { "num_items" => sea_orm::Value::BigInt(Some(n)) }
    }

    fn create_service(db: MockDatabase) -> UserService {
        UserService::new(UserRepository::new(Arc::new(db.into_connection())))
    }

    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password_123").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("test_password_123", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("test", "invalid_hash").is_err());
    }

    #[tokio::test]
    async fn test_register_success() {
        let created = create_test_user("user1", "alice", "hash");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([[created]]);

        let service = create_service(db);
        let user = service
            .register(RegisterInput {
                username: "alice".to_string(),
                email: "Alice@Example.com".to_string(),
                password: "correct horse battery".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(user.username, "alice");
        assert!(user.token.is_some());
    }

    #[tokio::test]
    async fn test_register_taken_username_conflicts() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user("user1", "alice", "hash")]]);

        let service = create_service(db);
        let result = service
            .register(RegisterInput {
                username: "Alice".to_string(),
                email: "other@example.com".to_string(),
                password: "correct horse battery".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_invalid_email() {
        let service = create_service(MockDatabase::new(DatabaseBackend::Postgres));
        let result = service
            .register(RegisterInput {
                username: "alice".to_string(),
                email: "not-an-email".to_string(),
                password: "correct horse battery".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_signin_wrong_password_is_unauthorized() {
        let hash = hash_password("right_password").unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user("user1", "alice", &hash)]]);

        let service = create_service(db);
        let result = service.signin("alice", "wrong_password").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_signin_success_returns_token() {
        let hash = hash_password("right_password").unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user("user1", "alice", &hash)]]);

        let service = create_service(db);
        let user = service.signin("alice", "right_password").await.unwrap();

        assert_eq!(user.token.as_deref(), Some("test_token"));
    }

    #[tokio::test]
    async fn test_authenticate_by_unknown_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()]);

        let service = create_service(db);
        let result = service.authenticate_by_token("nope").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_list_users_pagination() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user("user3", "carol", "hash")]])
            .append_query_results([[count_row(3)]]);

        let service = create_service(db);
        let page = service.list_users(Some(2), Some(2)).await.unwrap();

        assert_eq!(page.users.len(), 1);
        assert_eq!(page.total, 3);
        assert_eq!(page.page, 2);
        assert_eq!(page.limit, 2);
    }

    #[tokio::test]
    async fn test_stats() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(10)]])
            .append_query_results([[count_row(4)]]);

        let service = create_service(db);
        let stats = service.stats().await.unwrap();

        assert_eq!(
            stats,
            UserStats {
                total: 10,
                verified: 4,
                unverified: 6
            }
        );
    }

    #[tokio::test]
    async fn test_verify_already_verified_conflicts() {
        let verified = user::Model {
            is_verified: true,
            ..create_test_user("user1", "alice", "hash")
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[verified]]);

        let service = create_service(db);
        let result = service.verify_user("user1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
