use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const SELECT_BY_USERNAME: &str = r#"
    SELECT id, username, email, full_name, password_hash, disabled, created_at
    FROM users
    WHERE username = ?1
"#;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    email: String,
    full_name: String,
    password_hash: String,
    disabled: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::from_string(&r.id)?,
            username: Username::new(r.username)?,
            email: EmailAddress::new(r.email)?,
            full_name: r.full_name,
            password_hash: r.password_hash,
            disabled: r.disabled,
            created_at: r.created_at,
        })
    }
}

impl From<UserRow> for auth::StoredCredential {
    fn from(r: UserRow) -> Self {
        auth::StoredCredential::new(r.username, r.password_hash)
            .with_email(r.email)
            .with_full_name(r.full_name)
            .disabled(r.disabled)
    }
}

/// SQLite-backed user persistence.
///
/// Serves both the user domain and the auth core's credential lookups.
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, full_name, password_hash, disabled, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(user.id.to_string())
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(user.full_name.as_str())
        .bind(user.password_hash.as_str())
        .bind(user.disabled)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return UserError::UsernameAlreadyExists(user.username.as_str().to_string());
                }
            }
            UserError::DatabaseError(e.to_string())
        })?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(SELECT_BY_USERNAME)
            .bind(username.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn set_disabled(&self, username: &Username, disabled: bool) -> Result<bool, UserError> {
        let result = sqlx::query("UPDATE users SET disabled = ?1 WHERE username = ?2")
            .bind(disabled)
            .bind(username.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl auth::UserStore for SqliteUserRepository {
    async fn lookup(&self, username: &str) -> Result<Option<auth::StoredCredential>, auth::StoreError> {
        let row = sqlx::query_as::<_, UserRow>(SELECT_BY_USERNAME)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "User store lookup failed");
                auth::StoreError::Unavailable(e.to_string())
            })?;

        Ok(row.map(auth::StoredCredential::from))
    }
}

#[cfg(test)]
mod tests {
    use auth::UserStore;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    async fn pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    fn user(username: &str) -> User {
        User {
            id: UserId::new(),
            username: Username::new(username.to_string()).unwrap(),
            email: EmailAddress::new(format!("{}@example.com", username)).unwrap(),
            full_name: "John Doe".to_string(),
            password_hash: "$argon2id$test_hash".to_string(),
            disabled: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_by_username() {
        let repository = SqliteUserRepository::new(pool().await);
        let created = repository.create(user("johndoe")).await.unwrap();

        let found = repository
            .find_by_username(&created.username)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.id, created.id);
        assert_eq!(found.email.as_str(), "johndoe@example.com");
        assert_eq!(found.full_name, "John Doe");
        assert!(!found.disabled);
    }

    #[tokio::test]
    async fn test_find_unknown_username() {
        let repository = SqliteUserRepository::new(pool().await);
        let username = Username::new("nobody".to_string()).unwrap();

        assert!(repository.find_by_username(&username).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let repository = SqliteUserRepository::new(pool().await);
        repository.create(user("johndoe")).await.unwrap();

        let result = repository.create(user("johndoe")).await;
        assert!(matches!(result, Err(UserError::UsernameAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_set_disabled() {
        let repository = SqliteUserRepository::new(pool().await);
        let created = repository.create(user("johndoe")).await.unwrap();

        assert!(repository.set_disabled(&created.username, true).await.unwrap());

        let found = repository
            .find_by_username(&created.username)
            .await
            .unwrap()
            .unwrap();
        assert!(found.disabled);

        let ghost = Username::new("ghost".to_string()).unwrap();
        assert!(!repository.set_disabled(&ghost, true).await.unwrap());
    }

    #[tokio::test]
    async fn test_user_store_lookup() {
        let repository = SqliteUserRepository::new(pool().await);
        repository.create(user("johndoe")).await.unwrap();

        let credential = repository.lookup("johndoe").await.unwrap().unwrap();
        assert_eq!(credential.username, "johndoe");
        assert_eq!(credential.password_hash, "$argon2id$test_hash");
        assert_eq!(credential.full_name.as_deref(), Some("John Doe"));

        assert!(repository.lookup("nobody").await.unwrap().is_none());
        assert!(repository.lookup("not a valid username!").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_user_store_unavailable_when_pool_closed() {
        let pool = pool().await;
        let repository = SqliteUserRepository::new(pool.clone());
        pool.close().await;

        let result = repository.lookup("johndoe").await;
        assert!(matches!(result, Err(auth::StoreError::Unavailable(_))));
    }
}
