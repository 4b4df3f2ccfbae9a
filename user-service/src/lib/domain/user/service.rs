use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    password_hasher: auth::PasswordHasher,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `password_hasher` - Hasher configured with the deployment's scheme
    ///
    /// # Returns
    /// Configured user service instance
    pub fn new(repository: Arc<UR>, password_hasher: auth::PasswordHasher) -> Self {
        Self {
            repository,
            password_hasher,
        }
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError> {
        let password_hash = self.password_hasher.hash(&command.password)?;

        let user = User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            full_name: command.full_name,
            password_hash,
            disabled: false,
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(user_id = %created_user.id, username = %created_user.username, "User registered");

        Ok(created_user)
    }

    async fn get_user_by_username(&self, username: &Username) -> Result<User, UserError> {
        self.repository
            .find_by_username(username)
            .await?
            .ok_or(UserError::NotFoundByUsername(username.to_string()))
    }

    async fn set_disabled(&self, username: &Username, disabled: bool) -> Result<(), UserError> {
        if !self.repository.set_disabled(username, disabled).await? {
            return Err(UserError::NotFoundByUsername(username.to_string()));
        }

        tracing::info!(username = %username, disabled, "User disabled flag updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;

    use super::*;
    use crate::domain::user::models::EmailAddress;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;
            async fn set_disabled(&self, username: &Username, disabled: bool) -> Result<bool, UserError>;
        }
    }

    fn hasher() -> auth::PasswordHasher {
        auth::PasswordHasher::with_scheme(auth::HashScheme::Argon2id {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    fn command(username: &str, email: &str, password: &str) -> CreateUserCommand {
        CreateUserCommand::new(
            Username::new(username.to_string()).unwrap(),
            EmailAddress::new(email.to_string()).unwrap(),
            "Test User".to_string(),
            password.to_string(),
        )
    }

    fn stored_user(username: &str) -> User {
        User {
            id: UserId::new(),
            username: Username::new(username.to_string()).unwrap(),
            email: EmailAddress::new(format!("{}@example.com", username)).unwrap(),
            full_name: "Test User".to_string(),
            password_hash: "$argon2id$test_hash".to_string(),
            disabled: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_user_success() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_create()
            .withf(|user| {
                user.username.as_str() == "testuser"
                    && user.email.as_str() == "test@example.com"
                    && user.full_name == "Test User"
                    && !user.disabled
                    && user.password_hash.starts_with("$argon2id$")
            })
            .times(1)
            .returning(|user| Ok(user));

        let service = UserService::new(Arc::new(repository), hasher());

        let user = service
            .create_user(command("testuser", "test@example.com", "password123"))
            .await
            .unwrap();

        assert_eq!(user.username.as_str(), "testuser");
        assert!(!user.password_hash.contains("password123"));
        assert!(hasher().verify("password123", &user.password_hash));
    }

    #[tokio::test]
    async fn test_create_user_with_bcrypt_scheme() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_create()
            .withf(|user| user.password_hash.starts_with("$2b$"))
            .times(1)
            .returning(|user| Ok(user));

        let bcrypt = auth::PasswordHasher::with_scheme(auth::HashScheme::Bcrypt { cost: 4 }).unwrap();
        let service = UserService::new(Arc::new(repository), bcrypt);

        let result = service
            .create_user(command("testuser", "test@example.com", "password123"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_user_duplicate_username() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_create().times(1).returning(|user| {
            Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ))
        });

        let service = UserService::new(Arc::new(repository), hasher());

        let result = service
            .create_user(command("testuser", "test2@example.com", "password456"))
            .await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::UsernameAlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_get_user_by_username_success() {
        let mut repository = MockTestUserRepository::new();

        let username = Username::new("testuser".to_string()).unwrap();
        let returned_user = stored_user("testuser");
        let username_clone = username.clone();
        repository
            .expect_find_by_username()
            .withf(move |u| u == &username_clone)
            .times(1)
            .returning(move |_| Ok(Some(returned_user.clone())));

        let service = UserService::new(Arc::new(repository), hasher());

        let user = service.get_user_by_username(&username).await.unwrap();
        assert_eq!(user.username.as_str(), "testuser");
    }

    #[tokio::test]
    async fn test_get_user_by_username_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository), hasher());

        let username = Username::new("nonexistent".to_string()).unwrap();
        let result = service.get_user_by_username(&username).await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::NotFoundByUsername(_)
        ));
    }

    #[tokio::test]
    async fn test_set_disabled() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_set_disabled()
            .withf(|u, disabled| u.as_str() == "testuser" && *disabled)
            .times(1)
            .returning(|_, _| Ok(true));

        let service = UserService::new(Arc::new(repository), hasher());

        let username = Username::new("testuser".to_string()).unwrap();
        assert!(service.set_disabled(&username, true).await.is_ok());
    }

    #[tokio::test]
    async fn test_set_disabled_unknown_user() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_set_disabled()
            .times(1)
            .returning(|_, _| Ok(false));

        let service = UserService::new(Arc::new(repository), hasher());

        let username = Username::new("ghost".to_string()).unwrap();
        let result = service.set_disabled(&username, true).await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::NotFoundByUsername(_)
        ));
    }

    #[tokio::test]
    async fn test_repository_failure_propagates() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Err(UserError::DatabaseError("connection refused".to_string())));

        let service = UserService::new(Arc::new(repository), hasher());

        let username = Username::new("testuser".to_string()).unwrap();
        let result = service.get_user_by_username(&username).await;
        assert!(matches!(result.unwrap_err(), UserError::DatabaseError(_)));
    }
}
