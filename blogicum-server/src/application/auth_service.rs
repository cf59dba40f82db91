use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use tracing::info;

use crate::data::Repositories;
use crate::data::user_repository::{NewUser, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{LoginRequest, RegisterRequest, User};
use crate::infrastructure::jwt::JwtService;

#[derive(Debug, Clone)]
pub(crate) struct AuthResult {
    pub(crate) user: User,
    pub(crate) access_token: String,
}

pub(crate) struct AuthService {
    repo: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
}

impl AuthService {
    const DUMMY_PASSWORD_HASH: &'static str = "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$gwN6hT1sNdk9kI95f7n2Gl3fL0qRmBf2Ffkj2r90/0M";

    pub(crate) fn new(repos: &Repositories, jwt: Arc<JwtService>) -> Self {
        Self {
            repo: repos.users.clone(),
            jwt,
        }
    }

    pub(crate) async fn register(&self, req: RegisterRequest) -> Result<User, DomainError> {
        let req = req.validate()?;

        let password_hash = self.hash_password(&req.password)?;

        let new_user = Self::into_new_user(req, password_hash);
        let user = self.repo.create_user(new_user).await?;
        info!(user_id = user.id, "user registered");
        Ok(user)
    }

    pub(crate) async fn login(&self, req: LoginRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let user_creds = match self.repo.find_credentials(&req.username).await? {
            Some(user_creds) => user_creds,
            None => {
                // keep the response time close to the existing-user path
                match self.verify_password(&req.password, Self::DUMMY_PASSWORD_HASH) {
                    Ok(()) | Err(DomainError::InvalidCredentials) => {}
                    Err(err) => return Err(err),
                }
                return Err(DomainError::InvalidCredentials);
            }
        };

        self.verify_password(&req.password, &user_creds.password_hash)?;

        let access_token = self
            .jwt
            .generate_token(user_creds.user.id, &user_creds.user.username)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;

        Ok(AuthResult {
            user: user_creds.user,
            access_token,
        })
    }

    pub(crate) fn hash_password(&self, raw_password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Self::argon2()?
            .hash_password(raw_password.as_bytes(), &salt)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(password_hash.to_string())
    }

    pub(crate) fn verify_password(
        &self,
        raw_password: &str,
        password_hash: &str,
    ) -> Result<(), DomainError> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Self::argon2()?
            .verify_password(raw_password.as_bytes(), &parsed_hash)
            .map_err(|err| match err {
                PasswordHashError::Password => DomainError::InvalidCredentials,
                _ => DomainError::Unexpected(err.to_string()),
            })?;

        Ok(())
    }

    fn into_new_user(req: RegisterRequest, password_hash: String) -> NewUser {
        NewUser {
            username: req.username,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            password_hash,
        }
    }

    fn argon2() -> Result<Argon2<'static>, DomainError> {
        let params = Params::new(19 * 1024, 2, 1, None)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::AuthService;
    use crate::data::Repositories;
    use crate::data::repositories::memory::MemoryStore;
    use crate::data::user_repository::UserRepository;
    use crate::domain::error::DomainError;
    use crate::domain::user::{LoginRequest, RegisterRequest};
    use crate::infrastructure::jwt::JwtService;

    fn service(store: &MemoryStore) -> AuthService {
        AuthService::new(&Repositories::memory(store.clone()), Arc::new(test_jwt()))
    }

    fn register_request(username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: format!("  {username}  "),
            email: "  VALID@EXAMPLE.COM  ".to_string(),
            password: password.to_string(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    #[tokio::test]
    async fn register_stores_normalized_user_with_hashed_password() {
        let store = MemoryStore::default();
        let service = service(&store);

        let user = service
            .register(register_request("valid_user", "very-secure-password"))
            .await
            .expect("register must succeed");
        assert_eq!(user.username, "valid_user");
        assert_eq!(user.email, "valid@example.com");

        let creds = store
            .find_credentials("valid_user")
            .await
            .expect("lookup must succeed")
            .expect("user must be stored");
        assert!(creds.password_hash.starts_with("$argon2id$"));
        assert_ne!(creds.password_hash, "very-secure-password");
    }

    #[tokio::test]
    async fn register_rejects_duplicate_username() {
        let store = MemoryStore::default();
        let service = service(&store);
        service
            .register(register_request("valid_user", "very-secure-password"))
            .await
            .expect("first register must succeed");

        let err = service
            .register(register_request("valid_user", "another-password"))
            .await
            .expect_err("duplicate must fail");
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "username",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn login_returns_invalid_credentials_for_missing_user() {
        let store = MemoryStore::default();
        let service = service(&store);

        let req = LoginRequest {
            username: "valid_user".to_string(),
            password: "some-password".to_string(),
        };

        let err = service.login(req).await.expect_err("login must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_returns_invalid_credentials_for_wrong_password() {
        let store = MemoryStore::default();
        let service = service(&store);
        service
            .register(register_request("valid_user", "correct-password"))
            .await
            .expect("register must succeed");

        let req = LoginRequest {
            username: "valid_user".to_string(),
            password: "wrong-password".to_string(),
        };

        let err = service.login(req).await.expect_err("login must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_returns_token_for_valid_credentials() {
        let store = MemoryStore::default();
        let service = service(&store);
        let user = service
            .register(register_request("valid_user", "correct-password"))
            .await
            .expect("register must succeed");

        let req = LoginRequest {
            username: "valid_user".to_string(),
            password: "correct-password".to_string(),
        };

        let result = service.login(req).await.expect("login must succeed");
        assert_eq!(result.user.id, user.id);
        let claims = test_jwt()
            .verify_token(&result.access_token)
            .expect("token must verify");
        assert_eq!(claims.user_id, user.id);
    }

    fn test_jwt() -> JwtService {
        JwtService::new("0123456789abcdef0123456789abcdef", 3600)
    }
}
