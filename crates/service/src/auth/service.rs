use std::sync::Arc;

use argon2::{password_hash::{PasswordHasher, PasswordVerifier, SaltString}, Argon2, PasswordHash};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use models::user::{validate_email, validate_name, validate_password};
use models::{NewUser, RecordId, UserProfile};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};

use super::domain::{AuthSession, Claims, LoginInput, RegisterInput};
use crate::errors::ServiceError;
use crate::store::Store;

/// Token signing settings
#[derive(Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

impl From<&configs::AuthConfig> for AuthSettings {
    fn from(c: &configs::AuthConfig) -> Self {
        Self { jwt_secret: c.jwt_secret.clone(), token_ttl: Duration::hours(c.token_ttl_hours) }
    }
}

/// Auth business service independent of web framework
#[derive(Clone)]
pub struct AuthService {
    store: Arc<Store>,
    cfg: AuthSettings,
}

impl AuthService {
    pub fn new(store: Arc<Store>, cfg: AuthSettings) -> Self { Self { store, cfg } }

    /// Register a new user with an argon2-hashed password.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::auth::{AuthService, AuthSettings, domain::RegisterInput};
    /// use service::storage::MemoryBackend;
    /// use service::store::{FlushPolicy, Store};
    /// let store = Arc::new(Store::new(Arc::new(MemoryBackend::default()), FlushPolicy::default()));
    /// let svc = AuthService::new(store, AuthSettings { jwt_secret: "secret".into(), token_ttl: chrono::Duration::hours(1) });
    /// let input = RegisterInput { name: "Test".into(), email: "User@Example.com".into(), password: "Secret123".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<UserProfile, ServiceError> {
        validate_name(&input.name)?;
        validate_email(&input.email)?;
        validate_password(&input.password)?;

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| ServiceError::Internal(format!("password hash: {e}")))?
            .to_string();

        let new = NewUser { name: input.name.trim().to_string(), email: input.email, password_hash };
        let Some(user) = self.store.try_insert_user(new).await else {
            debug!("email already registered");
            return Err(ServiceError::Conflict("email already registered".into()));
        };
        info!(user_id = user.id, email = %user.email, "user_registered");
        Ok(UserProfile::from(&user))
    }

    /// Verify credentials and issue a signed token.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, ServiceError> {
        if input.email.trim().is_empty() || input.password.is_empty() {
            return Err(ServiceError::Validation("email and password are required".into()));
        }
        let user = self
            .store
            .find_user_by_email(&input.email)
            .await
            .ok_or_else(|| ServiceError::Unauthorized("invalid credentials".into()))?;

        let parsed = PasswordHash::new(&user.password_hash).map_err(|e| ServiceError::Internal(format!("stored hash: {e}")))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(ServiceError::Unauthorized("invalid credentials".into()));
        }

        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.cfg.token_ttl).timestamp(),
        };
        let token = encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| ServiceError::Internal(format!("token encode: {e}")))?;
        info!(user_id = user.id, "user_logged_in");
        Ok(AuthSession { user: UserProfile::from(&user), token })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(token, &DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes()), &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| ServiceError::Unauthorized(format!("invalid token: {e}")))
    }

    /// Resolve a token to the user it was issued for.
    pub async fn me(&self, token: &str) -> Result<UserProfile, ServiceError> {
        let claims = self.verify_token(token)?;
        self.store
            .get_user(claims.sub)
            .await
            .map(|u| UserProfile::from(&u))
            .ok_or_else(|| ServiceError::Unauthorized("user no longer exists".into()))
    }

    pub async fn list_users(&self) -> Vec<UserProfile> {
        self.store.list_users().await.iter().map(UserProfile::from).collect()
    }

    pub async fn delete_user(&self, id: RecordId) -> Result<(), ServiceError> {
        if !self.store.delete_user(id).await {
            return Err(ServiceError::not_found("user"));
        }
        info!(user_id = id, "user_deleted");
        Ok(())
    }
}
