use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tonic::{Request, Response, Status};

use crate::error::{AppError, AppResult};
use crate::models::UserModel;
use crate::proto::auth::auth_service_server::AuthService;
use crate::proto::auth::{
    AuthResponse, LoginRequest, RequestPasswordResetRequest, ResetPasswordRequest, SignUpRequest,
    UpdatePasswordRequest, ValidateTokenRequest, ValidateTokenResponse,
};
use crate::proto::common::Empty;
use crate::store::UserStore;
use crate::validation::{
    validate_login, validate_new_password, validate_reset_request, validate_sign_up,
};

use super::session_of;

const TOKEN_LIFETIME_HOURS: i64 = 24;
const RESET_LIFETIME_HOURS: i64 = 1;
const RESET_TOKEN_BYTES: usize = 32;
const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

/// Returns the claims of a valid, unexpired session token.
pub fn decode_token(jwt_secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn reset_token_hash(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

pub struct AuthServiceImpl {
    users: Arc<dyn UserStore>,
    jwt_secret: String,
    public_origin: String,
}

impl AuthServiceImpl {
    pub fn new(users: Arc<dyn UserStore>, jwt_secret: String, public_origin: String) -> Self {
        Self {
            users,
            jwt_secret,
            public_origin,
        }
    }

    fn issue_jwt(&self, user: &UserModel) -> Result<(String, DateTime<Utc>), Status> {
        let now = Utc::now();
        let exp = now + Duration::hours(TOKEN_LIFETIME_HOURS);
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| Status::internal(format!("JWT error: {}", e)))?;
        Ok((token, exp))
    }

    fn auth_response(&self, user: &UserModel) -> Result<Response<AuthResponse>, Status> {
        let (token, exp) = self.issue_jwt(user)?;
        Ok(Response::new(AuthResponse {
            token,
            expires_at: exp.to_rfc3339(),
            user_id: user.id.clone(),
            email: user.email.clone(),
        }))
    }

    /// Stores the hash of a fresh single-use token and returns the token.
    pub(crate) async fn issue_reset_token(&self, user: &UserModel) -> AppResult<String> {
        let mut bytes = [0u8; RESET_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(bytes);

        let expires_at = Utc::now() + Duration::hours(RESET_LIFETIME_HOURS);
        self.users
            .insert_password_reset(&user.id, &reset_token_hash(&token), expires_at)
            .await?;
        Ok(token)
    }
}

#[tonic::async_trait]
impl AuthService for AuthServiceImpl {
    async fn sign_up(
        &self,
        request: Request<SignUpRequest>,
    ) -> Result<Response<AuthResponse>, Status> {
        let req = request.into_inner();
        validate_sign_up(&req.email, &req.password, &req.confirm_password).map_err(AppError::from)?;

        let password_hash = hash_password(&req.password)?;
        let user = self
            .users
            .insert_user(&req.email.trim().to_lowercase(), &password_hash)
            .await?;

        tracing::info!("User signed up: id={}", user.id);
        self.auth_response(&user)
    }

    async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> Result<Response<AuthResponse>, Status> {
        let req = request.into_inner();
        validate_login(&req.email, &req.password).map_err(AppError::from)?;

        let user = self
            .users
            .find_user_by_email(&req.email.trim().to_lowercase())
            .await?
            .filter(|user| verify_password(&req.password, &user.password_hash))
            .ok_or_else(|| {
                tracing::warn!("Login failed for {}", req.email.trim());
                Status::unauthenticated(INVALID_CREDENTIALS)
            })?;

        self.auth_response(&user)
    }

    async fn validate_token(
        &self,
        request: Request<ValidateTokenRequest>,
    ) -> Result<Response<ValidateTokenResponse>, Status> {
        let req = request.into_inner();

        Ok(Response::new(match decode_token(&self.jwt_secret, &req.token) {
            Some(claims) => ValidateTokenResponse {
                valid: true,
                user_id: claims.sub,
                email: claims.email,
            },
            None => ValidateTokenResponse::default(),
        }))
    }

    async fn request_password_reset(
        &self,
        request: Request<RequestPasswordResetRequest>,
    ) -> Result<Response<Empty>, Status> {
        let req = request.into_inner();
        validate_reset_request(&req.email).map_err(AppError::from)?;

        // Unknown emails get the same answer.
        match self.users.find_user_by_email(&req.email.trim().to_lowercase()).await {
            Ok(Some(user)) => {
                let token = self.issue_reset_token(&user).await?;
                tracing::debug!("Password reset token issued for user {}", user.id);
                tracing::trace!(
                    "Password reset link: {}/reset-password?token={}",
                    self.public_origin.trim_end_matches('/'),
                    token
                );
            }
            Ok(None) => tracing::debug!("Password reset requested for unknown email"),
            Err(e) => tracing::error!("Password reset lookup failed: {}", e),
        }

        Ok(Response::new(Empty {}))
    }

    async fn reset_password(
        &self,
        request: Request<ResetPasswordRequest>,
    ) -> Result<Response<Empty>, Status> {
        let req = request.into_inner();
        validate_new_password(&req.password, &req.confirm_password).map_err(AppError::from)?;

        let reset = self
            .users
            .take_password_reset(&reset_token_hash(req.token.trim()))
            .await?
            .filter(|reset| reset.expires_at > Utc::now())
            .ok_or_else(|| Status::invalid_argument("Reset link is invalid or has expired"))?;

        let password_hash = hash_password(&req.password)?;
        self.users
            .update_password_hash(&reset.user_id, &password_hash)
            .await?;

        tracing::info!("Password reset: user_id={}", reset.user_id);
        Ok(Response::new(Empty {}))
    }

    async fn update_password(
        &self,
        request: Request<UpdatePasswordRequest>,
    ) -> Result<Response<Empty>, Status> {
        let session = session_of(&request).ok_or(AppError::Unauthenticated)?;
        let req = request.into_inner();
        validate_new_password(&req.password, &req.confirm_password).map_err(AppError::from)?;

        let password_hash = hash_password(&req.password)?;
        self.users
            .update_password_hash(&session.user_id, &password_hash)
            .await?;

        tracing::info!("Password updated: user_id={}", session.user_id);
        Ok(Response::new(Empty {}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Session;
    use crate::services::testing::signed_in;
    use crate::store::MemoryStore;
    use tonic::Code;

    const SECRET: &str = "test-secret";

    fn service() -> (AuthServiceImpl, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let service = AuthServiceImpl::new(
            store.clone(),
            SECRET.to_string(),
            "http://localhost:3000".to_string(),
        );
        (service, store)
    }

    fn sign_up_request(email: &str, password: &str) -> SignUpRequest {
        SignUpRequest {
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: password.to_string(),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_sign_up_and_login() {
        let (service, _) = service();
        let signed_up = service
            .sign_up(Request::new(sign_up_request("Alice@Example.com", "hunter22")))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(signed_up.email, "alice@example.com");

        let claims = decode_token(SECRET, &signed_up.token).unwrap();
        assert_eq!(claims.sub, signed_up.user_id);
        assert_eq!(claims.exp - claims.iat, TOKEN_LIFETIME_HOURS * 3600);

        let logged_in = service
            .login(Request::new(login_request("alice@example.com", "hunter22")))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(logged_in.user_id, signed_up.user_id);

        let err = service
            .sign_up(Request::new(sign_up_request("alice@example.com", "another1")))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::AlreadyExists);
    }

    #[tokio::test]
    async fn test_login_failures_are_generic() {
        let (service, _) = service();
        service
            .sign_up(Request::new(sign_up_request("alice@example.com", "hunter22")))
            .await
            .unwrap();

        let wrong_password = service
            .login(Request::new(login_request("alice@example.com", "hunter23")))
            .await
            .unwrap_err();
        let unknown_user = service
            .login(Request::new(login_request("nobody@example.com", "hunter22")))
            .await
            .unwrap_err();
        assert_eq!(wrong_password.code(), Code::Unauthenticated);
        assert_eq!(wrong_password.message(), INVALID_CREDENTIALS);
        assert_eq!(unknown_user.message(), wrong_password.message());
    }

    #[tokio::test]
    async fn test_sign_up_validation() {
        let (service, _) = service();
        let err = service
            .sign_up(Request::new(SignUpRequest {
                email: "not-an-email".into(),
                password: "abc".into(),
                confirm_password: "abd".into(),
            }))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::InvalidArgument);
        assert!(err.message().contains("Invalid email address"));
        assert!(err.message().contains("Passwords don't match"));
    }

    #[tokio::test]
    async fn test_validate_token() {
        let (service, _) = service();
        let signed_up = service
            .sign_up(Request::new(sign_up_request("alice@example.com", "hunter22")))
            .await
            .unwrap()
            .into_inner();

        let valid = service
            .validate_token(Request::new(ValidateTokenRequest {
                token: signed_up.token,
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(valid.valid);
        assert_eq!(valid.email, "alice@example.com");

        let invalid = service
            .validate_token(Request::new(ValidateTokenRequest {
                token: "garbage".into(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(!invalid.valid);
        assert!(decode_token("other-secret", "garbage").is_none());
    }

    #[tokio::test]
    async fn test_password_reset_is_single_use() {
        let (service, store) = service();
        service
            .sign_up(Request::new(sign_up_request("alice@example.com", "hunter22")))
            .await
            .unwrap();

        // unknown emails look the same to the caller
        service
            .request_password_reset(Request::new(RequestPasswordResetRequest {
                email: "nobody@example.com".into(),
            }))
            .await
            .unwrap();

        let user = store
            .find_user_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        let token = service.issue_reset_token(&user).await.unwrap();
        let reset = |token: String| ResetPasswordRequest {
            token,
            password: "newpass1".into(),
            confirm_password: "newpass1".into(),
        };

        service
            .reset_password(Request::new(reset(token.clone())))
            .await
            .unwrap();
        let err = service
            .reset_password(Request::new(reset(token)))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::InvalidArgument);

        service
            .login(Request::new(login_request("alice@example.com", "newpass1")))
            .await
            .unwrap();
    }

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_reset_token_stays_out_of_debug_logs() {
        let (service, store) = service();
        service
            .sign_up(Request::new(sign_up_request("alice@example.com", "hunter22")))
            .await
            .unwrap();
        let user = store
            .find_user_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        service
            .request_password_reset(Request::new(RequestPasswordResetRequest {
                email: "alice@example.com".into(),
            }))
            .await
            .unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains(&user.id));
        assert!(!output.contains("token="));
    }

    #[tokio::test]
    async fn test_expired_reset_token() {
        let (service, store) = service();
        service
            .sign_up(Request::new(sign_up_request("alice@example.com", "hunter22")))
            .await
            .unwrap();
        let user = store
            .find_user_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        store
            .insert_password_reset(
                &user.id,
                &reset_token_hash("stale"),
                Utc::now() - Duration::minutes(1),
            )
            .await
            .unwrap();

        let err = service
            .reset_password(Request::new(ResetPasswordRequest {
                token: "stale".into(),
                password: "newpass1".into(),
                confirm_password: "newpass1".into(),
            }))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_update_password_needs_session() {
        let (service, _) = service();
        let signed_up = service
            .sign_up(Request::new(sign_up_request("alice@example.com", "hunter22")))
            .await
            .unwrap()
            .into_inner();
        let request = || UpdatePasswordRequest {
            password: "changed1".into(),
            confirm_password: "changed1".into(),
        };

        let err = service
            .update_password(Request::new(request()))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::Unauthenticated);

        let session = Session::new(signed_up.user_id, signed_up.email);
        service
            .update_password(signed_in(request(), &session))
            .await
            .unwrap();
        service
            .login(Request::new(login_request("alice@example.com", "changed1")))
            .await
            .unwrap();
    }
}
