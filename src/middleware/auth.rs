use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use http::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, COOKIE, LOCATION};
use http::Request as HttpRequest;
use http::Response as HttpResponse;
use http::StatusCode;
use http_body_util::combinators::UnsyncBoxBody;
use tonic::Status;
use tower::{Layer, Service};

use crate::access::Session;
use crate::routes::{guard, RouteDecision};
use crate::services::auth_service::decode_token;

/// Cookie the browser front-end keeps the session token in.
pub const SESSION_COOKIE: &str = "session";

#[derive(Clone)]
pub struct AuthLayer {
    jwt_secret: String,
}

impl AuthLayer {
    pub fn new(jwt_secret: String) -> Self {
        Self { jwt_secret }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            jwt_secret: self.jwt_secret.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    jwt_secret: String,
}

type BoxBody = UnsyncBoxBody<bytes::Bytes, Status>;

/// Bearer token first, then the session cookie.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

fn is_grpc(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/grpc"))
}

fn redirect_response(location: &str) -> HttpResponse<BoxBody> {
    let mut response = HttpResponse::new(UnsyncBoxBody::default());
    *response.status_mut() = StatusCode::TEMPORARY_REDIRECT;
    if let Ok(value) = HeaderValue::from_str(location) {
        response.headers_mut().insert(LOCATION, value);
    }
    response
}

impl<S, ReqBody> Service<HttpRequest<ReqBody>> for AuthMiddleware<S>
where
    S: Service<HttpRequest<ReqBody>, Response = HttpResponse<BoxBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ReqBody: Send + 'static,
{
    type Response = HttpResponse<BoxBody>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: HttpRequest<ReqBody>) -> Self::Future {
        let mut inner = self.inner.clone();
        std::mem::swap(&mut self.inner, &mut inner);

        let jwt_secret = self.jwt_secret.clone();

        Box::pin(async move {
            let session = session_token(req.headers())
                .and_then(|token| decode_token(&jwt_secret, &token))
                .map(|claims| Session::new(claims.sub, claims.email));
            let authenticated = session.is_some();
            if let Some(session) = session {
                req.extensions_mut().insert(session);
            }

            // RPCs enforce sessions per operation; only page requests are redirected.
            if !is_grpc(req.headers()) {
                let path = req.uri().path().to_string();
                if let RouteDecision::Redirect(location) = guard(&path, authenticated) {
                    tracing::debug!("Redirecting {} to {}", path, location);
                    return Ok(redirect_response(&location));
                }
            }

            inner.call(req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::future::{ready, Ready};

    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    use crate::services::auth_service::Claims;

    const SECRET: &str = "test-secret";

    /// Answers 200 and reports the session it saw in `x-user-id`.
    #[derive(Clone)]
    struct Echo;

    impl<B> Service<HttpRequest<B>> for Echo {
        type Response = HttpResponse<BoxBody>;
        type Error = Infallible;
        type Future = Ready<Result<Self::Response, Self::Error>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: HttpRequest<B>) -> Self::Future {
            let mut response = HttpResponse::new(UnsyncBoxBody::default());
            if let Some(session) = req.extensions().get::<Session>() {
                if let Ok(value) = HeaderValue::from_str(&session.user_id) {
                    response.headers_mut().insert("x-user-id", value);
                }
            }
            ready(Ok(response))
        }
    }

    fn token(user_id: &str) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: "alice@example.com".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    async fn send(req: HttpRequest<()>) -> HttpResponse<BoxBody> {
        let mut middleware = AuthLayer::new(SECRET.to_string()).layer(Echo);
        middleware.call(req).await.unwrap()
    }

    fn page(path: &str) -> http::request::Builder {
        HttpRequest::builder().uri(path)
    }

    #[tokio::test]
    async fn test_anonymous_page_redirects_to_login() {
        let response = send(page("/boxes/abc").body(()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/login?redirectTo=%2Fboxes%2Fabc"
        );
    }

    #[tokio::test]
    async fn test_signed_in_auth_page_redirects_home() {
        let cookie = format!("theme=dark; {}={}", SESSION_COOKIE, token("u1"));
        let response = send(page("/login").header(COOKIE, cookie).body(()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/");
    }

    #[tokio::test]
    async fn test_session_reaches_inner_service() {
        let response = send(
            page("/boxes")
                .header(AUTHORIZATION, format!("Bearer {}", token("u1")))
                .body(())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("x-user-id").unwrap(), "u1");
    }

    #[tokio::test]
    async fn test_grpc_requests_pass_through() {
        let response = send(
            page("/garage.boxes.BoxesService/ListBoxes")
                .header(CONTENT_TYPE, "application/grpc")
                .body(())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("x-user-id").is_none());

        let forged = send(
            page("/items")
                .header(AUTHORIZATION, "Bearer not-a-token")
                .body(())
                .unwrap(),
        )
        .await;
        assert_eq!(forged.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    #[tokio::test]
    async fn test_gateway_redirects_before_grpc_web() {
        let mut stack = crate::middleware::gateway(SECRET.to_string()).layer(Echo);

        let redirect = stack
            .call(
                page("/boxes/abc")
                    .body(tonic::body::empty_body())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(redirect.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            redirect.headers().get(LOCATION).unwrap(),
            "/login?redirectTo=%2Fboxes%2Fabc"
        );

        let rpc = stack
            .call(
                page("/garage.boxes.BoxesService/ListBoxes")
                    .method(http::Method::POST)
                    .header(CONTENT_TYPE, "application/grpc-web+proto")
                    .header(AUTHORIZATION, format!("Bearer {}", token("u1")))
                    .body(tonic::body::empty_body())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(rpc.status(), StatusCode::OK);
        assert_eq!(rpc.headers().get("x-user-id").unwrap(), "u1");
    }

    #[test]
    fn test_session_token_sources() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);
        headers.insert(COOKIE, HeaderValue::from_static("a=1; session=abc"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(session_token(&headers).as_deref(), Some("xyz"));
    }
}
