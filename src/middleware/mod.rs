pub mod auth;

pub use auth::{AuthLayer, AuthMiddleware, SESSION_COOKIE};

use tonic_web::GrpcWebLayer;
use tower::layer::util::{Identity, Stack};
use tower::ServiceBuilder;

/// Session handling in front of gRPC-Web translation.
///
/// `GrpcWebLayer` answers plain HTTP/1.1 requests with 400, so page requests
/// have to hit the route gate before they reach it.
pub fn gateway(jwt_secret: String) -> Stack<GrpcWebLayer, Stack<AuthLayer, Identity>> {
    ServiceBuilder::new()
        .layer(AuthLayer::new(jwt_secret))
        .layer(GrpcWebLayer::new())
        .into_inner()
}
