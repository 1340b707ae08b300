use tonic::{Request, Response, Status};

use crate::proto::health::{
    health_check_response::ServingStatus, health_server::Health, HealthCheckRequest,
    HealthCheckResponse,
};

/// Services this server answers health checks for; the empty name means the
/// server as a whole.
const SERVICES: &[&str] = &[
    "",
    "garage.boxes.BoxesService",
    "garage.items.ItemsService",
    "garage.images.ImagesService",
    "garage.search.SearchService",
    "garage.auth.AuthService",
];

fn status_for(service: &str) -> ServingStatus {
    if SERVICES.contains(&service) {
        ServingStatus::Serving
    } else {
        ServingStatus::ServiceUnknown
    }
}

#[derive(Debug, Default)]
pub struct HealthServiceImpl;

impl HealthServiceImpl {
    pub fn new() -> Self {
        Self
    }
}

#[tonic::async_trait]
impl Health for HealthServiceImpl {
    async fn check(
        &self,
        request: Request<HealthCheckRequest>,
    ) -> Result<Response<HealthCheckResponse>, Status> {
        let service = request.into_inner().service;
        Ok(Response::new(HealthCheckResponse {
            status: status_for(&service).into(),
        }))
    }

    type WatchStream = tokio_stream::wrappers::ReceiverStream<Result<HealthCheckResponse, Status>>;

    async fn watch(
        &self,
        request: Request<HealthCheckRequest>,
    ) -> Result<Response<Self::WatchStream>, Status> {
        let status = status_for(&request.into_inner().service);
        let (tx, rx) = tokio::sync::mpsc::channel(1);

        tokio::spawn(async move {
            let _ = tx.send(Ok(HealthCheckResponse {
                status: status.into(),
            })).await;
        });

        Ok(Response::new(tokio_stream::wrappers::ReceiverStream::new(rx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn test_check() {
        let service = HealthServiceImpl::new();
        let overall = service
            .check(Request::new(HealthCheckRequest::default()))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(overall.status, ServingStatus::Serving as i32);

        let unknown = service
            .check(Request::new(HealthCheckRequest {
                service: "garage.nope.NopeService".into(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(unknown.status, ServingStatus::ServiceUnknown as i32);
    }

    #[tokio::test]
    async fn test_watch_sends_current_status() {
        let service = HealthServiceImpl::new();
        let mut stream = service
            .watch(Request::new(HealthCheckRequest {
                service: "garage.boxes.BoxesService".into(),
            }))
            .await
            .unwrap()
            .into_inner();
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.status, ServingStatus::Serving as i32);
    }
}
