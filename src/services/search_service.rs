use tonic::{Request, Response, Status};

use crate::access::{Catalog, ScanOutcome};
use crate::proto::common::Empty;
use crate::proto::search::search_service_server::SearchService;
use crate::proto::search::{
    ListCategoriesResponse, ResolveScanRequest, ResolveScanResponse, SearchRequest,
    SearchResponse,
};
use crate::search::{ResultTab, SearchFilters, CATEGORIES};

use super::{box_to_proto, item_to_proto, location_from_proto, non_empty, session_of};

pub struct SearchServiceImpl {
    catalog: Catalog,
}

impl SearchServiceImpl {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

fn result_tab(value: i32) -> ResultTab {
    match crate::proto::search::ResultTab::try_from(value) {
        Ok(crate::proto::search::ResultTab::Boxes) => ResultTab::Boxes,
        Ok(crate::proto::search::ResultTab::Items) => ResultTab::Items,
        _ => ResultTab::All,
    }
}

#[tonic::async_trait]
impl SearchService for SearchServiceImpl {
    async fn search(
        &self,
        request: Request<SearchRequest>,
    ) -> Result<Response<SearchResponse>, Status> {
        let session = session_of(&request);
        let req = request.into_inner();

        let filters = SearchFilters {
            query: non_empty(req.query),
            location: location_from_proto(req.location)?,
            category: non_empty(req.category),
        };
        let results = self.catalog.search(session.as_ref(), &filters).await;
        tracing::debug!(
            "Search: boxes={}, items={}",
            results.box_count(),
            results.item_count()
        );

        Ok(Response::new(SearchResponse {
            box_count: results.box_count() as u64,
            item_count: results.item_count() as u64,
            total: results.count(result_tab(req.tab)) as u64,
            boxes: results.boxes.iter().map(box_to_proto).collect(),
            items: results.items.iter().map(item_to_proto).collect(),
        }))
    }

    async fn resolve_scan(
        &self,
        request: Request<ResolveScanRequest>,
    ) -> Result<Response<ResolveScanResponse>, Status> {
        let session = session_of(&request);
        let req = request.into_inner();

        if req.text.trim().is_empty() {
            return Err(Status::invalid_argument("scanned text is empty"));
        }
        let outcome = self.catalog.resolve_scan(session.as_ref(), &req.text).await?;
        let redirect_to = outcome.redirect_to(&req.text).unwrap_or_default();

        let response = match outcome {
            ScanOutcome::Box(found) => ResolveScanResponse {
                redirect_to,
                r#box: Some(box_to_proto(&found.record)),
                items: found.items.iter().map(item_to_proto).collect(),
            },
            ScanOutcome::Items(items) => ResolveScanResponse {
                redirect_to,
                r#box: None,
                items: items.iter().map(item_to_proto).collect(),
            },
            ScanOutcome::NotFound => ResolveScanResponse::default(),
        };
        Ok(Response::new(response))
    }

    async fn list_categories(
        &self,
        _request: Request<Empty>,
    ) -> Result<Response<ListCategoriesResponse>, Status> {
        Ok(Response::new(ListCategoriesResponse {
            categories: CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, NewBox, NewItem};
    use crate::proto::search::ResultTab as Tab;
    use crate::services::testing::{setup, signed_in};

    #[tokio::test]
    async fn test_search_counts() {
        let (fx, session) = setup();
        let winter = fx
            .catalog
            .create_box(Some(&session), NewBox::new("Winter Gear", Location::Attic))
            .await
            .unwrap();
        fx.catalog
            .create_item(Some(&session), NewItem::new("Wool Coat", &winter.id))
            .await
            .unwrap();
        fx.catalog
            .create_item(Some(&session), NewItem::new("Winter Boots", &winter.id))
            .await
            .unwrap();
        let service = SearchServiceImpl::new(fx.catalog.clone());

        let all = service
            .search(signed_in(
                SearchRequest {
                    query: "winter".into(),
                    ..Default::default()
                },
                &session,
            ))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(all.box_count, 1);
        assert_eq!(all.item_count, 1);
        assert_eq!(all.total, 2);

        let items_tab = service
            .search(signed_in(
                SearchRequest {
                    query: "winter".into(),
                    tab: Tab::Items as i32,
                    ..Default::default()
                },
                &session,
            ))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(items_tab.total, 1);

        let anonymous = service
            .search(Request::new(SearchRequest {
                query: "winter".into(),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(anonymous.total, 0);
    }

    #[tokio::test]
    async fn test_resolve_scan() {
        let (fx, session) = setup();
        let shed = fx
            .catalog
            .create_box(Some(&session), NewBox::new("Shed", Location::Garage))
            .await
            .unwrap();
        let service = SearchServiceImpl::new(fx.catalog.clone());

        let resolved = service
            .resolve_scan(signed_in(
                ResolveScanRequest {
                    text: fx.catalog.box_url(&shed.id),
                },
                &session,
            ))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(resolved.redirect_to, format!("/boxes/{}", shed.id));
        assert_eq!(resolved.r#box.unwrap().id, shed.id);

        let unknown = service
            .resolve_scan(signed_in(
                ResolveScanRequest {
                    text: "0000000000000".into(),
                },
                &session,
            ))
            .await
            .unwrap()
            .into_inner();
        assert!(unknown.redirect_to.is_empty());
        assert!(unknown.items.is_empty());
    }

    #[tokio::test]
    async fn test_list_categories() {
        let (fx, _) = setup();
        let service = SearchServiceImpl::new(fx.catalog.clone());
        let categories = service
            .list_categories(Request::new(Empty {}))
            .await
            .unwrap()
            .into_inner()
            .categories;
        assert_eq!(categories.len(), 6);
        assert!(categories.contains(&"Halloween".to_string()));
    }
}
