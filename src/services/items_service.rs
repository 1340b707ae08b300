use tonic::{Request, Response, Status};

use crate::access::Catalog;
use crate::error::AppResult;
use crate::locator::item_path;
use crate::models::{ItemChanges, NewItem};
use crate::proto::common::DeleteResponse;
use crate::proto::items::items_service_server::ItemsService;
use crate::proto::items::{
    CreateItemRequest, DeleteItemRequest, GetItemRequest, GetItemResponse, ItemResponse,
    ListItemsRequest, ListItemsResponse, SearchByBarcodeRequest, UpdateItemRequest,
};
use crate::store::ItemFilter;

use super::{
    clearable, image_to_proto, item_to_proto, non_empty, page_rows, parse_timestamp, session_of,
};

pub struct ItemsServiceImpl {
    catalog: Catalog,
}

impl ItemsServiceImpl {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

fn date_stored(value: Option<String>) -> AppResult<Option<chrono::DateTime<chrono::Utc>>> {
    value
        .and_then(non_empty)
        .map(|v| parse_timestamp("date_stored", &v))
        .transpose()
}

#[tonic::async_trait]
impl ItemsService for ItemsServiceImpl {
    async fn list_items(
        &self,
        request: Request<ListItemsRequest>,
    ) -> Result<Response<ListItemsResponse>, Status> {
        let session = session_of(&request);
        let req = request.into_inner();

        let filter = ItemFilter {
            text: non_empty(req.query),
            category: non_empty(req.category),
            box_id: non_empty(req.box_id),
            barcode: None,
        };
        let items = self.catalog.query_items(session.as_ref(), &filter).await;
        let (items, page) = page_rows(items, req.page);

        Ok(Response::new(ListItemsResponse {
            items: items.iter().map(item_to_proto).collect(),
            page,
        }))
    }

    async fn get_item(
        &self,
        request: Request<GetItemRequest>,
    ) -> Result<Response<GetItemResponse>, Status> {
        let session = session_of(&request);
        let req = request.into_inner();

        let found = self
            .catalog
            .get_item(session.as_ref(), &req.id)
            .await?
            .ok_or_else(|| Status::not_found("Item not found"))?;

        Ok(Response::new(GetItemResponse {
            item: Some(item_to_proto(&found.record)),
            images: found
                .images
                .iter()
                .map(|image| image_to_proto(&self.catalog, image))
                .collect(),
        }))
    }

    async fn create_item(
        &self,
        request: Request<CreateItemRequest>,
    ) -> Result<Response<ItemResponse>, Status> {
        let session = session_of(&request);
        let req = request.into_inner();

        let new_item = NewItem {
            name: req.name.trim().to_string(),
            box_id: req.box_id.trim().to_string(),
            description: req.description.and_then(non_empty),
            category: req.category.and_then(non_empty),
            date_stored: date_stored(req.date_stored)?,
            barcode: req.barcode.and_then(non_empty),
        };

        let created = self.catalog.create_item(session.as_ref(), new_item).await?;
        Ok(Response::new(ItemResponse {
            redirect_to: item_path(&created.id),
            item: Some(item_to_proto(&created)),
        }))
    }

    async fn update_item(
        &self,
        request: Request<UpdateItemRequest>,
    ) -> Result<Response<ItemResponse>, Status> {
        let session = session_of(&request);
        let req = request.into_inner();

        let changes = ItemChanges {
            name: req.name.map(|n| n.trim().to_string()),
            box_id: req.box_id.map(|b| b.trim().to_string()),
            description: clearable(req.description),
            category: clearable(req.category),
            date_stored: date_stored(req.date_stored)?,
            barcode: clearable(req.barcode),
        };

        let updated = self
            .catalog
            .update_item(session.as_ref(), &req.id, changes)
            .await?;
        Ok(Response::new(ItemResponse {
            redirect_to: item_path(&updated.id),
            item: Some(item_to_proto(&updated)),
        }))
    }

    async fn delete_item(
        &self,
        request: Request<DeleteItemRequest>,
    ) -> Result<Response<DeleteResponse>, Status> {
        let session = session_of(&request);
        let req = request.into_inner();

        let deleted = self.catalog.delete_item(session.as_ref(), &req.id).await?;
        Ok(Response::new(DeleteResponse {
            deleted,
            redirect_to: "/items".to_string(),
        }))
    }

    async fn search_by_barcode(
        &self,
        request: Request<SearchByBarcodeRequest>,
    ) -> Result<Response<ListItemsResponse>, Status> {
        let session = session_of(&request);
        let req = request.into_inner();

        let barcode = req.barcode.trim();
        if barcode.is_empty() {
            return Err(Status::invalid_argument("barcode is required"));
        }
        let items = self
            .catalog
            .find_items_by_barcode(session.as_ref(), barcode)
            .await;

        Ok(Response::new(ListItemsResponse {
            items: items.iter().map(item_to_proto).collect(),
            page: None,
        }))
    }
}
