use tonic::{Request, Response, Status};

use crate::access::Catalog;
use crate::error::AppError;
use crate::locator::box_path;
use crate::models::{BoxChanges, NewBox};
use crate::proto::boxes::boxes_service_server::BoxesService;
use crate::proto::boxes::{
    BoxResponse, CreateBoxRequest, DeleteBoxRequest, GetBoxByQrCodeRequest, GetBoxRequest,
    GetBoxResponse, ListBoxesRequest, ListBoxesResponse, UpdateBoxRequest,
};
use crate::proto::common::DeleteResponse;
use crate::store::BoxFilter;

use super::{
    box_to_proto, clearable, item_to_proto, location_from_proto, non_empty, page_rows, session_of,
};

pub struct BoxesServiceImpl {
    catalog: Catalog,
}

impl BoxesServiceImpl {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    fn detail(&self, found: crate::models::BoxWithItems) -> GetBoxResponse {
        GetBoxResponse {
            box_url: self.catalog.box_url(&found.record.id),
            r#box: Some(box_to_proto(&found.record)),
            items: found.items.iter().map(item_to_proto).collect(),
        }
    }
}

#[tonic::async_trait]
impl BoxesService for BoxesServiceImpl {
    async fn list_boxes(
        &self,
        request: Request<ListBoxesRequest>,
    ) -> Result<Response<ListBoxesResponse>, Status> {
        let session = session_of(&request);
        let req = request.into_inner();

        let filter = BoxFilter {
            text: non_empty(req.query),
            location: location_from_proto(req.location)?,
            category: non_empty(req.category),
        };
        let boxes = self.catalog.query_boxes(session.as_ref(), &filter).await;
        let (boxes, page) = page_rows(boxes, req.page);

        Ok(Response::new(ListBoxesResponse {
            boxes: boxes.iter().map(box_to_proto).collect(),
            page,
        }))
    }

    async fn get_box(
        &self,
        request: Request<GetBoxRequest>,
    ) -> Result<Response<GetBoxResponse>, Status> {
        let session = session_of(&request);
        let req = request.into_inner();

        let found = self
            .catalog
            .get_box(session.as_ref(), &req.id)
            .await?
            .ok_or_else(|| Status::not_found("Box not found"))?;
        Ok(Response::new(self.detail(found)))
    }

    async fn get_box_by_qr_code(
        &self,
        request: Request<GetBoxByQrCodeRequest>,
    ) -> Result<Response<GetBoxResponse>, Status> {
        let session = session_of(&request);
        let req = request.into_inner();

        let found = self
            .catalog
            .get_box_by_qr_code(session.as_ref(), req.qr_code_id.trim())
            .await?
            .ok_or_else(|| Status::not_found("Box not found"))?;
        Ok(Response::new(self.detail(found)))
    }

    async fn create_box(
        &self,
        request: Request<CreateBoxRequest>,
    ) -> Result<Response<BoxResponse>, Status> {
        let session = session_of(&request);
        let req = request.into_inner();

        let location = location_from_proto(req.location)?
            .ok_or_else(|| AppError::InvalidInput("location is required".to_string()))?;
        let new_box = NewBox {
            name: req.name.trim().to_string(),
            location,
            category: req.category.and_then(non_empty),
            description: req.description.and_then(non_empty),
        };

        let created = self.catalog.create_box(session.as_ref(), new_box).await?;
        Ok(Response::new(BoxResponse {
            redirect_to: box_path(&created.id),
            r#box: Some(box_to_proto(&created)),
        }))
    }

    async fn update_box(
        &self,
        request: Request<UpdateBoxRequest>,
    ) -> Result<Response<BoxResponse>, Status> {
        let session = session_of(&request);
        let req = request.into_inner();

        let location = match req.location {
            Some(value) => location_from_proto(value)?,
            None => None,
        };
        let changes = BoxChanges {
            name: req.name.map(|n| n.trim().to_string()),
            location,
            category: clearable(req.category),
            description: clearable(req.description),
        };

        let updated = self
            .catalog
            .update_box(session.as_ref(), &req.id, changes)
            .await?;
        Ok(Response::new(BoxResponse {
            redirect_to: box_path(&updated.id),
            r#box: Some(box_to_proto(&updated)),
        }))
    }

    async fn delete_box(
        &self,
        request: Request<DeleteBoxRequest>,
    ) -> Result<Response<DeleteResponse>, Status> {
        let session = session_of(&request);
        let req = request.into_inner();

        let deleted = self.catalog.delete_box(session.as_ref(), &req.id).await?;
        Ok(Response::new(DeleteResponse {
            deleted,
            redirect_to: "/boxes".to_string(),
        }))
    }
}
