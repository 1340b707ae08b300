use tonic::{Request, Response, Status};

use crate::access::Catalog;
use crate::proto::common::DeleteResponse;
use crate::proto::images::images_service_server::ImagesService;
use crate::proto::images::{
    BoxQrCodeResponse, DeleteImageRequest, GetBoxQrCodeRequest, ImageResponse,
    ListImagesRequest, ListImagesResponse, UploadBoxQrCodeRequest, UploadImageRequest,
};

use super::{image_to_proto, session_of};

pub struct ImagesServiceImpl {
    catalog: Catalog,
}

impl ImagesServiceImpl {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

#[tonic::async_trait]
impl ImagesService for ImagesServiceImpl {
    async fn list_images(
        &self,
        request: Request<ListImagesRequest>,
    ) -> Result<Response<ListImagesResponse>, Status> {
        let session = session_of(&request);
        let req = request.into_inner();

        let images = self.catalog.list_images(session.as_ref(), &req.item_id).await;
        Ok(Response::new(ListImagesResponse {
            images: images.iter().map(|i| image_to_proto(&self.catalog, i)).collect(),
        }))
    }

    async fn upload_image(
        &self,
        request: Request<UploadImageRequest>,
    ) -> Result<Response<ImageResponse>, Status> {
        let session = session_of(&request);
        let req = request.into_inner();

        tracing::debug!(
            "UploadImage: item_id={}, file_name={}, size={}",
            req.item_id,
            req.file_name,
            req.data.len()
        );
        let image = self
            .catalog
            .upload_item_image(
                session.as_ref(),
                &req.item_id,
                &req.file_name,
                &req.content_type,
                req.data,
            )
            .await?;

        Ok(Response::new(ImageResponse {
            image: Some(image_to_proto(&self.catalog, &image)),
        }))
    }

    async fn delete_image(
        &self,
        request: Request<DeleteImageRequest>,
    ) -> Result<Response<DeleteResponse>, Status> {
        let session = session_of(&request);
        let req = request.into_inner();

        let deleted = self.catalog.delete_image(session.as_ref(), &req.id).await?;
        Ok(Response::new(DeleteResponse {
            deleted,
            redirect_to: String::new(),
        }))
    }

    async fn upload_box_qr_code(
        &self,
        request: Request<UploadBoxQrCodeRequest>,
    ) -> Result<Response<BoxQrCodeResponse>, Status> {
        let session = session_of(&request);
        let req = request.into_inner();

        let image_url = self
            .catalog
            .upload_box_qr_code(session.as_ref(), &req.box_id, req.png)
            .await?;
        Ok(Response::new(BoxQrCodeResponse {
            image_url,
            box_url: self.catalog.box_url(&req.box_id),
        }))
    }

    async fn get_box_qr_code(
        &self,
        request: Request<GetBoxQrCodeRequest>,
    ) -> Result<Response<BoxQrCodeResponse>, Status> {
        let session = session_of(&request);
        let req = request.into_inner();

        let image_url = self
            .catalog
            .box_qr_code_url(session.as_ref(), &req.box_id)
            .await?
            .ok_or_else(|| Status::not_found("Box not found"))?;
        Ok(Response::new(BoxQrCodeResponse {
            image_url,
            box_url: self.catalog.box_url(&req.box_id),
        }))
    }
}
