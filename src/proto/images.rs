#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Image {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub item_id: String,
    #[prost(string, tag = "3")]
    pub storage_path: String,
    #[prost(string, tag = "4")]
    pub created_at: String,
    #[prost(string, tag = "5")]
    pub user_id: String,
    #[prost(string, tag = "6")]
    pub url: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListImagesRequest {
    #[prost(string, tag = "1")]
    pub item_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListImagesResponse {
    #[prost(message, repeated, tag = "1")]
    pub images: Vec<Image>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UploadImageRequest {
    #[prost(string, tag = "1")]
    pub item_id: String,
    #[prost(string, tag = "2")]
    pub file_name: String,
    #[prost(string, tag = "3")]
    pub content_type: String,
    #[prost(bytes = "vec", tag = "4")]
    pub data: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ImageResponse {
    #[prost(message, optional, tag = "1")]
    pub image: Option<Image>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteImageRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

/// The PNG is rendered by the client from the box URL.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UploadBoxQrCodeRequest {
    #[prost(string, tag = "1")]
    pub box_id: String,
    #[prost(bytes = "vec", tag = "2")]
    pub png: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetBoxQrCodeRequest {
    #[prost(string, tag = "1")]
    pub box_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BoxQrCodeResponse {
    /// Public URL of the stored QR image.
    #[prost(string, tag = "1")]
    pub image_url: String,
    /// URL the QR code encodes.
    #[prost(string, tag = "2")]
    pub box_url: String,
}

include!(concat!(env!("OUT_DIR"), "/garage.images.ImagesService.rs"));
