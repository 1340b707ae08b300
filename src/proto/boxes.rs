use super::common::{PageInfo, PageRequest};
use super::items::Item;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StorageBox {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(enumeration = "super::common::Location", tag = "3")]
    pub location: i32,
    #[prost(string, optional, tag = "4")]
    pub category: Option<String>,
    #[prost(string, optional, tag = "5")]
    pub description: Option<String>,
    #[prost(string, tag = "6")]
    pub created_at: String,
    #[prost(string, tag = "7")]
    pub qr_code_id: String,
    #[prost(string, tag = "8")]
    pub user_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListBoxesRequest {
    /// Free text matched against name, category and description.
    #[prost(string, tag = "1")]
    pub query: String,
    #[prost(enumeration = "super::common::Location", tag = "2")]
    pub location: i32,
    #[prost(string, tag = "3")]
    pub category: String,
    #[prost(message, optional, tag = "4")]
    pub page: Option<PageRequest>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListBoxesResponse {
    #[prost(message, repeated, tag = "1")]
    pub boxes: Vec<StorageBox>,
    #[prost(message, optional, tag = "2")]
    pub page: Option<PageInfo>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetBoxRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetBoxByQrCodeRequest {
    #[prost(string, tag = "1")]
    pub qr_code_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetBoxResponse {
    #[prost(message, optional, tag = "1")]
    pub r#box: Option<StorageBox>,
    #[prost(message, repeated, tag = "2")]
    pub items: Vec<Item>,
    /// URL encoded into the box's QR code.
    #[prost(string, tag = "3")]
    pub box_url: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateBoxRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(enumeration = "super::common::Location", tag = "2")]
    pub location: i32,
    #[prost(string, optional, tag = "3")]
    pub category: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub description: Option<String>,
}

/// Unset fields are left unchanged; an empty category or description clears it.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateBoxRequest {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, optional, tag = "2")]
    pub name: Option<String>,
    #[prost(enumeration = "super::common::Location", optional, tag = "3")]
    pub location: Option<i32>,
    #[prost(string, optional, tag = "4")]
    pub category: Option<String>,
    #[prost(string, optional, tag = "5")]
    pub description: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteBoxRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BoxResponse {
    #[prost(message, optional, tag = "1")]
    pub r#box: Option<StorageBox>,
    #[prost(string, tag = "2")]
    pub redirect_to: String,
}

include!(concat!(env!("OUT_DIR"), "/garage.boxes.BoxesService.rs"));
