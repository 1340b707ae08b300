use super::common::{PageInfo, PageRequest};
use super::images::Image;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Item {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, optional, tag = "3")]
    pub description: Option<String>,
    #[prost(string, tag = "4")]
    pub box_id: String,
    #[prost(string, optional, tag = "5")]
    pub category: Option<String>,
    #[prost(string, tag = "6")]
    pub date_stored: String,
    #[prost(string, optional, tag = "7")]
    pub barcode: Option<String>,
    #[prost(string, tag = "8")]
    pub created_at: String,
    #[prost(string, tag = "9")]
    pub user_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListItemsRequest {
    /// Free text matched against name, description, category and barcode.
    #[prost(string, tag = "1")]
    pub query: String,
    #[prost(string, tag = "2")]
    pub category: String,
    /// Restrict to one box.
    #[prost(string, tag = "3")]
    pub box_id: String,
    #[prost(message, optional, tag = "4")]
    pub page: Option<PageRequest>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListItemsResponse {
    #[prost(message, repeated, tag = "1")]
    pub items: Vec<Item>,
    #[prost(message, optional, tag = "2")]
    pub page: Option<PageInfo>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetItemRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetItemResponse {
    #[prost(message, optional, tag = "1")]
    pub item: Option<Item>,
    #[prost(message, repeated, tag = "2")]
    pub images: Vec<Image>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateItemRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub box_id: String,
    #[prost(string, optional, tag = "3")]
    pub description: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub category: Option<String>,
    /// RFC 3339; defaults to now.
    #[prost(string, optional, tag = "5")]
    pub date_stored: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub barcode: Option<String>,
}

/// Unset fields are left unchanged; empty optional strings clear the column.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateItemRequest {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, optional, tag = "2")]
    pub name: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub box_id: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub description: Option<String>,
    #[prost(string, optional, tag = "5")]
    pub category: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub date_stored: Option<String>,
    #[prost(string, optional, tag = "7")]
    pub barcode: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteItemRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ItemResponse {
    #[prost(message, optional, tag = "1")]
    pub item: Option<Item>,
    #[prost(string, tag = "2")]
    pub redirect_to: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchByBarcodeRequest {
    #[prost(string, tag = "1")]
    pub barcode: String,
}

include!(concat!(env!("OUT_DIR"), "/garage.items.ItemsService.rs"));
