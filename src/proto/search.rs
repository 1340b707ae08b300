use super::boxes::StorageBox;
use super::items::Item;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ResultTab {
    All = 0,
    Boxes = 1,
    Items = 2,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchRequest {
    #[prost(string, tag = "1")]
    pub query: String,
    #[prost(enumeration = "super::common::Location", tag = "2")]
    pub location: i32,
    #[prost(string, tag = "3")]
    pub category: String,
    #[prost(enumeration = "ResultTab", tag = "4")]
    pub tab: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchResponse {
    #[prost(message, repeated, tag = "1")]
    pub boxes: Vec<StorageBox>,
    #[prost(message, repeated, tag = "2")]
    pub items: Vec<Item>,
    #[prost(uint64, tag = "3")]
    pub box_count: u64,
    #[prost(uint64, tag = "4")]
    pub item_count: u64,
    /// Count for the requested tab.
    #[prost(uint64, tag = "5")]
    pub total: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResolveScanRequest {
    #[prost(string, tag = "1")]
    pub text: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResolveScanResponse {
    /// Detail screen to open, empty when nothing matched.
    #[prost(string, tag = "1")]
    pub redirect_to: String,
    #[prost(message, optional, tag = "2")]
    pub r#box: Option<StorageBox>,
    #[prost(message, repeated, tag = "3")]
    pub items: Vec<Item>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListCategoriesResponse {
    #[prost(string, repeated, tag = "1")]
    pub categories: Vec<String>,
}

include!(concat!(env!("OUT_DIR"), "/garage.search.SearchService.rs"));
