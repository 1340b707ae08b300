#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Empty {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteResponse {
    /// Rows removed; 0 when the id was unknown or owned by someone else.
    #[prost(uint64, tag = "1")]
    pub deleted: u64,
    #[prost(string, tag = "2")]
    pub redirect_to: String,
}

/// Wire form of a location. `Unspecified` never reaches the domain layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Location {
    Unspecified = 0,
    Garage = 1,
    Attic = 2,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct PageRequest {
    /// 1-based page number; 0 means "no paging".
    #[prost(uint32, tag = "1")]
    pub page: u32,
    #[prost(uint32, tag = "2")]
    pub per_page: u32,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct PageInfo {
    #[prost(uint32, tag = "1")]
    pub page: u32,
    #[prost(uint32, tag = "2")]
    pub per_page: u32,
    #[prost(uint32, tag = "3")]
    pub total_pages: u32,
    #[prost(uint64, tag = "4")]
    pub total_rows: u64,
}
