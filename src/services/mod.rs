pub mod auth_service;
pub mod boxes_service;
pub mod health_service;
pub mod images_service;
pub mod items_service;
pub mod search_service;

pub use auth_service::AuthServiceImpl;
pub use boxes_service::BoxesServiceImpl;
pub use health_service::HealthServiceImpl;
pub use images_service::ImagesServiceImpl;
pub use items_service::ItemsServiceImpl;
pub use search_service::SearchServiceImpl;

use chrono::{DateTime, Utc};
use tonic::Request;

use crate::access::{Catalog, Session};
use crate::error::{AppError, AppResult};
use crate::models::{BoxModel, ImageModel, ItemModel, Location};
use crate::pagination::paginate;
use crate::proto;

/// Session placed in the request extensions by the auth middleware.
pub(crate) fn session_of<T>(request: &Request<T>) -> Option<Session> {
    request.extensions().get::<Session>().cloned()
}

/// `Unspecified` means "no location given".
pub(crate) fn location_from_proto(value: i32) -> AppResult<Option<Location>> {
    match proto::common::Location::try_from(value) {
        Ok(proto::common::Location::Unspecified) => Ok(None),
        Ok(proto::common::Location::Garage) => Ok(Some(Location::Garage)),
        Ok(proto::common::Location::Attic) => Ok(Some(Location::Attic)),
        Err(_) => Err(AppError::InvalidInput(format!("unknown location {}", value))),
    }
}

pub(crate) fn location_to_proto(location: Location) -> i32 {
    match location {
        Location::Garage => proto::common::Location::Garage as i32,
        Location::Attic => proto::common::Location::Attic as i32,
    }
}

/// Empty strings mean "not given".
pub(crate) fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Optional field of an update: unset leaves the column, empty clears it.
pub(crate) fn clearable(value: Option<String>) -> Option<Option<String>> {
    value.map(non_empty)
}

pub(crate) fn parse_timestamp(field: &str, value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| AppError::InvalidInput(format!("{} must be an RFC 3339 timestamp", field)))
}

pub(crate) fn box_to_proto(model: &BoxModel) -> proto::boxes::StorageBox {
    proto::boxes::StorageBox {
        id: model.id.clone(),
        name: model.name.clone(),
        location: location_to_proto(model.location),
        category: model.category.clone(),
        description: model.description.clone(),
        created_at: model.created_at.to_rfc3339(),
        qr_code_id: model.qr_code_id.clone(),
        user_id: model.user_id.clone(),
    }
}

pub(crate) fn item_to_proto(model: &ItemModel) -> proto::items::Item {
    proto::items::Item {
        id: model.id.clone(),
        name: model.name.clone(),
        description: model.description.clone(),
        box_id: model.box_id.clone(),
        category: model.category.clone(),
        date_stored: model.date_stored.to_rfc3339(),
        barcode: model.barcode.clone(),
        created_at: model.created_at.to_rfc3339(),
        user_id: model.user_id.clone(),
    }
}

pub(crate) fn image_to_proto(catalog: &Catalog, model: &ImageModel) -> proto::images::Image {
    proto::images::Image {
        id: model.id.clone(),
        item_id: model.item_id.clone(),
        storage_path: model.storage_path.clone(),
        created_at: model.created_at.to_rfc3339(),
        user_id: model.user_id.clone(),
        url: catalog.image_url(model),
    }
}

/// Applies the requested page, if any. Without a page request every row is
/// returned and no page info is reported.
pub(crate) fn page_rows<T>(
    rows: Vec<T>,
    page: Option<proto::common::PageRequest>,
) -> (Vec<T>, Option<proto::common::PageInfo>) {
    match page.filter(|p| p.page > 0) {
        None => (rows, None),
        Some(request) => {
            let page = paginate(rows, request.page as usize, request.per_page as usize);
            let info = proto::common::PageInfo {
                page: page.page as u32,
                per_page: page.per_page as u32,
                total_pages: page.total_pages as u32,
                total_rows: page.total_rows as u64,
            };
            (page.rows, Some(info))
        }
    }
}
