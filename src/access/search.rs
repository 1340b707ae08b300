use crate::error::AppResult;
use crate::locator::{box_path, item_path, resolve_scan, ScanTarget};
use crate::models::{BoxWithItems, ItemModel};
use crate::search::{SearchFilters, SearchResults};
use crate::store::{BoxFilter, ItemFilter};

use super::{Catalog, Session};

/// What a scanned code resolved to for the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Box(BoxWithItems),
    /// Items carrying the scanned product barcode.
    Items(Vec<ItemModel>),
    NotFound,
}

impl ScanOutcome {
    /// Page to navigate to: the box, the single matching item, or the search
    /// screen when several items share the barcode.
    pub fn redirect_to(&self, scanned: &str) -> Option<String> {
        match self {
            ScanOutcome::Box(found) => Some(box_path(&found.record.id)),
            ScanOutcome::Items(items) if items.len() == 1 => Some(item_path(&items[0].id)),
            ScanOutcome::Items(_) => Some(format!("/search?q={}", urlencoding::encode(scanned.trim()))),
            ScanOutcome::NotFound => None,
        }
    }
}

impl Catalog {
    /// Runs the box and item searches independently. The text goes to the
    /// store; facets narrow the fetched rows.
    pub async fn search(&self, session: Option<&Session>, filters: &SearchFilters) -> SearchResults {
        let text = filters.text().map(str::to_string);
        let boxes = self
            .query_boxes(
                session,
                &BoxFilter {
                    text: text.clone(),
                    ..Default::default()
                },
            )
            .await;
        let items = self
            .query_items(
                session,
                &ItemFilter {
                    text,
                    ..Default::default()
                },
            )
            .await;

        SearchResults {
            boxes: filters.apply(boxes),
            items: filters.apply(items),
        }
    }

    /// Looks up whatever a scanned QR code or barcode points at.
    pub async fn resolve_scan(&self, session: Option<&Session>, text: &str) -> AppResult<ScanOutcome> {
        let found = match resolve_scan(text) {
            ScanTarget::Box(id) => self.get_box(session, &id).await?,
            ScanTarget::QrCode(qr_code_id) => self.get_box_by_qr_code(session, &qr_code_id).await?,
            ScanTarget::Barcode(barcode) => {
                super::require_session(session)?;
                let items = self.find_items_by_barcode(session, &barcode).await;
                return Ok(if items.is_empty() {
                    ScanOutcome::NotFound
                } else {
                    ScanOutcome::Items(items)
                });
            }
        };
        Ok(found.map_or(ScanOutcome::NotFound, ScanOutcome::Box))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::testing::{alice, bob, fixture};
    use crate::error::AppError;
    use crate::models::{Location, NewBox, NewItem};
    use crate::search::ResultTab;

    #[tokio::test]
    async fn test_combined_search() {
        let fx = fixture();
        let a = alice();
        let winter = fx
            .catalog
            .create_box(Some(&a), NewBox::new("Winter Gear", Location::Attic))
            .await
            .unwrap();
        fx.catalog
            .create_item(Some(&a), NewItem::new("Wool Coat", &winter.id).with_category("Clothes"))
            .await
            .unwrap();
        fx.catalog
            .create_box(Some(&a), NewBox::new("Coat Hooks", Location::Garage).with_category("Tools"))
            .await
            .unwrap();

        let results = fx
            .catalog
            .search(Some(&a), &SearchFilters::new().query("COAT"))
            .await;
        assert_eq!(results.count(ResultTab::Boxes), 1);
        assert_eq!(results.count(ResultTab::Items), 1);
        assert_eq!(results.total(), 2);

        let narrowed = fx
            .catalog
            .search(
                Some(&a),
                &SearchFilters::new().query("coat").location(Location::Attic),
            )
            .await;
        assert!(narrowed.boxes.is_empty());
        assert_eq!(narrowed.items.len(), 1);

        assert!(fx
            .catalog
            .search(Some(&a), &SearchFilters::new().query("boots"))
            .await
            .is_empty());
        assert!(fx
            .catalog
            .search(Some(&bob()), &SearchFilters::new().query("coat"))
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_facets_without_text() {
        let fx = fixture();
        let a = alice();
        for (name, location, category) in [
            ("A", Location::Garage, "Tools"),
            ("B", Location::Attic, "Tools"),
            ("C", Location::Garage, "Kitchen"),
        ] {
            fx.catalog
                .create_box(Some(&a), NewBox::new(name, location).with_category(category))
                .await
                .unwrap();
        }
        let results = fx
            .catalog
            .search(
                Some(&a),
                &SearchFilters::new().location(Location::Garage).category("Tools"),
            )
            .await;
        assert_eq!(results.boxes.len(), 1);
        assert_eq!(results.boxes[0].name, "A");
    }

    #[tokio::test]
    async fn test_resolve_scan() {
        let fx = fixture();
        let a = alice();
        let shed = fx
            .catalog
            .create_box(Some(&a), NewBox::new("Shed", Location::Garage))
            .await
            .unwrap();
        let drill = fx
            .catalog
            .create_item(Some(&a), NewItem::new("Drill", &shed.id).with_barcode("4006381333931"))
            .await
            .unwrap();

        let by_url = fx
            .catalog
            .resolve_scan(Some(&a), &fx.catalog.box_url(&shed.id))
            .await
            .unwrap();
        assert_eq!(by_url.redirect_to("x"), Some(format!("/boxes/{}", shed.id)));

        let by_qr = fx.catalog.resolve_scan(Some(&a), &shed.qr_code_id).await.unwrap();
        assert!(matches!(by_qr, ScanOutcome::Box(ref b) if b.record.id == shed.id));

        let by_barcode = fx.catalog.resolve_scan(Some(&a), "4006381333931").await.unwrap();
        assert_eq!(
            by_barcode.redirect_to("4006381333931"),
            Some(format!("/items/{}", drill.id))
        );

        let foreign = fx.catalog.resolve_scan(Some(&bob()), &shed.qr_code_id).await.unwrap();
        assert_eq!(foreign, ScanOutcome::NotFound);
        assert!(matches!(
            fx.catalog.resolve_scan(None, "123").await,
            Err(AppError::Unauthenticated)
        ));
    }
}
