//! In-memory narrowing of already fetched boxes and items.

use crate::models::{BoxModel, ItemModel, Location};
use crate::store::contains_ci;

/// Suggested categories offered by the box and item forms. Not enforced.
pub const CATEGORIES: [&str; 6] = ["Camping", "Christmas", "Halloween", "Kitchen", "Tools", "Clothes"];

/// Fields a row exposes to searching.
pub trait Searchable {
    /// Text fields matched by free-text search.
    fn text_fields(&self) -> Vec<&str>;

    fn category(&self) -> Option<&str>;

    /// Rows without a location are not narrowed by the location facet.
    fn location(&self) -> Option<Location> {
        None
    }
}

impl Searchable for BoxModel {
    fn text_fields(&self) -> Vec<&str> {
        [
            Some(self.name.as_str()),
            self.category.as_deref(),
            self.description.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn location(&self) -> Option<Location> {
        Some(self.location)
    }
}

impl Searchable for ItemModel {
    fn text_fields(&self) -> Vec<&str> {
        [
            Some(self.name.as_str()),
            self.description.as_deref(),
            self.category.as_deref(),
            self.barcode.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

/// Free text plus optional facets, combined with AND. An absent facet places
/// no constraint; a blank query matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub query: Option<String>,
    pub location: Option<Location>,
    pub category: Option<String>,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Trimmed query, `None` when blank.
    pub fn text(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    fn category_facet(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.text().is_none() && self.location.is_none() && self.category_facet().is_none()
    }

    pub fn matches<T: Searchable>(&self, row: &T) -> bool {
        if let Some(text) = self.text() {
            if !row.text_fields().iter().any(|field| contains_ci(field, text)) {
                return false;
            }
        }
        if let (Some(want), Some(have)) = (self.location, row.location()) {
            if want != have {
                return false;
            }
        }
        if let Some(want) = self.category_facet() {
            if row.category() != Some(want) {
                return false;
            }
        }
        true
    }

    /// Keeps matching rows in their original order.
    pub fn apply<T: Searchable>(&self, rows: Vec<T>) -> Vec<T> {
        rows.into_iter().filter(|row| self.matches(row)).collect()
    }
}

/// Which result count a combined search view reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResultTab {
    #[default]
    All,
    Boxes,
    Items,
}

/// Boxes and items found by two independent searches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub boxes: Vec<BoxModel>,
    pub items: Vec<ItemModel>,
}

impl SearchResults {
    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn total(&self) -> usize {
        self.box_count() + self.item_count()
    }

    pub fn count(&self, tab: ResultTab) -> usize {
        match tab {
            ResultTab::All => self.total(),
            ResultTab::Boxes => self.box_count(),
            ResultTab::Items => self.item_count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_box(name: &str, location: Location, category: Option<&str>) -> BoxModel {
        BoxModel {
            id: name.to_lowercase(),
            name: name.to_string(),
            location,
            category: category.map(str::to_string),
            description: None,
            created_at: Utc::now(),
            qr_code_id: format!("box_0_{}", name.to_lowercase()),
            user_id: "u".to_string(),
        }
    }

    fn make_item(name: &str, category: Option<&str>, barcode: Option<&str>) -> ItemModel {
        let now = Utc::now();
        ItemModel {
            id: name.to_lowercase(),
            name: name.to_string(),
            description: None,
            box_id: "b".to_string(),
            category: category.map(str::to_string),
            date_stored: now,
            barcode: barcode.map(str::to_string),
            created_at: now,
            user_id: "u".to_string(),
        }
    }

    fn names<T: Searchable>(rows: &[T], name: impl Fn(&T) -> &str) -> Vec<String> {
        rows.iter().map(|r| name(r).to_string()).collect()
    }

    #[test]
    fn test_facets_are_conjunctive() {
        let boxes = vec![
            make_box("A", Location::Garage, Some("Tools")),
            make_box("B", Location::Attic, Some("Tools")),
            make_box("C", Location::Garage, Some("Kitchen")),
        ];
        let filters = SearchFilters::new()
            .location(Location::Garage)
            .category("Tools");
        let hits = filters.apply(boxes);
        assert_eq!(names(&hits, |b| &b.name), vec!["A"]);
    }

    #[test]
    fn test_absent_facet_is_unconstrained() {
        let boxes = vec![
            make_box("A", Location::Garage, None),
            make_box("B", Location::Attic, Some("Tools")),
        ];
        assert_eq!(SearchFilters::new().apply(boxes.clone()).len(), 2);
        assert_eq!(SearchFilters::new().query("   ").apply(boxes).len(), 2);
    }

    #[test]
    fn test_text_is_case_insensitive() {
        let boxes = vec![
            make_box("Garage Shelf", Location::Garage, None),
            make_box("Xmas", Location::Attic, Some("Christmas")),
        ];
        let lower = SearchFilters::new().query("garage").apply(boxes.clone());
        let upper = SearchFilters::new().query("GARAGE").apply(boxes);
        assert_eq!(lower, upper);
        assert_eq!(lower.len(), 1);
    }

    #[test]
    fn test_text_searches_item_barcode() {
        let items = vec![
            make_item("Drill", Some("Tools"), Some("4006381333931")),
            make_item("Coat", Some("Clothes"), None),
        ];
        let hits = SearchFilters::new().query("333931").apply(items);
        assert_eq!(names(&hits, |i| &i.name), vec!["Drill"]);
    }

    #[test]
    fn test_location_facet_does_not_narrow_items() {
        let items = vec![make_item("Coat", Some("Clothes"), None)];
        let hits = SearchFilters::new()
            .location(Location::Attic)
            .category("Clothes")
            .apply(items);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_order_is_preserved() {
        let boxes = vec![
            make_box("Tools 3", Location::Garage, None),
            make_box("Tools 2", Location::Garage, None),
            make_box("Tools 1", Location::Garage, None),
        ];
        let filters = SearchFilters::new().query("tools");
        let first = filters.apply(boxes.clone());
        let second = filters.apply(boxes);
        assert_eq!(first, second);
        assert_eq!(names(&first, |b| &b.name), vec!["Tools 3", "Tools 2", "Tools 1"]);
    }

    #[test]
    fn test_result_counts() {
        let results = SearchResults {
            boxes: vec![make_box("A", Location::Garage, None)],
            items: vec![make_item("x", None, None), make_item("y", None, None)],
        };
        assert_eq!(results.count(ResultTab::All), 3);
        assert_eq!(results.count(ResultTab::Boxes), 1);
        assert_eq!(results.count(ResultTab::Items), 2);
    }
}
