//! Place and menu types produced by state extraction.

use serde::{Deserialize, Serialize};

use crate::types::category::Category;

/// Geographic coordinate (x = longitude, y = latitude in the source).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// A physical store as captured from one detail page.
///
/// Extraction is total, so every field may be empty. An empty `name`
/// means extraction failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,

    /// Free-text category from the source (e.g. "카페,디저트")
    pub category_hint: String,

    /// Road address when available, otherwise the plain address
    pub address: String,

    pub phone: String,

    pub coordinate: Option<Coordinate>,

    pub description: String,
}

impl Place {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn with_category_hint(mut self, hint: impl Into<String>) -> Self {
        self.category_hint = hint.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_coordinate(mut self, latitude: f64, longitude: f64) -> Self {
        self.coordinate = Some(Coordinate {
            latitude,
            longitude,
        });
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// True when the detail page yielded nothing usable.
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
    }

    /// Deduplication key: trimmed address with internal whitespace collapsed.
    pub fn address_key(&self) -> String {
        normalize_address(&self.address)
    }
}

/// Collapse runs of whitespace and trim, so "서울  중구 " and "서울 중구"
/// identify the same store.
pub fn normalize_address(address: &str) -> String {
    address.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A raw menu listing before coffee classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuCandidate {
    pub name: String,

    /// Price in integer currency units, 0 when unknown
    pub price: u32,

    pub description: String,
}

impl MenuCandidate {
    pub fn new(name: impl Into<String>, price: u32) -> Self {
        Self {
            name: name.into(),
            price,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A candidate accepted as coffee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    pub price: u32,
    pub description: String,

    /// Assigned by the category classifier, `None` until then
    pub category: Option<Category>,
}

impl From<MenuCandidate> for MenuItem {
    fn from(candidate: MenuCandidate) -> Self {
        Self {
            name: candidate.name,
            price: candidate.price,
            description: candidate.description,
            category: None,
        }
    }
}

/// A place with at least one coffee menu item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub place: Place,
    pub menus: Vec<MenuItem>,
}

impl Store {
    /// Build a store, refusing places without coffee menus.
    pub fn new(place: Place, menus: Vec<MenuItem>) -> Option<Self> {
        if menus.is_empty() {
            return None;
        }
        Some(Self { place, menus })
    }
}
