//! Testing utilities for building synthetic state blobs.
//!
//! The blobs mimic the map application's client-side cache closely enough
//! for the default [`ExtractorKeys`](crate::types::config::ExtractorKeys).

use serde_json::{json, Map, Value};

use crate::types::state::RawState;

/// Builder for one detail page's state blob.
///
/// # Example
///
/// ```rust
/// use cafe_pipeline::testing::StateBuilder;
///
/// let blob = StateBuilder::place("101", "성수 로스터스", "서울특별시 성동구 연무장길 10")
///     .with_menu("아메리카노", "4,500")
///     .with_menu("소금빵", "3,500")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct StateBuilder {
    id: String,
    detail: Map<String, Value>,
    description: Option<Value>,
    menus: Vec<Value>,
}

impl StateBuilder {
    /// A place-detail entry with a name and road address.
    pub fn place(id: impl Into<String>, name: &str, road_address: &str) -> Self {
        let mut detail = Map::new();
        detail.insert("name".into(), json!(name));
        detail.insert("roadAddress".into(), json!(road_address));

        Self {
            id: id.into(),
            detail,
            description: None,
            menus: Vec::new(),
        }
    }

    /// A blob without any place-detail entry.
    pub fn without_place() -> Self {
        Self {
            id: "0".into(),
            detail: Map::new(),
            description: None,
            menus: Vec::new(),
        }
    }

    pub fn with_category(self, category: &str) -> Self {
        self.with_field("category", json!(category))
    }

    pub fn with_phone(self, virtual_phone: &str) -> Self {
        self.with_field("virtualPhone", json!(virtual_phone))
    }

    /// Coordinates are stored as strings, the way the source serves them.
    pub fn with_coordinate(self, latitude: f64, longitude: f64) -> Self {
        self.with_field(
            "coordinate",
            json!({"x": longitude.to_string(), "y": latitude.to_string()}),
        )
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(json!(description));
        self
    }

    /// Raw field on the place-detail entry.
    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.detail.insert(key.into(), value);
        self
    }

    /// Menu entry with a formatted price string such as "4,500".
    pub fn with_menu(self, name: &str, price: &str) -> Self {
        self.with_menu_entry(json!({"name": name, "price": price}))
    }

    pub fn with_described_menu(self, name: &str, price: &str, description: &str) -> Self {
        self.with_menu_entry(json!({"name": name, "price": price, "description": description}))
    }

    /// Raw menu entry.
    pub fn with_menu_entry(mut self, entry: Value) -> Self {
        self.menus.push(entry);
        self
    }

    pub fn build(self) -> Value {
        let mut root = Map::new();

        if !self.detail.is_empty() {
            root.insert(
                format!("PlaceDetailBase:{}", self.id),
                Value::Object(self.detail),
            );
        }

        if let Some(description) = self.description {
            let mut query = Map::new();
            query.insert(
                format!("placeDetail({{\"input\":{{\"id\":\"{}\"}}}})", self.id),
                json!({ "description({\"source\":[\"shopWindow\"]})": description }),
            );
            root.insert("ROOT_QUERY".into(), Value::Object(query));
        }

        for (i, menu) in self.menus.into_iter().enumerate() {
            root.insert(format!("Menu:{}_{}", self.id, i), menu);
        }

        Value::Object(root)
    }

    pub fn build_state(self) -> RawState {
        RawState::from_value(self.build())
    }
}

/// Shorthand for a place with plain named menus.
pub fn cafe_state(id: &str, name: &str, address: &str, menus: &[(&str, &str)]) -> Value {
    menus
        .iter()
        .fold(StateBuilder::place(id, name, address), |builder, (menu, price)| {
            builder.with_menu(menu, price)
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extract::StateExtractor;

    #[test]
    fn test_builder_round_trips_through_extractor() {
        let state = StateBuilder::place("7", "테스트 커피", "서울특별시 마포구 독막로 1")
            .with_category("카페")
            .with_phone("0507-0000-0000")
            .with_coordinate(37.55, 126.92)
            .with_description("직접 로스팅")
            .with_menu("아메리카노", "4,500")
            .build_state();

        let extracted = StateExtractor::default().extract(&state);
        assert_eq!(extracted.place.name, "테스트 커피");
        assert_eq!(extracted.place.category_hint, "카페");
        assert_eq!(extracted.place.phone, "0507-0000-0000");
        assert_eq!(extracted.place.description, "직접 로스팅");
        assert!(extracted.place.coordinate.is_some());
        assert_eq!(extracted.menus.len(), 1);
        assert_eq!(extracted.menus[0].price, 4500);
    }

    #[test]
    fn test_without_place_is_empty() {
        let state = StateBuilder::without_place().with_menu("라떼", "5000").build_state();
        let extracted = StateExtractor::default().extract(&state);
        assert!(extracted.place.is_empty());
    }
}
