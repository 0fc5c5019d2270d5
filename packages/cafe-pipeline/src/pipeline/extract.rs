//! State extraction - recover a place and its menu listings from a state blob.
//!
//! Extraction never fails. Missing or malformed entries degrade to empty
//! fields, and the collector treats an empty place name as a miss.

use serde_json::Value;
use tracing::debug;

use crate::types::config::ExtractorKeys;
use crate::types::place::{Coordinate, MenuCandidate, Place};
use crate::types::state::{f64_field, first_with_prefix, non_empty_str, str_field, RawState};

/// Output of one extraction pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extracted {
    pub place: Place,
    pub menus: Vec<MenuCandidate>,
}

/// Reads places and menus out of the client-side cache.
#[derive(Debug, Clone, Default)]
pub struct StateExtractor {
    keys: ExtractorKeys,
}

impl StateExtractor {
    pub fn new(keys: ExtractorKeys) -> Self {
        Self { keys }
    }

    /// Extract both the place and the menu candidates.
    pub fn extract(&self, state: &RawState) -> Extracted {
        let extracted = Extracted {
            place: self.extract_place(state),
            menus: self.extract_menus(state),
        };

        debug!(
            name = %extracted.place.name,
            menus = extracted.menus.len(),
            "Extracted state blob"
        );

        extracted
    }

    /// Place fields from the first place-detail entry, plus the description
    /// from the root query.
    pub fn extract_place(&self, state: &RawState) -> Place {
        let mut place = state
            .with_prefix(&self.keys.place_detail_prefix)
            .next()
            .map(|(_, detail)| place_from_detail(detail))
            .unwrap_or_default();

        if let Some(description) = self.extract_description(state) {
            place.description = description;
        }

        place
    }

    /// Description nested under `ROOT_QUERY → placeDetail({..}) → description({..})`.
    ///
    /// Only the first place-detail query is consulted.
    pub fn extract_description(&self, state: &RawState) -> Option<String> {
        let root = state.get(&self.keys.root_query_key)?;
        let (_, detail) = first_with_prefix(root, &self.keys.root_place_detail_prefix)?;
        let (_, description) = first_with_prefix(detail, &self.keys.description_prefix)?;

        Some(description.as_str().unwrap_or_default().to_string())
    }

    /// All menu entries with a non-empty name, in document order.
    pub fn extract_menus(&self, state: &RawState) -> Vec<MenuCandidate> {
        state
            .with_prefix(&self.keys.menu_prefix)
            .filter_map(|(_, entry)| menu_from_entry(entry))
            .collect()
    }
}

fn place_from_detail(detail: &Value) -> Place {
    let address = non_empty_str(detail, "roadAddress")
        .or_else(|| non_empty_str(detail, "address"))
        .unwrap_or_default();
    let phone = non_empty_str(detail, "virtualPhone")
        .or_else(|| non_empty_str(detail, "phone"))
        .unwrap_or_default();

    Place {
        name: str_field(detail, "name").unwrap_or_default().trim().to_string(),
        category_hint: str_field(detail, "category").unwrap_or_default().to_string(),
        address: address.to_string(),
        phone: phone.to_string(),
        coordinate: detail.get("coordinate").and_then(coordinate_from),
        description: String::new(),
    }
}

fn coordinate_from(value: &Value) -> Option<Coordinate> {
    Some(Coordinate {
        latitude: f64_field(value, "y")?,
        longitude: f64_field(value, "x")?,
    })
}

fn menu_from_entry(entry: &Value) -> Option<MenuCandidate> {
    let name = str_field(entry, "name")?.trim();
    if name.is_empty() {
        return None;
    }

    let description = str_field(entry, "description").unwrap_or_default().trim();

    Some(MenuCandidate {
        name: name.to_string(),
        price: entry.get("price").map(parse_price).unwrap_or(0),
        description: description.to_string(),
    })
}

/// Price from a number or a formatted string like "6,500원".
///
/// Strings keep only their digits. Input with no usable number is 0, and
/// values too large for `u32` saturate so the price band still sees them.
pub fn parse_price(value: &Value) -> u32 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .map(|p| u32::try_from(p).unwrap_or(u32::MAX))
            .unwrap_or(0),
        Value::String(s) => {
            let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                0
            } else {
                digits.parse().unwrap_or(u32::MAX)
            }
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_state() -> RawState {
        RawState::from_value(json!({
            "PlaceDetailBase:1234": {
                "name": "테스트 로스터스",
                "category": "카페,디저트",
                "roadAddress": "서울특별시 성동구 연무장길 10",
                "address": "서울특별시 성동구 성수동2가 1-1",
                "virtualPhone": "0507-1234-5678",
                "phone": "02-000-0000",
                "coordinate": {"x": "127.0565", "y": "37.5432"}
            },
            "ROOT_QUERY": {
                "placeDetail({\"input\":{\"id\":\"1234\"}})": {
                    "description({\"source\":[\"shopWindow\"]})": "매일 볶는 스페셜티"
                }
            },
            "Menu:1234_0": {"name": " 아메리카노 ", "price": "4,500", "description": "고소한 블렌드"},
            "Menu:1234_1": {"name": "", "price": "5000"},
            "Menu:1234_2": {"name": "핸드드립", "price": "7000원~"},
            "Menu:1234_3": {"name": "시즌 메뉴", "price": "시가"}
        }))
    }

    #[test]
    fn test_extracts_place_fields() {
        let place = StateExtractor::default().extract_place(&sample_state());

        assert_eq!(place.name, "테스트 로스터스");
        assert_eq!(place.category_hint, "카페,디저트");
        assert_eq!(place.address, "서울특별시 성동구 연무장길 10");
        assert_eq!(place.phone, "0507-1234-5678");
        assert_eq!(place.description, "매일 볶는 스페셜티");

        let coordinate = place.coordinate.unwrap();
        assert!((coordinate.latitude - 37.5432).abs() < 1e-9);
        assert!((coordinate.longitude - 127.0565).abs() < 1e-9);
    }

    #[test]
    fn test_falls_back_to_plain_address_and_phone() {
        let state = RawState::from_value(json!({
            "PlaceDetailBase:1": {
                "name": "카페",
                "roadAddress": null,
                "address": "서울특별시 마포구 합정동 1",
                "phone": "02-111-2222"
            }
        }));

        let place = StateExtractor::default().extract_place(&state);
        assert_eq!(place.address, "서울특별시 마포구 합정동 1");
        assert_eq!(place.phone, "02-111-2222");
        assert!(place.coordinate.is_none());
        assert_eq!(place.description, "");
    }

    #[test]
    fn test_only_first_place_detail_is_used() {
        let state = RawState::from_value(json!({
            "PlaceDetailBase:1": {"name": "첫번째"},
            "PlaceDetailBase:2": {"name": "두번째"}
        }));

        assert_eq!(StateExtractor::default().extract_place(&state).name, "첫번째");
    }

    #[test]
    fn test_missing_place_yields_empty_place() {
        let state = RawState::from_value(json!({"Menu:1": {"name": "아메리카노"}}));
        let extracted = StateExtractor::default().extract(&state);

        assert!(extracted.place.is_empty());
        assert_eq!(extracted.menus.len(), 1);
    }

    #[test]
    fn test_extracts_menus_and_skips_nameless() {
        let menus = StateExtractor::default().extract_menus(&sample_state());

        assert_eq!(menus.len(), 3);
        assert_eq!(menus[0].name, "아메리카노");
        assert_eq!(menus[0].price, 4500);
        assert_eq!(menus[0].description, "고소한 블렌드");
        assert_eq!(menus[1].price, 7000);
        assert_eq!(menus[2].price, 0);
    }

    #[test]
    fn test_malformed_nesting_degrades() {
        let state = RawState::from_value(json!({
            "PlaceDetailBase:1": "not an object",
            "ROOT_QUERY": ["nope"],
            "Menu:1": 42,
            "Menu:2": {"name": 7}
        }));

        let extracted = StateExtractor::default().extract(&state);
        assert!(extracted.place.is_empty());
        assert!(extracted.menus.is_empty());
    }

    #[test]
    fn test_null_description_becomes_empty() {
        let state = RawState::from_value(json!({
            "PlaceDetailBase:1": {"name": "카페"},
            "ROOT_QUERY": {"placeDetail({})": {"description({})": null}}
        }));

        let place = StateExtractor::default().extract_place(&state);
        assert_eq!(place.description, "");
    }

    #[test]
    fn test_parse_price_variants() {
        assert_eq!(parse_price(&json!(4500)), 4500);
        assert_eq!(parse_price(&json!(4500.0)), 4500);
        assert_eq!(parse_price(&json!(-3)), 0);
        assert_eq!(parse_price(&json!("₩ 5,800")), 5800);
        assert_eq!(parse_price(&json!("")), 0);
        assert_eq!(parse_price(&json!("99999999999999")), u32::MAX);
        assert_eq!(parse_price(&json!("99,999,999,999원")), u32::MAX);
        assert_eq!(parse_price(&json!(5_000_000_000u64)), u32::MAX);
        assert_eq!(parse_price(&json!(2.0e10)), u32::MAX);
        assert_eq!(parse_price(&json!("가격 문의")), 0);
        assert_eq!(parse_price(&Value::Null), 0);
    }
}
