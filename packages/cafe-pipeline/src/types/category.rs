//! Coffee category codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of coffee preparation types.
///
/// The string codes match the backend enum, so they are written verbatim
/// into the exported SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    HandDrip,
    Espresso,
    Americano,
    Latte,
    Cappuccino,
    FlatWhite,
    ColdBrew,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::HandDrip,
        Category::Espresso,
        Category::Americano,
        Category::Latte,
        Category::Cappuccino,
        Category::FlatWhite,
        Category::ColdBrew,
    ];

    /// Code stored in the database.
    pub fn code(self) -> &'static str {
        match self {
            Category::HandDrip => "HAND_DRIP",
            Category::Espresso => "ESPRESSO",
            Category::Americano => "AMERICANO",
            Category::Latte => "LATTE",
            Category::Cappuccino => "CAPPUCCINO",
            Category::FlatWhite => "FLAT_WHITE",
            Category::ColdBrew => "COLD_BREW",
        }
    }

    /// Display label used by the app.
    pub fn label(self) -> &'static str {
        match self {
            Category::HandDrip => "핸드드립",
            Category::Espresso => "에스프레소",
            Category::Americano => "아메리카노",
            Category::Latte => "라떼",
            Category::Cappuccino => "카푸치노",
            Category::FlatWhite => "플랫화이트",
            Category::ColdBrew => "콜드브루",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
