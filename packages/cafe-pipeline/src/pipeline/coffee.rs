//! Coffee classification - blacklist keywords plus a price band.
//!
//! Menu naming is too varied to enumerate coffee drinks, but non-coffee
//! categories form a closed set. Anything not excluded and not obviously
//! mispriced counts as coffee.

use tracing::trace;

use crate::types::config::{CoffeeFilterConfig, PriceBand};
use crate::types::place::{MenuCandidate, MenuItem};

/// Why a listing was or was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoffeeVerdict {
    Accepted,
    EmptyName,
    Blacklisted(String),
    OutOfPriceBand(u32),
}

impl CoffeeVerdict {
    pub fn is_coffee(&self) -> bool {
        matches!(self, CoffeeVerdict::Accepted)
    }
}

/// Decides whether a menu listing is a coffee item.
#[derive(Debug, Clone)]
pub struct CoffeeClassifier {
    /// Case-folded keywords
    blacklist: Vec<String>,
    price_band: PriceBand,
}

impl Default for CoffeeClassifier {
    fn default() -> Self {
        Self::new(&CoffeeFilterConfig::default())
    }
}

impl CoffeeClassifier {
    pub fn new(config: &CoffeeFilterConfig) -> Self {
        Self {
            blacklist: config
                .blacklist
                .iter()
                .map(|k| k.to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            price_band: config.price_band,
        }
    }

    /// Blacklist first, then price (0 = unknown never rejects).
    pub fn verdict(&self, name: &str, description: &str, price: u32) -> CoffeeVerdict {
        if name.trim().is_empty() {
            return CoffeeVerdict::EmptyName;
        }

        let text = format!("{} {}", name, description).to_lowercase();
        if let Some(keyword) = self.blacklist.iter().find(|k| text.contains(k.as_str())) {
            return CoffeeVerdict::Blacklisted(keyword.clone());
        }

        if price > 0 && !self.price_band.contains(price) {
            return CoffeeVerdict::OutOfPriceBand(price);
        }

        CoffeeVerdict::Accepted
    }

    pub fn is_coffee(&self, name: &str, description: &str, price: u32) -> bool {
        self.verdict(name, description, price).is_coffee()
    }

    /// Keep only coffee candidates, converted to menu items.
    pub fn filter(&self, candidates: Vec<MenuCandidate>) -> Vec<MenuItem> {
        candidates
            .into_iter()
            .filter(|c| {
                let verdict = self.verdict(&c.name, &c.description, c.price);
                if !verdict.is_coffee() {
                    trace!(menu = %c.name, ?verdict, "Rejected menu");
                }
                verdict.is_coffee()
            })
            .map(MenuItem::from)
            .collect()
    }
}
