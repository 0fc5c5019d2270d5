//! Category classification - ordered keyword rules, first match wins.
//!
//! Rule order is part of the contract: flat white and cappuccino names often
//! also contain "latte", so they are tested before the broader rules.

use indexmap::IndexMap;

use crate::types::category::Category;

/// One rule: a category and the keywords that select it.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub category: Category,

    /// Case-folded keywords
    keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(category: Category, keywords: &[&str]) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Substring match against an already case-folded name.
    pub fn matches(&self, folded_name: &str) -> bool {
        self.keywords.iter().any(|k| folded_name.contains(k.as_str()))
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// The canonical rule table.
pub fn default_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            Category::FlatWhite,
            &["플랫화이트", "플랫 화이트", "flat white", "flatwhite"],
        ),
        CategoryRule::new(Category::Cappuccino, &["카푸치노", "cappuccino"]),
        CategoryRule::new(
            Category::ColdBrew,
            &["콜드브루", "cold brew", "콜드 브루", "더치커피", "더치 커피"],
        ),
        CategoryRule::new(
            Category::HandDrip,
            &[
                "핸드드립", "핸드 드립", "hand drip", "드립커피", "드립 커피",
                "브루잉", "brewing", "푸어오버", "pour over", "pourover",
                "하리오", "hario", "v60", "케멕스", "chemex",
                "싱글오리진", "single origin", "싱글 오리진",
                // single-origin producing countries
                "에티오피아", "케냐", "콜롬비아", "과테말라", "브라질",
                "코스타리카", "파나마", "게이샤", "gesha", "geisha",
                "예가체프", "yirgacheffe",
                "스페셜티", "specialty",
            ],
        ),
        CategoryRule::new(
            Category::Espresso,
            &[
                "에스프레소", "espresso",
                "아인슈페너", "einspanner", "슈페너",
                "리스트레토", "ristretto", "도피오", "doppio",
                "마끼아또", "마키아또", "마키아토", "macchiato",
                "아포가토", "affogato", "콘파나", "con panna",
                "비엔나커피", "비엔나 커피",
            ],
        ),
        CategoryRule::new(
            Category::Americano,
            &["아메리카노", "americano", "롱블랙", "long black"],
        ),
        CategoryRule::new(
            Category::Latte,
            &["라떼", "라테", "latte", "카페라떼", "cafe latte", "모카", "mocha"],
        ),
    ]
}

/// Assigns categories to menu names and aggregates them per store.
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    rules: Vec<CategoryRule>,
    fallback: Category,
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::new(default_rules(), Category::Americano)
    }
}

impl CategoryClassifier {
    pub fn new(rules: Vec<CategoryRule>, fallback: Category) -> Self {
        Self { rules, fallback }
    }

    pub fn with_fallback(mut self, fallback: Category) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback(&self) -> Category {
        self.fallback
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// First rule (in order) with any keyword contained in the name.
    pub fn classify(&self, menu_name: &str) -> Option<Category> {
        let folded = menu_name.trim().to_lowercase();
        if folded.is_empty() {
            return None;
        }

        self.rules
            .iter()
            .find(|rule| rule.matches(&folded))
            .map(|rule| rule.category)
    }

    /// Majority category over the names; ties go to the category seen
    /// first. No classifiable names gives the fallback.
    pub fn aggregate<I, S>(&self, menu_names: I) -> Category
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts: IndexMap<Category, usize> = IndexMap::new();
        for name in menu_names {
            if let Some(category) = self.classify(name.as_ref()) {
                *counts.entry(category).or_insert(0) += 1;
            }
        }

        // max_by_key keeps the last maximum, so walk in reverse to keep the first.
        counts
            .iter()
            .rev()
            .max_by_key(|(_, count)| **count)
            .map(|(category, _)| *category)
            .unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_classify_examples() {
        let classifier = CategoryClassifier::default();
        assert_eq!(classifier.classify("아이스 카페라떼"), Some(Category::Latte));
        assert_eq!(classifier.classify("카푸치노 플랫화이트"), Some(Category::FlatWhite));
        assert_eq!(classifier.classify("딸기스무디"), None);
        assert_eq!(classifier.classify(""), None);
    }

    #[test]
    fn test_rule_order_beats_later_matches() {
        let classifier = CategoryClassifier::default();
        assert_eq!(classifier.classify("카푸치노 라떼"), Some(Category::Cappuccino));
        assert_eq!(classifier.classify("에티오피아 콜드브루"), Some(Category::ColdBrew));
        assert_eq!(classifier.classify("에스프레소 라떼"), Some(Category::Espresso));
        assert_eq!(classifier.classify("Iced Americano"), Some(Category::Americano));
        assert_eq!(classifier.classify("FLAT WHITE"), Some(Category::FlatWhite));
        assert_eq!(classifier.classify("카페모카"), Some(Category::Latte));
    }

    #[test]
    fn test_canonical_order() {
        let order: Vec<_> = default_rules().iter().map(|r| r.category).collect();
        assert_eq!(
            order,
            vec![
                Category::FlatWhite,
                Category::Cappuccino,
                Category::ColdBrew,
                Category::HandDrip,
                Category::Espresso,
                Category::Americano,
                Category::Latte,
            ]
        );
    }

    #[test]
    fn test_aggregate_majority() {
        let classifier = CategoryClassifier::default();
        assert_eq!(
            classifier.aggregate(["카페라떼", "바닐라 라떼", "아메리카노"]),
            Category::Latte
        );
    }

    #[test]
    fn test_aggregate_tie_goes_to_first_seen() {
        let classifier = CategoryClassifier::default();
        assert_eq!(
            classifier.aggregate(["아메리카노", "카페라떼", "카페라떼", "롱블랙"]),
            Category::Americano
        );
        assert_eq!(
            classifier.aggregate(["콜드브루", "핸드드립"]),
            Category::ColdBrew
        );
    }

    #[test]
    fn test_aggregate_fallback() {
        let classifier = CategoryClassifier::default();
        assert_eq!(classifier.aggregate(["시그니처", "오늘의 커피"]), Category::Americano);
        assert_eq!(classifier.aggregate(Vec::<String>::new()), Category::Americano);
        assert_eq!(
            classifier.with_fallback(Category::HandDrip).aggregate(["?"]),
            Category::HandDrip
        );
    }

    proptest! {
        #[test]
        fn prop_classify_ignores_case(name in "[a-zA-Z ]{0,24}") {
            let classifier = CategoryClassifier::default();
            prop_assert_eq!(
                classifier.classify(&name.to_uppercase()),
                classifier.classify(&name.to_lowercase())
            );
        }

        #[test]
        fn prop_aggregate_is_a_classified_category_or_fallback(
            names in proptest::collection::vec("[a-z가-힣 ]{0,12}", 0..8)
        ) {
            let classifier = CategoryClassifier::default();
            let result = classifier.aggregate(&names);
            let classified: Vec<_> = names.iter().filter_map(|n| classifier.classify(n)).collect();
            if classified.is_empty() {
                prop_assert_eq!(result, classifier.fallback());
            } else {
                prop_assert!(classified.contains(&result));
            }
        }
    }
}
