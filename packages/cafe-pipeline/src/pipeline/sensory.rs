//! Sensory score estimation for roasted beans.
//!
//! Sweetness and bitterness are derived from the roast level and the bean's
//! flavor tags. The remaining attributes come from an external cupping
//! source and are only rounded. Derived values are clamped; passed-through
//! values are validated instead, so bad source data fails the batch.

use std::collections::{BTreeSet, HashMap};

use crate::error::{BoundViolation, ExportError, ExportResult};
use crate::types::bean::{Bean, FlavorId, RoastLevel, SensoryScore, SourceScore};

pub const SCORE_MIN: i64 = 1;
pub const SCORE_MAX: i64 = 10;

/// Flavor ids in the SWEET branch of the flavor wheel.
pub const SWEET_TAGS: &[FlavorId] = &[
    8, // SWEET
    801, 802, 803, 804, 805,
    80101, 80102, 80103, 80104, // molasses, maple, caramel, honey
];

/// Flavor ids that read as bitter: ROASTED branch, chemical bitter, dark chocolate.
pub const BITTER_TAGS: &[FlavorId] = &[
    5, // ROASTED
    501, 502, 503, 504,
    50301, 50302, 50303, 50304, // acrid, ashy, smoky, brown roast
    40201,
    70201, 70202,
];

const MAX_SWEET_BONUS: usize = 4;
const MAX_BITTER_BONUS: usize = 2;

fn base_sweetness(roast: Option<RoastLevel>) -> i64 {
    match roast {
        Some(RoastLevel::Light) => 6,
        Some(RoastLevel::Medium) | None => 5,
        Some(RoastLevel::Heavy) => 3,
    }
}

fn base_bitterness(roast: Option<RoastLevel>) -> i64 {
    match roast {
        Some(RoastLevel::Light) => 2,
        Some(RoastLevel::Medium) | None => 5,
        Some(RoastLevel::Heavy) => 8,
    }
}

fn matching(tags: &BTreeSet<FlavorId>, taxonomy: &[FlavorId]) -> usize {
    tags.iter().filter(|t| taxonomy.contains(t)).count()
}

fn clamp_score(value: i64) -> i64 {
    value.clamp(SCORE_MIN, SCORE_MAX)
}

/// `base_sweet[roast] + min(|tags ∩ SWEET|, 4)`, clamped to [1, 10].
pub fn sweetness(tags: &BTreeSet<FlavorId>, roast: Option<RoastLevel>) -> i64 {
    let bonus = matching(tags, SWEET_TAGS).min(MAX_SWEET_BONUS) as i64;
    clamp_score(base_sweetness(roast).saturating_add(bonus))
}

/// `base_bitter[roast] + min(|tags ∩ BITTER|, 2)`, clamped to [1, 10].
pub fn bitterness(tags: &BTreeSet<FlavorId>, roast: Option<RoastLevel>) -> i64 {
    let bonus = matching(tags, BITTER_TAGS).min(MAX_BITTER_BONUS) as i64;
    clamp_score(base_bitterness(roast).saturating_add(bonus))
}

fn round_score(value: f64) -> i64 {
    if value.is_finite() {
        value.round() as i64
    } else {
        // NaN/inf can never be in range; map to a value validation rejects.
        0
    }
}

/// Combine a source score with the bean it belongs to.
///
/// Beans missing from the lookup are treated as medium roast with no tags.
pub fn estimate(source: &SourceScore, bean: Option<&Bean>) -> SensoryScore {
    let empty = BTreeSet::new();
    let (roast, tags) = match bean {
        Some(b) => (b.roast_level, &b.flavor_tags),
        None => (None, &empty),
    };

    SensoryScore {
        bean_id: source.bean_id,
        acidity: round_score(source.acidity),
        body: round_score(source.body),
        sweetness: sweetness(tags, roast),
        bitterness: bitterness(tags, roast),
        aroma: round_score(source.aroma),
        flavor: round_score(source.flavor),
        aftertaste: round_score(source.aftertaste),
        total_score: round_score(source.rating),
        roast_level: roast.unwrap_or(RoastLevel::Medium),
        flavor_tags: tags.iter().copied().collect(),
    }
}

/// Estimate a whole batch.
pub fn estimate_batch(sources: &[SourceScore], beans: &HashMap<u32, Bean>) -> Vec<SensoryScore> {
    sources
        .iter()
        .map(|s| estimate(s, beans.get(&s.bean_id)))
        .collect()
}

/// Reject the batch if any attribute of any row is outside [1, 10].
///
/// The error lists each offending column with its row count.
pub fn validate(scores: &[SensoryScore]) -> ExportResult<()> {
    let mut violations: Vec<BoundViolation> = Vec::new();

    for (i, (column, _)) in scores
        .first()
        .map(|s| s.attributes())
        .unwrap_or_default()
        .iter()
        .enumerate()
    {
        let rows = scores
            .iter()
            .filter(|s| {
                let value = s.attributes()[i].1;
                !(SCORE_MIN..=SCORE_MAX).contains(&value)
            })
            .count();

        if rows > 0 {
            violations.push(BoundViolation {
                column: column.to_string(),
                rows,
            });
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ExportError::DataQuality(violations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tags(ids: &[FlavorId]) -> BTreeSet<FlavorId> {
        ids.iter().copied().collect()
    }

    fn source(bean_id: u32, value: f64) -> SourceScore {
        SourceScore {
            bean_id,
            acidity: value,
            body: value,
            aroma: value,
            flavor: value,
            aftertaste: value,
            rating: value,
        }
    }

    #[test]
    fn test_base_values_by_roast() {
        let none = tags(&[]);
        assert_eq!(sweetness(&none, Some(RoastLevel::Light)), 6);
        assert_eq!(sweetness(&none, Some(RoastLevel::Medium)), 5);
        assert_eq!(sweetness(&none, Some(RoastLevel::Heavy)), 3);
        assert_eq!(bitterness(&none, Some(RoastLevel::Light)), 2);
        assert_eq!(bitterness(&none, Some(RoastLevel::Medium)), 5);
        assert_eq!(bitterness(&none, Some(RoastLevel::Heavy)), 8);
    }

    #[test]
    fn test_unknown_roast_uses_medium() {
        let t = tags(&[801, 5]);
        let unknown = RoastLevel::parse_lenient("FRENCH");
        assert_eq!(sweetness(&t, unknown), 6);
        assert_eq!(bitterness(&t, unknown), 6);
    }

    #[test]
    fn test_bonuses_are_capped() {
        let sweet_heavy = tags(SWEET_TAGS);
        assert_eq!(sweetness(&sweet_heavy, Some(RoastLevel::Light)), 10);
        assert_eq!(sweetness(&sweet_heavy, Some(RoastLevel::Heavy)), 7);

        let bitter_heavy = tags(BITTER_TAGS);
        assert_eq!(bitterness(&bitter_heavy, Some(RoastLevel::Heavy)), 10);
        assert_eq!(bitterness(&bitter_heavy, Some(RoastLevel::Light)), 4);
    }

    #[test]
    fn test_unrelated_tags_do_not_count() {
        let t = tags(&[1, 2, 3, 901]);
        assert_eq!(sweetness(&t, Some(RoastLevel::Medium)), 5);
        assert_eq!(bitterness(&t, Some(RoastLevel::Medium)), 5);
    }

    #[test]
    fn test_estimate_rounds_pass_through_columns() {
        let bean = Bean::new(7, Some(RoastLevel::Light)).with_tags([801, 80103]);
        let score = estimate(
            &SourceScore {
                bean_id: 7,
                acidity: 7.6,
                body: 5.4,
                aroma: 8.5,
                flavor: 6.0,
                aftertaste: 6.49,
                rating: 8.7,
            },
            Some(&bean),
        );

        assert_eq!(score.acidity, 8);
        assert_eq!(score.body, 5);
        assert_eq!(score.aroma, 9);
        assert_eq!(score.aftertaste, 6);
        assert_eq!(score.total_score, 9);
        assert_eq!(score.sweetness, 8);
        assert_eq!(score.bitterness, 2);
        assert_eq!(score.roast_level, RoastLevel::Light);
        assert_eq!(score.flavor_tags, vec![801, 80103]);
    }

    #[test]
    fn test_estimate_without_bean_defaults_to_medium() {
        let score = estimate(&source(99, 5.0), None);
        assert_eq!(score.roast_level, RoastLevel::Medium);
        assert_eq!(score.sweetness, 5);
        assert_eq!(score.bitterness, 5);
        assert!(score.flavor_tags.is_empty());
    }

    #[test]
    fn test_validate_reports_columns_and_counts() {
        let beans = HashMap::new();
        let mut scores = estimate_batch(&[source(1, 5.0), source(2, 5.0), source(3, 5.0)], &beans);
        scores[0].acidity = 11;
        scores[1].acidity = 0;
        scores[2].aroma = -2;

        match validate(&scores) {
            Err(ExportError::DataQuality(violations)) => {
                assert_eq!(
                    violations,
                    vec![
                        BoundViolation { column: "acidity".into(), rows: 2 },
                        BoundViolation { column: "aroma".into(), rows: 1 },
                    ]
                );
            }
            other => panic!("expected data quality error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_catches_non_finite_source() {
        let scores = estimate_batch(&[source(1, f64::NAN)], &HashMap::new());
        assert!(validate(&scores).is_err());
        assert!(validate(&[]).is_ok());
    }

    fn roast_strategy() -> impl Strategy<Value = Option<RoastLevel>> {
        prop_oneof![
            Just(None),
            Just(Some(RoastLevel::Light)),
            Just(Some(RoastLevel::Medium)),
            Just(Some(RoastLevel::Heavy)),
        ]
    }

    proptest! {
        #[test]
        fn prop_scores_stay_in_bounds(
            ids in proptest::collection::btree_set(
                prop_oneof![
                    proptest::sample::select(SWEET_TAGS.to_vec()),
                    proptest::sample::select(BITTER_TAGS.to_vec()),
                    any::<u32>(),
                ],
                0..40,
            ),
            roast in roast_strategy(),
        ) {
            let s = sweetness(&ids, roast);
            let b = bitterness(&ids, roast);
            prop_assert!((SCORE_MIN..=SCORE_MAX).contains(&s));
            prop_assert!((SCORE_MIN..=SCORE_MAX).contains(&b));
        }

        #[test]
        fn prop_monotonic_in_matching_tags(n in 0..SWEET_TAGS.len(), roast in roast_strategy()) {
            let fewer = tags(&SWEET_TAGS[..n]);
            let more = tags(&SWEET_TAGS[..n + 1]);
            prop_assert!(sweetness(&fewer, roast) <= sweetness(&more, roast));

            let m = n.min(BITTER_TAGS.len() - 1);
            let fewer = tags(&BITTER_TAGS[..m]);
            let more = tags(&BITTER_TAGS[..m + 1]);
            prop_assert!(bitterness(&fewer, roast) <= bitterness(&more, roast));
        }
    }
}
