//! Bean score export - estimate, validate, and render `bean_scores` rows.

use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

use crate::error::ExportResult;
use crate::pipeline::sensory;
use crate::types::bean::{Bean, FlavorId, RoastLevel, SensoryScore, SourceScore};

pub const DATA_SOURCE: &str = "EXTERNAL_CSV";
pub const CONFIDENCE_SCORE: f64 = 0.9;

/// One row of `bean_scores_import.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeanScoreRow {
    pub bean_id: u32,
    pub acidity: i64,
    pub body: i64,
    pub sweetness: i64,
    pub bitterness: i64,
    pub aroma: i64,
    pub flavor: i64,
    pub aftertaste: i64,
    pub total_score: i64,
    pub roast_level: RoastLevel,
    pub flavor_tags: String,
    pub data_source: &'static str,
    pub confidence_score: f64,
}

impl From<&SensoryScore> for BeanScoreRow {
    fn from(score: &SensoryScore) -> Self {
        Self {
            bean_id: score.bean_id,
            acidity: score.acidity,
            body: score.body,
            sweetness: score.sweetness,
            bitterness: score.bitterness,
            aroma: score.aroma,
            flavor: score.flavor,
            aftertaste: score.aftertaste,
            total_score: score.total_score,
            roast_level: score.roast_level,
            flavor_tags: format_tags(&score.flavor_tags),
            data_source: DATA_SOURCE,
            confidence_score: CONFIDENCE_SCORE,
        }
    }
}

/// "[801, 80103]", or empty when there are no tags.
pub fn format_tags(tags: &[FlavorId]) -> String {
    if tags.is_empty() {
        return String::new();
    }
    let ids: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
    format!("[{}]", ids.join(", "))
}

/// Join bean roast levels with their flavor notes.
///
/// Notes for beans missing from `beans` still produce a bean (unknown
/// roast), so their tags count.
pub fn bean_index(
    beans: impl IntoIterator<Item = (u32, Option<RoastLevel>)>,
    notes: impl IntoIterator<Item = (u32, FlavorId)>,
) -> HashMap<u32, Bean> {
    let mut index: HashMap<u32, Bean> = beans
        .into_iter()
        .map(|(id, roast)| (id, Bean::new(id, roast)))
        .collect();

    for (bean_id, flavor_id) in notes {
        index
            .entry(bean_id)
            .or_insert_with(|| Bean::new(bean_id, None))
            .flavor_tags
            .insert(flavor_id);
    }

    index
}

/// Estimate and validate a batch. Nothing is returned unless every row passes.
pub fn prepare(sources: &[SourceScore], beans: &HashMap<u32, Bean>) -> ExportResult<Vec<SensoryScore>> {
    let scores = sensory::estimate_batch(sources, beans);
    sensory::validate(&scores)?;

    info!(rows = scores.len(), "Bean scores validated");
    Ok(scores)
}

/// Upsert script for the `bean_scores` table.
pub fn render_insert(scores: &[SensoryScore]) -> String {
    let mut sql = String::from("-- bean_scores import\n-- Generated by cafe-pipeline\n\n");

    if scores.is_empty() {
        sql.push_str("-- no rows for bean_scores\n");
        return sql;
    }

    sql.push_str("INSERT INTO bean_scores (\n");
    sql.push_str("    bean_id, acidity, body, sweetness, bitterness,\n");
    sql.push_str("    aroma, flavor, aftertaste, total_score,\n");
    sql.push_str("    roast_level, data_source, confidence_score\n");
    sql.push_str(") VALUES\n");

    let values: Vec<String> = scores
        .iter()
        .map(|s| {
            format!(
                "    ({}, {}, {}, {}, {}, {}, {}, {}, {}, '{}', '{}', {})",
                s.bean_id,
                s.acidity,
                s.body,
                s.sweetness,
                s.bitterness,
                s.aroma,
                s.flavor,
                s.aftertaste,
                s.total_score,
                s.roast_level.code(),
                DATA_SOURCE,
                CONFIDENCE_SCORE
            )
        })
        .collect();
    sql.push_str(&values.join(",\n"));

    sql.push_str("\nON DUPLICATE KEY UPDATE\n");
    for column in [
        "acidity",
        "body",
        "sweetness",
        "bitterness",
        "aroma",
        "flavor",
        "aftertaste",
        "total_score",
        "roast_level",
    ] {
        sql.push_str(&format!("    {column} = VALUES({column}),\n"));
    }
    sql.push_str("    updated_at = CURRENT_TIMESTAMP;\n");

    sql
}
