//! CSV and JSON files at the edges of the pipeline.
//!
//! The collector writes stores.csv, menus.csv and crawl_log.json; the
//! exporters read CSV tables back in.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

use crate::error::ExportResult;
use crate::pipeline::export::bean_scores::BeanScoreRow;
use crate::pipeline::export::{Dataset, RawTable, TableKind};
use crate::types::bean::{FlavorId, RoastLevel, SensoryScore, SourceScore};
use crate::types::place::Store;
use crate::types::run_log::RunLog;

pub const STORES_FILE: &str = "stores.csv";
pub const MENUS_FILE: &str = "menus.csv";
pub const RUN_LOG_FILE: &str = "crawl_log.json";
pub const BEAN_SCORES_CSV: &str = "bean_scores_import.csv";
pub const BEAN_SCORES_SQL: &str = "bean_scores_insert.sql";

/// Roastery every collected store is attached to.
pub const DEFAULT_ROASTERY_ID: u32 = 1;

/// One row of stores.csv.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    pub id: u32,
    pub roastery_id: u32,
    pub owner_id: Option<u32>,
    pub name: String,
    pub description: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone_number: String,
    pub category: String,
    pub thumbnail_url: String,
    pub open_time: String,
    pub close_time: String,
}

/// One row of menus.csv.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuRecord {
    pub id: u32,
    pub store_id: u32,
    pub name: String,
    pub description: String,
    pub price: u32,
    pub category: String,
    pub image_url: String,
}

/// Flatten stores into table rows with 1-based sequential ids.
pub fn to_records(stores: &[Store]) -> (Vec<StoreRecord>, Vec<MenuRecord>) {
    let mut store_rows = Vec::with_capacity(stores.len());
    let mut menu_rows = Vec::new();

    for (i, store) in stores.iter().enumerate() {
        let store_id = i as u32 + 1;
        let place = &store.place;

        store_rows.push(StoreRecord {
            id: store_id,
            roastery_id: DEFAULT_ROASTERY_ID,
            owner_id: None,
            name: place.name.clone(),
            description: place.description.clone(),
            address: place.address.clone(),
            latitude: place.coordinate.map(|c| c.latitude),
            longitude: place.coordinate.map(|c| c.longitude),
            phone_number: place.phone.clone(),
            category: place.category_hint.clone(),
            thumbnail_url: String::new(),
            open_time: String::new(),
            close_time: String::new(),
        });

        for menu in &store.menus {
            menu_rows.push(MenuRecord {
                id: menu_rows.len() as u32 + 1,
                store_id,
                name: menu.name.clone(),
                description: menu.description.clone(),
                price: menu.price,
                category: String::new(),
                image_url: String::new(),
            });
        }
    }

    (store_rows, menu_rows)
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> ExportResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write stores.csv, menus.csv and crawl_log.json into `dir`.
pub fn write_collection(dir: &Path, stores: &[Store], log: &RunLog) -> ExportResult<()> {
    std::fs::create_dir_all(dir)?;

    let (store_rows, menu_rows) = to_records(stores);
    write_csv(&dir.join(STORES_FILE), &store_rows)?;
    write_csv(&dir.join(MENUS_FILE), &menu_rows)?;
    write_run_log(&dir.join(RUN_LOG_FILE), log)?;

    info!(
        dir = %dir.display(),
        stores = store_rows.len(),
        menus = menu_rows.len(),
        "Saved collection"
    );
    Ok(())
}

pub fn write_run_log(path: &Path, log: &RunLog) -> ExportResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, log)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

pub fn read_run_log(path: &Path) -> ExportResult<RunLog> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}

/// Read a CSV file as header names plus string cells.
pub fn read_table(path: &Path) -> ExportResult<RawTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(|c| c.to_string()).collect());
    }

    Ok(RawTable::new(headers, rows))
}

/// Read `<table>.csv` for each exported table. Missing files become empty
/// tables.
pub fn read_dataset(dir: &Path) -> ExportResult<Dataset> {
    let mut dataset = Dataset::new();

    for kind in TableKind::EMISSION_ORDER {
        let path = dir.join(kind.file_name());
        if !path.exists() {
            warn!(path = %path.display(), "Table file missing, exporting no rows");
            continue;
        }

        let table = read_table(&path)?;
        info!(table = %kind, rows = table.len(), "Loaded table");
        dataset.insert(kind, table);
    }

    Ok(dataset)
}

pub fn read_source_scores(path: &Path) -> ExportResult<Vec<SourceScore>> {
    let mut reader = csv::Reader::from_path(path)?;
    reader
        .deserialize()
        .collect::<Result<Vec<SourceScore>, _>>()
        .map_err(Into::into)
}

#[derive(Debug, Deserialize)]
struct BeanRecord {
    id: u32,
    #[serde(default)]
    roasting_level: Option<String>,
}

/// (bean id, roast level) pairs; unrecognised levels are `None`.
pub fn read_bean_roasts(path: &Path) -> ExportResult<Vec<(u32, Option<RoastLevel>)>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut beans = Vec::new();
    for record in reader.deserialize() {
        let record: BeanRecord = record?;
        let roast = record
            .roasting_level
            .as_deref()
            .and_then(RoastLevel::parse_lenient);
        beans.push((record.id, roast));
    }
    Ok(beans)
}

#[derive(Debug, Deserialize)]
struct FlavorNoteRecord {
    bean_id: u32,
    flavor_id: FlavorId,
}

pub fn read_flavor_notes(path: &Path) -> ExportResult<Vec<(u32, FlavorId)>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut notes = Vec::new();
    for record in reader.deserialize() {
        let record: FlavorNoteRecord = record?;
        notes.push((record.bean_id, record.flavor_id));
    }
    Ok(notes)
}

pub fn write_bean_scores(path: &Path, scores: &[SensoryScore]) -> ExportResult<()> {
    let rows: Vec<BeanScoreRow> = scores.iter().map(BeanScoreRow::from).collect();
    write_csv(path, &rows)
}

/// One query per line; blank lines and `#` comments are skipped.
pub fn read_query_list(path: &Path) -> ExportResult<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}
