//! Input table loading.
//!
//! GraphRAG delivers extracted entities and relationships as two columnar
//! tables. Both are read eagerly into memory at the start of a run and held
//! immutably until the process exits. A missing or unreadable table is
//! fatal.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::info;

use crate::error::LoadError;

/// One extracted entity. Numeric columns deserialize as `Option` so blank
/// cells fall back to the column defaults at encode time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntityRow {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub human_readable_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub text_unit_ids: String,
    #[serde(default)]
    pub frequency: Option<i64>,
    #[serde(default)]
    pub degree: Option<i64>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    /// Free-text entity category. Rows with a blank or unsanitizable type
    /// are skipped entirely.
    #[serde(default, rename = "type")]
    pub entity_type: String,
}

/// One extracted relationship between two entities.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelationshipRow {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub human_readable_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub combined_degree: Option<i64>,
    #[serde(default)]
    pub text_unit_ids: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub target: String,
}

/// The two row sets for one import run.
#[derive(Debug, Default)]
pub struct Dataset {
    pub entities: Vec<EntityRow>,
    pub relationships: Vec<RelationshipRow>,
}

impl Dataset {
    /// Load both tables. Fails fast on the first unreadable file or row.
    pub fn load(entities_file: &Path, relationships_file: &Path) -> Result<Dataset, LoadError> {
        info!("Loading entities from {}", entities_file.display());
        let entities: Vec<EntityRow> = read_table(entities_file)?;
        info!("Loaded {} entities", entities.len());

        info!("Loading relationships from {}", relationships_file.display());
        let relationships: Vec<RelationshipRow> = read_table(relationships_file)?;
        info!("Loaded {} relationships", relationships.len());

        Ok(Dataset {
            entities,
            relationships,
        })
    }
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LoadError> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| LoadError::Data(format!("opening {}: {e}", path.display())))?;

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: T =
            record.map_err(|e| LoadError::Data(format!("reading {}: {e}", path.display())))?;
        rows.push(row);
    }
    Ok(rows)
}
