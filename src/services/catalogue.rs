use crate::models::Pathology;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading the pathology catalogue
#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("Failed to read catalogue {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON catalogue: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML catalogue: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported catalogue format: {0}")]
    UnsupportedFormat(String),

    #[error("Duplicate pathology id: {0}")]
    DuplicateId(String),
}

/// On-disk catalogue layout
#[derive(Debug, Deserialize)]
struct CatalogueFile {
    #[serde(default)]
    pathologies: Vec<Pathology>,
}

/// Short listing entry for a catalogue pathology
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathologySummary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(rename = "hasTriageCriteria")]
    pub has_triage_criteria: bool,
}

/// Read-only pathology catalogue
///
/// Loaded once at startup and shared across workers. Scoring requests may
/// also bring their own pathologies, in which case the catalogue is not used.
#[derive(Debug, Clone, Default)]
pub struct PathologyCatalogue {
    pathologies: Vec<Pathology>,
}

impl PathologyCatalogue {
    /// Build a catalogue, rejecting duplicate ids
    pub fn new(pathologies: Vec<Pathology>) -> Result<Self, CatalogueError> {
        let mut seen = HashSet::with_capacity(pathologies.len());
        for pathology in &pathologies {
            if !seen.insert(pathology.id.as_str()) {
                return Err(CatalogueError::DuplicateId(pathology.id.clone()));
            }
        }

        Ok(Self { pathologies })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json_str(contents: &str) -> Result<Self, CatalogueError> {
        let file: CatalogueFile = serde_json::from_str(contents)?;
        Self::new(file.pathologies)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, CatalogueError> {
        let file: CatalogueFile = toml::from_str(contents)?;
        Self::new(file.pathologies)
    }

    /// Load a catalogue file; the format is chosen from the extension
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogueError> {
        let path = path.as_ref();
        let path_display = path.display().to_string();

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        if extension != "json" && extension != "toml" {
            return Err(CatalogueError::UnsupportedFormat(path_display));
        }

        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CatalogueError::Io {
                path: path_display.clone(),
                source,
            })?;

        let catalogue = if extension == "json" {
            Self::from_json_str(&contents)?
        } else {
            Self::from_toml_str(&contents)?
        };

        tracing::info!("Loaded {} pathologies from {}", catalogue.len(), path_display);
        Ok(catalogue)
    }

    pub fn pathologies(&self) -> &[Pathology] {
        &self.pathologies
    }

    pub fn get(&self, id: &str) -> Option<&Pathology> {
        self.pathologies.iter().find(|pathology| pathology.id == id)
    }

    pub fn len(&self) -> usize {
        self.pathologies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pathologies.is_empty()
    }

    pub fn summaries(&self) -> Vec<PathologySummary> {
        self.pathologies
            .iter()
            .map(|pathology| PathologySummary {
                id: pathology.id.clone(),
                name: pathology.name.clone(),
                region: pathology.region.clone(),
                has_triage_criteria: pathology.triage_criteria.is_some(),
            })
            .collect()
    }
}
