use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use crate::domain::ObjectKind;
use crate::error::Result;
use crate::types::{RawCollections, RecordSource, SourceQuery};

/// Reads raw collections from a JSON dataset file:
/// `{ "waterBodies": [...], "facilities": [...], "criticalZones": [...] }`.
/// Missing keys are empty collections. Query parameters are ignored; filtering
/// happens in the aggregate stage.
pub struct DatasetFile {
    path: PathBuf,
}

impl DatasetFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<RawCollections> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let collections: RawCollections = serde_json::from_str(&content)?;
        debug!(records = collections.total_records(), "loaded dataset");
        Ok(collections)
    }

    /// Writes collections in the same shape `load` reads
    pub async fn save(&self, collections: &RawCollections) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(collections)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordSource for DatasetFile {
    fn source_name(&self) -> &str {
        "dataset_file"
    }

    async fn fetch(&self, kind: ObjectKind, _query: &SourceQuery) -> Result<Vec<Value>> {
        Ok(self.load().await?.collection(kind).to_vec())
    }

    async fn fetch_all(&self, _query: &SourceQuery) -> Result<RawCollections> {
        self.load().await
    }
}
