use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ObjectKind;
use crate::error::Result;

/// Raw backend records, one list per collection, exactly as received
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCollections {
    pub water_bodies: Vec<Value>,
    pub facilities: Vec<Value>,
    pub critical_zones: Vec<Value>,
}

impl RawCollections {
    pub fn collection(&self, kind: ObjectKind) -> &[Value] {
        match kind {
            ObjectKind::WaterBody => &self.water_bodies,
            ObjectKind::Facility => &self.facilities,
            ObjectKind::CriticalZone => &self.critical_zones,
        }
    }

    pub fn total_records(&self) -> usize {
        self.water_bodies.len() + self.facilities.len() + self.critical_zones.len()
    }
}

/// Query parameters forwarded to sources that can filter server-side
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceQuery {
    pub region: Option<String>,
    pub condition: Option<u8>,
}

/// Anything that can produce raw map records: the REST backend, a dataset file
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    /// Identifier used in logs
    fn source_name(&self) -> &str;

    /// Fetch the raw records of one collection
    async fn fetch(&self, kind: ObjectKind, query: &SourceQuery) -> Result<Vec<Value>>;

    /// Fetch every collection, in water body, facility, critical zone order
    async fn fetch_all(&self, query: &SourceQuery) -> Result<RawCollections> {
        Ok(RawCollections {
            water_bodies: self.fetch(ObjectKind::WaterBody, query).await?,
            facilities: self.fetch(ObjectKind::Facility, query).await?,
            critical_zones: self.fetch(ObjectKind::CriticalZone, query).await?,
        })
    }
}
