use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::models::{CreateFileInput, File};
use crate::repositories::FileStore;

#[derive(Debug, Serialize, Deserialize)]
pub struct SeedingStats {
    pub files_created: i64,
}

/// Named sample records, keyed the way tests refer to them.
pub type Scenario = BTreeMap<&'static str, File>;

pub struct SeedingService {
    store: Arc<dyn FileStore>,
}

impl SeedingService {
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self { store }
    }

    /// The `standard` scenario: two placeholder records `one` and `two`.
    pub fn standard_scenario() -> Vec<(&'static str, CreateFileInput)> {
        vec![
            (
                "one",
                CreateFileInput {
                    name: "String".to_string(),
                    url: "https://cdn.filestackcontent.com/String".to_string(),
                    file_type: "String".to_string(),
                    version: 7152573,
                },
            ),
            (
                "two",
                CreateFileInput {
                    name: "String".to_string(),
                    url: "https://cdn.filestackcontent.com/String".to_string(),
                    file_type: "String".to_string(),
                    version: 5673080,
                },
            ),
        ]
    }

    pub async fn seed_standard(&self) -> Result<Scenario> {
        info!("Seeding standard file scenario...");

        let mut scenario = Scenario::new();
        for (key, input) in Self::standard_scenario() {
            let file = self.store.create_file(&input).await?;
            debug!("Seeded file {} as {}", key, file.id);
            scenario.insert(key, file);
        }

        info!("Seeded {} files", scenario.len());
        Ok(scenario)
    }

    /// Seeds only when no file records exist yet.
    pub async fn seed_if_empty(&self) -> Result<Option<Scenario>> {
        if self.store.count_files().await? > 0 {
            debug!("Files table is not empty, skipping seeding");
            return Ok(None);
        }
        self.seed_standard().await.map(Some)
    }

    pub async fn clear_all(&self) -> Result<()> {
        info!("Clearing all seed data...");
        let removed = self.store.delete_all_files().await?;
        info!("Removed {} files", removed);
        Ok(())
    }

    pub async fn get_stats(&self) -> Result<SeedingStats> {
        let files_created = self.store.count_files().await?;
        Ok(SeedingStats { files_created })
    }
}
