use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ClientError, FileApi};
use crate::config::ReconcileMode;
use crate::models::{CreateFileInput, File, UpdateFileInput, UpsertFileInput};

/// One entry of the upload widget's completion payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub filename: String,
    #[serde(default)]
    pub handle: String,
    pub mimetype: String,
    #[serde(default)]
    pub original_file: Option<OriginalFile>,
    #[serde(default)]
    pub original_path: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub upload_id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginalFile {
    pub name: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Created(File),
    Updated { file: File, previous_version: i32 },
}

impl ReconcileOutcome {
    pub fn file(&self) -> &File {
        match self {
            ReconcileOutcome::Created(file) => file,
            ReconcileOutcome::Updated { file, .. } => file,
        }
    }
}

/// Maps one upload completion to a create or an update of the record with the
/// same name.
///
/// In `Search` mode the lookup and the write are two separate calls, so two
/// uploads of one name running at the same time can both see no match and both
/// create. `Atomic` mode delegates to the server's serialized upsert.
pub async fn reconcile(
    api: &dyn FileApi,
    mode: ReconcileMode,
    uploaded: &UploadedFile,
) -> Result<ReconcileOutcome, ClientError> {
    match mode {
        ReconcileMode::Search => reconcile_by_search(api, uploaded).await,
        ReconcileMode::Atomic => reconcile_atomic(api, uploaded).await,
    }
}

async fn reconcile_by_search(api: &dyn FileApi, uploaded: &UploadedFile) -> Result<ReconcileOutcome, ClientError> {
    let matches = api.search_files(&uploaded.filename).await?;
    debug!("{} search results for {}", matches.len(), uploaded.filename);

    match matches.into_iter().next() {
        None => {
            let file = api
                .create_file(&CreateFileInput {
                    name: uploaded.filename.clone(),
                    url: uploaded.url.clone(),
                    file_type: uploaded.mimetype.clone(),
                    version: 1,
                })
                .await?;
            info!("Created {} at version 1", file.name);
            Ok(ReconcileOutcome::Created(file))
        }
        Some(existing) => {
            let file = api
                .update_file(
                    &existing.id,
                    &UpdateFileInput {
                        name: Some(uploaded.filename.clone()),
                        url: Some(uploaded.url.clone()),
                        file_type: Some(uploaded.mimetype.clone()),
                        version: Some(existing.version + 1),
                    },
                )
                .await?;
            info!("Updated {} from version {} to {}", file.name, existing.version, file.version);
            Ok(ReconcileOutcome::Updated { file, previous_version: existing.version })
        }
    }
}

async fn reconcile_atomic(api: &dyn FileApi, uploaded: &UploadedFile) -> Result<ReconcileOutcome, ClientError> {
    let file = api
        .upsert_file(&UpsertFileInput {
            name: uploaded.filename.clone(),
            url: uploaded.url.clone(),
            file_type: uploaded.mimetype.clone(),
        })
        .await?;

    if file.version == 1 {
        Ok(ReconcileOutcome::Created(file))
    } else {
        let previous_version = file.version - 1;
        Ok(ReconcileOutcome::Updated { file, previous_version })
    }
}
