//! Persistence port and service for the default form configuration

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde::Deserialize;

use care_common::RepositoryError;

use crate::{FormConfig, FormField, Result, DEFAULT_FORM_ID};

/// Outbound port to the document store's `formConfigs` collection
#[async_trait]
pub trait FormConfigRepository: Send + Sync {
    /// Fetch the default configuration document, if one exists
    async fn find_default(&self) -> std::result::Result<Option<FormConfig>, RepositoryError>;

    /// Write the full configuration document (insert or replace)
    async fn save(&self, config: &FormConfig) -> std::result::Result<(), RepositoryError>;
}

/// Complete desired state submitted by the editor on save.
///
/// Saves are full-replace: the caller submits title and the entire field
/// list, never an incremental patch.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFormConfig {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Vec<FormField>,
}

/// Application service over the form-config port
pub struct FormConfigService {
    repo: Arc<dyn FormConfigRepository>,
}

impl FormConfigService {
    pub fn new(repo: Arc<dyn FormConfigRepository>) -> Self {
        Self { repo }
    }

    /// Fetch the persisted default configuration, or a fresh empty one if
    /// none has been saved yet. Fetch errors propagate.
    pub async fn load_default(&self) -> Result<FormConfig> {
        let config = self.repo.find_default().await?;
        Ok(config.unwrap_or_else(FormConfig::new_default))
    }

    /// Fail-soft variant for opening the editor: a fetch error falls back
    /// to the empty default instead of blocking.
    pub async fn load_or_default(&self) -> FormConfig {
        match self.repo.find_default().await {
            Ok(config) => config.unwrap_or_else(FormConfig::new_default),
            Err(err) => {
                tracing::warn!(error = %err, "failed to load form config, using empty default");
                FormConfig::new_default()
            }
        }
    }

    /// Persist the submitted configuration as the default document.
    ///
    /// Validates first; preserves `created_at` when a document already
    /// exists and stamps `updated_at`.
    pub async fn save(&self, draft: SaveFormConfig) -> Result<FormConfig> {
        let existing = self.repo.find_default().await?;

        let now = Utc::now();
        let config = FormConfig {
            id: DEFAULT_FORM_ID.to_string(),
            title: draft.title,
            description: draft.description,
            fields: draft.fields,
            created_at: existing.map(|c| c.created_at).unwrap_or(now),
            updated_at: now,
        };
        config.validate()?;

        self.repo.save(&config).await?;
        tracing::info!(fields = config.fields.len(), "form configuration saved");
        Ok(config)
    }
}

/// In-memory repository (tests and the dev portal)
#[derive(Default)]
pub struct InMemoryFormConfigRepository {
    config: RwLock<Option<FormConfig>>,
}

impl InMemoryFormConfigRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FormConfigRepository for InMemoryFormConfigRepository {
    async fn find_default(&self) -> std::result::Result<Option<FormConfig>, RepositoryError> {
        Ok(self.config.read().clone())
    }

    async fn save(&self, config: &FormConfig) -> std::result::Result<(), RepositoryError> {
        *self.config.write() = Some(config.clone());
        Ok(())
    }
}

/// Repository that always fails reads; exercises the fail-soft path
#[cfg(test)]
struct BrokenFormConfigRepository;

#[cfg(test)]
#[async_trait]
impl FormConfigRepository for BrokenFormConfigRepository {
    async fn find_default(&self) -> std::result::Result<Option<FormConfig>, RepositoryError> {
        Err(RepositoryError::ConnectionError("store offline".into()))
    }

    async fn save(&self, _config: &FormConfig) -> std::result::Result<(), RepositoryError> {
        Err(RepositoryError::ConnectionError("store offline".into()))
    }
}
