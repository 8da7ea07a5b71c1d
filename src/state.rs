use std::sync::Arc;

use anyhow::Context;

use crate::catalog::Catalog;
use crate::chat::ChatService;
use crate::config::AppConfig;
use crate::llm::{GeminiClient, GeminiConfig, ModelClient};
use crate::tools::ToolRegistry;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub chat: ChatService,
    pub catalog: Arc<Catalog>,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>, model: Arc<dyn ModelClient>, model_id: &str) -> Self {
        let registry = Arc::new(ToolRegistry::with_catalog(catalog.clone()));
        Self {
            chat: ChatService::new(model, registry, model_id),
            catalog,
        }
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let catalog = match &config.catalog_path {
            Some(path) => {
                log::info!("Loading document catalog from {}", path.display());
                Catalog::from_json_file(path)
                    .with_context(|| format!("loading catalog from {}", path.display()))?
            }
            None => Catalog::default_ipb(),
        };

        for problem in catalog.validate() {
            log::warn!("catalog: {}", problem);
        }
        log::info!("Catalog ready with {} documents", catalog.len());

        let gemini = GeminiClient::new(GeminiConfig {
            api_key: config.api_key.clone(),
            base_url: config.gemini_base_url.clone(),
            timeout: config.model_timeout,
        })
        .context("building Gemini HTTP client")?;

        Ok(Self::new(Arc::new(catalog), Arc::new(gemini), &config.model))
    }
}
