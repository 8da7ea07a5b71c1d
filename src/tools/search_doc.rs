//! `searchDocIPB`: look up official IPB documents by name.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;

use super::registry::Tool;
use crate::catalog::{render_matches, Catalog};

pub const TOOL_NAME: &str = "searchDocIPB";

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SearchDocRequest {
    /// Name or part of the name of the wanted document.
    pub termo: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
pub struct SearchDocResponse {
    pub resultado: String,
}

pub struct SearchDocIpb {
    catalog: Arc<Catalog>,
}

impl SearchDocIpb {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

impl Tool for SearchDocIpb {
    type Input = SearchDocRequest;
    type Output = SearchDocResponse;

    fn name(&self) -> &'static str {
        TOOL_NAME
    }

    fn description(&self) -> &'static str {
        "Busca documentos oficiais da Igreja Presbiteriana do Brasil."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "termo": {
                    "type": "string",
                    "description": "Nome ou parte do nome do documento desejado"
                }
            },
            "required": ["termo"]
        })
    }

    fn execute(&self, input: SearchDocRequest) -> SearchDocResponse {
        let found = self.catalog.search(&input.termo);
        log::info!("{} termo={:?} matches={}", TOOL_NAME, input.termo, found.len());
        SearchDocResponse {
            resultado: render_matches(&input.termo, &found),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DocumentEntry;

    fn tool() -> SearchDocIpb {
        SearchDocIpb::new(Arc::new(Catalog::default_ipb()))
    }

    #[test]
    fn test_descriptor() {
        let tool = tool();
        assert_eq!(tool.name(), "searchDocIPB");
        assert!(tool.description().contains("Igreja Presbiteriana"));
        let schema = tool.input_schema();
        assert_eq!(schema["properties"]["termo"]["type"], "string");
        assert_eq!(schema["required"][0], "termo");
    }

    #[test]
    fn test_execute_manual() {
        let out = tool().execute(SearchDocRequest {
            termo: "manual".to_string(),
        });
        assert!(out.resultado.contains("**Manual Presbiteriano**"));
        assert!(out.resultado.contains("Manual-Presbiteriano-2019.pdf"));
        assert!(!out.resultado.contains("Westminster"));
    }

    #[test]
    fn test_execute_not_found() {
        let out = tool().execute(SearchDocRequest {
            termo: "hinário".to_string(),
        });
        assert_eq!(
            out.resultado,
            "Nenhum documento encontrado com o termo \"hinário\"."
        );
    }

    #[test]
    fn test_injected_catalog() {
        let catalog = Catalog::new(vec![DocumentEntry::new(
            "Código de Disciplina",
            "https://example.org/cd.pdf",
        )]);
        let tool = SearchDocIpb::new(Arc::new(catalog));
        let out = tool.execute(SearchDocRequest {
            termo: "CÓDIGO".to_string(),
        });
        assert!(out.resultado.contains("https://example.org/cd.pdf"));
    }

    #[test]
    fn test_execute_matches_catalog_lookup() {
        let catalog = Arc::new(Catalog::default_ipb());
        let tool = SearchDocIpb::new(catalog.clone());
        for termo in ["", "manual", "IPB", "hinário", "Ã"] {
            let out = tool.execute(SearchDocRequest {
                termo: termo.to_string(),
            });
            assert_eq!(out.resultado, catalog.lookup(termo), "termo {termo:?}");
        }
    }

    #[test]
    fn test_response_serialization() {
        let response = SearchDocResponse {
            resultado: "ok".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, json!({ "resultado": "ok" }));
    }
}
