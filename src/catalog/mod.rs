//! Fixed catalog of official IPB documents and the name lookup over it.

pub mod model;

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;

pub use model::DocumentEntry;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Ordered, read-only list of documents. Shared across requests behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<DocumentEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<DocumentEntry>) -> Self {
        Self { entries }
    }

    /// The three documents served in production.
    pub fn default_ipb() -> Self {
        Self::new(vec![
            DocumentEntry::new(
                "Constituição da IPB",
                "https://www.executivaipb.com.br/site/constituicao/constituicao.pdf",
            ),
            DocumentEntry::new(
                "Manual Presbiteriano",
                "https://www.ipb.org.br/content/Downloads/Manual-Presbiteriano-2019.pdf",
            ),
            DocumentEntry::new(
                "Confissão de Fé de Westminster",
                "https://www.executivaipb.com.br/arquivos/confissao_de_westminster.pdf",
            ),
        ])
    }

    /// Load a catalog from a JSON array of `{ "name", "link" }` objects.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<DocumentEntry> = serde_json::from_str(&raw)?;
        Ok(Self::new(entries))
    }

    pub fn entries(&self) -> &[DocumentEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names are assumed non-empty and unique; returns one message per violation.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut seen = HashSet::new();
        for (idx, entry) in self.entries.iter().enumerate() {
            if entry.name.trim().is_empty() {
                problems.push(format!("entry #{} has an empty name", idx));
            } else if !seen.insert(entry.name.as_str()) {
                problems.push(format!("duplicate document name '{}'", entry.name));
            }
        }
        problems
    }

    /// Entries whose name contains `term`, compared case-insensitively.
    /// Catalog order is preserved; an empty term matches everything.
    pub fn search(&self, term: &str) -> Vec<&DocumentEntry> {
        let needle = term.to_lowercase();
        self.entries
            .iter()
            .filter(|doc| doc.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Text returned to the user for a lookup: one paragraph per match, or the
    /// not-found sentence echoing `term` verbatim.
    pub fn lookup(&self, term: &str) -> String {
        render_matches(term, &self.search(term))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::default_ipb()
    }
}

/// Formats the result of [`Catalog::search`] the way [`Catalog::lookup`] does.
pub fn render_matches(term: &str, found: &[&DocumentEntry]) -> String {
    if found.is_empty() {
        return not_found_message(term);
    }

    found
        .iter()
        .map(|doc| doc.to_markdown())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn not_found_message(term: &str) -> String {
    format!("Nenhum documento encontrado com o termo \"{}\".", term)
}
