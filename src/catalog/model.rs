use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A named document in the catalog together with the link to its PDF.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct DocumentEntry {
    pub name: String,
    pub link: String,
}

impl DocumentEntry {
    pub fn new(name: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link: link.into(),
        }
    }

    /// Markdown paragraph shown to the user for this document.
    pub fn to_markdown(&self) -> String {
        format!("**{}**\n\n 📄 [Abrir documento]({})", self.name, self.link)
    }
}
