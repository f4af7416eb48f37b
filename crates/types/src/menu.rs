//! The menu document served by the backend's `/menus` endpoint.
//!
//! The document describes the shared navigation: a brand block plus the list
//! of tools registered with the suite, each with its routable pages. It is
//! fetched once per process, held read-only, and never mutated. Decoding is
//! deliberately permissive: optional fields default to empty so a sparsely
//! populated tool still renders with its sub-parts omitted.

use serde::{Deserialize, Serialize};

/// URL-path prefix every `ai-model-compare` endpoint lives under.
pub const API_PREFIX: &str = "/ai-model-compare";

/// Brand block shown at the left edge of the navigation bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub title: String,
    pub link: String,
}

/// Contact information for the team owning a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub name: String,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A single routable view belonging to a tool. `path` is an absolute
/// URL-path prefix matched against the current location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub key: String,
    pub title: String,
    pub path: String,
    #[serde(default)]
    pub icon: String,
}

/// A distinct product grouped under the shared navigation brand.
///
/// `id` is unique across the document; page keys are unique within a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner: Option<Owner>,
    #[serde(default)]
    pub pages: Vec<Page>,
}

/// The whole `/menus` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuDocument {
    pub brand: Brand,
    #[serde(default)]
    pub tools: Vec<Tool>,
}

impl MenuDocument {
    /// Embedded default document used when the `/menus` fetch fails or the
    /// payload does not parse. Matches the backend's own built-in default:
    /// one tool with the compare/models/history pages.
    pub fn fallback() -> Self {
        MenuDocument {
            brand: Brand {
                title: "Haixin AI Toolkit".into(),
                link: format!("{API_PREFIX}/ui"),
            },
            tools: vec![Tool {
                id: "ai-model-compare".into(),
                name: "AI Model Compare".into(),
                icon: "🤖".into(),
                description: Some("Multi-modal AI model comparison".into()),
                owner: None,
                pages: vec![
                    Page {
                        key: "compare".into(),
                        title: "Compare".into(),
                        path: format!("{API_PREFIX}/ui"),
                        icon: "🔬".into(),
                    },
                    Page {
                        key: "models".into(),
                        title: "Models".into(),
                        path: format!("{API_PREFIX}/models-ui"),
                        icon: "⚙".into(),
                    },
                    Page {
                        key: "history".into(),
                        title: "History".into(),
                        path: format!("{API_PREFIX}/history-ui"),
                        icon: "📜".into(),
                    },
                ],
            }],
        }
    }

    /// Looks up a tool by id.
    pub fn tool(&self, tool_id: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.id == tool_id)
    }
}

/// Strips control characters from text received over the wire.
///
/// Menu titles, names, and descriptions are untrusted input; a hostile
/// document must not be able to smuggle escape sequences into the terminal.
pub fn sanitize_text(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_document_shape() {
        let doc = MenuDocument::fallback();
        assert_eq!(doc.brand.link, "/ai-model-compare/ui");
        assert_eq!(doc.tools.len(), 1);
        let tool = &doc.tools[0];
        assert_eq!(tool.id, "ai-model-compare");
        let keys: Vec<&str> = tool.pages.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, ["compare", "models", "history"]);
        assert!(tool.pages.iter().all(|p| p.path.starts_with(API_PREFIX)));
    }

    #[test]
    fn permissive_decoding_defaults_missing_fields() {
        let json = r#"{
            "brand": {"title": "Suite", "link": "/x/ui"},
            "tools": [
                {"id": "x", "name": "X", "pages": [
                    {"key": "home", "title": "Home", "path": "/x/ui"}
                ]}
            ]
        }"#;
        let doc: MenuDocument = serde_json::from_str(json).expect("decode");
        let tool = &doc.tools[0];
        assert_eq!(tool.icon, "");
        assert!(tool.description.is_none());
        assert!(tool.owner.is_none());
        assert_eq!(tool.pages[0].icon, "");
    }

    #[test]
    fn owner_optional_segments_decode() {
        let json = r#"{"name": "Platform Team", "email": "team@example.com"}"#;
        let owner: Owner = serde_json::from_str(json).expect("decode");
        assert_eq!(owner.name, "Platform Team");
        assert!(owner.contact.is_none());
        assert_eq!(owner.email.as_deref(), Some("team@example.com"));
    }

    #[test]
    fn sanitize_strips_control_characters() {
        assert_eq!(sanitize_text("plain"), "plain");
        assert_eq!(sanitize_text("a\x1b[31mb\x07c\r\n"), "a[31mbc");
    }
}
