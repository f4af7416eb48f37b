//! Current-page resolution against the menu document.

use haixin_types::MenuDocument;

/// The `(tool, page)` pair the current location path resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentPage {
    pub tool_id: String,
    pub page_key: String,
}

/// Resolves the current page from the location path.
///
/// A page matches when the path equals its `path` exactly or extends it past
/// a `/` boundary, so `/tool/ui` does not claim `/tool/ui-settings`. Tools
/// and pages are scanned in document order and the first match wins; callers
/// rely on that to disambiguate overlapping prefixes.
pub fn resolve_current(doc: &MenuDocument, path: &str) -> Option<CurrentPage> {
    for tool in &doc.tools {
        for page in &tool.pages {
            if path == page.path || path.starts_with(&format!("{}/", page.path)) {
                return Some(CurrentPage {
                    tool_id: tool.id.clone(),
                    page_key: page.key.clone(),
                });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use haixin_types::{Brand, Page, Tool};

    fn doc_with(tools: Vec<Tool>) -> MenuDocument {
        MenuDocument {
            brand: Brand {
                title: "Suite".into(),
                link: "/suite/ui".into(),
            },
            tools,
        }
    }

    fn page(key: &str, path: &str) -> Page {
        Page {
            key: key.into(),
            title: key.into(),
            path: path.into(),
            icon: String::new(),
        }
    }

    fn tool(id: &str, pages: Vec<Page>) -> Tool {
        Tool {
            id: id.into(),
            name: id.into(),
            icon: String::new(),
            description: None,
            owner: None,
            pages,
        }
    }

    #[test]
    fn exact_and_subpath_matches_resolve() {
        let doc = doc_with(vec![tool("compare", vec![page("compare", "/compare/ui")])]);

        let exact = resolve_current(&doc, "/compare/ui").expect("exact match");
        assert_eq!(exact.tool_id, "compare");
        assert_eq!(exact.page_key, "compare");

        let sub = resolve_current(&doc, "/compare/ui/session/42").expect("subpath match");
        assert_eq!(sub.page_key, "compare");
    }

    #[test]
    fn prefix_match_requires_path_boundary() {
        let doc = doc_with(vec![tool("compare", vec![page("compare", "/compare/ui")])]);
        assert!(resolve_current(&doc, "/compare/ui-settings").is_none());
        assert!(resolve_current(&doc, "/elsewhere").is_none());
    }

    #[test]
    fn first_match_wins_across_tools() {
        let doc = doc_with(vec![
            tool("alpha", vec![page("home", "/shared")]),
            tool("beta", vec![page("home", "/shared")]),
        ]);
        let current = resolve_current(&doc, "/shared/x").expect("match");
        assert_eq!(current.tool_id, "alpha");
    }

    #[test]
    fn resolution_is_stable_for_repeated_calls() {
        let doc = MenuDocument::fallback();
        let first = resolve_current(&doc, "/ai-model-compare/history-ui");
        let second = resolve_current(&doc, "/ai-model-compare/history-ui");
        assert_eq!(first, second);
        assert_eq!(first.expect("match").page_key, "history");
    }
}
