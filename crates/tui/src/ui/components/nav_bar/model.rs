//! Typed render model for the navigation bar.
//!
//! [`NavModel::build`] is a pure function of the menu document and the
//! resolved current page. All text passes through `sanitize_text` here so the
//! drawing code can treat the model as trusted.

use haixin_types::{sanitize_text, MenuDocument, Page, Tool};

use super::resolver::CurrentPage;

/// Brand block at the left edge of the bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandNode {
    pub title: String,
    pub link: String,
}

/// A clickable page link, used both in the dropdown and in the page strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub tool_id: String,
    pub page_key: String,
    pub title: String,
    pub icon: String,
    pub path: String,
    /// Whether this link is the resolved current page.
    pub active: bool,
}

/// One segment of a tool's owner line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerSegment {
    pub text: String,
    /// Render as a mail link rather than plain text.
    pub mailto: bool,
}

/// One row of the tools dropdown, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropdownRow {
    ToolHeader {
        icon: String,
        name: String,
        description: Option<String>,
    },
    OwnerLine { segments: Vec<OwnerSegment> },
    Link(PageLink),
    Divider,
}

/// Standalone action link at the right edge of the bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLink {
    pub title: String,
    pub href: String,
}

/// Everything the navigation bar draws, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavModel {
    pub brand: BrandNode,
    /// Dropdown rows covering every tool in the document.
    pub dropdown: Vec<DropdownRow>,
    /// Page links of the current tool, empty when no page resolved.
    pub strip: Vec<PageLink>,
    pub action: ActionLink,
}

impl NavModel {
    /// Builds the render model. Pure: same inputs, same model.
    pub fn build(doc: &MenuDocument, current: Option<&CurrentPage>) -> NavModel {
        let brand = BrandNode {
            title: sanitize_text(&doc.brand.title),
            link: doc.brand.link.clone(),
        };

        let mut dropdown = Vec::new();
        for (index, tool) in doc.tools.iter().enumerate() {
            if index > 0 {
                dropdown.push(DropdownRow::Divider);
            }
            dropdown.push(DropdownRow::ToolHeader {
                icon: sanitize_text(&tool.icon),
                name: sanitize_text(&tool.name),
                description: tool.description.as_deref().map(sanitize_text),
            });
            if let Some(segments) = owner_segments(tool) {
                dropdown.push(DropdownRow::OwnerLine { segments });
            }
            for page in &tool.pages {
                dropdown.push(DropdownRow::Link(page_link(tool, page, current)));
            }
        }

        let strip = current
            .and_then(|c| doc.tool(&c.tool_id))
            .map(|tool| {
                tool.pages
                    .iter()
                    .map(|page| page_link(tool, page, current))
                    .collect()
            })
            .unwrap_or_default();

        NavModel {
            brand,
            dropdown,
            strip,
            action: ActionLink {
                title: "🔧 Developer Guide".into(),
                href: "/integration-guide".into(),
            },
        }
    }
}

fn page_link(tool: &Tool, page: &Page, current: Option<&CurrentPage>) -> PageLink {
    let active = current
        .map(|c| c.tool_id == tool.id && c.page_key == page.key)
        .unwrap_or(false);
    PageLink {
        tool_id: tool.id.clone(),
        page_key: page.key.clone(),
        title: sanitize_text(&page.title),
        icon: sanitize_text(&page.icon),
        path: page.path.clone(),
        active,
    }
}

fn owner_segments(tool: &Tool) -> Option<Vec<OwnerSegment>> {
    let owner = tool.owner.as_ref()?;
    let mut segments = vec![OwnerSegment {
        text: sanitize_text(&owner.name),
        mailto: false,
    }];
    if let Some(contact) = &owner.contact {
        segments.push(OwnerSegment {
            text: sanitize_text(contact),
            mailto: false,
        });
    }
    if let Some(email) = &owner.email {
        segments.push(OwnerSegment {
            text: sanitize_text(email),
            mailto: true,
        });
    }
    Some(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::components::nav_bar::resolver::resolve_current;
    use haixin_types::{Brand, MenuDocument, Owner};

    fn two_tool_doc() -> MenuDocument {
        let mut doc = MenuDocument::fallback();
        doc.tools.push(haixin_types::Tool {
            id: "report-gen".into(),
            name: "Report Generator".into(),
            icon: "📊".into(),
            description: None,
            owner: Some(Owner {
                name: "Data Team".into(),
                contact: None,
                email: Some("data@example.com".into()),
            }),
            pages: vec![haixin_types::Page {
                key: "reports".into(),
                title: "Reports".into(),
                path: "/report-gen/ui".into(),
                icon: "📈".into(),
            }],
        });
        doc
    }

    #[test]
    fn build_is_pure() {
        let doc = two_tool_doc();
        let current = resolve_current(&doc, "/ai-model-compare/ui");
        let a = NavModel::build(&doc, current.as_ref());
        let b = NavModel::build(&doc, current.as_ref());
        assert_eq!(a, b);
    }

    #[test]
    fn active_page_marked_in_dropdown_and_strip() {
        let doc = two_tool_doc();
        let current = resolve_current(&doc, "/ai-model-compare/models-ui/edit/3");
        let model = NavModel::build(&doc, current.as_ref());

        let strip_active: Vec<&str> = model
            .strip
            .iter()
            .filter(|l| l.active)
            .map(|l| l.page_key.as_str())
            .collect();
        assert_eq!(strip_active, ["models"]);

        let dropdown_active: Vec<&str> = model
            .dropdown
            .iter()
            .filter_map(|row| match row {
                DropdownRow::Link(link) if link.active => Some(link.page_key.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(dropdown_active, ["models"]);
    }

    #[test]
    fn unresolved_path_yields_empty_strip_and_no_active_links() {
        let doc = two_tool_doc();
        let model = NavModel::build(&doc, None);
        assert!(model.strip.is_empty());
        assert!(model.dropdown.iter().all(|row| !matches!(
            row,
            DropdownRow::Link(link) if link.active
        )));
    }

    #[test]
    fn dropdown_lists_every_tool_with_dividers_between() {
        let doc = two_tool_doc();
        let model = NavModel::build(&doc, None);
        let headers = model
            .dropdown
            .iter()
            .filter(|r| matches!(r, DropdownRow::ToolHeader { .. }))
            .count();
        let dividers = model
            .dropdown
            .iter()
            .filter(|r| matches!(r, DropdownRow::Divider))
            .count();
        assert_eq!(headers, 2);
        assert_eq!(dividers, 1);
    }

    #[test]
    fn owner_line_built_from_present_fields_only() {
        let doc = two_tool_doc();
        let model = NavModel::build(&doc, None);
        let owner_lines: Vec<&Vec<OwnerSegment>> = model
            .dropdown
            .iter()
            .filter_map(|row| match row {
                DropdownRow::OwnerLine { segments } => Some(segments),
                _ => None,
            })
            .collect();
        assert_eq!(owner_lines.len(), 1);
        let segments = owner_lines[0];
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Data Team");
        assert!(!segments[0].mailto);
        assert!(segments[1].mailto);
    }

    #[test]
    fn untrusted_text_is_sanitized() {
        let doc = MenuDocument {
            brand: Brand {
                title: "Suite\x1b[31m".into(),
                link: "/suite/ui".into(),
            },
            tools: vec![],
        };
        let model = NavModel::build(&doc, None);
        assert_eq!(model.brand.title, "Suite[31m");
    }
}
