use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::error::SnapshotError;
use crate::filter::{Candidate, FinalSelection};
use crate::types::TabKind;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSnapshot {
    #[serde(default)]
    pub groups: Vec<TabGroup>,
}

impl TabSnapshot {
    pub fn tab(&self, target: TabRef) -> Option<&Tab> {
        self.groups
            .get(target.group)
            .and_then(|g| g.tabs.get(target.index))
    }

    /// The focused tab of the active group.
    pub fn active_tab(&self) -> Option<TabRef> {
        self.groups
            .iter()
            .enumerate()
            .filter(|(_, g)| g.is_active)
            .find_map(|(group, g)| {
                g.tabs.iter().position(|t| t.is_active).map(|index| TabRef {
                    group,
                    index,
                    view_column: g.view_column,
                })
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabGroup {
    #[serde(default = "default_view_column")]
    pub view_column: u32,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub tabs: Vec<Tab>,
}

fn default_view_column() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub label: String,
    #[serde(default)]
    pub input: TabInput,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_dirty: bool,
    #[serde(default)]
    pub is_pinned: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TabInput {
    Text {
        uri: String,
    },
    TextDiff {
        original: String,
        modified: String,
    },
    Notebook {
        uri: String,
    },
    NotebookDiff {
        original: String,
        modified: String,
    },
    Webview,
    Custom {
        uri: String,
    },
    Terminal,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TabInput {
    pub fn kind(&self) -> TabKind {
        match self {
            TabInput::Text { .. } => TabKind::Text,
            TabInput::Notebook { .. } => TabKind::Notebook,
            TabInput::Webview => TabKind::Webview,
            TabInput::Custom { .. } => TabKind::Custom,
            TabInput::TextDiff { .. }
            | TabInput::NotebookDiff { .. }
            | TabInput::Terminal
            | TabInput::Unknown => TabKind::Other,
        }
    }

    /// The document a tab shows, for inputs that have a single one.
    pub fn uri(&self) -> Option<&str> {
        match self {
            TabInput::Text { uri } | TabInput::Notebook { uri } | TabInput::Custom { uri } => {
                Some(uri)
            }
            _ => None,
        }
    }
}

/// Where a candidate lives in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabRef {
    pub group: usize,
    pub index: usize,
    pub view_column: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum NavigationRequest {
    OpenText {
        uri: String,
        view_column: u32,
        preserve_focus: bool,
    },
    OpenNotebook {
        uri: String,
        view_column: u32,
    },
    Unsupported {
        reason: String,
    },
}

impl NavigationRequest {
    /// Look the selected tab up again and build its request.
    pub fn resolve(snapshot: &TabSnapshot, selection: &FinalSelection<TabRef>) -> Self {
        let target = selection.source;
        match snapshot.tab(target) {
            Some(tab) => Self::for_selection(selection.kind, tab, target.view_column),
            None => NavigationRequest::Unsupported {
                reason: format!("Tab '{}' is no longer open.", selection.label),
            },
        }
    }

    /// `kind` picks the action; the tab only supplies its URI.
    pub fn for_selection(kind: TabKind, tab: &Tab, view_column: u32) -> Self {
        let uri = tab.input.uri().map(str::to_string);
        match (kind, uri) {
            (TabKind::Text | TabKind::Custom, Some(uri)) => NavigationRequest::OpenText {
                uri,
                view_column,
                preserve_focus: false,
            },
            (TabKind::Notebook, Some(uri)) => NavigationRequest::OpenNotebook { uri, view_column },
            (TabKind::Webview, _) => NavigationRequest::Unsupported {
                reason: "Focusing webview tabs is not supported yet.".to_string(),
            },
            _ => NavigationRequest::Unsupported {
                reason: format!("Tab '{}' cannot be focused from here.", tab.label),
            },
        }
    }
}

pub fn read_snapshot<R: Read>(mut reader: R) -> Result<TabSnapshot, SnapshotError> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw)?;
    if raw.trim().is_empty() {
        return Ok(TabSnapshot::default());
    }
    Ok(serde_json::from_str(&raw)?)
}

/// One candidate per tab, group by group in host order.
pub fn enumerate_candidates(snapshot: &TabSnapshot) -> Vec<Candidate<TabRef>> {
    let mut out = Vec::new();
    for (group_idx, group) in snapshot.groups.iter().enumerate() {
        for (tab_idx, tab) in group.tabs.iter().enumerate() {
            if tab.label.trim().is_empty() {
                warn!(group = group_idx, tab = tab_idx, "skipping tab without a label");
                continue;
            }
            let source = TabRef {
                group: group_idx,
                index: tab_idx,
                view_column: group.view_column,
            };
            out.push(Candidate::new(
                tab.label.clone(),
                describe_input(&tab.input),
                tab.input.kind(),
                source,
            ));
        }
    }
    out
}

fn describe_input(input: &TabInput) -> String {
    match input {
        TabInput::Text { uri } => display_path(uri),
        _ => String::new(),
    }
}

/// Filesystem path for `file:` URIs, the URI itself otherwise.
pub(crate) fn display_path(uri: &str) -> String {
    match Url::parse(uri) {
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| url.path().to_string()),
        Ok(url) => url.to_string(),
        Err(_) => uri.to_string(),
    }
}
