use serde::Serialize;

/// Content variant of an open tab. Closed set: the host switches on it to
/// decide how to navigate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TabKind {
    Text,
    Notebook,
    Webview,
    Custom,
    Other,
}

impl TabKind {
    pub fn badge(self) -> &'static str {
        match self {
            TabKind::Text => "txt",
            TabKind::Notebook => "nb",
            TabKind::Webview => "web",
            TabKind::Custom => "cst",
            TabKind::Other => "...",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Closed,
}
