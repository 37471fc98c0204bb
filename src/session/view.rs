use super::events::SearchResponse;
use super::state::{ConnectionState, TransportState};
use crate::transport::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a log line is styled, inferred from its prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    User,
    Bot,
    Status,
    Error,
    Info,
}

impl LogCategory {
    pub fn infer(text: &str) -> Self {
        if text.starts_with("User: ") {
            LogCategory::User
        } else if text.starts_with("Bot: ") {
            LogCategory::Bot
        } else if text.starts_with("Status: ") {
            LogCategory::Status
        } else if text.starts_with("Error") {
            LogCategory::Error
        } else {
            LogCategory::Info
        }
    }
}

/// One line of the conversation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub category: LogCategory,
}

impl LogEntry {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            timestamp: Utc::now(),
            category: LogCategory::infer(&text),
            text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

/// Search result currently on display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub result_text: Option<String>,
    pub sources: Vec<Source>,
    pub rendered_fragment: Option<String>,
}

/// A rendered block of the search result region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "lowercase")]
pub enum SearchSection {
    Text { text: String },
    Sources { sources: Vec<Source> },
    Fragment { markup: String },
}

impl SearchResult {
    /// Sections to render, in display order; absent fields produce none
    pub fn sections(&self) -> Vec<SearchSection> {
        let mut sections = Vec::new();

        if let Some(text) = &self.result_text {
            sections.push(SearchSection::Text { text: text.clone() });
        }
        if !self.sources.is_empty() {
            sections.push(SearchSection::Sources {
                sources: self.sources.clone(),
            });
        }
        if let Some(markup) = &self.rendered_fragment {
            sections.push(SearchSection::Fragment {
                markup: markup.clone(),
            });
        }

        sections
    }
}

impl From<SearchResponse> for SearchResult {
    fn from(response: SearchResponse) -> Self {
        // Empty strings count as absent
        let non_empty = |s: Option<String>| s.filter(|s| !s.is_empty());

        Self {
            result_text: non_empty(response.search_result),
            sources: response
                .origins
                .unwrap_or_default()
                .into_iter()
                .map(|o| Source {
                    title: o.site_title,
                    uri: o.site_uri,
                })
                .collect(),
            rendered_fragment: non_empty(response.rendered_content),
        }
    }
}

/// Why the last session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEnd {
    /// `disconnect()` was requested locally
    Local,
    /// The transport reported the session gone
    Remote,
    /// `connect()` failed and its partial state was cleaned up
    ConnectFailed,
}

/// Everything the UI shell displays
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub connection: ConnectionState,
    pub session_id: Option<SessionId>,
    pub transport_state: Option<TransportState>,
    pub status: String,
    pub connect_enabled: bool,
    pub disconnect_enabled: bool,
    pub log: Vec<LogEntry>,
    pub search_result: Option<SearchResult>,
    pub last_end: Option<SessionEnd>,
}

impl Default for SessionView {
    fn default() -> Self {
        Self {
            connection: ConnectionState::Idle,
            session_id: None,
            transport_state: None,
            status: "Disconnected".to_string(),
            connect_enabled: true,
            disconnect_enabled: false,
            log: Vec::new(),
            search_result: None,
            last_end: None,
        }
    }
}

impl SessionView {
    /// Log lines of one category, oldest first
    pub fn entries(&self, category: LogCategory) -> impl Iterator<Item = &LogEntry> {
        self.log.iter().filter(move |e| e.category == category)
    }
}
