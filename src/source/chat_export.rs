//! Chat-service export reader
//!
//! Reads `projects.json` and `conversations.json` from an export directory.
//! Missing files are empty; entries that don't fit the expected shape are
//! skipped one by one.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChatProject {
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChatMessage {
    #[serde(default)]
    pub(crate) sender: Option<String>,
    #[serde(default)]
    pub(crate) text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Conversation {
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) summary: Option<String>,
    #[serde(default)]
    pub(crate) updated_at: Option<String>,
    #[serde(default)]
    pub(crate) chat_messages: Vec<ChatMessage>,
}

impl Conversation {
    pub(crate) fn message_count(&self) -> u64 {
        self.chat_messages.len() as u64
    }

    /// First non-empty text sent by the human participant.
    pub(crate) fn first_human_text(&self) -> Option<&str> {
        self.chat_messages
            .iter()
            .filter(|m| m.sender.as_deref() == Some("human"))
            .find_map(|m| m.text.as_deref().filter(|t| !t.is_empty()))
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ChatExport {
    pub(crate) projects: Vec<ChatProject>,
    pub(crate) conversations: Vec<Conversation>,
}

fn read_list<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    let values = match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(serde_json::Value::Array(values)) => values,
        Ok(_) => {
            tracing::warn!("{} is not a JSON list, ignoring", path.display());
            return Vec::new();
        }
        Err(err) => {
            tracing::warn!("failed to parse {}: {err}", path.display());
            return Vec::new();
        }
    };

    let total = values.len();
    let items: Vec<T> = values
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect();
    if items.len() < total {
        tracing::debug!(
            "{}: skipped {} malformed entries",
            path.display(),
            total - items.len()
        );
    }
    items
}

pub(crate) fn read_chat_export(dir: &Path) -> ChatExport {
    let export = ChatExport {
        projects: read_list(&dir.join("projects.json")),
        conversations: read_list(&dir.join("conversations.json")),
    };
    tracing::info!(
        "chat export: {} projects, {} conversations",
        export.projects.len(),
        export.conversations.len()
    );
    export
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let export = read_chat_export(&dir.path().join("absent"));
        assert!(export.projects.is_empty());
        assert!(export.conversations.is_empty());
    }

    #[test]
    fn reads_lists_and_skips_bad_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("projects.json"),
            r#"[{"name":"Hotbits","description":"entropy","updated_at":"2026-01-01T00:00:00Z"}, 7]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("conversations.json"),
            r#"[{"name":"Hotbits: tuning","chat_messages":[
                {"sender":"assistant","text":"hi"},
                {"sender":"human","text":"make it faster"}
            ]}]"#,
        )
        .unwrap();

        let export = read_chat_export(dir.path());
        assert_eq!(export.projects.len(), 1);
        assert_eq!(export.conversations[0].message_count(), 2);
        assert_eq!(
            export.conversations[0].first_human_text(),
            Some("make it faster")
        );
    }

    #[test]
    fn non_list_document_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("projects.json"), r#"{"name":"x"}"#).unwrap();
        assert!(read_chat_export(dir.path()).projects.is_empty());
    }
}
