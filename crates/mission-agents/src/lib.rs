//! mission-agents: Agent summaries from the runtime's session indexes.
//!
//! The agent runtime keeps one directory per agent under its `agents/`
//! root, each with a `sessions/sessions.json` index keyed by session key.
//! This crate reduces each index to a single [`Agent`] record. It never
//! writes to the tree.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value;

pub use mission_types::Agent;

/// Read-only view over the runtime's `agents/` directory.
#[derive(Debug, Clone)]
pub struct AgentDirectory {
    root: PathBuf,
}

impl AgentDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<agent_id>/sessions/sessions.json`
    pub fn session_index_path(&self, agent_id: &str) -> PathBuf {
        self.root
            .join(agent_id)
            .join("sessions")
            .join("sessions.json")
    }

    /// Summarize every agent directory, sorted by id.
    ///
    /// A missing root is an empty list. Only failing to enumerate an
    /// existing root is an error; a bad index degrades that one agent.
    pub fn list_agents(&self) -> std::io::Result<Vec<Agent>> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Sessions root {} not found", self.root.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(id) => ids.push(id),
                Err(name) => {
                    tracing::warn!("Skipping agent directory with non-UTF-8 name: {name:?}");
                }
            }
        }
        ids.sort();

        Ok(ids.iter().map(|id| self.summarize(id)).collect())
    }

    /// Summarize one agent from its session index.
    pub fn summarize(&self, agent_id: &str) -> Agent {
        let path = self.session_index_path(agent_id);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Agent::without_sessions(agent_id);
            }
            Err(e) => {
                tracing::warn!(agent = %agent_id, "Failed to read {}: {e}", path.display());
                return Agent::without_sessions(agent_id);
            }
        };

        match serde_json::from_str::<BTreeMap<String, Value>>(&content) {
            Ok(sessions) => summarize_sessions(agent_id, &sessions),
            Err(e) => {
                tracing::warn!(agent = %agent_id, "Failed to parse {}: {e}", path.display());
                Agent::without_sessions(agent_id)
            }
        }
    }
}

/// Reduce a session index to the agent's summary.
///
/// The most recent session is the one with the greatest `updatedAt`.
/// Sessions are visited in key order and only a strictly greater value
/// replaces the current pick, so ties go to the first key.
pub fn summarize_sessions(agent_id: &str, sessions: &BTreeMap<String, Value>) -> Agent {
    let mut recent: Option<(i64, &Value)> = None;
    for session in sessions.values() {
        let Some(updated_at) = session.get("updatedAt").and_then(epoch_millis) else {
            continue;
        };
        if recent.is_none_or(|(best, _)| updated_at > best) {
            recent = Some((updated_at, session));
        }
    }

    let mut agent = Agent::without_sessions(agent_id);
    agent.session_count = sessions.len();

    if let Some((updated_at, session)) = recent {
        agent.last_active = DateTime::<Utc>::from_timestamp_millis(updated_at)
            .map(mission_types::timestamp);
        if let Some(label) = non_empty_str(session.pointer("/origin/label")) {
            agent.label = label.to_string();
        }
        if let Some(channel) = non_empty_str(session.get("lastChannel")) {
            agent.channel = channel.to_string();
        }
    }

    agent
}

fn epoch_millis(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|ms| ms as i64))
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
