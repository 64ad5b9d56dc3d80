use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// A JSON object as read from disk or a request body, in its original key order.
pub type Fields = Map<String, Value>;

/// Generate a record id of the form `<prefix>-<epochMillis>-<random>`.
///
/// The random suffix keeps ids distinct when several records are created
/// within the same millisecond.
pub fn generate_id(prefix: &str) -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{prefix}-{}-{}",
        Utc::now().timestamp_millis(),
        &random[..9]
    )
}

const DEFAULT_SESSION_TARGET: &str = "isolated";
const DEFAULT_STATUS: &str = "not_started";
const DEFAULT_PRIORITY: &str = "medium";

/// Render a timestamp the way records store it: RFC 3339, milliseconds, `Z`.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ──────────────────── Cron Types ────────────────────

/// A scheduled job record, kept as the JSON value read from disk.
///
/// The jobs file is owned by the agent runtime, so stored jobs are never
/// normalized: accessors apply defaults on read and untouched jobs are
/// written back unchanged. Execution is owned by that other process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CronJob(Value);

impl CronJob {
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// `enabled` unless stored as `false`.
    pub fn enabled(&self) -> bool {
        self.0
            .get("enabled")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Session the job runs in (e.g. "isolated", "main").
    pub fn session_target(&self) -> &str {
        self.0
            .get("sessionTarget")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_SESSION_TARGET)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Shallow-merge a patch onto this job. The id is never changed.
    pub fn apply_patch(&mut self, patch: CronJobPatch) {
        if let Value::Object(fields) = &mut self.0 {
            merge_fields(fields, patch.0, &["id"]);
        }
    }
}

impl From<Value> for CronJob {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

const CRON_REQUIRED_FIELDS: &[&str] = &["name", "schedule", "payload"];

/// Input for creating a cron job. `name`, `schedule` and `payload` are
/// required; presence is checked by the store, not by deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewCronJob(pub Fields);

impl NewCronJob {
    /// Names of required fields that are absent or null, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        missing_fields(&self.0, CRON_REQUIRED_FIELDS)
    }

    /// Build the stored record, assigning an id and defaults where absent.
    /// Returns `None` if a required field is missing.
    pub fn into_job(self) -> Option<CronJob> {
        if !self.missing_fields().is_empty() {
            return None;
        }
        let id = match self.0.get("id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            _ => generate_id("job"),
        };

        let mut fields = Fields::new();
        fields.insert("id".to_string(), Value::String(id));
        merge_fields(&mut fields, self.0, &["id"]);
        fields.entry("enabled").or_insert(Value::Bool(true));
        fields
            .entry("sessionTarget")
            .or_insert_with(|| Value::String(DEFAULT_SESSION_TARGET.to_string()));
        Some(CronJob(Value::Object(fields)))
    }
}

/// Partial update for a cron job. Present fields replace stored ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CronJobPatch(pub Fields);

/// On-disk shape of the cron jobs file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CronDocument {
    #[serde(flatten)]
    pub extra: Fields,
    #[serde(default)]
    pub jobs: Vec<CronJob>,
}

// ──────────────────── Task Types ────────────────────

/// A task record, kept as the JSON value read from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Task(Value);

impl Task {
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    /// Workflow status (e.g. "not_started", "in_progress", "done").
    pub fn status(&self) -> Option<&str> {
        self.0.get("status").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Merge a patch and stamp `updatedAt`, even if the patch carried its own.
    pub fn apply_patch(&mut self, patch: TaskPatch, now: DateTime<Utc>) {
        if let Value::Object(fields) = &mut self.0 {
            merge_fields(fields, patch.0, TASK_SERVER_FIELDS);
            fields.insert("updatedAt".to_string(), Value::String(timestamp(now)));
        }
    }
}

impl From<Value> for Task {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

const TASK_SERVER_FIELDS: &[&str] = &["id", "createdAt", "updatedAt"];
const TASK_REQUIRED_FIELDS: &[&str] = &["title", "description"];

/// Input for creating a task. Server-owned fields in the input are dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewTask(pub Fields);

impl NewTask {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        missing_fields(&self.0, TASK_REQUIRED_FIELDS)
    }

    /// Build the stored record with a fresh id and both timestamps set to `now`.
    pub fn into_task(self, now: DateTime<Utc>) -> Option<Task> {
        if !self.missing_fields().is_empty() {
            return None;
        }
        let mut fields = Fields::new();
        fields.insert("id".to_string(), Value::String(generate_id("task")));
        merge_fields(&mut fields, self.0, TASK_SERVER_FIELDS);
        fields
            .entry("status")
            .or_insert_with(|| Value::String(DEFAULT_STATUS.to_string()));
        fields
            .entry("priority")
            .or_insert_with(|| Value::String(DEFAULT_PRIORITY.to_string()));
        let now = Value::String(timestamp(now));
        fields.insert("createdAt".to_string(), now.clone());
        fields.insert("updatedAt".to_string(), now);
        Some(Task(Value::Object(fields)))
    }
}

/// Partial update for a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskPatch(pub Fields);

/// On-disk shape of the tasks file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDocument {
    #[serde(flatten)]
    pub extra: Fields,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

// ──────────────────── Settings Types ────────────────────

/// Operator settings: a JSON object of namespaces (`interface`, `cadence`,
/// `personality`, or any other key). Namespace contents are not validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(pub Fields);

impl Default for Settings {
    fn default() -> Self {
        let mut fields = Fields::new();
        fields.insert(
            "interface".to_string(),
            json!({
                "proactiveMode": true,
                "notificationStyle": "balanced",
                "responseLength": "medium",
            }),
        );
        fields.insert(
            "cadence".to_string(),
            json!({
                "heartbeatInterval": 30,
                "dailySummaryTime": "09:00",
                "quietHoursStart": "23:00",
                "quietHoursEnd": "07:00",
            }),
        );
        fields.insert(
            "personality".to_string(),
            json!({
                "tone": "friendly",
                "verbosity": "balanced",
                "humor": "light",
                "formality": "casual",
            }),
        );
        Self(fields)
    }
}

impl Settings {
    pub fn namespace(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Top-level shallow merge: a namespace present in the patch replaces
    /// the stored namespace wholesale.
    pub fn apply_patch(&mut self, patch: Settings) {
        merge_fields(&mut self.0, patch.0, &[]);
    }
}

// ──────────────────── Agent Types ────────────────────

/// Summary of one agent, derived from its session index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    /// Agent directory name.
    pub id: String,
    pub label: String,
    pub session_count: usize,
    /// ISO-8601 time of the most recent session update.
    pub last_active: Option<String>,
    /// Channel of the most recent session, or "unknown".
    pub channel: String,
}

impl Agent {
    /// Record for an agent with no readable session index.
    pub fn without_sessions(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            session_count: 0,
            last_active: None,
            channel: "unknown".to_string(),
        }
    }
}

/// Copy `source` onto `target`. Null values count as absent and reserved
/// keys are never written.
fn merge_fields(target: &mut Fields, source: Fields, reserved: &[&str]) {
    for (key, value) in source {
        if value.is_null() || reserved.contains(&key.as_str()) {
            continue;
        }
        target.insert(key, value);
    }
}

fn missing_fields(fields: &Fields, required: &[&'static str]) -> Vec<&'static str> {
    required
        .iter()
        .copied()
        .filter(|key| fields.get(*key).is_none_or(Value::is_null))
        .collect()
}
