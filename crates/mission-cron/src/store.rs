//! JSON-file-backed cron job storage.
//!
//! Updates and deletes snapshot the current document to `jobs.json.bak`
//! before writing. The snapshot is overwritten each time and is only taken
//! once the target job is known to exist.

use std::path::{Path, PathBuf};

use tracing::info;

use mission_storage::{JsonDocument, Loaded, Result, StoreError};
use mission_types::{CronDocument, CronJob, CronJobPatch, NewCronJob};

/// Persistent storage for cron jobs.
pub struct CronStore {
    document: JsonDocument<CronDocument>,
}

impl CronStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            document: JsonDocument::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.document.path()
    }

    pub fn backup_path(&self) -> PathBuf {
        self.document.backup_path()
    }

    /// List all cron jobs in stored order. Empty if the file is missing or unreadable.
    pub fn list_jobs(&self) -> Vec<CronJob> {
        self.document.load_or_default().jobs
    }

    /// Append a new job.
    pub fn create_job(&self, input: NewCronJob) -> Result<CronJob> {
        let missing = input.missing_fields();
        let Some(job) = input.into_job() else {
            return Err(StoreError::missing_fields(&missing));
        };

        let mut doc = self.document.read()?.unwrap_or_default();
        doc.jobs.push(job.clone());
        self.persist(&doc)?;

        info!(
            job_id = job.id().unwrap_or_default(),
            name = job.name().unwrap_or_default(),
            session_target = job.session_target(),
            "Created cron job"
        );
        Ok(job)
    }

    /// Shallow-merge `patch` onto the job with this id.
    pub fn update_job(&self, id: &str, patch: CronJobPatch) -> Result<CronJob> {
        let Some(Loaded { mut document, raw }) = self.document.read_loaded()? else {
            return Err(not_found(id));
        };
        let index = position(&document, id).ok_or_else(|| not_found(id))?;

        self.snapshot(&raw)?;
        let job = &mut document.jobs[index];
        job.apply_patch(patch);
        let job = job.clone();
        self.persist(&document)?;

        info!(job_id = %id, enabled = job.enabled(), "Updated cron job");
        Ok(job)
    }

    /// Remove the job with this id.
    pub fn delete_job(&self, id: &str) -> Result<String> {
        let Some(Loaded { mut document, raw }) = self.document.read_loaded()? else {
            return Err(StoreError::NotFound("No jobs file found".to_string()));
        };
        let index = position(&document, id).ok_or_else(|| not_found(id))?;

        self.snapshot(&raw)?;
        document.jobs.remove(index);
        self.persist(&document)?;

        info!(job_id = %id, remaining = document.jobs.len(), "Deleted cron job");
        Ok(id.to_string())
    }

    fn snapshot(&self, raw: &str) -> Result<()> {
        if self.document.backup(raw) {
            Ok(())
        } else {
            Err(StoreError::Persistence(self.backup_path()))
        }
    }

    fn persist(&self, doc: &CronDocument) -> Result<()> {
        if self.document.save(doc) {
            Ok(())
        } else {
            Err(StoreError::Persistence(self.path().to_path_buf()))
        }
    }
}

fn position(doc: &CronDocument, id: &str) -> Option<usize> {
    doc.jobs.iter().position(|job| job.id() == Some(id))
}

fn not_found(id: &str) -> StoreError {
    StoreError::NotFound(format!("Job not found: {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn store() -> (tempfile::TempDir, CronStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CronStore::new(dir.path().join("cron").join("jobs.json"));
        (dir, store)
    }

    fn input<T: serde::de::DeserializeOwned>(value: Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    fn new_job(name: &str) -> NewCronJob {
        input(json!({
            "name": name,
            "schedule": "0 9 * * *",
            "payload": {"kind": "systemEvent", "text": name}
        }))
    }

    fn seed_text(store: &CronStore, text: &str) {
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), text).unwrap();
    }

    fn seed(store: &CronStore, doc: Value) {
        seed_text(store, &serde_json::to_string_pretty(&doc).unwrap());
    }

    fn on_disk(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    // Jobs as the agent runtime writes them: optional fields left out,
    // runtime-only keys present.
    fn runtime_jobs() -> Value {
        json!({"version": 1, "jobs": [
            {"id": "j1", "name": "a", "schedule": {"kind": "cron", "expr": "0 9 * * *"}, "payload": 1,
             "state": {"nextRunAtMs": 1700000000000_i64}},
            {"id": "j2", "name": "b", "schedule": "s", "payload": 2},
            {"id": "j3", "agentId": "ops", "name": "c", "schedule": "s", "payload": 3}
        ]})
    }

    #[test]
    fn test_list_missing_file() {
        let (_dir, store) = store();
        assert!(store.list_jobs().is_empty());
    }

    #[test]
    fn test_list_corrupt_file() {
        let (_dir, store) = store();
        seed_text(&store, "{\"jobs\": [");
        assert!(store.list_jobs().is_empty());
    }

    #[test]
    fn test_create_appends_with_defaults() {
        let (_dir, store) = store();
        store.create_job(new_job("first")).unwrap();
        let before = store.list_jobs().len();

        let job = store.create_job(new_job("second")).unwrap();
        assert!(job.id().unwrap().starts_with("job-"));
        assert_eq!(job.get("enabled"), Some(&json!(true)));
        assert_eq!(job.get("sessionTarget"), Some(&json!("isolated")));

        let jobs = store.list_jobs();
        assert_eq!(jobs.len(), before + 1);
        assert_eq!(jobs.last(), Some(&job));
        assert!(!store.backup_path().exists());
    }

    #[test]
    fn test_create_missing_required_field() {
        let (_dir, store) = store();
        let err = store
            .create_job(input(json!({"name": "no schedule", "payload": "x"})))
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(ref m) if m.contains("schedule")));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_create_preserves_document_extras() {
        let (_dir, store) = store();
        seed(&store, json!({"version": 1, "jobs": []}));
        store.create_job(new_job("a")).unwrap();

        let raw = on_disk(store.path());
        assert_eq!(raw["version"], 1);
        assert_eq!(raw["jobs"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_update_merges_and_backs_up() {
        let (_dir, store) = store();
        seed(
            &store,
            json!({"jobs": [
                {"id": "j1", "name": "a", "schedule": "s", "payload": 1, "agentId": "ops"},
                {"id": "j2", "name": "b", "schedule": "s", "payload": 2}
            ]}),
        );
        let before = std::fs::read(store.path()).unwrap();

        let job = store
            .update_job("j1", input(json!({"enabled": false, "name": "renamed"})))
            .unwrap();
        assert!(!job.enabled());
        assert_eq!(job.name(), Some("renamed"));
        assert_eq!(job.get("agentId"), Some(&json!("ops")));

        assert_eq!(std::fs::read(store.backup_path()).unwrap(), before);

        let jobs = store.list_jobs();
        assert_eq!(jobs[0], job);
        assert_eq!(
            jobs[1].as_value(),
            &json!({"id": "j2", "name": "b", "schedule": "s", "payload": 2})
        );
    }

    #[test]
    fn test_untouched_runtime_jobs_are_written_back_verbatim() {
        let (_dir, store) = store();
        seed(&store, runtime_jobs());
        let original = runtime_jobs();

        store
            .update_job("j1", input(json!({"enabled": false})))
            .unwrap();
        let after_update = std::fs::read_to_string(store.path()).unwrap();
        for (i, job) in original["jobs"].as_array().unwrap().iter().enumerate().skip(1) {
            let pretty = serde_json::to_string_pretty(job).unwrap().replace('\n', "\n    ");
            assert!(after_update.contains(&pretty), "job {i} was rewritten");
        }

        store.delete_job("j2").unwrap();
        let after_delete = on_disk(store.path());
        assert_eq!(after_delete["version"], 1);
        assert_eq!(after_delete["jobs"][1], original["jobs"][2]);
        assert_eq!(
            serde_json::to_string(&after_delete["jobs"][1]).unwrap(),
            serde_json::to_string(&original["jobs"][2]).unwrap()
        );
        assert!(after_delete["jobs"][1].get("enabled").is_none());
        assert!(after_delete["jobs"][1].get("sessionTarget").is_none());
    }

    #[test]
    fn test_off_type_field_does_not_break_the_store() {
        let (_dir, store) = store();
        let text = r#"{"jobs":[{"id":"j1","name":"a","schedule":"s","payload":1,"enabled":null},{"id":"j2","name":"b","schedule":"s","payload":2}]}"#;
        seed_text(&store, text);

        let jobs = store.list_jobs();
        assert_eq!(jobs.len(), 2);
        assert!(jobs[0].enabled());

        assert_eq!(store.delete_job("j2").unwrap(), "j2");
        assert_eq!(std::fs::read_to_string(store.backup_path()).unwrap(), text);
        assert_eq!(
            on_disk(store.path()),
            json!({"jobs": [{"id": "j1", "name": "a", "schedule": "s", "payload": 1, "enabled": null}]})
        );
    }

    #[test]
    fn test_update_unknown_id() {
        let (_dir, store) = store();
        store.create_job(new_job("a")).unwrap();
        let err = store
            .update_job("missing", CronJobPatch::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(!store.backup_path().exists());
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let (_dir, store) = store();
        let a = store.create_job(new_job("a")).unwrap();
        let b = store.create_job(new_job("b")).unwrap();
        let c = store.create_job(new_job("c")).unwrap();

        let b_id = b.id().unwrap().to_string();
        assert_eq!(store.delete_job(&b_id).unwrap(), b_id);
        assert_eq!(store.list_jobs(), vec![a, c]);

        let backup = on_disk(&store.backup_path());
        assert_eq!(backup["jobs"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_delete_unknown_id_leaves_file_untouched() {
        let (_dir, store) = store();
        store.create_job(new_job("a")).unwrap();
        let before = std::fs::read(store.path()).unwrap();

        let err = store.delete_job("nope").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(std::fs::read(store.path()).unwrap(), before);
        assert!(!store.backup_path().exists());
    }

    #[test]
    fn test_delete_without_file() {
        let (_dir, store) = store();
        let err = store.delete_job("j1").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ref m) if m == "No jobs file found"));
    }

    #[test]
    fn test_mutations_refuse_corrupt_file() {
        let (_dir, store) = store();
        seed_text(&store, "not json");

        assert!(matches!(
            store.create_job(new_job("a")),
            Err(StoreError::Unexpected(_))
        ));
        assert!(matches!(
            store.delete_job("a"),
            Err(StoreError::Unexpected(_))
        ));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "not json");
    }
}
