//! Append-only JSON-lines feedback log and the response mapping.
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use bevy::prelude::*;
use serde_json::{json, Value};
use time::OffsetDateTime;

use super::{
    errors::FeedbackError,
    submission::{FeedbackEntry, FeedbackSubmission},
};

#[derive(Resource, Debug, Clone)]
pub struct FeedbackLog {
    path: PathBuf,
}

impl FeedbackLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry as a single JSON line, creating the directory on demand.
    pub fn append(&self, entry: &FeedbackEntry) -> Result<(), FeedbackError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(entry)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// Validates and stores a raw JSON body.
    pub fn submit(&self, body: &str, ip: Option<String>, now: OffsetDateTime) -> FeedbackResponse {
        let entry = match FeedbackSubmission::from_json(body)
            .and_then(|submission| submission.validate(now, ip))
        {
            Ok(entry) => entry,
            Err(errors) => return FeedbackResponse::Rejected(errors),
        };
        match self.append(&entry) {
            Ok(()) => FeedbackResponse::Ok,
            Err(err) => {
                error!(target: "feedback", "Failed to store feedback in {}: {}", self.path.display(), err);
                FeedbackResponse::Failed
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackResponse {
    Ok,
    Rejected(Vec<String>),
    Failed,
}

impl FeedbackResponse {
    pub fn status(&self) -> u16 {
        match self {
            FeedbackResponse::Ok => 200,
            FeedbackResponse::Rejected(_) => 400,
            FeedbackResponse::Failed => 500,
        }
    }

    pub fn body(&self) -> Value {
        match self {
            FeedbackResponse::Ok => json!({ "ok": true }),
            FeedbackResponse::Rejected(errors) => json!({ "error": errors }),
            FeedbackResponse::Failed => json!({ "error": "Unable to store feedback" }),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::{path::PathBuf, time::SystemTime};

    /// Fresh path under the temp directory; nothing is created yet.
    pub fn temp_log(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir()
            .join(format!("campusmap-{name}-{nanos}"))
            .join("feedback.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const VALID: &str = r#"{"suggestion":"Label the bike shed","email":"x@campus.example"}"#;

    #[test]
    fn submissions_append_json_lines() {
        let path = fixtures::temp_log("append");
        let log = FeedbackLog::new(&path);
        let now = datetime!(2024-05-02 10:15:00 UTC);

        assert_eq!(log.submit(VALID, None, now), FeedbackResponse::Ok);
        assert_eq!(log.submit(VALID, Some("::1".into()), now), FeedbackResponse::Ok);

        let data = fs::read_to_string(&path).unwrap();
        let lines: Vec<Value> = data
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["ip"], Value::Null);
        assert_eq!(lines[1]["ip"], "::1");
        assert_eq!(lines[1]["suggestion"], "Label the bike shed");

        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn rejections_store_nothing() {
        let path = fixtures::temp_log("reject");
        let log = FeedbackLog::new(&path);

        let response = log.submit(r#"{"email":"x@campus.example"}"#, None, OffsetDateTime::now_utc());
        assert_eq!(response.status(), 400);
        assert_eq!(response.body()["error"][0], "\"suggestion\" is required");
        assert!(!path.exists());
    }

    #[test]
    fn unwritable_log_fails_with_500() {
        let path = fixtures::temp_log("blocked");
        // A regular file where the log directory should be.
        let blocker = path.parent().unwrap().to_path_buf();
        fs::create_dir_all(blocker.parent().unwrap()).unwrap();
        fs::write(&blocker, b"").unwrap();

        let response = FeedbackLog::new(&path).submit(VALID, None, OffsetDateTime::now_utc());
        assert_eq!(response, FeedbackResponse::Failed);
        assert_eq!(response.body(), json!({ "error": "Unable to store feedback" }));
        let _ = fs::remove_file(&blocker);
    }

    #[test]
    fn ok_body() {
        assert_eq!(FeedbackResponse::Ok.status(), 200);
        assert_eq!(FeedbackResponse::Ok.body(), json!({ "ok": true }));
    }
}
