use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{FetchError, FetchResult};
use crate::models::{AttendanceLogEntry, StudentRecord};

pub const DEFAULT_ROSTER_PATH: &str = "/students";
pub const DEFAULT_LOGS_PATH: &str = "/attendance";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the roster and the attendance log come from. The two fetches are
/// independent and may complete in any order.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_roster(&self) -> FetchResult<Vec<StudentRecord>>;
    async fn fetch_logs(&self) -> FetchResult<Vec<AttendanceLogEntry>>;
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub base_url: String,
    pub roster_path: String,
    pub logs_path: String,
    pub timeout: Duration,
}

impl SourceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            roster_path: DEFAULT_ROSTER_PATH.to_string(),
            logs_path: DEFAULT_LOGS_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn roster_url(&self) -> String {
        join_url(&self.base_url, &self.roster_path)
    }

    pub fn logs_url(&self) -> String {
        join_url(&self.base_url, &self.logs_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub struct HttpSource {
    client: reqwest::Client,
    roster_url: String,
    logs_url: String,
}

impl HttpSource {
    pub fn try_new(config: &SourceConfig) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| FetchError::Transport {
                url: config.base_url.clone(),
                source,
            })?;

        Ok(Self {
            client,
            roster_url: config.roster_url(),
            logs_url: config.logs_url(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> FetchResult<T> {
        let correlation_id = Uuid::new_v4();
        let start = Instant::now();
        debug!(target: "attendance::source", %correlation_id, url, "fetching");

        let response = self.client.get(url).send().await.map_err(|source| {
            warn!(target: "attendance::source", %correlation_id, url, error = %source, "request failed");
            FetchError::Transport {
                url: url.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(target: "attendance::source", %correlation_id, url, status = %status, "non-success status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        debug!(
            target: "attendance::source",
            %correlation_id,
            url,
            latency_ms = start.elapsed().as_millis() as u64,
            bytes = body.len(),
            "fetched"
        );

        decode(url, &body)
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch_roster(&self) -> FetchResult<Vec<StudentRecord>> {
        self.get_json(&self.roster_url).await
    }

    async fn fetch_logs(&self) -> FetchResult<Vec<AttendanceLogEntry>> {
        self.get_json(&self.logs_url).await
    }
}

/// Reads the same JSON documents the HTTP endpoints serve from local files.
#[derive(Debug, Clone)]
pub struct FileSource {
    roster_file: PathBuf,
    logs_file: PathBuf,
}

impl FileSource {
    pub fn new(roster_file: impl Into<PathBuf>, logs_file: impl Into<PathBuf>) -> Self {
        Self {
            roster_file: roster_file.into(),
            logs_file: logs_file.into(),
        }
    }

    async fn read_json<T: DeserializeOwned>(path: &Path) -> FetchResult<T> {
        debug!(target: "attendance::source", path = %path.display(), "reading");
        let body = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| FetchError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        decode(&path.display().to_string(), &body)
    }
}

#[async_trait]
impl DataSource for FileSource {
    async fn fetch_roster(&self) -> FetchResult<Vec<StudentRecord>> {
        Self::read_json(&self.roster_file).await
    }

    async fn fetch_logs(&self) -> FetchResult<Vec<AttendanceLogEntry>> {
        Self::read_json(&self.logs_file).await
    }
}

fn decode<T: DeserializeOwned>(origin: &str, body: &str) -> FetchResult<T> {
    serde_json::from_str(body).map_err(|err| FetchError::Decode {
        origin: origin.to_string(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_without_double_slashes() {
        let mut config = SourceConfig::new("http://localhost:3000/");
        assert_eq!(config.roster_url(), "http://localhost:3000/students");
        assert_eq!(config.logs_url(), "http://localhost:3000/attendance");

        config.logs_path = "api/logs".to_string();
        assert_eq!(config.logs_url(), "http://localhost:3000/api/logs");
    }

    #[test]
    fn decode_reads_wire_field_names() {
        let logs: Vec<AttendanceLogEntry> =
            decode("test", r#"[{"date":"2025-05-01","present":[1,2,3]}]"#).expect("decodes");

        assert_eq!(logs[0].date, "2025-05-01");
        assert_eq!(logs[0].present_ids, vec![1, 2, 3]);
    }

    #[test]
    fn decode_reports_shape_mismatch() {
        let error = decode::<Vec<StudentRecord>>("roster.json", r#"{"id":1}"#)
            .expect_err("object is not an array");

        assert!(matches!(error, FetchError::Decode { ref origin, .. } if origin == "roster.json"));
    }
}
