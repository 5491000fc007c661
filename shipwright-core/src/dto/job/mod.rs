//! Job DTOs

use serde::{Deserialize, Serialize};

use crate::domain::job::{Job, JobStatus};

/// Job as returned by the pipeline jobs API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInfo {
    pub id: u64,
    pub name: String,
    pub status: JobStatus,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<JobInfo> for Job {
    fn from(info: JobInfo) -> Self {
        Self {
            id: info.id,
            name: info.name,
            status: info.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_info_conversion() {
        let raw = r#"{
            "id": 42,
            "name": "platform:deploy",
            "status": "manual",
            "stage": "deploy",
            "created_at": "2024-01-02T03:04:05.000Z"
        }"#;
        let info: JobInfo = serde_json::from_str(raw).unwrap();
        let job: Job = info.into();
        assert_eq!(job.id, 42);
        assert_eq!(job.status, JobStatus::Manual);
    }
}
