//! Job domain types

use serde::{Deserialize, Serialize};

/// Name of the gated job the workflow starts once a pipeline exists
pub const TARGET_JOB_NAME: &str = "platform:deploy";

/// A job of a CI pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    pub name: String,
    pub status: JobStatus,
}

/// CI job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Created,
    Pending,
    Running,
    Success,
    Failed,
    Canceled,
    Skipped,
    Manual,
    Scheduled,
    WaitingForResource,
    Preparing,
    #[serde(other)]
    Unknown,
}

/// Returns the first job named `name`, in list order
pub fn find_job<'a>(jobs: &'a [Job], name: &str) -> Option<&'a Job> {
    jobs.iter().find(|job| job.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: u64, name: &str) -> Job {
        Job {
            id,
            name: name.to_string(),
            status: JobStatus::Manual,
        }
    }

    #[test]
    fn test_find_job_first_match_wins() {
        let jobs = vec![job(1, "build"), job(2, "platform:deploy"), job(3, "platform:deploy")];
        assert_eq!(find_job(&jobs, "platform:deploy").map(|j| j.id), Some(2));
    }

    #[test]
    fn test_find_job_exact_name_only() {
        let jobs = vec![job(1, "platform:deploy-dry"), job(2, "Platform:deploy")];
        assert!(find_job(&jobs, "platform:deploy").is_none());
    }

    #[test]
    fn test_unknown_status_deserializes() {
        let status: JobStatus = serde_json::from_str("\"something_new\"").unwrap();
        assert_eq!(status, JobStatus::Unknown);
        let status: JobStatus = serde_json::from_str("\"waiting_for_resource\"").unwrap();
        assert_eq!(status, JobStatus::WaitingForResource);
    }
}
