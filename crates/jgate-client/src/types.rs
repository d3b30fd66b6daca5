//! Jenkins API response types.

use serde::Deserialize;

/// One entry in the build queue, fetched fresh on every poll.
#[derive(Debug, Deserialize)]
pub struct QueueItem {
    pub id: i64,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default)]
    pub buildable: bool,
    #[serde(rename = "inQueueSince")]
    #[serde(default)]
    pub in_queue_since: i64,
    #[serde(default)]
    pub why: Option<String>,
    #[serde(default)]
    pub executable: Option<QueueExecutable>,
}

/// Build reference, present once the scheduler has dispatched the item.
#[derive(Debug, Deserialize)]
pub struct QueueExecutable {
    pub number: i64,
    #[serde(default)]
    pub url: Option<String>,
}

/// Snapshot of one build. Terminal once `building` is false; `result`
/// is authoritative only at that point.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildInfo {
    pub number: i64,
    #[serde(default)]
    pub building: bool,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub timestamp: i64,
}

impl BuildInfo {
    /// Result string, empty while the build is still running.
    pub fn result_str(&self) -> &str {
        self.result.as_deref().unwrap_or("")
    }
}

/// Anti-CSRF crumb issued by the server, injected as a request header
/// on state-changing requests.
#[derive(Debug, Clone, Deserialize)]
pub struct Crumb {
    pub crumb: String,
    #[serde(rename = "crumbRequestField")]
    pub crumb_request_field: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_item_waiting() {
        let item: QueueItem = serde_json::from_str(
            r#"{"id": 123, "blocked": false, "buildable": true, "why": "Waiting for next available executor"}"#,
        )
        .unwrap();

        assert_eq!(item.id, 123);
        assert!(item.buildable);
        assert!(item.executable.is_none());
        assert_eq!(item.why.as_deref(), Some("Waiting for next available executor"));
    }

    #[test]
    fn test_queue_item_dispatched() {
        let item: QueueItem = serde_json::from_str(
            r#"{"id": 123, "executable": {"number": 456, "url": "http://jenkins/job/app/456/"}}"#,
        )
        .unwrap();

        let executable = item.executable.unwrap();
        assert_eq!(executable.number, 456);
        assert_eq!(executable.url.as_deref(), Some("http://jenkins/job/app/456/"));
    }

    #[test]
    fn test_build_info_running_has_null_result() {
        let info: BuildInfo = serde_json::from_str(
            r#"{"number": 456, "building": true, "result": null, "timestamp": 1700000000000}"#,
        )
        .unwrap();

        assert!(info.building);
        assert_eq!(info.result_str(), "");
    }

    #[test]
    fn test_build_info_terminal() {
        let info: BuildInfo = serde_json::from_str(
            r#"{"number": 456, "building": false, "result": "UNSTABLE", "url": "http://jenkins/job/app/456/", "duration": 90000, "timestamp": 1700000000000}"#,
        )
        .unwrap();

        assert!(!info.building);
        assert_eq!(info.result_str(), "UNSTABLE");
        assert_eq!(info.duration, 90000);
    }

    #[test]
    fn test_crumb_fields() {
        let crumb: Crumb = serde_json::from_str(
            r#"{"_class": "hudson.security.csrf.DefaultCrumbIssuer", "crumb": "abc123", "crumbRequestField": "Jenkins-Crumb"}"#,
        )
        .unwrap();

        assert_eq!(crumb.crumb, "abc123");
        assert_eq!(crumb.crumb_request_field, "Jenkins-Crumb");
    }
}
