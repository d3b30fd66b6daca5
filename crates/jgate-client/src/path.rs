//! Job name to URL path resolution.

/// Resolves a possibly folder-nested job name into its URL path.
///
/// Every `/`-separated segment is addressed through a `/job/` element,
/// so `"Folder/Sub/app"` becomes `"/job/Folder/job/Sub/job/app"`.
/// Segments are trimmed of surrounding whitespace and empty segments
/// (from leading or repeated slashes) are dropped.
pub fn resolve_job_path(job: &str) -> String {
    let mut path = String::new();

    for segment in job.strip_prefix('/').unwrap_or(job).split('/') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        path.push_str("/job/");
        path.push_str(segment);
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_segment() {
        assert_eq!(resolve_job_path("foo"), "/job/foo");
        assert_eq!(resolve_job_path("/foo/"), "/job/foo");
        assert_eq!(resolve_job_path("foo/"), "/job/foo");
    }

    #[test]
    fn test_nested_segments() {
        assert_eq!(resolve_job_path("foo/bar"), "/job/foo/job/bar");
        assert_eq!(
            resolve_job_path("Folder/Sub/app"),
            "/job/Folder/job/Sub/job/app"
        );
    }

    #[test]
    fn test_empty_segments_are_dropped() {
        assert_eq!(resolve_job_path("foo///bar"), "/job/foo/job/bar");
        assert_eq!(resolve_job_path("//foo"), "/job/foo");
    }

    #[test]
    fn test_whitespace_segments() {
        assert_eq!(resolve_job_path(" foo / bar "), "/job/foo/job/bar");
        assert_eq!(resolve_job_path("  /  "), "");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(resolve_job_path(""), "");
        assert_eq!(resolve_job_path("/"), "");
    }
}
