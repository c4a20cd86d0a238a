use anyhow::{Result, bail};
use std::fs::Metadata;
use std::time::{Duration, UNIX_EPOCH};

pub(crate) fn retriable_status(code: u16) -> bool {
    matches!(code, 500 | 502 | 503 | 504 | 429 | 408)
}

pub(crate) fn backoff(current: Duration, max: Duration) -> Duration {
    let next = Duration::from_secs_f64((current.as_secs_f64() * 1.5).max(1.0));
    if next > max { max } else { next }
}

/// Splits an `owner/slug` reference. A bare slug belongs to `default_owner`.
pub(crate) fn split_ref(reference: &str, default_owner: &str) -> Result<(String, String)> {
    let reference = reference.trim();
    match reference.split_once('/') {
        Some((owner, slug)) => {
            if owner.is_empty() || slug.is_empty() || slug.contains('/') {
                bail!("invalid reference {reference:?}: expected owner/slug");
            }
            Ok((owner.to_string(), slug.to_string()))
        }
        None if reference.is_empty() => bail!("empty reference"),
        None => Ok((default_owner.to_string(), reference.to_string())),
    }
}

/// Seconds since the epoch, as the upload endpoints expect.
pub(crate) fn last_modified_secs(meta: &Metadata) -> u64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub(crate) fn file_name_of(path: &str) -> Option<&str> {
    let path = path.split('?').next().unwrap_or(path);
    path.rsplit('/').next().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_without_owner_use_the_default() {
        assert_eq!(
            split_ref("titanic-data", "alice").unwrap(),
            ("alice".to_string(), "titanic-data".to_string())
        );
        assert_eq!(
            split_ref(" bob/housing ", "alice").unwrap(),
            ("bob".to_string(), "housing".to_string())
        );
        assert!(split_ref("bob/", "alice").is_err());
        assert!(split_ref("a/b/c", "alice").is_err());
        assert!(split_ref("", "alice").is_err());
    }

    #[test]
    fn backoff_grows_and_saturates() {
        let max = Duration::from_secs(4);
        let first = backoff(Duration::ZERO, max);
        assert_eq!(first, Duration::from_secs(1));
        assert_eq!(backoff(Duration::from_secs(2), max), Duration::from_secs(3));
        assert_eq!(backoff(Duration::from_secs(3), max), max);
    }

    #[test]
    fn file_names_ignore_query_strings() {
        assert_eq!(file_name_of("https://h/a/b/out.csv?sig=1"), Some("out.csv"));
        assert_eq!(file_name_of("nested/dir/train.csv"), Some("train.csv"));
        assert_eq!(file_name_of("https://h/a/"), None);
    }
}
