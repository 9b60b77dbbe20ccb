//! Locator and output key derivation.

use chrono::{DateTime, Timelike, Utc};

pub fn locator(bucket: &str, key: &str) -> String {
    format!("s3://{bucket}/{key}")
}

/// The last path segment of `key` with its final extension removed.
///
/// Leading dots do not start an extension, so `.env` stays `.env`;
/// `archive.tar.gz` becomes `archive.tar`.
pub fn base_filename(key: &str) -> &str {
    let name = key.rsplit('/').next().unwrap_or(key);
    let leading_dots = name.len() - name.trim_start_matches('.').len();
    match name[leading_dots..].rfind('.') {
        Some(dot) => &name[..leading_dots + dot],
        None => name,
    }
}

/// ISO-8601 UTC timestamp with no offset suffix, e.g.
/// `2024-03-01T12:30:45.123456`. The microsecond fraction is left out when it
/// is zero (`2024-03-01T12:30:45`).
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    if at.nanosecond() / 1_000 == 0 {
        at.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

/// `{prefix}/{timestamp}/{base}.json`
pub fn output_key(prefix: &str, at: DateTime<Utc>, base: &str) -> String {
    format!("{prefix}/{}/{base}.json", format_timestamp(at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn strips_directory_and_extension() {
        assert_eq!(base_filename("folder/invoice.pdf"), "invoice");
        assert_eq!(base_filename("invoice.pdf"), "invoice");
        assert_eq!(base_filename("a/b/c/scan.final.png"), "scan.final");
        assert_eq!(base_filename("docs/README"), "README");
    }

    #[test]
    fn leading_dots_are_not_extensions() {
        assert_eq!(base_filename("folder/.env"), ".env");
        assert_eq!(base_filename("..hidden"), "..hidden");
        assert_eq!(base_filename(".hidden.pdf"), ".hidden");
    }

    #[test]
    fn trailing_slash_yields_empty_base() {
        assert_eq!(base_filename("folder/"), "");
    }

    #[test]
    fn builds_output_key() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap()
            + chrono::Duration::microseconds(123_456);
        assert_eq!(format_timestamp(at), "2024-03-01T12:30:45.123456");
        assert_eq!(
            output_key("results", at, "invoice"),
            "results/2024-03-01T12:30:45.123456/invoice.json"
        );
    }

    #[test]
    fn timestamp_omits_zero_fraction() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(at), "2024-01-02T03:04:05");
        // Sub-microsecond remainders do not count.
        let at = at + chrono::Duration::nanoseconds(999);
        assert_eq!(format_timestamp(at), "2024-01-02T03:04:05");
        let at = at + chrono::Duration::nanoseconds(1);
        assert_eq!(format_timestamp(at), "2024-01-02T03:04:05.000001");
    }

    #[test]
    fn builds_locator() {
        assert_eq!(locator("bucket", "a/b.pdf"), "s3://bucket/a/b.pdf");
    }
}
