use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Current UTC time as an RFC-3339 string.
///
/// Falls back to a unix-seconds rendering if formatting ever fails, so
/// callers never have to handle a timestamp error.
pub fn now_iso8601() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

/// Current unix time in whole seconds.
pub fn now_unix_secs() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}
