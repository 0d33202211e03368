use time::format_description::FormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

const EXPORT_STAMP: &[FormatItem<'static>] =
    format_description!("[year][month][day]_[hour][minute][second]");
const TRANSCRIPT_STAMP: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const PROMPT_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const CLOCK: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second]");

/// Current time in the local offset, falling back to UTC when the offset
/// cannot be determined.
pub fn local_now() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    match UtcOffset::current_local_offset() {
        Ok(offset) => now.to_offset(offset),
        Err(_) => now,
    }
}

/// `YYYYMMDD_HHMMSS`, used in export documents and their file names.
pub fn export_stamp(at: OffsetDateTime) -> String {
    at.format(EXPORT_STAMP).unwrap_or_default()
}

/// `YYYY-MM-DD HH:MM:SS`
pub fn transcript_stamp(at: OffsetDateTime) -> String {
    at.format(TRANSCRIPT_STAMP).unwrap_or_default()
}

/// `YYYY-MM-DD`
pub fn prompt_date(at: OffsetDateTime) -> String {
    at.format(PROMPT_DATE).unwrap_or_default()
}

/// `HH:MM:SS`
pub fn clock(at: OffsetDateTime) -> String {
    at.format(CLOCK).unwrap_or_default()
}

pub fn rfc3339(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn formats_each_stamp() {
        let at = datetime!(2025-03-07 09:04:05 UTC);
        assert_eq!(export_stamp(at), "20250307_090405");
        assert_eq!(transcript_stamp(at), "2025-03-07 09:04:05");
        assert_eq!(prompt_date(at), "2025-03-07");
        assert_eq!(clock(at), "09:04:05");
        assert_eq!(rfc3339(at), "2025-03-07T09:04:05Z");
    }
}
