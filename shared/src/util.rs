use chrono::{DateTime, NaiveDate};

/// Wire and storage date format (`yyyy-MM-dd`)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a calendar date as `yyyy-MM-dd`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a calendar date.
///
/// Accepts `yyyy-MM-dd`, or a full RFC 3339 timestamp whose calendar date in
/// its own offset is kept (older drafts stored timestamps rather than dates).
/// The host time zone never affects the result.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.date_naive())
    })
}

/// Serde adapter for `Option<NaiveDate>` stored as `yyyy-MM-dd`.
///
/// Empty strings and `null` read back as `None`.
pub mod flexible_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_some(&super::format_date(*date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => super::parse_date(value)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid date: {value}"))),
        }
    }
}
