use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Timestamp layout used in the store and on the display page.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One company on the board and how long it has stayed there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub company: String,
    /// Last cycle this company was seen, host local clock.
    #[serde(with = "timestamp")]
    pub date: NaiveDateTime,
    /// Cycles seen since the company (re)appeared.
    pub count: u32,
    #[serde(default, deserialize_with = "price_text")]
    pub price: String,
}

impl CompanyRecord {
    pub fn new(company: impl Into<String>, price: impl Into<String>, date: NaiveDateTime, count: u32) -> Self {
        Self {
            company: company.into(),
            date,
            count,
            price: price.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.company.trim().is_empty()
    }
}

/// Parse a stored date. Date-only values read as midnight.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, DATE_FORMAT).ok().or_else(|| {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
}

mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::{parse_date, DATE_FORMAT};

    pub fn serialize<S: Serializer>(date: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse_date(&raw).ok_or_else(|| de::Error::custom(format!("unrecognized date `{}`", raw)))
    }
}

// Older stores hold prices as numbers or null
fn price_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(serde::de::Error::custom(format!(
            "price must be a string or number, got {}",
            other
        ))),
    }
}
