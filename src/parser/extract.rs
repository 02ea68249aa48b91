use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use tracing::debug;

use crate::streaks::CompanyRecord;

static COMPANY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"title=['"]?(.*?)['"]?\s+href"#).unwrap());
static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)Last['"]?>(.*?)</span>"#).unwrap());

/// What a single board row yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFields {
    pub company: String,
    /// Empty when the row carries no price.
    pub price: String,
}

/// Pulls the company and price out of one row's markup.
pub trait RowParser {
    fn parse_row(&self, row: &str) -> Option<RowFields>;
}

/// Board rows link each company with its name in the `title` attribute and
/// show the last trade in a span whose id ends in `Last`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoardRowParser;

impl RowParser for BoardRowParser {
    fn parse_row(&self, row: &str) -> Option<RowFields> {
        let row = row.replace('"', "");

        let company = COMPANY_RE
            .captures(&row)
            .map(|c| c[1].trim().to_string())
            .filter(|c| !c.is_empty())?;
        let price = PRICE_RE
            .captures(&row)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default();

        Some(RowFields { company, price })
    }
}

/// Turn the page's rows into this cycle's observations.
///
/// The first row is the table header. Rows without a company are skipped.
/// A company listed twice keeps its first position and its last price.
pub fn extract<'a, P, I>(rows: I, parser: &P, now: NaiveDateTime, initial_count: u32) -> Vec<CompanyRecord>
where
    P: RowParser + ?Sized,
    I: IntoIterator<Item = &'a str>,
{
    let mut records: Vec<CompanyRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0usize;

    for row in rows.into_iter().skip(1) {
        let Some(fields) = parser.parse_row(row) else {
            skipped += 1;
            continue;
        };
        match index.get(&fields.company).copied() {
            Some(i) => records[i].price = fields.price,
            None => {
                index.insert(fields.company.clone(), records.len());
                records.push(CompanyRecord::new(fields.company, fields.price, now, initial_count));
            }
        }
    }

    debug!("Extracted {} companies, skipped {} rows", records.len(), skipped);
    records
}
