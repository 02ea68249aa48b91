pub mod extract;
pub mod rows;

use chrono::NaiveDateTime;

use crate::streaks::CompanyRecord;
use extract::BoardRowParser;

/// Two-pass pipeline: page markup → table rows → observed companies.
pub fn process_page(html: &str, now: NaiveDateTime, initial_count: u32) -> Vec<CompanyRecord> {
    let rows = rows::table_rows(html);
    extract::extract(rows, &BoardRowParser, now, initial_count)
}
