use std::fmt::Write;

use crate::streaks::record::DATE_FORMAT;
use crate::streaks::CompanyRecord;

const PAGE_TITLE: &str = "Breakout Board Streaks";

/// Longest streak first. Stable, so ties keep store order.
pub fn sort_by_streak(records: &[CompanyRecord]) -> Vec<&CompanyRecord> {
    let mut sorted: Vec<&CompanyRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.count.cmp(&a.count));
    sorted
}

/// Names come off the board still entity-encoded.
pub fn decode_entities(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn escape_tags(s: &str) -> String {
    s.replace('<', "&lt;").replace('>', "&gt;")
}

pub fn html_table(records: &[CompanyRecord]) -> String {
    let mut table = String::from("<table>");
    table.push_str("<thead id=\"thead\">");
    table.push_str(
        "<tr><th>Row</th><th>Company</th><th>Price</th><th>Number of Days Up</th><th>Last Date / Time Up</th></tr>",
    );
    table.push_str("</thead><tbody>");

    for (i, r) in sort_by_streak(records).into_iter().enumerate() {
        let _ = write!(
            table,
            "<tr><td>{}</td><td class=\"company\">{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            i + 1,
            escape_tags(&decode_entities(&r.company)),
            escape_tags(&r.price),
            r.count,
            r.date.format(DATE_FORMAT),
        );
    }

    table.push_str("</tbody></table>");
    table
}

pub fn html_page(records: &[CompanyRecord]) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en-US">
    <head>
        <meta charset="UTF-8">
        <title>{title}</title>
        <style>
            body {{ font-family: sans-serif; margin: 2em; }}
            table {{ border-collapse: collapse; }}
            th, td {{ padding: 0.3em 0.8em; border-bottom: 1px solid #ddd; text-align: left; }}
            td.company {{ font-weight: bold; }}
        </style>
    </head>
    <body>
        <h1>{title}</h1>
        {table}
    </body>
</html>
"#,
        title = PAGE_TITLE,
        table = html_table(records),
    )
}

/// Terminal table for `show`.
pub fn text_table(records: &[CompanyRecord], limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4} | {:<24} | {:>10} | {:>5} | {:<19}",
        "#", "Company", "Price", "Days", "Last seen"
    );
    let _ = writeln!(out, "{}", "-".repeat(74));

    for (i, r) in sort_by_streak(records).into_iter().take(limit).enumerate() {
        let price = if r.price.is_empty() { "-" } else { r.price.as_str() };
        let _ = writeln!(
            out,
            "{:>4} | {:<24} | {:>10} | {:>5} | {:<19}",
            i + 1,
            truncate(&decode_entities(&r.company), 24),
            truncate(price, 10),
            r.count,
            r.date.format(DATE_FORMAT).to_string(),
        );
    }

    let _ = write!(out, "\n{} of {} companies", limit.min(records.len()), records.len());
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max - 3).collect();
        format!("{}...", truncated)
    }
}
