/// Split a page into its table rows, in document order.
///
/// Each slice runs from the `<tr` tag to its closing `</tr>`. Rows with the
/// closing tag omitted end at the next row or at `</table>`.
pub fn table_rows(html: &str) -> Vec<&str> {
    // ASCII lowercasing keeps byte offsets identical to `html`
    let lower = html.to_ascii_lowercase();
    let mut rows = Vec::new();
    let mut pos = 0;

    while let Some(start) = find_row_start(&lower, pos) {
        let body = start + "<tr".len();
        let close = lower[body..].find("</tr>").map(|i| body + i + "</tr>".len());
        let next_row = find_row_start(&lower, body);
        let table_end = lower[body..].find("</table>").map(|i| body + i);

        let end = [close, next_row, table_end]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(html.len());

        rows.push(&html[start..end]);
        pos = end;
    }

    rows
}

fn find_row_start(lower: &str, from: usize) -> Option<usize> {
    let bytes = lower.as_bytes();
    let mut pos = from;
    while let Some(i) = lower[pos..].find("<tr") {
        let at = pos + i;
        match bytes.get(at + 3).copied() {
            Some(b'>' | b' ' | b'\t' | b'\n' | b'\r' | b'/') => return Some(at),
            None => return None,
            // <track>, <trace-...>
            _ => pos = at + 3,
        }
    }
    None
}
