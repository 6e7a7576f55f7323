//! Markdown table row splitting.

/// Split a pipe-delimited markdown row into cells.
///
/// Returns `None` for lines that are not table rows. `\|` is an escaped pipe
/// and stays inside the cell; any other backslash is kept verbatim. The result
/// is padded with one empty cell on each side so that 1-based column numbers
/// index it the same way `line.split('|')` would.
pub fn parse_row(line: &str) -> Option<Vec<String>> {
    let text = line.trim();
    if text.len() < 2 || !text.starts_with('|') || !text.ends_with('|') {
        return None;
    }

    let inner = &text[1..text.len() - 1];
    let mut cells = vec![String::new()];
    let mut buf = String::new();
    let mut escaped = false;

    for ch in inner.chars() {
        if escaped {
            if ch != '|' {
                buf.push('\\');
            }
            buf.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '|' => cells.push(std::mem::take(&mut buf).trim().to_string()),
            _ => buf.push(ch),
        }
    }
    if escaped {
        buf.push('\\');
    }
    cells.push(buf.trim().to_string());
    cells.push(String::new());
    Some(cells)
}

/// Fetch a 1-based column, trimmed. Out-of-range or zero yields `""`.
pub fn field(cells: &[String], col_no: usize) -> &str {
    col_no
        .checked_sub(1)
        .and_then(|idx| cells.get(idx))
        .map_or("", |cell| cell.trim())
}
