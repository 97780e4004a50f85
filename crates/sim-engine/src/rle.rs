//! Run-length encoded patterns.
//!
//! ```text
//! #C optional comment lines
//! x = 3, y = 3, rule = B3/S23
//! bo$2bo$3o!
//! ```
//!
//! State characters: `b`/`.` dead, `o` state 1, `A`..`X` states 1..24 and
//! `p`..`y` prefixes for states above 24.

use crate::error::EngineError;
use shared_types::Cell;

const MAX_LINE: usize = 70;

/// Result of parsing a complete RLE document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRle {
    /// Rule from the header, if present.
    pub rule: Option<String>,
    /// Non-dead cells relative to the top-left corner.
    pub cells: Vec<Cell>,
}

/// Parse an RLE document with optional header and comment lines.
pub fn parse(text: &str) -> Result<ParsedRle, EngineError> {
    if text.trim().is_empty() {
        return Err(EngineError::InvalidPattern("Cannot find RLE".to_string()));
    }
    let mut rule = None;
    let mut body = String::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if body.is_empty() && line.starts_with('x') && line.contains('=') {
            rule = parse_header(line)?;
            continue;
        }
        body.push_str(line);
        if line.contains('!') {
            break;
        }
    }
    let cells = parse_body(&body)?;
    Ok(ParsedRle { rule, cells })
}

fn parse_header(line: &str) -> Result<Option<String>, EngineError> {
    let mut rule = None;
    for field in line.split(',') {
        let Some((key, value)) = field.split_once('=') else {
            return Err(EngineError::InvalidPattern(format!(
                "Invalid RLE header: {line}"
            )));
        };
        if key.trim().eq_ignore_ascii_case("rule") {
            rule = Some(value.trim().to_string());
        }
    }
    Ok(rule)
}

/// Parse an RLE body (no header) into its non-dead cells.
///
/// Parsing stops at `!` or at the end of input.
pub fn parse_body(body: &str) -> Result<Vec<Cell>, EngineError> {
    let mut cells = Vec::new();
    let (mut x, mut y) = (0i64, 0i64);
    let mut count: Option<i64> = None;
    let mut prefix: Option<u8> = None;

    for c in body.chars() {
        if c.is_whitespace() {
            continue;
        }
        if let Some(d) = c.to_digit(10) {
            count = Some(count.unwrap_or(0) * 10 + i64::from(d));
            continue;
        }
        let run = count.take().unwrap_or(1);
        let state = match c {
            '!' => break,
            '$' => {
                y += run;
                x = 0;
                continue;
            }
            'b' | '.' => 0,
            'o' => 1,
            'p'..='y' => {
                prefix = Some(c as u8 - b'p' + 1);
                count = if run == 1 { None } else { Some(run) };
                continue;
            }
            'A'..='X' => {
                let base = u16::from(prefix.take().unwrap_or(0)) * 24;
                let value = base + u16::from(c as u8 - b'A' + 1);
                u8::try_from(value).map_err(|_| {
                    EngineError::InvalidPattern(format!("Invalid RLE state: {value}"))
                })?
            }
            other => {
                return Err(EngineError::InvalidPattern(format!(
                    "Invalid RLE character: {other}"
                )))
            }
        };
        if state != 0 {
            cells.extend((0..run).map(|i| Cell::new(x + i, y, state)));
        }
        x += run;
    }
    Ok(cells)
}

/// Write cells as an RLE document with header.
///
/// Cells are written relative to their bounding box.
pub fn write(cells: &[Cell], rule: &str, states: u16) -> String {
    let live: Vec<Cell> = cells.iter().copied().filter(|c| c.state != 0).collect();
    let (min_x, min_y, max_x, max_y) = bounds(&live);
    let width = if live.is_empty() { 0 } else { max_x - min_x + 1 };
    let height = if live.is_empty() { 0 } else { max_y - min_y + 1 };

    let mut sorted = live;
    sorted.sort_by_key(|c| (c.y, c.x));

    let mut tokens: Vec<String> = Vec::new();
    let mut row = min_y;
    let mut col = min_x;
    let mut pending: Option<(u8, i64)> = None;

    let flush = |tokens: &mut Vec<String>, pending: &mut Option<(u8, i64)>| {
        if let Some((state, n)) = pending.take() {
            tokens.push(run_token(n, &state_chars(state, states)));
        }
    };

    for cell in &sorted {
        if cell.y != row {
            flush(&mut tokens, &mut pending);
            tokens.push(run_token(cell.y - row, "$"));
            row = cell.y;
            col = min_x;
        }
        if cell.x > col {
            match pending {
                Some((0, ref mut n)) => *n += cell.x - col,
                _ => {
                    flush(&mut tokens, &mut pending);
                    pending = Some((0, cell.x - col));
                }
            }
        }
        match pending {
            Some((s, ref mut n)) if s == cell.state => *n += 1,
            _ => {
                flush(&mut tokens, &mut pending);
                pending = Some((cell.state, 1));
            }
        }
        col = cell.x + 1;
    }
    flush(&mut tokens, &mut pending);
    tokens.push("!".to_string());

    let mut out = format!("x = {width}, y = {height}, rule = {rule}\n");
    let mut line_len = 0;
    for token in tokens {
        if line_len + token.len() > MAX_LINE {
            out.push('\n');
            line_len = 0;
        }
        line_len += token.len();
        out.push_str(&token);
    }
    out.push('\n');
    out
}

fn bounds(cells: &[Cell]) -> (i64, i64, i64, i64) {
    cells.iter().fold(
        (i64::MAX, i64::MAX, i64::MIN, i64::MIN),
        |(x0, y0, x1, y1), c| (x0.min(c.x), y0.min(c.y), x1.max(c.x), y1.max(c.y)),
    )
}

fn run_token(n: i64, chars: &str) -> String {
    if n == 1 {
        chars.to_string()
    } else {
        format!("{n}{chars}")
    }
}

fn state_chars(state: u8, states: u16) -> String {
    if states <= 2 {
        return if state == 0 { "b" } else { "o" }.to_string();
    }
    if state == 0 {
        return ".".to_string();
    }
    let index = state - 1;
    let letter = char::from(b'A' + index % 24);
    match index / 24 {
        0 => letter.to_string(),
        p => format!("{}{}", char::from(b'p' + p - 1), letter),
    }
}
