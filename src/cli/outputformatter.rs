//! ASCII rendering of backend lists and objects for the terminal portal.

use serde_json::Value;
use terminal_size::{terminal_size, Width};

const MAX_CELL_WIDTH: usize = 40;

/// Render a list of objects as an ASCII table. Columns are the union of keys
/// across rows, sorted for a stable layout. Returns false when there is
/// nothing tabular to print (caller falls back to JSON).
pub fn print_list(rows: &[Value]) -> bool {
    if rows.is_empty() {
        println!("(none)");
        return true;
    }
    let mut cols: Vec<String> = Vec::new();
    for row in rows {
        let Value::Object(map) = row else { return false };
        for k in map.keys() {
            if !cols.contains(k) {
                cols.push(k.clone());
            }
        }
    }
    if cols.is_empty() {
        return false;
    }
    cols.sort();

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| cols.iter().map(|c| cell_text(row.get(c.as_str()))).collect())
        .collect();

    let cap = cell_cap(cols.len());
    let mut widths: Vec<usize> = cols.iter().map(|c| c.chars().count().min(cap)).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            let w = cell.chars().count().min(cap);
            if w > widths[i] {
                widths[i] = w;
            }
        }
    }

    let sep = separator(&widths);
    println!("{}", sep);
    println!("{}", render_row(&cols, &widths));
    println!("{}", sep);
    for row in &cells {
        println!("{}", render_row(row, &widths));
    }
    println!("{}", sep);
    println!("rows: {}", rows.len());
    true
}

/// Render a single object as a key/value listing; nested values stay JSON.
pub fn print_object(v: &Value) {
    match v {
        Value::Object(map) => {
            let pad = map.keys().map(|k| k.chars().count()).max().unwrap_or(0);
            for (k, val) in map {
                println!("  {:pad$}  {}", k, cell_text(Some(val)), pad = pad);
            }
        }
        other => println!("{}", serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string())),
    }
}

fn cell_text(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        // keep nested structures compact
        Some(other) => other.to_string(),
    }
}

// Shrink the per-column cap when many columns must share a narrow terminal.
fn cell_cap(ncols: usize) -> usize {
    let total = match terminal_size() {
        Some((Width(w), _)) => w as usize,
        None => 120,
    };
    let overhead = 3 * ncols + 1;
    let available = total.saturating_sub(overhead) / ncols.max(1);
    available.clamp(8, MAX_CELL_WIDTH)
}

fn separator(widths: &[usize]) -> String {
    let mut s = String::from("+");
    for w in widths {
        s.push_str(&"-".repeat(w + 2));
        s.push('+');
    }
    s
}

fn render_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::from("|");
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let text = truncate(cell, *w);
        let pad = w.saturating_sub(text.chars().count());
        s.push(' ');
        if numeric_like(cell) {
            s.push_str(&" ".repeat(pad));
            s.push_str(&text);
        } else {
            s.push_str(&text);
            s.push_str(&" ".repeat(pad));
        }
        s.push_str(" |");
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= 1 {
        return "…".to_string();
    }
    s.chars().take(max - 1).collect::<String>() + "…"
}

fn numeric_like(s: &str) -> bool {
    let st = s.trim();
    !st.is_empty() && st.chars().all(|c| c.is_ascii_digit() || ".-+".contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cell_text_flattens_scalars_and_keeps_json_for_nesting() {
        assert_eq!(cell_text(Some(&json!("x"))), "x");
        assert_eq!(cell_text(Some(&json!(12))), "12");
        assert_eq!(cell_text(Some(&json!(null))), "");
        assert_eq!(cell_text(None), "");
        assert_eq!(cell_text(Some(&json!({"a":1}))), r#"{"a":1}"#);
    }

    #[test]
    fn truncate_appends_ellipsis() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("0123456789", 5), "0123…");
        assert_eq!(truncate("xy", 1), "…");
    }

    #[test]
    fn numeric_alignment_detection() {
        assert!(numeric_like("42"));
        assert!(numeric_like("-3.5"));
        assert!(!numeric_like("O+"));
        assert!(!numeric_like(""));
    }

    #[test]
    fn non_object_rows_are_not_tabular() {
        assert!(!print_list(&[json!("scalar")]));
    }
}
