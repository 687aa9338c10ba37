use indexmap::IndexMap;

/// One result row keyed by column name.
///
/// Key order is column order. Values are the strings the query engine
/// returned, uncoerced; `None` represents SQL NULL.
pub type Record = IndexMap<String, Option<String>>;

/// Render records as a plain-text table.
///
/// Columns are the union of all record keys in first-seen order, so rows
/// that are shorter than the header still line up.
pub fn render_table(records: &[Record]) -> String {
    let mut columns: Vec<&str> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    if columns.is_empty() {
        return "(empty result set)".to_string();
    }

    let cell = |record: &Record, col: &str| -> String {
        match record.get(col) {
            Some(Some(v)) => v.clone(),
            Some(None) => "NULL".to_string(),
            None => String::new(),
        }
    };

    // Compute column widths (minimum = header length).
    let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
    for record in records {
        for (i, col) in columns.iter().enumerate() {
            widths[i] = widths[i].max(cell(record, col).len());
        }
    }

    let mut out = String::new();
    let line = |values: Vec<String>, sep: &str| -> String {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{:<width$}", v, width = widths[i]))
            .collect::<Vec<_>>()
            .join(sep)
            .trim_end()
            .to_string()
    };

    out.push_str(&line(columns.iter().map(|c| c.to_string()).collect(), " | "));
    out.push('\n');
    out.push_str(&line(widths.iter().map(|w| "-".repeat(*w)).collect(), "-+-"));
    out.push('\n');
    for record in records {
        out.push_str(&line(columns.iter().map(|c| cell(record, c)).collect(), " | "));
        out.push('\n');
    }
    out.push_str(&format!("({} rows)", records.len()));
    out
}
