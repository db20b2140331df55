//! Sample Reader: one JSON log record per line.

use std::path::Path;

use serde_json::{Map, Value};

use crate::errors::ReadError;

/// One parsed record from the log sample. Line numbers are 1-based.
#[derive(Clone, Debug)]
pub struct Record {
    pub line_no: usize,
    pub raw: String,
    pub fields: Map<String, Value>,
}

/// Read a newline-delimited JSON sample into ordered records.
///
/// Blank lines are skipped. Every non-blank line must be a JSON object; the
/// first failing line is reported by number. A quick brace check on the first
/// and last non-blank lines rejects pretty-printed samples up front with a
/// friendlier message than the per-line parse error would give.
pub fn read_log_sample(path: &Path) -> Result<Vec<Record>, ReadError> {
    let source = std::fs::read_to_string(path).map_err(|source| ReadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let lines: Vec<(usize, &str)> = source
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .collect();

    // A pretty-printed sample opens with a bare `{` and closes with a bare
    // `}`; checking the outer lines catches that before the per-line parse
    // produces a far more confusing error.
    if let (Some((_, first)), Some((_, last))) = (lines.first(), lines.last()) {
        if !first.ends_with('}') || !last.starts_with('{') {
            return Err(ReadError::PrettyPrinted);
        }
    }

    let mut records = Vec::new();
    for (line_no, line) in lines {
        let value: Value =
            serde_json::from_str(line).map_err(|source| ReadError::Json { line: line_no, source })?;
        match value {
            Value::Object(fields) => records.push(Record {
                line_no,
                raw: line.to_string(),
                fields,
            }),
            _ => return Err(ReadError::NotAnObject { line: line_no }),
        }
    }

    if records.is_empty() {
        return Err(ReadError::EmptySample {
            path: path.to_path_buf(),
        });
    }
    Ok(records)
}
