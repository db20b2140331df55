//! Test-Case Emitter: pantherlog test documents for a prefix of the sample.

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::WriteError;
use crate::inference::{FieldType, SchemaDraft};
use crate::sample::Record;
use crate::schema::GENERATED_HEADER;

/// How many sample records get a test case.
pub const MAX_TEST_CASES: usize = 5;

/// One pantherlog test: raw input line paired with the values a conforming
/// parse should extract.
#[derive(Debug, Serialize)]
pub struct TestDoc {
    pub name: String,
    #[serde(rename = "logType")]
    pub log_type: String,
    pub input: String,
    pub result: String,
}

pub fn build_test_docs(
    schema_name: &str,
    records: &[Record],
    draft: &SchemaDraft,
) -> Result<Vec<TestDoc>, serde_json::Error> {
    records
        .iter()
        .take(MAX_TEST_CASES)
        .enumerate()
        .map(|(idx, record)| {
            Ok(TestDoc {
                name: format!("{schema_name} sample {}", idx + 1),
                log_type: schema_name.to_string(),
                input: record.raw.clone(),
                result: expected_result(record, draft)?,
            })
        })
        .collect()
}

/// The record's fields, coerced per the draft. Forced-json fields come back
/// out as raw JSON strings; everything else passes through untouched and the
/// external binary is the judge of the rest.
fn expected_result(record: &Record, draft: &SchemaDraft) -> Result<String, serde_json::Error> {
    let mut out = Map::new();
    for (name, value) in &record.fields {
        let coerced = match draft.fields.get(name).map(|f| &f.ty) {
            Some(FieldType::Json) => Value::String(value.to_string()),
            _ => value.clone(),
        };
        out.insert(name.clone(), coerced);
    }
    serde_json::to_string_pretty(&Value::Object(out))
}

/// Render the documents as a multi-document YAML stream and write them.
pub fn write_test_file(
    path: &Path,
    schema_name: &str,
    records: &[Record],
    draft: &SchemaDraft,
) -> Result<(), WriteError> {
    let docs =
        build_test_docs(schema_name, records, draft).map_err(|source| WriteError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    let mut body = String::from(GENERATED_HEADER);
    for doc in &docs {
        let rendered = serde_yaml::to_string(doc).map_err(|source| WriteError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        body.push_str("---\n");
        body.push_str(&rendered);
    }
    std::fs::write(path, body).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })
}
