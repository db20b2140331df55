//! Schema Emitter: renders the draft as a pantherlog custom-log schema file.

use std::path::Path;

use serde::Serialize;

use crate::errors::WriteError;
use crate::inference::{FieldDraft, FieldType, SchemaDraft};

/// Header comment written at the top of both output files.
pub const GENERATED_HEADER: &str = "# Generated by ezpantherlog\n";

/// The schema document, shaped after the pantherlog schema language.
#[derive(Debug, Serialize)]
pub struct SchemaDoc {
    pub schema: String,
    pub description: String,
    pub version: u32,
    pub fields: Vec<SchemaField>,
}

#[derive(Debug, Serialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(rename = "type")]
    pub type_name: &'static str,
    #[serde(rename = "timeFormat", skip_serializing_if = "Option::is_none")]
    pub time_format: Option<String>,
    #[serde(rename = "isEventTime", skip_serializing_if = "is_false")]
    pub is_event_time: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub indicators: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<SchemaField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<Box<SchemaElement>>,
}

/// Array element descriptor; like a field but nameless.
#[derive(Debug, Serialize)]
pub struct SchemaElement {
    #[serde(rename = "type")]
    pub type_name: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<SchemaField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<Box<SchemaElement>>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl SchemaDoc {
    pub fn build(schema_name: &str, draft: &SchemaDraft) -> Self {
        let fields = draft
            .fields
            .iter()
            .map(|(name, field)| to_schema_field(name, field, draft.records))
            .collect();
        Self {
            schema: schema_name.to_string(),
            description: "Generated by ezpantherlog".to_string(),
            version: 0,
            fields,
        }
    }
}

fn type_name(ty: &FieldType) -> &'static str {
    match ty {
        FieldType::String | FieldType::Unknown => "string",
        FieldType::Bigint => "bigint",
        FieldType::Float => "float",
        FieldType::Boolean => "boolean",
        FieldType::Timestamp { .. } => "timestamp",
        FieldType::Object { .. } => "object",
        FieldType::Array { .. } => "array",
        FieldType::Json => "json",
    }
}

/// `population` is how many records (or parent objects) the field's siblings
/// were drawn from; requiredness is relative to it.
fn to_schema_field(name: &str, field: &FieldDraft, population: u64) -> SchemaField {
    let (time_format, nested, element) = match &field.ty {
        FieldType::Timestamp { format } => (format.clone(), Vec::new(), None),
        FieldType::Object {
            fields,
            seen_objects,
        } => (
            None,
            fields
                .iter()
                .map(|(n, f)| to_schema_field(n, f, *seen_objects))
                .collect(),
            None,
        ),
        FieldType::Array { element } => (None, Vec::new(), Some(Box::new(to_element(element)))),
        _ => (None, Vec::new(), None),
    };

    SchemaField {
        name: name.to_string(),
        required: population > 0 && field.non_null == population,
        type_name: type_name(&field.ty),
        time_format,
        is_event_time: field.is_event_time,
        indicators: field.indicators.clone(),
        fields: nested,
        element,
    }
}

fn to_element(ty: &FieldType) -> SchemaElement {
    match ty {
        FieldType::Object {
            fields,
            seen_objects,
        } => SchemaElement {
            type_name: "object",
            fields: fields
                .iter()
                .map(|(n, f)| to_schema_field(n, f, *seen_objects))
                .collect(),
            element: None,
        },
        FieldType::Array { element } => SchemaElement {
            type_name: "array",
            fields: Vec::new(),
            element: Some(Box::new(to_element(element))),
        },
        other => SchemaElement {
            type_name: type_name(other),
            fields: Vec::new(),
            element: None,
        },
    }
}

/// Render the document and write it to disk.
pub fn write_schema_file(path: &Path, doc: &SchemaDoc) -> Result<(), WriteError> {
    let body = serde_yaml::to_string(doc).map_err(|source| WriteError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, format!("{GENERATED_HEADER}{body}")).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{self, DraftOptions};
    use serde_json::{Map, Value, json};

    fn draft_for(records: &[Value], event_time_field: &str) -> SchemaDraft {
        let records: Vec<Map<String, Value>> = records
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect();
        inference::infer_records(event_time_field, records.iter(), &DraftOptions::default())
            .unwrap()
    }

    #[test]
    fn vpn_fixture_renders_expected_document() {
        let draft = draft_for(
            &[json!({"syslogTimestamp": "2021-01-01T00:00:00Z", "appName": "vpn1"})],
            "syslogTimestamp",
        );
        let doc = SchemaDoc::build("Custom.VPN", &draft);
        let yaml = serde_yaml::to_string(&doc).unwrap();

        assert!(yaml.contains("schema: Custom.VPN"));
        assert!(yaml.contains("name: syslogTimestamp"));
        assert!(yaml.contains("type: timestamp"));
        assert!(yaml.contains("timeFormat: rfc3339"));
        assert!(yaml.contains("isEventTime: true"));
        assert!(yaml.contains("name: appName"));
        assert!(yaml.contains("type: string"));
    }

    #[test]
    fn optional_keys_are_omitted() {
        let draft = draft_for(&[json!({"ts": 1, "app": "x"})], "ts");
        let doc = SchemaDoc::build("Custom.X", &draft);
        let yaml = serde_yaml::to_string(&doc).unwrap();

        // non-event-time string field carries no timeFormat/isEventTime/indicators
        assert_eq!(yaml.matches("isEventTime").count(), 1);
        assert_eq!(yaml.matches("timeFormat").count(), 1);
        assert!(!yaml.contains("indicators"));
        assert!(!yaml.contains("element"));
    }

    #[test]
    fn nested_objects_and_arrays_render_structurally() {
        let draft = draft_for(
            &[json!({
                "ts": 1,
                "ctx": {"user": "alice", "attempts": 3},
                "tags": ["a"],
                "matrix": [[1, 2]]
            })],
            "ts",
        );
        let doc = SchemaDoc::build("Custom.X", &draft);

        let ctx = doc.fields.iter().find(|f| f.name == "ctx").unwrap();
        assert_eq!(ctx.type_name, "object");
        assert_eq!(ctx.fields.len(), 2);
        assert!(ctx.fields.iter().all(|f| f.required));

        let tags = doc.fields.iter().find(|f| f.name == "tags").unwrap();
        assert_eq!(tags.type_name, "array");
        assert_eq!(tags.element.as_ref().unwrap().type_name, "string");

        let matrix = doc.fields.iter().find(|f| f.name == "matrix").unwrap();
        let outer = matrix.element.as_ref().unwrap();
        assert_eq!(outer.type_name, "array");
        assert_eq!(outer.element.as_ref().unwrap().type_name, "bigint");
    }

    #[test]
    fn write_failure_surfaces_as_write_error() {
        let draft = draft_for(&[json!({"ts": 1})], "ts");
        let doc = SchemaDoc::build("Custom.X", &draft);
        let err = write_schema_file(Path::new("/no/such/dir/schema.yml"), &doc).unwrap_err();
        assert!(matches!(err, WriteError::Io { .. }));
    }

    #[test]
    fn written_file_starts_with_generated_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.yml");
        let draft = draft_for(&[json!({"ts": 1})], "ts");
        write_schema_file(&path, &SchemaDoc::build("Custom.X", &draft)).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with(GENERATED_HEADER));
        assert!(contents.contains("schema: Custom.X"));
    }
}
