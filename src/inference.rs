//! Type Inferencer: merge-based field typing over the sample records.
//!
//! Each record contributes one candidate type per field; candidates are
//! merged with a join that is associative, commutative, and idempotent, so
//! record order never changes the outcome. Incompatible scalar pairs widen
//! to string. Presence and non-null counts ride along for requiredness.

pub mod time;

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde_json::{Map, Value};

use crate::errors::InferenceError;

// ------------------------------- Policy ---------------------------------- //

/// Cap on retained event-time sample values for format guessing.
const MAX_TIME_SAMPLES: usize = 32;

// ------------------------------- Types ----------------------------------- //

/// The closed type set of the pantherlog schema language.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldType {
    String,
    Bigint,
    Float,
    Boolean,
    Timestamp { format: Option<String> },
    Object { fields: FieldMap, seen_objects: u64 },
    Array { element: Box<FieldType> },
    /// Forced raw-JSON passthrough (`--json-field`).
    Json,
    /// Every observed value was null; emitted as string.
    Unknown,
}

/// Ordered field map, first-seen order. Order flows into the schema file.
pub type FieldMap = IndexMap<String, FieldDraft>;

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDraft {
    pub ty: FieldType,
    /// Records (or parent objects) in which the field appeared at all.
    pub seen: u64,
    /// Records in which it appeared with a non-null value.
    pub non_null: u64,
    pub indicators: Vec<String>,
    pub is_event_time: bool,
}

impl FieldDraft {
    fn observed(ty: FieldType, non_null: bool) -> Self {
        Self {
            ty,
            seen: 1,
            non_null: if non_null { 1 } else { 0 },
            indicators: Vec::new(),
            is_event_time: false,
        }
    }
}

/// The finished draft: consumed read-only by the emitters.
#[derive(Clone, Debug)]
pub struct SchemaDraft {
    pub fields: FieldMap,
    pub records: u64,
}

impl SchemaDraft {
    /// A field is required when every record carried it with a non-null value.
    pub fn is_required(&self, field: &FieldDraft) -> bool {
        self.records > 0 && field.non_null == self.records
    }
}

/// Draft post-pass inputs gathered from the command line.
#[derive(Clone, Debug, Default)]
pub struct DraftOptions {
    pub time_format: Option<String>,
    pub json_fields: Vec<String>,
    pub indicator_fields: Vec<IndicatorField>,
}

#[derive(Clone, Debug)]
pub struct IndicatorField {
    pub indicator: String,
    pub field: String,
}

// ------------------------------ Observe ---------------------------------- //

/// Candidate type of a single JSON value.
pub fn observe_value(value: &Value) -> FieldType {
    match value {
        Value::Null => FieldType::Unknown,
        Value::Bool(_) => FieldType::Boolean,
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                FieldType::Bigint
            } else if n.as_f64().is_some_and(|f| f.fract() == 0.0) {
                // e.g. `2.0`: no fractional part, still an integer shape
                FieldType::Bigint
            } else {
                FieldType::Float
            }
        }
        Value::String(_) => FieldType::String,
        Value::Array(items) => {
            let element = items
                .iter()
                .map(observe_value)
                .fold(FieldType::Unknown, merge);
            FieldType::Array {
                element: Box::new(element),
            }
        }
        Value::Object(map) => FieldType::Object {
            fields: observe_object(map),
            seen_objects: 1,
        },
    }
}

fn observe_object(map: &Map<String, Value>) -> FieldMap {
    let mut fields = FieldMap::new();
    for (name, value) in map {
        fields.insert(
            name.clone(),
            FieldDraft::observed(observe_value(value), !value.is_null()),
        );
    }
    fields
}

// ------------------------------- Merge ----------------------------------- //

/// Join two candidate types. Same type keeps; bigint widens into float;
/// objects and arrays merge structurally; any other pair collapses to
/// string. That last rule also settles chains of three or more incompatible
/// scalars: the first clash pins the field to string and string absorbs
/// everything after.
pub fn merge(a: FieldType, b: FieldType) -> FieldType {
    use FieldType::*;
    match (a, b) {
        (Unknown, other) | (other, Unknown) => other,
        (Json, _) | (_, Json) => Json,
        (Bigint, Bigint) => Bigint,
        (Float, Float) | (Bigint, Float) | (Float, Bigint) => Float,
        (Boolean, Boolean) => Boolean,
        (String, String) => String,
        (Timestamp { format: a }, Timestamp { format: b }) => Timestamp { format: a.or(b) },
        (Timestamp { format }, String) | (String, Timestamp { format }) => Timestamp { format },
        (
            Object {
                fields: a,
                seen_objects: na,
            },
            Object {
                fields: b,
                seen_objects: nb,
            },
        ) => Object {
            fields: merge_field_maps(a, b),
            seen_objects: na + nb,
        },
        (Array { element: a }, Array { element: b }) => Array {
            element: Box::new(merge(*a, *b)),
        },
        _ => String,
    }
}

fn merge_field_maps(mut a: FieldMap, b: FieldMap) -> FieldMap {
    for (name, fb) in b {
        match a.entry(name) {
            Entry::Occupied(mut entry) => {
                let fa = entry.get_mut();
                fa.ty = merge(std::mem::replace(&mut fa.ty, FieldType::Unknown), fb.ty);
                fa.seen += fb.seen;
                fa.non_null += fb.non_null;
            }
            Entry::Vacant(entry) => {
                entry.insert(fb);
            }
        }
    }
    a
}

// ------------------------------ Front API --------------------------------- //

pub struct Inference {
    event_time_field: String,
    records: u64,
    fields: FieldMap,
    /// Raw event-time values retained for format guessing.
    time_values: Vec<Value>,
}

impl Inference {
    pub fn new(event_time_field: &str) -> Self {
        Self {
            event_time_field: event_time_field.to_string(),
            records: 0,
            fields: FieldMap::new(),
            time_values: Vec::new(),
        }
    }

    pub fn observe_record(&mut self, record: &Map<String, Value>) {
        self.records += 1;
        for (name, value) in record {
            if name == &self.event_time_field && self.time_values.len() < MAX_TIME_SAMPLES {
                self.time_values.push(value.clone());
            }
            let candidate = FieldDraft::observed(observe_value(value), !value.is_null());
            match self.fields.entry(name.clone()) {
                Entry::Occupied(mut entry) => {
                    let field = entry.get_mut();
                    field.ty = merge(
                        std::mem::replace(&mut field.ty, FieldType::Unknown),
                        candidate.ty,
                    );
                    field.seen += 1;
                    field.non_null += candidate.non_null;
                }
                Entry::Vacant(entry) => {
                    entry.insert(candidate);
                }
            }
        }
    }

    /// Finish the draft: force `--json-field` names to raw JSON, stamp the
    /// event-time field as a timestamp (with the supplied or guessed
    /// format), and attach indicators. Fails if the event-time field never
    /// appeared or an indicator names an absent field.
    pub fn solve(&self, opts: &DraftOptions) -> Result<SchemaDraft, InferenceError> {
        if self.records == 0 {
            return Err(InferenceError::NoRecords);
        }
        let mut fields = self.fields.clone();

        for name in &opts.json_fields {
            if let Some(field) = fields.get_mut(name) {
                field.ty = FieldType::Json;
            }
        }

        let format = opts
            .time_format
            .clone()
            .unwrap_or_else(|| time::guess_format(&self.time_values).to_string());
        match fields.get_mut(&self.event_time_field) {
            Some(field) => {
                field.ty = FieldType::Timestamp {
                    format: Some(format),
                };
                field.is_event_time = true;
            }
            None => {
                return Err(InferenceError::EventTimeFieldMissing {
                    field: self.event_time_field.clone(),
                });
            }
        }

        let mut missing = Vec::new();
        for indicator in &opts.indicator_fields {
            match fields.get_mut(&indicator.field) {
                Some(field) => field.indicators.push(indicator.indicator.clone()),
                None => missing.push(indicator.field.clone()),
            }
        }
        if !missing.is_empty() {
            return Err(InferenceError::IndicatorFieldMissing { fields: missing });
        }

        Ok(SchemaDraft {
            fields,
            records: self.records,
        })
    }
}

/// Convenience for tests and one-shot callers.
pub fn infer_records<'a, I>(
    event_time_field: &str,
    records: I,
    opts: &DraftOptions,
) -> Result<SchemaDraft, InferenceError>
where
    I: IntoIterator<Item = &'a Map<String, Value>>,
{
    let mut inf = Inference::new(event_time_field);
    for record in records {
        inf.observe_record(record);
    }
    inf.solve(opts)
}

// ------------------------------- Tests ------------------------------------ //
