use crate::backend::{Document, DocumentId, FieldValue, Fields};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// A document as returned by the REST api, fields still in their typed-value encoding.
#[derive(Deserialize, Debug, Clone)]
pub struct RawDocument {
	pub name: String,
	#[serde(default)]
	pub fields: BTreeMap<String, Value>,
}

pub fn encode(value: &FieldValue) -> Value {
	match value {
		FieldValue::String(value) => json!({ "stringValue": value }),
		FieldValue::Boolean(value) => json!({ "booleanValue": value }),
		FieldValue::Null => json!({ "nullValue": null }),
	}
}

pub fn encode_fields(fields: &Fields) -> Value {
	let encoded = fields.iter().map(|(key, value)| (key.clone(), encode(value)));
	Value::Object(encoded.collect::<Map<_, _>>())
}

/// Decodes one typed value. Kinds the inventory never stores (numbers, maps, arrays, timestamps, ...) yield `None`.
pub fn decode(value: &Value) -> Option<FieldValue> {
	let object = value.as_object()?;
	let (kind, inner) = object.iter().next()?;
	match kind.as_str() {
		"stringValue" => inner.as_str().map(FieldValue::from),
		"booleanValue" => inner.as_bool().map(FieldValue::Boolean),
		"nullValue" => Some(FieldValue::Null),
		_ => None,
	}
}

pub fn decode_document(raw: RawDocument) -> Option<Document> {
	let id = raw.name.rsplit('/').next().filter(|id| !id.is_empty())?;
	let fields = raw
		.fields
		.iter()
		.filter_map(|(key, value)| Some((key.clone(), decode(value)?)))
		.collect::<Fields>();
	Some(Document {
		id: DocumentId::from(id),
		fields,
	})
}
