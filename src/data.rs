use crate::backend::{Document, DocumentId, FieldValue, Fields};

pub mod csv;

/// Category given to items whose source row left it blank.
pub static UNCATEGORIZED: &str = "Uncategorized";
/// Category selection that matches every item.
pub static ALL_CATEGORIES: &str = "All";

/// One inventory entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
	/// Assigned by the backend; `None` until the item has been stored.
	pub id: Option<DocumentId>,
	pub name: String,
	pub category: String,
	pub taken: bool,
}

impl Item {
	pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
		let category = category.into();
		Self {
			id: None,
			name: name.into(),
			category: match category.trim().is_empty() {
				true => UNCATEGORIZED.to_owned(),
				false => category,
			},
			taken: false,
		}
	}

	pub fn to_fields(&self) -> Fields {
		let mut fields = Fields::new();
		fields.insert("name".into(), FieldValue::from(self.name.as_str()));
		fields.insert("category".into(), FieldValue::from(self.category.as_str()));
		fields.insert("taken".into(), FieldValue::from(self.taken));
		fields
	}

	/// Reads a stored document. Documents without a usable name are not items.
	pub fn from_document(document: &Document) -> Option<Self> {
		let text = |key: &str| {
			let value = document.fields.get(key)?.as_str()?.trim();
			(!value.is_empty()).then(|| value.to_owned())
		};
		let name = text("name")?;
		let category = text("category").unwrap_or_else(|| UNCATEGORIZED.to_owned());
		let taken = document.fields.get("taken").and_then(FieldValue::as_bool).unwrap_or(false);
		Some(Self {
			id: Some(document.id.clone()),
			name,
			category,
			taken,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn document(fields: &[(&str, FieldValue)]) -> Document {
		Document {
			id: DocumentId::from("doc"),
			fields: fields.iter().map(|(key, value)| (key.to_string(), value.clone())).collect(),
		}
	}

	#[test]
	fn blank_category_defaults() {
		assert_eq!(Item::new("Hammer", "  ").category, UNCATEGORIZED);
		assert_eq!(Item::new("Hammer", "Tools").category, "Tools");
	}

	#[test]
	fn stored_fields() {
		let fields = Item::new("Hammer", "Tools").to_fields();
		assert_eq!(fields.get("name"), Some(&FieldValue::from("Hammer")));
		assert_eq!(fields.get("category"), Some(&FieldValue::from("Tools")));
		assert_eq!(fields.get("taken"), Some(&FieldValue::from(false)));
	}

	#[test]
	fn reads_complete_document() {
		let item = Item::from_document(&document(&[
			("name", FieldValue::from("Hammer")),
			("category", FieldValue::from("Tools")),
			("taken", FieldValue::from(true)),
		]))
		.unwrap();
		assert_eq!(item.id, Some(DocumentId::from("doc")));
		assert_eq!(item.name, "Hammer");
		assert!(item.taken);
	}

	#[test]
	fn fills_missing_fields() {
		let item = Item::from_document(&document(&[
			("name", FieldValue::from("Tape")),
			("taken", FieldValue::Null),
		]))
		.unwrap();
		assert_eq!(item.category, UNCATEGORIZED);
		assert!(!item.taken);
	}

	#[test]
	fn nameless_document_is_skipped() {
		assert_eq!(Item::from_document(&document(&[("category", FieldValue::from("Tools"))])), None);
		assert_eq!(Item::from_document(&document(&[("name", FieldValue::from(" "))])), None);
		assert_eq!(Item::from_document(&document(&[("name", FieldValue::Boolean(true))])), None);
	}
}
