//! Item lists in plain comma separated form.
//!
//! The header row must name a `name` and a `category` column (any case, any order).
//! Fields are split on every comma; quoting is not understood, so a value containing
//! a comma or a line break cannot be expressed.

use super::Item;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FormatError {
	#[error("CSV must contain 'name' and 'category' columns.")]
	MissingColumns,
	#[error("No valid items found in CSV.")]
	NoValidItems,
}

struct Columns {
	name: usize,
	category: usize,
}
impl Columns {
	fn find(header: &str) -> Result<Self, FormatError> {
		let header = header.trim_start_matches('\u{feff}');
		let labels = header.split(',').map(|label| label.trim().to_lowercase()).collect::<Vec<_>>();
		let position = |wanted: &str| labels.iter().position(|label| label == wanted);
		match (position("name"), position("category")) {
			(Some(name), Some(category)) => Ok(Self { name, category }),
			_ => Err(FormatError::MissingColumns),
		}
	}
}

/// Parses the file content into unsaved items, in file order.
/// Rows with a blank name are dropped. A file with only a header gives an empty list.
pub fn parse(text: &str) -> Result<Vec<Item>, FormatError> {
	let mut lines = text.lines();
	let Some(header) = lines.next() else {
		return Err(FormatError::MissingColumns);
	};
	let columns = Columns::find(header)?;
	let items = lines
		.filter(|line| !line.trim().is_empty())
		.filter_map(|line| {
			let fields = line.split(',').collect::<Vec<_>>();
			let field = |index: usize| fields.get(index).map(|value| value.trim()).unwrap_or_default();
			let name = field(columns.name);
			if name.is_empty() {
				return None;
			}
			Some(Item::new(name, field(columns.category)))
		})
		.collect();
	Ok(items)
}

/// Like [`parse`], but an empty result is an error.
pub fn parse_non_empty(text: &str) -> Result<Vec<Item>, FormatError> {
	let items = parse(text)?;
	if items.is_empty() {
		return Err(FormatError::NoValidItems);
	}
	Ok(items)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::data::UNCATEGORIZED;

	fn pairs(items: &[Item]) -> Vec<(&str, &str, bool)> {
		items
			.iter()
			.map(|item| (item.name.as_str(), item.category.as_str(), item.taken))
			.collect()
	}

	#[test]
	fn drops_nameless_rows_and_defaults_category() {
		let items = parse("name,category\nA,Cat1\nB,\n,Cat2\n").unwrap();
		assert_eq!(pairs(&items), vec![("A", "Cat1", false), ("B", UNCATEGORIZED, false)]);
		assert!(items.iter().all(|item| item.id.is_none()));
	}

	#[test]
	fn header_is_case_insensitive_and_unordered() {
		let items = parse("Category , NAME,notes\nTools, Hammer ,heavy\r\n").unwrap();
		assert_eq!(pairs(&items), vec![("Hammer", "Tools", false)]);
	}

	#[test]
	fn missing_columns() {
		assert_eq!(parse("title,category\nA,B"), Err(FormatError::MissingColumns));
		assert_eq!(parse("NAME,kind\nA,B"), Err(FormatError::MissingColumns));
		assert_eq!(parse(""), Err(FormatError::MissingColumns));
	}

	#[test]
	fn header_only_is_empty() {
		assert_eq!(parse("name,category\n"), Ok(Vec::new()));
		assert_eq!(parse_non_empty("name,category\n\n  \n"), Err(FormatError::NoValidItems));
	}

	#[test]
	fn blank_lines_and_short_rows() {
		let items = parse("name,category\n\nLadder\n   \nRope,Outdoor").unwrap();
		assert_eq!(pairs(&items), vec![("Ladder", UNCATEGORIZED, false), ("Rope", "Outdoor", false)]);
	}

	#[test]
	fn byte_order_mark_is_ignored() {
		let items = parse("\u{feff}name,category\nA,B").unwrap();
		assert_eq!(pairs(&items), vec![("A", "B", false)]);
	}

	#[test]
	fn quoted_commas_are_not_understood() {
		let items = parse("name,category\n\"Saw, hand\",Tools").unwrap();
		assert_eq!(pairs(&items), vec![("\"Saw", "hand\"", false)]);
	}
}
