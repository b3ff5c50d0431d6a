use crate::data::{Item, ALL_CATEGORIES};
use yewdux::prelude::*;

/// What the user narrowed the list down to. Never leaves the page.
#[derive(Clone, Debug, PartialEq, Store)]
pub struct Filters {
	pub category: String,
	pub search: String,
}
impl Default for Filters {
	fn default() -> Self {
		Self {
			category: ALL_CATEGORIES.to_owned(),
			search: String::new(),
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counts {
	pub total: usize,
	pub taken: usize,
	pub not_taken: usize,
}
impl Counts {
	pub fn of<'a>(items: impl IntoIterator<Item = &'a Item>) -> Self {
		let (total, taken) = items
			.into_iter()
			.fold((0, 0), |(total, taken), item| (total + 1, taken + usize::from(item.taken)));
		Self {
			total,
			taken,
			not_taken: total - taken,
		}
	}
}

/// The rows to show and the dashboard numbers, derived from the mirror and the filters.
#[derive(Clone, Debug, PartialEq)]
pub struct View {
	pub displayed: Vec<Item>,
	pub counts: Counts,
}
impl View {
	pub fn compute(items: &[Item], filters: &Filters) -> Self {
		let in_category = by_category(items, &filters.category);
		// Searching narrows the rows, never the counts.
		let counts = Counts::of(in_category.iter().copied());
		let displayed = by_search(in_category, &filters.search).into_iter().cloned().collect();
		Self { displayed, counts }
	}
}

pub fn by_category<'a>(items: &'a [Item], category: &str) -> Vec<&'a Item> {
	match category == ALL_CATEGORIES {
		true => items.iter().collect(),
		false => items.iter().filter(|item| item.category == category).collect(),
	}
}

pub fn by_search<'a>(items: Vec<&'a Item>, search: &str) -> Vec<&'a Item> {
	if search.is_empty() {
		return items;
	}
	let needle = search.to_lowercase();
	items
		.into_iter()
		.filter(|item| item.name.to_lowercase().contains(&needle))
		.collect()
}
