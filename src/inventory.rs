use crate::{
	backend::Document,
	context::use_app_context,
	data::{Item, ALL_CATEGORIES},
	error::Error,
	notice::Notice,
	session::Session,
};
use itertools::Itertools;
use std::rc::Rc;
use yew::{html::ChildrenProps, prelude::*};
use yewdux::prelude::*;

/// Local mirror of the shared item collection. Only snapshots write to it.
#[derive(Clone, Debug, PartialEq, Store)]
pub struct Inventory {
	items: Vec<Item>,
	categories: Vec<String>,
	loading: bool,
}
impl Default for Inventory {
	fn default() -> Self {
		Self {
			items: Vec::new(),
			categories: vec![ALL_CATEGORIES.to_owned()],
			loading: false,
		}
	}
}

impl Inventory {
	pub fn items(&self) -> &[Item] {
		&self.items
	}

	/// `"All"` followed by every category present, in the order first seen.
	pub fn categories(&self) -> &[String] {
		&self.categories
	}

	pub fn is_loading(&self) -> bool {
		self.loading
	}

	pub fn begin_loading(&mut self) {
		self.loading = true;
	}

	/// Replaces the whole mirror with the snapshot's content.
	pub fn apply_snapshot(&mut self, documents: &[Document]) {
		self.items = documents
			.iter()
			.filter_map(|document| {
				let item = Item::from_document(document);
				if item.is_none() {
					log::warn!(target: "inventory", "Ignoring document {} without a name", document.id);
				}
				item
			})
			.collect();
		let found = self.items.iter().map(|item| item.category.clone()).unique();
		self.categories = std::iter::once(ALL_CATEGORIES.to_owned()).chain(found).collect();
		self.loading = false;
	}

	/// Keeps whatever was loaded before; stale data beats no data.
	pub fn apply_error(&mut self) {
		self.loading = false;
	}
}

/// Keeps the [`Inventory`] store subscribed to the collection while a user is signed in.
#[function_component]
pub fn Provider(props: &ChildrenProps) -> Html {
	let context = use_app_context();
	let identity = use_selector(|session: &Session| session.identity.clone());
	use_effect_with(identity, move |identity| {
		let subscription = (**identity).as_ref().map(|identity| {
			log::info!(target: "inventory", "Subscribing to {} as {}", context.collection, identity.user_id);
			let dispatch = Dispatch::<Inventory>::new();
			dispatch.reduce_mut(Inventory::begin_loading);
			let subscription = Rc::new(context.backend.subscribe(&context.collection));
			wasm_bindgen_futures::spawn_local({
				let subscription = subscription.clone();
				async move {
					while let Some(event) = subscription.next().await {
						match event {
							Ok(documents) => {
								log::debug!(target: "inventory", "Snapshot with {} documents", documents.len());
								dispatch.reduce_mut(|inventory| inventory.apply_snapshot(&documents));
							}
							Err(err) => {
								let err = Error::Subscription(err);
								log::error!(target: "inventory", "{err}");
								Notice::show_error(err.to_string());
								dispatch.reduce_mut(Inventory::apply_error);
							}
						}
					}
				}
			});
			subscription
		});
		move || {
			if let Some(subscription) = subscription {
				log::debug!(target: "inventory", "Closing subscription");
				subscription.close();
			}
		}
	});
	html! {<>{props.children.clone()}</>}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		backend::{memory::MemoryBackend, Backend, CollectionPath, DocumentId, FieldValue, Fields, WriteBatch},
		data::Item,
	};
	use futures::executor::block_on;

	fn document(id: &str, name: &str, category: &str, taken: bool) -> Document {
		let mut fields = Fields::new();
		fields.insert("name".into(), FieldValue::from(name));
		fields.insert("category".into(), FieldValue::from(category));
		fields.insert("taken".into(), FieldValue::from(taken));
		Document {
			id: DocumentId::from(id),
			fields,
		}
	}

	#[test]
	fn starts_empty_with_all_category() {
		let inventory = Inventory::default();
		assert!(inventory.items().is_empty());
		assert_eq!(inventory.categories(), ["All"]);
		assert!(!inventory.is_loading());
	}

	#[test]
	fn snapshot_rebuilds_items_and_categories() {
		let mut inventory = Inventory::default();
		inventory.begin_loading();
		assert!(inventory.is_loading());
		inventory.apply_snapshot(&[
			document("1", "Drill", "Tools", false),
			document("2", "Tent", "Camping", true),
			document("3", "Saw", "Tools", false),
		]);
		assert!(!inventory.is_loading());
		let names = inventory.items().iter().map(|item| item.name.as_str()).collect::<Vec<_>>();
		assert_eq!(names, vec!["Drill", "Tent", "Saw"]);
		assert_eq!(inventory.categories(), ["All", "Tools", "Camping"]);

		inventory.apply_snapshot(&[document("2", "Tent", "Camping", false)]);
		assert_eq!(inventory.items().len(), 1);
		assert!(!inventory.items()[0].taken);
		assert_eq!(inventory.categories(), ["All", "Camping"]);
	}

	#[test]
	fn error_keeps_stale_items() {
		let mut inventory = Inventory::default();
		inventory.apply_snapshot(&[document("1", "Drill", "Tools", false)]);
		inventory.begin_loading();
		inventory.apply_error();
		assert!(!inventory.is_loading());
		assert_eq!(inventory.items().len(), 1);
	}

	#[test]
	fn unnamed_documents_are_left_out() {
		let mut inventory = Inventory::default();
		let mut broken = document("2", "", "Tools", false);
		broken.fields.remove("name");
		inventory.apply_snapshot(&[document("1", "Drill", "Tools", false), broken]);
		assert_eq!(inventory.items().len(), 1);
	}

	#[test]
	fn broken_subscription_reports_and_keeps_items() {
		let backend = MemoryBackend::new();
		block_on(backend.sign_in_anonymously()).unwrap();
		let path = CollectionPath::inventory("artifacts", "app");
		let mut batch = WriteBatch::new(path.clone());
		batch.insert(Item::new("Drill", "Tools").to_fields());
		block_on(backend.commit(batch)).unwrap();

		let subscription = backend.subscribe(&path);
		let mut inventory = Inventory::default();
		inventory.begin_loading();
		inventory.apply_snapshot(&block_on(subscription.next()).unwrap().unwrap());

		backend.break_subscriptions(&path, "unavailable");
		let err = block_on(subscription.next()).unwrap().unwrap_err();
		assert_eq!(Error::Subscription(err).to_string(), "Failed to load inventory: unavailable");
		inventory.apply_error();
		assert_eq!(inventory.items().len(), 1);
		assert_eq!(inventory.categories(), ["All", "Tools"]);
	}
}
