use super::{
	Backend, BackendError, CollectionPath, Document, DocumentId, Fields, Identity, SnapshotEvent, Subscription,
	Write, WriteBatch,
};
use futures_util::future::{self, FutureExt, LocalBoxFuture};
use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// Process-local document store with push delivery.
/// Collections keep their documents in insertion order.
#[derive(Clone, Default)]
pub struct MemoryBackend(Rc<RefCell<State>>);
impl PartialEq for MemoryBackend {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

#[derive(Default)]
struct State {
	identity: Option<Identity>,
	collections: HashMap<CollectionPath, Vec<Document>>,
	subscribers: Vec<(CollectionPath, async_channel::Sender<SnapshotEvent>)>,
	#[cfg(test)]
	failures: Failures,
}

#[cfg(test)]
#[derive(Default)]
struct Failures {
	sign_in: Option<String>,
	list: Option<String>,
	commit: Option<String>,
	update: Option<String>,
}

impl MemoryBackend {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn documents(&self, collection: &CollectionPath) -> Vec<Document> {
		self.0.borrow().collections.get(collection).cloned().unwrap_or_default()
	}

	pub fn subscriber_count(&self) -> usize {
		let mut state = self.0.borrow_mut();
		state.subscribers.retain(|(_, send)| !send.is_closed());
		state.subscribers.len()
	}

	fn sign_in(&self, anonymous: bool) -> Result<Identity, BackendError> {
		let mut state = self.0.borrow_mut();
		#[cfg(test)]
		if let Some(message) = state.failures.sign_in.take() {
			return Err(BackendError::Rejected(message));
		}
		let identity = Identity {
			user_id: uuid::Uuid::new_v4().to_string(),
			anonymous,
		};
		state.identity = Some(identity.clone());
		Ok(identity)
	}

	fn broadcast(state: &mut State, collection: &CollectionPath) {
		let documents = state.collections.get(collection).cloned().unwrap_or_default();
		state.subscribers.retain(|(path, send)| {
			if path != collection {
				return !send.is_closed();
			}
			send.try_send(Ok(documents.clone())).is_ok()
		});
	}

	fn apply(&self, batch: WriteBatch) -> Result<(), BackendError> {
		let mut state = self.0.borrow_mut();
		#[cfg(test)]
		if let Some(message) = state.failures.commit.take() {
			return Err(BackendError::Rejected(message));
		}
		if state.identity.is_none() {
			return Err(BackendError::NotSignedIn);
		}
		// Work on a copy so a rejected write leaves the collection untouched.
		let mut documents = state.collections.get(batch.collection()).cloned().unwrap_or_default();
		for write in batch.writes() {
			match write {
				Write::Delete(id) => documents.retain(|document| &document.id != id),
				Write::Insert(fields) => documents.push(Document {
					id: DocumentId::generate(),
					fields: fields.clone(),
				}),
			}
		}
		state.collections.insert(batch.collection().clone(), documents);
		Self::broadcast(&mut state, batch.collection());
		Ok(())
	}

	fn patch(&self, collection: &CollectionPath, id: &DocumentId, fields: Fields) -> Result<(), BackendError> {
		let mut state = self.0.borrow_mut();
		#[cfg(test)]
		if let Some(message) = state.failures.update.take() {
			return Err(BackendError::Rejected(message));
		}
		if state.identity.is_none() {
			return Err(BackendError::NotSignedIn);
		}
		let document = state
			.collections
			.get_mut(collection)
			.and_then(|documents| documents.iter_mut().find(|document| &document.id == id));
		let Some(document) = document else {
			return Err(BackendError::Status {
				status: 404,
				message: format!("No document to update: {collection}/{id}"),
			});
		};
		document.fields.extend(fields);
		Self::broadcast(&mut state, collection);
		Ok(())
	}
}

#[cfg(test)]
impl MemoryBackend {
	pub fn reject_sign_in(&self, message: &str) {
		self.0.borrow_mut().failures.sign_in = Some(message.to_owned());
	}

	pub fn fail_next_list(&self, message: &str) {
		self.0.borrow_mut().failures.list = Some(message.to_owned());
	}

	pub fn fail_next_commit(&self, message: &str) {
		self.0.borrow_mut().failures.commit = Some(message.to_owned());
	}

	pub fn fail_next_update(&self, message: &str) {
		self.0.borrow_mut().failures.update = Some(message.to_owned());
	}

	/// Pushes an error to every live query on the collection.
	pub fn break_subscriptions(&self, collection: &CollectionPath, message: &str) {
		let state = self.0.borrow();
		for (path, send) in &state.subscribers {
			if path == collection {
				let _ = send.try_send(Err(BackendError::Rejected(message.to_owned())));
			}
		}
	}
}

impl Backend for MemoryBackend {
	fn identity(&self) -> Option<Identity> {
		self.0.borrow().identity.clone()
	}

	fn sign_in_anonymously(&self) -> LocalBoxFuture<'_, Result<Identity, BackendError>> {
		future::ready(self.sign_in(true)).boxed_local()
	}

	fn sign_in_with_token<'a>(&'a self, token: &'a str) -> LocalBoxFuture<'a, Result<Identity, BackendError>> {
		let result = match token.trim().is_empty() {
			true => Err(BackendError::Rejected("empty sign-in token".into())),
			false => self.sign_in(false),
		};
		future::ready(result).boxed_local()
	}

	fn subscribe(&self, collection: &CollectionPath) -> Subscription {
		let (send, subscription) = Subscription::channel();
		let mut state = self.0.borrow_mut();
		let documents = state.collections.get(collection).cloned().unwrap_or_default();
		let _ = send.try_send(Ok(documents));
		state.subscribers.push((collection.clone(), send));
		subscription
	}

	fn list_documents<'a>(
		&'a self,
		collection: &'a CollectionPath,
	) -> LocalBoxFuture<'a, Result<Vec<Document>, BackendError>> {
		#[cfg(test)]
		if let Some(message) = self.0.borrow_mut().failures.list.take() {
			return future::ready(Err(BackendError::Rejected(message))).boxed_local();
		}
		future::ready(Ok(self.documents(collection))).boxed_local()
	}

	fn commit(&self, batch: WriteBatch) -> LocalBoxFuture<'_, Result<(), BackendError>> {
		future::ready(self.apply(batch)).boxed_local()
	}

	fn update_fields<'a>(
		&'a self,
		collection: &'a CollectionPath,
		id: &'a DocumentId,
		fields: Fields,
	) -> LocalBoxFuture<'a, Result<(), BackendError>> {
		future::ready(self.patch(collection, id, fields)).boxed_local()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::backend::FieldValue;
	use futures::executor::block_on;

	fn fields(name: &str) -> Fields {
		let mut fields = Fields::new();
		fields.insert("name".into(), FieldValue::from(name));
		fields
	}

	fn signed_in() -> MemoryBackend {
		let backend = MemoryBackend::new();
		block_on(backend.sign_in_anonymously()).unwrap();
		backend
	}

	#[test]
	fn subscription_starts_with_current_content() {
		let backend = signed_in();
		let path = CollectionPath::inventory("artifacts", "app");
		let mut batch = WriteBatch::new(path.clone());
		batch.insert(fields("A"));
		block_on(backend.commit(batch)).unwrap();

		let subscription = backend.subscribe(&path);
		let first = block_on(subscription.next()).unwrap().unwrap();
		assert_eq!(first.len(), 1);
		assert_eq!(first[0].fields.get("name"), Some(&FieldValue::from("A")));
	}

	#[test]
	fn commit_pushes_full_snapshot() {
		let backend = signed_in();
		let path = CollectionPath::inventory("artifacts", "app");
		let subscription = backend.subscribe(&path);
		assert_eq!(block_on(subscription.next()), Some(Ok(Vec::new())));

		let mut batch = WriteBatch::new(path.clone());
		batch.insert(fields("A")).insert(fields("B"));
		block_on(backend.commit(batch)).unwrap();

		let snapshot = block_on(subscription.next()).unwrap().unwrap();
		let names = snapshot.iter().filter_map(|doc| doc.fields.get("name")?.as_str()).collect::<Vec<_>>();
		assert_eq!(names, vec!["A", "B"]);
	}

	#[test]
	fn other_collections_are_not_notified() {
		let backend = signed_in();
		let ours = CollectionPath::inventory("artifacts", "app");
		let theirs = CollectionPath::inventory("artifacts", "other");
		let subscription = backend.subscribe(&theirs);
		block_on(subscription.next()).unwrap().unwrap();

		let mut batch = WriteBatch::new(ours);
		batch.insert(fields("A"));
		block_on(backend.commit(batch)).unwrap();

		subscription.close();
		assert_eq!(block_on(subscription.next()), None);
		assert!(backend.documents(&theirs).is_empty());
	}

	#[test]
	fn failed_commit_changes_nothing() {
		let backend = signed_in();
		let path = CollectionPath::inventory("artifacts", "app");
		let mut batch = WriteBatch::new(path.clone());
		batch.insert(fields("A"));
		block_on(backend.commit(batch)).unwrap();
		let before = backend.documents(&path);

		backend.fail_next_commit("quota exceeded");
		let mut batch = WriteBatch::new(path.clone());
		batch.delete(before[0].id.clone()).insert(fields("B"));
		let result = block_on(backend.commit(batch));
		assert_eq!(result, Err(BackendError::Rejected("quota exceeded".into())));
		assert_eq!(backend.documents(&path), before);
	}

	#[test]
	fn writes_require_identity() {
		let backend = MemoryBackend::new();
		let path = CollectionPath::inventory("artifacts", "app");
		let mut batch = WriteBatch::new(path);
		batch.insert(fields("A"));
		assert_eq!(block_on(backend.commit(batch)), Err(BackendError::NotSignedIn));
	}

	#[test]
	fn update_touches_only_given_fields() {
		let backend = signed_in();
		let path = CollectionPath::inventory("artifacts", "app");
		let mut batch = WriteBatch::new(path.clone());
		batch.insert(fields("A"));
		block_on(backend.commit(batch)).unwrap();
		let id = backend.documents(&path)[0].id.clone();

		let mut update = Fields::new();
		update.insert("taken".into(), FieldValue::from(true));
		block_on(backend.update_fields(&path, &id, update)).unwrap();

		let document = &backend.documents(&path)[0];
		assert_eq!(document.fields.get("name"), Some(&FieldValue::from("A")));
		assert_eq!(document.fields.get("taken"), Some(&FieldValue::from(true)));
	}

	#[test]
	fn update_of_missing_document_fails() {
		let backend = signed_in();
		let path = CollectionPath::inventory("artifacts", "app");
		let result = block_on(backend.update_fields(&path, &DocumentId::from("nope"), Fields::new()));
		assert!(matches!(result, Err(BackendError::Status { status: 404, .. })));
	}

	#[test]
	fn closed_subscriptions_are_released() {
		let backend = signed_in();
		let path = CollectionPath::inventory("artifacts", "app");
		let first = backend.subscribe(&path);
		let second = backend.subscribe(&path);
		assert_eq!(backend.subscriber_count(), 2);
		first.close();
		drop(second);
		assert_eq!(backend.subscriber_count(), 0);
	}
}
