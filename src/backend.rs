use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use std::{cell::Cell, collections::BTreeMap};

pub mod firestore;
pub mod memory;

/// Identifier of a stored document, assigned by the backend when the document is created.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(String);
impl From<String> for DocumentId {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl From<&str> for DocumentId {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}
impl DocumentId {
	pub fn generate() -> Self {
		Self(uuid::Uuid::new_v4().simple().to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl std::fmt::Display for DocumentId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
	String(String),
	Boolean(bool),
	Null,
}
impl FieldValue {
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(value) => Some(value.as_str()),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Boolean(value) => Some(*value),
			_ => None,
		}
	}
}
impl From<&str> for FieldValue {
	fn from(value: &str) -> Self {
		Self::String(value.to_owned())
	}
}
impl From<String> for FieldValue {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}
impl From<bool> for FieldValue {
	fn from(value: bool) -> Self {
		Self::Boolean(value)
	}
}

pub type Fields = BTreeMap<String, FieldValue>;

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
	pub id: DocumentId,
	pub fields: Fields,
}

/// Slash separated location of a collection, e.g. `artifacts/<app-id>/public/data/inventory`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CollectionPath(Vec<String>);
impl CollectionPath {
	pub fn inventory(namespace_root: &str, app_id: &str) -> Self {
		Self(vec![
			namespace_root.to_owned(),
			app_id.to_owned(),
			"public".into(),
			"data".into(),
			"inventory".into(),
		])
	}

	pub fn segments(&self) -> &[String] {
		&self.0
	}
}
impl std::fmt::Display for CollectionPath {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0.join("/"))
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	pub user_id: String,
	pub anonymous: bool,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BackendError {
	#[error("network request failed: {0}")]
	Network(String),
	#[error("{message} (status {status})")]
	Status { status: u16, message: String },
	#[error("unexpected response: {0}")]
	InvalidJson(String),
	#[error("no signed in user")]
	NotSignedIn,
	#[error("{0}")]
	Rejected(String),
}

pub type SnapshotEvent = Result<Vec<Document>, BackendError>;

/// Live query handle. Every event is the complete current content of the collection.
/// Closing (or dropping) the handle stops delivery; producers observe the closed channel and stop.
pub struct Subscription {
	events: async_channel::Receiver<SnapshotEvent>,
	// Set by `close`; the channel alone also reads as closed once the producer is gone.
	closed: Cell<bool>,
}
impl Subscription {
	pub fn channel() -> (async_channel::Sender<SnapshotEvent>, Self) {
		let (send, events) = async_channel::unbounded();
		let closed = Cell::new(false);
		(send, Self { events, closed })
	}

	/// Waits for the next snapshot. Events the producer sent before it stopped are still
	/// delivered; after [`Subscription::close`] nothing is.
	pub async fn next(&self) -> Option<SnapshotEvent> {
		if self.closed.get() {
			return None;
		}
		self.events.recv().await.ok()
	}

	pub fn close(&self) {
		self.closed.set(true);
		self.events.close();
	}

	pub fn is_closed(&self) -> bool {
		self.events.is_closed()
	}
}
impl Drop for Subscription {
	fn drop(&mut self) {
		self.events.close();
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum Write {
	Delete(DocumentId),
	Insert(Fields),
}

/// Deletes and inserts against a single collection, applied all-or-nothing by [`Backend::commit`].
#[derive(Clone, Debug, PartialEq)]
pub struct WriteBatch {
	collection: CollectionPath,
	writes: Vec<Write>,
}
impl WriteBatch {
	pub fn new(collection: CollectionPath) -> Self {
		Self {
			collection,
			writes: Vec::new(),
		}
	}

	pub fn delete(&mut self, id: DocumentId) -> &mut Self {
		self.writes.push(Write::Delete(id));
		self
	}

	pub fn insert(&mut self, fields: Fields) -> &mut Self {
		self.writes.push(Write::Insert(fields));
		self
	}

	pub fn collection(&self) -> &CollectionPath {
		&self.collection
	}

	pub fn writes(&self) -> &[Write] {
		&self.writes
	}

	pub fn len(&self) -> usize {
		self.writes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.writes.is_empty()
	}
}

/// A realtime document store plus the sign-in session that authorizes writes to it.
pub trait Backend {
	/// The identity of an already established session, if any.
	fn identity(&self) -> Option<Identity>;

	fn sign_in_anonymously(&self) -> LocalBoxFuture<'_, Result<Identity, BackendError>>;

	fn sign_in_with_token<'a>(&'a self, token: &'a str) -> LocalBoxFuture<'a, Result<Identity, BackendError>>;

	/// Opens a live query on the collection. The first event is the initial load.
	fn subscribe(&self, collection: &CollectionPath) -> Subscription;

	fn list_documents<'a>(
		&'a self,
		collection: &'a CollectionPath,
	) -> LocalBoxFuture<'a, Result<Vec<Document>, BackendError>>;

	fn commit(&self, batch: WriteBatch) -> LocalBoxFuture<'_, Result<(), BackendError>>;

	/// Overwrites only the given fields of an existing document.
	fn update_fields<'a>(
		&'a self,
		collection: &'a CollectionPath,
		id: &'a DocumentId,
		fields: Fields,
	) -> LocalBoxFuture<'a, Result<(), BackendError>>;
}

#[cfg(test)]
mod tests {
	use super::*;
	use futures::executor::block_on;

	#[test]
	fn inventory_path_layout() {
		let path = CollectionPath::inventory("artifacts", "my-app");
		assert_eq!(path.to_string(), "artifacts/my-app/public/data/inventory");
		assert_eq!(path.segments().len(), 5);
	}

	#[test]
	fn closed_subscription_rejects_sends() {
		let (send, subscription) = Subscription::channel();
		assert!(send.try_send(Ok(Vec::new())).is_ok());
		subscription.close();
		assert!(subscription.is_closed());
		assert!(send.is_closed());
		assert!(send.try_send(Ok(Vec::new())).is_err());
	}

	#[test]
	fn last_event_survives_producer_exit() {
		let (send, subscription) = Subscription::channel();
		send.try_send(Err(BackendError::Rejected("permission denied".into()))).unwrap();
		drop(send);
		assert!(subscription.is_closed());
		assert_eq!(
			block_on(subscription.next()),
			Some(Err(BackendError::Rejected("permission denied".into())))
		);
		assert_eq!(block_on(subscription.next()), None);
	}

	#[test]
	fn closing_discards_pending_events() {
		let (send, subscription) = Subscription::channel();
		send.try_send(Ok(Vec::new())).unwrap();
		subscription.close();
		assert_eq!(block_on(subscription.next()), None);
	}

	#[test]
	fn dropped_subscription_closes_channel() {
		let (send, subscription) = Subscription::channel();
		drop(subscription);
		assert!(send.is_closed());
	}
}
