//! Cloud Firestore over its REST api, with sign-in through the Identity Toolkit.
//!
//! The REST surface has no push channel, so live queries poll the collection and
//! only emit when its content changed. Every successful write wakes the pollers of
//! this client so local changes show up without waiting for the next tick.

use super::{
	Backend, BackendError, CollectionPath, Document, DocumentId, Fields, Identity, SnapshotEvent, Subscription,
	Write, WriteBatch,
};
use crate::{config::FirebaseConfig, response::Response};
use futures_util::future::{FutureExt, LocalBoxFuture};
use serde::{de::IgnoredAny, Deserialize};
use serde_json::json;
use std::{cell::RefCell, rc::Rc};

mod auth;
use auth::*;
pub mod value;
use value::RawDocument;

static FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com/v1";
static IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";
static SECURE_TOKEN_ENDPOINT: &str = "https://securetoken.googleapis.com/v1/token";
const PAGE_SIZE: usize = 300;
const POLL_INTERVAL_MS: u32 = 3_000;

#[derive(Clone)]
pub struct Client(Rc<Inner>);

struct Inner {
	http: reqwest::Client,
	api_key: String,
	project_id: String,
	tokens: RefCell<Option<Tokens>>,
	wakers: RefCell<Vec<async_channel::Sender<()>>>,
}

impl Client {
	pub fn new(config: &FirebaseConfig) -> Self {
		let tokens = restore();
		if let Some(tokens) = &tokens {
			log::debug!(target: "firestore", "Restored session for {}", tokens.identity.user_id);
		}
		Self(Rc::new(Inner {
			http: reqwest::Client::new(),
			api_key: config.api_key.clone(),
			project_id: config.project_id.clone(),
			tokens: RefCell::new(tokens),
			wakers: RefCell::new(Vec::new()),
		}))
	}

	fn database_name(&self) -> String {
		format!("projects/{}/databases/(default)", self.0.project_id)
	}

	fn document_name(&self, collection: &CollectionPath, id: &DocumentId) -> String {
		format!("{}/documents/{collection}/{id}", self.database_name())
	}

	fn collection_url(&self, collection: &CollectionPath) -> String {
		format!("{FIRESTORE_ENDPOINT}/{}/documents/{collection}", self.database_name())
	}

	fn identity_request<T>(&self, method: &str) -> Response<T>
	where
		T: serde::de::DeserializeOwned,
	{
		let url = format!("{IDENTITY_ENDPOINT}/accounts:{method}");
		Response::from(self.0.http.post(url)).with_query(&[("key", self.0.api_key.as_str())])
	}

	fn store_tokens(&self, tokens: Tokens) -> Identity {
		persist(&tokens);
		let identity = tokens.identity.clone();
		*self.0.tokens.borrow_mut() = Some(tokens);
		identity
	}

	async fn sign_up(&self) -> Result<Identity, BackendError> {
		let response = self
			.identity_request::<SignUpResponse>("signUp")
			.with_json(&json!({ "returnSecureToken": true }))
			.send()
			.await?;
		let identity = Identity {
			user_id: response.local_id,
			anonymous: true,
		};
		let tokens = Tokens::new(
			identity,
			response.id_token,
			response.refresh_token,
			&response.expires_in,
			now_secs(),
		);
		Ok(self.store_tokens(tokens))
	}

	async fn sign_in_custom(&self, token: &str) -> Result<Identity, BackendError> {
		let response = self
			.identity_request::<CustomTokenResponse>("signInWithCustomToken")
			.with_json(&json!({ "token": token, "returnSecureToken": true }))
			.send()
			.await?;
		// The custom token exchange does not report the user id.
		let lookup = self
			.identity_request::<LookupResponse>("lookup")
			.with_json(&json!({ "idToken": response.id_token }))
			.send()
			.await?;
		let Some(user) = lookup.users.into_iter().next() else {
			return Err(BackendError::Rejected("signed in user could not be looked up".into()));
		};
		let identity = Identity {
			user_id: user.local_id,
			anonymous: false,
		};
		let tokens = Tokens::new(
			identity,
			response.id_token,
			response.refresh_token,
			&response.expires_in,
			now_secs(),
		);
		Ok(self.store_tokens(tokens))
	}

	async fn refresh(&self, stale: Tokens) -> Result<Tokens, BackendError> {
		log::debug!(target: "firestore", "Refreshing id token for {}", stale.identity.user_id);
		let request = self.0.http.post(SECURE_TOKEN_ENDPOINT);
		let response = Response::<RefreshResponse>::from(request)
			.with_query(&[("key", self.0.api_key.as_str())])
			.with_form(&[
				("grant_type", "refresh_token"),
				("refresh_token", stale.refresh_token.as_str()),
			])
			.send()
			.await?;
		let identity = Identity {
			user_id: response.user_id,
			anonymous: stale.identity.anonymous,
		};
		let tokens = Tokens::new(
			identity,
			response.id_token,
			response.refresh_token,
			&response.expires_in,
			now_secs(),
		);
		self.store_tokens(tokens.clone());
		Ok(tokens)
	}

	/// A valid id token, refreshed first if it is about to expire.
	async fn bearer(&self) -> Result<String, BackendError> {
		let tokens = self.0.tokens.borrow().clone();
		let Some(tokens) = tokens else {
			return Err(BackendError::NotSignedIn);
		};
		if !tokens.is_stale(now_secs()) {
			return Ok(tokens.id_token);
		}
		Ok(self.refresh(tokens).await?.id_token)
	}

	async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, BackendError> {
		#[derive(Deserialize)]
		#[serde(rename_all = "camelCase")]
		struct Page {
			#[serde(default)]
			documents: Vec<RawDocument>,
			#[serde(default)]
			next_page_token: Option<String>,
		}

		// Reads are allowed before sign-in completes if the rules permit it.
		let bearer = match self.bearer().await {
			Ok(token) => Some(token),
			Err(BackendError::NotSignedIn) => None,
			Err(err) => return Err(err),
		};
		let url = self.collection_url(collection);
		let mut documents = Vec::new();
		let mut page_token: Option<String> = None;
		loop {
			let mut query = vec![("pageSize", PAGE_SIZE.to_string())];
			if let Some(token) = &page_token {
				query.push(("pageToken", token.clone()));
			}
			let mut request = Response::<Page>::from(self.0.http.get(&url)).with_query(&query);
			if let Some(token) = &bearer {
				request = request.with_bearer(token);
			}
			let page = request.send().await?;
			for raw in page.documents {
				let name = raw.name.clone();
				match value::decode_document(raw) {
					Some(document) => documents.push(document),
					None => log::warn!(target: "firestore", "Skipping unreadable document {name:?}"),
				}
			}
			match page.next_page_token {
				Some(token) if !token.is_empty() => page_token = Some(token),
				_ => break,
			}
		}
		Ok(documents)
	}

	async fn write_batch(&self, batch: WriteBatch) -> Result<(), BackendError> {
		let token = self.bearer().await?;
		let collection = batch.collection();
		let writes = batch
			.writes()
			.iter()
			.map(|write| match write {
				Write::Delete(id) => json!({ "delete": self.document_name(collection, id) }),
				Write::Insert(fields) => json!({
					"update": {
						"name": self.document_name(collection, &DocumentId::generate()),
						"fields": value::encode_fields(fields),
					},
					"currentDocument": { "exists": false },
				}),
			})
			.collect::<Vec<_>>();
		let url = format!("{FIRESTORE_ENDPOINT}/{}/documents:commit", self.database_name());
		log::debug!(target: "firestore", "Committing {} writes to {collection}", writes.len());
		Response::<IgnoredAny>::from(self.0.http.post(url))
			.with_bearer(&token)
			.with_json(&json!({ "writes": writes }))
			.send()
			.await?;
		self.wake_subscribers();
		Ok(())
	}

	async fn patch(&self, collection: &CollectionPath, id: &DocumentId, fields: Fields) -> Result<(), BackendError> {
		let token = self.bearer().await?;
		let raw_url = format!("{}/{id}", self.collection_url(collection));
		let mut url = url::Url::parse(&raw_url).map_err(|err| BackendError::Rejected(format!("{raw_url}: {err}")))?;
		{
			let mut query = url.query_pairs_mut();
			for key in fields.keys() {
				query.append_pair("updateMask.fieldPaths", key);
			}
			query.append_pair("currentDocument.exists", "true");
		}
		Response::<IgnoredAny>::from(self.0.http.patch(url))
			.with_bearer(&token)
			.with_json(&json!({ "fields": value::encode_fields(&fields) }))
			.send()
			.await?;
		self.wake_subscribers();
		Ok(())
	}

	/// Registers a wake-up channel for a new watcher, dropping those of stopped watchers.
	fn register_waker(&self) -> async_channel::Receiver<()> {
		let (wake_send, wake_recv) = async_channel::unbounded();
		let mut wakers = self.0.wakers.borrow_mut();
		wakers.retain(|waker| !waker.is_closed());
		wakers.push(wake_send);
		wake_recv
	}

	fn wake_subscribers(&self) {
		self.0.wakers.borrow_mut().retain(|waker| waker.try_send(()).is_ok());
	}

	async fn watch(
		&self,
		collection: CollectionPath,
		send: async_channel::Sender<SnapshotEvent>,
		wake: async_channel::Receiver<()>,
	) {
		let mut last: Option<Vec<Document>> = None;
		let mut failing = false;
		while !send.is_closed() {
			match self.list(&collection).await {
				Ok(documents) => {
					if failing {
						log::info!(target: "firestore", "Live query on {collection} recovered");
						failing = false;
					}
					if last.as_ref() != Some(&documents) {
						last = Some(documents.clone());
						if send.send(Ok(documents)).await.is_err() {
							break;
						}
					}
				}
				Err(err) if ends_watch(&err) => {
					log::error!(target: "firestore", "Live query on {collection} stopped: {err}");
					let _ = send.send(Err(err)).await;
					break;
				}
				Err(err) => {
					log::warn!(target: "firestore", "Live query on {collection} failed, retrying: {err}");
					// Report once per outage; later polls stay quiet until one succeeds.
					if !failing {
						failing = true;
						if send.send(Err(err)).await.is_err() {
							break;
						}
					}
				}
			}
			let tick = gloo_timers::future::TimeoutFuture::new(POLL_INTERVAL_MS);
			let woken = wake.recv();
			futures_util::future::select(Box::pin(tick), Box::pin(woken)).await;
		}
		wake.close();
		log::debug!(target: "firestore", "Live query on {collection} stopped");
	}
}

/// Whether a failed poll stops the live query. Rejections of the caller or a missing
/// collection path stay that way; network failures and server errors are retried.
fn ends_watch(err: &BackendError) -> bool {
	match err {
		BackendError::Status { status, .. } => matches!(status, 401 | 403 | 404),
		BackendError::NotSignedIn | BackendError::Rejected(_) => true,
		BackendError::Network(_) | BackendError::InvalidJson(_) => false,
	}
}

impl Backend for Client {
	fn identity(&self) -> Option<Identity> {
		self.0.tokens.borrow().as_ref().map(|tokens| tokens.identity.clone())
	}

	fn sign_in_anonymously(&self) -> LocalBoxFuture<'_, Result<Identity, BackendError>> {
		self.sign_up().boxed_local()
	}

	fn sign_in_with_token<'a>(&'a self, token: &'a str) -> LocalBoxFuture<'a, Result<Identity, BackendError>> {
		self.sign_in_custom(token).boxed_local()
	}

	fn subscribe(&self, collection: &CollectionPath) -> Subscription {
		let (send, subscription) = Subscription::channel();
		let wake_recv = self.register_waker();
		let client = self.clone();
		let collection = collection.clone();
		wasm_bindgen_futures::spawn_local(async move {
			client.watch(collection, send, wake_recv).await;
		});
		subscription
	}

	fn list_documents<'a>(
		&'a self,
		collection: &'a CollectionPath,
	) -> LocalBoxFuture<'a, Result<Vec<Document>, BackendError>> {
		self.list(collection).boxed_local()
	}

	fn commit(&self, batch: WriteBatch) -> LocalBoxFuture<'_, Result<(), BackendError>> {
		self.write_batch(batch).boxed_local()
	}

	fn update_fields<'a>(
		&'a self,
		collection: &'a CollectionPath,
		id: &'a DocumentId,
		fields: Fields,
	) -> LocalBoxFuture<'a, Result<(), BackendError>> {
		self.patch(collection, id, fields).boxed_local()
	}
}
