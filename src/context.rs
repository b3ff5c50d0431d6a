use crate::{
	backend::{firestore, memory::MemoryBackend, Backend, CollectionPath},
	config::Config,
};
use std::rc::Rc;
use yew::prelude::*;

/// Handles shared by the whole component tree, created once at start-up.
/// Dropping the last clone releases the backend client.
#[derive(Clone)]
pub struct AppContext {
	pub backend: Rc<dyn Backend>,
	pub collection: Rc<CollectionPath>,
	pub initial_auth_token: Option<Rc<str>>,
}

impl PartialEq for AppContext {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.backend, &other.backend) && self.collection == other.collection
	}
}

impl AppContext {
	pub fn new(config: &Config) -> Self {
		let backend: Rc<dyn Backend> = match &config.firebase {
			Some(firebase) => {
				log::info!(target: "context", "Using project {}", firebase.project_id);
				Rc::new(firestore::Client::new(firebase))
			}
			None => {
				log::warn!(target: "context", "No backend configured, items are kept in this page only");
				Rc::new(MemoryBackend::new())
			}
		};
		Self::with_backend(backend, config)
	}

	pub fn with_backend(backend: Rc<dyn Backend>, config: &Config) -> Self {
		Self {
			backend,
			collection: Rc::new(CollectionPath::inventory(&config.namespace_root, &config.app_id)),
			initial_auth_token: config.initial_auth_token.as_deref().map(Rc::from),
		}
	}
}

#[hook]
pub fn use_app_context() -> AppContext {
	use_context::<AppContext>().expect("AppContext is provided by the app root")
}
