use crate::{
	backend::{Backend, Identity},
	context::use_app_context,
	error::Error,
	notice::Notice,
};
use gloo_storage::{SessionStorage, Storage};
use serde::{Deserialize, Serialize};
use yew::{html::ChildrenProps, prelude::*};
use yewdux::prelude::*;

/// A value kept in the browser's session storage, so it lives exactly as long as the tab session.
pub trait SessionValue {
	fn id() -> &'static str;

	fn load() -> Option<Self>
	where
		Self: for<'de> Deserialize<'de>,
	{
		SessionStorage::get::<Self>(Self::id()).ok()
	}

	fn apply_to_session(self)
	where
		Self: Sized + Serialize,
	{
		let _ = SessionStorage::set(Self::id(), self);
	}
}

/// Who the dashboard is acting as.
/// `ready` flips to true once sign-in has resolved, successfully or not.
#[derive(Clone, Debug, Default, PartialEq, Store)]
pub struct Session {
	pub ready: bool,
	pub identity: Option<Identity>,
}
impl Session {
	pub fn resolved(identity: Option<Identity>) -> Self {
		Self { ready: true, identity }
	}

	pub fn user_id(&self) -> Option<&str> {
		self.identity.as_ref().map(|identity| identity.user_id.as_str())
	}
}

/// Reuses an existing session if the backend has one, otherwise signs in with the
/// bootstrap token when given, and anonymously when not.
pub async fn resolve(backend: &dyn Backend, bootstrap_token: Option<&str>) -> Result<Identity, Error> {
	if let Some(identity) = backend.identity() {
		log::debug!(target: "session", "Reusing session {}", identity.user_id);
		return Ok(identity);
	}
	let signed_in = match bootstrap_token {
		Some(token) => backend.sign_in_with_token(token).await,
		None => backend.sign_in_anonymously().await,
	};
	let identity = signed_in.map_err(Error::Auth)?;
	log::info!(target: "session", "Signed in as {} (anonymous: {})", identity.user_id, identity.anonymous);
	Ok(identity)
}

#[function_component]
pub fn Provider(props: &ChildrenProps) -> Html {
	let context = use_app_context();
	yew_hooks::use_mount(move || {
		let dispatch = Dispatch::<Session>::new();
		dispatch.set(Session::default());
		wasm_bindgen_futures::spawn_local(async move {
			let token = context.initial_auth_token.as_deref();
			let identity = match resolve(&*context.backend, token).await {
				Ok(identity) => Some(identity),
				Err(err) => {
					log::error!(target: "session", "{err}");
					Notice::show_error(err.to_string());
					None
				}
			};
			dispatch.set(Session::resolved(identity));
		});
	});
	html! {<>{props.children.clone()}</>}
}
