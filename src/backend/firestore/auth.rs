use crate::{backend::Identity, session::SessionValue};
use serde::{Deserialize, Serialize};

/// Refresh the id token when it has less than this many seconds left.
const REFRESH_MARGIN_SECS: u64 = 60;
const DEFAULT_LIFETIME_SECS: u64 = 3600;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tokens {
	pub identity: Identity,
	pub id_token: String,
	pub refresh_token: String,
	/// Unix time (seconds) when `id_token` expires.
	pub expires_at: u64,
}
impl SessionValue for Tokens {
	fn id() -> &'static str {
		"inventory_auth"
	}
}
impl Tokens {
	pub fn new(identity: Identity, id_token: String, refresh_token: String, expires_in: &str, now: u64) -> Self {
		let lifetime = expires_in.trim().parse::<u64>().unwrap_or(DEFAULT_LIFETIME_SECS);
		Self {
			identity,
			id_token,
			refresh_token,
			expires_at: now.saturating_add(lifetime),
		}
	}

	pub fn is_stale(&self, now: u64) -> bool {
		now.saturating_add(REFRESH_MARGIN_SECS) >= self.expires_at
	}
}

pub fn now_secs() -> u64 {
	let now = wasm_timer::SystemTime::now();
	match now.duration_since(wasm_timer::UNIX_EPOCH) {
		Ok(elapsed) => elapsed.as_secs(),
		Err(_) => 0,
	}
}

// Browser session storage only exists on wasm; elsewhere a session lives as long as the client.
#[cfg(target_family = "wasm")]
pub fn restore() -> Option<Tokens> {
	Tokens::load()
}
#[cfg(not(target_family = "wasm"))]
pub fn restore() -> Option<Tokens> {
	None
}

#[cfg(target_family = "wasm")]
pub fn persist(tokens: &Tokens) {
	tokens.clone().apply_to_session();
}
#[cfg(not(target_family = "wasm"))]
pub fn persist(_tokens: &Tokens) {}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
	pub id_token: String,
	pub refresh_token: String,
	pub expires_in: String,
	pub local_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomTokenResponse {
	pub id_token: String,
	pub refresh_token: String,
	pub expires_in: String,
}

#[derive(Deserialize)]
pub struct LookupResponse {
	#[serde(default)]
	pub users: Vec<LookupUser>,
}
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupUser {
	pub local_id: String,
}

// The secure token endpoint answers in snake_case, unlike the identity toolkit.
#[derive(Deserialize)]
pub struct RefreshResponse {
	pub id_token: String,
	pub refresh_token: String,
	pub expires_in: String,
	pub user_id: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn identity() -> Identity {
		Identity {
			user_id: "u1".into(),
			anonymous: true,
		}
	}

	#[test]
	fn expiry_from_response() {
		let tokens = Tokens::new(identity(), "id".into(), "refresh".into(), "3600", 1_000);
		assert_eq!(tokens.expires_at, 4_600);
		assert!(!tokens.is_stale(1_000));
		assert!(!tokens.is_stale(4_539));
		assert!(tokens.is_stale(4_540));
	}

	#[test]
	fn unparsable_lifetime_uses_default() {
		let tokens = Tokens::new(identity(), "id".into(), "refresh".into(), "soon", 10);
		assert_eq!(tokens.expires_at, 10 + DEFAULT_LIFETIME_SECS);
	}

	#[test]
	fn refresh_response_is_snake_case() {
		let body = r#"{"expires_in":"3600","token_type":"Bearer","refresh_token":"r","id_token":"i","user_id":"u","project_id":"p"}"#;
		let response: RefreshResponse = serde_json::from_str(body).unwrap();
		assert_eq!(response.user_id, "u");
		assert_eq!(response.id_token, "i");
	}

	#[test]
	fn sign_up_response_is_camel_case() {
		let body = r#"{"kind":"identitytoolkit#SignupNewUserResponse","idToken":"i","refreshToken":"r","expiresIn":"3600","localId":"abc"}"#;
		let response: SignUpResponse = serde_json::from_str(body).unwrap();
		assert_eq!(response.local_id, "abc");
	}
}
