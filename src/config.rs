use serde::Deserialize;

pub static DEFAULT_NAMESPACE_ROOT: &str = "artifacts";
pub static DEFAULT_APP_ID: &str = "default-app-id";

/// A setting named by a page global on wasm and an environment variable elsewhere.
/// Either way the build environment can bake in a fallback.
struct Setting {
	global: &'static str,
	variable: &'static str,
	built_in: Option<&'static str>,
}

static FIREBASE_CONFIG: Setting = Setting {
	global: "__firebase_config",
	variable: "INVENTORY_FIREBASE_CONFIG",
	built_in: option_env!("INVENTORY_FIREBASE_CONFIG"),
};
static APP_ID: Setting = Setting {
	global: "__app_id",
	variable: "INVENTORY_APP_ID",
	built_in: option_env!("INVENTORY_APP_ID"),
};
static AUTH_TOKEN: Setting = Setting {
	global: "__initial_auth_token",
	variable: "INVENTORY_AUTH_TOKEN",
	built_in: option_env!("INVENTORY_AUTH_TOKEN"),
};

/// Connection parameters of the cloud project. Keys other than these are ignored.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseConfig {
	pub api_key: String,
	pub project_id: String,
}

/// Deployment settings injected when the page starts.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
	/// `None` runs the dashboard against the in-memory backend.
	pub firebase: Option<FirebaseConfig>,
	pub namespace_root: String,
	pub app_id: String,
	pub initial_auth_token: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
	#[error("invalid backend configuration: {0}")]
	Firebase(#[from] serde_json::Error),
	#[error("app id {0:?} cannot be used as a path segment")]
	AppId(String),
}

impl Default for Config {
	fn default() -> Self {
		Self {
			firebase: None,
			namespace_root: DEFAULT_NAMESPACE_ROOT.to_owned(),
			app_id: DEFAULT_APP_ID.to_owned(),
			initial_auth_token: None,
		}
	}
}

impl Config {
	/// Builds the configuration from raw settings. Blank values count as absent.
	pub fn from_raw(
		firebase_json: Option<&str>,
		app_id: Option<&str>,
		initial_auth_token: Option<&str>,
	) -> Result<Self, ConfigError> {
		fn present(value: Option<&str>) -> Option<&str> {
			value.map(str::trim).filter(|value| !value.is_empty())
		}
		let firebase = match present(firebase_json) {
			Some(json) => Some(serde_json::from_str::<FirebaseConfig>(json)?),
			None => None,
		};
		let app_id = present(app_id).unwrap_or(DEFAULT_APP_ID);
		if app_id.contains('/') {
			return Err(ConfigError::AppId(app_id.to_owned()));
		}
		Ok(Self {
			firebase,
			namespace_root: DEFAULT_NAMESPACE_ROOT.to_owned(),
			app_id: app_id.to_owned(),
			initial_auth_token: present(initial_auth_token).map(str::to_owned),
		})
	}

	/// Reads the settings of this process, falling back to the in-memory backend if they are unusable.
	pub fn load() -> Self {
		let firebase = FIREBASE_CONFIG.read();
		let app_id = APP_ID.read();
		let token = AUTH_TOKEN.read();
		match Self::from_raw(firebase.as_deref(), app_id.as_deref(), token.as_deref()) {
			Ok(config) => config,
			Err(err) => {
				log::error!(target: "config", "{err}; falling back to the in-memory backend");
				Self::default()
			}
		}
	}
}

impl Setting {
	#[cfg(target_family = "wasm")]
	fn read(&self) -> Option<String> {
		use wasm_bindgen::JsValue;

		let value = js_sys::Reflect::get(&gloo_utils::window(), &JsValue::from_str(self.global)).ok();
		let from_page = value.filter(|value| !value.is_undefined() && !value.is_null()).and_then(|value| {
			if let Some(text) = value.as_string() {
				return Some(text);
			}
			// Objects are accepted too; re-encode them so every setting parses the same way.
			let parsed = serde_wasm_bindgen::from_value::<serde_json::Value>(value).ok()?;
			Some(parsed.to_string())
		});
		if from_page.is_none() && self.built_in.is_some() {
			log::debug!(target: "config", "{} not set by the page, using build-time {}", self.global, self.variable);
		}
		from_page.or_else(|| self.built_in.map(str::to_owned))
	}

	#[cfg(not(target_family = "wasm"))]
	fn read(&self) -> Option<String> {
		let from_env = std::env::var(self.variable).ok();
		if from_env.is_none() && self.built_in.is_some() {
			log::debug!(target: "config", "{} ({}) not set, using build-time value", self.variable, self.global);
		}
		from_env.or_else(|| self.built_in.map(str::to_owned))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_without_settings() {
		let config = Config::from_raw(None, None, None).unwrap();
		assert_eq!(config, Config::default());
		assert_eq!(config.app_id, "default-app-id");
	}

	#[test]
	fn reads_firebase_settings() {
		let json = r#"{"apiKey":"abc","authDomain":"x.firebaseapp.com","projectId":"inventory-demo","appId":"1:2:web:3"}"#;
		let config = Config::from_raw(Some(json), Some("warehouse"), Some("tok")).unwrap();
		assert_eq!(
			config.firebase,
			Some(FirebaseConfig {
				api_key: "abc".into(),
				project_id: "inventory-demo".into(),
			})
		);
		assert_eq!(config.app_id, "warehouse");
		assert_eq!(config.initial_auth_token.as_deref(), Some("tok"));
	}

	#[test]
	fn blank_values_are_absent() {
		let config = Config::from_raw(Some("  "), Some(""), Some(" ")).unwrap();
		assert_eq!(config, Config::default());
	}

	#[test]
	fn rejects_bad_values() {
		assert!(matches!(Config::from_raw(Some("{"), None, None), Err(ConfigError::Firebase(_))));
		assert!(matches!(
			Config::from_raw(Some(r#"{"apiKey":"abc"}"#), None, None),
			Err(ConfigError::Firebase(_))
		));
		assert!(matches!(Config::from_raw(None, Some("a/b"), None), Err(ConfigError::AppId(_))));
	}
}
