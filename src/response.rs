use crate::backend::BackendError;
use reqwest::RequestBuilder;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub struct Response<T> {
	builder: RequestBuilder,
	marker: std::marker::PhantomData<T>,
}
impl<T> std::fmt::Debug for Response<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.builder.fmt(f)
	}
}
impl<T> Response<T>
where
	T: DeserializeOwned,
{
	pub fn from(builder: RequestBuilder) -> Self {
		Self {
			builder,
			marker: Default::default(),
		}
	}

	pub fn with_query<Q>(mut self, query: &Q) -> Self
	where
		Q: Serialize + ?Sized,
	{
		self.builder = self.builder.query(query);
		self
	}

	pub fn with_json<Q>(mut self, json: &Q) -> Self
	where
		Q: Serialize + ?Sized,
	{
		self.builder = self.builder.json(json);
		self
	}

	pub fn with_form<Q>(mut self, form: &Q) -> Self
	where
		Q: Serialize + ?Sized,
	{
		self.builder = self.builder.form(form);
		self
	}

	pub fn with_bearer(mut self, token: &str) -> Self {
		self.builder = self.builder.bearer_auth(token);
		self
	}

	pub async fn send(self) -> Result<T, BackendError> {
		let response = self.builder.send().await.map_err(network)?;
		let status = response.status();
		let text = response.text().await.map_err(network)?;
		if !status.is_success() {
			return Err(BackendError::Status {
				status: status.as_u16(),
				message: ApiError::message_of(&text).unwrap_or_else(|| status.to_string()),
			});
		}
		match serde_json::from_str(&text) {
			Ok(data) => Ok(data),
			Err(err) => Err(InvalidJson(text, err).into()),
		}
	}
}

fn network(err: reqwest::Error) -> BackendError {
	BackendError::Network(err.to_string())
}

/// Error body shared by the Google REST apis.
#[derive(Deserialize)]
struct ApiError {
	error: ApiErrorBody,
}
#[derive(Deserialize)]
struct ApiErrorBody {
	message: String,
}
impl ApiError {
	fn message_of(text: &str) -> Option<String> {
		let parsed = serde_json::from_str::<Self>(text).ok()?;
		Some(parsed.error.message)
	}
}

#[derive(thiserror::Error, Debug)]
pub struct InvalidJson(pub String, pub serde_json::Error);
impl std::fmt::Display for InvalidJson {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Invalid json: {:?}\nError: {:?}", self.0, self.1)
	}
}
impl From<InvalidJson> for BackendError {
	fn from(value: InvalidJson) -> Self {
		Self::InvalidJson(value.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn api_error_message() {
		let body = r#"{"error":{"code":400,"message":"INVALID_CUSTOM_TOKEN","status":"INVALID_ARGUMENT"}}"#;
		assert_eq!(ApiError::message_of(body), Some("INVALID_CUSTOM_TOKEN".into()));
		assert_eq!(ApiError::message_of("<html>bad gateway</html>"), None);
	}

	#[test]
	fn invalid_json_keeps_body() {
		let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
		let backend: BackendError = InvalidJson("{".into(), err).into();
		let BackendError::InvalidJson(message) = backend else {
			panic!("expected InvalidJson");
		};
		assert!(message.starts_with("Invalid json: \"{\""));
	}
}
