use crate::{backend::BackendError, data::csv::FormatError};

/// Every failure the dashboard can show to the user.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
	#[error("Authentication failed: {0}")]
	Auth(BackendError),
	#[error("Failed to load inventory: {0}")]
	Subscription(BackendError),
	#[error(transparent)]
	Format(#[from] FormatError),
	#[error("Could not read file: {0}")]
	FileRead(String),
	#[error("{0}")]
	Write(BackendError),
	#[error("You must be signed in to make changes.")]
	Authorization,
}
