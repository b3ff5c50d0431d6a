//! Replacing the whole inventory with the content of a CSV file.

use crate::{
	backend::{Backend, CollectionPath, Identity, WriteBatch},
	data::csv,
	error::Error,
};
use std::future::Future;
use yewdux::prelude::*;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Phase {
	#[default]
	Idle,
	Reading,
	Parsing,
	Replacing,
	Committing,
	Success(usize),
	Failed(String),
}
impl Phase {
	pub fn is_active(&self) -> bool {
		matches!(self, Self::Reading | Self::Parsing | Self::Replacing | Self::Committing)
	}

	pub fn byline(&self) -> &'static str {
		match self {
			Self::Idle => "",
			Self::Reading => "Reading file",
			Self::Parsing => "Checking rows",
			Self::Replacing => "Collecting current items",
			Self::Committing => "Saving items",
			Self::Success(_) => "Upload complete",
			Self::Failed(_) => "Upload failed",
		}
	}
}

/// Progress of the one upload allowed at a time.
#[derive(Clone, Debug, Default, PartialEq, Store)]
pub struct UploadStatus {
	pub phase: Phase,
}
impl UploadStatus {
	pub fn is_uploading(&self) -> bool {
		self.phase.is_active()
	}
}

pub fn success_message(count: usize) -> String {
	format!("Successfully uploaded {count} items!")
}

pub fn failure_message(err: &Error) -> String {
	format!("Upload Failed: {err}")
}

/// Reads the file, parses it, and swaps the collection's content for the parsed items
/// in one atomic batch. Returns how many items were written.
///
/// Current documents are listed before the batch is built, so a document another
/// client adds in between survives the replace.
pub async fn replace_inventory<R>(
	backend: &dyn Backend,
	collection: &CollectionPath,
	identity: Option<&Identity>,
	read: R,
	mut on_phase: impl FnMut(Phase),
) -> Result<usize, Error>
where
	R: Future<Output = Result<String, Error>>,
{
	let result = replace(backend, collection, identity, read, &mut on_phase).await;
	match &result {
		Ok(count) => on_phase(Phase::Success(*count)),
		Err(err) => {
			log::error!(target: "upload", "{err}");
			on_phase(Phase::Failed(failure_message(err)));
		}
	}
	on_phase(Phase::Idle);
	result
}

async fn replace<R>(
	backend: &dyn Backend,
	collection: &CollectionPath,
	identity: Option<&Identity>,
	read: R,
	on_phase: &mut impl FnMut(Phase),
) -> Result<usize, Error>
where
	R: Future<Output = Result<String, Error>>,
{
	if identity.is_none() {
		return Err(Error::Authorization);
	}

	on_phase(Phase::Reading);
	let text = read.await?;

	on_phase(Phase::Parsing);
	let items = csv::parse_non_empty(&text)?;

	on_phase(Phase::Replacing);
	let existing = backend.list_documents(collection).await.map_err(Error::Write)?;

	on_phase(Phase::Committing);
	let mut batch = WriteBatch::new(collection.clone());
	for document in existing {
		batch.delete(document.id);
	}
	for item in &items {
		batch.insert(item.to_fields());
	}
	log::info!(
		target: "upload",
		"Replacing {} documents with {} items",
		batch.len() - items.len(),
		items.len()
	);
	backend.commit(batch).await.map_err(Error::Write)?;
	Ok(items.len())
}
