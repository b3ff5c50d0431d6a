use crate::{
	backend::{Backend, CollectionPath, DocumentId, FieldValue, Fields, Identity},
	error::Error,
};

pub static UPDATE_FAILED: &str = "Failed to update item status.";

/// Flips the stored `taken` flag of one item. The mirror is not touched here;
/// the change arrives with the next snapshot.
pub async fn toggle_taken(
	backend: &dyn Backend,
	collection: &CollectionPath,
	identity: Option<&Identity>,
	id: &DocumentId,
	currently_taken: bool,
) -> Result<(), Error> {
	let Some(identity) = identity else {
		return Err(Error::Authorization);
	};
	let mut fields = Fields::new();
	fields.insert("taken".into(), FieldValue::from(!currently_taken));
	log::debug!(target: "interaction", "{} sets {id} taken={}", identity.user_id, !currently_taken);
	backend.update_fields(collection, id, fields).await.map_err(Error::Write)
}

/// The message shown for a failed toggle.
pub fn failure_message(err: &Error) -> String {
	match err {
		Error::Authorization => err.to_string(),
		_ => UPDATE_FAILED.to_owned(),
	}
}
