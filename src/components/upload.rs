use crate::{
	context::use_app_context,
	error::Error,
	notice::Notice,
	session::Session,
	upload::{self, replace_inventory, UploadStatus},
};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, HtmlInputElement};
use yew::prelude::*;
use yewdux::prelude::*;

async fn read_text(file: File) -> Result<String, Error> {
	let text = JsFuture::from(file.text())
		.await
		.map_err(|err| Error::FileRead(err.as_string().unwrap_or_else(|| format!("{err:?}"))))?;
	text.as_string()
		.ok_or_else(|| Error::FileRead(format!("{} did not contain text", file.name())))
}

/// File picker that replaces the whole inventory with the chosen CSV.
#[function_component]
pub fn UploadForm() -> Html {
	let context = use_app_context();
	let identity = use_selector(|session: &Session| session.identity.clone());
	let (status, dispatch) = use_store::<UploadStatus>();

	let onchange = {
		let identity = identity.clone();
		Callback::from(move |evt: Event| {
			if dispatch.get().is_uploading() {
				return;
			}
			let Some(input) = evt.target().and_then(|target| target.dyn_into::<HtmlInputElement>().ok()) else {
				return;
			};
			let Some(file) = input.files().and_then(|files| files.get(0)) else {
				return;
			};
			log::info!(target: "upload", "Uploading {} ({} bytes)", file.name(), file.size());
			Notice::clear_error();

			let backend = context.backend.clone();
			let collection = context.collection.clone();
			let identity = (*identity).clone();
			let dispatch = dispatch.clone();
			wasm_bindgen_futures::spawn_local(async move {
				let result = replace_inventory(
					&*backend,
					&collection,
					identity.as_ref(),
					read_text(file),
					|phase| {
						dispatch.reduce_mut(move |status| status.phase = phase);
					},
				)
				.await;
				match result {
					Ok(count) => Notice::flash_success(upload::success_message(count)),
					Err(err) => Notice::show_error(upload::failure_message(&err)),
				}
				// Lets the same file be chosen again.
				input.set_value("");
			});
		})
	};

	html! {
		<div class="box">
			<div class="file is-primary">
				<label class="file-label">
					<input
						class="file-input" type="file" accept=".csv"
						disabled={status.is_uploading() || identity.is_none()}
						{onchange}
					/>
					<span class="file-cta">
						<span class="file-label">{match status.is_uploading() {
							true => "Uploading…",
							false => "Upload CSV",
						}}</span>
					</span>
				</label>
			</div>
			<p class="help">
				{match status.is_uploading() {
					true => status.phase.byline(),
					false => "Columns: name, category. Uploading replaces every item.",
				}}
			</p>
		</div>
	}
}
