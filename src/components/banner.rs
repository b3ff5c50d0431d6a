use crate::notice::Notice;
use yew::prelude::*;
use yewdux::prelude::*;

#[function_component]
pub fn Banners() -> Html {
	let notice = use_store_value::<Notice>();
	let success = notice.success.as_ref().map(|message| {
		let onclick = Callback::from(|_: MouseEvent| Notice::dismiss_success());
		html! {
			<div class="notification is-success is-light">
				<button class="delete" {onclick} />
				{message}
			</div>
		}
	});
	let error = notice.error.as_ref().map(|message| {
		let onclick = Callback::from(|_: MouseEvent| Notice::clear_error());
		html! {
			<div class="notification is-danger is-light">
				<button class="delete" {onclick} />
				{message}
			</div>
		}
	});
	html! {<>{success}{error}</>}
}
