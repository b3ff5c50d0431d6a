use crate::session::Session;
use yew::prelude::*;
use yewdux::prelude::*;

#[function_component]
pub fn Header() -> Html {
	let session = use_store_value::<Session>();
	let user = match (session.ready, session.user_id()) {
		(_, Some(user_id)) => html! {<>{"Signed in as "}<code>{user_id}</code></>},
		(false, None) => html! {{"Signing in…"}},
		(true, None) => html! {{"Not signed in"}},
	};
	html! {
		<header class="level mb-5">
			<div class="level-left">
				<h1 class="title level-item">{"Inventory Dashboard"}</h1>
			</div>
			<div class="level-right">
				<span class="level-item is-size-7 has-text-grey">{user}</span>
			</div>
		</header>
	}
}
