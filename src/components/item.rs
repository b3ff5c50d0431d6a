use crate::{
	context::use_app_context,
	data::Item,
	interaction::{self, toggle_taken},
	notice::Notice,
	session::Session,
	util::spawn_local,
};
use yew::prelude::*;
use yewdux::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct ItemListProps {
	pub items: Vec<Item>,
	pub loading: bool,
}

#[function_component]
pub fn ItemList(ItemListProps { items, loading }: &ItemListProps) -> Html {
	let session = use_store_value::<Session>();
	if !session.ready {
		return html! {<p class="has-text-grey">{"Signing in…"}</p>};
	}
	if *loading && items.is_empty() {
		return html! {<p class="has-text-grey">{"Loading inventory…"}</p>};
	}
	if items.is_empty() {
		return html! {<p class="has-text-grey">{"No items to show."}</p>};
	}
	html! {
		<table class="table is-fullwidth is-striped">
			<thead>
				<tr><th>{"Name"}</th><th>{"Category"}</th><th>{"Status"}</th><th /></tr>
			</thead>
			<tbody>
				{for items.iter().filter_map(|item| {
					let id = item.id.as_ref()?;
					Some(html! {<ItemRow key={id.to_string()} item={item.clone()} />})
				})}
			</tbody>
		</table>
	}
}

#[derive(Clone, PartialEq, Properties)]
pub struct ItemRowProps {
	pub item: Item,
}

#[function_component]
pub fn ItemRow(ItemRowProps { item }: &ItemRowProps) -> Html {
	let context = use_app_context();
	let identity = use_selector(|session: &Session| session.identity.clone());

	let onclick = {
		let item = item.clone();
		let identity = identity.clone();
		Callback::from(move |_: MouseEvent| {
			let Some(id) = item.id.clone() else {
				return;
			};
			let backend = context.backend.clone();
			let collection = context.collection.clone();
			let identity = (*identity).clone();
			let taken = item.taken;
			spawn_local("interaction", async move {
				let result = toggle_taken(&*backend, &collection, identity.as_ref(), &id, taken).await;
				if let Err(err) = &result {
					Notice::show_error(interaction::failure_message(err));
				}
				result
			});
		})
	};

	let (status, action, button_class) = match item.taken {
		true => (html! {<span class="tag is-danger is-light">{"Taken"}</span>}, "Return", "is-success"),
		false => (html! {<span class="tag is-success is-light">{"Available"}</span>}, "Take Item", "is-danger"),
	};
	html! {
		<tr>
			<td>{&item.name}</td>
			<td>{&item.category}</td>
			<td>{status}</td>
			<td class="has-text-right">
				<button
					class={classes!("button", "is-small", button_class)}
					disabled={identity.is_none()}
					{onclick}
				>
					{action}
				</button>
			</td>
		</tr>
	}
}
