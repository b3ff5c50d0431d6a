use crate::{inventory::Inventory, view::Filters};
use wasm_bindgen::JsCast;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yewdux::prelude::*;

/// Category chips and the name search box.
#[function_component]
pub fn FilterBar() -> Html {
	let categories = use_selector(|inventory: &Inventory| inventory.categories().to_vec());
	let (filters, dispatch) = use_store::<Filters>();

	let chips = categories.iter().map(|category| {
		let mut classes = classes!("button", "is-small", "is-rounded");
		if *category == filters.category {
			classes.push("is-link");
		}
		let onclick = dispatch.reduce_mut_callback({
			let category = category.clone();
			move |filters| filters.category = category.clone()
		});
		html! {
			<button class={classes} {onclick}>{category}</button>
		}
	});

	let oninput = dispatch.reduce_mut_callback_with(|filters, evt: InputEvent| {
		let Some(input) = evt.target().and_then(|target| target.dyn_into::<HtmlInputElement>().ok()) else {
			return;
		};
		filters.search = input.value();
	});

	html! {
		<div class="box">
			<div class="buttons">{for chips}</div>
			<input
				class="input" type="search" placeholder="Search by name"
				value={filters.search.clone()} {oninput}
			/>
		</div>
	}
}
