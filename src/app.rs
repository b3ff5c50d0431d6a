use crate::{
	components::{Banners, Dashboard, FilterBar, Header, ItemList, UploadForm},
	context::AppContext,
	inventory::{self, Inventory},
	session,
	view::{Filters, View},
};
use yew::prelude::*;
use yewdux::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct AppProps {
	pub context: AppContext,
}

#[function_component]
pub fn App(AppProps { context }: &AppProps) -> Html {
	html! {
		<ContextProvider<AppContext> context={context.clone()}>
			<session::Provider>
				<inventory::Provider>
					<section class="section">
						<div class="container">
							<Header />
							<Banners />
							<UploadForm />
							<Contents />
						</div>
					</section>
				</inventory::Provider>
			</session::Provider>
		</ContextProvider<AppContext>>
	}
}

#[function_component]
fn Contents() -> Html {
	let inventory = use_store_value::<Inventory>();
	let filters = use_store_value::<Filters>();
	let view = use_memo((inventory.clone(), filters), |(inventory, filters)| {
		View::compute(inventory.items(), filters)
	});
	html! {<>
		<Dashboard counts={view.counts} />
		<FilterBar />
		<ItemList items={view.displayed.clone()} loading={inventory.is_loading()} />
	</>}
}
