use inventory_dashboard::{config::Config, context::AppContext, logging};

#[cfg(target_family = "wasm")]
fn main() {
	use inventory_dashboard::app::{App, AppProps};

	logging::init();
	let config = Config::load();
	let context = AppContext::new(&config);
	yew::Renderer::<App>::with_props(AppProps { context }).render();
}

// The dashboard only renders in a browser.
#[cfg(not(target_family = "wasm"))]
fn main() {
	logging::init();
	let config = Config::load();
	let context = AppContext::new(&config);
	log::error!(
		target: env!("CARGO_PKG_NAME"),
		"build for wasm32 and serve the page to a browser (configured collection: {})",
		context.collection
	);
}
