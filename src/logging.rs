use log::Level;

fn max_level() -> Level {
	match cfg!(debug_assertions) {
		true => Level::Debug,
		false => Level::Info,
	}
}

#[cfg(target_family = "wasm")]
pub fn init() {
	console_error_panic_hook::set_once();
	wasm_logger::init(wasm_logger::Config::new(max_level()));
}

#[cfg(not(target_family = "wasm"))]
pub fn init() {
	let _ = simplelog::TermLogger::init(
		max_level().to_level_filter(),
		simplelog::Config::default(),
		simplelog::TerminalMode::Mixed,
		simplelog::ColorChoice::Auto,
	);
}
