use yewdux::prelude::*;

/// How long a success message stays up.
pub const SUCCESS_TIMEOUT_MS: u32 = 5_000;

/// The single user-visible message slot, plus the upload confirmation banner.
#[derive(Clone, Debug, Default, PartialEq, Store)]
pub struct Notice {
	pub error: Option<String>,
	pub success: Option<String>,
	// Bumped for every success message so an older timer cannot clear a newer one.
	success_generation: u64,
}

impl Notice {
	pub fn set_error(&mut self, message: impl Into<String>) {
		self.error = Some(message.into());
	}

	pub fn set_success(&mut self, message: impl Into<String>) -> u64 {
		self.success = Some(message.into());
		self.success_generation += 1;
		self.success_generation
	}

	pub fn expire_success(&mut self, generation: u64) {
		if self.success_generation == generation {
			self.success = None;
		}
	}

	pub fn show_error(message: impl Into<String>) {
		let message = message.into();
		Dispatch::<Self>::new().reduce_mut(move |notice| notice.set_error(message));
	}

	pub fn clear_error() {
		Dispatch::<Self>::new().reduce_mut(|notice| notice.error = None);
	}

	pub fn dismiss_success() {
		Dispatch::<Self>::new().reduce_mut(|notice| notice.success = None);
	}

	/// Shows the message and clears it again after [`SUCCESS_TIMEOUT_MS`].
	pub fn flash_success(message: impl Into<String>) {
		let expire = Self::post_success(Dispatch::<Self>::new(), message.into());
		gloo_timers::callback::Timeout::new(SUCCESS_TIMEOUT_MS, expire).forget();
	}

	/// Shows the message now; the returned closure takes it down again unless a newer one replaced it.
	fn post_success(dispatch: Dispatch<Self>, message: String) -> impl FnOnce() + 'static {
		dispatch.reduce_mut(|notice| {
			notice.set_success(message);
		});
		let generation = dispatch.get().success_generation;
		move || {
			dispatch.reduce_mut(|notice| notice.expire_success(generation));
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn stale_timer_keeps_newer_message() {
		let mut notice = Notice::default();
		let first = notice.set_success("Successfully uploaded 3 items!");
		let second = notice.set_success("Successfully uploaded 4 items!");
		notice.expire_success(first);
		assert_eq!(notice.success.as_deref(), Some("Successfully uploaded 4 items!"));
		notice.expire_success(second);
		assert_eq!(notice.success, None);
	}

	#[test]
	fn error_slot_holds_latest() {
		let mut notice = Notice::default();
		notice.set_error("first");
		notice.set_error("second");
		assert_eq!(notice.error.as_deref(), Some("second"));
		assert_eq!(notice.success, None);
	}

	#[test]
	fn success_stays_up_five_seconds() {
		assert_eq!(SUCCESS_TIMEOUT_MS, 5_000);
	}

	#[test]
	fn timer_clears_only_its_own_message() {
		let dispatch = Dispatch::<Notice>::new();
		let first = Notice::post_success(dispatch.clone(), "Successfully uploaded 3 items!".into());
		let second = Notice::post_success(dispatch.clone(), "Successfully uploaded 4 items!".into());
		first();
		assert_eq!(dispatch.get().success.as_deref(), Some("Successfully uploaded 4 items!"));
		second();
		assert_eq!(dispatch.get().success, None);
	}
}
