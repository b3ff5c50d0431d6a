use crate::view::Counts;
use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct DashboardProps {
	pub counts: Counts,
}

#[function_component]
pub fn Dashboard(DashboardProps { counts }: &DashboardProps) -> Html {
	let tile = |label: &'static str, value: usize, color: &'static str| {
		html! {
			<div class="column">
				<div class="box has-text-centered">
					<p class="heading">{label}</p>
					<p class={classes!("title", color)}>{value}</p>
				</div>
			</div>
		}
	};
	html! {
		<div class="columns">
			{tile("Total Items", counts.total, "has-text-info")}
			{tile("Taken", counts.taken, "has-text-danger")}
			{tile("Not Taken", counts.not_taken, "has-text-success")}
		</div>
	}
}
