use leptos::prelude::*;

use super::graph_view::style;
use crate::graph::TypeCount;
use crate::view::GraphController;

fn type_rows(counts: Vec<TypeCount>, swatch: bool) -> impl IntoView {
	counts
		.into_iter()
		.map(|tc| {
			let color = style::node_color(&tc.kind);
			view! {
				<li>
					{swatch.then(|| view! { <span class="swatch" style:background-color=color /> })}
					<span class="type-name">{tc.kind}</span>
					<span class="type-count">{tc.count}</span>
				</li>
			}
		})
		.collect_view()
}

/// Node/edge counts per type, plus how many relationships were dropped.
#[component]
pub fn Legend(controller: GraphController) -> impl IntoView {
	let stats = controller.stats;
	let rejected = controller.rejected;

	move || {
		stats.get().map(|s| {
			view! {
				<aside class="legend">
					<p class="totals">
						{format!("{} nodes · {} edges", s.node_count, s.edge_count)}
					</p>
					<h3>"Entities"</h3>
					<ul>{type_rows(s.entity_types, true)}</ul>
					<h3>"Relationships"</h3>
					<ul>{type_rows(s.relationship_types, false)}</ul>
					<Show when=move || { rejected.get() > 0 }>
						<p class="rejected">
							{move || format!("{} relationships skipped", rejected.get())}
						</p>
					</Show>
				</aside>
			}
		})
	}
}
