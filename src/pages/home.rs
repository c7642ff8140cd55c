use leptos::prelude::*;

use crate::components::details::DetailsPanel;
use crate::components::graph_view::GraphCanvas;
use crate::components::legend::Legend;
use crate::components::panels::StatePanels;
use crate::components::toolbar::Toolbar;
use crate::config::{ApiConfig, ViewConfig};
use crate::view::GraphController;

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let controller = GraphController::new(ApiConfig::default(), ViewConfig::default());
	let displayed = move || controller.state.with(|s| s.model().is_some());
	let title = move || {
		controller
			.article
			.get()
			.and_then(|a| a.title)
			.unwrap_or_else(|| "Knowledge Graph".to_string())
	};

	view! {
		<div class="fullscreen-graph">
			<GraphCanvas controller=controller />
			<div class="graph-overlay">
				<h1>{title}</h1>
				<Show when=displayed>
					<p class="subtitle">
						"Drag nodes to reposition. Scroll to zoom. Drag background to pan. Click a node for details."
					</p>
				</Show>
			</div>
			<StatePanels controller=controller />
			<Show when=displayed>
				<Toolbar controller=controller />
				<Legend controller=controller />
				<DetailsPanel controller=controller />
			</Show>
		</div>
	}
}
