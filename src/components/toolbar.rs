use leptos::prelude::*;

use super::graph_view::Layout;
use crate::view::GraphController;

/// Layout, zoom and export controls for the displayed graph.
#[component]
pub fn Toolbar(controller: GraphController) -> impl IntoView {
	let current = Memo::new(move |_| controller.layout());
	let step = controller.zoom_step();

	let layout_buttons = Layout::ALL
		.into_iter()
		.map(|layout| {
			view! {
				<button
					class="layout-button"
					class:active=move || current.get() == Some(layout)
					title=layout.name()
					on:click=move |_| controller.change_layout(layout.name())
				>
					{layout.title()}
				</button>
			}
		})
		.collect_view();

	view! {
		<div class="toolbar">
			<div class="toolbar-group">{layout_buttons}</div>
			<div class="toolbar-group">
				<button title="Zoom out" on:click=move |_| controller.zoom_by(-step)>"−"</button>
				<span class="zoom-level">
					{move || format!("{:.0}%", controller.zoom.get() * 100.0)}
				</span>
				<button title="Zoom in" on:click=move |_| controller.zoom_by(step)>"+"</button>
				<button title="Fit to view" on:click=move |_| controller.fit()>"Fit"</button>
			</div>
			<div class="toolbar-group">
				<button on:click=move |_| controller.export_raster()>"PNG"</button>
				<button on:click=move |_| controller.export_payload()>"JSON"</button>
				<button class="reset" on:click=move |_| controller.retry()>"New URL"</button>
			</div>
			<Show when=move || controller.notice.get().is_some()>
				<p class="notice">{move || controller.notice.get().unwrap_or_default()}</p>
			</Show>
		</div>
	}
}
