use leptos::prelude::*;

use super::graph_view::style;
use crate::graph::{GraphEdge, GraphModel};
use crate::view::GraphController;

fn edge_rows(model: &GraphModel, edges: Vec<&GraphEdge>, outgoing: bool) -> impl IntoView + use<> {
	edges
		.into_iter()
		.map(|e| {
			let other = if outgoing { &e.target } else { &e.source };
			let label = model
				.node(other)
				.map(|n| n.label.clone())
				.unwrap_or_else(|| other.clone());
			let text = if outgoing {
				format!("{} → {}", e.kind, label)
			} else {
				format!("{} ← {}", e.kind, label)
			};
			view! { <li>{text}</li> }
		})
		.collect_view()
}

/// Attributes and connections of the selected node.
#[component]
pub fn DetailsPanel(controller: GraphController) -> impl IntoView {
	let state = controller.state;
	let selection = controller.selection;

	move || {
		let id = selection.get()?;
		let model = state.with(|s| s.model().cloned())?;
		let node = model.node(&id)?.clone();
		let (outgoing, incoming) = model.incident_edges(&id);
		let outgoing = edge_rows(&model, outgoing, true);
		let incoming = edge_rows(&model, incoming, false);
		let color = style::node_color(&node.kind);
		let properties = node
			.properties
			.into_iter()
			.map(|(k, v)| view! { <tr><th>{k}</th><td>{v}</td></tr> })
			.collect_view();

		Some(view! {
			<aside class="details">
				<header>
					<span class="swatch" style:background-color=color />
					<h3>{node.label}</h3>
					<button class="close" title="Close" on:click=move |_| controller.clear_selection()>
						"×"
					</button>
				</header>
				<p class="kind">{node.kind}</p>
				<p class="mentions">{format!("Mentioned {} times", node.mentions)}</p>
				<table class="properties">{properties}</table>
				<h4>"Outgoing"</h4>
				<ul>{outgoing}</ul>
				<h4>"Incoming"</h4>
				<ul>{incoming}</ul>
			</aside>
		})
	}
}
