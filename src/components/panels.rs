//! Overlays shown on top of the canvas while no graph is displayed.

use leptos::prelude::*;

use crate::view::{GraphController, ViewState};

/// URL entry form shown while idle.
#[component]
pub fn IdlePanel(controller: GraphController) -> impl IntoView {
	let (url, set_url) = signal(String::new());

	let on_submit = move |ev: leptos::ev::SubmitEvent| {
		ev.prevent_default();
		controller.submit(url.get_untracked());
	};

	view! {
		<div class="panel idle-panel">
			<h2>"Build a knowledge graph"</h2>
			<p class="subtitle">"Paste an article URL. Entities and their relationships are extracted and drawn below."</p>
			<form on:submit=on_submit>
				<input
					type="url"
					placeholder="https://example.com/article"
					prop:value=move || url.get()
					on:input=move |ev| set_url.set(event_target_value(&ev))
				/>
				<button type="submit" disabled=move || url.get().trim().is_empty()>
					"Generate"
				</button>
			</form>
		</div>
	}
}

#[component]
pub fn LoadingPanel(progress: Signal<u8>, step: Signal<String>) -> impl IntoView {
	view! {
		<div class="panel loading-panel">
			<div class="spinner" />
			<p class="step">{move || step.get()}</p>
			<div class="progress">
				<div class="progress-bar" style:width=move || format!("{}%", progress.get()) />
			</div>
			<p class="percent">{move || format!("{}%", progress.get())}</p>
		</div>
	}
}

#[component]
pub fn ErrorPanel(controller: GraphController, message: Signal<String>) -> impl IntoView {
	view! {
		<div class="panel error-panel">
			<h2>"Could not build the graph"</h2>
			<p class="error-message">{move || message.get()}</p>
			<button on:click=move |_| controller.retry()>"Try again"</button>
		</div>
	}
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Overlay {
	Idle,
	Loading,
	Error,
	None,
}

/// Picks the overlay for the current view state. Nothing is overlaid while a
/// graph is displayed.
#[component]
pub fn StatePanels(controller: GraphController) -> impl IntoView {
	let state = controller.state;
	// progress updates must not rebuild the loading panel
	let overlay = Memo::new(move |_| match state.get() {
		ViewState::Idle => Overlay::Idle,
		ViewState::Loading { .. } => Overlay::Loading,
		ViewState::Error(_) => Overlay::Error,
		ViewState::Displayed { .. } => Overlay::None,
	});
	let progress = Signal::derive(move || match state.get() {
		ViewState::Loading { progress, .. } => progress,
		_ => 0,
	});
	let step = Signal::derive(move || match state.get() {
		ViewState::Loading { step, .. } => step,
		_ => String::new(),
	});
	let message = Signal::derive(move || match state.get() {
		ViewState::Error(err) => err.message(),
		_ => String::new(),
	});

	move || match overlay.get() {
		Overlay::Idle => view! { <IdlePanel controller=controller /> }.into_any(),
		Overlay::Loading => view! { <LoadingPanel progress=progress step=step /> }.into_any(),
		Overlay::Error => view! { <ErrorPanel controller=controller message=message /> }.into_any(),
		Overlay::None => ().into_any(),
	}
}
