//! Reactive shell around [`ViewMachine`]: the observables and commands the
//! page chrome binds to.

use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;
use leptos::task::spawn_local;
use log::{info, warn};

use super::machine::{ArticleInfo, Outcome, RequestToken, ViewEvent, ViewMachine, ViewState};
use super::request::{self, PROGRESS_STEPS};
use crate::components::graph_view::{Layout, SessionId, SurfaceExtent, export};
use crate::config::{ApiConfig, ViewConfig};
use crate::error::{RenderError, RequestError};
use crate::graph::GraphStats;

#[derive(Clone, Copy)]
pub struct GraphController {
	machine: StoredValue<ViewMachine, LocalStorage>,
	api: StoredValue<ApiConfig>,
	pub state: RwSignal<ViewState>,
	pub zoom: RwSignal<f64>,
	pub selection: RwSignal<Option<String>>,
	pub stats: RwSignal<Option<GraphStats>>,
	pub rejected: RwSignal<usize>,
	pub article: RwSignal<Option<ArticleInfo>>,
	/// Last command failure that does not change the view state.
	pub notice: RwSignal<Option<String>>,
}

impl GraphController {
	pub fn new(api: ApiConfig, view: ViewConfig) -> Self {
		Self {
			machine: StoredValue::new_local(ViewMachine::new(view)),
			api: StoredValue::new(api),
			state: RwSignal::new(ViewState::Idle),
			zoom: RwSignal::new(1.0),
			selection: RwSignal::new(None),
			stats: RwSignal::new(None),
			rejected: RwSignal::new(0),
			article: RwSignal::new(None),
			notice: RwSignal::new(None),
		}
	}

	pub fn machine(self) -> StoredValue<ViewMachine, LocalStorage> {
		self.machine
	}

	/// Copy machine state into the signals.
	fn publish(self) {
		let snapshot = self.machine.try_with_value(|m| {
			(
				m.state().clone(),
				m.zoom_level(),
				m.stats().cloned(),
				m.rejected().len(),
				m.article().cloned(),
			)
		});
		let Some((state, zoom, stats, rejected, article)) = snapshot else {
			return;
		};
		self.selection.set(state.selection().map(str::to_string));
		self.state.set(state);
		self.zoom.set(zoom.unwrap_or(1.0));
		self.stats.set(stats);
		self.rejected.set(rejected);
		self.article.set(article);
	}

	fn report(self, result: Result<f64, RenderError>) {
		match result {
			Ok(k) => {
				self.zoom.set(k);
				self.notice.set(None);
			}
			Err(err) => self.fail_command(err),
		}
	}

	fn fail_command(self, err: RenderError) {
		warn!("{}", err);
		self.notice.set(Some(err.to_string()));
	}

	pub fn submit(self, url: String) {
		let url = url.trim().to_string();
		if url.is_empty() {
			return;
		}
		let Some(token) = self.machine.try_update_value(|m| m.submit(&url)) else {
			return;
		};
		self.notice.set(None);
		self.publish();

		for &(delay, progress, step) in PROGRESS_STEPS {
			set_timeout(
				move || {
					self.dispatch(ViewEvent::Progress {
						token,
						progress,
						step: step.to_string(),
					});
				},
				delay,
			);
		}

		let api = self.api.get_value();
		spawn_local(async move {
			let result = request::fetch_graph(&api, &url).await;
			self.complete(token, result);
		});
	}

	fn complete(self, token: RequestToken, result: Result<serde_json::Value, RequestError>) {
		let Some(mounted) = self.machine.try_update_value(|m| m.respond(token, result)) else {
			return;
		};
		self.publish();
		if let Some(id) = mounted {
			self.schedule_fit(id);
		}
	}

	fn dispatch(self, event: ViewEvent) -> Outcome {
		let outcome = self
			.machine
			.try_update_value(|m| m.handle(event))
			.unwrap_or(Outcome::Ignored);
		if outcome == Outcome::Applied {
			self.publish();
		}
		outcome
	}

	/// One fit of `id` after the surface has settled. Skipped if `id` has
	/// been replaced by then.
	fn schedule_fit(self, id: SessionId) {
		let Some(delay) = self.machine.try_with_value(|m| m.config().settle_delay) else {
			return;
		};
		set_timeout(move || self.deferred_fit(id), delay);
	}

	fn deferred_fit(self, id: SessionId) {
		if let Some(Some(k)) = self.machine.try_update_value(|m| m.deferred_fit(id)) {
			self.zoom.set(k);
		}
	}

	pub fn retry(self) {
		self.notice.set(None);
		self.dispatch(ViewEvent::Retry);
	}

	pub fn change_layout(self, name: &str) {
		let Some(result) = self.machine.try_update_value(|m| m.change_layout(name)) else {
			return;
		};
		match result {
			Ok(layout) => {
				self.notice.set(None);
				self.publish();
				if !layout.is_simulated() {
					self.fit();
				} else if let Some(Some(id)) = self.machine.try_with_value(|m| m.session_id()) {
					self.schedule_fit(id);
				}
			}
			Err(err) => self.fail_command(err),
		}
	}

	pub fn zoom_by(self, delta: f64) {
		if let Some(result) = self.machine.try_update_value(|m| m.zoom(delta)) {
			self.report(result);
		}
	}

	pub fn zoom_step(self) -> f64 {
		self.machine
			.try_with_value(|m| m.config().zoom_step)
			.unwrap_or(0.2)
	}

	pub fn fit(self) {
		if let Some(result) = self.machine.try_update_value(|m| m.fit()) {
			self.report(result);
		}
	}

	pub fn select_node(self, id: &str) {
		self.machine.try_update_value(|m| m.select_node(id));
		self.publish();
	}

	pub fn clear_selection(self) {
		self.machine.try_update_value(|m| m.clear_selection());
		self.publish();
	}

	pub fn layout(self) -> Option<Layout> {
		match self.state.get() {
			ViewState::Displayed { layout, .. } => Some(layout),
			_ => None,
		}
	}

	pub fn export_raster(self) {
		let result = self.machine.try_with_value(|m| {
			let session = m.session().ok_or(RenderError::NotMounted)?;
			export::raster_data_url(&session.scene, m.selection(), m.config().export_scale)
		});
		match result {
			Some(Ok(href)) => {
				if let Err(err) = export::download(&href, "knowledge-graph.png") {
					self.fail_command(err);
				}
			}
			Some(Err(err)) => self.fail_command(err),
			None => {}
		}
	}

	pub fn export_payload(self) {
		match self.machine.try_with_value(|m| m.export_payload()) {
			Some(Ok(json)) => {
				let href = export::json_data_url(&json);
				if let Err(err) = export::download(&href, "knowledge-graph.json") {
					self.fail_command(err);
				}
			}
			Some(Err(err)) => self.fail_command(err),
			None => {}
		}
	}

	pub fn set_surface(self, width: f64, height: f64) {
		self.machine
			.try_update_value(|m| m.set_surface(SurfaceExtent::new(width, height)));
	}

	pub fn pointer_down(self, x: f64, y: f64) {
		self.machine.try_update_value(|m| m.pointer_down(x, y));
	}

	pub fn pointer_move(self, x: f64, y: f64) {
		self.machine.try_update_value(|m| m.pointer_move(x, y));
	}

	pub fn pointer_up(self) {
		let before = self.selection.get_untracked();
		let after = self.machine.try_update_value(|m| {
			m.pointer_up();
			m.selection().map(str::to_string)
		});
		if let Some(after) = after {
			if after != before {
				info!("selection: {:?}", after);
				self.publish();
			}
		}
	}

	pub fn pointer_leave(self) {
		self.machine.try_update_value(|m| m.pointer_leave());
	}

	pub fn wheel(self, x: f64, y: f64, delta_y: f64) {
		if let Some(Some(k)) = self.machine.try_update_value(|m| m.wheel(x, y, delta_y)) {
			self.zoom.set(k);
		}
	}
}
