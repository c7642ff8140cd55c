//! Top-level view lifecycle: idle → loading → displayed / error.
//!
//! Every event is total over every state. Responses carry the
//! [`RequestToken`] of the submission they answer and are dropped unless that
//! token is still the pending one, so a slow reply to an earlier URL can never
//! replace the graph of a later one.

use std::sync::Arc;

use log::{debug, error, info};
use serde_json::Value;

use crate::components::graph_view::{
	Layout, PointerRelease, RenderEngine, RenderSession, SessionId, SurfaceExtent,
};
use crate::config::ViewConfig;
use crate::error::{RenderError, RequestError, ViewError};
use crate::graph::{self, GraphModel, GraphStats, RejectedEdge};

/// Identifies one submission. Strictly increasing per machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState {
	Idle,
	Loading { progress: u8, step: String },
	Error(ViewError),
	Displayed {
		model: Arc<GraphModel>,
		layout: Layout,
		selection: Option<String>,
	},
}

impl ViewState {
	pub fn is_loading(&self) -> bool {
		matches!(self, ViewState::Loading { .. })
	}

	pub fn model(&self) -> Option<&Arc<GraphModel>> {
		match self {
			ViewState::Displayed { model, .. } => Some(model),
			_ => None,
		}
	}

	pub fn selection(&self) -> Option<&str> {
		match self {
			ViewState::Displayed { selection, .. } => selection.as_deref(),
			_ => None,
		}
	}
}

#[derive(Clone, Debug)]
pub enum ViewEvent {
	Submit(String),
	Progress {
		token: RequestToken,
		progress: u8,
		step: String,
	},
	Success {
		token: RequestToken,
		payload: Value,
	},
	Failure {
		token: RequestToken,
		error: RequestError,
	},
	Retry,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
	Applied,
	/// The event answered a submission that is no longer pending, or has no
	/// effect in the current state.
	Ignored,
}

/// Title and URL of the processed article, when the backend sends them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArticleInfo {
	pub title: Option<String>,
	pub url: Option<String>,
}

impl ArticleInfo {
	fn from_payload(payload: &Value) -> Option<Self> {
		let info = payload.get("article_info")?;
		let text = |key: &str| info.get(key).and_then(Value::as_str).map(str::to_string);
		Some(Self {
			title: text("title"),
			url: text("url"),
		})
	}
}

pub struct ViewMachine {
	state: ViewState,
	engine: RenderEngine,
	surface: SurfaceExtent,
	config: ViewConfig,
	next_token: u64,
	pending: Option<RequestToken>,
	stats: Option<GraphStats>,
	rejected: Vec<RejectedEdge>,
	article: Option<ArticleInfo>,
}

impl ViewMachine {
	pub fn new(config: ViewConfig) -> Self {
		Self {
			state: ViewState::Idle,
			engine: RenderEngine::new(config.min_zoom, config.max_zoom),
			surface: SurfaceExtent::default(),
			config,
			next_token: 1,
			pending: None,
			stats: None,
			rejected: Vec::new(),
			article: None,
		}
	}

	pub fn state(&self) -> &ViewState {
		&self.state
	}

	pub fn config(&self) -> &ViewConfig {
		&self.config
	}

	pub fn stats(&self) -> Option<&GraphStats> {
		self.stats.as_ref()
	}

	pub fn rejected(&self) -> &[RejectedEdge] {
		&self.rejected
	}

	pub fn article(&self) -> Option<&ArticleInfo> {
		self.article.as_ref()
	}

	pub fn session(&self) -> Option<&RenderSession> {
		self.engine.session()
	}

	pub fn session_id(&self) -> Option<SessionId> {
		self.engine.session().map(RenderSession::id)
	}

	pub fn live_sessions(&self) -> usize {
		self.engine.live_sessions()
	}

	pub fn zoom_level(&self) -> Option<f64> {
		self.engine.session().map(|s| s.scene.zoom_level())
	}

	pub fn selection(&self) -> Option<&str> {
		self.state.selection()
	}

	pub fn set_surface(&mut self, surface: SurfaceExtent) {
		self.surface = surface;
		self.engine.resize(surface);
	}

	/// Start a new request, abandoning whatever was pending or displayed.
	pub fn submit(&mut self, url: &str) -> RequestToken {
		self.engine.unmount();
		let token = RequestToken(self.next_token);
		self.next_token += 1;
		self.pending = Some(token);
		self.stats = None;
		self.rejected.clear();
		self.article = None;
		info!("submitting {} as request {:?}", url, token);
		self.state = ViewState::Loading {
			progress: 0,
			step: "starting".to_string(),
		};
		token
	}

	pub fn handle(&mut self, event: ViewEvent) -> Outcome {
		match event {
			ViewEvent::Submit(url) => {
				self.submit(&url);
				Outcome::Applied
			}
			ViewEvent::Retry => self.retry(),
			ViewEvent::Progress {
				token,
				progress,
				step,
			} => {
				if !self.is_pending(token) {
					return Outcome::Ignored;
				}
				self.state = ViewState::Loading { progress, step };
				Outcome::Applied
			}
			ViewEvent::Success { token, payload } => {
				if !self.is_pending(token) {
					debug!("discarding stale response for {:?}", token);
					return Outcome::Ignored;
				}
				self.pending = None;
				self.display(&payload);
				Outcome::Applied
			}
			ViewEvent::Failure { token, error } => {
				if !self.is_pending(token) {
					debug!("discarding stale failure for {:?}", token);
					return Outcome::Ignored;
				}
				self.pending = None;
				error!("request failed: {}", error);
				self.state = ViewState::Error(error.into());
				Outcome::Applied
			}
		}
	}

	/// Apply the backend's answer to `token`. Returns the session that
	/// should get the settle-delay fit: only when the answer was current and
	/// a graph is now displayed.
	pub fn respond(
		&mut self,
		token: RequestToken,
		result: Result<Value, RequestError>,
	) -> Option<SessionId> {
		let event = match result {
			Ok(payload) => ViewEvent::Success { token, payload },
			Err(error) => ViewEvent::Failure { token, error },
		};
		match self.handle(event) {
			Outcome::Applied if self.state.model().is_some() => self.session_id(),
			_ => None,
		}
	}

	fn is_pending(&self, token: RequestToken) -> bool {
		self.pending == Some(token) && self.state.is_loading()
	}

	fn retry(&mut self) -> Outcome {
		match self.state {
			ViewState::Idle => Outcome::Ignored,
			_ => {
				self.engine.unmount();
				self.pending = None;
				self.stats = None;
				self.rejected.clear();
				self.article = None;
				self.state = ViewState::Idle;
				Outcome::Applied
			}
		}
	}

	fn display(&mut self, payload: &Value) {
		let output = match graph::build(payload) {
			Ok(output) => output,
			Err(err) => {
				error!("invalid response format: {}", err);
				self.state = ViewState::Error(err.into());
				return;
			}
		};
		let model = Arc::new(output.model);
		let layout = Layout::default();
		if let Err(err) = self.engine.mount(Arc::clone(&model), layout, self.surface) {
			error!("{}", err);
			self.state = ViewState::Error(err.into());
			return;
		}
		if !output.rejected.is_empty() {
			info!("{} relationships rejected", output.rejected.len());
		}
		self.stats = Some(graph::aggregate(&model));
		self.rejected = output.rejected;
		self.article = ArticleInfo::from_payload(payload);
		self.state = ViewState::Displayed {
			model,
			layout,
			selection: None,
		};
	}

	fn live_id(&self) -> Result<SessionId, RenderError> {
		self.session_id().ok_or(RenderError::NotMounted)
	}

	pub fn change_layout(&mut self, name: &str) -> Result<Layout, RenderError> {
		let id = self.live_id()?;
		let layout = self.engine.relayout(id, name)?;
		if let ViewState::Displayed { layout: current, .. } = &mut self.state {
			*current = layout;
		}
		Ok(layout)
	}

	pub fn zoom(&mut self, delta: f64) -> Result<f64, RenderError> {
		let id = self.live_id()?;
		self.engine.zoom(id, delta)
	}

	pub fn fit(&mut self) -> Result<f64, RenderError> {
		let id = self.live_id()?;
		self.engine.fit(id, self.config.fit_padding)
	}

	/// The settle-delay fit of a freshly mounted session.
	pub fn deferred_fit(&mut self, id: SessionId) -> Option<f64> {
		self.engine.deferred_fit(id, self.config.fit_padding)
	}

	/// Select `id` if it is a node of the displayed model.
	pub fn select_node(&mut self, id: &str) -> bool {
		match &mut self.state {
			ViewState::Displayed {
				model, selection, ..
			} if model.node(id).is_some() => {
				*selection = Some(id.to_string());
				true
			}
			_ => false,
		}
	}

	pub fn clear_selection(&mut self) {
		if let ViewState::Displayed { selection, .. } = &mut self.state {
			*selection = None;
		}
	}

	/// JSON of the validated model on display.
	pub fn export_payload(&self) -> Result<String, RenderError> {
		let model = self.state.model().ok_or(RenderError::NotMounted)?;
		model.to_json().map_err(|e| RenderError::Export(e.to_string()))
	}

	pub fn tick(&mut self, dt: f32) {
		if let Some(session) = self.engine.session_mut() {
			session.scene.tick(dt);
		}
	}

	pub fn pointer_down(&mut self, x: f64, y: f64) {
		if let Some(session) = self.engine.session_mut() {
			session.scene.press(x, y);
		}
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		if let Some(session) = self.engine.session_mut() {
			session.scene.pointer_move(x, y);
		}
	}

	/// Finish a pointer gesture; clicks update the selection.
	pub fn pointer_up(&mut self) -> PointerRelease {
		let release = match self.engine.session_mut() {
			Some(session) => session.scene.release(),
			None => return PointerRelease::Gesture,
		};
		match &release {
			PointerRelease::NodeClick(id) => {
				self.select_node(id);
			}
			PointerRelease::BackgroundClick => self.clear_selection(),
			PointerRelease::Gesture => {}
		}
		release
	}

	pub fn pointer_leave(&mut self) {
		if let Some(session) = self.engine.session_mut() {
			session.scene.leave();
		}
	}

	/// Wheel zoom anchored at the cursor.
	pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) -> Option<f64> {
		let session = self.engine.session_mut()?;
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		session.scene.zoom_at(x, y, factor);
		Some(session.scene.zoom_level())
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn machine() -> ViewMachine {
		let mut m = ViewMachine::new(ViewConfig::default());
		m.set_surface(SurfaceExtent::new(800.0, 600.0));
		m
	}

	fn payload() -> Value {
		json!({
			"entities": [
				{ "id": "a", "name": "Alice", "type": "PERSON" },
				{ "id": "b", "name": "Acme", "type": "ORGANIZATION" }
			],
			"relationships": [
				{ "source": "a", "target": "b", "type": "works_at" },
				{ "source": "a", "target": "zzz", "type": "bad" }
			]
		})
	}

	#[test]
	fn submit_enters_loading_at_zero() {
		let mut m = machine();
		m.submit("https://example.com/a");
		assert_eq!(
			m.state(),
			&ViewState::Loading {
				progress: 0,
				step: "starting".into()
			}
		);
	}

	#[test]
	fn progress_is_displayed_as_reported() {
		let mut m = machine();
		let token = m.submit("u");
		m.handle(ViewEvent::Progress {
			token,
			progress: 60,
			step: "Extracting entities".into(),
		});
		m.handle(ViewEvent::Progress {
			token,
			progress: 40,
			step: "Chunking text".into(),
		});
		assert!(matches!(m.state(), ViewState::Loading { progress: 40, .. }));
	}

	#[test]
	fn success_mounts_force_directed_without_selection() {
		let mut m = machine();
		let token = m.submit("u");
		assert_eq!(
			m.handle(ViewEvent::Success {
				token,
				payload: payload()
			}),
			Outcome::Applied
		);
		match m.state() {
			ViewState::Displayed {
				model,
				layout,
				selection,
			} => {
				assert_eq!(model.nodes().len(), 2);
				assert_eq!(model.edges().len(), 1);
				assert_eq!(*layout, Layout::ForceDirected);
				assert!(selection.is_none());
			}
			other => panic!("unexpected state {other:?}"),
		}
		assert_eq!(m.rejected().len(), 1);
		assert_eq!(m.stats().map(|s| s.edge_count), Some(1));
		assert_eq!(m.live_sessions(), 1);
	}

	#[test]
	fn invalid_payload_goes_to_error() {
		let mut m = machine();
		let token = m.submit("u");
		m.handle(ViewEvent::Success {
			token,
			payload: json!({ "relationships": [] }),
		});
		match m.state() {
			ViewState::Error(err) => {
				assert!(matches!(err, ViewError::Payload(_)));
				assert!(err.message().starts_with("invalid response format"));
			}
			other => panic!("unexpected state {other:?}"),
		}
		assert_eq!(m.live_sessions(), 0);
	}

	#[test]
	fn unsized_surface_is_a_render_error() {
		let mut m = ViewMachine::new(ViewConfig::default());
		let token = m.submit("u");
		m.handle(ViewEvent::Success {
			token,
			payload: payload(),
		});
		assert!(matches!(
			m.state(),
			ViewState::Error(ViewError::Render(RenderError::SurfaceUnready { .. }))
		));
	}

	#[test]
	fn failure_then_retry_returns_to_idle() {
		let mut m = machine();
		let token = m.submit("u");
		m.handle(ViewEvent::Failure {
			token,
			error: RequestError::NotFound,
		});
		assert!(matches!(m.state(), ViewState::Error(ViewError::Request(_))));
		assert_eq!(m.handle(ViewEvent::Retry), Outcome::Applied);
		assert_eq!(m.state(), &ViewState::Idle);
		assert_eq!(m.handle(ViewEvent::Retry), Outcome::Ignored);
	}

	#[test]
	fn stale_response_is_discarded() {
		let mut m = machine();
		let first = m.submit("first");
		let second = m.submit("second");
		assert_eq!(
			m.handle(ViewEvent::Success {
				token: first,
				payload: payload()
			}),
			Outcome::Ignored
		);
		assert!(m.state().is_loading());
		assert_eq!(
			m.handle(ViewEvent::Failure {
				token: first,
				error: RequestError::Forbidden
			}),
			Outcome::Ignored
		);
		assert_eq!(
			m.handle(ViewEvent::Success {
				token: second,
				payload: payload()
			}),
			Outcome::Applied
		);
		// a late duplicate of an already applied response
		assert_eq!(
			m.handle(ViewEvent::Success {
				token: second,
				payload: json!({})
			}),
			Outcome::Ignored
		);
		assert!(m.state().model().is_some());
	}

	#[test]
	fn retry_while_loading_cancels_the_request() {
		let mut m = machine();
		let token = m.submit("u");
		m.handle(ViewEvent::Retry);
		assert_eq!(m.state(), &ViewState::Idle);
		assert_eq!(
			m.handle(ViewEvent::Success {
				token,
				payload: payload()
			}),
			Outcome::Ignored
		);
		assert_eq!(m.state(), &ViewState::Idle);
	}

	#[test]
	fn resubmitting_tears_down_the_session() {
		let mut m = machine();
		let token = m.submit("u");
		m.handle(ViewEvent::Success {
			token,
			payload: payload(),
		});
		let first = m.session_id().unwrap();
		m.submit("v");
		assert_eq!(m.live_sessions(), 0);
		assert_eq!(m.deferred_fit(first), None);
	}

	#[test]
	fn selection_survives_relayout() {
		let mut m = machine();
		let token = m.submit("u");
		m.handle(ViewEvent::Success {
			token,
			payload: payload(),
		});
		assert!(m.select_node("b"));
		assert!(!m.select_node("zzz"));
		assert_eq!(m.change_layout("grid"), Ok(Layout::Grid));
		assert_eq!(m.selection(), Some("b"));
		assert_eq!(
			m.change_layout("sideways"),
			Err(RenderError::InvalidLayout("sideways".into()))
		);
		m.clear_selection();
		assert_eq!(m.selection(), None);
	}

	#[test]
	fn commands_without_a_graph_report_not_mounted() {
		let mut m = machine();
		assert_eq!(m.zoom(0.2), Err(RenderError::NotMounted));
		assert_eq!(m.fit(), Err(RenderError::NotMounted));
		assert_eq!(m.export_payload(), Err(RenderError::NotMounted));
		assert!(!m.select_node("a"));
	}

	#[test]
	fn export_is_the_validated_model() {
		let mut m = machine();
		let token = m.submit("u");
		m.handle(ViewEvent::Success {
			token,
			payload: payload(),
		});
		let exported: Value = serde_json::from_str(&m.export_payload().unwrap()).unwrap();
		assert_eq!(exported["nodes"].as_array().map(Vec::len), Some(2));
		assert_eq!(exported["edges"].as_array().map(Vec::len), Some(1));
		assert!(exported.get("relationships").is_none());
	}

	#[test]
	fn article_info_is_picked_up_from_the_envelope() {
		let mut m = machine();
		let token = m.submit("u");
		m.handle(ViewEvent::Success {
			token,
			payload: json!({
				"success": true,
				"graph": payload(),
				"article_info": { "title": "Acme hires Alice", "url": "https://example.com/a" }
			}),
		});
		assert_eq!(
			m.article().and_then(|a| a.title.as_deref()),
			Some("Acme hires Alice")
		);
	}
}
