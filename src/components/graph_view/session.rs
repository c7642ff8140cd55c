//! One live render session per drawing surface.
//!
//! The engine owns the slot; a session is addressed by its [`SessionId`] so
//! late callers (deferred fits, stale teardown) can tell whether the session
//! they were scheduled for is still the mounted one.

use std::fmt;
use std::sync::Arc;

use log::{debug, info};

use super::layout::Layout;
use super::state::SceneState;
use crate::error::RenderError;
use crate::graph::GraphModel;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
	pub fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for SessionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Pixel size of the drawing surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceExtent {
	pub width: f64,
	pub height: f64,
}

impl SurfaceExtent {
	pub fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	pub fn is_empty(&self) -> bool {
		!(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
	}
}

/// A mounted model and its scene.
pub struct RenderSession {
	id: SessionId,
	model: Arc<GraphModel>,
	layout: Layout,
	pub scene: SceneState,
}

impl RenderSession {
	pub fn id(&self) -> SessionId {
		self.id
	}

	pub fn model(&self) -> &Arc<GraphModel> {
		&self.model
	}

	pub fn layout(&self) -> Layout {
		self.layout
	}
}

pub struct RenderEngine {
	slot: Option<RenderSession>,
	next_id: u64,
	zoom_bounds: (f64, f64),
}

impl RenderEngine {
	pub fn new(min_zoom: f64, max_zoom: f64) -> Self {
		Self {
			slot: None,
			next_id: 1,
			zoom_bounds: (min_zoom, max_zoom),
		}
	}

	/// Tear down whatever is mounted, then mount `model` with `layout`.
	pub fn mount(
		&mut self,
		model: Arc<GraphModel>,
		layout: Layout,
		surface: SurfaceExtent,
	) -> Result<SessionId, RenderError> {
		self.unmount();
		if surface.is_empty() {
			return Err(RenderError::SurfaceUnready {
				width: surface.width,
				height: surface.height,
			});
		}

		let id = SessionId(self.next_id);
		self.next_id += 1;
		let scene = SceneState::new(&model, layout, surface.width, surface.height, self.zoom_bounds);
		info!(
			"mounted session {} ({} nodes, {} edges, {})",
			id,
			model.nodes().len(),
			model.edges().len(),
			layout
		);
		self.slot = Some(RenderSession {
			id,
			model,
			layout,
			scene,
		});
		Ok(id)
	}

	/// Drop the mounted session, if any. Safe to call repeatedly.
	pub fn unmount(&mut self) -> Option<SessionId> {
		let session = self.slot.take()?;
		debug!("unmounted session {}", session.id);
		Some(session.id)
	}

	pub fn session(&self) -> Option<&RenderSession> {
		self.slot.as_ref()
	}

	pub fn session_mut(&mut self) -> Option<&mut RenderSession> {
		self.slot.as_mut()
	}

	pub fn is_live(&self, id: SessionId) -> bool {
		self.slot.as_ref().is_some_and(|s| s.id == id)
	}

	pub fn live_sessions(&self) -> usize {
		usize::from(self.slot.is_some())
	}

	fn live(&mut self, id: SessionId) -> Result<&mut RenderSession, RenderError> {
		match self.slot.as_mut() {
			Some(session) if session.id == id => Ok(session),
			_ => Err(RenderError::StaleSession(id.get())),
		}
	}

	/// Re-run a named layout on the mounted node set.
	pub fn relayout(&mut self, id: SessionId, name: &str) -> Result<Layout, RenderError> {
		let layout: Layout = name.parse()?;
		let session = self.live(id)?;
		let model = Arc::clone(&session.model);
		session.scene.apply_layout(layout, &model);
		session.layout = layout;
		info!("session {} relaid out as {}", id, layout);
		Ok(layout)
	}

	pub fn zoom(&mut self, id: SessionId, delta: f64) -> Result<f64, RenderError> {
		let session = self.live(id)?;
		session.scene.zoom_by(delta);
		Ok(session.scene.zoom_level())
	}

	pub fn fit(&mut self, id: SessionId, padding: f64) -> Result<f64, RenderError> {
		let session = self.live(id)?;
		session.scene.fit(padding);
		Ok(session.scene.zoom_level())
	}

	/// Fit scheduled before `id` might have been replaced. A no-op unless
	/// `id` is still the mounted session.
	pub fn deferred_fit(&mut self, id: SessionId, padding: f64) -> Option<f64> {
		match self.fit(id, padding) {
			Ok(k) => Some(k),
			Err(_) => {
				debug!("skipping deferred fit for session {}", id);
				None
			}
		}
	}

	pub fn resize(&mut self, surface: SurfaceExtent) {
		if surface.is_empty() {
			return;
		}
		if let Some(session) = self.slot.as_mut() {
			session.scene.resize(surface.width, surface.height);
		}
	}
}
