use std::collections::{HashMap, HashSet};

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::layout::{self, Layout};
use super::style;
use crate::graph::GraphModel;

/// Extra world-space slack around a node's disc for hit testing.
pub const HIT_SLOP: f64 = 4.0;
/// Pointer travel (screen px) below which a press/release counts as a click.
pub const CLICK_TOLERANCE: f64 = 4.0;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
	pub label: String,
	pub color: &'static str,
	pub radius: f64,
}

#[derive(Clone, Debug)]
pub struct EdgeInfo {
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub label: String,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	delay_t: f64,
}

/// What a pointer release amounted to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PointerRelease {
	/// Press and release on the same node without dragging it.
	NodeClick(String),
	/// Press and release on empty canvas without panning.
	BackgroundClick,
	/// A drag or pan ended, or nothing was pressed.
	Gesture,
}

/// Positions, camera and pointer state of one mounted graph.
pub struct SceneState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub simulating: bool,
	pub flow_time: f64,
	edges: Vec<EdgeInfo>,
	order: Vec<DefaultNodeIdx>,
	index: HashMap<String, DefaultNodeIdx>,
	zoom_bounds: (f64, f64),
}

impl SceneState {
	pub fn new(
		model: &GraphModel,
		layout: Layout,
		width: f64,
		height: f64,
		zoom_bounds: (f64, f64),
	) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: 600.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});
		let mut index = HashMap::new();
		let mut order = Vec::with_capacity(model.nodes().len());

		for node in model.nodes() {
			let idx = graph.add_node(NodeData {
				x: 0.0,
				y: 0.0,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeInfo {
					id: node.id.clone(),
					label: node.label.clone(),
					color: style::node_color(&node.kind),
					radius: style::node_radius(node.mentions),
				},
			});
			index.insert(node.id.clone(), idx);
			order.push(idx);
		}

		let mut edges = Vec::with_capacity(model.edges().len());
		for edge in model.edges() {
			if let (Some(&src), Some(&tgt)) = (index.get(&edge.source), index.get(&edge.target)) {
				graph.add_edge(src, tgt, EdgeData::default());
				edges.push(EdgeInfo {
					source: src,
					target: tgt,
					label: edge.kind.clone(),
				});
			}
		}

		let mut state = Self {
			graph,
			edges,
			order,
			index,
			zoom_bounds,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			simulating: false,
			flow_time: 0.0,
		};
		state.apply_layout(layout, model);
		state
	}

	/// Move every node to the positions of `layout`. Simulated layouts are
	/// released to the physics; the others are pinned.
	pub fn apply_layout(&mut self, layout: Layout, model: &GraphModel) {
		let positions: HashMap<DefaultNodeIdx, (f64, f64)> = self
			.order
			.iter()
			.copied()
			.zip(layout::place(layout, model))
			.collect();
		let pinned = !layout.is_simulated();
		self.graph.visit_nodes_mut(|node| {
			if let Some(&(x, y)) = positions.get(&node.index()) {
				node.data.x = x as f32;
				node.data.y = y as f32;
			}
			node.data.is_anchor = pinned;
		});
		self.simulating = layout.is_simulated();
		self.drag = DragState::default();
		self.pan = PanState::default();
	}

	pub fn edges(&self) -> &[EdgeInfo] {
		&self.edges
	}

	pub fn node_idx(&self, id: &str) -> Option<DefaultNodeIdx> {
		self.index.get(id).copied()
	}

	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut out = HashMap::with_capacity(self.order.len());
		self.graph.visit_nodes(|node| {
			out.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		out
	}

	pub fn position_of(&self, id: &str) -> Option<(f64, f64)> {
		let idx = self.node_idx(id)?;
		self.positions().get(&idx).copied()
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			if (dx * dx + dy * dy).sqrt() < node.data.user_data.radius + HIT_SLOP {
				found = Some(node.index());
			}
		});
		found
	}

	fn node_id(&self, idx: DefaultNodeIdx) -> Option<String> {
		let mut id = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				id = Some(node.data.user_data.id.clone());
			}
		});
		id
	}

	pub fn zoom_level(&self) -> f64 {
		self.transform.k
	}

	/// Scale by `factor` keeping the screen point (sx, sy) fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		self.zoom_to(sx, sy, self.transform.k * factor);
	}

	/// Add `delta` to the zoom level, anchored at the viewport center.
	pub fn zoom_by(&mut self, delta: f64) {
		self.zoom_to(self.width / 2.0, self.height / 2.0, self.transform.k + delta);
	}

	fn zoom_to(&mut self, sx: f64, sy: f64, k: f64) {
		let (min, max) = self.zoom_bounds;
		let new_k = k.clamp(min, max);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// World-space box around every node disc.
	pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
		let mut bounds: Option<(f64, f64, f64, f64)> = None;
		self.graph.visit_nodes(|node| {
			let (x, y, r) = (node.x() as f64, node.y() as f64, node.data.user_data.radius);
			bounds = Some(match bounds {
				None => (x - r, y - r, x + r, y + r),
				Some((x0, y0, x1, y1)) => (x0.min(x - r), y0.min(y - r), x1.max(x + r), y1.max(y + r)),
			});
		});
		bounds
	}

	/// Scale and pan so the whole graph sits inside the viewport minus
	/// `padding` on every side.
	pub fn fit(&mut self, padding: f64) {
		let (min, max) = self.zoom_bounds;
		let Some((x0, y0, x1, y1)) = self.bounds() else {
			self.transform = ViewTransform {
				x: self.width / 2.0,
				y: self.height / 2.0,
				k: 1.0,
			};
			return;
		};
		let avail_w = (self.width - 2.0 * padding).max(1.0);
		let avail_h = (self.height - 2.0 * padding).max(1.0);
		let (bw, bh) = ((x1 - x0).max(1.0), (y1 - y0).max(1.0));
		let k = (avail_w / bw).min(avail_h / bh).clamp(min, max);
		let (cx, cy) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}

	pub fn press(&mut self, x: f64, y: f64) {
		if let Some(idx) = self.node_at_position(x, y) {
			self.drag = DragState {
				active: true,
				node_idx: Some(idx),
				start_x: x,
				start_y: y,
				..DragState::default()
			};
			let drag = &mut self.drag;
			self.graph.visit_nodes(|node| {
				if node.index() == idx {
					drag.node_start_x = node.x();
					drag.node_start_y = node.y();
				}
			});
		} else {
			self.pan = PanState {
				active: true,
				start_x: x,
				start_y: y,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
				moved: false,
			};
		}
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		if !self.drag.active {
			let hovered = self.node_at_position(x, y);
			self.set_hover(hovered);
		}

		if self.drag.active {
			let (sdx, sdy) = (x - self.drag.start_x, y - self.drag.start_y);
			if !self.drag.moved && sdx.hypot(sdy) < CLICK_TOLERANCE {
				return;
			}
			self.drag.moved = true;
			if let Some(idx) = self.drag.node_idx {
				let (dx, dy) = (sdx / self.transform.k, sdy / self.transform.k);
				let (nx, ny) = (
					self.drag.node_start_x + dx as f32,
					self.drag.node_start_y + dy as f32,
				);
				self.graph.visit_nodes_mut(|node| {
					if node.index() == idx {
						node.data.x = nx;
						node.data.y = ny;
						node.data.is_anchor = true;
					}
				});
			}
		} else if self.pan.active {
			let (dx, dy) = (x - self.pan.start_x, y - self.pan.start_y);
			if dx.hypot(dy) >= CLICK_TOLERANCE {
				self.pan.moved = true;
			}
			self.transform.x = self.pan.transform_start_x + dx;
			self.transform.y = self.pan.transform_start_y + dy;
		}
	}

	pub fn release(&mut self) -> PointerRelease {
		let outcome = if self.drag.active && !self.drag.moved {
			self.drag
				.node_idx
				.and_then(|idx| self.node_id(idx))
				.map(PointerRelease::NodeClick)
				.unwrap_or(PointerRelease::Gesture)
		} else if self.pan.active && !self.pan.moved {
			PointerRelease::BackgroundClick
		} else {
			PointerRelease::Gesture
		};
		self.drag = DragState::default();
		self.pan = PanState::default();
		outcome
	}

	pub fn leave(&mut self) {
		self.drag = DragState::default();
		self.pan = PanState::default();
		self.set_hover(None);
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// keep the old neighbourhood around while it fades out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for edge in &self.edges {
				if edge.source == idx {
					self.hover.neighbors.insert(edge.target);
				} else if edge.target == idx {
					self.hover.neighbors.insert(edge.source);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn tick(&mut self, dt: f32) {
		if self.simulating {
			self.graph.update(dt);
		}
		self.flow_time += dt as f64;

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.transform.x += (width - self.width) / 2.0;
		self.transform.y += (height - self.height) / 2.0;
		self.width = width;
		self.height = height;
	}
}
