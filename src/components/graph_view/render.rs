use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::DefaultNodeIdx;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::SceneState;
use super::style;

/// Perpendicular bow of an edge as a share of its length.
const CURVATURE: f64 = 0.18;
/// Shaft of the arrow drawn between overlapping discs, in arrowhead lengths.
const STUB_LENGTH: f64 = 2.0;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Draw the scene. `pixel_ratio` scales the whole frame (raster export).
pub fn render(
	state: &SceneState,
	selection: Option<&str>,
	ctx: &CanvasRenderingContext2d,
	pixel_ratio: f64,
) {
	ctx.save();
	let _ = ctx.scale(pixel_ratio, pixel_ratio);
	ctx.set_fill_style_str(style::BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	let positions = frame(state);
	let selected = selection.and_then(|id| state.node_idx(id));
	draw_edges(state, &positions, EdgePass::Between, ctx);
	draw_nodes(state, &positions, selected, ctx);
	draw_edges(state, &positions, EdgePass::Overlapping, ctx);
	ctx.restore();
}

/// Position and radius of every node for this frame.
type Frame = HashMap<DefaultNodeIdx, (f64, f64, f64)>;

fn frame(state: &SceneState) -> Frame {
	let mut out = Frame::new();
	state.graph.visit_nodes(|node| {
		out.insert(
			node.index(),
			(node.x() as f64, node.y() as f64, node.data.user_data.radius),
		);
	});
	out
}

/// Edges between separate discs go under the nodes; stubs between
/// overlapping discs go on top so they are not covered.
#[derive(Clone, Copy, PartialEq, Eq)]
enum EdgePass {
	Between,
	Overlapping,
}

fn draw_edges(
	state: &SceneState,
	positions: &Frame,
	pass: EdgePass,
	ctx: &CanvasRenderingContext2d,
) {
	let k = state.transform.k;
	let (line_width, dash, gap, arrow_size) = (1.5 / k, 8.0 / k, 4.0 / k, 9.0 / k);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(state.hover.highlight_t);

	for edge in state.edges() {
		let (Some(&(x1, y1, r1)), Some(&(x2, y2, r2))) =
			(positions.get(&edge.source), positions.get(&edge.target))
		else {
			continue;
		};
		let is_highlighted =
			state.is_highlighted(edge.source) && state.is_highlighted(edge.target);

		// t=0: every edge at 0.6, t=1: highlighted at 0.9, others at 0.15
		let (edge_alpha, arrow_alpha, width) = if is_highlighted {
			(0.6 + 0.3 * t, 0.8 + 0.1 * t, line_width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, 0.8 - 0.45 * t, line_width * (1.0 - 0.3 * t))
		};
		ctx.set_stroke_style_str(&format!("rgba({}, {})", style::EDGE_RGB, edge_alpha));
		ctx.set_line_width(width);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
		ctx.set_line_dash_offset(dash_offset);

		let shape = match edge_shape((x1, y1, r1), (x2, y2, r2), arrow_size) {
			EdgeShape::SelfLoop if pass == EdgePass::Between => {
				draw_self_loop(ctx, x1, y1, r1, &edge.label, arrow_alpha, k);
				continue;
			}
			EdgeShape::SelfLoop => continue,
			EdgeShape::Arrow(arrow) => arrow,
		};
		let overlapping = shape.control.is_none();
		if overlapping != (pass == EdgePass::Overlapping) {
			continue;
		}

		ctx.begin_path();
		ctx.move_to(shape.start.0, shape.start.1);
		match shape.control {
			Some((cx, cy)) => ctx.quadratic_curve_to(cx, cy, shape.back.0, shape.back.1),
			None => ctx.line_to(shape.back.0, shape.back.1),
		}
		ctx.stroke();

		let _ = ctx.set_line_dash(&js_sys::Array::new());
		ctx.set_fill_style_str(&format!("rgba({}, {})", style::EDGE_RGB, arrow_alpha));
		let (tip_x, tip_y) = shape.tip;
		let (back_x, back_y) = shape.back;
		let (ux, uy) = unit(tip_x - back_x, tip_y - back_y);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();

		draw_edge_label(ctx, &edge.label, shape.label.0, shape.label.1, arrow_alpha, k);
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

/// Where one directed edge is drawn, in world coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ArrowShape {
	start: (f64, f64),
	/// Quadratic control point; `None` for a straight stub.
	control: Option<(f64, f64)>,
	/// Base of the arrowhead, where the line stops.
	back: (f64, f64),
	tip: (f64, f64),
	label: (f64, f64),
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum EdgeShape {
	SelfLoop,
	Arrow(ArrowShape),
}

/// Geometry of the edge between two discs `(x, y, r)`.
///
/// Separate discs get a curve between their rims. Overlapping discs get a
/// short straight arrow ending on the target's rim, coming from the source's
/// side, so the edge and its label stay visible.
fn edge_shape(
	(x1, y1, r1): (f64, f64, f64),
	(x2, y2, r2): (f64, f64, f64),
	arrow_size: f64,
) -> EdgeShape {
	let (dx, dy) = (x2 - x1, y2 - y1);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return EdgeShape::SelfLoop;
	}

	if dist < r1 + r2 + arrow_size {
		let (ux, uy) = (dx / dist, dy / dist);
		let tip = (x2 - ux * r2, y2 - uy * r2);
		let back = (tip.0 - ux * arrow_size, tip.1 - uy * arrow_size);
		let start = (
			back.0 - ux * arrow_size * STUB_LENGTH,
			back.1 - uy * arrow_size * STUB_LENGTH,
		);
		// beside the stub, on its left
		let label = (
			(start.0 + back.0) / 2.0 + uy * arrow_size,
			(start.1 + back.1) / 2.0 - ux * arrow_size,
		);
		return EdgeShape::Arrow(ArrowShape {
			start,
			control: None,
			back,
			tip,
			label,
		});
	}

	let (mx, my) = ((x1 + x2) / 2.0, (y1 + y2) / 2.0);
	let (cx, cy) = (mx - dy * CURVATURE, my + dx * CURVATURE);
	let start = toward(x1, y1, cx, cy, r1);
	let tip = toward(x2, y2, cx, cy, r2);
	let (ux, uy) = unit(tip.0 - cx, tip.1 - cy);
	let back = (tip.0 - ux * arrow_size, tip.1 - uy * arrow_size);
	// label sits on the curve's midpoint
	let label = (
		0.25 * x1 + 0.5 * cx + 0.25 * x2,
		0.25 * y1 + 0.5 * cy + 0.25 * y2,
	);
	EdgeShape::Arrow(ArrowShape {
		start,
		control: Some((cx, cy)),
		back,
		tip,
		label,
	})
}

fn unit(dx: f64, dy: f64) -> (f64, f64) {
	let len = (dx * dx + dy * dy).sqrt().max(f64::EPSILON);
	(dx / len, dy / len)
}

/// Point `r` away from (x, y) in the direction of (tx, ty).
fn toward(x: f64, y: f64, tx: f64, ty: f64, r: f64) -> (f64, f64) {
	let (ux, uy) = unit(tx - x, ty - y);
	(x + ux * r, y + uy * r)
}

fn draw_self_loop(
	ctx: &CanvasRenderingContext2d,
	x: f64,
	y: f64,
	r: f64,
	label: &str,
	alpha: f64,
	k: f64,
) {
	let loop_r = r * 0.7;
	ctx.begin_path();
	let _ = ctx.arc(x, y - r - loop_r * 0.6, loop_r, 0.0, 2.0 * PI);
	ctx.stroke();
	draw_edge_label(ctx, label, x, y - r - loop_r * 1.9, alpha, k);
}

fn draw_edge_label(ctx: &CanvasRenderingContext2d, label: &str, x: f64, y: f64, alpha: f64, k: f64) {
	ctx.set_fill_style_str(&format!("rgba(226, 232, 240, {})", alpha));
	ctx.set_font(&format!("{}px sans-serif", 9.0 / k.max(0.5)));
	ctx.set_text_align("center");
	let _ = ctx.fill_text(label, x, y);
	ctx.set_text_align("start");
}

fn draw_nodes(
	state: &SceneState,
	positions: &Frame,
	selected: Option<DefaultNodeIdx>,
	ctx: &CanvasRenderingContext2d,
) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if has_highlight && state.is_highlighted(idx) {
			return;
		}
		let Some(&(x, y, _)) = positions.get(&idx) else {
			return;
		};
		let info = &node.data.user_data;
		let (alpha, radius) = (1.0 - 0.7 * t, info.radius * (1.0 - 0.15 * t));

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(info.color);
		ctx.fill();
		ctx.set_global_alpha(1.0);

		if selected == Some(idx) {
			draw_selection_ring(ctx, x, y, radius, k);
		}
		draw_node_label(ctx, &info.label, x, y, radius, alpha * 0.85, k);
	});

	if !has_highlight {
		return;
	}

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if !state.is_highlighted(idx) {
			return;
		}
		let Some(&(x, y, _)) = positions.get(&idx) else {
			return;
		};
		let info = &node.data.user_data;
		let is_hovered = state.is_hovered(idx);
		let is_neighbor =
			state.hover.neighbors.contains(&idx) || state.hover.prev_neighbors.contains(&idx);

		let (radius, glow_radius) = if is_hovered {
			(info.radius * (1.0 + 0.2 * t), info.radius * (1.6 + 0.8 * t))
		} else if is_neighbor {
			(info.radius * (1.0 + 0.1 * t), info.radius * (1.3 + 0.4 * t))
		} else {
			(info.radius, 0.0)
		};

		if glow_radius > 0.0 && t > 0.01 {
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow_radius) {
				let alpha = if is_hovered { 0.35 * t } else { 0.2 * t };
				let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {})", alpha));
				let _ = gradient
					.add_color_stop(0.6, &format!("rgba(200, 220, 255, {})", alpha * 0.3));
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(info.color);
		ctx.fill();

		if is_hovered && t > 0.01 {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * t));
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}
		if selected == Some(idx) {
			draw_selection_ring(ctx, x, y, radius, k);
		}
		draw_node_label(ctx, &info.label, x, y, radius, 1.0, k);
	});
}

fn draw_selection_ring(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64, k: f64) {
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius + 4.0 / k, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str(style::SELECTION_COLOR);
	ctx.set_line_width(3.0 / k);
	ctx.stroke();
}

fn draw_node_label(
	ctx: &CanvasRenderingContext2d,
	label: &str,
	x: f64,
	y: f64,
	radius: f64,
	alpha: f64,
	k: f64,
) {
	ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", alpha));
	ctx.set_font(&format!("{}px sans-serif", 11.0 / k.max(0.5)));
	ctx.set_text_align("center");
	let _ = ctx.fill_text(label, x, y + radius + 12.0 / k.max(0.5));
	ctx.set_text_align("start");
}

#[cfg(test)]
mod tests {
	use super::*;

	fn arrow(shape: EdgeShape) -> ArrowShape {
		match shape {
			EdgeShape::Arrow(a) => a,
			EdgeShape::SelfLoop => panic!("expected an arrow"),
		}
	}

	fn dist((ax, ay): (f64, f64), (bx, by): (f64, f64)) -> f64 {
		(ax - bx).hypot(ay - by)
	}

	#[test]
	fn separate_discs_get_a_curve_between_rims() {
		let a = arrow(edge_shape((0.0, 0.0, 10.0), (200.0, 0.0, 20.0), 9.0));
		assert!(a.control.is_some());
		assert!((dist(a.start, (0.0, 0.0)) - 10.0).abs() < 1e-9);
		assert!((dist(a.tip, (200.0, 0.0)) - 20.0).abs() < 1e-9);
		assert!((dist(a.back, a.tip) - 9.0).abs() < 1e-9);
	}

	#[test]
	fn overlapping_discs_still_get_an_arrow() {
		let a = arrow(edge_shape((0.0, 0.0, 30.0), (20.0, 0.0, 30.0), 9.0));
		assert_eq!(a.control, None);
		// ends on the target rim, pointing along source → target
		assert!((a.tip.0 - -10.0).abs() < 1e-9);
		assert!(a.back.0 < a.tip.0 && a.start.0 < a.back.0);
		assert!((dist(a.back, a.tip) - 9.0).abs() < 1e-9);
		assert!(a.label.0.is_finite() && a.label.1.is_finite());
	}

	#[test]
	fn touching_rims_use_the_stub() {
		// too close for a curve and an arrowhead to fit between the rims
		let a = arrow(edge_shape((0.0, 0.0, 10.0), (24.0, 0.0, 10.0), 9.0));
		assert_eq!(a.control, None);
	}

	#[test]
	fn coincident_centres_draw_a_loop() {
		assert_eq!(
			edge_shape((5.0, 5.0, 10.0), (5.0, 5.0, 10.0), 9.0),
			EdgeShape::SelfLoop
		);
	}
}
