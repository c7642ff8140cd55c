use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::{render, style};
use crate::view::GraphController;

const FRAME_DT: f32 = 0.016;

fn surface_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.unwrap_or((0.0, 0.0))
}

fn canvas_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// The drawing surface. Stays in the DOM for the page's lifetime so the
/// controller always knows its extent; the mounted session (if any) is drawn
/// every animation frame.
#[component]
pub fn GraphCanvas(controller: GraphController) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window): Option<Window> = web_sys::window() else {
			return;
		};

		let (w, h) = surface_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		controller.set_surface(w, h);

		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into().ok())
		{
			Some(ctx) => ctx,
			None => {
				error!("canvas has no 2d context");
				return;
			}
		};

		let canvas_resize = canvas.clone();
		*resize_cb.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = surface_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			controller.set_surface(nw, nh);
		}));
		if let Some(ref cb) = *resize_cb.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let animate_inner = animate.clone();
		*animate.borrow_mut() = Some(Closure::new(move || {
			let alive = controller.machine().try_update_value(|m| {
				m.tick(FRAME_DT);
				match m.session() {
					Some(session) => render::render(&session.scene, m.selection(), &ctx, 1.0),
					None => {
						ctx.set_fill_style_str(style::BACKGROUND);
						let canvas = ctx.canvas();
						let (cw, ch) = canvas
							.map(|c| (c.width() as f64, c.height() as f64))
							.unwrap_or((0.0, 0.0));
						ctx.fill_rect(0.0, 0.0, cw, ch);
					}
				}
			});
			// the owning page is gone
			if alive.is_none() {
				return;
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(win) = web_sys::window() {
					let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}
		}));
		if let Some(ref cb) = *animate.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = canvas_point(&canvas, &ev);
		controller.pointer_down(x, y);
	};

	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = canvas_point(&canvas, &ev);
		controller.pointer_move(x, y);
	};

	let on_mouseup = move |_: MouseEvent| controller.pointer_up();
	let on_mouseleave = move |_: MouseEvent| controller.pointer_leave();

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = canvas_point(&canvas, &ev);
		controller.wheel(x, y, ev.delta_y());
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
