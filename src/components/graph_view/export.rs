use log::info;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlAnchorElement, HtmlCanvasElement};

use super::render;
use super::state::SceneState;
use crate::error::RenderError;

fn js_err(value: JsValue) -> RenderError {
	RenderError::Export(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

fn document() -> Result<web_sys::Document, RenderError> {
	web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| RenderError::Export("no document".into()))
}

/// PNG of the current view, drawn off-screen at `scale` times the surface size.
pub fn raster_data_url(
	scene: &SceneState,
	selection: Option<&str>,
	scale: f64,
) -> Result<String, RenderError> {
	let canvas: HtmlCanvasElement = document()?
		.create_element("canvas")
		.map_err(js_err)?
		.dyn_into()
		.map_err(|_| RenderError::Export("not a canvas".into()))?;
	canvas.set_width((scene.width * scale).round() as u32);
	canvas.set_height((scene.height * scale).round() as u32);

	let ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")
		.map_err(js_err)?
		.ok_or_else(|| RenderError::Export("2d context unavailable".into()))?
		.dyn_into()
		.map_err(|_| RenderError::Export("2d context unavailable".into()))?;
	render::render(scene, selection, &ctx, scale);
	canvas.to_data_url_with_type("image/png").map_err(js_err)
}

pub fn json_data_url(json: &str) -> String {
	format!(
		"data:application/json;charset=utf-8,{}",
		String::from(js_sys::encode_uri_component(json))
	)
}

/// Hand `href` to the browser as a file download.
pub fn download(href: &str, filename: &str) -> Result<(), RenderError> {
	let anchor: HtmlAnchorElement = document()?
		.create_element("a")
		.map_err(js_err)?
		.dyn_into()
		.map_err(|_| RenderError::Export("not an anchor".into()))?;
	anchor.set_href(href);
	anchor.set_download(filename);
	anchor.click();
	info!("exported {}", filename);
	Ok(())
}
