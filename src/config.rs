//! Compile-time defaults for the backend call and the canvas view.

use std::time::Duration;

/// Where the extraction backend lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
	pub base_url: String,
	pub process_path: String,
}

impl ApiConfig {
	pub fn process_url(&self) -> String {
		format!(
			"{}/{}",
			self.base_url.trim_end_matches('/'),
			self.process_path.trim_start_matches('/')
		)
	}
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			base_url: option_env!("KG_API_URL")
				.unwrap_or("http://localhost:8000")
				.to_string(),
			process_path: "/process".to_string(),
		}
	}
}

/// Camera and export tuning.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewConfig {
	/// Pixel padding on every side when fitting the graph.
	pub fit_padding: f64,
	/// Wait before the first fit of a fresh session.
	pub settle_delay: Duration,
	pub min_zoom: f64,
	pub max_zoom: f64,
	/// Zoom delta of a toolbar click.
	pub zoom_step: f64,
	pub export_scale: f64,
}

impl Default for ViewConfig {
	fn default() -> Self {
		Self {
			fit_padding: 50.0,
			settle_delay: Duration::from_millis(300),
			min_zoom: 0.1,
			max_zoom: 5.0,
			zoom_step: 0.2,
			export_scale: 2.0,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn process_url_joins_without_double_slash() {
		let cfg = ApiConfig {
			base_url: "http://localhost:8000/".into(),
			process_path: "/process".into(),
		};
		assert_eq!(cfg.process_url(), "http://localhost:8000/process");
	}
}
