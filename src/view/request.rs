//! The backend call that feeds the view machine.

use std::time::Duration;

use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::RequestError;

#[derive(Serialize)]
struct ProcessRequest<'a> {
	url: &'a str,
}

/// Pipeline stages the backend walks through, with the progress shown while
/// the call is in flight and the delay after submission at which each shows.
pub const PROGRESS_STEPS: &[(Duration, u8, &str)] = &[
	(Duration::from_millis(0), 10, "Scraping article"),
	(Duration::from_millis(1500), 25, "Cleaning text"),
	(Duration::from_millis(3000), 40, "Chunking text"),
	(Duration::from_millis(5000), 60, "Extracting entities"),
	(Duration::from_millis(9000), 80, "Normalizing entities"),
	(Duration::from_millis(12000), 90, "Building graph"),
];

/// POST the article URL and return the raw graph payload.
pub async fn fetch_graph(api: &ApiConfig, url: &str) -> Result<Value, RequestError> {
	let endpoint = api.process_url();
	debug!("POST {}", endpoint);
	let response = reqwest::Client::new()
		.post(&endpoint)
		.json(&ProcessRequest { url })
		.send()
		.await
		.map_err(|e| RequestError::Unreachable(e.to_string()))?;

	let status = response.status().as_u16();
	let body: Option<Value> = response.json().await.ok();
	interpret(status, body)
}

/// Turn status + decoded body into a payload or a normalized error.
pub fn interpret(status: u16, body: Option<Value>) -> Result<Value, RequestError> {
	if !(200..300).contains(&status) {
		return Err(RequestError::from_status(
			status,
			body.as_ref().and_then(detail_text),
		));
	}
	let body = body.ok_or_else(|| RequestError::Decode("response body is not JSON".into()))?;
	if body.get("success").and_then(Value::as_bool) == Some(false) {
		let detail = body
			.get("message")
			.and_then(Value::as_str)
			.unwrap_or("the backend could not build a graph")
			.to_string();
		return Err(RequestError::Status { status, detail });
	}
	Ok(body)
}

/// `detail` of an error body: a plain string, or the `msg` of each
/// validation error.
pub fn detail_text(body: &Value) -> Option<String> {
	match body.get("detail")? {
		Value::String(s) => Some(s.clone()),
		Value::Array(items) => {
			let msgs: Vec<&str> = items
				.iter()
				.filter_map(|item| item.get("msg").and_then(Value::as_str))
				.collect();
			(!msgs.is_empty()).then(|| msgs.join("; "))
		}
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn ok_body_is_passed_through() {
		let body = json!({ "success": true, "graph": {} });
		assert_eq!(interpret(200, Some(body.clone())), Ok(body));
	}

	#[test]
	fn error_detail_is_used_verbatim() {
		let err = interpret(400, Some(json!({ "detail": "Could not extract article" })));
		assert_eq!(
			err.map_err(|e| e.to_string()),
			Err("Could not extract article".to_string())
		);
	}

	#[test]
	fn validation_errors_are_joined() {
		let body = json!({ "detail": [{ "msg": "invalid url" }, { "msg": "too long" }] });
		assert_eq!(detail_text(&body).as_deref(), Some("invalid url; too long"));
	}

	#[test]
	fn unsuccessful_envelope_is_a_failure() {
		let err = interpret(200, Some(json!({ "success": false, "message": "no text" })));
		assert_eq!(
			err,
			Err(RequestError::Status {
				status: 200,
				detail: "no text".into()
			})
		);
	}

	#[test]
	fn non_json_success_body_is_a_decode_error() {
		assert!(matches!(interpret(200, None), Err(RequestError::Decode(_))));
	}

	#[test]
	fn progress_steps_rise() {
		assert!(PROGRESS_STEPS.windows(2).all(|w| w[0].0 < w[1].0 && w[0].1 < w[1].1));
	}
}
