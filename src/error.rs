//! Error taxonomy for the payload → model → canvas pipeline.
//!
//! Data-level anomalies ([`RejectReason`]) are absorbed by the builder and
//! never interrupt rendering. Payload-shape, render-surface and transport
//! failures reach the view state machine as a [`ViewError`].

use thiserror::Error;

/// The payload's containers are missing or malformed. No model is built.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
	#[error("response is not a JSON object")]
	NotAnObject,
	#[error("response has no `{0}` field")]
	MissingContainer(&'static str),
	#[error("response field `{0}` is not a list")]
	NotASequence(&'static str),
}

/// Which end of a relationship failed to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
	Source,
	Target,
}

impl std::fmt::Display for Endpoint {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Endpoint::Source => f.write_str("source"),
			Endpoint::Target => f.write_str("target"),
		}
	}
}

/// Why a single relationship was left out of the model.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RejectReason {
	#[error("relationship is not an object")]
	NotARecord,
	#[error("relationship has no {0} endpoint")]
	MissingEndpoint(Endpoint),
	#[error("source `{0}` does not match any entity")]
	UnknownSource(String),
	#[error("target `{0}` does not match any entity")]
	UnknownTarget(String),
	#[error("neither source `{source_id}` nor target `{target_id}` match any entity")]
	UnknownEndpoints { source_id: String, target_id: String },
}

/// Failures of the canvas render engine.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RenderError {
	#[error("drawing surface is not ready ({width}x{height})")]
	SurfaceUnready { width: f64, height: f64 },
	#[error("unknown layout `{0}`")]
	InvalidLayout(String),
	#[error("render session {0} is no longer mounted")]
	StaleSession(u64),
	#[error("no graph is displayed")]
	NotMounted,
	#[error("export failed: {0}")]
	Export(String),
}

/// Failures of the backend call, already normalized for display.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RequestError {
	#[error("Article not found (404). Please check the URL and try again.")]
	NotFound,
	#[error("Access to this article is forbidden (403). The site may block automated readers.")]
	Forbidden,
	#[error("Server error ({status}): {detail}")]
	Server { status: u16, detail: String },
	#[error("Cannot reach the backend. Is it running? ({0})")]
	Unreachable(String),
	#[error("{detail}")]
	Status { status: u16, detail: String },
	#[error("Could not read the backend response: {0}")]
	Decode(String),
}

impl RequestError {
	/// Map an HTTP status and the body's `detail` text to a user-facing error.
	pub fn from_status(status: u16, detail: Option<String>) -> Self {
		match status {
			404 => RequestError::NotFound,
			403 => RequestError::Forbidden,
			500..=599 => RequestError::Server {
				status,
				detail: detail.unwrap_or_else(|| "the backend failed to process the article".into()),
			},
			_ => RequestError::Status {
				status,
				detail: detail.unwrap_or_else(|| format!("Request failed with status {status}")),
			},
		}
	}
}

/// Anything that halts the pipeline at `ViewState::Error`.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ViewError {
	#[error("invalid response format: {0}")]
	Payload(#[from] PayloadError),
	#[error("could not draw the graph: {0}")]
	Render(#[from] RenderError),
	#[error(transparent)]
	Request(#[from] RequestError),
}

impl ViewError {
	/// Message shown in the error panel.
	pub fn message(&self) -> String {
		self.to_string()
	}
}
