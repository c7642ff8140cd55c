use knowledge_graph_viewer::config::ViewConfig;
use knowledge_graph_viewer::error::{RenderError, RequestError, ViewError};
use knowledge_graph_viewer::view::{Outcome, ViewEvent, ViewMachine, ViewState};
use knowledge_graph_viewer::{Layout, SurfaceExtent};
use serde_json::{Value, json};

fn machine() -> ViewMachine {
	let mut m = ViewMachine::new(ViewConfig::default());
	m.set_surface(SurfaceExtent::new(1024.0, 768.0));
	m
}

fn payload(names: &[&str]) -> Value {
	let entities: Vec<Value> = names
		.iter()
		.map(|n| json!({ "id": n, "name": n, "type": "PERSON" }))
		.collect();
	json!({
		"success": true,
		"graph": { "entities": entities, "relationships": [] },
		"article_info": { "title": "On graphs", "url": "https://example.com/a" }
	})
}

fn node_ids(m: &ViewMachine) -> Vec<String> {
	m.state()
		.model()
		.map(|model| model.nodes().iter().map(|n| n.id.clone()).collect())
		.unwrap_or_default()
}

#[test]
fn full_cycle_returns_to_idle() {
	let mut m = machine();
	assert_eq!(m.state(), &ViewState::Idle);

	let token = m.submit("https://example.com/a");
	assert!(m.state().is_loading());
	assert_eq!(
		m.handle(ViewEvent::Progress {
			token,
			progress: 40,
			step: "Chunking text".into()
		}),
		Outcome::Applied
	);
	assert_eq!(
		m.state(),
		&ViewState::Loading {
			progress: 40,
			step: "Chunking text".into()
		}
	);

	m.handle(ViewEvent::Success {
		token,
		payload: payload(&["a", "b"]),
	});
	let ViewState::Displayed { layout, selection, .. } = m.state() else {
		panic!("expected a displayed graph, got {:?}", m.state());
	};
	assert_eq!(*layout, Layout::ForceDirected);
	assert_eq!(*selection, None);
	assert_eq!(m.live_sessions(), 1);
	assert_eq!(m.stats().map(|s| s.node_count), Some(2));
	assert_eq!(
		m.article().and_then(|a| a.title.as_deref()),
		Some("On graphs")
	);

	assert_eq!(m.handle(ViewEvent::Retry), Outcome::Applied);
	assert_eq!(m.state(), &ViewState::Idle);
	assert_eq!(m.live_sessions(), 0);
	assert!(m.stats().is_none());
}

#[test]
fn stale_response_is_discarded() {
	let mut m = machine();
	let first = m.submit("https://example.com/slow");
	let second = m.submit("https://example.com/fast");

	assert_eq!(
		m.handle(ViewEvent::Success {
			token: second,
			payload: payload(&["fast"]),
		}),
		Outcome::Applied
	);
	assert_eq!(
		m.handle(ViewEvent::Success {
			token: first,
			payload: payload(&["slow"]),
		}),
		Outcome::Ignored
	);
	assert_eq!(node_ids(&m), ["fast"]);
	assert_eq!(m.live_sessions(), 1);
}

#[test]
fn stale_failure_does_not_clobber_loading() {
	let mut m = machine();
	let first = m.submit("https://example.com/one");
	let _second = m.submit("https://example.com/two");
	let outcome = m.handle(ViewEvent::Failure {
		token: first,
		error: RequestError::NotFound,
	});
	assert_eq!(outcome, Outcome::Ignored);
	assert!(m.state().is_loading());
}

#[test]
fn resubmission_keeps_one_live_session() {
	let mut m = machine();
	for round in 0..5 {
		let token = m.submit("https://example.com/a");
		assert_eq!(m.live_sessions(), 0);
		m.handle(ViewEvent::Success {
			token,
			payload: payload(&["a", "b", "c"]),
		});
		assert_eq!(m.live_sessions(), 1, "round {}", round);
	}
}

#[test]
fn invalid_payload_is_an_error() {
	let mut m = machine();
	let token = m.submit("https://example.com/a");
	m.handle(ViewEvent::Success {
		token,
		payload: json!({ "relationships": [] }),
	});
	let ViewState::Error(err) = m.state() else {
		panic!("expected an error, got {:?}", m.state());
	};
	assert!(matches!(err, ViewError::Payload(_)));
	assert!(err.message().starts_with("invalid response format"));
	assert_eq!(m.live_sessions(), 0);

	assert_eq!(m.handle(ViewEvent::Retry), Outcome::Applied);
	assert_eq!(m.state(), &ViewState::Idle);
}

#[test]
fn zero_surface_is_a_render_failure() {
	let mut m = ViewMachine::new(ViewConfig::default());
	let token = m.submit("https://example.com/a");
	m.handle(ViewEvent::Success {
		token,
		payload: payload(&["a"]),
	});
	assert!(matches!(
		m.state(),
		ViewState::Error(ViewError::Render(RenderError::SurfaceUnready { .. }))
	));
}

#[test]
fn request_failures_are_normalized() {
	let mut m = machine();
	let token = m.submit("https://example.com/a");
	m.handle(ViewEvent::Failure {
		token,
		error: RequestError::from_status(503, None),
	});
	let ViewState::Error(err) = m.state() else {
		panic!("expected an error");
	};
	assert!(matches!(err, ViewError::Request(RequestError::Server { status: 503, .. })));
}

#[test]
fn selection_survives_relayout() {
	let mut m = machine();
	let token = m.submit("https://example.com/a");
	m.handle(ViewEvent::Success {
		token,
		payload: payload(&["a", "b"]),
	});
	assert!(m.select_node("b"));
	assert!(!m.select_node("nope"));
	assert_eq!(m.selection(), Some("b"));

	assert_eq!(m.change_layout("grid"), Ok(Layout::Grid));
	assert_eq!(m.selection(), Some("b"));
	assert!(matches!(
		m.change_layout("spiral"),
		Err(RenderError::InvalidLayout(_))
	));

	m.clear_selection();
	assert_eq!(m.selection(), None);
}

#[test]
fn deferred_fit_after_unmount_is_noop() {
	let mut m = machine();
	let token = m.submit("https://example.com/a");
	m.handle(ViewEvent::Success {
		token,
		payload: payload(&["a", "b"]),
	});
	let id = m.session_id().expect("session is mounted");
	assert!(m.deferred_fit(id).is_some());

	m.submit("https://example.com/b");
	assert_eq!(m.deferred_fit(id), None);
}

#[test]
fn commands_without_a_graph_fail() {
	let mut m = machine();
	assert_eq!(m.zoom(0.2), Err(RenderError::NotMounted));
	assert_eq!(m.fit(), Err(RenderError::NotMounted));
	assert_eq!(m.export_payload(), Err(RenderError::NotMounted));
}

#[test]
fn exported_json_is_the_validated_model() {
	let mut m = machine();
	let token = m.submit("https://example.com/a");
	m.handle(ViewEvent::Success {
		token,
		payload: payload(&["a"]),
	});
	let json = m.export_payload().expect("graph is displayed");
	let value: Value = serde_json::from_str(&json).expect("valid json");
	assert_eq!(value["nodes"][0]["id"], "a");
	assert_eq!(value["nodes"][0]["type"], "PERSON");
	assert!(value.get("success").is_none());
}

#[test]
fn late_reply_leaves_the_live_view_alone() {
	let mut m = machine();
	let first = m.submit("https://example.com/slow");
	let second = m.submit("https://example.com/fast");

	let mounted = m.respond(second, Ok(payload(&["fast", "other"])));
	assert_eq!(mounted, m.session_id());
	assert!(mounted.is_some());

	let zoom = m.zoom(2.0).expect("graph is displayed");
	assert_eq!(m.respond(first, Ok(payload(&["slow"]))), None);
	assert_eq!(
		m.respond(first, Err(RequestError::Unreachable("timeout".into()))),
		None
	);
	assert_eq!(m.zoom_level(), Some(zoom));
	assert_eq!(node_ids(&m), ["fast", "other"]);
}

#[test]
fn failed_reply_schedules_no_fit() {
	let mut m = machine();
	let token = m.submit("https://example.com/a");
	assert_eq!(m.respond(token, Err(RequestError::NotFound)), None);
	assert!(matches!(m.state(), ViewState::Error(_)));

	let token = m.submit("https://example.com/b");
	assert_eq!(m.respond(token, Ok(json!({ "entities": [] }))), None);
	assert!(matches!(m.state(), ViewState::Error(ViewError::Payload(_))));
}
