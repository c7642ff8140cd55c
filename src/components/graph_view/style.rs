pub const MIN_NODE_DIAMETER: f64 = 20.0;
pub const MAX_NODE_DIAMETER: f64 = 60.0;
const DIAMETER_PER_MENTION: f64 = 5.0;

pub const DEFAULT_COLOR: &str = "#9ca3af";

/// Entity categories with a dedicated fill color.
pub const PALETTE: &[(&str, &str)] = &[
	("PERSON", "#3b82f6"),
	("ORGANIZATION", "#10b981"),
	("LOCATION", "#f59e0b"),
	("EVENT", "#ef4444"),
	("DATE", "#8b5cf6"),
	("PRODUCT", "#ec4899"),
	("CONCEPT", "#14b8a6"),
];

pub const BACKGROUND: &str = "#0f172a";
pub const EDGE_RGB: &str = "148, 163, 184";
pub const SELECTION_COLOR: &str = "#facc15";

pub fn node_diameter(mentions: u32) -> f64 {
	(MIN_NODE_DIAMETER + mentions as f64 * DIAMETER_PER_MENTION).min(MAX_NODE_DIAMETER)
}

pub fn node_radius(mentions: u32) -> f64 {
	node_diameter(mentions) / 2.0
}

/// Fill color for a type tag, matched case-insensitively.
pub fn node_color(kind: &str) -> &'static str {
	let kind = kind.to_uppercase();
	PALETTE
		.iter()
		.find(|(name, _)| *name == kind)
		.map(|(_, color)| *color)
		.unwrap_or(DEFAULT_COLOR)
}
