//! Graph model: validation of backend payloads and legend statistics.

mod builder;
mod model;
mod stats;

pub use builder::{BuildOutput, build};
pub use model::{GraphEdge, GraphModel, GraphNode, RejectedEdge};
pub use stats::{GraphStats, TypeCount, aggregate};
