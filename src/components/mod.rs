pub mod details;
pub mod graph_view;
pub mod legend;
pub mod panels;
pub mod toolbar;
