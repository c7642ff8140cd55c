//! View lifecycle: the state machine, the backend call and the reactive
//! controller that ties both to the page.

mod controller;
mod machine;
pub mod request;

pub use controller::GraphController;
pub use machine::{ArticleInfo, Outcome, RequestToken, ViewEvent, ViewMachine, ViewState};
