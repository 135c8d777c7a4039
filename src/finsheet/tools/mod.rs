pub mod audit;
pub mod error;
pub mod io;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;

pub use error::{Result, ToolError};
