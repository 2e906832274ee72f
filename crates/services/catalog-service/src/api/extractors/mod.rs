//! Custom request extractors.

mod json;
mod path;

pub use json::AppJson;
pub use path::AppPath;
