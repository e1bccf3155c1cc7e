pub mod tags;

mod error;

pub use error::{Error, Result};
pub use tags::{SearchOptions, TagsClient};
