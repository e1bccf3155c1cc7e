pub mod category;
pub mod expression;
pub mod item;
pub mod page;
pub mod query;
pub mod time_serde;

mod error;

pub use category::{Category, ItemFilter, Plan, SampleKind, Scope, SearchPlan};
pub use error::{Error, Result};
pub use item::{ContentFlags, Item, ItemId};
pub use page::{ItemsPage, PageOrder, PageRules, Paginated};
pub use query::{CursorWindow, ItemsQuery};
