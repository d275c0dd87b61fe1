//! Business services over the store. Handlers call these; they never touch
//! the store directly for writes that carry files.

pub mod articles;
pub mod site_config;
pub mod understanding;

pub use articles::{ArticleInput, ArticleService};
pub use understanding::UnderstandingService;
