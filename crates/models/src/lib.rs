//! Domain entities for the research portal and the snapshot document the
//! store persists. Pure data plus field validation; no I/O.

pub mod errors;
pub mod user;
pub mod article;
pub mod site_config;
pub mod understanding;
pub mod push_subscription;
pub mod snapshot;

/// Store-assigned identity for users and articles.
pub type RecordId = u64;

pub use article::{Article, ArticlePatch, NewArticle, PdfRef};
pub use errors::ModelError;
pub use push_subscription::PushSubscription;
pub use site_config::{ConfigPatch, ConfigValue, SiteConfig};
pub use snapshot::{CollectionCounts, Collections, Snapshot};
pub use understanding::{Material, Understanding};
pub use user::{NewUser, User, UserProfile};
