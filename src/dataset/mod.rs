//! City model: object records, key conventions and the loaded dataset resource.
pub mod keys;
pub mod plugin;
pub mod search;
pub mod store;
pub mod types;

pub use plugin::DatasetPlugin;
pub use search::{SearchHit, SearchIndex};
pub use store::{CityDataset, DatasetError, ResolvedKey, DEFAULT_STOREY};
pub use types::{CityObject, CityObjectKind, Importance};
