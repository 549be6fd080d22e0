use crate::error::Result;
use crate::types::{Catalog, UserHistory};

/// Supplies catalog snapshots (mock arrays, files, or a backend).
pub trait CatalogSource: Send + Sync {
    fn load(&self) -> Result<Catalog>;
}

/// Supplies the interaction history of a user.
pub trait HistorySource: Send + Sync {
    fn history(&self, user_id: &str) -> Result<UserHistory>;
}
