pub mod aggregator;
pub mod error;
pub mod preprocess;
pub mod router;
pub mod state;
pub mod store;

pub use aggregator::Aggregator;
pub use router::{Router, RouterError, Subscription};
pub use state::{LastRequest, LastValueCache};
pub use store::{ConfigStore, FileConfigStore, MemoryConfigStore, StoreError};
