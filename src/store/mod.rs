pub mod error;
pub mod file;
pub mod memory;
pub mod mock;
pub mod remote;
pub mod variant;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use mock::MockRosterStore;
pub use remote::{RemoteRow, RemoteStore};
pub use variant::RosterStoreVariant;
