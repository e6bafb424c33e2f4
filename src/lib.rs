// Library exports for testing and external use

pub mod config;
pub mod roulette;
pub mod selector;
pub mod session;
pub mod store;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-export commonly used types and traits
pub use config::{BaseConfig, StorageConfig, StorageType};
pub use roulette::{Roulette, SpinOutcome, Spinner};
pub use selector::{add_member, chance_percent, remove_member, select_fairly};
pub use session::generate_session_id;
pub use traits::RosterStore;
pub use types::{
    Member, MemberChance, Roster, Selection, BASE_WEIGHT, INCREMENT_WEIGHT, SELECTED_WEIGHT,
};

// Re-export variant enums for convenience
pub use store::{MockRosterStore, RosterStoreVariant};
