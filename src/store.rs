mod item_stats;
mod observation_store;
mod policy;

pub use item_stats::ItemStats;
pub use observation_store::{Observation, ObservationStore, UnknownTrackError};
pub use policy::ShipPolicy;
