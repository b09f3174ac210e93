// Entity store with per-entry expiry

mod clock;
mod entity_store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entity_store::EntityStore;

#[cfg(test)]
mod tests;
