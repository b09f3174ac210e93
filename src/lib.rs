// Upstream entity model
pub mod entity;

// Entity cache with per-entry expiry
pub mod store;

// Include/exclude entity rules
pub mod filter;

// Upstream status API client
pub mod upstream;

// Background refresh loop
pub mod refresh;

// Room temperature report
pub mod report;

// HTTP API
pub mod api;

// Configuration and command line
pub mod cli;
pub mod config;

pub use entity::Entity;
pub use report::{Room, RoomReport};
pub use store::EntityStore;
