// Upstream status API access

mod client;

pub use client::{EntitySource, FetchError, StatusClient};
