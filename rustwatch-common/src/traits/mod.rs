pub mod api;

pub use api::{ChatTransport, ProfileFetcher};
