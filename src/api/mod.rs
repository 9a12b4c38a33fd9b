pub mod client;
pub mod models;

pub use client::{ByteStream, Fetcher, HttpFetcher};
pub use models::ClientConfig;
