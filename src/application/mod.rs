pub mod batch_fetcher;

pub use batch_fetcher::{BatchEvent, BatchFetcher, BatchPlan};
