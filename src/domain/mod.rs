pub mod error;
pub mod model;

pub use error::AppError;
pub use model::{
    BatchProgress, BatchRun, Credentials, DownloadPhase, DownloadRequest, DownloadResult,
};
