use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("Failed to load credentials: {0}")]
    AuthLoad(String),

    #[error("Enter at least one URL")]
    NoUrls,

    #[error("No download folder was selected")]
    NoDestination,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Failed to save: {0}")]
    Save(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_and_save_messages_differ() {
        let fetch = AppError::Fetch("HTTP 404".to_string()).to_string();
        let save = AppError::Save("permission denied".to_string()).to_string();
        assert!(fetch.starts_with("Fetch failed"));
        assert!(save.starts_with("Failed to save"));
    }
}
