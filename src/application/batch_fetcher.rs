use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::{stream::BoxStream, StreamExt};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::{
    api::{ByteStream, Fetcher},
    domain::{AppError, BatchProgress, BatchRun, Credentials, DownloadRequest, DownloadResult},
    utils::map_to_path,
};

/// Polled once before each URL; returning `true` stops the batch.
pub type CancelCheck = Arc<dyn Fn() -> bool + Send + Sync>;

#[derive(Debug, Clone)]
pub enum BatchEvent {
    Progress(BatchProgress),
    Finished(BatchRun),
}

/// Validated input for one batch run.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    urls: Vec<String>,
    credentials: Credentials,
    base_dir: PathBuf,
}

impl BatchPlan {
    pub fn new(
        urls: Vec<String>,
        base_dir: Option<PathBuf>,
        credentials: Credentials,
    ) -> Result<Self, AppError> {
        if urls.is_empty() {
            return Err(AppError::NoUrls);
        }
        let base_dir = base_dir.ok_or(AppError::NoDestination)?;
        if !credentials.is_complete() {
            return Err(AppError::AuthLoad(
                "username and password are required".to_string(),
            ));
        }

        Ok(Self {
            urls,
            credentials,
            base_dir,
        })
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }
}

/// Sequential fetch-and-save over a URL list. Holds no state between runs.
#[derive(Clone)]
pub struct BatchFetcher {
    fetcher: Arc<dyn Fetcher>,
    cancel_check: CancelCheck,
}

impl BatchFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            cancel_check: Arc::new(|| false),
        }
    }

    pub fn with_cancel_check(mut self, check: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.cancel_check = Arc::new(check);
        self
    }

    /// Run the whole batch, reporting each processed URL to `on_progress`.
    pub async fn run_batch(
        &self,
        plan: BatchPlan,
        mut on_progress: impl FnMut(&BatchProgress),
    ) -> BatchRun {
        let mut events = self.batch_stream(plan);
        while let Some(event) = events.next().await {
            match event {
                BatchEvent::Progress(progress) => on_progress(&progress),
                BatchEvent::Finished(run) => return run,
            }
        }
        BatchRun::default()
    }

    /// One `Progress` per URL in input order, then a single `Finished`.
    pub fn batch_stream(&self, plan: BatchPlan) -> BoxStream<'static, BatchEvent> {
        let total = plan.urls.len();
        info!(total, base_dir = %plan.base_dir.display(), "Starting batch");

        let pending: Vec<DownloadRequest> = plan
            .urls
            .into_iter()
            .map(|url| DownloadRequest::new(url, plan.credentials.clone()))
            .collect();

        futures::stream::unfold(
            BatchState::Running(BatchCursor {
                fetcher: self.fetcher.clone(),
                cancel_check: self.cancel_check.clone(),
                base_dir: plan.base_dir,
                pending: pending.into_iter(),
                total,
                run: BatchRun::new(),
            }),
            |state| async move {
                match state {
                    BatchState::Running(mut cursor) => match cursor.pending.next() {
                        Some(request) => {
                            if (cursor.cancel_check)() {
                                let mut unprocessed = vec![request.url];
                                unprocessed.extend(cursor.pending.by_ref().map(|r| r.url));
                                warn!(
                                    processed = cursor.run.processed(),
                                    skipped = unprocessed.len(),
                                    "Batch cancelled"
                                );
                                cursor.run.cancel(unprocessed);
                                return Some((
                                    BatchEvent::Finished(cursor.run),
                                    BatchState::Finished,
                                ));
                            }

                            let index = cursor.run.processed() + 1;
                            debug!(index, total = cursor.total, url = %request.url, "Processing");
                            let result =
                                process_one(cursor.fetcher.as_ref(), request, &cursor.base_dir)
                                    .await;
                            cursor.run.push(result.clone());

                            Some((
                                BatchEvent::Progress(BatchProgress {
                                    index,
                                    total: cursor.total,
                                    result,
                                }),
                                BatchState::Running(cursor),
                            ))
                        }
                        None => {
                            info!(
                                succeeded = cursor.run.succeeded_count(),
                                total = cursor.run.total(),
                                "Batch finished"
                            );
                            Some((BatchEvent::Finished(cursor.run), BatchState::Finished))
                        }
                    },
                    BatchState::Finished => None,
                }
            },
        )
        .boxed()
    }
}

struct BatchCursor {
    fetcher: Arc<dyn Fetcher>,
    cancel_check: CancelCheck,
    base_dir: PathBuf,
    pending: std::vec::IntoIter<DownloadRequest>,
    total: usize,
    run: BatchRun,
}

enum BatchState {
    Running(BatchCursor),
    Finished,
}

async fn process_one(
    fetcher: &dyn Fetcher,
    request: DownloadRequest,
    base_dir: &Path,
) -> DownloadResult {
    match fetch_and_save(fetcher, &request, base_dir).await {
        Ok(path) => {
            info!(url = %request.url, path = %path.display(), "Saved");
            DownloadResult::success(request, path)
        }
        Err(e) => {
            warn!(url = %request.url, error = %e, "Download failed");
            DownloadResult::failure(request, e.to_string())
        }
    }
}

async fn fetch_and_save(
    fetcher: &dyn Fetcher,
    request: &DownloadRequest,
    base_dir: &Path,
) -> Result<PathBuf, AppError> {
    let body = fetcher
        .fetch(&request.url, &request.credentials)
        .await
        .map_err(|e| AppError::Fetch(e.to_string()))?;

    let path = map_to_path(base_dir, &request.url)
        .map_err(|e| AppError::Save(format!("Cannot map {} to a path: {}", request.url, e)))?;

    save_body(&path, body).await?;
    Ok(path)
}

async fn save_body(path: &Path, mut body: ByteStream) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            AppError::Save(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    let mut file = tokio::fs::File::create(path).await.map_err(|e| {
        AppError::Save(format!("Failed to create file {}: {}", path.display(), e))
    })?;

    let mut written: u64 = 0;
    while let Some(chunk) = body.next().await {
        // A broken body is a transport failure, not a disk one.
        let chunk = chunk.map_err(|e| AppError::Fetch(e.to_string()))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| AppError::Save(format!("Write error: {}", e)))?;
        written += chunk.len() as u64;
    }

    file.sync_all()
        .await
        .map_err(|e| AppError::Save(format!("Failed to sync file: {}", e)))?;

    debug!(path = %path.display(), bytes = written, "Body written");
    Ok(())
}
