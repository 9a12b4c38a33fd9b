use crate::api::HttpFetcher;
use crate::application::{BatchEvent, BatchFetcher, BatchPlan};
use crate::config::{AppConfig, CredentialStore};
use crate::domain::{AppError, DownloadPhase};
use crate::ui::{DownloadMessage, DownloadView};
use crate::utils::parse_url_list;
use futures::StreamExt;
use iced::Task;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

pub struct DownloadApp {
    view: DownloadView,
    fetcher: Result<BatchFetcher, String>,
    store: CredentialStore,
    cancel_requested: Arc<AtomicBool>,
}

impl DownloadApp {
    pub fn new(config: AppConfig) -> Self {
        let store = config.credential_store();
        let cancel_requested = Arc::new(AtomicBool::new(false));

        let flag = cancel_requested.clone();
        let fetcher = HttpFetcher::new(config.http)
            .map(|http| {
                BatchFetcher::new(Arc::new(http))
                    .with_cancel_check(move || flag.load(Ordering::SeqCst))
            })
            .map_err(|e| e.to_string());

        let mut view = DownloadView::new(store.load_or_default());
        if let Err(e) = &fetcher {
            view.status_message = e.clone();
        }

        Self {
            view,
            fetcher,
            store,
            cancel_requested,
        }
    }

    fn save_credentials(&self) {
        if let Err(e) = self.store.save(&self.view.credentials()) {
            warn!(path = %self.store.path().display(), error = %e, "Failed to save credentials");
        }
    }

    fn request_folder(&mut self) -> Task<Message> {
        if self.view.is_busy() {
            return Task::none();
        }
        if parse_url_list(&self.view.urls.text()).is_empty() {
            self.view.refuse_start(&AppError::NoUrls);
            return Task::none();
        }

        self.view.phase = DownloadPhase::AwaitingFolder;
        self.view.status_message = "Please select a download folder...".to_string();

        Task::perform(
            async {
                rfd::AsyncFileDialog::new()
                    .set_title("Choose a download folder")
                    .pick_folder()
                    .await
                    .map(|handle| handle.path().to_path_buf())
            },
            Message::FolderSelected,
        )
    }

    fn start_batch(&mut self, folder: Option<PathBuf>) -> Task<Message> {
        let urls = parse_url_list(&self.view.urls.text());
        let plan = match BatchPlan::new(urls, folder, self.view.credentials()) {
            Ok(plan) => plan,
            Err(e) => {
                self.view.refuse_start(&e);
                return Task::none();
            }
        };

        let fetcher = match &self.fetcher {
            Ok(fetcher) => fetcher.clone(),
            Err(e) => {
                self.view.refuse_start(&AppError::Fetch(e.clone()));
                return Task::none();
            }
        };

        self.cancel_requested.store(false, Ordering::SeqCst);
        self.view.start_batch(plan.urls().len());

        Task::stream(fetcher.batch_stream(plan).map(Message::Batch))
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    /// Folder chosen in the dialog, `None` when it was dismissed
    FolderSelected(Option<PathBuf>),
    Batch(BatchEvent),
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            match ui_msg {
                DownloadMessage::UsernameChanged(_) | DownloadMessage::PasswordChanged(_) => {
                    app.save_credentials();
                }
                DownloadMessage::DownloadPressed => return app.request_folder(),
                DownloadMessage::RetryPressed => {
                    if !app.view.is_busy() {
                        app.view.load_failed_into_input();
                        return app.request_folder();
                    }
                }
                DownloadMessage::CancelPressed => {
                    app.cancel_requested.store(true, Ordering::SeqCst);
                    app.view.status_message = "Cancelling after the current URL...".to_string();
                }
                DownloadMessage::UrlsEdited(_) | DownloadMessage::FailedUrlsEdited(_) => {}
            }
        }
        Message::FolderSelected(folder) => return app.start_batch(folder),
        Message::Batch(BatchEvent::Progress(progress)) => {
            app.view.record_progress(&progress);
        }
        Message::Batch(BatchEvent::Finished(run)) => {
            app.view.finish_batch(&run);
        }
    }
    Task::none()
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::UiMessage)
}
