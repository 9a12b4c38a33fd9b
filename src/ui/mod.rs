use iced::{
    widget::{
        button, column, progress_bar, row, scrollable, text, text_editor, text_input, Space,
    },
    Element, Length,
};

use crate::domain::{AppError, BatchProgress, BatchRun, Credentials, DownloadPhase};

/// Main view state
pub struct DownloadView {
    pub username: String,
    pub password: String,
    pub urls: text_editor::Content,
    pub failed_urls: text_editor::Content,
    pub log: Vec<String>,
    pub status_message: String,
    pub progress: f32,
    pub phase: DownloadPhase,
    has_failures: bool,
}

impl DownloadView {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            username: credentials.username,
            password: credentials.password,
            urls: text_editor::Content::new(),
            failed_urls: text_editor::Content::new(),
            log: Vec::new(),
            status_message: "Enter the URLs to download, one per line".to_string(),
            progress: 0.0,
            phase: DownloadPhase::Idle,
            has_failures: false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UsernameChanged(String),
    PasswordChanged(String),
    UrlsEdited(text_editor::Action),
    FailedUrlsEdited(text_editor::Action),
    DownloadPressed,
    RetryPressed,
    CancelPressed,
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::UsernameChanged(username) => {
                self.username = username;
            }
            DownloadMessage::PasswordChanged(password) => {
                self.password = password;
            }
            DownloadMessage::UrlsEdited(action) => {
                self.urls.perform(action);
            }
            DownloadMessage::FailedUrlsEdited(action) => {
                self.failed_urls.perform(action);
            }
            DownloadMessage::DownloadPressed
            | DownloadMessage::RetryPressed
            | DownloadMessage::CancelPressed => {
                // Will be handled by the app
            }
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self.phase,
            DownloadPhase::AwaitingFolder | DownloadPhase::Downloading
        )
    }

    /// Moves the (possibly edited) failed list into the URL input.
    pub fn load_failed_into_input(&mut self) {
        self.urls = text_editor::Content::with_text(&self.failed_urls.text());
        self.failed_urls = text_editor::Content::new();
        self.has_failures = false;
    }

    pub fn refuse_start(&mut self, error: &AppError) {
        self.phase = DownloadPhase::Idle;
        self.status_message = error.to_string();
    }

    pub fn start_batch(&mut self, total: usize) {
        self.phase = DownloadPhase::Downloading;
        self.progress = 0.0;
        self.log.clear();
        self.has_failures = false;
        self.status_message = format!("Downloading {} URL(s)...", total);
    }

    pub fn record_progress(&mut self, progress: &BatchProgress) {
        self.log.push(progress.to_string());
        self.progress = progress.fraction();
        self.status_message = format!("Processed {} of {}", progress.index, progress.total);
    }

    pub fn finish_batch(&mut self, run: &BatchRun) {
        self.log.push(String::new());
        self.log.push("Download completed.".to_string());
        self.log.push(format!(
            "Retrieved {} out of {} files.",
            run.succeeded_count(),
            run.total()
        ));

        let retry = run.retry_urls();
        self.has_failures = !retry.is_empty();
        self.failed_urls = text_editor::Content::with_text(&retry.join("\n"));

        if run.was_cancelled() {
            self.phase = DownloadPhase::Cancelled;
            self.status_message = format!(
                "Cancelled; {} URL(s) were not attempted",
                run.unprocessed().len()
            );
        } else {
            self.phase = DownloadPhase::Completed;
            self.progress = 1.0;
            self.status_message = if self.has_failures {
                "Some URLs failed. Edit the list below and retry if needed.".to_string()
            } else {
                "Failed URLs: none".to_string()
            };
        }
    }

    pub fn view(&self) -> Element<'_, DownloadMessage> {
        let busy = self.is_busy();

        let controls = row![
            button("Download")
                .on_press_maybe((!busy).then_some(DownloadMessage::DownloadPressed))
                .padding([10, 20]),
            button("Cancel")
                .on_press_maybe(
                    (self.phase == DownloadPhase::Downloading)
                        .then_some(DownloadMessage::CancelPressed)
                )
                .padding([10, 20]),
        ]
        .spacing(10);

        let mut content = column![
            text("HTML File Downloader").size(32),
            Space::new().height(Length::Fixed(20.0)),
            text_input("Username", &self.username)
                .on_input(DownloadMessage::UsernameChanged)
                .padding(10),
            text_input("Password", &self.password)
                .on_input(DownloadMessage::PasswordChanged)
                .secure(true)
                .padding(10),
            text("URLs to download, one per line:").size(16),
            text_editor(&self.urls)
                .on_action(DownloadMessage::UrlsEdited)
                .height(Length::Fixed(150.0)),
            controls,
            progress_bar(0.0..=1.0, self.progress),
            text(&self.status_message).size(14),
            scrollable(text(self.log.join("\n")).size(13)).height(Length::Fixed(220.0)),
        ]
        .padding(20)
        .spacing(10);

        if self.has_failures {
            content = content
                .push(text("Failed URLs:").size(16))
                .push(
                    text_editor(&self.failed_urls)
                        .on_action(DownloadMessage::FailedUrlsEdited)
                        .height(Length::Fixed(120.0)),
                )
                .push(
                    button("Retry failed URLs")
                        .on_press_maybe((!busy).then_some(DownloadMessage::RetryPressed))
                        .padding([10, 20]),
                );
        }

        content.into()
    }
}
