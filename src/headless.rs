//! `fetch` subcommand: one batch run with terminal output.

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

use crate::{
    api::HttpFetcher,
    application::{BatchFetcher, BatchPlan},
    cli::FetchArgs,
    config::{AppConfig, CredentialStore},
    domain::{AppError, BatchRun},
    utils::parse_url_list,
};

pub async fn run(args: FetchArgs, mut config: AppConfig) -> Result<BatchRun, AppError> {
    if args.insecure {
        config.http.verify_tls = false;
    }

    let store = match &args.credentials {
        Some(path) => CredentialStore::from_path(path),
        None => config.credential_store(),
    };
    let credentials = store.load()?;
    let urls = read_url_list(&args.urls)?;
    let plan = BatchPlan::new(urls, Some(args.out.clone()), credentials)?;

    let http = HttpFetcher::new(config.http).map_err(|e| AppError::Fetch(e.to_string()))?;

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current URL");
            flag.store(true, Ordering::SeqCst);
        }
    });

    let fetcher = BatchFetcher::new(Arc::new(http))
        .with_cancel_check(move || interrupted.load(Ordering::SeqCst));

    let run = fetcher
        .run_batch(plan, |progress| println!("{}", progress))
        .await;

    println!();
    println!("Download completed.");
    println!(
        "Retrieved {} out of {} files.",
        run.succeeded_count(),
        run.total()
    );
    if run.failed_count() > 0 {
        println!("{} URL(s) failed.", run.failed_count());
    }
    if run.was_cancelled() {
        println!("Cancelled; {} URL(s) were not attempted.", run.unprocessed().len());
    }

    if let Some(path) = &args.failed_out {
        write_retry_list(path, &run.retry_urls())?;
    }

    if args.json {
        match serde_json::to_string_pretty(&run.summary()) {
            Ok(json) => println!("{}", json),
            Err(e) => warn!(error = %e, "Could not encode summary"),
        }
    }

    Ok(run)
}

fn read_url_list(path: &Path) -> Result<Vec<String>, AppError> {
    let read = if path.as_os_str() == "-" {
        io::read_to_string(io::stdin())
    } else {
        std::fs::read_to_string(path)
    };
    let text = read.map_err(|e| AppError::InvalidInput(format!("{}: {}", path.display(), e)))?;

    Ok(parse_url_list(&text))
}

fn write_retry_list(path: &Path, urls: &[String]) -> Result<(), AppError> {
    let mut content = urls.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    std::fs::write(path, content)
        .map_err(|e| AppError::Save(format!("{}: {}", path.display(), e)))
}
