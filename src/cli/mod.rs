use anyhow::{Context, Result, bail};

mod progress;
mod terminal;

use dadjoke::contexts::{
    ApiKeySource, BackendClient, FileStore, JokeClient, Notification, Notifier,
    clear_api_key, key_fingerprint, mask_api_key, resolve_api_key, save_api_key,
    API_KEY_STORAGE_KEY,
};
use dadjoke::data::KeyValueStore;
use dadjoke::registries::{HttpCompletionUpstream, Settings};
use progress::ProgressIndicator;
use terminal::TerminalNotifier;

#[derive(Clone, Copy)]
pub struct Config {
    pub verbose: bool,
    pub dry_run: bool,
}

const LOADING_JOKE: &str = "SCANNING HUMOR DATABASE...";
const LOADING_ARCHIVE: &str = "ACCESSING DATABASE...";

fn open_store(settings: &Settings) -> FileStore {
    FileStore::new(Some(settings.store_dir.clone()))
}

/// Generates `count` jokes from the LLM through a single client, so no joke
/// repeats within the run.
pub async fn generate_jokes(count: usize, settings: &Settings, config: &Config) -> Result<()> {
    let upstream = HttpCompletionUpstream::new(Some(settings.api_base_url.clone()));
    let endpoint = upstream.completions_url();
    let mut client = JokeClient::new(
        settings.client_config(),
        open_store(settings),
        upstream,
        TerminalNotifier,
    );

    if config.dry_run {
        match client.resolved_key() {
            Some(key) => println!(
                "Would send with API key {} from {}",
                mask_api_key(&key.value),
                key.source
            ),
            None => println!("No API key available; the request would not be sent"),
        }
        let request = client.preview_request();
        println!("POST {}", endpoint);
        println!(
            "{}",
            serde_json::to_string_pretty(&request).context("Failed to serialize request")?
        );
        return Ok(());
    }

    terminal::render_banner();
    let mut progress = ProgressIndicator::new(count);

    for _ in 0..count {
        if count > 1 {
            progress.start_item();
        }
        terminal::render_loading(LOADING_JOKE);

        let result = client.fetch_joke().await;
        progress.complete_item(result.is_ok());

        if result.is_ok() {
            terminal::render_joke(&result.text);
        } else if client.resolved_key().is_none() {
            // Every further request would fail the same way
            break;
        }
    }

    if config.verbose {
        println!(
            "{} joke(s) remembered this session",
            client.seen_jokes().len()
        );
    }
    if count > 1 {
        progress.finish();
    }
    if progress.failed() > 0 {
        bail!("{} of {} joke request(s) failed", progress.failed(), count);
    }

    Ok(())
}

/// Fetches a joke from the backend's `/joke` endpoint.
pub async fn server_joke(settings: &Settings, config: &Config) -> Result<()> {
    let backend = BackendClient::new(settings.backend_url.clone());

    if config.dry_run {
        println!("GET {}/joke", settings.backend_url.trim_end_matches('/'));
        return Ok(());
    }

    terminal::render_banner();
    terminal::render_loading(LOADING_JOKE);

    match backend.fetch_joke().await {
        Ok(joke) => {
            terminal::render_joke(&joke);
            Ok(())
        }
        Err(e) => {
            log::error!("[backend] Error fetching dad joke: {}", e);
            TerminalNotifier.notify(Notification::Failure(e.to_string()));
            bail!("backend joke request failed")
        }
    }
}

/// Lists the backend's recent jokes.
pub async fn recent_jokes(settings: &Settings, config: &Config) -> Result<()> {
    let backend = BackendClient::new(settings.backend_url.clone());

    if config.dry_run {
        println!(
            "GET {}/jokes/recent",
            settings.backend_url.trim_end_matches('/')
        );
        return Ok(());
    }

    terminal::render_loading(LOADING_ARCHIVE);

    match backend.recent_jokes().await {
        Ok(records) => {
            terminal::render_recent(&records, chrono::Utc::now());
            Ok(())
        }
        Err(e) => {
            log::error!("[backend] Error fetching recent jokes: {}", e);
            terminal::render_error(&format!("Failed to fetch recent jokes: {}", e));
            bail!("recent jokes request failed")
        }
    }
}

pub fn set_key(key: &str, settings: &Settings, config: &Config) -> Result<()> {
    let store = open_store(settings);

    if config.dry_run {
        println!(
            "Would store API key {} in {}",
            mask_api_key(key.trim()),
            store.folder().display()
        );
        return Ok(());
    }

    if let Err(e) = save_api_key(&store, key) {
        terminal::render_error(&e.to_string());
        bail!(e);
    }

    if store.get(API_KEY_STORAGE_KEY).is_none() {
        bail!(
            "API key could not be written to {}",
            store.folder().display()
        );
    }

    TerminalNotifier.notify(Notification::Success(
        "API key saved successfully".to_string(),
    ));
    if settings.env_api_key.is_some() {
        println!("Note: an API key from the environment takes precedence over the stored one.");
    }

    Ok(())
}

pub fn clear_key(settings: &Settings, config: &Config) -> Result<()> {
    let store = open_store(settings);

    if config.dry_run {
        println!("Would remove the stored API key from {}", store.folder().display());
        return Ok(());
    }

    clear_api_key(&store);
    TerminalNotifier.notify(Notification::Success("API key cleared".to_string()));
    Ok(())
}

pub fn show_key(settings: &Settings, config: &Config) -> Result<()> {
    let store = open_store(settings);

    match resolve_api_key(settings.env_api_key.as_deref(), &store) {
        Some(key) => {
            println!("API key:     {}", mask_api_key(&key.value));
            println!("Source:      {}", key.source);
            println!("Fingerprint: {}", key_fingerprint(&key.value));

            let stored = store.get(API_KEY_STORAGE_KEY);
            if key.source == ApiKeySource::Environment && stored.is_some() {
                println!("A stored key exists but is overridden by the environment.");
            }
        }
        None => {
            TerminalNotifier.notify(Notification::MissingKey(
                "no API key available".to_string(),
            ));
        }
    }

    if config.verbose {
        println!("Store:       {}", store.folder().display());
    }

    Ok(())
}
