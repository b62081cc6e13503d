//! Porthole - terminal panel for a remote service account
//!
//! Paints the last-known-good cached data immediately, then refreshes it
//! through a background mediator that signs every outbound request. The
//! panel itself never holds the signing secret or touches the network.

use std::io;
use std::panic;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use porthole::api::ApiClient;
use porthole::app::App;
use porthole::cache::CacheStore;
use porthole::cli::Cli;
use porthole::config::Config;
use porthole::router::{self, LifecycleEvent, RouterHandle, GET_USER_STATUS};
use porthole::ui;

/// Sets up a panic hook that restores the terminal before printing the panic
/// message. This ensures the terminal is usable even if the application
/// panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Warms the user-status cache once and reports the outcome.
///
/// Headless counterpart of the install-time lifecycle trigger, for use from
/// shell profiles or system schedulers.
async fn run_warm(router: &RouterHandle) {
    match router.request(GET_USER_STATUS).await.await {
        Ok(envelope) if envelope.success => println!("user status cache warmed"),
        Ok(envelope) => println!(
            "warm fetch failed: {}",
            envelope.error.unwrap_or_else(|| "unknown error".to_string())
        ),
        Err(_) => println!("warm fetch failed: no reply from mediator"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    // A missing signing secret is fatal: nothing can be fetched without it.
    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("porthole: {err}");
            process::exit(1);
        }
    };
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(login_url) = cli.login_url {
        config.login_url = login_url;
    }

    let store = CacheStore::new().ok_or("could not determine a cache directory")?;
    let client = Arc::new(ApiClient::new(&config, store.clone()));
    let router = router::spawn(client);

    if cli.warm {
        run_warm(&router).await;
        return Ok(());
    }

    // Environment startup fires a reply-less warm fetch of the user status.
    router.notify_lifecycle(LifecycleEvent::Startup).await;

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store, router, config.login_url.clone());

    // Paint whatever the cache holds before any network round-trip.
    app.hydrate_from_cache().await;
    terminal.draw(|f| ui::render(f, &app))?;

    // Live refresh; a failed refresh keeps the cached display.
    app.refresh().await;

    // Main event loop
    loop {
        terminal.draw(|f| ui::render(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if app.refresh_requested {
            app.refresh_requested = false;
            app.refresh().await;
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}
