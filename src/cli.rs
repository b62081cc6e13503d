//! Command-line interface parsing
//!
//! Clap argument handling for the URL overrides and the headless `--warm`
//! mode. The signing secret deliberately has no flag: it comes from the
//! environment only, so it never shows up in shell history or `ps` output.

use clap::Parser;

/// Porthole - terminal panel for your account on a remote service
#[derive(Parser, Debug)]
#[command(name = "porthole")]
#[command(about = "Signed, cached view of your account status and announcements")]
#[command(version)]
pub struct Cli {
    /// Override the API base URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Override the login page URL shown to logged-out users
    #[arg(long, value_name = "URL")]
    pub login_url: Option<String>,

    /// Warm the user-status cache and exit without starting the panel
    #[arg(long)]
    pub warm: bool,
}
