//! Init command implementation

use colored::Colorize;
use dialoguer::{Input, Password, theme::ColorfulTheme};

use crate::auth::TokenStore;
use crate::client::feed::normalize_bearer;
use crate::config::Config;
use crate::error::Result;

/// Run the init command: prompt for the feed base URL and a pasted access
/// token, then persist both.
pub fn run(config_path: Option<&str>) -> Result<()> {
    println!("{}", "Welcome to rollcall!".bold().green());
    println!("Let's set up your attendance feed.\n");

    let mut config = Config::load_at(config_path)?;

    let base_url: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Attendance feed base URL")
        .default(config.base_url.clone())
        .interact_text()?;
    config.base_url = base_url.trim().to_string();

    // tokens are captured externally (browser login); the user pastes them
    let access_token: String = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Paste your access token")
        .interact()?;

    let refresh_token: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Paste your refresh token (optional)")
        .allow_empty(true)
        .interact_text()?;

    let tokens = TokenStore::open()?;
    tokens.save_access_token(&normalize_bearer(access_token.trim()))?;
    if !refresh_token.trim().is_empty() {
        tokens.save_refresh_token(Some(refresh_token.trim()))?;
    }

    let path = Config::resolve_path(config_path)?;
    config.save_to(path.clone())?;

    println!();
    println!("{} Configuration saved to {}", "✓".green(), path.display());
    println!("{} Token stored", "✓".green());
    println!("\nNext: run {} to fetch this week's schedule.", "rollcall sync".bold());

    Ok(())
}
