//! Status command implementation

use chrono::Local;
use colored::Colorize;

use crate::cli::CommandContext;
use crate::config::Config;
use crate::error::Result;

/// Run the status command to display configuration and cache state
pub fn run(ctx: &CommandContext, config_path: Option<&str>) -> Result<()> {
    println!("{}\n", "rollcall Status".bold());

    let path = Config::resolve_path(config_path)?;
    println!("Config file: {}", path.display().to_string().cyan());
    println!("Feed base URL: {}", ctx.config.base_url.cyan());
    if let Some(login_url) = ctx.config.login_url.as_deref() {
        println!("Login page: {}", login_url.cyan());
    }
    if let Some(term_no) = ctx.config.term_no {
        println!("Term/week override: {} / {}", term_no, ctx.config.week.unwrap_or_default());
    }
    println!();

    if ctx.tokens.access_token().is_some() {
        if ctx.tokens.is_fresh() {
            println!("{} Access token stored", "✓".green());
        } else {
            println!("{} Access token stored but stale (cleared since last save)", "⚠".yellow());
        }
    } else {
        println!("{} No access token", "✗".red());
        println!("  → Run 'rollcall init' to configure");
    }
    println!();

    let today = Local::now().date_naive();
    let status = ctx.repository().cache_status(today);
    if !status.exists {
        println!("{} Weekly cache absent", "✗".red());
    } else if status.is_expired {
        println!(
            "{} Weekly cache expired (expires: {})",
            "⚠".yellow(),
            status.expires_date.as_deref().unwrap_or("unknown")
        );
    } else {
        println!(
            "{} Weekly cache valid until {}",
            "✓".green(),
            status.expires_date.as_deref().unwrap_or("unknown")
        );
    }
    if status.exists {
        println!("  Size: {} bytes", status.size_bytes);
        if let Some(dt) = chrono::DateTime::from_timestamp(status.last_modified, 0) {
            println!(
                "  Last modified: {}",
                dt.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            );
        }
    }

    Ok(())
}
