//! Query log command implementation

use colored::Colorize;
use tabled::Tabled;

use crate::cli::{CommandContext, OutputFormat};
use crate::error::Result;
use crate::output::{format_json, format_table};
use crate::watch::QueryLog;

#[derive(Tabled)]
struct LogRow {
    #[tabled(rename = "QUERIED AT")]
    queried_at: String,
    #[tabled(rename = "SLOT")]
    key: String,
    #[tabled(rename = "RESULT")]
    result: String,
    #[tabled(rename = "DETAIL")]
    detail: String,
}

/// Show the verification query log, newest last.
pub fn run(ctx: &CommandContext, limit: Option<usize>) -> Result<()> {
    let records = QueryLog::new(&ctx.store).load();
    let start = limit
        .map(|n| records.len().saturating_sub(n))
        .unwrap_or(0);
    let records = &records[start..];

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(records)?),
        OutputFormat::Table => {
            let rows: Vec<LogRow> = records
                .iter()
                .map(|r| LogRow {
                    queried_at: r.queried_at.clone(),
                    key: r.key.clone(),
                    result: if r.success {
                        "✓".green().to_string()
                    } else {
                        "✗".red().to_string()
                    },
                    detail: truncate(&r.detail, 48),
                })
                .collect();
            println!("{}", format_table(&rows));
        }
    }

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max).collect();
    format!("{}...", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("short", 48), "short");
    }

    #[test]
    fn truncate_respects_multibyte_boundaries() {
        let long = "教".repeat(60);
        let result = truncate(&long, 48);
        assert!(result.ends_with("..."));
        assert_eq!(result.chars().count(), 51);
    }
}
