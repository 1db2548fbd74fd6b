//! Table statistics.
//!
//! Record counts per kind plus the database file size. Used by
//! `cguide stats` to confirm a seed or import landed.

use anyhow::Result;
use std::collections::BTreeMap;

use community_guide_core::FailureMode;

use crate::config::Config;
use crate::service;

/// Run the stats command: count records and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let store = service::connect_store(config).await?;
    let dal = service::data_access(config, store).with_failure_mode(FailureMode::Strict);
    let counts = dal.record_counts().await?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    print!("{}", render(config, db_size, &counts));
    Ok(())
}

fn render(config: &Config, db_size: u64, counts: &BTreeMap<String, usize>) -> String {
    let total: usize = counts.values().sum();
    let mut out = String::new();
    out.push_str("Community Guide Database Stats\n");
    out.push_str("==============================\n\n");
    out.push_str(&format!("  Database:    {}\n", config.db.path.display()));
    out.push_str(&format!("  Size:        {}\n\n", format_bytes(db_size)));
    out.push_str(&format!("  {:<12} {:>6}\n", "KIND", "COUNT"));
    out.push_str(&format!("  {}\n", "-".repeat(19)));
    for (kind, count) in counts {
        out.push_str(&format!("  {:<12} {:>6}\n", kind, count));
    }
    out.push_str(&format!("  {:<12} {:>6}\n\n", "total", total));
    out
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn test_render_lists_kinds_and_total() {
        let config: Config = toml::from_str(
            "[db]\npath = \"./data/test.sqlite\"\n[server]\nbind = \"127.0.0.1:0\"\n",
        )
        .unwrap();
        let counts: BTreeMap<String, usize> = [("event", 5), ("venue", 2)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let text = render(&config, 4096, &counts);
        assert!(text.contains("./data/test.sqlite"));
        assert!(text.contains("4.0 KB"));
        assert!(text.contains("  event             5\n"));
        assert!(text.contains("  total             7\n"));
    }
}
