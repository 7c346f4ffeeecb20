//! Lexicon database overview for `wm stats`.

use anyhow::Result;

use crate::config::Config;
use crate::db;
use crate::lexicon::LexiconStore;
use crate::models::RelationType;

/// Entry count for one relation table.
pub struct RelationStats {
    pub relation: RelationType,
    pub entries: usize,
}

/// Loads the lexicon the same way the server does and counts entries.
pub async fn collect_stats(config: &Config) -> Result<Vec<RelationStats>> {
    let pool = db::connect(config).await?;
    let lexicon = LexiconStore::load(&pool).await?;
    pool.close().await;

    Ok(RelationType::ALL
        .iter()
        .map(|relation| RelationStats {
            relation: *relation,
            entries: lexicon.len(*relation),
        })
        .collect())
}

/// Run the stats command: load the lexicon and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let stats = collect_stats(config).await?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Word Meaning Lexicon Stats");
    println!("==========================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!();
    println!("  {:<12} {:>8}", "RELATION", "WORDS");
    for s in &stats {
        println!("  {:<12} {:>8}", s.relation.as_str(), s.entries);
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_048_576 {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(12), "12 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1_048_576), "3.0 MB");
    }
}
