use anyhow::{Result, bail};
use std::path::Path;
use syndex_engine::scanner::ScanFilter;

use super::{build_engine, resolve_project, state_db_path};

pub fn run(repo_root: &Path, config_file: Option<&Path>) -> Result<()> {
    let ctx = resolve_project(repo_root, config_file)?;

    if !state_db_path(&ctx).exists() {
        bail!("Project not initialized. Run `syndex init` first.");
    }

    let engine = build_engine(&ctx)?;
    let corruption = engine.store_integrity()?;
    let tracked = engine.tracked_file_count(&ctx.project_id)?;
    let last_full_scan = engine.last_full_scan(&ctx.project_id)?;

    // The probe must see the tree through the same filters a sync pass uses,
    // or excluded files would read as permanently out of sync.
    let filter = ScanFilter::new(
        &ctx.config.scan.include_patterns,
        &ctx.config.scan.exclude_patterns,
    )?;
    let stale = engine.quick_sync_check(&ctx.project_id, &ctx.repo_root, &filter)?;

    println!("Project {}", ctx.project_id);
    println!(
        "  Hash store:     {}",
        match &corruption {
            None => "ok".to_string(),
            Some(detail) => format!("CORRUPT ({detail})"),
        }
    );
    println!("  Tracked files:  {}", tracked);
    println!(
        "  Last full scan: {}",
        last_full_scan.as_deref().unwrap_or("(never)")
    );
    println!(
        "  Staleness:      {}",
        if stale {
            "out of sync (run `syndex sync`)"
        } else {
            "probably in sync"
        }
    );

    if corruption.is_some() {
        bail!("Hash store failed integrity check");
    }
    Ok(())
}
