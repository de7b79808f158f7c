use anyhow::{Context, Result};
use fpga_core::{now_utc_rfc3339, Inventory, INVENTORY_SCHEMA_VERSION};
use fpga_host_linux::SkippedFunction;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct ReportPaths {
    pub run_id: String,
    pub root: PathBuf,
    pub inventory_json: PathBuf,
    pub run_json: PathBuf,
}

#[derive(Debug, Serialize)]
struct SkippedEntry {
    pci_id: String,
    reason: String,
}

#[derive(Debug, Serialize)]
struct RunMetadata {
    run_id: String,
    created_at_utc: String,
    inventory_schema_version: String,
    cards: usize,
    nodes: usize,
    skipped: Vec<SkippedEntry>,
    meta: Option<Value>,
}

pub fn create_report_bundle(
    base: impl AsRef<Path>,
    inventory: &Inventory,
    skipped: &[SkippedFunction],
    meta: Option<Value>,
) -> Result<ReportPaths> {
    let run_id = Uuid::new_v4().to_string();
    let root = base.as_ref().join("reports").join(&run_id);
    std::fs::create_dir_all(&root).with_context(|| format!("create {}", root.display()))?;

    let inventory_json = root.join("inventory.json");
    let run_json = root.join("run.json");

    std::fs::write(&inventory_json, serde_json::to_string_pretty(inventory)?)
        .with_context(|| format!("write {}", inventory_json.display()))?;

    let run_meta = RunMetadata {
        run_id: run_id.clone(),
        created_at_utc: now_utc_rfc3339(),
        inventory_schema_version: INVENTORY_SCHEMA_VERSION.to_string(),
        cards: inventory.devices.len(),
        nodes: inventory.node_count(),
        skipped: skipped
            .iter()
            .map(|entry| SkippedEntry {
                pci_id: entry.pci_id.clone(),
                reason: entry.reason.to_string(),
            })
            .collect(),
        meta,
    };
    std::fs::write(&run_json, serde_json::to_string_pretty(&run_meta)?)
        .with_context(|| format!("write {}", run_json.display()))?;

    info!(run_id = %run_id, root = %root.display(), "wrote inventory report");
    Ok(ReportPaths {
        run_id,
        root,
        inventory_json,
        run_json,
    })
}
