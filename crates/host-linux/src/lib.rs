use anyhow::{Context, Result};
use fpga_core::{Device, DeviceMap};
use tracing::{debug, info, warn};

pub mod classify;
pub mod error;
pub mod identity;
pub mod layout;
pub mod sysfs;

#[cfg(test)]
pub(crate) mod fixture;

pub use classify::{FunctionRole, PciFunction};
pub use error::SkipReason;
pub use identity::{CardIdentity, ExtractedFunction};
pub use layout::SysfsLayout;
pub use sysfs::{DiskSysfs, MemorySysfs, SysfsReader};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFunction {
    pub pci_id: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub devices: DeviceMap,
    /// FPGA-vendor functions that did not make it into `devices`.
    pub skipped: Vec<SkippedFunction>,
}

/// Serial number -> card for every usable FPGA user PF under `layout.pci_devices`.
pub fn scan(reader: &impl SysfsReader, layout: &SysfsLayout) -> Result<DeviceMap> {
    scan_with_diagnostics(reader, layout).map(|outcome| outcome.devices)
}

pub fn scan_with_diagnostics(reader: &impl SysfsReader, layout: &SysfsLayout) -> Result<ScanOutcome> {
    let pci_ids = reader
        .list_dir(&layout.pci_devices)
        .with_context(|| format!("read {}", layout.pci_devices.display()))?;

    let mut outcome = ScanOutcome::default();
    for pci_id in pci_ids {
        match scan_function(reader, layout, &pci_id) {
            Ok(extracted) => upsert(&mut outcome.devices, extracted),
            Err(reason) => {
                if reason.is_routine() {
                    debug!(pci_id = %pci_id, reason = %reason, "skipping PCI function");
                } else {
                    warn!(pci_id = %pci_id, reason = %reason, "dropping FPGA user function");
                }
                if !reason.is_foreign() {
                    outcome.skipped.push(SkippedFunction { pci_id, reason });
                }
            }
        }
    }

    info!(
        cards = outcome.devices.len(),
        nodes = outcome.devices.values().map(|d| d.nodes.len()).sum::<usize>(),
        skipped = outcome.skipped.len(),
        "FPGA scan complete"
    );
    Ok(outcome)
}

fn scan_function(
    reader: &impl SysfsReader,
    layout: &SysfsLayout,
    pci_id: &str,
) -> Result<ExtractedFunction, SkipReason> {
    PciFunction::probe(reader, layout, pci_id)?.admit()?;
    identity::extract(reader, layout, pci_id)
}

/// First PF seen for a serial number fixes the card's shell and timestamp;
/// later PFs of the same card only add nodes.
fn upsert(devices: &mut DeviceMap, extracted: ExtractedFunction) {
    let ExtractedFunction { identity, node } = extracted;
    match devices.get_mut(&identity.serial_number) {
        Some(device) => device.nodes.push(node),
        None => {
            let device = Device::new(
                identity.serial_number.clone(),
                identity.shell_version,
                identity.build_timestamp,
                node,
            );
            devices.insert(identity.serial_number, device);
        }
    }
}
