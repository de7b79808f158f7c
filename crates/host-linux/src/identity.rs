//! Card identity and device nodes of a ready user PF.

use crate::error::SkipReason;
use crate::layout::SysfsLayout;
use crate::sysfs::SysfsReader;
use fpga_core::{encode_instance, Node};
use std::path::Path;
use tracing::debug;

/// Identity shared by every PF of one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardIdentity {
    pub serial_number: String,
    pub shell_version: String,
    pub build_timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFunction {
    pub identity: CardIdentity,
    pub node: Node,
}

pub fn extract(
    reader: &impl SysfsReader,
    layout: &SysfsLayout,
    pci_id: &str,
) -> Result<ExtractedFunction, SkipReason> {
    let dir = layout.function_dir(pci_id);

    let xmc = subsystem(reader, &dir, &layout.xmc_prefix)?;
    let serial_number = read(reader, &dir.join(xmc).join(&layout.serial_file))?;

    let rom = dir.join(subsystem(reader, &dir, &layout.rom_prefix)?);
    let shell_version = read(reader, &rom.join(&layout.shell_version_file))?;
    let build_timestamp = read(reader, &rom.join(&layout.timestamp_file))?;

    let device_id = read(reader, &dir.join(&layout.device_file))?;

    let drm = dir.join(subsystem(reader, &dir, &layout.drm_dir)?);
    let render = subsystem(reader, &drm, &layout.render_prefix)?;

    let mut node = Node::new(
        pci_id,
        device_id,
        layout.render_node_path(&render),
        layout.subdev_prefix.clone(),
    );
    if let Some(path) = streaming_dma_path(reader, layout, pci_id) {
        node = node.with_streaming_dma(path);
    }

    Ok(ExtractedFunction {
        identity: CardIdentity {
            serial_number,
            shell_version,
            build_timestamp,
        },
        node,
    })
}

/// The qdma node is optional hardware; any failure here just means "no DMA node".
fn streaming_dma_path(reader: &impl SysfsReader, layout: &SysfsLayout, pci_id: &str) -> Option<String> {
    let instance = match encode_instance(pci_id) {
        Ok(instance) => instance,
        Err(err) => {
            debug!(pci_id = %pci_id, error = %err, "skipping streaming DMA detection");
            return None;
        }
    };
    let dir = layout.function_dir(pci_id);
    match reader.find_first_by_prefix(&dir, &layout.qdma_prefix) {
        Ok(Some(_)) => Some(layout.streaming_dma_path(instance)),
        Ok(None) => None,
        Err(err) => {
            debug!(pci_id = %pci_id, error = %err, "cannot look up streaming DMA subsystem");
            None
        }
    }
}

fn read(reader: &impl SysfsReader, path: &Path) -> Result<String, SkipReason> {
    reader
        .read_trimmed(path)
        .map_err(|_| SkipReason::MissingFile(path.to_path_buf()))
}

fn subsystem(reader: &impl SysfsReader, dir: &Path, prefix: &str) -> Result<String, SkipReason> {
    match reader.find_first_by_prefix(dir, prefix) {
        Ok(Some(name)) => Ok(name),
        _ => Err(SkipReason::MissingSubsystem {
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
        }),
    }
}
