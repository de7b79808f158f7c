//! Where things live in sysfs and `/dev` for the FPGA driver stack.

use std::path::{Path, PathBuf};

pub const SYSFS_PCI_DEVICES: &str = "/sys/bus/pci/devices";
pub const USER_NODE_PREFIX: &str = "/dev/dri";
pub const SUBDEV_PREFIX: &str = "/dev/xfpga";

pub const XILINX_VENDOR_ID: &str = "0x10ee";
pub const ADVANTECH_VENDOR_ID: &str = "0x13fe";
pub const AWS_VENDOR_ID: &str = "0x1d0f";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysfsLayout {
    pub pci_devices: PathBuf,
    pub user_node_prefix: String,
    pub subdev_prefix: String,
    pub vendor_ids: Vec<String>,

    pub vendor_file: String,
    pub device_file: String,
    pub mgmt_marker: String,
    pub user_marker: String,
    pub ready_file: String,
    pub ready_value: String,

    pub xmc_prefix: String,
    pub serial_file: String,
    pub rom_prefix: String,
    pub shell_version_file: String,
    pub timestamp_file: String,
    pub drm_dir: String,
    pub render_prefix: String,
    pub qdma_prefix: String,
}

impl Default for SysfsLayout {
    fn default() -> Self {
        Self {
            pci_devices: PathBuf::from(SYSFS_PCI_DEVICES),
            user_node_prefix: USER_NODE_PREFIX.to_string(),
            subdev_prefix: SUBDEV_PREFIX.to_string(),
            vendor_ids: vec![
                XILINX_VENDOR_ID.to_string(),
                ADVANTECH_VENDOR_ID.to_string(),
                AWS_VENDOR_ID.to_string(),
            ],
            vendor_file: "vendor".to_string(),
            device_file: "device".to_string(),
            mgmt_marker: "mgmt_pf".to_string(),
            user_marker: "user_pf".to_string(),
            ready_file: "ready".to_string(),
            ready_value: "0x1".to_string(),
            xmc_prefix: "xmc.u".to_string(),
            serial_file: "serial_num".to_string(),
            rom_prefix: "rom.u".to_string(),
            shell_version_file: "VBNV".to_string(),
            timestamp_file: "timestamp".to_string(),
            drm_dir: "drm".to_string(),
            render_prefix: "renderD".to_string(),
            qdma_prefix: "dma.qdma.u".to_string(),
        }
    }
}

impl SysfsLayout {
    /// Default layout with the PCI device tree re-rooted, e.g. at a fixture directory.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            pci_devices: root.into(),
            ..Self::default()
        }
    }

    pub fn function_dir(&self, pci_id: &str) -> PathBuf {
        self.pci_devices.join(pci_id)
    }

    pub fn is_accepted_vendor(&self, vendor: &str) -> bool {
        self.vendor_ids
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(vendor))
    }

    pub fn render_node_path(&self, render_node: &str) -> String {
        join_dev(&self.user_node_prefix, render_node)
    }

    pub fn streaming_dma_path(&self, instance: u32) -> String {
        join_dev(&self.subdev_prefix, &format!("{}{}", self.qdma_prefix, instance))
    }
}

fn join_dev(prefix: &str, name: &str) -> String {
    Path::new(prefix).join(name).to_string_lossy().to_string()
}
