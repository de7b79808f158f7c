//! Flattened view of an inventory as schedulable units, grouped by resource name.

use crate::{Device, Health, Inventory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const RESOURCE_NAME_PREFIX: &str = "xilinx.com/fpga-";
pub const DEVICE_SPEC_PERMISSIONS: &str = "rw";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DeviceSpec {
    pub container_path: String,
    pub host_path: String,
    pub permissions: String,
}

impl DeviceSpec {
    fn passthrough(path: &str) -> Self {
        Self {
            container_path: path.to_string(),
            host_path: path.to_string(),
            permissions: DEVICE_SPEC_PERMISSIONS.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AllocatableUnit {
    pub id: String, // <serial>-<pci address>
    pub health: Health,
    pub device_specs: Vec<DeviceSpec>,
}

impl Device {
    /// Cards running the same shell image share one resource name.
    pub fn resource_name(&self) -> String {
        let suffix = format!("{}-{}", self.shell_version, self.build_timestamp);
        let suffix: String = suffix
            .chars()
            .map(|ch| match ch {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '_' | '-' => ch,
                _ => '_',
            })
            .collect();
        format!("{}{}", RESOURCE_NAME_PREFIX, suffix)
    }

    pub fn allocatable_units(&self) -> Vec<AllocatableUnit> {
        self.nodes
            .iter()
            .map(|node| {
                let mut device_specs = vec![
                    DeviceSpec::passthrough(&node.primary_device_path),
                    DeviceSpec::passthrough(&node.subdevice_path),
                ];
                if let Some(dma) = &node.streaming_dma_path {
                    device_specs.push(DeviceSpec::passthrough(dma));
                }
                AllocatableUnit {
                    id: format!("{}-{}", self.serial_number, node.address),
                    health: self.health,
                    device_specs,
                }
            })
            .collect()
    }
}

impl Inventory {
    pub fn allocatable(&self) -> BTreeMap<String, Vec<AllocatableUnit>> {
        let mut resources: BTreeMap<String, Vec<AllocatableUnit>> = BTreeMap::new();
        for device in self.devices.values() {
            resources
                .entry(device.resource_name())
                .or_default()
                .extend(device.allocatable_units());
        }
        resources
    }
}
