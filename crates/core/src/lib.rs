use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

pub mod allocation;
pub mod pci;

pub use allocation::{AllocatableUnit, DeviceSpec};
pub use pci::{encode_instance, PciAddress, PciAddressError, PciField};

pub const INVENTORY_SCHEMA_VERSION: &str = "1.0.0";

/// Serial number -> card.
pub type DeviceMap = BTreeMap<String, Device>;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Healthy,
    Unhealthy,
}

/// One user-facing access point of a user PF.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Node {
    pub primary_device_path: String, // /dev/dri/renderD*
    pub subdevice_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streaming_dma_path: Option<String>,
    pub address: String, // PCI address of the owning function
    #[serde(skip)]
    internal_device_id: String,
}

impl Node {
    pub fn new(
        address: impl Into<String>,
        internal_device_id: impl Into<String>,
        primary_device_path: impl Into<String>,
        subdevice_path: impl Into<String>,
    ) -> Self {
        Self {
            primary_device_path: primary_device_path.into(),
            subdevice_path: subdevice_path.into(),
            streaming_dma_path: None,
            address: address.into(),
            internal_device_id: internal_device_id.into(),
        }
    }

    pub fn with_streaming_dma(mut self, path: impl Into<String>) -> Self {
        self.streaming_dma_path = Some(path.into());
        self
    }

    /// Raw `device` id of the function, kept for disambiguating PFs later on.
    pub fn internal_device_id(&self) -> &str {
        &self.internal_device_id
    }
}

/// One physical card, keyed by serial number in a [`DeviceMap`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Device {
    pub serial_number: String,
    pub shell_version: String,
    pub build_timestamp: String,
    pub health: Health,
    pub nodes: Vec<Node>,
}

impl Device {
    pub fn new(
        serial_number: impl Into<String>,
        shell_version: impl Into<String>,
        build_timestamp: impl Into<String>,
        node: Node,
    ) -> Self {
        Self {
            serial_number: serial_number.into(),
            shell_version: shell_version.into(),
            build_timestamp: build_timestamp.into(),
            health: Health::Healthy,
            nodes: vec![node],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Inventory {
    pub inventory_id: Uuid,
    pub schema_version: String,
    pub devices: DeviceMap,
    pub generated_at_utc: String,
}

impl Inventory {
    pub fn new(devices: DeviceMap) -> Self {
        Self {
            inventory_id: Uuid::new_v4(),
            schema_version: INVENTORY_SCHEMA_VERSION.to_string(),
            devices,
            generated_at_utc: now_utc_rfc3339(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.devices.values().map(|device| device.nodes.len()).sum()
    }
}

pub fn now_utc_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(address: &str) -> Node {
        Node::new(address, "0x5001", "/dev/dri/renderD128", "/dev/xfpga")
    }

    #[test]
    fn new_device_is_healthy_with_one_node() {
        let device = Device::new("ABC123", "v1", "1111", node("0000:03:00.1"));
        assert_eq!(device.health, Health::Healthy);
        assert_eq!(device.nodes.len(), 1);
    }

    #[test]
    fn internal_device_id_is_not_serialized() {
        let value = serde_json::to_value(node("0000:03:00.1")).unwrap();
        assert!(value.get("internal_device_id").is_none());
        assert_eq!(value["primary_device_path"], "/dev/dri/renderD128");
        assert!(value.get("streaming_dma_path").is_none());
    }

    #[test]
    fn streaming_dma_path_round_trips_when_present_or_absent() {
        let plain: Node = serde_json::from_value(serde_json::to_value(node("0000:03:00.1")).unwrap()).unwrap();
        assert_eq!(plain.streaming_dma_path, None);

        let with_dma = node("0000:3b:00.1").with_streaming_dma("/dev/xfpga/dma.qdma.u15105");
        let value = serde_json::to_value(&with_dma).unwrap();
        assert_eq!(value["streaming_dma_path"], "/dev/xfpga/dma.qdma.u15105");
    }

    #[test]
    fn health_serializes_as_plugin_strings() {
        assert_eq!(serde_json::to_string(&Health::Healthy).unwrap(), "\"Healthy\"");
        assert_eq!(serde_json::to_string(&Health::Unhealthy).unwrap(), "\"Unhealthy\"");
    }

    #[test]
    fn inventory_counts_nodes_across_cards() {
        let mut devices = DeviceMap::new();
        let mut first = Device::new("A", "v1", "1", node("0000:03:00.1"));
        first.nodes.push(node("0000:03:00.4"));
        devices.insert("A".to_string(), first);
        devices.insert("B".to_string(), Device::new("B", "v1", "1", node("0000:04:00.1")));
        let inventory = Inventory::new(devices);
        assert_eq!(inventory.node_count(), 3);
        assert_eq!(inventory.schema_version, INVENTORY_SCHEMA_VERSION);
    }
}
