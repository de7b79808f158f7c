//! Test-only builders for FPGA functions in a [`MemorySysfs`] tree.

use crate::sysfs::MemorySysfs;
use crate::SysfsLayout;
use std::path::PathBuf;

pub(crate) const ROOT: &str = "/sys/bus/pci/devices";

#[derive(Debug, Clone, Copy)]
pub(crate) enum Role {
    User,
    Mgmt,
    Both,
    None,
}

#[derive(Debug, Clone)]
pub(crate) struct FnFixture {
    pub pci_id: &'static str,
    pub vendor: Option<&'static str>,
    pub role: Role,
    pub ready: Option<&'static str>,
    pub serial: Option<&'static str>,
    pub shell: Option<&'static str>,
    pub timestamp: Option<&'static str>,
    pub device: Option<&'static str>,
    pub render: Option<&'static str>,
    pub qdma: bool,
}

impl FnFixture {
    pub fn user(pci_id: &'static str, serial: &'static str) -> Self {
        Self {
            pci_id,
            vendor: Some("0x10ee"),
            role: Role::User,
            ready: Some("0x1"),
            serial: Some(serial),
            shell: Some("v1"),
            timestamp: Some("1111"),
            device: Some("0x5001"),
            render: Some("renderD128"),
            qdma: false,
        }
    }

    pub fn install(&self, tree: &mut MemorySysfs) {
        let dir = PathBuf::from(ROOT).join(self.pci_id);
        tree.add_dir(&dir);
        if let Some(vendor) = self.vendor {
            tree.add_file(dir.join("vendor"), format!("{}\n", vendor));
        }
        match self.role {
            Role::User => {
                tree.add_file(dir.join("user_pf"), "");
            }
            Role::Mgmt => {
                tree.add_file(dir.join("mgmt_pf"), "");
            }
            Role::Both => {
                tree.add_file(dir.join("user_pf"), "");
                tree.add_file(dir.join("mgmt_pf"), "");
            }
            Role::None => {}
        }
        if let Some(ready) = self.ready {
            tree.add_file(dir.join("ready"), format!("{}\n", ready));
        }
        if let Some(device) = self.device {
            tree.add_file(dir.join("device"), format!("{}\n", device));
        }
        if let Some(serial) = self.serial {
            tree.add_file(dir.join("xmc.u.4194304/serial_num"), format!("{}\n", serial));
        }
        if let Some(shell) = self.shell {
            tree.add_file(dir.join("rom.u.1048576/VBNV"), format!("{}\n", shell));
        }
        if let Some(timestamp) = self.timestamp {
            tree.add_file(
                dir.join("rom.u.1048576/timestamp"),
                format!("{}\n", timestamp),
            );
        }
        match self.render {
            Some(render) => {
                tree.add_dir(dir.join("drm").join(render));
            }
            None => {
                tree.add_dir(dir.join("drm"));
            }
        }
        if self.qdma {
            tree.add_dir(dir.join("dma.qdma.u.2097152"));
        }
    }

    pub fn tree(fixtures: &[FnFixture]) -> MemorySysfs {
        let mut tree = MemorySysfs::new();
        tree.add_dir(ROOT);
        for fixture in fixtures {
            fixture.install(&mut tree);
        }
        tree
    }
}

pub(crate) fn layout() -> SysfsLayout {
    SysfsLayout::with_root(ROOT)
}
