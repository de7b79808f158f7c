//! Vendor filtering and PF role/readiness detection.
//!
//! Role comes from the `mgmt_pf`/`user_pf` marker files the driver creates.
//! Older drivers assigned roles by function number (and later swapped them), so
//! a function with neither marker is treated as unsupported rather than guessed.

use crate::error::SkipReason;
use crate::layout::SysfsLayout;
use crate::sysfs::SysfsReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionRole {
    Management,
    User,
    Unclassified,
}

/// One candidate entry of the PCI device tree, as seen by a single scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PciFunction {
    pub pci_id: String,
    pub vendor_id: String,
    pub role: FunctionRole,
    pub ready: bool,
}

impl PciFunction {
    /// Read vendor, role and readiness. Readiness is only read for user PFs.
    pub fn probe(
        reader: &impl SysfsReader,
        layout: &SysfsLayout,
        pci_id: &str,
    ) -> Result<Self, SkipReason> {
        let vendor_id = reader
            .read_trimmed(&layout.function_dir(pci_id).join(&layout.vendor_file))
            .map_err(|_| SkipReason::VendorUnreadable)?;
        if !layout.is_accepted_vendor(&vendor_id) {
            return Err(SkipReason::ForeignVendor(vendor_id));
        }

        let role = if is_management_function(reader, layout, pci_id) {
            FunctionRole::Management
        } else if is_user_function(reader, layout, pci_id) {
            FunctionRole::User
        } else {
            FunctionRole::Unclassified
        };
        let ready = role == FunctionRole::User && is_ready(reader, layout, pci_id);

        Ok(Self {
            pci_id: pci_id.to_string(),
            vendor_id,
            role,
            ready,
        })
    }

    /// Only ready user PFs go on to identity extraction.
    pub fn admit(&self) -> Result<(), SkipReason> {
        match self.role {
            FunctionRole::Management => Err(SkipReason::Management),
            FunctionRole::Unclassified => Err(SkipReason::NoRole),
            FunctionRole::User if !self.ready => Err(SkipReason::NotReady),
            FunctionRole::User => Ok(()),
        }
    }
}

pub fn is_management_function(reader: &impl SysfsReader, layout: &SysfsLayout, pci_id: &str) -> bool {
    reader.exists(&layout.function_dir(pci_id).join(&layout.mgmt_marker))
}

pub fn is_user_function(reader: &impl SysfsReader, layout: &SysfsLayout, pci_id: &str) -> bool {
    reader.exists(&layout.function_dir(pci_id).join(&layout.user_marker))
}

pub fn is_ready(reader: &impl SysfsReader, layout: &SysfsLayout, pci_id: &str) -> bool {
    reader
        .read_trimmed(&layout.function_dir(pci_id).join(&layout.ready_file))
        .is_ok_and(|value| value == layout.ready_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{layout, FnFixture, Role};

    fn probe(fixture: FnFixture) -> Result<PciFunction, SkipReason> {
        let tree = FnFixture::tree(&[fixture.clone()]);
        PciFunction::probe(&tree, &layout(), fixture.pci_id)
    }

    #[test]
    fn ready_user_function_is_admitted() {
        let function = probe(FnFixture::user("0000:03:00.1", "SN1")).unwrap();
        assert_eq!(function.role, FunctionRole::User);
        assert!(function.ready);
        assert_eq!(function.admit(), Ok(()));
    }

    #[test]
    fn foreign_vendor_is_rejected_before_role() {
        let fixture = FnFixture {
            vendor: Some("0xDEAD"),
            ..FnFixture::user("0000:03:00.1", "SN1")
        };
        assert_eq!(probe(fixture), Err(SkipReason::ForeignVendor("0xDEAD".to_string())));
    }

    #[test]
    fn missing_vendor_file_is_unreadable_vendor() {
        let fixture = FnFixture {
            vendor: None,
            ..FnFixture::user("0000:03:00.1", "SN1")
        };
        assert_eq!(probe(fixture), Err(SkipReason::VendorUnreadable));
    }

    #[test]
    fn vendor_match_ignores_case() {
        let fixture = FnFixture {
            vendor: Some("0x1D0F"),
            ..FnFixture::user("0000:03:00.1", "SN1")
        };
        assert!(probe(fixture).is_ok());
    }

    #[test]
    fn management_marker_wins_even_when_ready() {
        for role in [Role::Mgmt, Role::Both] {
            let fixture = FnFixture {
                role,
                ..FnFixture::user("0000:03:00.0", "SN1")
            };
            let function = probe(fixture).unwrap();
            assert_eq!(function.role, FunctionRole::Management);
            assert_eq!(function.admit(), Err(SkipReason::Management));
        }
    }

    #[test]
    fn missing_markers_leave_function_unclassified() {
        let fixture = FnFixture {
            role: Role::None,
            ..FnFixture::user("0000:03:00.1", "SN1")
        };
        assert_eq!(probe(fixture).unwrap().admit(), Err(SkipReason::NoRole));
    }

    #[test]
    fn readiness_needs_exact_sentinel() {
        for ready in [None, Some("0x0"), Some("1"), Some("")] {
            let fixture = FnFixture {
                ready,
                ..FnFixture::user("0000:03:00.1", "SN1")
            };
            assert_eq!(probe(fixture).unwrap().admit(), Err(SkipReason::NotReady));
        }
    }
}
