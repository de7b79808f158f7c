use std::path::PathBuf;
use thiserror::Error;

/// Why one PCI function was left out of a scan. None of these abort the scan.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("vendor id unreadable")]
    VendorUnreadable,
    #[error("vendor {0} is not an accepted FPGA vendor")]
    ForeignVendor(String),
    #[error("management function")]
    Management,
    #[error("no mgmt_pf/user_pf role marker")]
    NoRole,
    #[error("function not ready")]
    NotReady,
    #[error("cannot read {}", .0.display())]
    MissingFile(PathBuf),
    #[error("no {prefix}* entry under {}", .dir.display())]
    MissingSubsystem { dir: PathBuf, prefix: String },
}

impl SkipReason {
    /// Routine skips: foreign hardware, management PFs and cards still booting.
    pub fn is_routine(&self) -> bool {
        matches!(
            self,
            SkipReason::VendorUnreadable
                | SkipReason::ForeignVendor(_)
                | SkipReason::Management
                | SkipReason::NoRole
                | SkipReason::NotReady
        )
    }

    pub fn is_foreign(&self) -> bool {
        matches!(self, SkipReason::VendorUnreadable | SkipReason::ForeignVendor(_))
    }
}
