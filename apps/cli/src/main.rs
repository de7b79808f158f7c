use anyhow::Result;
use clap::{Parser, Subcommand};
use fpga_core::{encode_instance, Inventory, PciAddress};
use fpga_host_linux::{scan_with_diagnostics, DiskSysfs, ScanOutcome, SysfsLayout};
use fpga_report::create_report_bundle;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fpgainv")]
#[command(about = "FPGA accelerator inventory from PCI sysfs", long_about = None)]
struct Cli {
    /// PCI device tree to scan
    #[arg(long, global = true, env = "FPGA_SYSFS_ROOT")]
    sysfs_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the card inventory as JSON
    Scan {
        #[arg(long)]
        pretty: bool,
    },

    /// Print allocatable units grouped by resource name
    Resources {
        #[arg(long)]
        pretty: bool,
    },

    /// Write an inventory snapshot under <base>/reports/<run-id>
    Report {
        #[arg(long, default_value = ".")]
        base: PathBuf,
    },

    /// Print the instance number of a PCI address (e.g. 0000:3b:00.1)
    Instance { address: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let layout = match cli.sysfs_root {
        Some(root) => SysfsLayout::with_root(root),
        None => SysfsLayout::default(),
    };
    debug!(root = %layout.pci_devices.display(), "using PCI device tree");

    match cli.command {
        Commands::Scan { pretty } => {
            let (inventory, _) = scan(&layout)?;
            print_json(&inventory, pretty)
        }
        Commands::Resources { pretty } => {
            let (inventory, _) = scan(&layout)?;
            print_json(&inventory.allocatable(), pretty)
        }
        Commands::Report { base } => {
            let (inventory, outcome) = scan(&layout)?;
            let report = create_report_bundle(base, &inventory, &outcome.skipped, None)?;
            println!("report_root: {}", report.root.display());
            println!("inventory: {}", report.inventory_json.display());
            println!("run_json: {}", report.run_json.display());
            Ok(())
        }
        Commands::Instance { address } => {
            let instance = encode_instance(&address)?;
            let decoded = PciAddress::from_instance(instance);
            println!("{} -> {} ({})", address, instance, decoded);
            Ok(())
        }
    }
}

fn scan(layout: &SysfsLayout) -> Result<(Inventory, ScanOutcome)> {
    let mut outcome = scan_with_diagnostics(&DiskSysfs, layout)?;
    let devices = std::mem::take(&mut outcome.devices);
    Ok((Inventory::new(devices), outcome))
}

fn print_json(value: &impl Serialize, pretty: bool) -> Result<()> {
    if pretty {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", serde_json::to_string(value)?);
    }
    Ok(())
}
