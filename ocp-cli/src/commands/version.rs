//! Version command - show version information.

use anyhow::Result;

/// Version information.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the version command.
pub fn run() -> Result<()> {
    println!("ocp - OCP cluster reconciler");
    println!();
    println!("Version:     {}", VERSION);
    println!(
        "Platform:    {} / {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    println!();
    println!("Components:");
    println!("  ocp-core        Records, errors, configuration, backend trait");
    println!("  ocp-client      HTTP client for the backend API");
    println!("  ocp-reconciler  Operation poller, node pool differ, reconciler");
    println!("  ocp-cli         Command-line interface");

    Ok(())
}
