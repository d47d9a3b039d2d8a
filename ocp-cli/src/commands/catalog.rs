//! Catalog commands - list what the backend offers.

use anyhow::Result;
use ocp_client::{ClusterAddon, Flavor};

fn matches(name: &str, filter: Option<&str>) -> bool {
    filter.is_none_or(|filter| name.to_lowercase().contains(&filter.to_lowercase()))
}

fn filter_flavors(flavors: Vec<Flavor>, name: Option<&str>) -> Vec<Flavor> {
    flavors
        .into_iter()
        .filter(|flavor| matches(&flavor.name, name))
        .collect()
}

fn filter_addons(addons: Vec<ClusterAddon>, name: Option<&str>) -> Vec<ClusterAddon> {
    addons
        .into_iter()
        .filter(|addon| matches(&addon.name, name))
        .collect()
}

/// List instance flavors, optionally filtered by name.
pub async fn flavors(name: Option<&str>) -> Result<()> {
    let client = super::client(&super::provider_config()?)?;
    let flavors = filter_flavors(client.flavors().await?, name);

    if flavors.is_empty() {
        println!("No flavors found.");
        return Ok(());
    }

    println!(
        "{:<38} {:<24} {:>5} {:>8} {:>6}  STOCK",
        "ID", "NAME", "VCPU", "RAM GB", "DISK"
    );
    println!("{}", "-".repeat(96));
    for flavor in &flavors {
        println!(
            "{:<38} {:<24} {:>5} {:>8.1} {:>6}  {}",
            flavor.id,
            flavor.name,
            flavor.vcpus,
            flavor.memory_gb,
            flavor.root_gb,
            if flavor.out_of_stock { "✗" } else { "✓" }
        );
    }
    println!();
    println!("Total: {} flavor(s)", flavors.len());
    Ok(())
}

/// List supported Kubernetes versions and their images.
pub async fn versions() -> Result<()> {
    let client = super::client(&super::provider_config()?)?;
    let versions = client.cluster_versions().await?;

    if versions.is_empty() {
        println!("No versions found.");
        return Ok(());
    }

    for version in &versions {
        println!("{}", version.version);
        for image in &version.images {
            println!("  {} ({})", image.image_name, image.os_distro);
        }
    }
    Ok(())
}

/// List networking (CNI) options.
pub async fn networking() -> Result<()> {
    let client = super::client(&super::provider_config()?)?;
    let options = client.networking().await?;

    if options.is_empty() {
        println!("No networking options found.");
        return Ok(());
    }

    println!("{:<24} VERSION", "NAME");
    for option in &options {
        println!("{:<24} {}", option.name, option.version);
    }
    Ok(())
}

/// List installable addons, optionally filtered by name.
pub async fn addons(name: Option<&str>) -> Result<()> {
    let client = super::client(&super::provider_config()?)?;
    let addons = filter_addons(client.cluster_addons().await?, name);

    if addons.is_empty() {
        println!("No addons found.");
        return Ok(());
    }

    for addon in &addons {
        let releases: Vec<&str> = addon.releases.iter().map(|r| r.version.as_str()).collect();
        println!("{}: {}", addon.name, releases.join(", "));
        if !addon.description.is_empty() {
            println!("  {}", addon.description);
        }
    }
    Ok(())
}
