use crate::azure::client::OpsClient;
use ipnet::Ipv4Net;
use serde::Deserialize;
use std::net::Ipv4Addr;
use thiserror::Error;

pub const DEFAULT_SUBNET_PREFIX: u8 = 27;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SubnetError {
    #[error("invalid prefix length /{0}")]
    InvalidPrefix(u8),
    #[error("/{requested} does not fit in virtual network {vnet}")]
    LargerThanVnet { requested: u8, vnet: Ipv4Net },
    #[error("no free /{requested} block left in {vnet}")]
    Exhausted { requested: u8, vnet: Ipv4Net },
    #[error("failed to query virtual network: {0}")]
    Query(String),
}

/// First block of `prefix_len` inside `vnet` that overlaps none of
/// `existing`. Candidates stay aligned to the block size so the result is a
/// valid network address for the requested prefix.
pub fn next_free_block(
    vnet: Ipv4Net,
    existing: &[Ipv4Net],
    prefix_len: u8,
) -> Result<Ipv4Addr, SubnetError> {
    if prefix_len > 32 {
        return Err(SubnetError::InvalidPrefix(prefix_len));
    }
    if prefix_len < vnet.prefix_len() {
        return Err(SubnetError::LargerThanVnet {
            requested: prefix_len,
            vnet,
        });
    }

    let size = 1u64 << (32 - prefix_len);
    let vnet_start = u64::from(u32::from(vnet.network()));
    let vnet_end = vnet_start + (1u64 << (32 - vnet.prefix_len()));

    // Half-open [start, end) intervals, sorted by start.
    let mut used: Vec<(u64, u64)> = existing
        .iter()
        .map(|net| {
            let start = u64::from(u32::from(net.network()));
            (start, start + (1u64 << (32 - net.prefix_len())))
        })
        .collect();
    used.sort_unstable();

    let mut candidate = vnet_start;
    for (start, end) in used {
        if candidate + size <= start {
            break;
        }
        if candidate < end {
            candidate = align_up(end, size);
        }
    }

    if candidate + size > vnet_end {
        return Err(SubnetError::Exhausted {
            requested: prefix_len,
            vnet,
        });
    }

    // candidate < vnet_end <= 2^32
    Ok(Ipv4Addr::from(candidate as u32))
}

fn align_up(value: u64, size: u64) -> u64 {
    value.div_ceil(size) * size
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubnetPrefixes {
    address_prefix: Option<String>,
    #[serde(default)]
    address_prefixes: Option<Vec<String>>,
}

/// Asks the CLI for the virtual network's address space and its subnets,
/// then computes the next free starting address.
pub async fn next_subnet_address(
    client: &OpsClient,
    resource_group: &str,
    vnet_name: &str,
    prefix_len: u8,
) -> Result<Ipv4Addr, SubnetError> {
    let space = client
        .runner()
        .run_raw(&[
            "az",
            "network",
            "vnet",
            "show",
            "-g",
            resource_group,
            "-n",
            vnet_name,
            "--query",
            "addressSpace.addressPrefixes[0]",
            "-o",
            "tsv",
        ])
        .await
        .map_err(|e| SubnetError::Query(e.to_string()))?;
    if !space.success() || space.stdout.trim().is_empty() {
        return Err(SubnetError::Query(format!(
            "could not read address space of '{}': {}",
            vnet_name,
            space.stderr.trim()
        )));
    }
    let vnet: Ipv4Net = space
        .stdout
        .trim()
        .parse()
        .map_err(|e| SubnetError::Query(format!("bad address space '{}': {}", space.stdout.trim(), e)))?;

    let listing = client
        .runner()
        .run_raw(&[
            "az",
            "network",
            "vnet",
            "subnet",
            "list",
            "-g",
            resource_group,
            "--vnet-name",
            vnet_name,
            "--query",
            "[].{addressPrefix:addressPrefix, addressPrefixes:addressPrefixes}",
            "-o",
            "json",
        ])
        .await
        .map_err(|e| SubnetError::Query(e.to_string()))?;
    if !listing.success() {
        return Err(SubnetError::Query(format!(
            "could not list subnets of '{}': {}",
            vnet_name,
            listing.stderr.trim()
        )));
    }

    let existing = parse_subnet_listing(&listing.stdout)?;
    let address = next_free_block(vnet, &existing, prefix_len)?;
    log::info!("Calculated next subnet address: {}", address);
    Ok(address)
}

fn parse_subnet_listing(raw: &str) -> Result<Vec<Ipv4Net>, SubnetError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let entries: Vec<SubnetPrefixes> =
        serde_json::from_str(raw).map_err(|e| SubnetError::Query(e.to_string()))?;

    let mut prefixes = Vec::new();
    for entry in entries {
        let all = entry
            .address_prefix
            .into_iter()
            .chain(entry.address_prefixes.unwrap_or_default());
        for prefix in all {
            match prefix.parse::<Ipv4Net>() {
                Ok(net) if !prefixes.contains(&net) => prefixes.push(net),
                Ok(_) => {}
                Err(_) => log::debug!("Skipping non-IPv4 subnet prefix {}", prefix),
            }
        }
    }
    Ok(prefixes)
}
