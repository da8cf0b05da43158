use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result, anyhow};
use trust_dns_resolver::Resolver;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};

/// Resolves the target once, before the session starts. Literal IPs skip
/// DNS; otherwise the first returned address wins (no multi-address
/// fallback).
pub fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }

    let resolver = Resolver::from_system_conf()
        .or_else(|_| Resolver::new(ResolverConfig::default(), ResolverOpts::default()))
        .context("failed to construct resolver")?;
    let lookup = resolver
        .lookup_ip(host)
        .with_context(|| format!("unknown host {host}"))?;
    let ip = lookup
        .iter()
        .next()
        .ok_or_else(|| anyhow!("no addresses for {host}"))?;
    Ok(SocketAddr::new(ip, port))
}
