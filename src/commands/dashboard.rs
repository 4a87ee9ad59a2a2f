//! Serve the interactive dashboard.

use std::net::SocketAddr;

use tracing::info;

use crate::config::Config;
use crate::dashboard::{self, DashboardSettings, DashboardState};
use crate::error::{Error, Result};

/// Load the dataset once and serve it until Ctrl-C.
pub async fn run(config: &Config, addr: Option<&str>) -> anyhow::Result<()> {
    let addr = parse_addr(addr.unwrap_or(&config.dashboard_addr))?;
    let dataset = super::load_dataset(config)?;
    let settings = DashboardSettings::from_config(config)?;

    info!(
        rows = dataset.len(),
        control = %settings.control,
        variant = %settings.variant,
        "Dashboard dataset ready"
    );
    println!("Dashboard running on http://{}/", addr);

    dashboard::serve(addr, DashboardState::new(dataset, settings)).await
}

pub fn parse_addr(raw: &str) -> Result<SocketAddr> {
    raw.trim()
        .parse::<SocketAddr>()
        .map_err(|e| Error::InvalidArgument(format!("invalid dashboard address '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_addr() {
        assert_eq!(
            parse_addr("127.0.0.1:8050").unwrap(),
            "127.0.0.1:8050".parse::<SocketAddr>().unwrap()
        );
        assert!(parse_addr("localhost").is_err());
    }
}
