//! Runtimes handler: fetch the catalog and list it.

use anyhow::{Context, Result};

use crate::{catalog, config::Settings, piston::PistonClient, printer};

pub async fn run(settings: &Settings, markdown: bool) -> Result<()> {
    let client = PistonClient::from_settings(settings)?;
    let catalog = catalog::load(&client)
        .await
        .with_context(|| format!("failed to fetch runtimes from {}", client.base_url()))?;
    printer::print_runtimes(&catalog, markdown);
    Ok(())
}
