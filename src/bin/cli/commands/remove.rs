use anyhow::{Context, Result};
use uuid::Uuid;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &mut App, id: Uuid, format: &OutputFormat) -> Result<()> {
    let removed = app
        .scheduler
        .remove_card(id)
        .context("Failed to remove card")?;
    app.save()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&removed)?),
        OutputFormat::Plain => println!("Removed card {} ('{}')", removed.id, removed.search_text),
    }

    Ok(())
}
