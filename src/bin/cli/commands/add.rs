use anyhow::{Context, Result};
use uuid::Uuid;

use lexicard_lib::scheduler::NewCard;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &mut App, text: &str, id: Option<Uuid>, format: &OutputFormat) -> Result<()> {
    if text.trim().is_empty() {
        anyhow::bail!("Card text must not be empty");
    }

    let id = id.unwrap_or_else(Uuid::new_v4);
    let card = app
        .scheduler
        .add_card(NewCard::new(id, text))
        .context("Failed to add card")?;
    app.save()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&card)?),
        OutputFormat::Plain => println!("Added card {} ('{}')", card.id, card.search_text),
    }

    Ok(())
}
