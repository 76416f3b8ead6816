use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use lexicard_lib::scheduler::algorithm::format_interval;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, id: Uuid, format: &OutputFormat) -> Result<()> {
    let card = app.find_card(id)?;
    let preview = app.scheduler.preview(id, Utc::now())?;

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = preview
                .iter()
                .map(|(rating, days)| {
                    serde_json::json!({
                        "rating": rating,
                        "quality": rating.quality(),
                        "intervalDays": days,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("'{}'", card.search_text);
            for (rating, days) in &preview {
                println!("  {:<6} {}", rating.to_string(), format_interval(*days));
            }
        }
    }

    Ok(())
}
