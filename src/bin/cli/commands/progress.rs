use anyhow::{Context, Result};
use uuid::Uuid;

use lexicard_lib::scheduler::Progress;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, id: Uuid, format: &OutputFormat) -> Result<()> {
    let card = app.find_card(id)?;
    let history = app
        .store
        .load_reviews(Some(id))
        .context("Failed to read review history")?;
    let progress = Progress::from_history(&history);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&progress)?),
        OutputFormat::Plain => {
            println!("'{}'", card.search_text);
            println!("  level:    {:?}", progress.level);
            println!("  mastery:  {}%", progress.mastery_score);
            println!(
                "  reviews:  {} ({} correct)",
                progress.total_reviews, progress.correct_reviews
            );
            if card.stats.average_response_time > 0.0 {
                println!("  avg time: {:.1}s", card.stats.average_response_time);
            }
        }
    }

    Ok(())
}
