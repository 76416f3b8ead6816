use anyhow::Result;

use lexicard_lib::scheduler::StudyLevel;

use crate::app::App;
use crate::render::terminal::print_card_table;
use crate::OutputFormat;

pub fn run(
    app: &mut App,
    limit: Option<usize>,
    level: Option<StudyLevel>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let limit = match (limit, level) {
        (Some(limit), _) => limit,
        (None, Some(level)) => level.session_size(app.scheduler.len()),
        (None, None) => app.scheduler.config().default_study_limit,
    };

    // The store keeps every card, so cards taken here are not lost between runs
    let cards = app.scheduler.due_cards(limit);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&cards)?),
        OutputFormat::Plain => {
            if cards.is_empty() {
                println!("Nothing due. {} cards total.", app.scheduler.len());
                return Ok(());
            }
            print_card_table(&cards, use_color);
            println!("\n{} due", cards.len());
        }
    }

    Ok(())
}
