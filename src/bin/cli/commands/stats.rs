use anyhow::Result;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let stats = app.scheduler.statistics();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Plain => {
            println!("Cards:        {}", stats.total_cards);
            println!("Due now:      {}", stats.due_cards);
            println!("Mastered:     {}", stats.mastered_cards);
            println!("Average ease: {:.2}", stats.average_ease_factor);
            println!("Retention:    {:.1}%", stats.retention_rate * 100.0);
        }
    }

    Ok(())
}
