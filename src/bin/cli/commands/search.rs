use anyhow::Result;

use crate::app::App;
use crate::render::terminal::print_card_table;
use crate::OutputFormat;

pub fn run(
    app: &App,
    prefix: &str,
    limit: Option<usize>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let limit = limit.unwrap_or(app.scheduler.config().default_search_limit);
    let results = app.scheduler.search(prefix, limit);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Plain => {
            if results.is_empty() {
                println!("No cards starting with '{}'.", prefix);
                return Ok(());
            }
            print_card_table(&results, use_color);
            println!("\n{} results", results.len());
        }
    }

    Ok(())
}
