use anyhow::{Context, Result};
use uuid::Uuid;

use lexicard_lib::scheduler::algorithm::format_interval;
use lexicard_lib::scheduler::{ResponseRating, ReviewSubmission};

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

/// Accept either a numeric quality or a rating name. Unknown names are
/// graded as `good`.
fn parse_grade(grade: &str) -> i32 {
    if let Ok(quality) = grade.trim().parse::<i32>() {
        return quality;
    }
    if grade.parse::<ResponseRating>().is_err() {
        log::warn!("Unknown rating '{}', grading as good", grade.trim());
    }
    ResponseRating::parse_lenient(grade).quality()
}

pub fn run(
    app: &mut App,
    id: Uuid,
    grade: &str,
    response_time: Option<f64>,
    was_correct: Option<bool>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let quality = parse_grade(grade);

    let mut submission = ReviewSubmission::new(quality);
    if let Some(seconds) = response_time {
        submission = submission.with_response_time(seconds);
    }
    if let Some(correct) = was_correct {
        submission = submission.with_correct(correct);
    }

    let outcome = app
        .scheduler
        .apply_review(id, submission)
        .context("Failed to apply review")?;
    // Review history is written before the schedule it produced
    app.store
        .append_review(&outcome.record)
        .context("Failed to record review history")?;
    app.save()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Plain => {
            let card = &outcome.card;
            let verdict = if outcome.record.was_correct {
                paint("correct", Color::GREEN, use_color)
            } else {
                paint("incorrect", Color::RED, use_color)
            };
            println!("'{}' ({})", card.search_text, verdict);
            println!(
                "  next review in {} ({}), ease {:.2}, streak {}",
                format_interval(card.scheduling.interval),
                card.scheduling.next_review.format("%Y-%m-%d %H:%M"),
                card.scheduling.ease_factor,
                card.scheduling.repetitions
            );
        }
    }

    Ok(())
}
