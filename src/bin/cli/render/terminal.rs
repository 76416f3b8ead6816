use chrono::{DateTime, Utc};

use lexicard_lib::scheduler::algorithm::format_interval;
use lexicard_lib::scheduler::CardState;

/// ANSI color codes
pub struct Color;

impl Color {
    pub const RESET: &'static str = "\x1b[0m";
    pub const RED: &'static str = "\x1b[31m";
    pub const GREEN: &'static str = "\x1b[32m";
    pub const YELLOW: &'static str = "\x1b[33m";
    pub const GRAY: &'static str = "\x1b[90m";
}

/// Wrap `text` in `color` when colors are enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// Truncate to `width` characters, marking the cut with "..."
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// How far away a due date is, e.g. "due" or "in 2w"
pub fn due_label(next_review: DateTime<Utc>, now: DateTime<Utc>) -> String {
    if next_review <= now {
        "due".to_string()
    } else {
        let days = (next_review - now).num_days();
        if days == 0 {
            "today".to_string()
        } else {
            format!("in {}", format_interval(days))
        }
    }
}

/// Print a table of cards: id, text, interval, ease, next review
pub fn print_card_table(cards: &[CardState], use_color: bool) {
    let now = Utc::now();
    let text_w = cards
        .iter()
        .map(|c| c.search_text.chars().count())
        .max()
        .unwrap_or(4)
        .clamp(4, 40);

    println!(
        "{:<36} {:<text_w$} {:>8} {:>5} {}",
        "Id", "Text", "Interval", "Ease", "Next",
        text_w = text_w
    );
    println!(
        "{} {} {} {} {}",
        "\u{2500}".repeat(36),
        "\u{2500}".repeat(text_w),
        "\u{2500}".repeat(8),
        "\u{2500}".repeat(5),
        "\u{2500}".repeat(10)
    );

    for card in cards {
        let label = due_label(card.scheduling.next_review, now);
        let label = if label == "due" {
            paint(&label, Color::YELLOW, use_color)
        } else {
            paint(&label, Color::GRAY, use_color)
        };
        println!(
            "{:<36} {:<text_w$} {:>8} {:>5.2} {}",
            card.id,
            truncate(&card.search_text, text_w),
            format_interval(card.scheduling.interval),
            card.scheduling.ease_factor,
            label,
            text_w = text_w
        );
    }
}
