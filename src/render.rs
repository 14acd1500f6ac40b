//! Terminal rendering for classcal-core types.
//!
//! Extension traits that add colored output using owo_colors.

use classcal_core::analysis::{Analysis, Statistics, Tally};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Tally {
    fn render(&self) -> String {
        format!(
            "   {} {}",
            self.label,
            format!("({} {})", self.count, pluralize("class", self.count)).dimmed()
        )
    }
}

impl Render for Statistics {
    fn render(&self) -> String {
        let mut lines = vec![
            format!("   Total records:    {}", self.total_entries),
            format!("   Valid records:    {}", self.valid_entries.green()),
        ];
        if self.invalid_entries > 0 {
            lines.push(format!("   Invalid records:  {}", self.invalid_entries.red()));
        } else {
            lines.push(format!("   Invalid records:  {}", self.invalid_entries));
        }
        lines.join("\n")
    }
}

impl Render for Analysis {
    fn render(&self) -> String {
        let sections = [
            ("Statistics".to_string(), self.statistics.render()),
            (
                format!("Subjects ({} different)", self.statistics.unique_subjects),
                render_list(&self.subjects),
            ),
            ("Most common time slots".to_string(), render_list(&self.time_slots)),
            ("Most used locations".to_string(), render_list(&self.locations)),
            ("By weekday".to_string(), render_list(&self.days_of_week)),
            ("By month".to_string(), render_list(&self.monthly_distribution)),
            ("By starting hour".to_string(), render_list(&self.hourly_distribution)),
        ];

        sections
            .iter()
            .map(|(title, body)| format!("{}\n{}", title.bold(), body))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn render_list(tallies: &[Tally]) -> String {
    if tallies.is_empty() {
        return "   (none)".dimmed().to_string();
    }
    tallies
        .iter()
        .map(|t| t.render())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Simple pluralization helper
fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else if word.ends_with('s') {
        format!("{}es", word)
    } else {
        format!("{}s", word)
    }
}
