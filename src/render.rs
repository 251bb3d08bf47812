//! Terminal rendering for calendar types.
//!
//! Extension traits that add colored output to schooldesk-core types using
//! owo_colors.

use owo_colors::{AnsiColors, DynColors, OwoColorize};
use schooldesk_core::{CalendarBadge, DateGroup, EventOccurrence};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for EventOccurrence {
    fn render(&self) -> String {
        let mut line = format!(
            "{} {:<17} {}",
            bullet(self.color.as_deref()),
            self.time,
            self.title.bold()
        );

        if let Some(location) = self.location.as_deref().filter(|l| !l.is_empty()) {
            line.push_str(&format!(" {}", format!("@ {location}").dimmed()));
        }
        if let Some(kind) = self.kind.as_deref().filter(|k| !k.is_empty()) {
            line.push_str(&format!(" {}", format!("[{kind}]").dimmed()));
        }

        line
    }
}

impl Render for DateGroup {
    fn render(&self) -> String {
        let mut lines = vec![self.date.bold().to_string()];
        lines.extend(self.data.iter().map(|occurrence| format!("   {}", occurrence.render())));
        lines.join("\n")
    }
}

impl Render for CalendarBadge {
    fn render(&self) -> String {
        format!("{} {}", bullet(self.color.as_deref()), self.content)
    }
}

/// Render the whole calendar, one block per day
pub fn render_calendar(groups: &[DateGroup]) -> String {
    if groups.is_empty() {
        return "No events found".dimmed().to_string();
    }

    groups
        .iter()
        .map(Render::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn bullet(color: Option<&str>) -> String {
    match color.and_then(parse_color) {
        Some(color) => "●".color(color).to_string(),
        None => "●".to_string(),
    }
}

/// Map a color from the API ("blue", "#1e90ff") to a terminal color.
fn parse_color(name: &str) -> Option<DynColors> {
    let name = name.trim();

    if let Some(hex) = name.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some(DynColors::Rgb(channel(0)?, channel(2)?, channel(4)?));
    }

    let ansi = match name.to_ascii_lowercase().as_str() {
        "black" => AnsiColors::Black,
        "red" => AnsiColors::Red,
        "green" => AnsiColors::Green,
        "yellow" | "gold" => AnsiColors::Yellow,
        "blue" => AnsiColors::Blue,
        "magenta" | "purple" => AnsiColors::Magenta,
        "cyan" => AnsiColors::Cyan,
        "white" => AnsiColors::White,
        "orange" => AnsiColors::BrightRed,
        "pink" => AnsiColors::BrightMagenta,
        _ => return None,
    };
    Some(DynColors::Ansi(ansi))
}
