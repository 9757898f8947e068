use chrono::{DateTime, Utc};
use dadjoke::contexts::{Notification, Notifier};
use dadjoke::data::{JokeRecord, format_relative_time};

const CYAN: &str = "\u{001b}[36m";
const MAGENTA: &str = "\u{001b}[35m";
const GREEN: &str = "\u{001b}[32m";
const RED: &str = "\u{001b}[31m";
const YELLOW: &str = "\u{001b}[33m";
const DIM: &str = "\u{001b}[2m";
const RESET: &str = "\u{001b}[0m";

/// Renders notifications on stderr
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::MissingKey(message) => {
                eprintln!("{RED}✗ {message}{RESET}");
                eprintln!(
                    "  Set DADJOKE_API_KEY or OPENAI_API_KEY, or store one with `dadjoke key set <KEY>`."
                );
            }
            Notification::AuthFailure(message) => {
                eprintln!("{RED}✗ Authentication failed: {message}{RESET}");
                eprintln!("  Check the API key in use with `dadjoke key show`.");
            }
            Notification::Failure(message) => {
                eprintln!("{RED}✗ Failed to fetch joke: {message}{RESET}");
            }
            Notification::Success(message) => {
                eprintln!("{GREEN}✓ {message}{RESET}");
            }
        }
    }
}

pub fn render_error(message: &str) {
    eprintln!("{RED}✗ {message}{RESET}");
}

pub fn render_banner() {
    println!("{CYAN}CYBERHUMOR v1.0{RESET}  {MAGENTA}DAD JOKE GENERATOR{RESET}");
}

pub fn render_loading(what: &str) {
    eprintln!("{DIM}{CYAN}{what}{RESET}");
}

pub fn render_joke(joke: &str) {
    let width = joke.chars().count().clamp(20, 76) + 4;
    println!("{CYAN}╔{}╗{RESET}", "═".repeat(width));
    for line in wrap(joke, width - 4) {
        let padding = (width - 4).saturating_sub(line.chars().count());
        println!(
            "{CYAN}║{RESET}  {line}{}  {CYAN}║{RESET}",
            " ".repeat(padding)
        );
    }
    println!("{CYAN}╚{}╝{RESET}", "═".repeat(width));
}

pub fn render_recent(records: &[JokeRecord], now: DateTime<Utc>) {
    println!("{CYAN}RECENT JOKE ARCHIVE{RESET}");
    if records.is_empty() {
        println!("{YELLOW}NO JOKES FOUND IN DATABASE{RESET}");
        return;
    }

    println!(
        "{CYAN}{:>6}  {:<24}  {:<16}  JOKE{RESET}",
        "#ID", "TIMESTAMP", "AGE"
    );
    for record in records {
        println!(
            "{:>6}  {DIM}{:<24}  {:<16}{RESET}  {}",
            record.id,
            record.display_timestamp(),
            format_relative_time(&record.created_at, now),
            record.joke_text
        );
    }
}

/// Greedy word wrap to `width` columns. Words longer than `width` get their own line.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
