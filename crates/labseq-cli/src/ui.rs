//! Styled console lines. Colour is dropped when `NO_COLOR` is set.

use console::{style, StyledObject};

#[derive(Debug, Clone, Copy)]
enum Tone {
    Heading,
    Good,
    Bad,
}

fn paint(text: String, tone: Tone) -> String {
    if std::env::var_os("NO_COLOR").is_some() {
        return text;
    }
    let styled: StyledObject<String> = match tone {
        Tone::Heading => style(text).bold().cyan(),
        Tone::Good => style(text).bold().green(),
        Tone::Bad => style(text).bold().red(),
    };
    styled.to_string()
}

/// `=== text ===`.
#[must_use]
pub fn header_line(text: &str) -> String {
    paint(format!("=== {text} ==="), Tone::Heading)
}

/// `[OK] text`.
#[must_use]
pub fn success_line(text: &str) -> String {
    format!("{} {text}", paint("[OK]".into(), Tone::Good))
}

/// `[ERROR] text`.
#[must_use]
pub fn error_line(text: &str) -> String {
    format!("{} {text}", paint("[ERROR]".into(), Tone::Bad))
}

/// Success line on stdout.
pub fn print_success(text: &str) {
    println!("{}", success_line(text));
}
