use std::io::{self, BufRead};

use colored::*;
use console::Term;

use crate::terminal::colors;

/// Asks a question on stdout and returns the trimmed answer.
///
/// Falls back to plain stdin when stdout is not a terminal, so answers can be
/// piped in. End of input is reported as an `UnexpectedEof` error.
pub fn ask(question: &str) -> io::Result<String> {
    let term = Term::stdout();
    let prompt = format!("{} {} ", "?".color(colors::ACCENT).bold(), question);

    if term.is_term() {
        term.write_str(&prompt)?;
        return Ok(term.read_line()?.trim().to_string());
    }

    term.write_line(&prompt)?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no more input"));
    }
    Ok(line.trim().to_string())
}

/// Like [`ask`], but an empty answer becomes `None`.
pub fn ask_optional(question: &str) -> io::Result<Option<String>> {
    let answer = ask(question)?;
    Ok((!answer.is_empty()).then_some(answer))
}
