use colored::*;
use sweepr_common::config::Config;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::terminal::colors;
use crate::terminal::logging::PRINT_TARGET;

pub const TOTAL_WIDTH: usize = 64;

const KEY_WIDTH: usize = 9;

const BANNER: &str = r#"
      ____  _      __ ___  ___  ___   ____
     / __/ | | /| / // _ \/ _ \/ _ \ / __ \
    _\ \   | |/ |/ //  __/  __/ ___// /_/ /
   /___/   |__/|__/ \___/\___/_/   / .___/
                                   /_/
"#;

/// Emits a pre-formatted line through the logging pipeline.
pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

pub fn banner(cfg: &Config) {
    if cfg.no_banner || cfg.quiet > 0 {
        return;
    }

    let text_content: String = format!("⟦ SWEEPR v{} ⟧ ", env!("CARGO_PKG_VERSION"));
    let text_width: usize = UnicodeWidthStr::width(text_content.as_str());
    let text: ColoredString = text_content.bright_green().bold();
    let sep: ColoredString = "═".repeat((TOTAL_WIDTH - text_width) / 2).bright_black();

    print(&format!("{}", BANNER.bright_cyan()));
    print(&format!("{sep}{text}{sep}"));
}

pub fn header(msg: &str, cfg: &Config) {
    if cfg.quiet > 0 {
        return;
    }

    let formatted: String = format!("⟦ {} ⟧", msg);
    let dash_count: usize = TOTAL_WIDTH.saturating_sub(formatted.chars().count());
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    print(&line.to_string());
}

pub fn fat_separator() {
    print(&"═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR).to_string());
}

pub fn print_status<T: AsRef<str>>(msg: T) {
    let prefix: ColoredString = ">".color(colors::SEPARATOR);
    print(&format!("{} {}", prefix, msg.as_ref().color(colors::TEXT_DEFAULT)));
}

pub fn tree_head(idx: usize, name: &str) {
    let idx_str: String = format!("[{}]", idx.to_string().color(colors::ACCENT));
    print(&format!(
        "{} {}",
        idx_str.color(colors::SEPARATOR),
        name.color(colors::PRIMARY)
    ));
}

pub fn as_tree_one_level(key_value_pair: &[(String, ColoredString)]) {
    for (i, (key, value)) in key_value_pair.iter().enumerate() {
        let branch: ColoredString = if i + 1 == key_value_pair.len() {
            "└─".bright_black()
        } else {
            "├─".bright_black()
        };
        let dots: String = ".".repeat(KEY_WIDTH.saturating_sub(key.len()));
        print(&format!(
            " {} {}{}{} {}",
            branch,
            key.color(colors::TEXT_DEFAULT),
            dots.color(colors::SEPARATOR),
            ":".color(colors::SEPARATOR),
            value
        ));
    }
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{space}{msg}"));
}

pub fn no_results(what: &str) {
    centerln(&format!("No {what} found.").red().bold().to_string());
}

pub fn end_of_program() {
    print(&"═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR).to_string());
}
