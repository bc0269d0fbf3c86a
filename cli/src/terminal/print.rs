//! Plain output lines. Everything goes through `tracing` under
//! [`PRINT_TARGET`] so it prints above the progress bar instead of through it.

use std::cell::Cell;

use crate::terminal::{colors, logging::PRINT_TARGET};
use colored::*;
use tracing::info;
use unicode_width::UnicodeWidthStr;

pub const TOTAL_WIDTH: usize = 64;

thread_local! {
    static KEY_WIDTH: Cell<usize> = const { Cell::new(0) }
}

#[macro_export]
macro_rules! mprint {
    () => {
        $crate::terminal::print::print("")
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg)
    };
}

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

fn width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Sets the key column width used by [`aligned_line`].
pub fn set_key_width<'a>(keys: impl IntoIterator<Item = &'a str>) {
    KEY_WIDTH.set(keys.into_iter().map(width).max().unwrap_or(0));
}

pub fn banner(q_level: u8) {
    if q_level > 0 {
        return;
    }
    let title = format!("⟦ SWEEPR v{} ⟧", env!("CARGO_PKG_VERSION"));
    let side = "═".repeat(TOTAL_WIDTH.saturating_sub(width(&title)) / 2);
    print(&format!(
        "{}{}{}",
        side.bright_black(),
        title.bright_green().bold(),
        side.bright_black()
    ));
}

pub fn header(msg: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }
    let title = format!("⟦ {} ⟧", msg.to_uppercase());
    let dashes = TOTAL_WIDTH.saturating_sub(width(&title));
    let (left, right) = (dashes / 2, dashes - dashes / 2);
    print(&format!(
        "{}{}{}",
        "─".repeat(left).bright_black(),
        title.bright_green(),
        "─".repeat(right).bright_black()
    ));
}

/// A full-width rule, `═` when `heavy`, `─` otherwise.
pub fn separator(heavy: bool) {
    let rule = if heavy { "═" } else { "─" };
    print(&rule.repeat(TOTAL_WIDTH).color(colors::SEPARATOR).to_string());
}

/// `> key....: value`, keys padded to the width set by [`set_key_width`].
pub fn aligned_line(key: &str, value: impl Into<ColoredString>) {
    let dots = ".".repeat((KEY_WIDTH.get() + 1).saturating_sub(width(key)));
    print(&format!(
        "{} {}{}{} {}",
        ">".color(colors::SEPARATOR),
        key.color(colors::PRIMARY),
        dots.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR),
        value.into()
    ));
}

/// One level of `├─ key..: value` lines, under an optional `[idx] name` head.
pub fn tree(head: Option<(usize, &str)>, details: Vec<(String, ColoredString)>) {
    if let Some((idx, name)) = head {
        print(&format!(
            "{}{}{} {}",
            "[".color(colors::SEPARATOR),
            idx.to_string().color(colors::ACCENT),
            "]".color(colors::SEPARATOR),
            name.color(colors::PRIMARY)
        ));
    }

    let key_width = details.iter().map(|(key, _)| width(key)).max().unwrap_or(0);
    let count = details.len();
    for (i, (key, value)) in details.into_iter().enumerate() {
        let branch = if i + 1 == count { "└─" } else { "├─" };
        let dots = ".".repeat(key_width - width(&key) + 1);
        print(&format!(
            " {} {}{}{} {}",
            branch.bright_black(),
            key.color(colors::TEXT_DEFAULT),
            dots.color(colors::SEPARATOR),
            ":".color(colors::SEPARATOR),
            value
        ));
    }
}

/// Centers `msg` on the banner width. `visible_width` excludes color codes.
pub fn centerln(msg: &str, visible_width: usize) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(visible_width) / 2);
    print(&format!("{}{}", space, msg));
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
