//! Terminal output helpers.
//!
//! Color scheme (off when `NO_COLOR` is set or the stream is not a tty):
//! - Green: success
//! - Red: errors
//! - Yellow: warnings, locked environments
//! - Cyan: names, paths, hints
//! - Dim: secondary info

use std::fmt::Display;

use console::{style, Style};

const RULE_WIDTH: usize = 56;

fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

fn paint(s: &str, with: Style) -> String {
    if colors_enabled() {
        with.apply_to(s).to_string()
    } else {
        s.to_string()
    }
}

/// `✓ msg`
pub fn success(msg: &str) {
    println!("{} {}", paint("✓", Style::new().green()), msg);
}

/// `✗ msg` on stderr.
pub fn error(msg: &str) {
    eprintln!("{} {}", paint("✗", Style::new().red().for_stderr()), msg);
}

/// `⚠ msg` on stderr.
pub fn warn(msg: &str) {
    eprintln!("{} {}", paint("⚠", Style::new().yellow().for_stderr()), msg);
}

/// `→ msg` on stderr.
pub fn hint(msg: &str) {
    let arrow = Style::new().cyan().for_stderr();
    eprintln!("{} {}", paint("→", arrow.clone()), paint(msg, arrow));
}

pub fn header(title: &str) {
    println!("{}", paint(title, Style::new().bold()));
}

/// Indented `label  value` line.
pub fn kv(label: &str, value: impl Display) {
    println!(
        "  {}  {}",
        paint(label, Style::new().dim()),
        paint(&value.to_string(), Style::new().bold())
    );
}

pub fn list_item(item: &str) {
    println!("  • {}", item);
}

pub fn rule() {
    println!("{}", paint(&"─".repeat(RULE_WIDTH), Style::new().dim()));
}

pub fn dimmed(msg: &str) {
    println!("{}", paint(msg, Style::new().dim()));
}

/// A path, styled for inline use.
pub fn path(p: impl Display) -> String {
    paint(&p.to_string(), Style::new().cyan())
}

/// A variable or environment name, styled for inline use.
pub fn key(k: &str) -> String {
    if colors_enabled() {
        style(k).cyan().bold().to_string()
    } else {
        k.to_string()
    }
}

/// Locked marker, styled for inline use.
pub fn locked(msg: &str) -> String {
    paint(msg, Style::new().yellow())
}
