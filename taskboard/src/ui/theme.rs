//! Theme and styling constants for the TUI.

use ratatui::style::{Color, Modifier, Style};
use taskboard_proto::assignment::AssignmentStatus;
use taskboard_proto::task::Priority;

/// Primary foreground color.
pub const FG_PRIMARY: Color = Color::White;

/// Secondary foreground color (dimmed text).
pub const FG_SECONDARY: Color = Color::Gray;

/// Highlight color for focused elements.
pub const HIGHLIGHT: Color = Color::Cyan;

/// Success color.
pub const SUCCESS: Color = Color::Green;

/// Warning color.
pub const WARNING: Color = Color::Yellow;

/// Error color.
pub const ERROR: Color = Color::Red;

/// Panel title color for the board panel.
pub const BOARD_TITLE: Color = Color::Cyan;

/// Colors for assignee group headers.
pub const USER_COLORS: [Color; 8] = [
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Blue,
    Color::LightCyan,
    Color::LightGreen,
    Color::Rgb(255, 165, 0),
];

/// Normal text style.
#[must_use]
pub fn normal() -> Style {
    Style::default().fg(FG_PRIMARY)
}

/// Dimmed text style (metadata, help text).
#[must_use]
pub fn dimmed() -> Style {
    Style::default().fg(FG_SECONDARY)
}

/// Bold text style.
#[must_use]
pub fn bold() -> Style {
    Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD)
}

/// Highlighted text style (focused borders, popups).
#[must_use]
pub fn highlighted() -> Style {
    Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

/// Selected item style (in lists).
#[must_use]
pub fn selected() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Style for the status bar background.
#[must_use]
pub fn status_bar_bg() -> Style {
    Style::default().fg(Color::White).bg(Color::Rgb(30, 30, 50))
}

/// Style for panel titles with a given color (bold).
#[must_use]
pub fn panel_title(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Style for the alert banner.
#[must_use]
pub fn alert() -> Style {
    Style::default()
        .fg(Color::White)
        .bg(Color::Rgb(120, 20, 20))
        .add_modifier(Modifier::BOLD)
}

/// Get a color for an assignee based on their name.
#[must_use]
pub fn user_color(name: &str) -> Color {
    let hash = name.bytes().fold(0u32, |acc, b| {
        acc.wrapping_mul(31).wrapping_add(u32::from(b))
    });
    USER_COLORS[(hash as usize) % USER_COLORS.len()]
}

/// Badge color for an assignment status.
#[must_use]
pub const fn status_color(status: AssignmentStatus) -> Color {
    match status {
        AssignmentStatus::Pending => FG_SECONDARY,
        AssignmentStatus::InReview => WARNING,
        AssignmentStatus::NeedsCorrection => ERROR,
        AssignmentStatus::Published => SUCCESS,
    }
}

/// Short label for an assignment status.
#[must_use]
pub const fn status_label(status: AssignmentStatus) -> &'static str {
    match status {
        AssignmentStatus::Pending => "pending",
        AssignmentStatus::InReview => "in review",
        AssignmentStatus::NeedsCorrection => "correction",
        AssignmentStatus::Published => "published",
    }
}

/// Color for a priority marker.
#[must_use]
pub const fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => ERROR,
        Priority::Medium => WARNING,
        Priority::Low => FG_SECONDARY,
    }
}

/// Short label for a priority.
#[must_use]
pub const fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "high",
        Priority::Medium => "medium",
        Priority::Low => "low",
    }
}
