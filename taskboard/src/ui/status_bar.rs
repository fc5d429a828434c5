//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, InputMode};
use crate::board::AssignmentChoice;
use crate::gateway::Gateway;

/// Render the status bar at the bottom of the screen.
pub fn render<G: Gateway>(frame: &mut Frame, area: Rect, app: &App<G>) {
    let line = match &app.mode {
        InputMode::Normal => {
            let pending = app.board.pending_edits();
            let mut spans = vec![Span::styled("Taskboard", theme::bold())];
            if pending > 0 {
                spans.push(Span::raw(" | "));
                spans.push(Span::styled(
                    format!("{pending} unsent"),
                    theme::normal().fg(theme::WARNING),
                ));
            }
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                "jk: move | Enter: expand | Tab: board | /: search | p: priority | a: assignee | \
                 n: new | e: edit | d: description | i: progress | s: status | m: reassign | \
                 x: delete | r: refresh | R: retry | q: quit",
                theme::dimmed(),
            ));
            Line::from(spans)
        }
        InputMode::Search { buffer } => prompt("Search", buffer, "Enter: keep | Esc: clear"),
        InputMode::NewTask { form } => {
            let assign = match form.assignment {
                AssignmentChoice::None => "unassigned".to_string(),
                AssignmentChoice::Random => "random user".to_string(),
                AssignmentChoice::Manual(Some(user)) => app
                    .board
                    .catalog()
                    .user_name(user)
                    .map_or_else(|| format!("user {user}"), ToString::to_string),
                AssignmentChoice::Manual(None) => "pick a user".to_string(),
            };
            prompt(
                "New task",
                &form.title,
                &format!("Tab: assign ({assign}) | Enter: create | Esc: cancel"),
            )
        }
        InputMode::EditTask { form } => prompt(
            "Title",
            &form.title,
            &format!(
                "Tab: priority ({}) | Enter: save | Esc: cancel",
                theme::priority_label(form.priority)
            ),
        ),
        InputMode::Description { buffer, .. } => {
            prompt("Description", buffer, "saved as you type | Enter/Esc: done")
        }
        InputMode::Detail { buffer, .. } => {
            prompt("Progress", buffer, "saved as you type | Enter/Esc: done")
        }
        InputMode::Reassign { .. } => Line::from(Span::styled(
            "jk: move | Space: pick | Enter: confirm | Esc: cancel",
            theme::dimmed(),
        )),
    };

    let paragraph = Paragraph::new(line).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}

fn prompt<'a>(label: &'a str, buffer: &str, help: &str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label}: "), theme::highlighted()),
        Span::styled(format!("{buffer}█"), theme::normal()),
        Span::raw("  "),
        Span::styled(help.to_string(), theme::dimmed()),
    ])
}
