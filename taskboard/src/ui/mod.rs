//! Terminal UI rendering.

pub mod board_panel;
pub mod status_bar;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, InputMode};
use crate::board::BoardView;
use crate::gateway::Gateway;

/// Main draw function for the entire UI.
pub fn draw<G: Gateway>(frame: &mut Frame, app: &App<G>) {
    let snapshot = app.board.snapshot();
    let view = app.board.view(&snapshot, app.today);

    let banner = app
        .board
        .alert()
        .map(|a| {
            let hint = if a.retry.is_some() {
                "  (R: retry, Esc: dismiss)"
            } else {
                "  (Esc: dismiss)"
            };
            Line::from(vec![
                Span::raw(format!(" {}", a.message)),
                Span::raw(hint),
            ])
            .style(theme::alert())
        })
        .or_else(|| {
            app.notice.as_deref().map(|n| {
                Line::from(Span::styled(
                    format!(" {n}"),
                    theme::normal().fg(theme::WARNING),
                ))
            })
        });

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(u16::from(banner.is_some())),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app, &view);
    board_panel::render(frame, chunks[1], app, &view);
    if let Some(banner) = banner {
        frame.render_widget(Paragraph::new(banner), chunks[2]);
    }
    status_bar::render(frame, chunks[3], app);

    if let InputMode::Reassign { cursor } = app.mode {
        render_reassign_popup(frame, chunks[1], app, cursor);
    }
}

fn render_header<G: Gateway>(frame: &mut Frame, area: Rect, app: &App<G>, view: &BoardView<'_>) {
    let counts = view.counts;
    let mut spans = vec![
        Span::styled(view.kind.title(), theme::bold()),
        Span::styled(format!("  {} tasks", view.tasks.len()), theme::dimmed()),
        Span::raw("  "),
        Span::styled(
            format!("pending {}", counts.pending),
            theme::normal().fg(theme::FG_SECONDARY),
        ),
        Span::raw(" · "),
        Span::styled(
            format!("in review {}", counts.in_review),
            theme::normal().fg(theme::WARNING),
        ),
        Span::raw(" · "),
        Span::styled(
            format!("correction {}", counts.needs_correction),
            theme::normal().fg(theme::ERROR),
        ),
        Span::raw(" · "),
        Span::styled(
            format!("published {}", counts.published),
            theme::normal().fg(theme::SUCCESS),
        ),
    ];

    let filter = &app.board.state().filter;
    if !filter.is_empty() {
        let mut parts = Vec::new();
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            parts.push(format!("\"{search}\""));
        }
        if let Some(priority) = filter.priority {
            parts.push(theme::priority_label(priority).to_string());
        }
        if let Some(name) = &filter.assignee {
            parts.push(format!("@{name}"));
        }
        spans.push(Span::styled(
            format!("  filter: {}", parts.join(" ")),
            theme::highlighted(),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_reassign_popup<G: Gateway>(frame: &mut Frame, area: Rect, app: &App<G>, cursor: usize) {
    let candidates = app.reassign_candidates();
    let target = app.board.state().reassigning().and_then(|r| r.target);

    let items: Vec<ListItem> = if candidates.is_empty() {
        vec![ListItem::new(Span::styled(
            "No other users available",
            theme::dimmed(),
        ))]
    } else {
        candidates
            .iter()
            .map(|user| {
                let mark = if Some(user.id) == target { "● " } else { "  " };
                ListItem::new(Line::from(vec![
                    Span::raw(mark),
                    Span::raw(user.name.clone()),
                ]))
            })
            .collect()
    };

    let height = u16::try_from(items.len()).unwrap_or(u16::MAX).saturating_add(2);
    let popup = centered(area, 32, height);
    let block = Block::default()
        .title(" Reassign to ")
        .borders(Borders::ALL)
        .border_style(theme::highlighted());
    let list = List::new(items)
        .block(block)
        .highlight_style(theme::selected());

    let mut state = ListState::default();
    if !candidates.is_empty() {
        state.select(Some(cursor));
    }
    frame.render_widget(Clear, popup);
    frame.render_stateful_widget(list, popup, &mut state);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
