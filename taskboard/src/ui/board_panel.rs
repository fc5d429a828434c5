//! Board panel rendering: assignee groups and task cards.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};
use taskboard_proto::assignment::Assignment;
use taskboard_proto::task::TaskWithAssignments;

use super::theme;
use crate::app::App;
use crate::board::{BoardView, Row};
use crate::gateway::Gateway;
use crate::store::Catalog;

/// Render the board rows with the cursor highlighted.
pub fn render<G: Gateway>(frame: &mut Frame, area: Rect, app: &App<G>, view: &BoardView<'_>) {
    let catalog = app.board.catalog();

    let items: Vec<ListItem> = view
        .rows
        .iter()
        .map(|row| match row {
            Row::User {
                name,
                count,
                expanded,
            } => ListItem::new(Line::from(vec![
                Span::raw(if *expanded { "▾ " } else { "▸ " }),
                Span::styled(name.as_str(), theme::panel_title(theme::user_color(name))),
                Span::styled(format!(" ({count})"), theme::dimmed()),
            ])),
            Row::Unassigned { count } => ListItem::new(Line::from(vec![
                Span::raw("▾ "),
                Span::styled("Unassigned", theme::bold()),
                Span::styled(format!(" ({count})"), theme::dimmed()),
            ])),
            Row::Task {
                task,
                assignment,
                expanded,
            } => ListItem::new(task_lines(app, &catalog, task, *assignment, *expanded)),
        })
        .collect();

    let title = format!(" {} ", view.kind.title());
    let block = Block::default()
        .title(Span::styled(title, theme::panel_title(theme::BOARD_TITLE)))
        .borders(Borders::ALL)
        .border_style(theme::normal());

    let list = if items.is_empty() {
        List::new(vec![ListItem::new(Span::styled(
            "No tasks on this board",
            theme::dimmed(),
        ))])
        .block(block)
    } else {
        List::new(items)
            .block(block)
            .highlight_style(theme::selected())
    };

    let mut state = ListState::default();
    if !view.rows.is_empty() {
        state.select(Some(app.cursor));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn task_lines<'a, G: Gateway>(
    app: &App<G>,
    catalog: &Catalog,
    task: &'a TaskWithAssignments,
    assignment: Option<&'a Assignment>,
    expanded: bool,
) -> Vec<Line<'a>> {
    let mut head = vec![
        Span::raw("    "),
        Span::styled("●", theme::normal().fg(theme::priority_color(task.task.priority))),
        Span::raw(" "),
        Span::styled(task.task.title.as_str(), theme::normal()),
    ];
    if let Some(a) = assignment {
        head.push(Span::raw(" "));
        head.push(Span::styled(
            format!("[{}]", theme::status_label(a.status)),
            theme::normal().fg(theme::status_color(a.status)),
        ));
    }
    head.push(Span::styled(
        format!("  {}", task.task.date.format("%Y-%m-%d")),
        theme::dimmed(),
    ));
    let mut lines = vec![Line::from(head)];
    if !expanded {
        return lines;
    }

    let id = task.id();
    let mut description = vec![
        Span::raw("      "),
        Span::styled(
            if task.task.description.is_empty() {
                "(no description)"
            } else {
                task.task.description.as_str()
            },
            theme::dimmed(),
        ),
    ];
    if app.board.is_description_unsaved(id) {
        description.push(Span::styled(" unsaved", theme::normal().fg(theme::ERROR)));
    } else if app.board.is_description_pending(id) {
        description.push(Span::styled(" saving…", theme::normal().fg(theme::WARNING)));
    }
    lines.push(Line::from(description));

    let type_name = task
        .task
        .task_type
        .and_then(|t| catalog.type_name(t))
        .unwrap_or("-");
    let company_name = task
        .task
        .company
        .and_then(|c| catalog.company_name(c))
        .unwrap_or("-");
    lines.push(Line::from(Span::styled(
        format!(
            "      {} · {type_name} · {company_name}",
            theme::priority_label(task.task.priority)
        ),
        theme::dimmed(),
    )));

    if let Some(a) = assignment {
        let mut detail = vec![
            Span::raw("      progress: "),
            Span::styled(
                if a.detail.is_empty() {
                    "-"
                } else {
                    a.detail.as_str()
                },
                theme::normal(),
            ),
        ];
        if app.board.is_detail_unsaved(a.id) {
            detail.push(Span::styled(" unsaved", theme::normal().fg(theme::ERROR)));
        }
        lines.push(Line::from(detail));
    }

    for other in task
        .assignments
        .iter()
        .filter(|o| assignment.is_none_or(|a| a.id != o.id))
    {
        lines.push(Line::from(vec![
            Span::raw("      also: "),
            Span::styled(
                other.user_name.as_str(),
                theme::normal().fg(theme::user_color(&other.user_name)),
            ),
            Span::styled(
                format!(" [{}]", theme::status_label(other.status)),
                theme::normal().fg(theme::status_color(other.status)),
            ),
        ]));
    }
    lines
}
