use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::form::Field;
use crate::kanban_board::KanbanBoard;
use crate::notify::Level;
use crate::screens::{FormState, Screen};
use crate::task::{due_date, Priority, Status, Task};

pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_navbar(f, app, chunks[0]);

    if let Some(mounted) = &app.current {
        match &mounted.screen {
            Screen::Board(board) => render_board(f, board, chunks[1]),
            screen => {
                if let Some(state) = screen.form_state() {
                    render_form(f, screen, state, chunks[1]);
                }
            }
        }
        f.render_widget(
            Paragraph::new(mounted.screen.hints()).style(Style::default().fg(Color::DarkGray)),
            chunks[2],
        );
    }

    if app.navbar.open {
        render_menu(f, app, chunks[1]);
    }
    render_notifications(f, app, chunks[1]);
}

fn render_navbar(f: &mut Frame, app: &App, area: Rect) {
    let status = if app.session.is_present() {
        Span::styled("● signed in", Style::default().fg(Color::Green))
    } else {
        Span::styled("○ signed out", Style::default().fg(Color::DarkGray))
    };
    let line = Line::from(vec![
        Span::styled(" taskboard ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(app.current_path().unwrap_or("")),
        Span::raw("   "),
        status,
        Span::styled("   F2 menu · Ctrl+H home · Ctrl+C quit", Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(
        Paragraph::new(line).style(Style::default().bg(Color::Black)),
        area,
    );
}

fn render_menu(f: &mut Frame, app: &App, body: Rect) {
    let items = app.menu_items();
    let width = 20.min(body.width);
    let area = Rect {
        x: body.right().saturating_sub(width),
        y: body.y,
        width,
        height: (items.len() as u16 + 2).min(body.height),
    };
    let list: Vec<ListItem> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if i == app.navbar.selected {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Span::styled(item.label(), style))
        })
        .collect();
    f.render_widget(Clear, area);
    f.render_widget(
        List::new(list).block(Block::default().title("Account").borders(Borders::ALL)),
        area,
    );
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

fn render_board(f: &mut Frame, board: &KanbanBoard, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let priority = board.priority_filter.map_or("all", Priority::as_str);
    let date = board
        .date_filter
        .map_or_else(|| "all".to_string(), |d| d.format(due_date::FORMAT).to_string());
    let mut filters = format!(" priority: {priority}   due: {date}");
    if board.loading {
        filters.push_str("   loading…");
    }
    f.render_widget(Paragraph::new(filters), rows[0]);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(rows[1]);

    for (i, (status, tasks)) in board.columns().iter().enumerate() {
        let items: Vec<ListItem> = tasks
            .iter()
            .enumerate()
            .map(|(j, t)| {
                let selected = board.selected_status == i && board.selected_task == j;
                let name_style = if selected {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                ListItem::new(vec![
                    Line::from(Span::styled(t.name.as_str(), name_style)),
                    Line::from(vec![
                        Span::styled(
                            format!(" {} ", t.priority.as_str().to_uppercase()),
                            Style::default().fg(priority_color(t.priority)),
                        ),
                        Span::raw(format!(" (Due: {}) {}", t.finishdate.format(due_date::FORMAT), t.category)),
                    ]),
                ])
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .title(status.as_str().to_uppercase())
                .borders(Borders::ALL)
                .border_style(if board.selected_status == i {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                }),
        );

        f.render_widget(list, chunks[i]);
    }

    if let Some(task) = &board.detail {
        render_detail(f, task, area);
    }
}

fn render_detail(f: &mut Frame, task: &Task, area: Rect) {
    let popup = centered(area, 60, 12);
    let lines = vec![
        Line::from(Span::styled(task.name.as_str(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(task.description.as_str()),
        Line::from(""),
        Line::from(format!("Due date: {}", task.finishdate.format(due_date::FORMAT))),
        Line::from(format!("Category: {}", task.category)),
        Line::from(vec![
            Span::raw("Priority: "),
            Span::styled(
                task.priority.as_str().to_uppercase(),
                Style::default().fg(priority_color(task.priority)),
            ),
        ]),
        Line::from(format!("Status: {}", status_label(task.status))),
        Line::from(""),
        Line::from(Span::styled(
            "Esc close · e edit · d delete",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().title("Task").borders(Borders::ALL)),
        popup,
    );
}

fn status_label(status: Status) -> String {
    status.as_str().to_uppercase()
}

fn render_form(f: &mut Frame, screen: &Screen, state: &FormState, area: Rect) {
    let fields = state.form.fields();
    let height = fields.len() as u16 * 3 + 4;
    let card = centered(area, 60, height);

    let title = if state.loading {
        format!("{} (working…)", screen.title())
    } else {
        screen.title().to_string()
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(card);
    f.render_widget(Clear, card);
    f.render_widget(block, card);

    let mut constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Min(1));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, field) in fields.iter().enumerate() {
        render_field(f, field, i == state.form.focus(), rows[i]);
    }

    let footer = match screen.problem() {
        Some(problem) => Line::from(Span::styled(problem.to_string(), Style::default().fg(Color::Yellow))),
        None if state.loading => Line::from("Sending…"),
        None => Line::from(Span::styled("Press Enter to submit", Style::default().fg(Color::Green))),
    };
    if let Some(area) = rows.last() {
        f.render_widget(Paragraph::new(footer).alignment(Alignment::Center), *area);
    }

    if let Screen::Profile(profile) = screen {
        if let Some(photo) = &profile.photo {
            let line = Line::from(Span::styled(
                format!("current photo: {photo}"),
                Style::default().fg(Color::DarkGray),
            ));
            let below = Rect {
                y: card.bottom().min(area.bottom().saturating_sub(1)),
                height: 1,
                ..card
            };
            f.render_widget(Paragraph::new(line), below);
        }
    }
}

fn render_field(f: &mut Frame, field: &Field, focused: bool, area: Rect) {
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut label = field.label.to_string();
    if field.required {
        label.push_str(" *");
    }
    let mut value = field.display_value();
    if focused {
        value.push('▏');
    }
    f.render_widget(
        Paragraph::new(value).block(
            Block::default()
                .title(label)
                .borders(Borders::ALL)
                .border_style(border),
        ),
        area,
    );
}

fn render_notifications(f: &mut Frame, app: &App, body: Rect) {
    let width = 48.min(body.width);
    let mut bottom = body.bottom();
    for notification in app.notifications.visible().iter().rev() {
        if bottom < body.y + 3 {
            break;
        }
        let color = match notification.level {
            Level::Success => Color::Green,
            Level::Error => Color::Red,
            Level::Info => Color::Blue,
        };
        let area = Rect {
            x: body.right().saturating_sub(width),
            y: bottom - 3,
            width,
            height: 3,
        };
        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(notification.message.as_str())
                .style(Style::default().fg(color))
                .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(color))),
            area,
        );
        bottom -= 3;
    }
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
