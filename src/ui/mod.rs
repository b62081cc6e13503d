//! Terminal panel rendering
//!
//! Paints the three hydrated slots. This is purely a view over `App`: no
//! fetch, cache, or reconciliation logic lives here.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{ApiState, App};

/// Renders the full panel.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(9),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_announcement(frame, app, chunks[0]);
    render_user_info(frame, app, chunks[1]);
    render_hints(frame, chunks[2]);
}

/// Renders the announcement block.
fn render_announcement(frame: &mut Frame, app: &App, area: Rect) {
    let line = match slot_status(&app.public_data) {
        SlotStatus::Loading => Line::from("Loading..."),
        SlotStatus::Error(error) => error_line(error),
        SlotStatus::Ready => {
            let text = app
                .public_data
                .data
                .as_ref()
                .and_then(|d| d.latest_announcement.clone())
                .unwrap_or_else(|| "No announcement".to_string());
            Line::from(text)
        }
    };

    let widget = Paragraph::new(line)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Latest Announcement").borders(Borders::ALL));
    frame.render_widget(widget, area);
}

/// Renders the user info block, including the dependent benefits sub-block
/// for logged-in users and the login prompt otherwise.
fn render_user_info(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    match slot_status(&app.user_status) {
        SlotStatus::Loading => lines.push(Line::from("Loading...")),
        SlotStatus::Error(error) => lines.push(error_line(&format!("Error: {error}"))),
        SlotStatus::Ready => {
            if let Some(status) = &app.user_status.data {
                if status.is_logged_in {
                    lines.push(Line::from(format!(
                        "Welcome, {}!",
                        status.email.as_deref().unwrap_or("unknown")
                    )));
                    lines.push(Line::from(format!(
                        "Your plan: {}",
                        status.plan.as_deref().unwrap_or("none")
                    )));
                    lines.push(Line::from(""));
                    lines.push(Line::from("Subscription details:"));
                    push_benefits_lines(&mut lines, app);
                } else {
                    lines.push(Line::from("Please log in to view your subscription."));
                    lines.push(Line::from(format!("Login at: {}", app.login_url)));
                }
            }
        }
    }

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("User Info").borders(Borders::ALL));
    frame.render_widget(widget, area);
}

/// Appends the benefits sub-block lines.
fn push_benefits_lines(lines: &mut Vec<Line>, app: &App) {
    match slot_status(&app.user_benefits) {
        SlotStatus::Loading => lines.push(Line::from("  Loading...")),
        SlotStatus::Error(error) => lines.push(error_line(&format!("  {error}"))),
        SlotStatus::Ready => {
            if let Some(benefits) = &app.user_benefits.data {
                lines.push(Line::from(format!(
                    "  Status: {}",
                    benefits.subscription_status.as_deref().unwrap_or("None")
                )));
                lines.push(Line::from(format!(
                    "  Plan ID: {}",
                    benefits.active_plan_id.as_deref().unwrap_or("None")
                )));
            }
        }
    }
}

/// Renders the key hint footer.
fn render_hints(frame: &mut Frame, area: Rect) {
    let hints = Paragraph::new(Line::from("q: quit  r: refresh"))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hints, area);
}

/// Display precedence for a slot: loading, then error, then data.
enum SlotStatus<'a> {
    Loading,
    Error(&'a str),
    Ready,
}

fn slot_status<T>(state: &ApiState<T>) -> SlotStatus<'_> {
    if state.is_loading {
        SlotStatus::Loading
    } else if let Some(error) = state.error.as_deref() {
        SlotStatus::Error(error)
    } else {
        SlotStatus::Ready
    }
}

fn error_line(text: &str) -> Line<'static> {
    Line::styled(text.to_string(), Style::default().fg(Color::Red))
}
