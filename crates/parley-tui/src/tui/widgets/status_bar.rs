//! Status bar widget for session status, connection health, and notices

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use parley_client::{ConnectionState, Session, SessionStatus};

/// One-row status bar: session state on the left, connection on the right.
pub struct StatusBar<'a> {
    session: Option<&'a Session>,
    connection: ConnectionState,
    notice: Option<&'a str>,
}

impl<'a> StatusBar<'a> {
    pub fn new(session: Option<&'a Session>, connection: ConnectionState) -> Self {
        Self {
            session,
            connection,
            notice: None,
        }
    }

    pub fn with_notice(mut self, notice: Option<&'a str>) -> Self {
        self.notice = notice;
        self
    }
}

fn status_style(status: &SessionStatus) -> Style {
    let color = match status {
        SessionStatus::Running => Color::Green,
        SessionStatus::Stopping | SessionStatus::Stopped => Color::Yellow,
        SessionStatus::Failed => Color::Red,
        SessionStatus::Completed => Color::Blue,
        SessionStatus::Canceled => Color::DarkGray,
        SessionStatus::Created | SessionStatus::Other(_) => Color::Gray,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn connection_style(connection: ConnectionState) -> Style {
    let color = match connection {
        ConnectionState::Connected => Color::Green,
        ConnectionState::Connecting => Color::Yellow,
        ConnectionState::Reconnecting => Color::Red,
    };
    Style::default().fg(color)
}

/// "next r2 B" while the session can still produce turns, empty otherwise.
fn format_up_next(session: &Session) -> Option<String> {
    if session.status.is_terminal() {
        return None;
    }
    Some(format!(
        "next r{} {}",
        session.next_round,
        session.next_actor.label()
    ))
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut left_spans = vec![Span::raw(" ")];
        match self.session {
            Some(session) => {
                left_spans.push(Span::styled(
                    session.status.to_string(),
                    status_style(&session.status),
                ));
                if let Some(up_next) = format_up_next(session) {
                    left_spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
                    left_spans.push(Span::raw(up_next));
                }
                if let Some(stop_reason) = &session.stop_reason {
                    left_spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
                    left_spans.push(Span::styled(
                        format!("stopped: {stop_reason}"),
                        Style::default().fg(Color::Yellow),
                    ));
                }
                if let Some(last_error) = &session.last_error {
                    left_spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
                    left_spans.push(Span::styled(
                        last_error.clone(),
                        Style::default().fg(Color::Red),
                    ));
                }
            }
            None => left_spans.push(Span::styled(
                "loading",
                Style::default().add_modifier(Modifier::DIM),
            )),
        }
        if let Some(notice) = self.notice {
            left_spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
            left_spans.push(Span::styled(
                notice.to_string(),
                Style::default().fg(Color::Yellow),
            ));
        }
        Paragraph::new(Line::from(left_spans))
            .alignment(Alignment::Left)
            .render(area, buf);

        let right_line = Line::from(vec![
            Span::styled(
                self.connection.to_string(),
                connection_style(self.connection),
            ),
            Span::raw(" "),
        ]);
        Paragraph::new(right_line)
            .alignment(Alignment::Right)
            .render(area, buf);
    }
}
