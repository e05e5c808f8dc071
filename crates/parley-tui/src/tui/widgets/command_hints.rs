//! Key-hint row showing which lifecycle commands are currently legal

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use parley_client::{SessionCommand, SessionStatus};

/// Key bound to each lifecycle command.
pub fn key_for(command: SessionCommand) -> char {
    match command {
        SessionCommand::Start => 's',
        SessionCommand::Resume => 'r',
        SessionCommand::Stop => 'x',
        SessionCommand::Cancel => 'c',
        SessionCommand::Retry => 't',
    }
}

pub fn command_for_key(key: char) -> Option<SessionCommand> {
    SessionCommand::ALL.into_iter().find(|c| key_for(*c) == key)
}

pub struct CommandHints<'a> {
    status: Option<&'a SessionStatus>,
}

impl<'a> CommandHints<'a> {
    pub fn new(status: Option<&'a SessionStatus>) -> Self {
        Self { status }
    }
}

impl Widget for CommandHints<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let dim = Style::default().add_modifier(Modifier::DIM);
        let mut spans = vec![Span::raw(" ")];

        for command in SessionCommand::ALL {
            let enabled = self.status.is_some_and(|s| command.is_enabled(s));
            let style = if enabled { Style::default() } else { dim };
            spans.push(Span::styled(
                format!("[{}] {}  ", key_for(command), command.endpoint()),
                style,
            ));
        }
        spans.push(Span::styled("[R] refresh  ", Style::default()));
        spans.push(Span::styled("[Tab] sessions  ", Style::default()));
        spans.push(Span::styled("[q] quit", Style::default()));

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_command_has_a_distinct_key() {
        let mut keys: Vec<char> = SessionCommand::ALL.into_iter().map(key_for).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), SessionCommand::ALL.len());
    }

    #[test]
    fn keys_round_trip_to_commands() {
        for command in SessionCommand::ALL {
            assert_eq!(command_for_key(key_for(command)), Some(command));
        }
        assert_eq!(command_for_key('z'), None);
    }
}
