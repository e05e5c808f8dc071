//! Session picker sidebar

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, StatefulWidget},
};

use parley_client::SessionSummary;
use uuid::Uuid;

/// Selection state for the session picker. Kept outside the widget so the
/// list survives across frames.
#[derive(Debug, Default)]
pub struct SessionPickerState {
    sessions: Vec<SessionSummary>,
    list: ListState,
}

impl SessionPickerState {
    pub fn new(sessions: Vec<SessionSummary>) -> Self {
        let mut list = ListState::default();
        if !sessions.is_empty() {
            list.select(Some(0));
        }
        Self { sessions, list }
    }

    pub fn sessions(&self) -> &[SessionSummary] {
        &self.sessions
    }

    pub fn select_next(&mut self) {
        if self.sessions.is_empty() {
            return;
        }
        let next = match self.list.selected() {
            Some(i) => (i + 1).min(self.sessions.len() - 1),
            None => 0,
        };
        self.list.select(Some(next));
    }

    pub fn select_previous(&mut self) {
        if self.sessions.is_empty() {
            return;
        }
        let previous = self.list.selected().map_or(0, |i| i.saturating_sub(1));
        self.list.select(Some(previous));
    }

    pub fn selected_id(&self) -> Option<Uuid> {
        self.list
            .selected()
            .and_then(|i| self.sessions.get(i))
            .map(|s| s.id)
    }
}

pub struct SessionPicker;

impl StatefulWidget for SessionPicker {
    type State = SessionPickerState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let items: Vec<ListItem> = state
            .sessions
            .iter()
            .map(|summary| {
                let line = Line::from(vec![
                    Span::styled(
                        format!("{:<9}", summary.status),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(" "),
                    Span::raw(summary.topic.clone()),
                ]);
                ListItem::new(line)
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::RIGHT).title("Sessions"))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");

        StatefulWidget::render(list, area, buf, &mut state.list);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use parley_client::{Actor, SessionStatus};

    fn summary(id: u128) -> SessionSummary {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        SessionSummary {
            id: Uuid::from_u128(id),
            topic: format!("Topic {id}"),
            status: SessionStatus::Running,
            next_round: 1,
            next_actor: Actor::DebaterA,
            stop_reason: None,
            last_error: None,
            completed_rounds: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn selection_clamps_at_both_ends() {
        let mut state = SessionPickerState::new(vec![summary(1), summary(2)]);
        assert_eq!(state.selected_id(), Some(Uuid::from_u128(1)));

        state.select_previous();
        assert_eq!(state.selected_id(), Some(Uuid::from_u128(1)));

        state.select_next();
        state.select_next();
        assert_eq!(state.selected_id(), Some(Uuid::from_u128(2)));
    }

    #[test]
    fn empty_list_never_selects() {
        let mut state = SessionPickerState::new(Vec::new());
        state.select_next();
        state.select_previous();
        assert_eq!(state.selected_id(), None);
    }
}
