//! Transcript rendering: round headers, attributed turns, verdict blocks

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, StatefulWidget, Widget},
};

use parley_client::{Actor, Turn, Verdict};

use crate::tui::transcript_view::TranscriptListState;

/// Gutter indent for turn content under its attribution line.
const CONTENT_INDENT: &str = "  ";

pub struct TranscriptView<'a> {
    turns: &'a [Turn],
}

impl<'a> TranscriptView<'a> {
    pub fn new(turns: &'a [Turn]) -> Self {
        Self { turns }
    }
}

impl StatefulWidget for TranscriptView<'_> {
    type State = TranscriptListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let lines = build_lines(self.turns, area.width);
        state.begin_render(lines.len(), area.height);

        let scroll = u16::try_from(state.offset).unwrap_or(u16::MAX);
        Paragraph::new(lines).scroll((scroll, 0)).render(area, buf);
    }
}

fn actor_style(actor: &Actor) -> Style {
    let color = match actor {
        Actor::DebaterA => Color::Cyan,
        Actor::DebaterB => Color::Magenta,
        Actor::Judge => Color::Yellow,
        Actor::Other(_) => Color::Gray,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Lay the transcript out as styled rows for the given width. Row count is
/// what the scroll state measures, so this is the single source of truth
/// for content height.
pub fn build_lines(turns: &[Turn], width: u16) -> Vec<Line<'static>> {
    let wrap_width = (width as usize).saturating_sub(CONTENT_INDENT.len()).max(16);
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut current_round = None;

    for turn in turns {
        if current_round != Some(turn.round) {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            lines.push(Line::from(Span::styled(
                format!("── Round {} ──", turn.round),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            current_round = Some(turn.round);
        }

        lines.push(Line::default());
        lines.push(attribution_line(turn));

        for wrapped in textwrap::wrap(&turn.content, wrap_width) {
            lines.push(Line::from(format!("{CONTENT_INDENT}{wrapped}")));
        }

        if turn.actor == Actor::Judge {
            if let Some(verdict) = Verdict::from_metadata(&turn.metadata) {
                lines.push(Line::default());
                lines.extend(verdict_lines(&verdict, wrap_width));
            }
        }
    }

    lines
}

fn attribution_line(turn: &Turn) -> Line<'static> {
    let mut spans = vec![Span::styled(
        turn.actor.label().to_string(),
        actor_style(&turn.actor),
    )];
    if let Some(model) = &turn.model {
        spans.push(Span::styled(
            format!(" ({model})"),
            Style::default().add_modifier(Modifier::DIM),
        ));
    }
    spans.push(Span::styled(
        format!("  {}", turn.created_at.format("%H:%M:%S")),
        Style::default().add_modifier(Modifier::DIM),
    ));
    Line::from(spans)
}

fn verdict_lines(verdict: &Verdict, wrap_width: usize) -> Vec<Line<'static>> {
    let winner = match verdict.winner {
        parley_client::Winner::A => "A wins",
        parley_client::Winner::B => "B wins",
        parley_client::Winner::Tie => "Tie",
    };
    let mut lines = vec![Line::from(Span::styled(
        format!(
            "{CONTENT_INDENT}Verdict: {winner} ({}-{})",
            verdict.score_a, verdict.score_b
        ),
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    ))];

    for wrapped in textwrap::wrap(&verdict.summary, wrap_width.saturating_sub(2).max(16)) {
        lines.push(Line::from(format!("{CONTENT_INDENT}  {wrapped}")));
    }

    if verdict.no_new_arguments {
        lines.push(Line::from(Span::styled(
            format!("{CONTENT_INDENT}  no new substantive arguments"),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::{Map, json};
    use uuid::Uuid;

    fn turn(round: u32, actor: Actor, content: &str) -> Turn {
        Turn {
            id: Uuid::new_v4(),
            session_id: Uuid::from_u128(1),
            round,
            actor,
            content: content.to_string(),
            model: None,
            usage: Map::new(),
            metadata: Map::new(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    fn rendered(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn round_header_appears_once_per_round() {
        let turns = vec![
            turn(1, Actor::DebaterA, "opening"),
            turn(1, Actor::DebaterB, "rebuttal"),
            turn(2, Actor::DebaterA, "second opening"),
        ];
        let text = rendered(&build_lines(&turns, 80));

        assert_eq!(text.iter().filter(|l| l.contains("Round 1")).count(), 1);
        assert_eq!(text.iter().filter(|l| l.contains("Round 2")).count(), 1);
    }

    #[test]
    fn long_content_wraps_to_width() {
        let turns = vec![turn(1, Actor::DebaterA, &"word ".repeat(40))];
        let lines = build_lines(&turns, 40);
        for line in rendered(&lines) {
            assert!(line.len() <= 40, "line too wide: {line:?}");
        }
    }

    #[test]
    fn judge_turn_with_valid_metadata_gets_a_verdict_block() {
        let mut judged = turn(3, Actor::Judge, "Final ruling.");
        judged.metadata = match json!({
            "winner": "a",
            "score_a": 4,
            "score_b": 2,
            "summary": "A carried the stronger evidence.",
            "no_new_substantive_arguments": true
        }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };

        let text = rendered(&build_lines(&[judged], 80));
        assert!(text.iter().any(|l| l.contains("Verdict: A wins (4-2)")));
        assert!(text.iter().any(|l| l.contains("stronger evidence")));
        assert!(
            text.iter()
                .any(|l| l.contains("no new substantive arguments"))
        );
    }

    #[test]
    fn judge_turn_without_verdict_metadata_renders_plain() {
        let judged = turn(3, Actor::Judge, "Deliberating.");
        let text = rendered(&build_lines(&[judged], 80));
        assert!(!text.iter().any(|l| l.contains("Verdict:")));
        assert!(text.iter().any(|l| l.contains("Deliberating.")));
    }
}
