//! Status bar rendering with keybindings and state indicators

use crate::render::CursorShape;
use crate::scene::RedrawOutcome;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// What the status bar reports about the current step
pub struct StatusLine<'a> {
    pub message: &'a str,
    pub current_step: usize,
    pub total_steps: usize,
    pub outcome: Option<&'a RedrawOutcome>,
    pub cursor: CursorShape,
    pub is_playing: bool,
}

fn outcome_text(outcome: Option<&RedrawOutcome>) -> String {
    match outcome {
        None | Some(RedrawOutcome::NoProgram) => "no program".to_string(),
        Some(RedrawOutcome::Shown {
            frames,
            objects,
            arrows,
        }) => format!("{} frames, {} objects, {} arrows", frames, objects, arrows),
        Some(RedrawOutcome::Faulted(err)) => format!("fault: {}", err),
    }
}

/// Render the status bar at the bottom.
pub fn render_status_bar(frame: &mut Frame, area: Rect, status: &StatusLine) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let faulted = matches!(status.outcome, Some(RedrawOutcome::Faulted(_)));
    let left_spans = vec![
        Span::styled(
            format!(" Step {}/{} ", status.current_step + 1, status.total_steps),
            Style::default()
                .bg(if faulted {
                    DEFAULT_THEME.error
                } else {
                    DEFAULT_THEME.primary
                })
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            " | ",
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(DEFAULT_THEME.comment),
        ),
        Span::styled(
            format!(" {} ", status.message),
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(DEFAULT_THEME.fg),
        ),
        Span::styled(
            format!("({}) ", outcome_text(status.outcome)),
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(if faulted {
                    DEFAULT_THEME.error
                } else {
                    DEFAULT_THEME.comment
                }),
        ),
    ];

    let left_paragraph = Paragraph::new(Line::from(left_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Left);

    frame.render_widget(left_paragraph, layout[0]);

    // Right side: Keybinds with visual grouping
    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.fg);
    let sep_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.comment);
    let badge = |text: &'static str, bg: Color| {
        Span::styled(
            text,
            Style::default()
                .bg(bg)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
    };

    let mut right_spans = Vec::new();
    // The terminal cannot change the pointer shape, so show it here
    if status.cursor == CursorShape::ResizeHorizontal {
        right_spans.push(badge(" ⇔ RESIZE ", DEFAULT_THEME.type_name));
        right_spans.push(Span::styled("│", sep_style));
    }
    right_spans.extend([
        Span::styled(" ←/→ ", key_style),
        Span::styled(" step ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ", desc_style),
        Span::styled(" ⎵ ", key_style),
        Span::styled(" play ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ", desc_style),
        Span::styled(" ⌫ ", key_style),
        Span::styled(" start ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ", desc_style),
        Span::styled("q", key_style),
        Span::styled(" quit ", desc_style),
    ]);

    let is_at_start = status.current_step == 0;
    let is_at_end = status.current_step + 1 >= status.total_steps;
    if status.is_playing {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(badge(" ▶ PLAYING ", DEFAULT_THEME.secondary));
    } else if is_at_end {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(badge(" END ", DEFAULT_THEME.error));
    } else if is_at_start {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(badge(" START ", DEFAULT_THEME.success));
    }

    let right_paragraph = Paragraph::new(Line::from(right_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Right);

    frame.render_widget(right_paragraph, layout[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::IntrospectionError;

    #[test]
    fn test_outcome_text() {
        assert_eq!(outcome_text(None), "no program");
        let shown = RedrawOutcome::Shown {
            frames: 2,
            objects: 1,
            arrows: 3,
        };
        assert_eq!(outcome_text(Some(&shown)), "2 frames, 1 objects, 3 arrows");
        let fault = RedrawOutcome::Faulted(IntrospectionError::TargetGone("Main".into()));
        assert!(outcome_text(Some(&fault)).starts_with("fault: "));
    }
}
