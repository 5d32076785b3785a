//! Parameter list widget

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use circulate_dsp::{
    dsp::frequency::{max_allowed_hz, normalized_to_note, LogRange, MIN_FREQ_HZ},
    effect::{effective_feedback, stage_count},
    ParamId,
};

use super::Knobs;

/// Bar width for the value gauge
const GAUGE_WIDTH: usize = 20;

/// Human-readable value for a control, in the units the effect uses.
pub fn describe(id: ParamId, value: f32, sample_rate: u32) -> String {
    match id {
        ParamId::Depth => format!("{} stages", stage_count(value)),
        ParamId::Center => {
            let range = LogRange::new(MIN_FREQ_HZ, max_allowed_hz(sample_rate));
            format!("{:.0} Hz", range.to_plain(value as f64))
        }
        ParamId::Note => format!("note {}", normalized_to_note(value)),
        ParamId::Focus => format!("{:.2}", value),
        ParamId::CenterType => {
            if value >= 0.5 {
                "note".to_string()
            } else {
                "Hz".to_string()
            }
        }
        ParamId::NoteOffset => format!("{:+.2} oct", 2.0 * value - 1.0),
        ParamId::Feedback => format!("{:+.2}", effective_feedback(value, 1)),
        ParamId::Bypass => String::new(),
    }
}

pub fn render_params(frame: &mut Frame, area: Rect, knobs: &Knobs, sample_rate: u32) {
    let block = Block::default().title(" Parameters ").borders(Borders::ALL);

    let lines: Vec<Line> = knobs
        .ids
        .iter()
        .zip(&knobs.values)
        .enumerate()
        .map(|(index, (&id, &value))| {
            let selected = index == knobs.selected;
            let filled = (value * GAUGE_WIDTH as f32).round() as usize;
            let gauge = format!(
                "{}{}",
                "█".repeat(filled.min(GAUGE_WIDTH)),
                "░".repeat(GAUGE_WIDTH - filled.min(GAUGE_WIDTH))
            );

            let name_style = if selected {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            Line::from(vec![
                Span::styled(if selected { " ▸ " } else { "   " }, name_style),
                Span::styled(format!("{:<12}", id.name()), name_style),
                Span::styled(gauge, Style::default().fg(Color::Cyan)),
                Span::styled(
                    format!("  {}", describe(id, value, sample_rate)),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
