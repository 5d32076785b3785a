//! Status bar - source, sample rate, effect state and output level

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{EffectStatus, UiInit};

pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    init: &UiInit,
    status: &EffectStatus,
    stats: &AudioStats,
) {
    let block = Block::default().title(" circulate ").borders(Borders::ALL);

    let (state, colour) = if status.bypassed {
        ("⏸ Bypassed", Color::Yellow)
    } else {
        ("▶ Active", Color::Green)
    };

    let line = Line::from(vec![
        Span::styled(format!(" {}  ", state), Style::default().fg(colour)),
        Span::styled(
            format!("Source: {}  ", init.source.name()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{} stages @ {:.0} Hz  ", status.active_stages, status.center_hz),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("{:.1}kHz  ", init.sample_rate as f32 / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", stats.peak, stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
