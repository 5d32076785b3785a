//! TUI for circulate
//!
//! Shows the parameters, the output waveform and its spectrum. Key presses
//! become [`ControlMessage`]s for the audio thread.

mod params;
mod spectrum;
pub mod state;
mod status;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::time::Duration;
use tracing::{debug, warn};

use circulate_dsp::ControlMessage;

pub use state::{EffectStatus, Knobs, UiInit};

use params::render_params;
use spectrum::{render_spectrum, SpectrumAnalyzer};
use status::{render_status, AudioStats};
use waveform::render_waveform;

/// Visualisation window; also the FFT size
const VIS_BUFFER_SIZE: usize = 1024;
const FINE_STEP: f32 = 0.01;
const COARSE_STEP: f32 = 0.1;

pub struct UiApp {
    control_tx: Producer<ControlMessage>,
    audio_rx: Consumer<f32>,
    status_rx: Consumer<EffectStatus>,
    init: UiInit,
    knobs: Knobs,
    status: EffectStatus,
    audio_buffer: Vec<f32>,
    analyzer: SpectrumAnalyzer,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        control_tx: Producer<ControlMessage>,
        audio_rx: Consumer<f32>,
        status_rx: Consumer<EffectStatus>,
        init: UiInit,
    ) -> Self {
        Self {
            control_tx,
            audio_rx,
            status_rx,
            knobs: Knobs::from_state(&init.state),
            status: EffectStatus::default(),
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            analyzer: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, init.sample_rate),
            init,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_status();
            self.analyzer.update(&self.audio_buffer);

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Keep the last `VIS_BUFFER_SIZE` output samples.
    fn poll_audio(&mut self) {
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
        }

        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
    }

    fn poll_status(&mut self) {
        while let Ok(status) = self.status_rx.pop() {
            self.status = status;
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::Char('k') => self.knobs.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.knobs.select_next(),
            KeyCode::Left | KeyCode::Char('h') => self.nudge(-FINE_STEP),
            KeyCode::Right | KeyCode::Char('l') => self.nudge(FINE_STEP),
            KeyCode::Char('[') => self.nudge(-COARSE_STEP),
            KeyCode::Char(']') => self.nudge(COARSE_STEP),
            KeyCode::Char('b') | KeyCode::Char('B') => {
                self.knobs.bypassed = !self.knobs.bypassed;
                self.send(ControlMessage::SetBypass(self.knobs.bypassed));
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.send(ControlMessage::Reset),
            _ => {}
        }
    }

    fn nudge(&mut self, delta: f32) {
        let id = self.knobs.selected_id();
        let value = self.knobs.nudge(delta);
        debug!(param = id.name(), value, "parameter changed");
        self.send(ControlMessage::SetParam { id, value });
    }

    fn send(&mut self, message: ControlMessage) {
        if self.control_tx.push(message).is_err() {
            warn!(?message, "control queue full, message dropped");
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Status bar
                Constraint::Length(9),  // Parameters
                Constraint::Min(8),     // Spectrum
                Constraint::Length(8),  // Waveform
                Constraint::Length(1),  // Help bar
            ])
            .split(frame.area());

        let stats = AudioStats::from_buffer(&self.audio_buffer);
        render_status(frame, chunks[0], &self.init, &self.status, &stats);
        render_params(frame, chunks[1], &self.knobs, self.init.sample_rate);
        render_spectrum(frame, chunks[2], &self.analyzer, self.status.center_hz);
        render_waveform(frame, chunks[3], &self.audio_buffer, self.status.bypassed);

        let help = Paragraph::new(
            " [Q] Quit  [↑↓] Select  [←→] Adjust  [ [ ] ] Coarse  [B] Bypass  [R] Reset",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[4]);
    }
}
