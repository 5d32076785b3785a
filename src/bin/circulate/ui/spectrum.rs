//! Spectrum analyzer widget
//!
//! FFT of the output on a log frequency axis, with the effect's current
//! centre frequency marked. The notches a phaser carves show up as dips
//! that move with the centre.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use circulate_dsp::dsp::frequency::{LogRange, MIN_FREQ_HZ};

/// Number of frequency bins to display
const SPECTRUM_BINS: usize = 96;
const FLOOR_DB: f64 = -100.0;

pub struct SpectrumAnalyzer {
    /// Hann window
    window: Vec<f32>,
    /// Maps display position (0..1) to Hz
    axis: LogRange,
    /// FFT bin for each display bin
    bin_indices: Vec<usize>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (log position 0..1, magnitude dB)
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    /// `buffer_len` is the FFT size and must match the buffers passed to
    /// [`update`](Self::update).
    pub fn new(buffer_len: usize, sample_rate: u32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(buffer_len);

        let window: Vec<f32> = (0..buffer_len)
            .map(|i| {
                if buffer_len > 1 {
                    let denom = (buffer_len - 1) as f32;
                    0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / denom).cos())
                } else {
                    1.0
                }
            })
            .collect();

        let nyquist = (sample_rate as f64 / 2.0).min(20_000.0).max(MIN_FREQ_HZ * 2.0);
        let axis = LogRange::new(MIN_FREQ_HZ, nyquist);
        let half = (buffer_len / 2).max(1);

        let bin_indices = (0..SPECTRUM_BINS)
            .map(|i| {
                let position = i as f64 / (SPECTRUM_BINS - 1) as f64;
                let freq = axis.to_plain(position);
                let index = (freq * buffer_len as f64 / sample_rate as f64).round() as usize;
                index.min(half - 1)
            })
            .collect();

        let spectrum = (0..SPECTRUM_BINS)
            .map(|i| (i as f64 / (SPECTRUM_BINS - 1) as f64, FLOOR_DB))
            .collect();

        Self {
            window,
            axis,
            bin_indices,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); buffer_len],
            spectrum,
        }
    }

    /// Recompute from the latest output samples. Ignored when the length
    /// doesn't match the FFT size.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((bin, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *bin = Complex::new(sample * w, 0.0);
        }

        self.fft.process(&mut self.scratch);

        for ((_, magnitude_db), &index) in self.spectrum.iter_mut().zip(&self.bin_indices) {
            let bin = self.scratch[index];
            let power = (bin.re * bin.re + bin.im * bin.im).max(1e-12);
            *magnitude_db = (10.0 * (power as f64).log10()).max(FLOOR_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }

    /// Position of `hz` on the display axis.
    pub fn position(&self, hz: f64) -> f64 {
        self.axis.to_normalized(hz).clamp(0.0, 1.0)
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, analyzer: &SpectrumAnalyzer, center_hz: f64) {
    let block = Block::default()
        .title(format!(" Spectrum (centre {:.0} Hz) ", center_hz))
        .borders(Borders::ALL);

    let spectrum = analyzer.data();
    let max_db = spectrum.iter().map(|(_, db)| *db).fold(FLOOR_DB, f64::max);
    let top = max_db.max(0.0) + 10.0;

    let x = analyzer.position(center_hz);
    let marker = [(x, FLOOR_DB), (x, top)];

    let datasets = vec![
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(spectrum),
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Yellow))
            .data(&marker),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .labels(vec!["20", "1k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, top])
                .labels(vec!["-100", "-60", "-20", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
