//! Wave progression source driven by simulated time.

use std::time::Duration;

use horde_core::{Event, WaveNumber};

/// Emits `WaveStarted` every `interval` of simulated time, the first wave on the first tick.
///
/// A zero interval starts every remaining wave on the first tick.
#[derive(Debug)]
pub(crate) struct WaveClock {
    interval: Duration,
    accumulator: Duration,
    last_wave: WaveNumber,
    final_wave: WaveNumber,
}

impl WaveClock {
    pub(crate) fn new(interval: Duration, waves: u32) -> Self {
        Self {
            interval,
            accumulator: Duration::ZERO,
            last_wave: WaveNumber::default(),
            final_wave: WaveNumber::new(waves),
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.last_wave >= self.final_wave
    }

    pub(crate) fn last_wave(&self) -> WaveNumber {
        self.last_wave
    }

    pub(crate) fn handle(&mut self, events: &[Event], out: &mut Vec<Event>) {
        let mut accumulated = Duration::ZERO;
        let mut ticked = false;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
                ticked = true;
            }
        }

        if !ticked || self.is_finished() {
            return;
        }

        if self.interval.is_zero() {
            while !self.is_finished() {
                self.start_next(out);
            }
            return;
        }

        if !self.last_wave.is_positive() {
            self.start_next(out);
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        while self.accumulator >= self.interval && !self.is_finished() {
            self.accumulator -= self.interval;
            self.start_next(out);
        }
    }

    fn start_next(&mut self, out: &mut Vec<Event>) {
        self.last_wave = self.last_wave.next();
        tracing::info!(wave = self.last_wave.get(), "wave started");
        out.push(Event::WaveStarted {
            wave: self.last_wave,
        });
    }
}
