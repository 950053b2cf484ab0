#[cfg(test)]
#[path = "pomodoro_test.rs"]
mod tests;

use std::fmt;

pub const TOTAL_CYCLES: u32 = 4;

/// Ticks it takes the progress gauge to go from empty to full. One tick is one
/// second of a work period.
pub const PROGRESS_TICKS: u32 = 1500;
pub const PROGRESS_STEP: f64 = 100.0 / PROGRESS_TICKS as f64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum PomodoroMode {
    Work,
    #[strum(serialize = "Short Break")]
    ShortBreak,
    #[strum(serialize = "Long Break")]
    LongBreak,
    Finished,
}

impl PomodoroMode {
    pub fn duration(&self) -> RemainingTime {
        match self {
            PomodoroMode::Work => return RemainingTime::new(25, 0),
            PomodoroMode::ShortBreak => return RemainingTime::new(5, 0),
            PomodoroMode::LongBreak => return RemainingTime::new(20, 0),
            PomodoroMode::Finished => return RemainingTime::new(0, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemainingTime {
    pub minutes: u32,
    pub seconds: u32,
}

impl RemainingTime {
    pub fn new(minutes: u32, seconds: u32) -> RemainingTime {
        return RemainingTime { minutes, seconds };
    }

    pub fn is_zero(&self) -> bool {
        return self.minutes == 0 && self.seconds == 0;
    }

    fn decrement(&mut self) {
        if self.seconds > 0 {
            self.seconds -= 1;
            return;
        }

        if self.minutes > 0 {
            self.minutes -= 1;
            self.seconds = 59;
        }
    }
}

impl fmt::Display for RemainingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{:02}:{:02}", self.minutes, self.seconds);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PomodoroTick {
    Counting,
    Transitioned(PomodoroMode),
    Finished,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PomodoroState {
    pub cycle: u32,
    pub mode: PomodoroMode,
    pub remaining: RemainingTime,
    elapsed_ticks: u32,
}

impl Default for PomodoroState {
    fn default() -> PomodoroState {
        return PomodoroState {
            cycle: 1,
            mode: PomodoroMode::Work,
            remaining: PomodoroMode::Work.duration(),
            elapsed_ticks: 0,
        };
    }
}

impl PomodoroState {
    /// Advances the countdown by one quantum. Reaching 00:00 switches to the
    /// next mode within the same tick and reloads its duration.
    pub fn tick(&mut self) -> PomodoroTick {
        if self.mode == PomodoroMode::Finished {
            return PomodoroTick::Finished;
        }

        self.remaining.decrement();
        self.elapsed_ticks = self.elapsed_ticks.saturating_add(1);

        if !self.remaining.is_zero() {
            return PomodoroTick::Counting;
        }

        let next = self.next_mode();
        if self.mode == PomodoroMode::ShortBreak && next == PomodoroMode::Work {
            self.cycle += 1;
        }

        self.mode = next;
        self.remaining = next.duration();
        self.elapsed_ticks = 0;

        if next == PomodoroMode::Finished {
            return PomodoroTick::Finished;
        }

        return PomodoroTick::Transitioned(next);
    }

    pub fn reset(&mut self) {
        *self = PomodoroState::default();
    }

    pub fn is_finished(&self) -> bool {
        return self.mode == PomodoroMode::Finished;
    }

    /// Percentage of the gauge to fill, in `[0, 100]`.
    pub fn progress(&self) -> f64 {
        let ticks = self.elapsed_ticks.min(PROGRESS_TICKS);
        return (ticks as f64 * PROGRESS_STEP).min(100.0);
    }

    pub fn cycle_label(&self) -> String {
        match self.mode {
            PomodoroMode::Work | PomodoroMode::ShortBreak => {
                return format!("Cycle {} of {TOTAL_CYCLES}", self.cycle);
            }
            PomodoroMode::LongBreak | PomodoroMode::Finished => {
                return "All cycles are done".to_string();
            }
        }
    }

    fn next_mode(&self) -> PomodoroMode {
        match self.mode {
            PomodoroMode::Work => {
                if self.cycle >= TOTAL_CYCLES {
                    return PomodoroMode::LongBreak;
                }
                return PomodoroMode::ShortBreak;
            }
            PomodoroMode::ShortBreak => return PomodoroMode::Work,
            PomodoroMode::LongBreak => return PomodoroMode::Finished,
            PomodoroMode::Finished => return PomodoroMode::Finished,
        }
    }
}
