#[cfg(test)]
#[path = "pomodoro_timer_test.rs"]
mod tests;

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;
use tokio::time::MissedTickBehavior;

use crate::domain::models::Event;

/// Repeating tick source for the Pomodoro countdown. It only emits
/// `Event::PomodoroTick`; the countdown state lives with the UI.
pub struct PomodoroTimer {
    quantum: Duration,
    run: u64,
    tx: mpsc::UnboundedSender<Event>,
    worker: Option<JoinHandle<()>>,
}

impl PomodoroTimer {
    pub fn new(quantum: Duration, tx: mpsc::UnboundedSender<Event>) -> PomodoroTimer {
        return PomodoroTimer {
            quantum,
            run: 0,
            tx,
            worker: None,
        };
    }

    pub fn is_running(&self) -> bool {
        if let Some(worker) = &self.worker {
            return !worker.is_finished();
        }

        return false;
    }

    /// Starts ticking for the given run. Every tick carries the run number so
    /// ticks queued by an earlier, stopped run can be told apart.
    pub fn start(&mut self, run: u64) {
        if self.is_running() {
            if self.run == run {
                return;
            }
            self.stop();
        }

        self.run = run;
        let quantum = self.quantum;
        let tx = self.tx.clone();
        self.worker = Some(tokio::spawn(async move {
            let mut interval = time::interval(quantum);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;
                if tx.send(Event::PomodoroTick(run)).is_err() {
                    return;
                }
            }
        }));

        tracing::debug!(quantum_ms = quantum.as_millis() as u64, run, "Pomodoro timer started");
    }

    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
            tracing::debug!("Pomodoro timer stopped");
        }
    }
}

impl Drop for PomodoroTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
