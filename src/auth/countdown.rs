use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

/// Seconds before a one-time code may be re-sent
pub const RESEND_COOLDOWN_SECS: u32 = 60;

/// Once-per-second countdown running as a background task.
///
/// The task is aborted on [`Countdown::cancel`], on restart and on drop.
pub struct Countdown {
    remaining: watch::Receiver<u32>,
    task: Option<JoinHandle<()>>,
}

impl Countdown {
    pub fn new() -> Self {
        let (_tx, rx) = watch::channel(0);
        Self {
            remaining: rx,
            task: None,
        }
    }

    /// (Re)start from `secs`. Must be called inside a tokio runtime.
    pub fn start(&mut self, secs: u32) {
        self.cancel();

        let (tx, rx) = watch::channel(secs);
        self.remaining = rx;
        self.task = Some(tokio::spawn(async move {
            let tick = Duration::from_secs(1);
            let mut interval = interval_at(Instant::now() + tick, tick);
            let mut left = secs;
            while left > 0 {
                interval.tick().await;
                left -= 1;
                if tx.send(left).is_err() {
                    break;
                }
            }
        }));
    }

    /// Stop ticking and drop back to zero
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        let (_tx, rx) = watch::channel(0);
        self.remaining = rx;
    }

    pub fn remaining(&self) -> u32 {
        *self.remaining.borrow()
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_counts_down_once_per_second() {
        let mut countdown = Countdown::new();
        assert_eq!(countdown.remaining(), 0);

        countdown.start(RESEND_COOLDOWN_SECS);
        assert_eq!(countdown.remaining(), 60);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(countdown.remaining(), 59);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(countdown.remaining(), 49);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaches_zero_and_stops() {
        let mut countdown = Countdown::new();
        countdown.start(3);

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(countdown.remaining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_resets_to_zero() {
        let mut countdown = Countdown::new();
        countdown.start(60);
        tokio::time::sleep(Duration::from_millis(2500)).await;

        countdown.cancel();
        assert_eq!(countdown.remaining(), 0);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(countdown.remaining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_begins_at_full_value() {
        let mut countdown = Countdown::new();
        countdown.start(60);
        tokio::time::sleep(Duration::from_millis(5500)).await;
        assert_eq!(countdown.remaining(), 55);

        countdown.start(60);
        assert_eq!(countdown.remaining(), 60);
    }
}
