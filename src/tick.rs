use std::time::Duration;

use tokio::{
    sync::mpsc::UnboundedSender,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

/// Periodic task feeding `(generation)` messages into the event loop.
///
/// The task is aborted when the `Ticker` is dropped. Messages it already
/// queued carry its generation so the receiver can discard them.
pub struct Ticker {
    generation: u64,
    handle: JoinHandle<()>,
}

impl Ticker {
    pub fn spawn<E, F>(generation: u64, period: Duration, tx: UnboundedSender<E>, make: F) -> Self
    where
        E: Send + 'static,
        F: Fn(u64) -> E + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(make(generation)).is_err() {
                    break;
                }
            }
        });
        debug!(generation, "ticker started");

        Self { generation, handle }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
        debug!(generation = self.generation, "ticker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn delivers_generation_tagged_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ticker = Ticker::spawn(7, Duration::from_millis(10), tx, |g| g);

        assert_eq!(rx.recv().await, Some(7));
        assert_eq!(rx.recv().await, Some(7));
        assert_eq!(ticker.generation(), 7);
    }

    #[tokio::test]
    async fn stops_after_drop() {
        let (tx, mut rx) = mpsc::unbounded_channel::<u64>();
        let ticker = Ticker::spawn(1, Duration::from_millis(5), tx, |g| g);
        assert_eq!(rx.recv().await, Some(1));

        drop(ticker);
        tokio::time::sleep(Duration::from_millis(20)).await;
        while rx.try_recv().is_ok() {}

        // the aborted task dropped its sender, so the channel closes
        assert_eq!(rx.recv().await, None);
    }
}
