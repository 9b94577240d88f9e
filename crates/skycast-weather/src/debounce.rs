//! Trailing-edge debouncer for search input.
//!
//! One worker task per debouncer. Each `trigger` replaces the pending value and
//! restarts the quiet period; when the period elapses the latest value is
//! emitted on the output channel.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
    cancel: CancellationToken,
    worker: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the worker on `runtime`. Coalesced values arrive on the returned receiver.
    pub fn spawn(window: Duration, runtime: &Handle) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (output_tx, output_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let worker = runtime.spawn(run(window, input_rx, output_tx, cancel.clone()));

        (
            Self {
                input: input_tx,
                cancel,
                worker: Some(worker),
            },
            output_rx,
        )
    }

    /// Record `value` as the latest input and restart the quiet period.
    pub fn trigger(&self, value: T) {
        if self.input.send(value).is_err() {
            tracing::debug!("Debouncer already shut down, dropping input");
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop the worker. Pending input is discarded.
    pub fn shutdown(&mut self) {
        self.cancel.cancel();
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run<T>(
    window: Duration,
    mut input: mpsc::UnboundedReceiver<T>,
    output: mpsc::UnboundedSender<T>,
    cancel: CancellationToken,
) {
    loop {
        let mut latest = tokio::select! {
            _ = cancel.cancelled() => return,
            next = input.recv() => match next {
                Some(value) => value,
                None => return,
            },
        };

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                next = input.recv() => match next {
                    Some(value) => latest = value,
                    None => {
                        // Owner went away mid-window; flush what we have.
                        let _ = output.send(latest);
                        return;
                    }
                },
                _ = tokio::time::sleep(window) => {
                    if output.send(latest).is_err() {
                        return;
                    }
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(500);

    #[tokio::test(start_paused = true)]
    async fn test_burst_emits_only_latest() {
        let (debouncer, mut out) = Debouncer::spawn(WINDOW, &Handle::current());

        debouncer.trigger("A");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.trigger("B");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.trigger("C");

        assert_eq!(out.recv().await, Some("C"));

        tokio::time::sleep(WINDOW * 4).await;
        assert!(out.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_emit_separately() {
        let (debouncer, mut out) = Debouncer::spawn(WINDOW, &Handle::current());

        debouncer.trigger("Paris");
        assert_eq!(out.recv().await, Some("Paris"));

        tokio::time::sleep(WINDOW * 2).await;
        debouncer.trigger("Tokyo");
        assert_eq!(out.recv().await, Some("Tokyo"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_period_restarts_on_each_trigger() {
        let (debouncer, mut out) = Debouncer::spawn(WINDOW, &Handle::current());
        let started = tokio::time::Instant::now();

        for city in ["L", "Li", "Lim", "Lima"] {
            debouncer.trigger(city);
            tokio::time::sleep(Duration::from_millis(400)).await;
        }

        assert_eq!(out.recv().await, Some("Lima"));
        // Last trigger at 1200ms, so nothing could fire before 1700ms
        assert!(started.elapsed() >= Duration::from_millis(1700));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_discards_pending_input() {
        let (mut debouncer, mut out) = Debouncer::spawn(WINDOW, &Handle::current());

        debouncer.trigger("Oslo");
        debouncer.shutdown();
        assert!(debouncer.is_shut_down());

        tokio::time::sleep(WINDOW * 2).await;
        assert_eq!(out.recv().await, None);

        // Triggers after shutdown are ignored
        debouncer.trigger("Rome");
    }
}
