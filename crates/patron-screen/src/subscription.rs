#![forbid(unsafe_code)]

//! Subscription lifecycle primitives.
//!
//! A subscription forwards emissions from one external source into the
//! controller's message channel as tagged messages, on a background thread,
//! until it is released or the source disconnects. All handles for one
//! screen activation live in a [`SubscriptionSet`]; releasing the set is
//! the sole cancellation primitive and is idempotent.
//!
//! # Lifecycle
//!
//! 1. Activation spawns each subscription into the set
//! 2. Run loops forward tagged messages until stopped or disconnected
//! 3. Deactivation releases every member exactly once
//! 4. A release after partial activation stops whatever members exist

use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

/// Cooperative cancellation signal checked by subscription run loops.
///
/// Safe to fire while an emission is mid-flight: the loop observes the
/// signal before forwarding its next message.
#[derive(Clone)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    pub(crate) fn new() -> (Self, StopTrigger) {
        let inner = Arc::new((Mutex::new(false), Condvar::new()));
        let signal = Self {
            inner: Arc::clone(&inner),
        };
        (signal, StopTrigger { inner })
    }

    /// Whether release has been requested.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        let (flag, _) = &*self.inner;
        *flag.lock().expect("stop signal lock poisoned")
    }

    /// Block until released or the timeout elapses; `true` means released.
    #[must_use]
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let (flag, condvar) = &*self.inner;
        let mut stopped = flag.lock().expect("stop signal lock poisoned");
        let deadline = std::time::Instant::now() + duration;
        while !*stopped {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            if remaining.is_zero() {
                return false;
            }
            let (guard, _timeout) = condvar
                .wait_timeout(stopped, remaining)
                .expect("stop signal lock poisoned");
            stopped = guard;
        }
        true
    }
}

/// Release side of a [`StopSignal`].
pub(crate) struct StopTrigger {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopTrigger {
    pub(crate) fn stop(&self) {
        let (flag, condvar) = &*self.inner;
        *flag.lock().expect("stop signal lock poisoned") = true;
        condvar.notify_all();
    }
}

/// A source that feeds tagged messages into the controller channel.
pub trait ScreenSubscription<M: Send + 'static>: Send {
    /// Stable name for lifecycle tracing.
    fn name(&self) -> &'static str;

    /// Forward messages until stopped or the source ends.
    ///
    /// Runs on a background thread. The subscription owns itself for the
    /// duration of the run, so adapters can hold non-`Sync` receivers.
    fn run(self: Box<Self>, sender: mpsc::Sender<M>, stop: StopSignal);
}

/// Adapts an `mpsc::Receiver` source into a subscription.
///
/// Each value received from the source is mapped through the tag function
/// and forwarded. The loop wakes at the poll interval to observe the stop
/// signal even when the source is quiet.
pub struct ChannelSubscription<T, M> {
    name: &'static str,
    source: mpsc::Receiver<T>,
    poll: Duration,
    tag: Box<dyn Fn(T) -> M + Send>,
}

impl<T: Send + 'static, M: Send + 'static> ChannelSubscription<T, M> {
    pub fn new(
        name: &'static str,
        source: mpsc::Receiver<T>,
        poll: Duration,
        tag: impl Fn(T) -> M + Send + 'static,
    ) -> Self {
        Self {
            name,
            source,
            poll,
            tag: Box::new(tag),
        }
    }
}

impl<T: Send + 'static, M: Send + 'static> ScreenSubscription<M> for ChannelSubscription<T, M> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn run(self: Box<Self>, sender: mpsc::Sender<M>, stop: StopSignal) {
        loop {
            match self.source.recv_timeout(self.poll) {
                Ok(value) => {
                    if stop.is_stopped() {
                        break;
                    }
                    if sender.send((self.tag)(value)).is_err() {
                        break;
                    }
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if stop.is_stopped() {
                        break;
                    }
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    tracing::debug!(subscription = self.name, "source disconnected");
                    break;
                }
            }
        }
    }
}

/// A single-shot subscription: emits one message, then ends.
pub struct OnceSubscription<M> {
    name: &'static str,
    message: M,
}

impl<M: Send + 'static> OnceSubscription<M> {
    pub fn new(name: &'static str, message: M) -> Self {
        Self { name, message }
    }
}

impl<M: Send + 'static> ScreenSubscription<M> for OnceSubscription<M> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn run(self: Box<Self>, sender: mpsc::Sender<M>, stop: StopSignal) {
        if !stop.is_stopped() {
            let _ = sender.send(self.message);
        }
    }
}

struct RunningSubscription {
    name: &'static str,
    trigger: StopTrigger,
    thread: Option<thread::JoinHandle<()>>,
}

impl RunningSubscription {
    fn release(mut self) {
        self.trigger.stop();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RunningSubscription {
    fn drop(&mut self) {
        // Trigger without joining; joining in drop could block teardown.
        self.trigger.stop();
    }
}

/// Exclusive owner of the running subscriptions for one activation.
///
/// Non-empty while the screen is visible, empty immediately after
/// [`release_all`](SubscriptionSet::release_all). Releasing is idempotent
/// and safe after a partial activation: every member present is released,
/// absent members are simply skipped.
#[derive(Default)]
pub struct SubscriptionSet {
    running: Vec<RunningSubscription>,
}

impl SubscriptionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a subscription on a background thread and take ownership of it.
    pub fn spawn<M: Send + 'static>(
        &mut self,
        subscription: Box<dyn ScreenSubscription<M>>,
        sender: mpsc::Sender<M>,
    ) {
        let name = subscription.name();
        let (signal, trigger) = StopSignal::new();
        tracing::debug!(subscription = name, "starting subscription");
        let thread = thread::spawn(move || subscription.run(sender, signal));
        self.running.push(RunningSubscription {
            name,
            trigger,
            thread: Some(thread),
        });
    }

    /// Release every member exactly once. Idempotent.
    pub fn release_all(&mut self) {
        for running in self.running.drain(..) {
            tracing::debug!(subscription = running.name, "releasing subscription");
            running.release();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.running.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }
}

impl Drop for SubscriptionSet {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLL: Duration = Duration::from_millis(5);

    #[test]
    fn stop_signal_starts_unset() {
        let (signal, _trigger) = StopSignal::new();
        assert!(!signal.is_stopped());
    }

    #[test]
    fn stop_signal_reports_release() {
        let (signal, trigger) = StopSignal::new();
        trigger.stop();
        assert!(signal.is_stopped());
        assert!(signal.wait_timeout(Duration::from_millis(50)));
    }

    #[test]
    fn wait_timeout_expires_when_not_released() {
        let (signal, _trigger) = StopSignal::new();
        assert!(!signal.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn wait_timeout_wakes_on_release_from_another_thread() {
        let (signal, trigger) = StopSignal::new();
        let waiter = signal.clone();
        let handle = thread::spawn(move || waiter.wait_timeout(Duration::from_secs(5)));

        thread::sleep(Duration::from_millis(20));
        trigger.stop();
        assert!(handle.join().unwrap());
    }

    #[test]
    fn channel_subscription_forwards_tagged_values() {
        let (source_tx, source_rx) = mpsc::channel();
        let (out_tx, out_rx) = mpsc::channel();
        let mut set = SubscriptionSet::new();
        set.spawn(
            Box::new(ChannelSubscription::new("numbers", source_rx, POLL, |n: i32| n * 2)),
            out_tx,
        );

        source_tx.send(21).unwrap();
        assert_eq!(out_rx.recv_timeout(Duration::from_secs(1)).unwrap(), 42);
        set.release_all();
    }

    #[test]
    fn channel_subscription_ends_on_source_disconnect() {
        let (source_tx, source_rx) = mpsc::channel::<i32>();
        let (out_tx, out_rx) = mpsc::channel();

        let sub = Box::new(ChannelSubscription::new("numbers", source_rx, POLL, |n| n));
        let (signal, _trigger) = StopSignal::new();
        drop(source_tx);
        // Runs to completion on the caller thread once the source is gone.
        sub.run(out_tx, signal);
        assert!(out_rx.try_recv().is_err());
    }

    #[test]
    fn once_subscription_emits_exactly_one_message() {
        let (out_tx, out_rx) = mpsc::channel();
        let (signal, _trigger) = StopSignal::new();

        Box::new(OnceSubscription::new("route", 7)).run(out_tx, signal);

        assert_eq!(out_rx.try_recv().unwrap(), 7);
        assert!(out_rx.try_recv().is_err());
    }

    #[test]
    fn once_subscription_respects_a_prior_release() {
        let (out_tx, out_rx) = mpsc::channel();
        let (signal, trigger) = StopSignal::new();
        trigger.stop();

        Box::new(OnceSubscription::new("route", 7)).run(out_tx, signal);
        assert!(out_rx.try_recv().is_err());
    }

    #[test]
    fn released_subscription_stops_forwarding() {
        let (source_tx, source_rx) = mpsc::channel();
        let (out_tx, out_rx) = mpsc::channel();
        let mut set = SubscriptionSet::new();
        set.spawn(
            Box::new(ChannelSubscription::new("numbers", source_rx, POLL, |n: i32| n)),
            out_tx,
        );

        source_tx.send(1).unwrap();
        assert_eq!(out_rx.recv_timeout(Duration::from_secs(1)).unwrap(), 1);

        set.release_all();
        assert!(set.is_empty());

        // Emissions after release never reach the output channel; the send
        // may itself fail once the forwarding thread has dropped its receiver.
        let _ = source_tx.send(2);
        thread::sleep(Duration::from_millis(30));
        assert!(out_rx.try_recv().is_err());
    }

    #[test]
    fn release_all_is_idempotent() {
        let (_source_tx, source_rx) = mpsc::channel::<i32>();
        let (out_tx, _out_rx) = mpsc::channel();
        let mut set = SubscriptionSet::new();
        set.spawn(
            Box::new(ChannelSubscription::new("numbers", source_rx, POLL, |n| n)),
            out_tx,
        );
        assert_eq!(set.len(), 1);

        set.release_all();
        set.release_all();
        assert!(set.is_empty());
    }

    #[test]
    fn releasing_an_empty_set_is_safe() {
        let mut set = SubscriptionSet::new();
        set.release_all();
        assert!(set.is_empty());
    }

    #[test]
    fn drop_releases_members() {
        let (source_tx, source_rx) = mpsc::channel();
        let (out_tx, out_rx) = mpsc::channel();
        {
            let mut set = SubscriptionSet::new();
            set.spawn(
                Box::new(ChannelSubscription::new("numbers", source_rx, POLL, |n: i32| n)),
                out_tx,
            );
        }

        let _ = source_tx.send(9);
        thread::sleep(Duration::from_millis(30));
        assert!(out_rx.try_recv().is_err());
    }
}
