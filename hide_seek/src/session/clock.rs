//! Single-shot, cancellable match timer.
//!
//! Expiry does not call back into the match directly. The sleeping task
//! pushes a [`ClockTicket`] onto a channel that the match actor drains in
//! the same loop as its commands, and the actor asks [`MatchClock::accept`]
//! whether the ticket is still the armed one. A ticket from a cancelled or
//! replaced timer is refused there, even if its task already woke up.

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Duration, Instant, sleep_until},
};

/// Identity of one scheduled expiry
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ClockTicket(u64);

impl ClockTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

struct ArmedTimer {
    ticket: ClockTicket,
    started_at: Instant,
    duration: Duration,
    task: JoinHandle<()>,
}

/// Match clock holding at most one pending timer
pub struct MatchClock {
    fired: mpsc::UnboundedSender<ClockTicket>,
    armed: Option<ArmedTimer>,
    next_ticket: u64,
}

impl MatchClock {
    /// Create a clock that reports expiries on `fired`
    pub fn new(fired: mpsc::UnboundedSender<ClockTicket>) -> Self {
        Self {
            fired,
            armed: None,
            next_ticket: 1,
        }
    }

    /// Arm a new timer, replacing any pending one
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics on a zero `duration`. Durations come from validated
    /// configuration, so a zero here is a bug in the caller.
    pub fn schedule(&mut self, duration: Duration) -> ClockTicket {
        assert!(
            !duration.is_zero(),
            "match clock scheduled with a zero duration"
        );
        self.cancel();

        let ticket = ClockTicket(self.next_ticket);
        self.next_ticket += 1;

        // Deadline is fixed now, not when the task is first polled.
        let started_at = Instant::now();
        let deadline = started_at + duration;
        let fired = self.fired.clone();
        let task = tokio::spawn(async move {
            sleep_until(deadline).await;
            // Receiver gone means the match shut down; nothing to advance.
            let _ = fired.send(ticket);
        });

        self.armed = Some(ArmedTimer {
            ticket,
            started_at,
            duration,
            task,
        });

        ticket
    }

    /// Drop the pending timer, if any. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.armed.take() {
            timer.task.abort();
            log::trace!("Clock ticket {} cancelled", timer.ticket.id());
        }
    }

    /// Claim an expiry. Returns `true` only for the currently armed ticket,
    /// which is disarmed by the call.
    pub fn accept(&mut self, ticket: ClockTicket) -> bool {
        let current = self
            .armed
            .as_ref()
            .is_some_and(|timer| timer.ticket == ticket);
        if current {
            self.armed = None;
        }
        current
    }

    /// Time left on the pending timer, zero when idle
    pub fn remaining(&self) -> Duration {
        self.armed
            .as_ref()
            .map(|timer| timer.duration.saturating_sub(timer.started_at.elapsed()))
            .unwrap_or(Duration::ZERO)
    }

    /// Length of the pending timer, zero when idle
    pub fn scheduled_duration(&self) -> Duration {
        self.armed
            .as_ref()
            .map(|timer| timer.duration)
            .unwrap_or(Duration::ZERO)
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }
}

impl Drop for MatchClock {
    fn drop(&mut self) {
        self.cancel();
    }
}
