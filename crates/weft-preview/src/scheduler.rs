//! Debounce and latest-wins scheduling
//!
//! A pure state machine over caller-supplied instants:
//!
//! ```text
//! Idle --change--> Scheduled --deadline--> InFlight --latest response--> Idle
//!                  ^   |  change restarts       |  change
//!                  +---+                        v
//!                                           Scheduled
//! ```
//!
//! Every issued request gets the next sequence number. A response is
//! applied only if it answers the highest number issued so far; anything
//! older is dropped, whenever it arrives.

use std::time::Duration;
use tokio::time::Instant;

/// Request sequence number; the first issued request is 1
pub type Seq = u64;

/// Where the scheduler is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Latest request answered, nothing pending
    Idle,
    /// A regeneration fires at `deadline` unless another change moves it
    Scheduled { deadline: Instant },
    /// Request `seq` is out and is the one whose answer will be shown
    InFlight { seq: Seq },
}

/// What to do with a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Apply,
    /// Superseded by a later request, or already applied
    Discard,
}

/// Trailing-edge debounce with a monotonic request counter
#[derive(Debug, Clone)]
pub struct PreviewScheduler {
    debounce: Duration,
    deadline: Option<Instant>,
    issued: Seq,
    settled: Seq,
}

impl PreviewScheduler {
    #[must_use]
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            deadline: None,
            issued: 0,
            settled: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        match self.deadline {
            Some(deadline) => Phase::Scheduled { deadline },
            None if self.issued > self.settled => Phase::InFlight { seq: self.issued },
            None => Phase::Idle,
        }
    }

    /// Pending fire time, if any
    #[inline]
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Highest sequence number issued so far
    #[inline]
    #[must_use]
    pub fn issued(&self) -> Seq {
        self.issued
    }

    /// Highest sequence number whose response was applied
    #[inline]
    #[must_use]
    pub fn settled(&self) -> Seq {
        self.settled
    }

    /// Whether the latest issued request is still unanswered
    #[must_use]
    pub fn awaiting_response(&self) -> bool {
        self.issued > self.settled
    }

    /// Record a change at `now`; (re)starts the quiet period
    pub fn on_change(&mut self, now: Instant) -> Instant {
        let deadline = now + self.debounce;
        if self.deadline.is_some() {
            tracing::trace!("debounce restarted");
        }
        self.deadline = Some(deadline);
        deadline
    }

    /// Issue a request if the quiet period has elapsed by `now`
    pub fn poll(&mut self, now: Instant) -> Option<Seq> {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                self.issued += 1;
                Some(self.issued)
            }
            _ => None,
        }
    }

    /// Decide the fate of the response to request `seq`
    pub fn on_response(&mut self, seq: Seq) -> Verdict {
        if seq == self.issued && seq > self.settled {
            self.settled = seq;
            Verdict::Apply
        } else {
            tracing::debug!(seq, latest = self.issued, "discarding stale preview response");
            Verdict::Discard
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(300);

    #[test]
    fn starts_idle() {
        let scheduler = PreviewScheduler::new(WINDOW);
        assert_eq!(scheduler.phase(), Phase::Idle);
        assert_eq!(scheduler.issued(), 0);
    }

    #[test]
    fn poll_waits_for_quiet_period() {
        let t0 = Instant::now();
        let mut scheduler = PreviewScheduler::new(WINDOW);
        scheduler.on_change(t0);

        assert_eq!(scheduler.poll(t0 + Duration::from_millis(299)), None);
        assert_eq!(scheduler.poll(t0 + WINDOW), Some(1));
        assert_eq!(scheduler.phase(), Phase::InFlight { seq: 1 });
        assert_eq!(scheduler.poll(t0 + WINDOW * 2), None);
    }

    #[test]
    fn burst_restarts_the_window() {
        let t0 = Instant::now();
        let mut scheduler = PreviewScheduler::new(WINDOW);
        for step in 0..5u32 {
            scheduler.on_change(t0 + Duration::from_millis(100) * step);
        }
        let last = t0 + Duration::from_millis(400);
        assert_eq!(scheduler.deadline(), Some(last + WINDOW));
        assert_eq!(scheduler.poll(t0 + WINDOW), None);
        assert_eq!(scheduler.poll(last + WINDOW), Some(1));
    }

    #[test]
    fn only_latest_response_applies() {
        let t0 = Instant::now();
        let mut scheduler = PreviewScheduler::new(WINDOW);
        scheduler.on_change(t0);
        let first = scheduler.poll(t0 + WINDOW).unwrap();
        scheduler.on_change(t0 + WINDOW);
        let second = scheduler.poll(t0 + WINDOW * 2).unwrap();

        assert_eq!(scheduler.on_response(second), Verdict::Apply);
        assert_eq!(scheduler.on_response(first), Verdict::Discard);
        assert_eq!(scheduler.settled(), second);
        assert_eq!(scheduler.phase(), Phase::Idle);
    }

    #[test]
    fn superseded_response_is_dropped_even_if_it_lands_first() {
        let t0 = Instant::now();
        let mut scheduler = PreviewScheduler::new(WINDOW);
        scheduler.on_change(t0);
        let first = scheduler.poll(t0 + WINDOW).unwrap();
        scheduler.on_change(t0 + WINDOW);
        let second = scheduler.poll(t0 + WINDOW * 2).unwrap();

        assert_eq!(scheduler.on_response(first), Verdict::Discard);
        assert!(scheduler.awaiting_response());
        assert_eq!(scheduler.on_response(second), Verdict::Apply);
        assert_eq!(scheduler.on_response(second), Verdict::Discard);
    }

    #[test]
    fn change_while_in_flight_reschedules() {
        let t0 = Instant::now();
        let mut scheduler = PreviewScheduler::new(WINDOW);
        scheduler.on_change(t0);
        scheduler.poll(t0 + WINDOW);
        scheduler.on_change(t0 + WINDOW);
        assert!(matches!(scheduler.phase(), Phase::Scheduled { .. }));
        assert!(scheduler.awaiting_response());
    }
}
