//! Per-host rolling statistics and their update rules.

use super::ring::Ring;

/// Weight kept from the previous jitter value on each update.
const JITTER_DECAY: f64 = 0.7;
/// Weight given to the newest RTT delta.
const JITTER_GAIN: f64 = 0.3;

/// Result of one probe, as fed into [`HostRecord::apply_result`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Round-trip time in milliseconds.
    Reply(f64),
    /// No reply within the timeout, or any probe failure.
    Timeout,
}

impl Outcome {
    /// Build an outcome from an optional RTT.
    pub fn from_rtt(rtt: Option<f64>) -> Self {
        rtt.map_or(Outcome::Timeout, Outcome::Reply)
    }

    /// The RTT if this outcome is a reply.
    pub fn rtt(self) -> Option<f64> {
        match self {
            Outcome::Reply(ms) => Some(ms),
            Outcome::Timeout => None,
        }
    }

    pub fn is_reply(self) -> bool {
        matches!(self, Outcome::Reply(_))
    }
}

/// Capacities of a host's rolling buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacities {
    /// Number of recent outcomes used for the loss percentage.
    pub loss_window: usize,
    /// Number of recent samples retained as history.
    pub history: usize,
}

impl Default for Capacities {
    fn default() -> Self {
        Self {
            loss_window: 30,
            history: 40,
        }
    }
}

/// Rolling statistics for one monitored host.
///
/// Mutated only through [`apply_result`](Self::apply_result), once per
/// completed cycle.
#[derive(Debug, Clone)]
pub struct HostRecord {
    name: String,
    last_rtt: Option<f64>,
    jitter: f64,
    /// `true` entries are losses.
    loss_window: Ring<bool>,
    losses: usize,
    loss_pct: f64,
    history: Ring<Option<f64>>,
    cycles: u64,
}

impl HostRecord {
    pub fn new(name: impl Into<String>, capacities: Capacities) -> Self {
        Self {
            name: name.into(),
            last_rtt: None,
            jitter: 0.0,
            loss_window: Ring::with_capacity(capacities.loss_window),
            losses: 0,
            loss_pct: 0.0,
            history: Ring::with_capacity(capacities.history),
            cycles: 0,
        }
    }

    /// Fold one cycle's probe outcome into the statistics.
    ///
    /// Order: loss window, jitter, last RTT, history. Never fails; the RTT
    /// is taken as given.
    pub fn apply_result(&mut self, outcome: Outcome) {
        let lost = !outcome.is_reply();
        if lost {
            self.losses += 1;
        }
        if self.loss_window.push(lost) == Some(true) {
            self.losses -= 1;
        }
        self.loss_pct = loss_percentage(self.losses, self.loss_window.len());

        if let Outcome::Reply(rtt) = outcome {
            // Only the very first reply finds `last_rtt` unset; it is never
            // cleared afterwards, so the reset to zero happens once per host.
            self.jitter = match self.last_rtt {
                Some(prev) => JITTER_DECAY * self.jitter + JITTER_GAIN * (rtt - prev).abs(),
                None => 0.0,
            };
            self.last_rtt = Some(rtt);
        }

        self.history.push(outcome.rtt());
        self.cycles += 1;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Latest successful RTT; timeouts leave it untouched.
    pub fn last_rtt(&self) -> Option<f64> {
        self.last_rtt
    }

    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    pub fn loss_pct(&self) -> f64 {
        self.loss_pct
    }

    pub fn loss_window(&self) -> &Ring<bool> {
        &self.loss_window
    }

    pub fn history(&self) -> &Ring<Option<f64>> {
        &self.history
    }

    /// Number of cycles applied since the record was created.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Rolling average over the replies currently in the history window.
    pub fn avg(&self) -> Option<u64> {
        rolling_average(self.history.iter().copied())
    }
}

/// Loss percentage of `losses` out of `total` outcomes.
pub fn loss_percentage(losses: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    100.0 * (losses as f64 / total as f64)
}

/// Mean of the replies in `samples`, rounded to the nearest millisecond.
///
/// Timeouts are skipped; `None` if there is no reply at all.
pub fn rolling_average(samples: impl IntoIterator<Item = Option<f64>>) -> Option<u64> {
    let (sum, count) = samples
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return None;
    }
    Some(round_ms(sum / count as f64))
}

/// Round a millisecond value for display.
///
/// Ties go to the even neighbour; negative or non-finite input yields 0.
pub fn round_ms(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.round_ties_even() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(loss_window: usize, history: usize) -> HostRecord {
        HostRecord::new(
            "host",
            Capacities {
                loss_window,
                history,
            },
        )
    }

    fn recomputed_loss(r: &HostRecord) -> f64 {
        let losses = r.loss_window().iter().filter(|lost| **lost).count();
        loss_percentage(losses, r.loss_window().len())
    }

    #[test]
    fn loss_pct_over_window() {
        let mut r = record(5, 10);
        for outcome in [
            Outcome::Reply(10.0),
            Outcome::Reply(11.0),
            Outcome::Timeout,
            Outcome::Reply(12.0),
            Outcome::Timeout,
        ] {
            r.apply_result(outcome);
        }
        assert_eq!(r.loss_pct(), 40.0);
    }

    #[test]
    fn loss_window_slides() {
        let mut r = record(2, 10);
        r.apply_result(Outcome::Timeout);
        r.apply_result(Outcome::Timeout);
        assert_eq!(r.loss_pct(), 100.0);
        r.apply_result(Outcome::Reply(5.0));
        assert_eq!(r.loss_pct(), 50.0);
        r.apply_result(Outcome::Reply(5.0));
        assert_eq!(r.loss_pct(), 0.0);
    }

    #[test]
    fn jitter_ewma_sequence() {
        let mut r = record(30, 40);

        r.apply_result(Outcome::Reply(100.0));
        assert_eq!(r.jitter(), 0.0);
        assert_eq!(r.last_rtt(), Some(100.0));

        r.apply_result(Outcome::Reply(150.0));
        assert!((r.jitter() - 15.0).abs() < 1e-9);
        assert_eq!(r.last_rtt(), Some(150.0));

        r.apply_result(Outcome::Timeout);
        assert!((r.jitter() - 15.0).abs() < 1e-9);
        assert_eq!(r.last_rtt(), Some(150.0));
    }

    #[test]
    fn jitter_is_not_reset_after_losses() {
        let mut r = record(30, 40);
        r.apply_result(Outcome::Reply(100.0));
        r.apply_result(Outcome::Reply(150.0));
        for _ in 0..5 {
            r.apply_result(Outcome::Timeout);
        }
        r.apply_result(Outcome::Reply(150.0));
        // 0.7 * 15 + 0.3 * |150 - 150|
        assert!((r.jitter() - 10.5).abs() < 1e-9);
    }

    #[test]
    fn timeouts_before_first_reply_leave_rtt_unset() {
        let mut r = record(30, 40);
        r.apply_result(Outcome::Timeout);
        r.apply_result(Outcome::Timeout);
        assert_eq!(r.last_rtt(), None);
        assert_eq!(r.jitter(), 0.0);

        r.apply_result(Outcome::Reply(42.0));
        assert_eq!(r.jitter(), 0.0);
        assert_eq!(r.last_rtt(), Some(42.0));
    }

    #[test]
    fn average_ignores_timeouts() {
        assert_eq!(
            rolling_average([Some(100.0), None, Some(120.0), None]),
            Some(110)
        );
        assert_eq!(rolling_average([None, None]), None);
        assert_eq!(rolling_average(std::iter::empty()), None);
    }

    #[test]
    fn average_tracks_visible_window_only() {
        let mut r = record(30, 2);
        r.apply_result(Outcome::Reply(1000.0));
        r.apply_result(Outcome::Reply(10.0));
        r.apply_result(Outcome::Reply(20.0));
        assert_eq!(r.avg(), Some(15));

        r.apply_result(Outcome::Timeout);
        r.apply_result(Outcome::Timeout);
        assert_eq!(r.avg(), None);
    }

    #[test]
    fn history_records_every_cycle_until_capacity() {
        let mut r = record(3, 4);
        for i in 0..3 {
            r.apply_result(Outcome::Reply(i as f64));
            assert_eq!(r.history().len(), i + 1);
        }
        for _ in 0..10 {
            r.apply_result(Outcome::Timeout);
        }
        assert_eq!(r.history().len(), 4);
        assert_eq!(r.loss_window().len(), 3);
        assert_eq!(r.cycles(), 13);
        assert_eq!(r.history().to_vec(), vec![None; 4]);
    }

    #[test]
    fn invariants_hold_for_mixed_sequences() {
        let mut r = record(7, 5);
        // Deterministic pseudo-random pattern of replies and losses.
        let mut state: u32 = 0x2545_f491;
        for step in 0..500 {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let outcome = if state % 3 == 0 {
                Outcome::Timeout
            } else {
                Outcome::Reply(f64::from(state % 400) + step as f64 * 0.01)
            };
            r.apply_result(outcome);

            assert!(r.jitter() >= 0.0);
            assert!(r.loss_window().len() <= 7);
            assert!(r.history().len() <= 5);
            assert_eq!(r.loss_pct(), recomputed_loss(&r));
            assert!((0.0..=100.0).contains(&r.loss_pct()));
        }
    }

    #[test]
    fn round_ms_ties_to_even() {
        assert_eq!(round_ms(2.5), 2);
        assert_eq!(round_ms(3.5), 4);
        assert_eq!(round_ms(12.49), 12);
        assert_eq!(round_ms(-3.0), 0);
        assert_eq!(round_ms(f64::NAN), 0);
    }

    #[test]
    fn outcome_helpers() {
        assert_eq!(Outcome::from_rtt(Some(3.0)), Outcome::Reply(3.0));
        assert_eq!(Outcome::from_rtt(None), Outcome::Timeout);
        assert!(!Outcome::Timeout.is_reply());
        assert_eq!(Outcome::Reply(7.5).rtt(), Some(7.5));
    }
}
