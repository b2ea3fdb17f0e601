//! Match state machine.
//!
//! Owns the phase, the roster and the clock. Every public method runs a
//! whole transition (phase, roster, clock, events) before returning, and the
//! actor calls them one at a time, so no trigger ever observes a half-done
//! transition.

use rand::{SeedableRng, rngs::StdRng};
use std::{mem, sync::Arc, time::Duration};
use tokio::{sync::mpsc, time::Instant};

use super::{
    clock::{ClockTicket, MatchClock},
    config::MatchSettings,
    errors::{MatchError, MatchResult},
    events::{EventSink, MatchEvent},
    messages::MatchStatus,
};
use crate::game::{CaptureOutcome, ParticipantId, Phase, Roster, RosterSnapshot, Side, try_capture};

pub struct MatchStateMachine {
    phase: Phase,
    roster: Roster,
    clock: MatchClock,
    rng: StdRng,
    settings: Arc<dyn MatchSettings>,
    sinks: Vec<Box<dyn EventSink>>,
    seeking_started: Option<Instant>,
}

impl MatchStateMachine {
    /// Create a machine in `Waiting` with an empty roster
    ///
    /// # Arguments
    ///
    /// * `settings` - Configuration provider, read at every transition
    /// * `clock_tx` - Where clock expiries are delivered; the owner must feed
    ///   them back through [`Self::on_clock_fired`]
    pub fn new(
        settings: Arc<dyn MatchSettings>,
        clock_tx: mpsc::UnboundedSender<ClockTicket>,
    ) -> Self {
        let rng = match settings.rng_seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            phase: Phase::Waiting,
            roster: Roster::new(),
            clock: MatchClock::new(clock_tx),
            rng,
            settings,
            sinks: Vec::new(),
            seeking_started: None,
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Add a participant to the waiting set
    pub fn join(&mut self, participant: ParticipantId) -> MatchResult<()> {
        if self.roster.contains(&participant) {
            return Err(MatchError::AlreadyInMatch);
        }
        if self.phase != Phase::Waiting {
            return Err(MatchError::WrongPhase { phase: self.phase });
        }

        self.roster.add_waiting(participant)?;

        let total = self.roster.total();
        let min_players = self.settings.min_players();
        log::info!("Participant {participant} joined ({total}/{min_players})");
        self.emit(MatchEvent::ParticipantJoined {
            participant,
            total,
            min_players,
        });

        Ok(())
    }

    /// Remove a participant from whatever role they hold.
    ///
    /// Dropping below the minimum does not abort a countdown and losing the
    /// last hider does not end the match; both are left to the operator.
    pub fn leave(&mut self, participant: ParticipantId) -> MatchResult<()> {
        if !self.roster.remove(&participant) {
            return Err(MatchError::NotInMatch);
        }

        let remaining = self.roster.total();
        log::info!("Participant {participant} left ({remaining} remaining)");
        if self.phase == Phase::Starting && remaining < self.settings.min_players() {
            log::warn!("Below minimum players during countdown, continuing until stopped");
        }
        if self.phase.is_active() && self.roster.hider_count() == 0 {
            log::warn!("No hiders left in {}, match runs until the clock or a stop", self.phase);
        }
        self.emit(MatchEvent::ParticipantLeft {
            participant,
            remaining,
        });

        Ok(())
    }

    /// Begin the countdown
    pub fn start(&mut self) -> MatchResult<()> {
        if self.phase != Phase::Waiting {
            return Err(MatchError::WrongPhase { phase: self.phase });
        }

        let current = self.roster.waiting_count();
        let required = self.settings.min_players();
        if current < required {
            return Err(MatchError::InsufficientPlayers { current, required });
        }

        log::info!("Match starting with {current} participants");
        self.enter(Phase::Starting);
        Ok(())
    }

    /// Cancel everything and return to an empty waiting state.
    ///
    /// Returns how many participants were removed.
    pub fn stop(&mut self) -> usize {
        self.clock.cancel();
        self.seeking_started = None;

        let removed = self.roster.clear();
        let from = mem::replace(&mut self.phase, Phase::Waiting);

        if from != Phase::Waiting {
            self.emit(MatchEvent::PhaseChanged {
                from,
                to: Phase::Waiting,
                duration: Duration::ZERO,
            });
        }
        log::info!("Match stopped from {from}, {removed} participants removed");
        self.emit(MatchEvent::MatchReset { removed });

        removed
    }

    /// Resolve a capture attempt.
    ///
    /// Capturing the last hider ends the match in the seekers' favour before
    /// this returns.
    pub fn capture(
        &mut self,
        attacker: ParticipantId,
        target: ParticipantId,
    ) -> MatchResult<CaptureOutcome> {
        let outcome = try_capture(&attacker, &target, self.phase, &mut self.roster);

        match outcome {
            CaptureOutcome::NotEligible(reason) => {
                log::debug!("Capture of {target} by {attacker} rejected: {reason}");
                Err(MatchError::NotEligibleCapture(reason))
            }
            CaptureOutcome::Captured { remaining_hiders } => {
                log::info!("{target} captured by {attacker}, {remaining_hiders} hiders left");
                self.emit(MatchEvent::PlayerCaptured {
                    target,
                    attacker,
                    remaining_hiders,
                });

                if remaining_hiders == 0 {
                    self.finish(Side::Seekers);
                }

                Ok(outcome)
            }
        }
    }

    /// Advance on a clock expiry.
    ///
    /// Returns `false` for tickets that were cancelled or replaced; those
    /// change nothing.
    pub fn on_clock_fired(&mut self, ticket: ClockTicket) -> bool {
        if !self.clock.accept(ticket) {
            log::debug!("Ignoring stale clock ticket {}", ticket.id());
            return false;
        }

        match self.phase {
            Phase::Starting => self.begin_hiding(),
            Phase::Hiding => self.begin_seeking(),
            Phase::Seeking => self.finish(Side::Hiders),
            Phase::Ending => self.return_to_waiting(),
            Phase::Waiting => {
                log::error!("Clock fired while waiting, ignoring");
                return false;
            }
        }

        true
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_time(&self) -> Duration {
        self.clock.remaining()
    }

    pub fn roster_snapshot(&self) -> RosterSnapshot {
        self.roster.snapshot()
    }

    pub fn status(&self) -> MatchStatus {
        MatchStatus {
            phase: self.phase,
            remaining: self.clock.remaining(),
            phase_duration: self.clock.scheduled_duration(),
            waiting: self.roster.waiting_count(),
            hiders: self.roster.hider_count(),
            seekers: self.roster.seeker_count(),
            eliminated: self.roster.eliminated_count(),
        }
    }

    fn begin_hiding(&mut self) {
        let min_hiders = self.settings.min_hiders();
        let max_hiders = self.settings.max_hiders();
        let hiders = self
            .roster
            .assign_roles(min_hiders, max_hiders, &mut self.rng);
        log::info!(
            "Hiding phase: {} hiders, {} seekers",
            hiders,
            self.roster.seeker_count()
        );

        self.enter(Phase::Hiding);
        self.emit(MatchEvent::TeamsAssigned {
            hiders: self.roster.hiders().into_iter().collect(),
            seekers: self.roster.seekers().into_iter().collect(),
        });
    }

    fn begin_seeking(&mut self) {
        self.seeking_started = Some(Instant::now());
        self.enter(Phase::Seeking);
        log::info!(
            "Seeking phase: seekers released, {} hiders remain",
            self.roster.hider_count()
        );
    }

    fn finish(&mut self, winner: Side) {
        let seeking_elapsed = self
            .seeking_started
            .take()
            .map(|started| started.elapsed())
            .unwrap_or_default();

        self.enter(Phase::Ending);
        log::info!("Match ended, {winner} win");
        self.emit(MatchEvent::MatchEnded {
            winner,
            seeking_elapsed,
            roster: self.roster.snapshot(),
        });
    }

    fn return_to_waiting(&mut self) {
        self.roster.reset_to_waiting();
        self.enter(Phase::Waiting);
        log::info!(
            "Returned to waiting with {} participants",
            self.roster.waiting_count()
        );
    }

    /// Switch phase, re-arm the clock for the new phase and announce it.
    fn enter(&mut self, next: Phase) {
        self.clock.cancel();

        let duration = match next {
            Phase::Waiting => Duration::ZERO,
            Phase::Starting => self.settings.countdown_duration(),
            Phase::Hiding => self.settings.hiding_duration(),
            Phase::Seeking => self.settings.seeking_duration(),
            Phase::Ending => self.settings.ending_grace_duration(),
        };
        if next != Phase::Waiting {
            self.clock.schedule(duration);
        }

        let from = mem::replace(&mut self.phase, next);
        self.emit(MatchEvent::PhaseChanged {
            from,
            to: next,
            duration,
        });
    }

    fn emit(&mut self, event: MatchEvent) {
        for sink in &self.sinks {
            sink.publish(&event);
        }
        self.sinks.retain(|sink| sink.is_open());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        game::Ineligibility,
        session::config::MatchConfig,
    };
    use std::sync::Mutex;
    use tokio::time::advance;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<MatchEvent>>>);

    impl Recorder {
        fn events(&self) -> Vec<MatchEvent> {
            self.0.lock().unwrap().clone()
        }

        fn phases(&self) -> Vec<(Phase, Phase)> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    MatchEvent::PhaseChanged { from, to, .. } => Some((from, to)),
                    _ => None,
                })
                .collect()
        }
    }

    impl EventSink for Recorder {
        fn publish(&self, event: &MatchEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    struct Harness {
        machine: MatchStateMachine,
        tickets: mpsc::UnboundedReceiver<ClockTicket>,
        recorder: Recorder,
    }

    impl Harness {
        fn new(config: MatchConfig) -> Self {
            let (tx, tickets) = mpsc::unbounded_channel();
            let mut machine = MatchStateMachine::new(Arc::new(config), tx);
            let recorder = Recorder::default();
            machine.add_sink(Box::new(recorder.clone()));
            Self {
                machine,
                tickets,
                recorder,
            }
        }

        fn with_players(config: MatchConfig, n: usize) -> (Self, Vec<ParticipantId>) {
            let mut harness = Self::new(config);
            let ids: Vec<_> = (0..n).map(|_| ParticipantId::random()).collect();
            for id in &ids {
                harness.machine.join(*id).unwrap();
            }
            (harness, ids)
        }

        /// Wait for the next expiry (paused time skips ahead) and feed it in.
        async fn fire(&mut self) -> bool {
            let ticket = self.tickets.recv().await.unwrap();
            self.machine.on_clock_fired(ticket)
        }

        async fn run_to(&mut self, phase: Phase) {
            while self.machine.phase() != phase {
                assert!(self.fire().await);
            }
        }

        fn seeker_and_hiders(&self) -> (ParticipantId, Vec<ParticipantId>) {
            let snapshot = self.machine.roster_snapshot();
            let seeker = *snapshot.seekers.iter().next().unwrap();
            (seeker, snapshot.hiders.into_iter().collect())
        }
    }

    fn config() -> MatchConfig {
        MatchConfig {
            seed: Some(1234),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_state() {
        let harness = Harness::new(config());
        assert_eq!(harness.machine.phase(), Phase::Waiting);
        assert!(harness.machine.roster_snapshot().is_empty());
        assert_eq!(harness.machine.remaining_time(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_twice_fails() {
        let (mut harness, ids) = Harness::with_players(config(), 1);
        assert_eq!(harness.machine.join(ids[0]), Err(MatchError::AlreadyInMatch));
        assert_eq!(harness.machine.roster_snapshot().total(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_outside_waiting_fails() {
        let (mut harness, _) = Harness::with_players(config(), 2);
        harness.machine.start().unwrap();

        let late = ParticipantId::random();
        assert_eq!(
            harness.machine.join(late),
            Err(MatchError::WrongPhase {
                phase: Phase::Starting
            })
        );
        assert_eq!(harness.machine.roster_snapshot().total(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_leave_unknown_participant() {
        let (mut harness, _) = Harness::with_players(config(), 2);
        let before = harness.machine.roster_snapshot();

        assert_eq!(
            harness.machine.leave(ParticipantId::random()),
            Err(MatchError::NotInMatch)
        );
        assert_eq!(harness.machine.roster_snapshot(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_requires_min_players() {
        let (mut harness, _) = Harness::with_players(config(), 1);

        assert_eq!(
            harness.machine.start(),
            Err(MatchError::InsufficientPlayers {
                current: 1,
                required: 2
            })
        );
        assert_eq!(harness.machine.phase(), Phase::Waiting);
        assert_eq!(harness.machine.remaining_time(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_is_wrong_phase() {
        let (mut harness, _) = Harness::with_players(config(), 2);
        harness.machine.start().unwrap();
        assert_eq!(
            harness.machine.start(),
            Err(MatchError::WrongPhase {
                phase: Phase::Starting
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_four_players_reach_hiding() {
        let config = MatchConfig {
            min_players: 2,
            min_hiders: 1,
            max_hiders: 3,
            ..config()
        };
        let (mut harness, ids) = Harness::with_players(config, 4);

        harness.machine.start().unwrap();
        assert_eq!(harness.machine.phase(), Phase::Starting);

        assert!(harness.fire().await);
        assert_eq!(harness.machine.phase(), Phase::Hiding);

        let snapshot = harness.machine.roster_snapshot();
        assert!((1..=3).contains(&snapshot.hiders.len()));
        assert!(snapshot.hiders.is_disjoint(&snapshot.seekers));
        let union: std::collections::BTreeSet<_> =
            snapshot.hiders.union(&snapshot.seekers).copied().collect();
        assert_eq!(union, ids.into_iter().collect());
        assert!(snapshot.waiting.is_empty());

        let teams = harness
            .recorder
            .events()
            .into_iter()
            .find(|e| matches!(e, MatchEvent::TeamsAssigned { .. }));
        assert!(teams.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_cycle_phase_sequence() {
        let (mut harness, _) = Harness::with_players(config(), 3);
        harness.machine.start().unwrap();
        harness.run_to(Phase::Waiting).await;

        assert_eq!(
            harness.recorder.phases(),
            vec![
                (Phase::Waiting, Phase::Starting),
                (Phase::Starting, Phase::Hiding),
                (Phase::Hiding, Phase::Seeking),
                (Phase::Seeking, Phase::Ending),
                (Phase::Ending, Phase::Waiting),
            ]
        );
        // Returning to waiting keeps everyone queued for the next match.
        let snapshot = harness.machine.roster_snapshot();
        assert_eq!(snapshot.waiting.len(), 3);
        assert_eq!(snapshot.total(), 3);
        assert_eq!(harness.machine.remaining_time(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seeking_timeout_hiders_win() {
        let (mut harness, _) = Harness::with_players(config(), 4);
        harness.machine.start().unwrap();
        harness.run_to(Phase::Seeking).await;

        assert!(harness.fire().await);
        assert_eq!(harness.machine.phase(), Phase::Ending);

        let ended = harness.recorder.events().into_iter().find_map(|e| match e {
            MatchEvent::MatchEnded {
                winner,
                seeking_elapsed,
                ..
            } => Some((winner, seeking_elapsed)),
            _ => None,
        });
        assert_eq!(ended, Some((Side::Hiders, Duration::from_secs(300))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_capture_seekers_win_once() {
        let config = MatchConfig {
            min_hiders: 2,
            max_hiders: 2,
            ..config()
        };
        let (mut harness, _) = Harness::with_players(config, 5);
        harness.machine.start().unwrap();
        harness.run_to(Phase::Seeking).await;
        let (seeker, hiders) = harness.seeker_and_hiders();
        assert_eq!(hiders.len(), 2);

        let first = harness.machine.capture(seeker, hiders[0]).unwrap();
        assert_eq!(first, CaptureOutcome::Captured { remaining_hiders: 1 });
        assert_eq!(harness.machine.phase(), Phase::Seeking);

        let last = harness.machine.capture(seeker, hiders[1]).unwrap();
        assert_eq!(last, CaptureOutcome::Captured { remaining_hiders: 0 });
        assert_eq!(harness.machine.phase(), Phase::Ending);
        assert_eq!(
            harness.machine.remaining_time(),
            Duration::from_secs(10)
        );

        // A late capture cannot end the match a second time.
        assert_eq!(
            harness.machine.capture(seeker, hiders[1]),
            Err(MatchError::NotEligibleCapture(Ineligibility::WrongPhase))
        );

        let endings: Vec<_> = harness
            .recorder
            .events()
            .into_iter()
            .filter_map(|e| match e {
                MatchEvent::MatchEnded { winner, .. } => Some(winner),
                _ => None,
            })
            .collect();
        assert_eq!(endings, vec![Side::Seekers]);
    }

    fn match_endings(recorder: &Recorder) -> Vec<Side> {
        recorder
            .events()
            .into_iter()
            .filter_map(|e| match e {
                MatchEvent::MatchEnded { winner, .. } => Some(winner),
                _ => None,
            })
            .collect()
    }

    fn single_hider_config() -> MatchConfig {
        MatchConfig {
            min_hiders: 1,
            max_hiders: 1,
            ..config()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_beats_queued_seeking_timeout() {
        let (mut harness, _) = Harness::with_players(single_hider_config(), 3);
        harness.machine.start().unwrap();
        harness.run_to(Phase::Seeking).await;
        let (seeker, hiders) = harness.seeker_and_hiders();
        assert_eq!(hiders.len(), 1);

        // Seeking expires at the same instant the capture arrives.
        advance(Duration::from_secs(300)).await;
        let queued = harness.tickets.recv().await.unwrap();

        assert_eq!(
            harness.machine.capture(seeker, hiders[0]),
            Ok(CaptureOutcome::Captured { remaining_hiders: 0 })
        );
        assert_eq!(harness.machine.phase(), Phase::Ending);

        assert!(!harness.machine.on_clock_fired(queued));
        assert_eq!(harness.machine.phase(), Phase::Ending);
        assert_eq!(harness.machine.remaining_time(), Duration::from_secs(10));
        assert_eq!(match_endings(&harness.recorder), vec![Side::Seekers]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seeking_timeout_beats_late_capture() {
        let (mut harness, _) = Harness::with_players(single_hider_config(), 3);
        harness.machine.start().unwrap();
        harness.run_to(Phase::Seeking).await;
        let (seeker, hiders) = harness.seeker_and_hiders();

        assert!(harness.fire().await);
        assert_eq!(harness.machine.phase(), Phase::Ending);

        assert_eq!(
            harness.machine.capture(seeker, hiders[0]),
            Err(MatchError::NotEligibleCapture(Ineligibility::WrongPhase))
        );
        assert_eq!(harness.machine.roster_snapshot().hiders.len(), 1);
        assert_eq!(match_endings(&harness.recorder), vec![Side::Hiders]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_hiders_leaving_waits_for_clock() {
        let (mut harness, _) = Harness::with_players(single_hider_config(), 3);
        harness.machine.start().unwrap();
        harness.run_to(Phase::Seeking).await;
        let (_, hiders) = harness.seeker_and_hiders();

        harness.machine.leave(hiders[0]).unwrap();
        assert_eq!(harness.machine.phase(), Phase::Seeking);
        assert!(match_endings(&harness.recorder).is_empty());

        assert!(harness.fire().await);
        assert_eq!(harness.machine.phase(), Phase::Ending);
        assert_eq!(match_endings(&harness.recorder), vec![Side::Hiders]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_capture_same_target() {
        let config = MatchConfig {
            min_hiders: 2,
            max_hiders: 2,
            ..config()
        };
        let (mut harness, _) = Harness::with_players(config, 5);
        harness.machine.start().unwrap();
        harness.run_to(Phase::Seeking).await;

        let snapshot = harness.machine.roster_snapshot();
        let seekers: Vec<_> = snapshot.seekers.iter().copied().collect();
        let target = *snapshot.hiders.iter().next().unwrap();

        assert!(harness.machine.capture(seekers[0], target).is_ok());
        assert_eq!(
            harness.machine.capture(seekers[1], target),
            Err(MatchError::NotEligibleCapture(
                Ineligibility::TargetNotHider
            ))
        );
        assert_eq!(harness.machine.roster_snapshot().hiders.len(), 1);
        assert_eq!(harness.machine.phase(), Phase::Seeking);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_outside_seeking_never_mutates() {
        let (mut harness, _) = Harness::with_players(config(), 4);
        harness.machine.start().unwrap();
        harness.run_to(Phase::Hiding).await;
        let (seeker, hiders) = harness.seeker_and_hiders();
        let before = harness.machine.roster_snapshot();

        assert_eq!(
            harness.machine.capture(seeker, hiders[0]),
            Err(MatchError::NotEligibleCapture(Ineligibility::WrongPhase))
        );
        assert_eq!(harness.machine.roster_snapshot(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_from_every_phase() {
        for target in [
            Phase::Waiting,
            Phase::Starting,
            Phase::Hiding,
            Phase::Seeking,
            Phase::Ending,
        ] {
            let (mut harness, _) = Harness::with_players(config(), 4);
            if target != Phase::Waiting {
                harness.machine.start().unwrap();
                harness.run_to(target).await;
            }

            assert_eq!(harness.machine.stop(), 4);
            assert_eq!(harness.machine.phase(), Phase::Waiting);
            assert!(harness.machine.roster_snapshot().is_empty());
            assert_eq!(harness.machine.remaining_time(), Duration::ZERO);
            assert!(matches!(
                harness.recorder.events().last(),
                Some(MatchEvent::MatchReset { removed: 4 })
            ));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_ticket_after_stop_is_ignored() {
        let (mut harness, _) = Harness::with_players(config(), 2);
        harness.machine.start().unwrap();

        advance(Duration::from_secs(10)).await;
        // The countdown expiry may already be queued when stop lands.
        let queued = harness.tickets.recv().await.unwrap();
        harness.machine.stop();

        assert!(!harness.machine.on_clock_fired(queued));
        assert_eq!(harness.machine.phase(), Phase::Waiting);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_time_resets_on_transition() {
        let (mut harness, _) = Harness::with_players(config(), 2);
        harness.machine.start().unwrap();
        assert_eq!(harness.machine.remaining_time(), Duration::from_secs(10));

        let mut last = harness.machine.remaining_time();
        for _ in 0..5 {
            advance(Duration::from_secs(1)).await;
            let now = harness.machine.remaining_time();
            assert!(now <= last);
            last = now;
        }
        assert_eq!(last, Duration::from_secs(5));

        assert!(harness.fire().await);
        assert_eq!(harness.machine.phase(), Phase::Hiding);
        assert_eq!(harness.machine.remaining_time(), Duration::from_secs(60));
        assert_eq!(harness.machine.status().phase_duration, Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_leave_during_countdown_does_not_abort() {
        let (mut harness, ids) = Harness::with_players(config(), 2);
        harness.machine.start().unwrap();

        harness.machine.leave(ids[0]).unwrap();
        assert_eq!(harness.machine.phase(), Phase::Starting);

        assert!(harness.fire().await);
        assert_eq!(harness.machine.phase(), Phase::Hiding);
        assert_eq!(harness.machine.roster_snapshot().total(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seeded_assignment_is_reproducible() {
        let ids: Vec<_> = (0..6).map(|_| ParticipantId::random()).collect();
        let mut results = Vec::new();

        for _ in 0..2 {
            let mut harness = Harness::new(config());
            for id in &ids {
                harness.machine.join(*id).unwrap();
            }
            harness.machine.start().unwrap();
            harness.run_to(Phase::Hiding).await;
            results.push(harness.machine.roster_snapshot().hiders);
        }

        assert_eq!(results[0], results[1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_sinks_are_pruned() {
        let (tx, _tickets) = mpsc::unbounded_channel();
        let mut machine = MatchStateMachine::new(Arc::new(config()), tx);
        let (sink, rx) = crate::session::events::ChannelSink::channel(4);
        machine.add_sink(Box::new(sink));
        drop(rx);

        machine.join(ParticipantId::random()).unwrap();
        assert_eq!(machine.sink_count(), 0);
    }
}
