//! Synthetic player driver.
//!
//! Joins generated participants, starts matches back to back and has random
//! seekers tag random hiders during the seeking phase. Useful for watching
//! the match lifecycle in the logs without a real game client.

use anyhow::{Context, bail, ensure};
use hide_seek::{
    MatchError, MatchEvent, MatchHandle, ParticipantId, Phase, Side, session::MatchStatus,
};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::IteratorRandom};
use serde::Serialize;
use std::time::Duration;
use tokio::{sync::mpsc, time::sleep};

use crate::logging;

/// Floor on the pause between capture attempts
const MIN_PAUSE: Duration = Duration::from_millis(250);

/// Chance that a capture attempt finds its target
const CAPTURE_CHANCE: f64 = 0.5;

/// Result of a demo run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DemoSummary {
    pub rounds: usize,
    pub hider_wins: usize,
    pub seeker_wins: usize,
    pub captures: usize,
}

pub struct DemoDriver {
    handle: MatchHandle,
    events: mpsc::Receiver<MatchEvent>,
    rng: StdRng,
}

impl DemoDriver {
    /// Join `players` generated participants to the match
    pub async fn new(handle: MatchHandle, players: usize, seed: Option<u64>) -> anyhow::Result<Self> {
        let events = handle
            .subscribe(256)
            .await
            .context("Match unavailable for subscription")?;

        for _ in 0..players {
            handle.join(ParticipantId::random()).await?;
        }
        log::info!("Demo joined {players} synthetic participants");

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            handle,
            events,
            rng,
        })
    }

    /// Play `rounds` matches and tally the winners
    pub async fn run(mut self, rounds: usize) -> anyhow::Result<DemoSummary> {
        let mut summary = DemoSummary::default();

        for round in 1..=rounds {
            let (winner, captures, seeking_elapsed) = self.play_round().await?;
            logging::log_match_result(round, &winner.to_string(), captures, seeking_elapsed.as_secs());

            summary.rounds += 1;
            summary.captures += captures;
            match winner {
                Side::Hiders => summary.hider_wins += 1,
                Side::Seekers => summary.seeker_wins += 1,
            }

            self.wait_for_phase(Phase::Waiting).await?;
        }

        Ok(summary)
    }

    async fn play_round(&mut self) -> anyhow::Result<(Side, usize, Duration)> {
        self.handle.start().await?;
        self.wait_for_phase(Phase::Seeking).await?;

        let mut captures = 0;
        loop {
            let status = self.handle.status().await?;
            let pause = capture_pause(&status);

            tokio::select! {
                event = self.events.recv() => match event {
                    Some(MatchEvent::MatchEnded { winner, seeking_elapsed, .. }) => {
                        return Ok((winner, captures, seeking_elapsed));
                    }
                    Some(_) => continue,
                    None => bail!("Match event stream closed"),
                },

                _ = sleep(pause) => {
                    if self.attempt_capture().await? {
                        captures += 1;
                    }
                }
            }
        }
    }

    /// One random seeker tries one random hider. Returns whether it landed.
    async fn attempt_capture(&mut self) -> anyhow::Result<bool> {
        if !self.rng.random_bool(CAPTURE_CHANCE) {
            return Ok(false);
        }

        let roster = self.handle.roster().await?;
        let (Some(attacker), Some(target)) = (
            roster.seekers.iter().choose(&mut self.rng).copied(),
            roster.hiders.iter().choose(&mut self.rng).copied(),
        ) else {
            return Ok(false);
        };

        match self.handle.capture(attacker, target).await {
            Ok(outcome) => Ok(outcome.is_captured()),
            // The seeking clock can run out between the roster read and the capture.
            Err(MatchError::NotEligibleCapture(reason)) => {
                log::debug!("Demo capture rejected: {reason}");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn wait_for_phase(&mut self, phase: Phase) -> anyhow::Result<()> {
        loop {
            match self.events.recv().await {
                Some(MatchEvent::PhaseChanged { to, .. }) if to == phase => return Ok(()),
                Some(_) => continue,
                None => bail!("Match event stream closed while waiting for {phase}"),
            }
        }
    }
}

/// Spread capture attempts over the remaining seeking time
fn capture_pause(status: &MatchStatus) -> Duration {
    let slots = u32::try_from(status.hiders).unwrap_or(u32::MAX).saturating_add(1);
    (status.remaining / slots).max(MIN_PAUSE)
}

/// Join players, play the rounds and report the tally
pub async fn run(
    handle: MatchHandle,
    players: usize,
    rounds: usize,
    seed: Option<u64>,
) -> anyhow::Result<DemoSummary> {
    ensure!(players > 0, "Demo needs at least one participant");

    let driver = DemoDriver::new(handle, players, seed).await?;
    driver.run(rounds).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use hide_seek::{EventSink, LogSink, MatchActor, MatchConfig};
    use std::sync::Arc;

    fn config() -> MatchConfig {
        MatchConfig {
            countdown_secs: 3,
            hide_secs: 10,
            seek_secs: 30,
            ending_grace_secs: 1,
            min_players: 2,
            min_hiders: 1,
            max_hiders: 3,
            seed: Some(5),
        }
    }

    #[test]
    fn test_capture_pause_spreads_attempts() {
        let status = MatchStatus {
            phase: Phase::Seeking,
            remaining: Duration::from_secs(30),
            phase_duration: Duration::from_secs(30),
            waiting: 0,
            hiders: 2,
            seekers: 3,
            eliminated: 0,
        };
        assert_eq!(capture_pause(&status), Duration::from_secs(10));

        let nearly_done = MatchStatus {
            remaining: Duration::ZERO,
            ..status
        };
        assert_eq!(capture_pause(&nearly_done), MIN_PAUSE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_plays_all_rounds() {
        let handle = MatchActor::spawn(
            Arc::new(config()),
            vec![Box::new(LogSink) as Box<dyn EventSink>],
        );

        let summary = run(handle.clone(), 6, 3, Some(11)).await.unwrap();

        assert_eq!(summary.rounds, 3);
        assert_eq!(summary.hider_wins + summary.seeker_wins, 3);
        assert_eq!(handle.phase().await.unwrap(), Phase::Waiting);
        assert_eq!(handle.roster().await.unwrap().waiting.len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_rejects_too_few_players() {
        let handle = MatchActor::spawn(Arc::new(config()), Vec::new());

        let err = run(handle, 1, 1, None).await.unwrap_err();
        let match_err = err.downcast_ref::<MatchError>();
        assert!(matches!(
            match_err,
            Some(MatchError::InsufficientPlayers { current: 1, required: 2 })
        ));
    }
}
