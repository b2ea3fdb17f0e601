//! Match actor implementation with async message handling.

use std::{sync::Arc, time::Duration};
use tokio::sync::{mpsc, oneshot};

use super::{
    clock::ClockTicket,
    config::MatchSettings,
    errors::{MatchError, MatchResult},
    events::{ChannelSink, EventSink, MatchEvent},
    messages::{MatchMessage, MatchStatus},
    state_machine::MatchStateMachine,
};
use crate::game::{CaptureOutcome, ParticipantId, Phase, RosterSnapshot};

/// Inbox capacity for a single match
const INBOX_CAPACITY: usize = 100;

/// Match actor handle for sending messages
#[derive(Clone, Debug)]
pub struct MatchHandle {
    sender: mpsc::Sender<MatchMessage>,
}

impl MatchHandle {
    /// Create a new match handle
    pub fn new(sender: mpsc::Sender<MatchMessage>) -> Self {
        Self { sender }
    }

    /// Send a raw message to the match
    pub async fn send(&self, message: MatchMessage) -> MatchResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| MatchError::Unavailable)
    }

    /// Whether the actor has stopped accepting messages
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> MatchMessage,
    ) -> MatchResult<T> {
        let (response, rx) = oneshot::channel();
        self.send(build(response)).await?;
        rx.await.map_err(|_| MatchError::Unavailable)
    }

    pub async fn join(&self, participant: ParticipantId) -> MatchResult<()> {
        self.request(|response| MatchMessage::Join {
            participant,
            response,
        })
        .await?
    }

    pub async fn leave(&self, participant: ParticipantId) -> MatchResult<()> {
        self.request(|response| MatchMessage::Leave {
            participant,
            response,
        })
        .await?
    }

    pub async fn start(&self) -> MatchResult<()> {
        self.request(|response| MatchMessage::Start { response })
            .await?
    }

    /// Force a reset. Returns how many participants were removed.
    pub async fn stop(&self) -> MatchResult<usize> {
        self.request(|response| MatchMessage::Stop { response })
            .await
    }

    pub async fn capture(
        &self,
        attacker: ParticipantId,
        target: ParticipantId,
    ) -> MatchResult<CaptureOutcome> {
        self.request(|response| MatchMessage::Capture {
            attacker,
            target,
            response,
        })
        .await?
    }

    pub async fn phase(&self) -> MatchResult<Phase> {
        self.request(|response| MatchMessage::GetPhase { response })
            .await
    }

    pub async fn remaining_time(&self) -> MatchResult<Duration> {
        self.request(|response| MatchMessage::GetRemainingTime { response })
            .await
    }

    pub async fn roster(&self) -> MatchResult<RosterSnapshot> {
        self.request(|response| MatchMessage::GetRoster { response })
            .await
    }

    pub async fn status(&self) -> MatchResult<MatchStatus> {
        self.request(|response| MatchMessage::GetStatus { response })
            .await
    }

    /// Receive every event emitted after this call.
    ///
    /// Events that do not fit in `capacity` are dropped for this subscriber.
    pub async fn subscribe(&self, capacity: usize) -> MatchResult<mpsc::Receiver<MatchEvent>> {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        self.send(MatchMessage::Subscribe { sender }).await?;
        Ok(receiver)
    }

    /// Ask the actor to exit its loop
    pub async fn shutdown(&self) -> MatchResult<()> {
        self.send(MatchMessage::Shutdown).await
    }
}

/// Match actor driving a single hide-and-seek match
pub struct MatchActor {
    /// Phase, roster and clock
    machine: MatchStateMachine,

    /// Message inbox
    inbox: mpsc::Receiver<MatchMessage>,

    /// Expiries from the match clock
    tickets: mpsc::UnboundedReceiver<ClockTicket>,

    /// Set by a shutdown message
    is_closed: bool,
}

impl MatchActor {
    /// Create a new match actor
    ///
    /// # Arguments
    ///
    /// * `settings` - Configuration provider
    /// * `sinks` - Event consumers attached before the first event
    ///
    /// # Returns
    ///
    /// * `(MatchActor, MatchHandle)` - Actor and handle for sending messages
    pub fn new(
        settings: Arc<dyn MatchSettings>,
        sinks: Vec<Box<dyn EventSink>>,
    ) -> (Self, MatchHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let (ticket_tx, tickets) = mpsc::unbounded_channel();

        let mut machine = MatchStateMachine::new(settings, ticket_tx);
        for sink in sinks {
            machine.add_sink(sink);
        }

        let actor = Self {
            machine,
            inbox,
            tickets,
            is_closed: false,
        };

        (actor, MatchHandle::new(sender))
    }

    /// Spawn the actor onto the current runtime and return its handle
    pub fn spawn(
        settings: Arc<dyn MatchSettings>,
        sinks: Vec<Box<dyn EventSink>>,
    ) -> MatchHandle {
        let (actor, handle) = Self::new(settings, sinks);
        tokio::spawn(actor.run());
        handle
    }

    /// Run the actor event loop
    ///
    /// Exits on a shutdown message or once every handle is dropped.
    pub async fn run(mut self) {
        log::info!("Match actor starting");

        loop {
            tokio::select! {
                message = self.inbox.recv() => {
                    match message {
                        Some(message) => self.handle_message(message),
                        None => break,
                    }

                    if self.is_closed {
                        break;
                    }
                }

                // The clock holds a sender, so this never yields None while we run.
                Some(ticket) = self.tickets.recv() => {
                    self.machine.on_clock_fired(ticket);
                }
            }
        }

        let removed = self.machine.stop();
        log::info!("Match actor stopped ({removed} participants released)");
    }

    fn handle_message(&mut self, message: MatchMessage) {
        match message {
            MatchMessage::Join {
                participant,
                response,
            } => {
                let _ = response.send(self.machine.join(participant));
            }

            MatchMessage::Leave {
                participant,
                response,
            } => {
                let _ = response.send(self.machine.leave(participant));
            }

            MatchMessage::Start { response } => {
                let _ = response.send(self.machine.start());
            }

            MatchMessage::Stop { response } => {
                let _ = response.send(self.machine.stop());
            }

            MatchMessage::Capture {
                attacker,
                target,
                response,
            } => {
                let _ = response.send(self.machine.capture(attacker, target));
            }

            MatchMessage::GetPhase { response } => {
                let _ = response.send(self.machine.phase());
            }

            MatchMessage::GetRemainingTime { response } => {
                let _ = response.send(self.machine.remaining_time());
            }

            MatchMessage::GetRoster { response } => {
                let _ = response.send(self.machine.roster_snapshot());
            }

            MatchMessage::GetStatus { response } => {
                let _ = response.send(self.machine.status());
            }

            MatchMessage::Subscribe { sender } => {
                log::debug!("New event subscriber");
                self.machine.add_sink(Box::new(ChannelSink::new(sender)));
            }

            MatchMessage::Shutdown => {
                log::info!("Match actor shutting down");
                self.is_closed = true;
            }
        }
    }
}
