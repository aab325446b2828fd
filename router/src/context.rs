//! The router's runtime state: one machine, one cursor.
//!
//! A `RouterContext` owns the synthesized machine and the single mutable
//! cursor into it. Message handling is serialized by the caller (the HTTP
//! layer holds a lock for the whole of [`RouterContext::message_received`]),
//! so a message is fully validated, applied, and forwarded before the next
//! one is looked at.

use crate::forward::Forwarder;
use crate::{ProtocolViolation, RouterError};
use indexmap::IndexMap;
use switchboard_fsm::{transform, ActionKind, Machine, StateId};
use switchboard_types::{Envelope, MessageKind, ParticipantId, ProtocolDescription};
use tracing::{debug, info};

/// What a successfully processed message means for the router's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The protocol continues; wait for the next message.
    Continue,
    /// The protocol instance completed; the process may shut down cleanly.
    Finished,
}

/// Per-router mutable state. One instance per process, owned by one task.
pub struct RouterContext {
    machine: Machine,
    current: StateId,
    last_receive: StateId,
    participants: IndexMap<ParticipantId, String>,
    party: ParticipantId,
    forwarder: Forwarder,
}

impl RouterContext {
    /// Validate a protocol description and synthesize this router's machine.
    ///
    /// Runs the full static pipeline: global well-formedness, relative
    /// well-formedness over every pair, endpoint synthesis for the
    /// implementing party, and the FSM linking pass.
    pub fn from_protocol(
        protocol: &ProtocolDescription,
        forwarder: Forwarder,
    ) -> Result<Self, RouterError> {
        switchboard_compiler::check_global_type(&protocol.global_type, &protocol.participants)?;
        switchboard_compiler::check_relative_wellformedness(
            &protocol.global_type,
            &protocol.participants,
        )?;
        let process = switchboard_compiler::synthesize(
            &protocol.global_type,
            &protocol.implementing_party,
            &protocol.peers(),
        )?;
        let machine = transform(protocol.implementing_party.clone(), &process)?;
        Ok(Self::new(
            machine,
            protocol.participants.clone(),
            protocol.implementing_party.clone(),
            forwarder,
        ))
    }

    /// Wrap an already-built machine.
    pub fn new(
        machine: Machine,
        participants: IndexMap<ParticipantId, String>,
        party: ParticipantId,
        forwarder: Forwarder,
    ) -> Self {
        let entry = machine.entry();
        Self {
            machine,
            current: entry,
            last_receive: entry,
            participants,
            party,
            forwarder,
        }
    }

    /// The action the machine is currently waiting to perform.
    #[must_use]
    pub fn current_action(&self) -> &ActionKind {
        self.machine.action(self.current)
    }

    /// Roll the cursor back to the last receive state so the same input can
    /// be retried (the `recover` violation policy).
    pub fn recover(&mut self) {
        self.current = self.last_receive;
    }

    /// Process one inbound protocol message.
    ///
    /// Validates the envelope against the current state, advances the
    /// cursor, and performs any forwarding the new state requires. Returns
    /// [`Outcome::Finished`] once the machine reaches its end state, with
    /// every outstanding forward already delivered.
    pub async fn message_received(&mut self, envelope: &Envelope) -> Result<Outcome, RouterError> {
        info!(sender = %envelope.sender, receiver = %envelope.receiver, payload = %envelope.payload, "received message");
        let ActionKind::Receive { from, message } = self.current_action().clone() else {
            return Err(ProtocolViolation::Finished {
                sender: envelope.sender.clone(),
            }
            .into());
        };
        // Remember where this message found us, for the recover policy
        self.last_receive = self.current;

        if envelope.sender != from {
            return Err(ProtocolViolation::UnexpectedSender {
                got: envelope.sender.clone(),
                expected: from,
            }
            .into());
        }

        let next = match message {
            MessageKind::Label => {
                let Some(label) = envelope.payload.as_label() else {
                    return Err(ProtocolViolation::NotALabel { sender: from }.into());
                };
                self.machine.branch_target(self.current, label).ok_or_else(|| {
                    ProtocolViolation::UnknownLabel {
                        sender: from.clone(),
                        label: label.to_string(),
                    }
                })?
            }
            MessageKind::Value(expected) => {
                if !envelope.payload.matches(expected) {
                    return Err(ProtocolViolation::PayloadType {
                        sender: from,
                        got: envelope.payload.kind(),
                        expected,
                    }
                    .into());
                }
                self.machine
                    .continuation(self.current)
                    .ok_or(RouterError::MalformedMachine("value receive without continuation"))?
            }
        };

        self.current = next;
        match self.machine.action(self.current) {
            ActionKind::End => {
                info!("protocol finalised, shutting down router");
                Ok(Outcome::Finished)
            }
            // The RECEIVE-SEND-RECEIVE sequence of a double dependency makes
            // this check vital: the forward must happen before control
            // returns to the transport layer.
            ActionKind::Send { .. } => self.forward_message(envelope).await,
            ActionKind::Receive { .. } => Ok(Outcome::Continue),
        }
    }

    /// Forward the message just received to the hop the machine prescribes
    /// and to every dependent peer, concurrently. All deliveries are awaited
    /// before the cursor may reach the end state.
    async fn forward_message(&mut self, envelope: &Envelope) -> Result<Outcome, RouterError> {
        let ActionKind::Send { to, deps } = self.current_action().clone() else {
            return Err(RouterError::MalformedMachine("forward from a non-send state"));
        };
        if envelope.receiver != to {
            return Err(ProtocolViolation::UnexpectedRecipient {
                got: envelope.receiver.clone(),
                expected: to,
            }
            .into());
        }

        let mut deliveries = Vec::with_capacity(deps.len() + 1);
        info!(receiver = %to, payload = %envelope.payload, "forwarding message to actual receiver");
        deliveries.push((to.clone(), self.address_of(&to)?.to_string(), envelope.clone()));
        for dep in &deps {
            let readdressed = envelope.readdress(self.party.clone(), dep.clone());
            info!(dependency = %dep, payload = %readdressed.payload, "forwarding message to dependency");
            deliveries.push((dep.clone(), self.address_of(dep)?.to_string(), readdressed));
        }

        let forwarder = &self.forwarder;
        futures::future::try_join_all(deliveries.iter().map(|(peer, url, envelope)| {
            forwarder.post_envelope(peer, url, envelope)
        }))
        .await?;

        self.current = self
            .machine
            .continuation(self.current)
            .ok_or(RouterError::MalformedMachine("send without continuation"))?;
        if self.machine.action(self.current) == &ActionKind::End {
            info!("protocol finalised, shutting down router");
            Ok(Outcome::Finished)
        } else {
            debug!("forwarding complete, awaiting next message");
            Ok(Outcome::Continue)
        }
    }

    fn address_of(&self, participant: &str) -> Result<&str, RouterError> {
        self.participants
            .get(participant)
            .map(String::as_str)
            .ok_or_else(|| RouterError::UnknownParticipant(participant.to_string()))
    }
}
