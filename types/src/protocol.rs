//! The protocol description file: the single input artifact of a router.
//!
//! Loaded once at startup and immutable thereafter. The participant table
//! maps each participant to the base URL this router sends its messages to:
//! the implementing party maps to the wrapped application component itself,
//! every other participant maps to that participant's router.

use crate::{GlobalType, ParticipantId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A protocol description as read from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolDescription {
    /// The protocol all routers enforce
    #[serde(rename = "globalType")]
    pub global_type: GlobalType,
    /// Participant id to base URL
    pub participants: IndexMap<ParticipantId, String>,
    /// The participant this router mediates for
    #[serde(rename = "implementingParty")]
    pub implementing_party: ParticipantId,
    /// Port this router listens on
    #[serde(rename = "routerPort")]
    pub router_port: u16,
}

impl ProtocolDescription {
    /// Every participant other than the implementing party.
    #[must_use]
    pub fn peers(&self) -> Vec<ParticipantId> {
        self.participants
            .keys()
            .filter(|q| **q != self.implementing_party)
            .cloned()
            .collect()
    }

    /// Base URL registered for a participant.
    #[must_use]
    pub fn address_of(&self, participant: &str) -> Option<&str> {
        self.participants.get(participant).map(String::as_str)
    }

    /// Base URL of the wrapped implementing party.
    #[must_use]
    pub fn party_address(&self) -> Option<&str> {
        self.address_of(&self.implementing_party)
    }
}
