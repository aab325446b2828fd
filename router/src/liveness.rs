//! The startup liveness barrier.
//!
//! A router may not relay anything until the whole protocol network is up:
//! first the wrapped party must answer its liveness probe, then every peer
//! router must, and finally the party is told transmission may commence.
//! The phases are separate functions because the caller must start
//! answering its own liveness endpoint between the first two; routers that
//! only went live after their peers were already up would otherwise wait on
//! each other forever.
//!
//! The party probe is fatal on failure (there is nothing to mediate for),
//! while peers are polled in rounds until they all answer, retrying only
//! the ones that have not answered yet.

use crate::forward::Forwarder;
use crate::RouterError;
use std::time::Duration;
use switchboard_types::{ParticipantId, ProtocolDescription};
use tracing::{info, warn};

/// How long the wrapped party gets to answer its single probe.
const PARTY_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Pause between peer polling rounds.
const PEER_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How long each individual peer probe may take.
const PEER_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Probe the wrapped party once. Failure is fatal: a router without its
/// party has nothing to mediate for.
pub async fn confirm_party_alive(
    forwarder: &Forwarder,
    protocol: &ProtocolDescription,
) -> Result<(), RouterError> {
    let address = party_address(protocol)?;
    if forwarder.probe_alive(address, PARTY_PROBE_TIMEOUT).await {
        info!(party = %protocol.implementing_party, "implementing party is online");
        Ok(())
    } else {
        Err(RouterError::PartyUnreachable {
            party: protocol.implementing_party.clone(),
            address: address.to_string(),
        })
    }
}

/// Poll peer routers in rounds until every one of them has answered once.
pub async fn await_peer_routers(forwarder: &Forwarder, protocol: &ProtocolDescription) {
    let mut waiting: Vec<ParticipantId> = protocol.peers();
    while !waiting.is_empty() {
        let mut still_waiting = Vec::new();
        for peer in waiting {
            // peers() only yields keys of the participant table
            let address = protocol.address_of(&peer).unwrap_or_default();
            if forwarder.probe_alive(address, PEER_PROBE_TIMEOUT).await {
                info!(%peer, "peer router is online");
            } else {
                still_waiting.push(peer);
            }
        }
        waiting = still_waiting;
        if !waiting.is_empty() {
            warn!(waiting = ?waiting, "peer routers not yet online, polling again");
            tokio::time::sleep(PEER_POLL_INTERVAL).await;
        }
    }
}

/// Tell the wrapped party that the whole network is up and it may start
/// transmitting.
pub async fn signal_commence(
    forwarder: &Forwarder,
    protocol: &ProtocolDescription,
) -> Result<(), RouterError> {
    let address = party_address(protocol)?;
    forwarder
        .post_commence(&protocol.implementing_party, address)
        .await?;
    info!("all protocol participants are online, transmission may commence");
    Ok(())
}

fn party_address(protocol: &ProtocolDescription) -> Result<&str, RouterError> {
    protocol
        .party_address()
        .ok_or_else(|| RouterError::UnknownParticipant(protocol.implementing_party.clone()))
}
