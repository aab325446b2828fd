//! Endpoint synthesis: deriving one router's action tree from the global type.
//!
//! For the router implementing participant `p`, every reachable exchange is
//! turned into the RECEIVE/SEND sequence that realizes `p`'s side of it:
//! relaying label and value when `p` is sender or receiver, relaying just the
//! label when `p` merely depends on the outcome, and skipping the exchange
//! entirely when no branch difference is observable to `p`.

use crate::project::{ddep, relative_projection};
use crate::ProjectionError;
use indexmap::IndexMap;
use switchboard_types::{GlobalType, ParticipantId, RelativeType, RouterProcess, ValueType};

/// Whether an exchange's outcome must be forwarded from `b`'s knowledge to `a`.
///
/// Holds iff the exchange involves `b` as sender or receiver, does not involve
/// `a` at all, and the dependency analysis reports a genuine dependency for
/// the pair. A participant never depends on an exchange it performs itself.
pub fn hdep(a: &str, b: &str, exchange: &GlobalType) -> Result<bool, ProjectionError> {
    let GlobalType::Exchange {
        sender,
        receiver,
        branches,
    } = exchange
    else {
        return Ok(false);
    };
    if (b != sender && b != receiver) || a == sender || a == receiver {
        return Ok(false);
    }
    Ok(ddep(a, b, sender, receiver, branches)?.is_dependency())
}

/// Synthesize the router process for participant `p`, given the set `qs` of
/// all other participants.
pub fn synthesize(
    global: &GlobalType,
    p: &str,
    qs: &[ParticipantId],
) -> Result<RouterProcess, ProjectionError> {
    match global {
        GlobalType::End => Ok(RouterProcess::End),
        GlobalType::RecursiveCall { variable } => Ok(RouterProcess::RecursiveCall {
            variable: variable.clone(),
        }),
        GlobalType::RecursionDefinition {
            variable,
            continuation,
        } => {
            // Keep only the peers for whom the loop is still observable;
            // if nobody cares, the router has nothing to do here.
            let mut pruned = Vec::with_capacity(qs.len());
            for q in qs {
                if relative_projection(p, q, global)? != RelativeType::End {
                    pruned.push(q.clone());
                }
            }
            if pruned.is_empty() {
                Ok(RouterProcess::End)
            } else {
                Ok(RouterProcess::RecursionDefinition {
                    variable: variable.clone(),
                    continuation: Box::new(synthesize(continuation, p, &pruned)?),
                })
            }
        }
        GlobalType::Exchange {
            sender,
            receiver,
            branches,
        } => {
            let mut deps = Vec::new();
            for q in qs {
                if q != receiver && hdep(q, p, global)? {
                    deps.push(q.clone());
                }
            }

            if p == sender || p == receiver {
                // The router relays the label to the receiver and to every
                // dependent peer; a non-unit payload means one more value
                // message follows on the same hop.
                let mut out = IndexMap::with_capacity(branches.len());
                for (label, branch) in branches {
                    let continuation = if branch.value_type == ValueType::Unit {
                        synthesize(&branch.continuation, p, qs)?
                    } else {
                        RouterProcess::receive_value(
                            sender.clone(),
                            branch.value_type,
                            RouterProcess::send(
                                receiver.clone(),
                                vec![],
                                synthesize(&branch.continuation, p, qs)?,
                            ),
                        )
                    };
                    out.insert(
                        label.clone(),
                        RouterProcess::send(receiver.clone(), deps.clone(), continuation),
                    );
                }
                Ok(RouterProcess::receive_label(sender.clone(), out))
            } else {
                let depon_s = qs.contains(sender) && hdep(p, sender, global)?;
                let depon_r = qs.contains(receiver) && hdep(p, receiver, global)?;

                if depon_s != depon_r {
                    // p depends on exactly one side: that side's router
                    // forwards the label here, and this router relays it to
                    // its wrapped party.
                    let from = if depon_s { sender } else { receiver };
                    let mut out = IndexMap::with_capacity(branches.len());
                    for (label, branch) in branches {
                        out.insert(
                            label.clone(),
                            RouterProcess::send(
                                p,
                                vec![],
                                synthesize(&branch.continuation, p, qs)?,
                            ),
                        );
                    }
                    Ok(RouterProcess::receive_label(from.clone(), out))
                } else if depon_s && depon_r {
                    // p must be told by both sides before proceeding:
                    // RECEIVE from the sender, SEND to the party, RECEIVE the
                    // confirming label from the receiver.
                    let mut out = IndexMap::with_capacity(branches.len());
                    for (label, branch) in branches {
                        let confirm = RouterProcess::receive_label(
                            receiver.clone(),
                            [(label.clone(), synthesize(&branch.continuation, p, qs)?)],
                        );
                        out.insert(label.clone(), RouterProcess::send(p, vec![], confirm));
                    }
                    Ok(RouterProcess::receive_label(sender.clone(), out))
                } else {
                    // The exchange is invisible to p; any branch continuation
                    // will do, relative well-formedness makes them agree.
                    let first = branches
                        .values()
                        .next()
                        .map(|b| &b.continuation)
                        .unwrap_or(&GlobalType::End);
                    synthesize(first, p, qs)
                }
            }
        }
    }
}
