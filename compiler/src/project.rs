//! Relative projection: the protocol one pair of participants observes.
//!
//! Projection is structural recursion on the global type. Exchanges between
//! the pair survive as exchanges; exchanges elsewhere either vanish (when
//! every branch looks identical to the pair) or become explicit dependency
//! nodes recording the non-local choice the pair must learn. Loops whose
//! bodies produce no observable action for the pair collapse to `End`.

use crate::ProjectionError;
use indexmap::IndexMap;
use switchboard_types::{
    Branch, DependencyKind, GlobalType, ParticipantId, RelativeBranch, RelativeType,
};

/// Outcome of the dependency analysis for one exchange and one pair.
#[derive(Debug, Clone, PartialEq)]
pub enum DependencyAnalysis {
    /// Every branch projects identically: the choice is invisible to the
    /// pair, and this is the shared projection.
    Uniform(RelativeType),
    /// Branches genuinely diverge: the pair depends on the outcome. Carries
    /// the constructed [`RelativeType::Dependency`] node.
    Diverging(RelativeType),
}

impl DependencyAnalysis {
    /// Whether the exchange's outcome is observable to the pair.
    #[must_use]
    pub fn is_dependency(&self) -> bool {
        matches!(self, DependencyAnalysis::Diverging(_))
    }

    /// The projected relative type, either way.
    #[must_use]
    pub fn into_relative(self) -> RelativeType {
        match self {
            DependencyAnalysis::Uniform(r) | DependencyAnalysis::Diverging(r) => r,
        }
    }
}

/// Compute the relative projection of a global type onto the pair `(p, q)`.
pub fn relative_projection(
    p: &str,
    q: &str,
    global: &GlobalType,
) -> Result<RelativeType, ProjectionError> {
    match global {
        GlobalType::End => Ok(RelativeType::End),
        GlobalType::RecursiveCall { variable } => Ok(RelativeType::RecursiveCall {
            variable: variable.clone(),
        }),
        GlobalType::RecursionDefinition {
            variable,
            continuation,
        } => {
            let body = relative_projection(p, q, continuation)?;
            if body.is_contractive(variable) {
                Ok(RelativeType::RecursionDefinition {
                    variable: variable.clone(),
                    continuation: Box::new(body),
                })
            } else {
                // The loop produces no observable action for this pair
                Ok(RelativeType::End)
            }
        }
        GlobalType::Exchange {
            sender,
            receiver,
            branches,
        } => {
            if (p == sender && q == receiver) || (q == sender && p == receiver) {
                let mut projected = IndexMap::with_capacity(branches.len());
                for (label, branch) in branches {
                    projected.insert(
                        label.clone(),
                        RelativeBranch {
                            value_type: branch.value_type,
                            continuation: relative_projection(p, q, &branch.continuation)?,
                        },
                    );
                }
                Ok(RelativeType::Exchange {
                    sender: sender.clone(),
                    branches: projected,
                })
            } else {
                ddep(p, q, sender, receiver, branches).map(DependencyAnalysis::into_relative)
            }
        }
    }
}

/// Dependency analysis for an exchange the pair does not directly perform.
///
/// Projects every branch continuation under `(p, q)`; if the projections are
/// all structurally equal the choice is invisible and the shared projection
/// is returned directly. Otherwise the pair depends on the outcome: the
/// dependency is an `OUTPUT` when one of the pair is the sender, an `INPUT`
/// when one is the receiver, and undefined when neither holds.
pub fn ddep(
    p: &str,
    q: &str,
    sender: &ParticipantId,
    receiver: &ParticipantId,
    branches: &IndexMap<String, Branch>,
) -> Result<DependencyAnalysis, ProjectionError> {
    let mut projected = IndexMap::with_capacity(branches.len());
    for (label, branch) in branches {
        projected.insert(
            label.clone(),
            relative_projection(p, q, &branch.continuation)?,
        );
    }

    let mut values = projected.values();
    if let Some(first) = values.next() {
        if values.all(|r| r == first) {
            return Ok(DependencyAnalysis::Uniform(first.clone()));
        }
    }

    let kind = if p == sender || q == sender {
        DependencyKind::Output
    } else if p == receiver || q == receiver {
        DependencyKind::Input
    } else {
        return Err(ProjectionError::UndefinedRelativeType {
            p: p.to_string(),
            q: q.to_string(),
            sender: sender.clone(),
            receiver: receiver.clone(),
        });
    };

    Ok(DependencyAnalysis::Diverging(RelativeType::Dependency {
        sender: sender.clone(),
        receiver: receiver.clone(),
        kind,
        branches: projected,
    }))
}

/// Relative well-formedness: every unordered pair of participants must have a
/// defined relative projection.
pub fn check_relative_wellformedness(
    global: &GlobalType,
    participants: &IndexMap<ParticipantId, String>,
) -> Result<(), ProjectionError> {
    let names: Vec<&ParticipantId> = participants.keys().collect();
    for (i, p) in names.iter().enumerate() {
        for q in &names[i + 1..] {
            relative_projection(p, q, global)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use switchboard_types::ValueType;

    fn participants(names: &[&str]) -> IndexMap<ParticipantId, String> {
        names
            .iter()
            .map(|n| (n.to_string(), format!("http://localhost/{}", n)))
            .collect()
    }

    // c chooses login or quit; on login, s and a exchange a password.
    fn login_protocol() -> GlobalType {
        GlobalType::exchange(
            "c",
            "s",
            [
                (
                    "login".to_string(),
                    Branch::unit(GlobalType::exchange(
                        "s",
                        "a",
                        [(
                            "passwd".to_string(),
                            Branch::new(ValueType::Str, GlobalType::End),
                        )],
                    )),
                ),
                ("quit".to_string(), Branch::unit(GlobalType::End)),
            ],
        )
    }

    #[test]
    fn direct_exchange_projects_to_exchange() {
        let rel = relative_projection("c", "s", &login_protocol()).unwrap();
        assert_matches!(rel, RelativeType::Exchange { sender, branches } => {
            assert_eq!(sender, "c");
            assert_eq!(branches.len(), 2);
        });
    }

    #[test]
    fn bystander_pair_gets_an_input_dependency() {
        // (s, a) do not perform c -> s, but the branches diverge for them:
        // only the login branch contains their password exchange. s is the
        // receiver of the choice, so the dependency is an input.
        let rel = relative_projection("s", "a", &login_protocol()).unwrap();
        assert_matches!(rel, RelativeType::Dependency { sender, receiver, kind, branches } => {
            assert_eq!(sender, "c");
            assert_eq!(receiver, "s");
            assert_eq!(kind, DependencyKind::Input);
            assert_matches!(&branches["quit"], RelativeType::End);
            assert_matches!(&branches["login"], RelativeType::Exchange { .. });
        });
    }

    #[test]
    fn identical_branches_collapse_to_no_dependency() {
        // Both branches continue identically for (c, a), so the choice made
        // between c and s must stay invisible to the pair.
        let g = GlobalType::exchange(
            "c",
            "s",
            [
                (
                    "left".to_string(),
                    Branch::unit(GlobalType::send("c", "a", "done", GlobalType::End)),
                ),
                (
                    "right".to_string(),
                    Branch::unit(GlobalType::send("c", "a", "done", GlobalType::End)),
                ),
            ],
        );
        assert_matches!(&g, GlobalType::Exchange { sender, receiver, branches } => {
            let analysis = ddep("c", "a", sender, receiver, branches).unwrap();
            assert!(!analysis.is_dependency());
            assert_matches!(analysis.into_relative(), RelativeType::Exchange { .. });
        });
    }

    #[test]
    fn invisible_loop_collapses_to_end() {
        // The loop body only ever talks between c and s; for (c, a) the body
        // projects to a bare recursive call, which is not contractive.
        let g = GlobalType::rec(
            "t",
            GlobalType::send("c", "s", "ping", GlobalType::call("t")),
        );
        let rel = relative_projection("c", "a", &g).unwrap();
        assert_eq!(rel, RelativeType::End);
    }

    #[test]
    fn visible_loop_keeps_its_definition() {
        let g = GlobalType::rec(
            "t",
            GlobalType::send("c", "s", "ping", GlobalType::call("t")),
        );
        let rel = relative_projection("c", "s", &g).unwrap();
        assert_matches!(rel, RelativeType::RecursionDefinition { variable, continuation } => {
            assert_eq!(variable, "t");
            assert_matches!(*continuation, RelativeType::Exchange { .. });
        });
    }

    #[test]
    fn undefined_relative_type_is_an_error() {
        // (a, b) are both bystanders of c -> s, yet the branches diverge for
        // them; no relative type exists.
        let g = GlobalType::exchange(
            "c",
            "s",
            [
                (
                    "left".to_string(),
                    Branch::unit(GlobalType::send("a", "b", "x", GlobalType::End)),
                ),
                ("right".to_string(), Branch::unit(GlobalType::End)),
            ],
        );
        assert_matches!(
            relative_projection("a", "b", &g),
            Err(ProjectionError::UndefinedRelativeType { p, q, .. }) => {
                assert_eq!(p, "a");
                assert_eq!(q, "b");
            }
        );
    }

    #[test]
    fn wellformedness_enumerates_every_pair() {
        let g = GlobalType::exchange(
            "c",
            "s",
            [
                (
                    "left".to_string(),
                    Branch::unit(GlobalType::send("a", "b", "x", GlobalType::End)),
                ),
                ("right".to_string(), Branch::unit(GlobalType::End)),
            ],
        );
        // The (a, b) pair has no defined projection, so the check must fail
        // even though every pair involving c or s is fine.
        let result = check_relative_wellformedness(&g, &participants(&["c", "s", "a", "b"]));
        assert_matches!(result, Err(ProjectionError::UndefinedRelativeType { .. }));

        assert!(check_relative_wellformedness(&login_protocol(), &participants(&["c", "s", "a"]))
            .is_ok());
    }
}
