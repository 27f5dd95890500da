use crate::action::SyncAction;
use crate::matcher::{JoinPlan, Pairing};

/// Classified pairing: the action plus the comparison columns that differ
/// (provided-side names; empty unless UPDATE).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified<'a> {
    pub action: SyncAction,
    pub pairing: Pairing<'a>,
    pub changed: Vec<String>,
}

/// Assign an action to every pairing.
///
/// - provided only → ADD
/// - matched, some comparison column differs → UPDATE
/// - matched, all comparison columns equal → KEEP
/// - current only → DELETE
pub fn classify<'a>(pairings: &[Pairing<'a>], plan: &JoinPlan) -> Vec<Classified<'a>> {
    pairings
        .iter()
        .map(|&pairing| {
            let (action, changed) = match pairing {
                Pairing::ProvidedOnly(_) => (SyncAction::Add, Vec::new()),
                Pairing::CurrentOnly(_) => (SyncAction::Delete, Vec::new()),
                Pairing::Matched { provided, current } => {
                    let changed: Vec<String> = plan
                        .comparisons
                        .iter()
                        .filter(|(p, c)| !provided.value(p).same_as(current.value(c)))
                        .map(|(p, _)| p.clone())
                        .collect();
                    if changed.is_empty() {
                        (SyncAction::Keep, changed)
                    } else {
                        (SyncAction::Update, changed)
                    }
                }
            };
            Classified {
                action,
                pairing,
                changed,
            }
        })
        .collect()
}
