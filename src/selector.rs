//! Fairness-weighted selection over a roster snapshot.
//!
//! Every function here takes a roster by reference and returns a new one; nothing is
//! stored. Persisting the result is the caller's job.

use rand::Rng;
use tracing::debug;
use tracing::warn;
use uuid::Uuid;

use crate::types::Member;
use crate::types::MemberChance;
use crate::types::Roster;
use crate::types::Selection;
use crate::types::INCREMENT_WEIGHT;
use crate::types::SELECTED_WEIGHT;

/// Append a member named `name` (trimmed) with a fresh UUID.
///
/// Blank names leave the roster unchanged.
pub fn add_member(roster: &Roster, name: &str) -> Roster {
    add_member_with_id(roster, name, Uuid::new_v4().to_string())
}

/// Same as [`add_member`] with a caller-supplied id. An id already in the roster is
/// rejected the same way a blank name is.
pub fn add_member_with_id(roster: &Roster, name: &str, id: impl Into<String>) -> Roster {
    let name = name.trim();
    if name.is_empty() {
        debug!("Ignoring add with blank name");
        return roster.clone();
    }

    let id = id.into();
    if roster.get(&id).is_some() {
        debug!("Ignoring add with duplicate id {}", id);
        return roster.clone();
    }

    let mut members = roster.members().to_vec();
    members.push(Member::new(id, name));
    Roster::new(members)
}

/// Drop the member with `id`. Unknown ids are a no-op.
pub fn remove_member(roster: &Roster, id: &str) -> Roster {
    roster
        .iter()
        .filter(|m| m.id != id)
        .cloned()
        .collect::<Vec<_>>()
        .into()
}

/// Pick one member, biased by weight, and apply the fairness rule.
///
/// Returns `selected: None` only for an empty roster.
pub fn select_fairly<R: Rng + ?Sized>(roster: &Roster, rng: &mut R) -> Selection {
    if roster.is_empty() {
        return Selection {
            selected: None,
            roster: roster.clone(),
        };
    }

    let total = roster.total_weight();
    if total > 0.0 && total.is_finite() {
        let r = rng.gen::<f64>() * total;
        return select_with_draw(roster, r);
    }

    // Weights are corrupt: every member gets the same chance.
    warn!(
        "Roster total weight is {}, falling back to uniform choice over {} members",
        total,
        roster.len()
    );
    let index = rng.gen_range(0..roster.len());
    reweight(roster, index)
}

/// Deterministic half of [`select_fairly`]: select with an explicit draw
/// `r` in `[0, total_weight)`.
pub fn select_with_draw(roster: &Roster, r: f64) -> Selection {
    match pick_index(roster.members(), r) {
        Some(index) => reweight(roster, index),
        None => Selection {
            selected: None,
            roster: roster.clone(),
        },
    }
}

/// Walk `members` in order subtracting weights from `r`; the first member that
/// takes the remainder to `<= 0` wins. Rounding leftovers land on the last member.
pub fn pick_index(members: &[Member], r: f64) -> Option<usize> {
    if members.is_empty() {
        return None;
    }

    let mut remaining = r;
    for (index, member) in members.iter().enumerate() {
        remaining -= member.weight;
        if remaining <= 0.0 {
            return Some(index);
        }
    }

    Some(members.len() - 1)
}

/// Apply the fairness rule around the member at `index`.
fn reweight(roster: &Roster, index: usize) -> Selection {
    let members: Vec<Member> = roster
        .iter()
        .enumerate()
        .map(|(i, member)| {
            let weight = if i == index {
                SELECTED_WEIGHT
            } else {
                member.weight + INCREMENT_WEIGHT
            };
            Member {
                weight,
                ..member.clone()
            }
        })
        .collect();

    let selected = roster.members().get(index).cloned();
    if let Some(member) = &selected {
        debug!(
            "Selected {} ({}) with weight {}",
            member.name, member.id, member.weight
        );
    }

    Selection {
        selected,
        roster: Roster::new(members),
    }
}

/// Chance of `member` being picked next, e.g. `"25.0%"`.
pub fn chance_percent(roster: &Roster, member: &Member) -> String {
    let total = roster.total_weight();
    if total == 0.0 {
        return "0%".to_string();
    }
    format!("{:.1}%", member.weight / total * 100.0)
}

/// Display rows for every member, in roster order.
pub fn chances(roster: &Roster) -> Vec<MemberChance> {
    roster
        .iter()
        .map(|member| MemberChance {
            member: member.clone(),
            chance: chance_percent(roster, member),
        })
        .collect()
}
