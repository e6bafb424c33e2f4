use serde::{Deserialize, Serialize};

/// Weight given to a freshly added member.
pub const BASE_WEIGHT: f64 = 10.0;
/// Weight a member drops to right after being picked.
pub const SELECTED_WEIGHT: f64 = 1.0;
/// Weight every non-picked member gains per selection.
pub const INCREMENT_WEIGHT: f64 = 1.0;

/// A single roster entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Unique within the roster.
    pub id: String,
    pub name: String,
    /// Proportional to the member's chance of being picked next.
    pub weight: f64,
}

impl Member {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            weight: BASE_WEIGHT,
        }
    }
}

/// Ordered collection of members. Order is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    members: Vec<Member>,
}

impl Roster {
    pub fn new(members: Vec<Member>) -> Self {
        Self { members }
    }

    /// Roster every store falls back to when it holds nothing.
    pub fn seeded() -> Self {
        Self::new(vec![
            Member::new("1", "Alice"),
            Member::new("2", "Bob"),
            Member::new("3", "Charlie"),
            Member::new("4", "Diana"),
        ])
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn into_members(self) -> Vec<Member> {
        self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn total_weight(&self) -> f64 {
        self.members.iter().map(|m| m.weight).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Member> {
        self.members.iter()
    }
}

impl From<Vec<Member>> for Roster {
    fn from(members: Vec<Member>) -> Self {
        Self::new(members)
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Member;
    type IntoIter = std::slice::Iter<'a, Member>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

/// Outcome of one fair selection: who was picked and the reweighted roster.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub selected: Option<Member>,
    pub roster: Roster,
}

/// One display row: a member and its current chance of being picked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberChance {
    pub member: Member,
    pub chance: String,
}
