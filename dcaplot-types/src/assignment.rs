use serde::{Deserialize, Serialize};

/// What an assignment points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Direct input channel
    Input,
    /// Effects return
    Fx,
    /// Indirect: whichever option the role currently selects
    Role,
    /// Indirect: every member of a choir group
    Choir,
}

impl SourceKind {
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Input => "input",
            SourceKind::Fx => "fx",
            SourceKind::Role => "role",
            SourceKind::Choir => "choir",
        }
    }

    /// Roles and choirs resolve to other assignments at diff time.
    pub fn is_group(self) -> bool {
        matches!(self, SourceKind::Role | SourceKind::Choir)
    }
}

/// A source reference that can sit on a bus. Serialized as `["input", 5]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Assignment(pub SourceKind, pub u32);

impl Assignment {
    pub fn input(number: u32) -> Self {
        Self(SourceKind::Input, number)
    }

    pub fn fx(number: u32) -> Self {
        Self(SourceKind::Fx, number)
    }

    pub fn role(number: u32) -> Self {
        Self(SourceKind::Role, number)
    }

    pub fn choir(number: u32) -> Self {
        Self(SourceKind::Choir, number)
    }

    pub fn kind(self) -> SourceKind {
        self.0
    }

    pub fn number(self) -> u32 {
        self.1
    }

    pub fn is_group(self) -> bool {
        self.0.is_group()
    }
}

impl std::fmt::Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.0.label(), self.1)
    }
}

/// Resolved opinion of one record about one assignment on one bus.
///
/// `Assign`/`Unassign` are explicit choices made by the record itself; `None` marks an
/// entry carried over from the predecessor that this record did not touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignState {
    Assign,
    Unassign,
    None,
}

impl AssignState {
    pub fn is_explicit(self) -> bool {
        !matches!(self, AssignState::None)
    }

    /// ASSIGN and NONE both mean the assignment is wanted on the bus.
    pub fn is_wanted(self) -> bool {
        !matches!(self, AssignState::Unassign)
    }
}
