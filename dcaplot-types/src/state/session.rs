use serde::{Deserialize, Serialize};

use crate::Assignment;

pub const DEFAULT_BUS_COUNT: usize = 8;
pub const MAX_BUSES: usize = 64;

/// A named input or fx return. Channels without an entry fall back to a numbered default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub number: u32,
    pub name: String,
}

/// A role stands for one of several sources, e.g. "Lead" played by whichever singer is on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub options: Vec<Assignment>,
    #[serde(default)]
    pub default: Option<Assignment>,
    /// Option currently in use. Kept across config refreshes while still valid.
    #[serde(default)]
    pub current: Option<Assignment>,
}

/// A fixed group of sources that move together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoirConfig {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub members: Vec<Assignment>,
}

/// Role and choir definitions handed to the group resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    #[serde(default)]
    pub roles: Vec<RoleConfig>,
    #[serde(default)]
    pub choirs: Vec<ChoirConfig>,
}

impl GroupConfig {
    pub fn role(&self, id: u32) -> Option<&RoleConfig> {
        self.roles.iter().find(|r| r.id == id)
    }

    pub fn role_mut(&mut self, id: u32) -> Option<&mut RoleConfig> {
        self.roles.iter_mut().find(|r| r.id == id)
    }

    pub fn choir(&self, id: u32) -> Option<&ChoirConfig> {
        self.choirs.iter().find(|c| c.id == id)
    }
}

/// Per-show settings: bus count, channel names and groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub bus_count: usize,
    #[serde(default)]
    pub inputs: Vec<ChannelInfo>,
    #[serde(default)]
    pub fx: Vec<ChannelInfo>,
    #[serde(flatten)]
    pub groups: GroupConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_COUNT)
    }
}

impl SessionConfig {
    pub fn new(bus_count: usize) -> Self {
        Self {
            bus_count: bus_count.min(MAX_BUSES),
            inputs: Vec::new(),
            fx: Vec::new(),
            groups: GroupConfig::default(),
        }
    }

    /// Human-readable name for an assignment.
    pub fn display_name(&self, assignment: Assignment) -> String {
        use crate::SourceKind;

        let n = assignment.number();
        match assignment.kind() {
            SourceKind::Input => self
                .inputs
                .iter()
                .find(|c| c.number == n)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| format!("Microphone {}", n)),
            SourceKind::Fx => self
                .fx
                .iter()
                .find(|c| c.number == n)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| format!("FX {}", n)),
            SourceKind::Role => self
                .groups
                .role(n)
                .map(|r| r.name.clone())
                .unwrap_or_else(|| format!("Role {}", n)),
            SourceKind::Choir => self
                .groups
                .choir(n)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| format!("Choir {}", n)),
        }
    }

    /// "<id> : <name>" label used in listings.
    pub fn assignment_label(&self, assignment: Assignment) -> String {
        format!("{} : {}", assignment, self.display_name(assignment))
    }
}
