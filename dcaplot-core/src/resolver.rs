//! Group resolver: turns role and choir references into concrete assignments.

use std::collections::HashMap;

use dcaplot_types::{Assignment, GroupConfig, RoleConfig, SourceKind};

/// Nesting depth at which a group that refers to further groups is cut off.
const MAX_DEPTH: usize = 4;

/// Snapshot of the group configuration plus precomputed expansions.
///
/// The expansion cache is rebuilt on every `renew`, so lookups never see a stale config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupResolver {
    config: GroupConfig,
    expansions: HashMap<Assignment, Vec<Assignment>>,
}

impl GroupResolver {
    pub fn new(config: GroupConfig) -> Self {
        let mut resolver = Self::default();
        resolver.renew(config);
        resolver
    }

    pub fn config(&self) -> &GroupConfig {
        &self.config
    }

    /// Replace the configuration. A role keeps its current choice if that choice is still
    /// one of its options; otherwise it falls back to its default, then its first option.
    pub fn renew(&mut self, mut config: GroupConfig) {
        for role in &mut config.roles {
            let previous = self
                .config
                .role(role.id)
                .and_then(|old| old.current)
                .filter(|c| role.options.contains(c));
            role.current = previous
                .or(role.current.filter(|c| role.options.contains(c)))
                .or(role.default.filter(|d| role.options.contains(d)))
                .or_else(|| role.options.first().copied());
        }
        self.config = config;
        self.rebuild();
    }

    /// Point a role at one of its options. Returns false for an unknown role or option.
    pub fn set_role_choice(&mut self, role: u32, choice: Assignment) -> bool {
        let Some(config) = self.config.role_mut(role) else {
            log::warn!(target: "resolver", "unknown role {}", role);
            return false;
        };
        if !config.options.contains(&choice) {
            log::warn!(target: "resolver", "{} is not an option of role {}", choice, role);
            return false;
        }
        if config.current == Some(choice) {
            return false;
        }
        config.current = Some(choice);
        self.rebuild();
        true
    }

    pub fn role_choice(&self, role: u32) -> Option<Assignment> {
        self.config.role(role).and_then(|r| r.current)
    }

    /// Concrete assignments behind `assignment`. Inputs and fx returns expand to themselves;
    /// an unknown group expands to nothing.
    pub fn expand(&self, assignment: Assignment) -> Vec<Assignment> {
        if !assignment.is_group() {
            return vec![assignment];
        }
        match self.expansions.get(&assignment) {
            Some(members) => members.clone(),
            None => {
                log::debug!(target: "resolver", "no expansion for {}", assignment);
                Vec::new()
            }
        }
    }

    fn rebuild(&mut self) {
        let mut expansions = HashMap::new();
        for role in &self.config.roles {
            let key = Assignment(SourceKind::Role, role.id);
            expansions.insert(key, self.resolve(key, 0));
        }
        for choir in &self.config.choirs {
            let key = Assignment(SourceKind::Choir, choir.id);
            expansions.insert(key, self.resolve(key, 0));
        }
        self.expansions = expansions;
    }

    fn resolve(&self, assignment: Assignment, depth: usize) -> Vec<Assignment> {
        if assignment.is_group() && depth >= MAX_DEPTH {
            log::warn!(target: "resolver", "{} nests too deep; ignored", assignment);
            return Vec::new();
        }
        let members: Vec<Assignment> = match assignment.kind() {
            SourceKind::Role => self
                .config
                .role(assignment.number())
                .and_then(|r: &RoleConfig| r.current)
                .into_iter()
                .collect(),
            SourceKind::Choir => self
                .config
                .choir(assignment.number())
                .map(|c| c.members.clone())
                .unwrap_or_default(),
            SourceKind::Input | SourceKind::Fx => return vec![assignment],
        };

        let mut out = Vec::new();
        for member in members {
            for concrete in self.resolve(member, depth + 1) {
                if !out.contains(&concrete) {
                    out.push(concrete);
                }
            }
        }
        out
    }
}
