use dcaplot_types::{Assignment, WireAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MuteIntent {
    Mute,
    Unmute,
    /// Unassigned and reassigned in the same diff: it only moved, leave it sounding.
    KeepOn,
}

/// Coalesces assign/unassign events into at most one mute or unmute per assignment.
#[derive(Debug, Default)]
pub(crate) struct MuteScratch {
    entries: Vec<(Assignment, MuteIntent)>,
}

impl MuteScratch {
    pub fn assigned(&mut self, assignment: Assignment) {
        self.upgrade(assignment, MuteIntent::Unmute, MuteIntent::Mute);
    }

    pub fn unassigned(&mut self, assignment: Assignment) {
        self.upgrade(assignment, MuteIntent::Mute, MuteIntent::Unmute);
    }

    fn upgrade(&mut self, assignment: Assignment, wanted: MuteIntent, opposite: MuteIntent) {
        match self.entries.iter_mut().find(|(a, _)| *a == assignment) {
            Some((_, intent)) if *intent == opposite => *intent = MuteIntent::KeepOn,
            Some(_) => {}
            None => self.entries.push((assignment, wanted)),
        }
    }

    /// Mute/unmute actions in first-touched order.
    pub fn into_actions(self) -> impl Iterator<Item = WireAction> {
        self.entries.into_iter().filter_map(|(a, intent)| match intent {
            MuteIntent::Mute => Some(WireAction::mute(a)),
            MuteIntent::Unmute => Some(WireAction::unmute(a)),
            MuteIntent::KeepOn => None,
        })
    }
}
