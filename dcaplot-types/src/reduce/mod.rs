//! Pure live-state reducers.
//!
//! These are the only functions that mutate `LiveState`. The coordinator calls them when
//! committing delivered actions and when cancelling.
//!
//! Reducers are pure: they do not log delivery, touch the preview cache or talk to a sink.

mod live;

pub use live::clear_live;

use crate::{LiveState, WireAction};

/// Whether an action changes bus membership or names. Mute/unmute only reach the hardware.
pub fn is_committable(action: &WireAction) -> bool {
    matches!(
        action,
        WireAction::Assign { .. } | WireAction::Unassign { .. } | WireAction::Rename { .. }
    )
}

/// Apply one delivered action to `live`. Returns true if `live` changed.
pub fn reduce_wire(action: &WireAction, live: &mut LiveState) -> bool {
    live::reduce_live(action, live)
}

/// Apply actions in emitted order. Returns how many changed `live`.
pub fn commit_all<'a>(
    actions: impl IntoIterator<Item = &'a WireAction>,
    live: &mut LiveState,
) -> usize {
    actions
        .into_iter()
        .filter(|a| reduce_wire(a, live))
        .count()
}
