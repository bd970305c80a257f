//! Consistency passes run on the multiplexer's composed draft.
//!
//! Each pass reads the draft produced by the independent slice reducers and
//! may move the selection (and, for renames, the selected substate). They run
//! in [`SettlePass::ALL`] order.

use crate::multiplexer::{MultiplexerConfig, MultiplexerState};
use tabula_types::Event;

/// A named selection rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlePass {
    /// An "added" or "fetched" event with nothing selected selects the first
    /// listed id.
    AutoSelect,
    /// A "removed" event that removed the selected id selects the first
    /// remaining id, or nothing.
    ReselectOnRemoval,
    /// A "confirmed" rename of the selected id moves the selection and its
    /// substate to the new id, once the order lists the new id.
    FollowRename,
    /// A "cleared" event drops the selection.
    ReleaseOnClear,
}

impl SettlePass {
    pub const ALL: [SettlePass; 4] = [
        SettlePass::AutoSelect,
        SettlePass::ReselectOnRemoval,
        SettlePass::FollowRename,
        SettlePass::ReleaseOnClear,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SettlePass::AutoSelect => "auto_select",
            SettlePass::ReselectOnRemoval => "reselect_on_removal",
            SettlePass::FollowRename => "follow_rename",
            SettlePass::ReleaseOnClear => "release_on_clear",
        }
    }

    pub fn apply<S>(
        self,
        config: &MultiplexerConfig,
        event: &Event,
        draft: &mut MultiplexerState<S>,
    ) {
        match self {
            SettlePass::AutoSelect => auto_select(config, event, draft),
            SettlePass::ReselectOnRemoval => reselect_on_removal(config, event, draft),
            SettlePass::FollowRename => follow_rename(config, event, draft),
            SettlePass::ReleaseOnClear => release_on_clear(config, event, draft),
        }
    }
}

pub fn auto_select<S>(
    config: &MultiplexerConfig,
    event: &Event,
    draft: &mut MultiplexerState<S>,
) {
    let kind = event.kind.as_str();
    if !(config.added.contains(kind) || config.fetched.contains(kind)) {
        return;
    }
    if draft.selected.is_none() {
        draft.selected = draft.order.first().cloned();
    }
}

pub fn reselect_on_removal<S>(
    config: &MultiplexerConfig,
    event: &Event,
    draft: &mut MultiplexerState<S>,
) {
    if !config.removed.contains(&event.kind) {
        return;
    }
    let lost = draft
        .selected
        .as_ref()
        .is_some_and(|selected| !draft.order.contains(selected));
    if lost {
        draft.selected = draft.order.first().cloned();
    }
}

pub fn follow_rename<S>(
    config: &MultiplexerConfig,
    event: &Event,
    draft: &mut MultiplexerState<S>,
) {
    if !config.confirmed.contains(&event.kind) {
        return;
    }
    let (Some(old_id), Some(new_id)) = (event.payload_id("oldId"), event.payload_id("newId"))
    else {
        return;
    };
    if draft.selected.as_ref() != Some(&old_id) || old_id == new_id {
        return;
    }
    // The order only renames ids it lists; otherwise the selection stays put.
    if !draft.order.contains(&new_id) {
        return;
    }
    if let Some(substate) = draft.substates.remove(&old_id) {
        draft.substates.entry(new_id.clone()).or_insert(substate);
    }
    draft.selected = Some(new_id);
}

pub fn release_on_clear<S>(
    config: &MultiplexerConfig,
    event: &Event,
    draft: &mut MultiplexerState<S>,
) {
    if config.cleared.contains(&event.kind) {
        draft.selected = None;
    }
}
