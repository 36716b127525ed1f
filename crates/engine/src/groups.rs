// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Action grouping: carve an ordered action list into concurrent batches.

use gl_core::SceneAction;

/// Split actions into groups that run concurrently within themselves and
/// strictly in order between themselves.
///
/// The first action always opens a group. Each later action joins the
/// current group when `parallel` is set and opens a new one otherwise, so
/// `[A, B(par), C(par), D, E(par)]` becomes `[[A, B, C], [D, E]]`.
pub fn group_actions(actions: &[SceneAction]) -> Vec<Vec<SceneAction>> {
    let mut groups: Vec<Vec<SceneAction>> = Vec::new();
    for action in actions {
        match groups.last_mut() {
            Some(group) if action.parallel => group.push(action.clone()),
            _ => groups.push(vec![action.clone()]),
        }
    }
    groups
}

#[cfg(test)]
#[path = "groups_tests.rs"]
mod tests;
