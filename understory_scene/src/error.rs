// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

use crate::types::NodeId;

/// Errors from structural scene edits.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    /// The id refers to a node that was removed (or never existed).
    #[error("node {0:?} is not alive")]
    StaleNode(NodeId),
    /// Reparenting would make a node its own ancestor.
    #[error("cannot move {node:?} beneath its own descendant {parent:?}")]
    Cycle {
        /// Node being moved.
        node: NodeId,
        /// Requested parent, which lies inside `node`'s subtree.
        parent: NodeId,
    },
}
