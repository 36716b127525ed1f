// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gl-storage: scene persistence contract and reference implementation

mod memory;
mod repository;

pub use memory::MemoryRepository;
pub use repository::{SceneRepository, StorageError, MAX_EXECUTION_LIST_LIMIT};
