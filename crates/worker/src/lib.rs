// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! leash-worker: cooperative controllable workers
//!
//! A [`Worker`] runs a user work routine on a dedicated execution thread and
//! is driven through start/stop/pause/resume/restart. Control is
//! cooperative: stop and pause take effect only at breakpoints the work
//! routine declares at safe points through its [`WorkerHandle`].

mod error;
mod observer;
mod state;
mod worker;

pub use error::{WorkError, WorkFailure, WorkerError};
pub use observer::WorkerObserver;
pub use state::{WorkerEvent, WorkerState};
pub use worker::{Worker, WorkerHandle};
