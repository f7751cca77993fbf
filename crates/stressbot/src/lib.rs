// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! stressbot library
//!
//! Orchestration around `stressbot-parser`: filing issues for tests that fail
//! under stress and queueing stress builds. The bug tracker and build server
//! are reached through the traits in [`tracker`].

pub mod commands;
pub mod config;
pub mod poster;
pub mod tracker;
pub mod trigger;
