// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Interactive editing: viewport, history, snapping, crop and the
//! pointer-driven engine that ties them together.

pub mod crop;
pub mod engine;
pub mod history;
pub mod snap;
pub mod viewport;
