// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI panels: canvas, toolbar and object catalog.

pub mod canvas;
pub mod properties;
pub mod toolbar;
