// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: polygons, scenes, the name registry and the project.

pub mod polygon;
pub mod project;
pub mod registry;
pub mod scene;
