// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Mask processing: contour tracing and polygon simplification.

pub mod contour;
pub mod simplify;
