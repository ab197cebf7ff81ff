// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for images, masks and project files.

pub mod export;
pub mod media;
pub mod scanner;
pub mod serialization;
