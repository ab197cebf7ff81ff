// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Scenes: one primary image and the polygons found for it.

use super::polygon::PolygonObject;
use super::registry::NameSettings;
use std::path::PathBuf;

/// Stable identity of a polygon inside a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PolygonId {
    pub scene: usize,
    pub polygon: usize,
}

impl PolygonId {
    pub fn new(scene: usize, polygon: usize) -> Self {
        Self { scene, polygon }
    }
}

/// A primary image with its polygon objects.
#[derive(Debug, Clone)]
pub struct Scene {
    pub image_path: PathBuf,
    pub objects: Vec<PolygonObject>,
}

impl Scene {
    pub fn new(image_path: PathBuf) -> Self {
        Self {
            image_path,
            objects: Vec::new(),
        }
    }

    /// File name of the primary image.
    pub fn image_name(&self) -> String {
        self.image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn polygon(&self, index: usize) -> Option<&PolygonObject> {
        self.objects.get(index)
    }

    pub fn polygon_mut(&mut self, index: usize) -> Option<&mut PolygonObject> {
        self.objects.get_mut(index)
    }

    /// Indices of polygons carrying `name`.
    pub fn indices_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.objects
            .iter()
            .enumerate()
            .filter(move |(_, obj)| obj.name == name)
            .map(|(i, _)| i)
    }
}

/// One row of the per-scene object catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEntry {
    /// A real polygon of the scene.
    Present {
        polygon: usize,
        name: String,
        settings: NameSettings,
    },
    /// A name known elsewhere in the project with no polygon in this scene.
    Absent { name: String, settings: NameSettings },
}

impl CatalogEntry {
    pub fn name(&self) -> &str {
        match self {
            CatalogEntry::Present { name, .. } | CatalogEntry::Absent { name, .. } => name,
        }
    }

    pub fn settings(&self) -> &NameSettings {
        match self {
            CatalogEntry::Present { settings, .. } | CatalogEntry::Absent { settings, .. } => {
                settings
            }
        }
    }

    pub fn polygon(&self) -> Option<usize> {
        match self {
            CatalogEntry::Present { polygon, .. } => Some(*polygon),
            CatalogEntry::Absent { .. } => None,
        }
    }
}
