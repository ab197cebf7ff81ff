// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project data serialization and deserialization.
//!
//! This module handles the JSON project file: one entry per scene with the
//! visible polygons of that scene.

use crate::models::polygon::{OptimizationMode, Point};
use crate::models::scene::Scene;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the session file written into (and re-read from) a scanned folder.
pub const PROJECT_FILE_NAME: &str = "final_data.json";

/// One exported polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportObject {
    pub name: String,
    pub original_mask: String,
    pub points: Vec<Point>,
    pub mode: OptimizationMode,
}

/// One exported scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEntry {
    pub image_name: String,
    pub objects: Vec<ExportObject>,
}

/// Build the export records for `scenes`.
///
/// Only visible polygons are included, and every point is shifted by
/// `-origin` so coordinates are relative to an exported crop.
pub fn build_export(scenes: &[Scene], origin: Point) -> Vec<ExportEntry> {
    scenes
        .iter()
        .map(|scene| ExportEntry {
            image_name: scene.image_name(),
            objects: scene
                .objects
                .iter()
                .filter(|obj| obj.visible)
                .map(|obj| ExportObject {
                    name: obj.name.clone(),
                    original_mask: obj.source_mask.clone(),
                    points: obj.points.iter().map(|p| *p - origin).collect(),
                    mode: obj.mode,
                })
                .collect(),
        })
        .collect()
}

/// Export project data to compact JSON.
pub fn export_json(data: &[ExportEntry], path: &Path) -> Result<()> {
    let json = serde_json::to_string(data)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Import project data from JSON.
pub fn import_json(path: &Path) -> Result<Vec<ExportEntry>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let data = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(data)
}

/// Write the session file with full-image coordinates.
pub fn save_project_json(scenes: &[Scene], path: &Path) -> Result<()> {
    export_json(&build_export(scenes, Point::ZERO), path)?;
    log::info!("Saved {} scenes to {}", scenes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::polygon::PolygonObject;
    use std::path::PathBuf;

    fn scene() -> Scene {
        let mut scene = Scene::new(PathBuf::from("/data/10000.jpg"));
        let mut roof = PolygonObject::new(
            "Roof".to_string(),
            "roof0000.png".to_string(),
            vec![Point::new(10.0, 10.0), Point::new(30.0, 10.0), Point::new(20.0, 25.5)],
        );
        roof.mode = OptimizationMode::Straight;
        let mut hidden = roof.clone();
        hidden.name = "Hidden".to_string();
        hidden.visible = false;
        scene.objects = vec![roof, hidden];
        scene
    }

    #[test]
    fn test_json_shape() {
        let entries = build_export(&[scene()], Point::ZERO);
        let json = serde_json::to_string(&entries).unwrap();
        assert_eq!(
            json,
            r#"[{"image_name":"10000.jpg","objects":[{"name":"Roof","original_mask":"roof0000.png","points":[[10.0,10.0],[30.0,10.0],[20.0,25.5]],"mode":"Straight"}]}]"#
        );
    }

    #[test]
    fn test_origin_shift() {
        let entries = build_export(&[scene()], Point::new(10.0, 10.0));
        assert_eq!(
            entries[0].objects[0].points,
            vec![Point::new(0.0, 0.0), Point::new(20.0, 0.0), Point::new(10.0, 15.5)]
        );
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_FILE_NAME);
        save_project_json(&[scene()], &path).unwrap();
        let back = import_json(&path).unwrap();
        assert_eq!(back, build_export(&[scene()], Point::ZERO));
    }

    #[test]
    fn test_import_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(import_json(&path).is_err());
    }
}
