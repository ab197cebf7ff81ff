// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Full project export.
//!
//! Writes every primary image (cropped when a crop is active) into an
//! `images/` subfolder together with a project file whose coordinates are
//! relative to those exported images.
//!
//! The export folder must differ from the project folder: the exported
//! project file carries crop-shifted points under the session file's name.

use super::media;
use super::scanner::SkippedFile;
use super::serialization::{build_export, export_json, PROJECT_FILE_NAME};
use crate::models::polygon::Point;
use crate::models::scene::Scene;
use crate::util::geometry::Rect;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Subfolder receiving the exported images.
pub const IMAGES_DIR: &str = "images";

/// What an export produced.
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    pub json_path: PathBuf,
    pub images_written: usize,
    pub failures: Vec<SkippedFile>,
}

/// Everything an export needs, owned so it can run off the UI thread.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub scenes: Vec<Scene>,
    pub crop: Option<Rect>,
    pub project_folder: PathBuf,
    pub out_dir: PathBuf,
}

impl ExportJob {
    pub fn run(&self) -> Result<ExportReport> {
        if same_folder(&self.out_dir, &self.project_folder) {
            bail!(
                "Refusing to export into the project folder {}; choose another folder",
                self.out_dir.display()
            );
        }
        export_project(&self.scenes, self.crop, &self.out_dir)
    }
}

/// Whether two paths name the same directory, resolving links when both exist.
pub fn same_folder(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Export images and shifted polygons into `out_dir`.
///
/// A scene whose image cannot be read or written is listed in the report; the
/// remaining scenes are still exported.
pub fn export_project(scenes: &[Scene], crop: Option<Rect>, out_dir: &Path) -> Result<ExportReport> {
    let images_dir = out_dir.join(IMAGES_DIR);
    std::fs::create_dir_all(&images_dir)
        .with_context(|| format!("Failed to create {}", images_dir.display()))?;

    let crop = crop.map(|r| r.normalized());
    let mut report = ExportReport {
        json_path: out_dir.join(PROJECT_FILE_NAME),
        ..ExportReport::default()
    };

    for scene in scenes {
        let name = scene.image_name();
        match export_image(scene, crop.as_ref(), &images_dir.join(&name)) {
            Ok(()) => report.images_written += 1,
            Err(e) => {
                log::warn!("Failed to export image {name}: {e:#}");
                report.failures.push(SkippedFile {
                    file: name,
                    reason: format!("{e:#}"),
                });
            }
        }
    }

    let origin = crop.map_or(Point::ZERO, |r| r.min);
    export_json(&build_export(scenes, origin), &report.json_path)?;
    log::info!(
        "Exported {} images and {} to {}",
        report.images_written,
        report.json_path.display(),
        out_dir.display()
    );
    Ok(report)
}

fn export_image(scene: &Scene, crop: Option<&Rect>, target: &Path) -> Result<()> {
    let img = media::decode(&scene.image_path)?;
    let img = match crop {
        Some(rect) => media::crop(&img, rect).context("Crop lies outside the image")?,
        None => img,
    };
    media::save_image(&img, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::serialization::import_json;
    use crate::models::polygon::PolygonObject;
    use image::{Rgb, RgbImage};

    fn scene_in(dir: &Path) -> Scene {
        let image_path = dir.join("10000.png");
        RgbImage::from_pixel(100, 80, Rgb([10, 20, 30])).save(&image_path).unwrap();
        let mut scene = Scene::new(image_path);
        scene.objects.push(PolygonObject::new(
            "Roof".to_string(),
            "roof0000.png".to_string(),
            vec![Point::new(20.0, 20.0), Point::new(60.0, 20.0), Point::new(40.0, 50.0)],
        ));
        scene
    }

    #[test]
    fn test_export_with_crop_shifts_points() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let scenes = vec![scene_in(src.path())];
        let crop = Rect::new(Point::new(10.0, 10.0), Point::new(70.0, 60.0));

        let report = export_project(&scenes, Some(crop), out.path()).unwrap();
        assert_eq!(report.images_written, 1);
        assert!(report.failures.is_empty());

        let entries = import_json(&report.json_path).unwrap();
        let exported = &entries[0].objects[0].points;
        for (orig, shifted) in scenes[0].objects[0].points.iter().zip(exported) {
            assert_eq!(*shifted, *orig - Point::new(10.0, 10.0));
        }
        // Stored points are untouched.
        assert_eq!(scenes[0].objects[0].points[0], Point::new(20.0, 20.0));

        let img = media::decode(&out.path().join(IMAGES_DIR).join("10000.png")).unwrap().into_rgb8();
        assert_eq!(img.dimensions(), (60, 50));
    }

    #[test]
    fn test_export_without_crop_copies_full_image() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let scenes = vec![scene_in(src.path())];
        let report = export_project(&scenes, None, out.path()).unwrap();

        let entries = import_json(&report.json_path).unwrap();
        assert_eq!(entries[0].objects[0].points, scenes[0].objects[0].points);
        let img = media::decode(&out.path().join(IMAGES_DIR).join("10000.png")).unwrap().into_rgb8();
        assert_eq!(img.dimensions(), (100, 80));
    }

    #[test]
    fn test_missing_image_is_reported_not_fatal() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let mut missing = scene_in(src.path());
        missing.image_path = src.path().join("10001.png");
        let scenes = vec![scene_in(src.path()), missing];

        let report = export_project(&scenes, None, out.path()).unwrap();
        assert_eq!(report.images_written, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].file, "10001.png");
        assert_eq!(import_json(&report.json_path).unwrap().len(), 2);
    }

    #[test]
    fn test_export_into_project_folder_is_refused() {
        let src = tempfile::tempdir().unwrap();
        let scenes = vec![scene_in(src.path())];
        let session = src.path().join(PROJECT_FILE_NAME);
        crate::io::serialization::save_project_json(&scenes, &session).unwrap();
        let before = std::fs::read_to_string(&session).unwrap();

        let job = ExportJob {
            scenes: scenes.clone(),
            crop: Some(Rect::new(Point::new(10.0, 10.0), Point::new(70.0, 60.0))),
            project_folder: src.path().to_path_buf(),
            out_dir: src.path().join("."),
        };
        let err = job.run().unwrap_err();
        assert!(err.to_string().contains("project folder"));
        assert_eq!(std::fs::read_to_string(&session).unwrap(), before);
        assert!(!src.path().join(IMAGES_DIR).exists());
    }

    #[test]
    fn test_export_job_writes_to_other_folder() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let job = ExportJob {
            scenes: vec![scene_in(src.path())],
            crop: None,
            project_folder: src.path().to_path_buf(),
            out_dir: out.path().to_path_buf(),
        };
        let report = job.run().unwrap();
        assert_eq!(report.json_path, out.path().join(PROJECT_FILE_NAME));
        assert!(!src.path().join(PROJECT_FILE_NAME).exists());
    }
}
