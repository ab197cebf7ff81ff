// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Folder scanning and scene building.
//!
//! Primary images are named `1####.jpg|png|jpeg` (case-insensitive). The four
//! digits after the leading `1` are the frame signature; every other image
//! file whose stem ends with the same four digits is a mask of that frame.
//!
//! A previously saved project file in the folder is read first so that
//! names, modes and edited points chosen by the operator survive a rescan.

use super::serialization::{import_json, ExportObject, PROJECT_FILE_NAME};
use crate::models::polygon::{OptimizationMode, PolygonObject, MIN_VERTICES};
use crate::models::project::Project;
use crate::models::scene::Scene;
use crate::vision::contour::extract_contour_from_file;
use crate::vision::simplify::{simplify, visual_points};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Number of trailing digits shared by a primary image and its masks.
pub const SIGNATURE_LEN: usize = 4;

/// Extensions accepted for primary images.
pub const PRIMARY_EXTENSIONS: [&str; 3] = ["jpg", "png", "jpeg"];

/// Extensions considered when looking for masks.
pub const MASK_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// A file that could not be turned into a polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFile {
    pub file: String,
    pub reason: String,
}

/// Result of a folder scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub project: Project,
    pub skipped: Vec<SkippedFile>,
}

fn split_name(file_name: &str) -> (&str, Option<String>) {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext.to_ascii_lowercase())),
        None => (file_name, None),
    }
}

/// Whether `file_name` is a primary image (`1####.jpg|png|jpeg`).
pub fn is_primary_image(file_name: &str) -> bool {
    let (stem, ext) = split_name(file_name);
    let ext_ok = ext.is_some_and(|e| PRIMARY_EXTENSIONS.contains(&e.as_str()));
    ext_ok
        && stem.len() == SIGNATURE_LEN + 1
        && stem.starts_with('1')
        && stem.bytes().all(|b| b.is_ascii_digit())
}

/// Frame signature of a primary image: the last four digits of its stem.
pub fn frame_signature(primary: &str) -> Option<&str> {
    let (stem, _) = split_name(primary);
    stem.len()
        .checked_sub(SIGNATURE_LEN)
        .and_then(|start| stem.get(start..))
}

fn is_mask_candidate(file_name: &str, signature: &str) -> bool {
    let (stem, ext) = split_name(file_name);
    ext.is_some_and(|e| MASK_EXTENSIONS.contains(&e.as_str()))
        && !is_primary_image(file_name)
        && stem.ends_with(signature)
}

/// Derive a display name from a mask file name.
///
/// `1_apartment 30000.png` becomes `Apartment 3`: the numeric prefix and the
/// frame signature are removed, separators collapse to single spaces and each
/// word is title-cased.
pub fn normalize_name(file_name: &str) -> String {
    let (stem, _) = split_name(file_name);
    let mut chars: Vec<char> = stem.chars().collect();

    let digits = chars.iter().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 && matches!(chars.get(digits), Some('_' | '-' | ' ')) {
        chars.drain(..=digits);
    }

    let len = chars.len();
    if len >= SIGNATURE_LEN && chars[len - SIGNATURE_LEN..].iter().all(char::is_ascii_digit) {
        chars.truncate(len - SIGNATURE_LEN);
    }

    let cleaned: String = chars
        .into_iter()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect();
    let words: Vec<String> = cleaned.split_whitespace().map(title_case).collect();

    if words.is_empty() {
        "Object".to_string()
    } else {
        words.join(" ")
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// State recovered from a previous save.
#[derive(Debug, Default)]
struct PriorState {
    /// (image name, mask file) -> saved object.
    objects: HashMap<(String, String), ExportObject>,
    /// Saved mode per display name.
    modes: HashMap<String, OptimizationMode>,
    /// Normalized mask name -> saved display name.
    names: HashMap<String, String>,
}

impl PriorState {
    /// Display name for `mask` in `image`: its own saved name, else the name
    /// saved for any mask normalizing the same way, else the normalized name.
    fn name_for(&self, image: &str, mask: &str) -> String {
        if let Some(obj) = self.objects.get(&(image.to_string(), mask.to_string())) {
            return obj.name.clone();
        }
        let normalized = normalize_name(mask);
        self.names.get(&normalized).cloned().unwrap_or(normalized)
    }
}

fn load_prior_state(dir: &Path) -> PriorState {
    let path = dir.join(PROJECT_FILE_NAME);
    if !path.is_file() {
        return PriorState::default();
    }
    let entries = match import_json(&path) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Ignoring previous project file: {e:#}");
            return PriorState::default();
        }
    };

    let mut prior = PriorState::default();
    for entry in entries {
        for obj in entry.objects {
            prior.modes.entry(obj.name.clone()).or_insert(obj.mode);
            prior
                .names
                .entry(normalize_name(&obj.original_mask))
                .or_insert_with(|| obj.name.clone());
            prior
                .objects
                .insert((entry.image_name.clone(), obj.original_mask.clone()), obj);
        }
    }
    log::info!("Recovered {} saved objects from {}", prior.objects.len(), path.display());
    prior
}

fn list_files(dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("Failed to read folder {}", dir.display()))?
    {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        if !entry.path().is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => files.push(name),
            Err(name) => log::warn!("Skipping file with non-UTF-8 name: {name:?}"),
        }
    }
    files.sort();
    Ok(files)
}

/// Scan a folder and build one scene per primary image.
///
/// Masks that cannot be decoded are reported in [`ScanOutcome::skipped`];
/// masks without foreground are dropped silently. Only an unreadable folder
/// is an error.
pub fn scan_directory(dir: &Path) -> Result<ScanOutcome> {
    let files = list_files(dir)?;
    let primaries: Vec<&String> = files.iter().filter(|f| is_primary_image(f)).collect();

    let mut outcome = ScanOutcome {
        project: Project::new(dir.to_path_buf()),
        skipped: Vec::new(),
    };
    if primaries.is_empty() {
        log::info!("No primary images in {}", dir.display());
        return Ok(outcome);
    }

    let prior = load_prior_state(dir);
    let project = &mut outcome.project;

    for primary in primaries {
        let Some(signature) = frame_signature(primary) else {
            continue;
        };
        let mut scene = Scene::new(dir.join(primary));

        for file in files.iter().filter(|f| is_mask_candidate(f, signature)) {
            let mask_path: PathBuf = dir.join(file);
            let contour = match extract_contour_from_file(&mask_path) {
                Ok(Some(contour)) => contour,
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("Skipping {file}: {e:#}");
                    outcome.skipped.push(SkippedFile {
                        file: file.clone(),
                        reason: format!("{e:#}"),
                    });
                    continue;
                }
            };

            let saved = prior.objects.get(&(primary.clone(), file.clone()));
            let name = prior.name_for(primary, file);
            let settings = project.registry.register(&name, prior.modes.get(&name).copied());

            let points = match saved {
                Some(obj) if obj.points.len() >= MIN_VERTICES => obj.points.clone(),
                _ => simplify(&contour, settings.mode),
            };
            if points.len() < MIN_VERTICES {
                log::debug!("{file}: contour too small for a polygon");
                continue;
            }

            let mut obj = PolygonObject::new(name, file.clone(), points);
            obj.color = settings.color;
            obj.visible = settings.visible;
            obj.mode = settings.mode;
            obj.visual_points = visual_points(&contour);
            obj.contour = contour;
            scene.objects.push(obj);
        }

        log::debug!("{primary}: {} polygons", scene.objects.len());
        project.scenes.push(scene);
    }

    log::info!(
        "Scanned {}: {} scenes, {} names, {} skipped",
        dir.display(),
        project.scenes.len(),
        project.registry.len(),
        outcome.skipped.len()
    );
    Ok(outcome)
}
