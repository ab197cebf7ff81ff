// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project state management.
//!
//! This module manages the overall project state: the scanned scenes and the
//! name registry, plus the entry points that keep same-named polygons in sync
//! across every scene.

use super::polygon::{OptimizationMode, Point, PolygonObject, Rgb, MIN_VERTICES};
use super::registry::NameRegistry;
use super::scene::{CatalogEntry, PolygonId, Scene};
use crate::vision::simplify::simplify;
use std::path::PathBuf;

/// Complete project: every scene of a folder plus the shared registry.
#[derive(Debug, Clone, Default)]
pub struct Project {
    pub folder: PathBuf,
    pub scenes: Vec<Scene>,
    pub registry: NameRegistry,
}

impl Project {
    /// Create an empty project rooted at `folder`.
    pub fn new(folder: PathBuf) -> Self {
        Self {
            folder,
            scenes: Vec::new(),
            registry: NameRegistry::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn polygon(&self, id: PolygonId) -> Option<&PolygonObject> {
        self.scenes.get(id.scene)?.polygon(id.polygon)
    }

    fn objects_named_mut<'a>(
        &'a mut self,
        name: &'a str,
    ) -> impl Iterator<Item = (PolygonId, &'a mut PolygonObject)> + 'a {
        self.scenes
            .iter_mut()
            .enumerate()
            .flat_map(|(scene_idx, scene)| {
                scene
                    .objects
                    .iter_mut()
                    .enumerate()
                    .map(move |(idx, obj)| (PolygonId::new(scene_idx, idx), obj))
            })
            .filter(move |(_, obj)| obj.name == name)
    }

    /// Catalog of every project name as seen from one scene.
    ///
    /// Names with polygons in the scene yield one `Present` row per polygon;
    /// the others yield a single `Absent` row with the registry settings.
    pub fn catalog(&self, scene_idx: usize) -> Vec<CatalogEntry> {
        let Some(scene) = self.scenes.get(scene_idx) else {
            return Vec::new();
        };
        let mut entries = Vec::new();
        for (name, settings) in self.registry.iter() {
            let mut present = scene.indices_named(name).peekable();
            if present.peek().is_none() {
                entries.push(CatalogEntry::Absent {
                    name: name.to_string(),
                    settings: *settings,
                });
            }
            for polygon in present {
                entries.push(CatalogEntry::Present {
                    polygon,
                    name: name.to_string(),
                    settings: *settings,
                });
            }
        }
        entries
    }

    /// Rename a display name everywhere.
    ///
    /// Either the registry and every polygon change, or nothing does.
    pub fn sync_name(&mut self, old: &str, new: &str) -> bool {
        let new = new.trim();
        if !self.registry.rename(old, new) {
            log::warn!("Refused rename {old:?} -> {new:?}");
            return false;
        }
        let mut renamed = 0;
        for (_, obj) in self.objects_named_mut(old) {
            obj.name = new.to_string();
            renamed += 1;
        }
        log::info!("Renamed {old:?} to {new:?} on {renamed} polygons");
        true
    }

    pub fn sync_color(&mut self, name: &str, color: Rgb) -> bool {
        if !self.registry.recolor(name, color) {
            return false;
        }
        for (_, obj) in self.objects_named_mut(name) {
            obj.color = color;
        }
        true
    }

    pub fn sync_visibility(&mut self, name: &str, visible: bool) -> bool {
        if !self.registry.set_visible(name, visible) {
            return false;
        }
        for (_, obj) in self.objects_named_mut(name) {
            obj.visible = visible;
        }
        true
    }

    /// Change the optimization mode of a name and re-simplify its polygons.
    ///
    /// Returns the prior points and mode of every polygon whose mode changed,
    /// so the caller can record them as one undo step.
    pub fn sync_mode(
        &mut self,
        name: &str,
        mode: OptimizationMode,
    ) -> Vec<(PolygonId, Vec<Point>, OptimizationMode)> {
        if !self.registry.set_mode(name, mode) {
            return Vec::new();
        }
        let mut prior = Vec::new();
        let mut resimplified = 0;
        for (id, obj) in self.objects_named_mut(name) {
            if obj.mode == mode {
                continue;
            }
            prior.push((id, obj.points.clone(), obj.mode));
            obj.mode = mode;
            if obj.contour.is_empty() {
                continue;
            }
            let points = simplify(&obj.contour, mode);
            if points.len() >= MIN_VERTICES && points != obj.points {
                obj.points = points;
                resimplified += 1;
            }
        }
        log::info!("Set mode of {name:?} to {mode}, {resimplified} polygons re-simplified");
        prior
    }

    /// Align the registry with the mode of polygon `id` after undo or redo.
    ///
    /// Returns whether the registry changed.
    pub fn adopt_mode(&mut self, id: PolygonId) -> bool {
        let Some(obj) = self.polygon(id) else {
            return false;
        };
        let (name, mode) = (obj.name.clone(), obj.mode);
        if self.registry.get(&name).is_some_and(|s| s.mode == mode) {
            return false;
        }
        self.registry.set_mode(&name, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_contour() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 40.0),
            Point::new(20.0, 41.0),
            Point::new(40.0, 40.0),
            Point::new(40.0, 0.0),
        ]
    }

    fn polygon(name: &str, mask: &str) -> PolygonObject {
        let mut obj = PolygonObject::new(name.to_string(), mask.to_string(), square_contour());
        obj.contour = square_contour();
        obj
    }

    fn project() -> Project {
        let mut project = Project::new(PathBuf::from("/data"));
        project.registry.register("Window", None);
        project.registry.register("Roof", None);
        project.registry.register("Door", None);

        let mut first = Scene::new(PathBuf::from("/data/10000.jpg"));
        first.objects.push(polygon("Window", "window0000.png"));
        first.objects.push(polygon("Window", "window_b0000.png"));
        first.objects.push(polygon("Roof", "roof0000.png"));

        let mut second = Scene::new(PathBuf::from("/data/10001.jpg"));
        second.objects.push(polygon("Window", "window0001.png"));
        second.objects.push(polygon("Door", "door0001.png"));

        project.scenes = vec![first, second];
        project
    }

    #[test]
    fn test_rename_propagates_to_all_scenes() {
        let mut project = project();
        assert!(project.sync_name("Window", "Window A"));

        let names: Vec<&str> = project
            .scenes
            .iter()
            .flat_map(|s| s.objects.iter().map(|o| o.name.as_str()))
            .collect();
        assert!(!names.contains(&"Window"));
        assert_eq!(names.iter().filter(|n| **n == "Window A").count(), 3);
        assert!(project.registry.contains("Window A"));
        assert!(!project.registry.contains("Window"));
    }

    #[test]
    fn test_refused_rename_changes_nothing() {
        let mut project = project();
        assert!(!project.sync_name("Window", "Roof"));
        assert_eq!(project.scenes[0].objects[0].name, "Window");
        assert!(project.registry.contains("Window"));
    }

    #[test]
    fn test_catalog_has_ghost_entries() {
        let project = project();
        let catalog = project.catalog(0);
        let names: Vec<&str> = catalog.iter().map(CatalogEntry::name).collect();
        assert_eq!(names, vec!["Door", "Roof", "Window", "Window"]);
        assert!(matches!(catalog[0], CatalogEntry::Absent { .. }));
        assert_eq!(catalog[1].polygon(), Some(2));
        assert_eq!(catalog[3].polygon(), Some(1));
    }

    #[test]
    fn test_visibility_and_color_sync() {
        let mut project = project();
        assert!(project.sync_visibility("Window", false));
        assert!(project.sync_color("Window", [9, 9, 9]));
        for id in [PolygonId::new(0, 0), PolygonId::new(0, 1), PolygonId::new(1, 0)] {
            let obj = project.polygon(id).unwrap();
            assert!(!obj.visible);
            assert_eq!(obj.color, [9, 9, 9]);
        }
        assert!(project.polygon(PolygonId::new(0, 2)).unwrap().visible);
        assert!(!project.sync_color("Nope", [0, 0, 0]));
    }

    #[test]
    fn test_mode_change_resimplifies_and_reports_prior_state() {
        let mut project = project();
        let prior = project.sync_mode("Roof", OptimizationMode::Rectangle);
        assert_eq!(prior.len(), 1);
        assert_eq!(prior[0].0, PolygonId::new(0, 2));
        assert_eq!(prior[0].1, square_contour());
        assert_eq!(prior[0].2, OptimizationMode::Balanced);

        let roof = project.polygon(PolygonId::new(0, 2)).unwrap();
        assert_eq!(roof.mode, OptimizationMode::Rectangle);
        assert_eq!(roof.points.len(), 4);
        assert_eq!(project.registry.get("Roof").unwrap().mode, OptimizationMode::Rectangle);
    }

    #[test]
    fn test_same_mode_reports_nothing() {
        let mut project = project();
        assert!(project.sync_mode("Roof", OptimizationMode::Balanced).is_empty());
        assert!(project.sync_mode("Nope", OptimizationMode::Straight).is_empty());
    }

    #[test]
    fn test_adopt_mode_follows_restored_polygon() {
        let mut project = project();
        let prior = project.sync_mode("Window", OptimizationMode::Straight);
        assert_eq!(prior.len(), 3);

        // Put every window back the way an undo of that step would.
        for (id, points, mode) in prior {
            let obj = &mut project.scenes[id.scene].objects[id.polygon];
            obj.points = points;
            obj.mode = mode;
        }
        assert!(project.adopt_mode(PolygonId::new(1, 0)));
        assert_eq!(project.registry.get("Window").unwrap().mode, OptimizationMode::Balanced);
        assert!(!project.adopt_mode(PolygonId::new(0, 0)));
        assert!(!project.adopt_mode(PolygonId::new(5, 5)));
    }
}
