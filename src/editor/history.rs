// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Undo/redo history of polygon point arrays.
//!
//! Each step holds one snapshot per polygon it touched. A mode change records
//! every polygon of the name in a single step so it undoes as a whole.

use crate::models::polygon::{OptimizationMode, Point, PolygonObject};
use crate::models::scene::{PolygonId, Scene};

/// Points and mode of one polygon at some moment.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub target: PolygonId,
    pub points: Vec<Point>,
    pub mode: OptimizationMode,
}

impl Snapshot {
    pub fn of(target: PolygonId, polygon: &PolygonObject) -> Self {
        Self {
            target,
            points: polygon.points.clone(),
            mode: polygon.mode,
        }
    }
}

/// History system for undo/redo functionality.
#[derive(Debug, Clone)]
pub struct History {
    /// Undo stack (past states)
    undo_stack: Vec<Vec<Snapshot>>,
    /// Redo stack (future states after undo)
    redo_stack: Vec<Vec<Snapshot>>,
    /// Maximum history size
    max_size: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(200)
    }
}

impl History {
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
        }
    }

    /// Save a polygon's state before changing it.
    pub fn push(&mut self, target: PolygonId, polygon: &PolygonObject) {
        self.push_step(vec![Snapshot::of(target, polygon)]);
    }

    /// Save several polygons as one undoable step.
    pub fn push_step(&mut self, step: Vec<Snapshot>) {
        if step.is_empty() {
            return;
        }
        self.undo_stack.push(step);
        if self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
        // A new action invalidates everything that was undone.
        self.redo_stack.clear();
    }

    /// Restore the most recent step; returns the first polygon it touched.
    pub fn undo(&mut self, scenes: &mut [Scene]) -> Option<PolygonId> {
        Self::swap(&mut self.undo_stack, &mut self.redo_stack, scenes)
    }

    /// Re-apply the most recently undone step.
    pub fn redo(&mut self, scenes: &mut [Scene]) -> Option<PolygonId> {
        Self::swap(&mut self.redo_stack, &mut self.undo_stack, scenes)
    }

    fn swap(
        from: &mut Vec<Vec<Snapshot>>,
        to: &mut Vec<Vec<Snapshot>>,
        scenes: &mut [Scene],
    ) -> Option<PolygonId> {
        while let Some(step) = from.pop() {
            let mut restored = Vec::with_capacity(step.len());
            for snapshot in step {
                let Some(polygon) = scenes
                    .get_mut(snapshot.target.scene)
                    .and_then(|s| s.polygon_mut(snapshot.target.polygon))
                else {
                    log::warn!("Dropping history entry for missing polygon {:?}", snapshot.target);
                    continue;
                };
                restored.push(Snapshot {
                    target: snapshot.target,
                    points: std::mem::replace(&mut polygon.points, snapshot.points),
                    mode: std::mem::replace(&mut polygon.mode, snapshot.mode),
                });
            }
            if let Some(first) = restored.first().map(|s| s.target) {
                to.push(restored);
                return Some(first);
            }
        }
        None
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::polygon::PolygonObject;
    use std::path::PathBuf;

    fn scenes() -> Vec<Scene> {
        let mut scene = Scene::new(PathBuf::from("10000.jpg"));
        scene.objects.push(PolygonObject::new(
            "Roof".to_string(),
            "roof0000.png".to_string(),
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 10.0)],
        ));
        vec![scene]
    }

    fn edit(history: &mut History, scenes: &mut [Scene], step: f64) {
        let id = PolygonId::new(0, 0);
        let poly = scenes[0].polygon_mut(0).unwrap();
        history.push(id, poly);
        poly.points[1].x += step;
        poly.points.push(Point::new(step, step));
    }

    #[test]
    fn test_undo_n_steps_restores_original() {
        for n in 1..6 {
            let mut scenes = scenes();
            let mut history = History::new(50);
            let original = scenes[0].objects[0].points.clone();
            let mut states = vec![original.clone()];
            for i in 0..n {
                edit(&mut history, &mut scenes, i as f64 + 0.5);
                states.push(scenes[0].objects[0].points.clone());
            }
            for _ in 0..n {
                assert!(history.undo(&mut scenes).is_some());
            }
            assert_eq!(scenes[0].objects[0].points, original);
            assert!(!history.can_undo());

            for state in states.iter().skip(1) {
                history.redo(&mut scenes);
                assert_eq!(&scenes[0].objects[0].points, state);
            }
            assert!(!history.can_redo());
        }
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut scenes = scenes();
        let mut history = History::new(50);
        edit(&mut history, &mut scenes, 1.0);
        edit(&mut history, &mut scenes, 2.0);
        history.undo(&mut scenes);
        assert!(history.can_redo());
        edit(&mut history, &mut scenes, 3.0);
        assert!(!history.can_redo());
        assert_eq!(history.redo(&mut scenes), None);
    }

    #[test]
    fn test_snapshot_is_a_deep_copy() {
        let mut scenes = scenes();
        let mut history = History::new(50);
        let original = scenes[0].objects[0].points.clone();
        history.push(PolygonId::new(0, 0), &scenes[0].objects[0]);
        scenes[0].objects[0].points[0] = Point::new(99.0, 99.0);
        history.undo(&mut scenes);
        assert_eq!(scenes[0].objects[0].points, original);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut scenes = scenes();
        let mut history = History::new(2);
        for i in 0..4 {
            edit(&mut history, &mut scenes, f64::from(i));
        }
        assert!(history.undo(&mut scenes).is_some());
        assert!(history.undo(&mut scenes).is_some());
        assert!(history.undo(&mut scenes).is_none());
    }

    #[test]
    fn test_stale_entries_are_skipped() {
        let mut scenes = scenes();
        let mut history = History::new(10);
        history.push(PolygonId::new(0, 0), &scenes[0].objects[0]);
        history.push_step(vec![Snapshot {
            target: PolygonId::new(3, 7),
            points: Vec::new(),
            mode: OptimizationMode::Straight,
        }]);
        assert_eq!(history.undo(&mut scenes), Some(PolygonId::new(0, 0)));
    }

    #[test]
    fn test_step_restores_points_and_mode_together() {
        let mut scenes = scenes();
        let second = scenes[0].objects[0].clone();
        scenes[0].objects.push(second);
        let before: Vec<PolygonObject> = scenes[0].objects.clone();

        let mut history = History::new(10);
        let step = (0..2).map(|i| Snapshot::of(PolygonId::new(0, i), &scenes[0].objects[i])).collect();
        history.push_step(step);
        for obj in &mut scenes[0].objects {
            obj.mode = OptimizationMode::Rectangle;
            obj.points.pop();
            obj.points.push(Point::new(5.0, 5.0));
        }
        let after: Vec<PolygonObject> = scenes[0].objects.clone();

        history.undo(&mut scenes);
        for (obj, old) in scenes[0].objects.iter().zip(&before) {
            assert_eq!(obj.points, old.points);
            assert_eq!(obj.mode, old.mode);
        }
        assert!(!history.can_undo());

        history.redo(&mut scenes);
        for (obj, new) in scenes[0].objects.iter().zip(&after) {
            assert_eq!(obj.points, new.points);
            assert_eq!(obj.mode, OptimizationMode::Rectangle);
        }
    }

    #[test]
    fn test_empty_step_is_ignored() {
        let mut history = History::new(10);
        history.push_step(Vec::new());
        assert!(!history.can_undo());
    }
}
