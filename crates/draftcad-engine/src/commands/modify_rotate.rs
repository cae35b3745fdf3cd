//! 旋转命令
//!
//! 选择集 -> 旋转中心 -> 角度。角度可由显式输入给出，或取指针
//! 相对中心的方位角。

use crate::command::{keys, Command, CommandResult, InputEvent, PreviewSet, Transition};
use draftcad_core::document::Document;
use draftcad_core::entity::EntityId;
use draftcad_core::math::{Point2, EPSILON};
use draftcad_core::transform::rotated_about;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    SelectObjects,
    SetCenter,
    SetAngle,
}

/// 绕中心旋转选中实体
pub struct RotateCommand {
    status: Status,
    targets: Vec<EntityId>,
    center: Option<Point2>,
    preview: PreviewSet,
    prompt: String,
}

impl RotateCommand {
    pub fn new() -> Self {
        Self {
            status: Status::SelectObjects,
            targets: Vec::new(),
            center: None,
            preview: PreviewSet::new(),
            prompt: String::new(),
        }
    }

    fn pointer_angle(center: &Point2, p: &Point2) -> Option<f64> {
        if (p - center).norm() <= EPSILON {
            return None; // 指针落在中心，方位角无定义
        }
        Some((p.y - center.y).atan2(p.x - center.x))
    }

    fn commit(&mut self, doc: &mut Document, center: Point2, angle: f64) -> Transition {
        self.preview.clear(doc);

        let mut before = Vec::new();
        let mut after = Vec::new();
        for id in &self.targets {
            let Some(entity) = doc.entity(*id) else {
                continue;
            };
            let rotated = entity
                .clone()
                .with_geometry(rotated_about(&entity.geometry, &center, angle));
            before.push((*id, entity.clone()));
            after.push((*id, rotated.clone()));
            doc.replace_entity(*id, rotated);
        }
        debug!(count = after.len(), angle, "entities rotated");

        let redo_set = after.clone();
        Transition::Completed(CommandResult::new(
            move |d: &mut Document| {
                for (id, entity) in &before {
                    d.replace_entity(*id, entity.clone());
                }
            },
            move |d: &mut Document| {
                for (id, entity) in &redo_set {
                    d.replace_entity(*id, entity.clone());
                }
            },
        ))
    }
}

impl Command for RotateCommand {
    fn name(&self) -> &'static str {
        "rotate"
    }

    fn start(&mut self, doc: &mut Document) {
        if doc.selection().is_empty() {
            self.prompt = "选择要旋转的对象:".to_string();
        } else {
            self.targets = doc.selection_ordered();
            self.status = Status::SetCenter;
            self.prompt = "指定旋转中心:".to_string();
        }
    }

    fn prompt(&self) -> &str {
        &self.prompt
    }

    fn reference_point(&self) -> Option<Point2> {
        match self.status {
            Status::SetAngle => self.center,
            _ => None,
        }
    }

    fn handle_input(&mut self, doc: &mut Document, input: &InputEvent) -> Transition {
        match input {
            InputEvent::Key(k) if k == keys::ESCAPE => {
                self.cancel(doc);
                Transition::Cancelled
            }
            InputEvent::Selection(ids) if self.status == Status::SelectObjects => {
                doc.set_selection(ids.iter().copied());
                self.targets = doc.selection_ordered();
                if self.targets.is_empty() {
                    self.prompt = "未选中任何对象，请重新选择:".to_string();
                    return Transition::Handled;
                }
                self.status = Status::SetCenter;
                self.prompt = "指定旋转中心:".to_string();
                Transition::Handled
            }
            InputEvent::Point(p) => match self.status {
                Status::SelectObjects => Transition::Ignored,
                Status::SetCenter => {
                    self.center = Some(*p);
                    self.status = Status::SetAngle;
                    self.prompt = "指定旋转角度:".to_string();
                    Transition::Handled
                }
                Status::SetAngle => {
                    let center = match self.center {
                        Some(c) => c,
                        None => return Transition::Ignored,
                    };
                    match Self::pointer_angle(&center, p) {
                        Some(angle) => self.commit(doc, center, angle),
                        None => {
                            self.prompt = "指针与中心重合，请重新指定角度:".to_string();
                            Transition::Handled
                        }
                    }
                }
            },
            InputEvent::Angle(angle) if self.status == Status::SetAngle => {
                let center = match self.center {
                    Some(c) => c,
                    None => return Transition::Ignored,
                };
                self.commit(doc, center, *angle)
            }
            InputEvent::MouseMove(p) => match (self.status, self.center) {
                (Status::SetAngle, Some(center)) => {
                    let Some(angle) = Self::pointer_angle(&center, p) else {
                        return Transition::Handled;
                    };
                    let geometries = self
                        .targets
                        .iter()
                        .filter_map(|id| {
                            doc.entity(*id)
                                .map(|e| rotated_about(&e.geometry, &center, angle))
                        })
                        .collect();
                    self.preview.replace(doc, geometries);
                    Transition::Handled
                }
                _ => Transition::Ignored,
            },
            _ => Transition::Ignored,
        }
    }

    fn cancel(&mut self, doc: &mut Document) {
        self.preview.clear(doc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::modify_move::setup_selected_line;
    use draftcad_core::geometry::Geometry;
    use std::f64::consts::PI;

    #[test]
    fn test_explicit_angle_rotates_in_place() {
        let mut doc = Document::new();
        let (id, _) = setup_selected_line(&mut doc);

        let mut cmd = RotateCommand::new();
        cmd.start(&mut doc);
        cmd.handle_input(&mut doc, &InputEvent::Point(Point2::origin()));
        let t = cmd.handle_input(&mut doc, &InputEvent::Angle(PI / 2.0));
        assert!(matches!(t, Transition::Completed(_)));

        match &doc.entity(id).unwrap().geometry {
            Geometry::Line(l) => {
                assert!(l.end.x.abs() < 1e-9);
                assert!((l.end.y - 10.0).abs() < 1e-9);
            }
            other => panic!("expected line, got {other:?}"),
        }
    }

    #[test]
    fn test_pointer_angle_from_azimuth() {
        let mut doc = Document::new();
        let (id, _) = setup_selected_line(&mut doc);

        let mut cmd = RotateCommand::new();
        cmd.start(&mut doc);
        cmd.handle_input(&mut doc, &InputEvent::Point(Point2::origin()));
        // 指针在正上方：方位角 90°
        let t = cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(0.0, 5.0)));
        assert!(matches!(t, Transition::Completed(_)));

        match &doc.entity(id).unwrap().geometry {
            Geometry::Line(l) => assert!((l.end.y - 10.0).abs() < 1e-9),
            other => panic!("expected line, got {other:?}"),
        }
    }

    #[test]
    fn test_pointer_at_center_refused() {
        let mut doc = Document::new();
        setup_selected_line(&mut doc);

        let mut cmd = RotateCommand::new();
        cmd.start(&mut doc);
        cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(2.0, 2.0)));
        let t = cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(2.0, 2.0)));
        assert!(matches!(t, Transition::Handled));
    }

    #[test]
    fn test_rotate_undo_restores() {
        let mut doc = Document::new();
        let (id, original) = setup_selected_line(&mut doc);

        let mut cmd = RotateCommand::new();
        cmd.start(&mut doc);
        cmd.handle_input(&mut doc, &InputEvent::Point(Point2::origin()));
        let t = cmd.handle_input(&mut doc, &InputEvent::Angle(PI));
        let mut result = match t {
            Transition::Completed(r) => r,
            other => panic!("expected completion, got {other:?}"),
        };

        result.undo.as_mut().unwrap()(&mut doc);
        assert_eq!(doc.entity(id).unwrap(), &original);
    }
}
