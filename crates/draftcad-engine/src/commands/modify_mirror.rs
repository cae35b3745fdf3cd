//! 镜像命令
//!
//! 选择集 -> 镜像轴两点，原地镜像选中实体。预览显示镜像结果
//! 与轴线本身。

use crate::command::{keys, Command, CommandResult, InputEvent, PreviewSet, Transition};
use draftcad_core::document::Document;
use draftcad_core::entity::EntityId;
use draftcad_core::geometry::{Geometry, Line};
use draftcad_core::math::{Point2, EPSILON};
use draftcad_core::transform::mirrored_across;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    SelectObjects,
    SetAxisStart,
    SetAxisEnd,
}

/// 关于轴线镜像选中实体
pub struct MirrorCommand {
    status: Status,
    targets: Vec<EntityId>,
    axis_start: Option<Point2>,
    preview: PreviewSet,
    prompt: String,
}

impl MirrorCommand {
    pub fn new() -> Self {
        Self {
            status: Status::SelectObjects,
            targets: Vec::new(),
            axis_start: None,
            preview: PreviewSet::new(),
            prompt: String::new(),
        }
    }

    fn commit(&mut self, doc: &mut Document, p1: Point2, p2: Point2) -> Transition {
        self.preview.clear(doc);

        let mut before = Vec::new();
        let mut after = Vec::new();
        for id in &self.targets {
            let Some(entity) = doc.entity(*id) else {
                continue;
            };
            let mirrored = entity
                .clone()
                .with_geometry(mirrored_across(&entity.geometry, &p1, &p2));
            before.push((*id, entity.clone()));
            after.push((*id, mirrored.clone()));
            doc.replace_entity(*id, mirrored);
        }
        debug!(count = after.len(), "entities mirrored");

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

impl Command for MirrorCommand {
    fn name(&self) -> &'static str {
        "mirror"
    }

    fn start(&mut self, doc: &mut Document) {
        if doc.selection().is_empty() {
            self.prompt = "选择要镜像的对象:".to_string();
        } else {
            self.targets = doc.selection_ordered();
            self.status = Status::SetAxisStart;
            self.prompt = "指定镜像轴第一点:".to_string();
        }
    }

    fn prompt(&self) -> &str {
        &self.prompt
    }

    fn reference_point(&self) -> Option<Point2> {
        match self.status {
            Status::SetAxisEnd => self.axis_start,
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
                self.status = Status::SetAxisStart;
                self.prompt = "指定镜像轴第一点:".to_string();
                Transition::Handled
            }
            InputEvent::Point(p) => match self.status {
                Status::SelectObjects => Transition::Ignored,
                Status::SetAxisStart => {
                    self.axis_start = Some(*p);
                    self.status = Status::SetAxisEnd;
                    self.prompt = "指定镜像轴第二点:".to_string();
                    Transition::Handled
                }
                Status::SetAxisEnd => {
                    let p1 = match self.axis_start {
                        Some(a) => a,
                        None => return Transition::Ignored,
                    };
                    if (p - p1).norm() <= EPSILON {
                        // 轴退化
                        self.prompt = "轴两点重合，请指定不同的第二点:".to_string();
                        return Transition::Handled;
                    }
                    self.commit(doc, p1, *p)
                }
            },
            InputEvent::MouseMove(p) => match (self.status, self.axis_start) {
                (Status::SetAxisEnd, Some(p1)) => {
                    if (p - p1).norm() <= EPSILON {
                        return Transition::Handled;
                    }
                    let mut geometries: Vec<Geometry> = self
                        .targets
                        .iter()
                        .filter_map(|id| {
                            doc.entity(*id)
                                .map(|e| mirrored_across(&e.geometry, &p1, p))
                        })
                        .collect();
                    geometries.push(Geometry::Line(Line::new(p1, *p)));
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

    #[test]
    fn test_mirror_across_vertical_axis() {
        let mut doc = Document::new();
        let (id, _) = setup_selected_line(&mut doc);

        let mut cmd = MirrorCommand::new();
        cmd.start(&mut doc);
        cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(0.0, -1.0)));
        let t = cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(0.0, 1.0)));
        assert!(matches!(t, Transition::Completed(_)));

        match &doc.entity(id).unwrap().geometry {
            Geometry::Line(l) => {
                assert!((l.end.x + 10.0).abs() < 1e-9);
                assert!(l.end.y.abs() < 1e-9);
            }
            other => panic!("expected line, got {other:?}"),
        }
    }

    #[test]
    fn test_degenerate_axis_refused() {
        let mut doc = Document::new();
        let (id, original) = setup_selected_line(&mut doc);

        let mut cmd = MirrorCommand::new();
        cmd.start(&mut doc);
        cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(3.0, 3.0)));
        let t = cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(3.0, 3.0)));
        assert!(matches!(t, Transition::Handled));
        assert_eq!(doc.entity(id).unwrap(), &original);
    }

    #[test]
    fn test_preview_includes_axis_line() {
        let mut doc = Document::new();
        setup_selected_line(&mut doc);

        let mut cmd = MirrorCommand::new();
        cmd.start(&mut doc);
        cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(0.0, -5.0)));
        cmd.handle_input(&mut doc, &InputEvent::MouseMove(Point2::new(0.0, 5.0)));

        // 镜像结果 + 轴线两份预览
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.entities().filter(|e| e.is_preview).count(), 2);

        cmd.cancel(&mut doc);
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_mirror_undo_restores() {
        let mut doc = Document::new();
        let (id, original) = setup_selected_line(&mut doc);

        let mut cmd = MirrorCommand::new();
        cmd.start(&mut doc);
        cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(5.0, -1.0)));
        let t = cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(5.0, 1.0)));
        let mut result = match t {
            Transition::Completed(r) => r,
            other => panic!("expected completion, got {other:?}"),
        };

        result.undo.as_mut().unwrap()(&mut doc);
        assert_eq!(doc.entity(id).unwrap(), &original);
    }
}
