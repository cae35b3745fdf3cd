//! 移动命令
//!
//! 选择集 -> 基点 -> 目标点。提交以不可变值替换选中实体的几何，
//! 实体身份保持不变；撤销/重做按整实体快照还原。

use crate::command::{keys, Command, CommandResult, InputEvent, PreviewSet, Transition};
use draftcad_core::document::Document;
use draftcad_core::entity::EntityId;
use draftcad_core::math::{Point2, Vector2};
use draftcad_core::transform::translated;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    SelectObjects,
    SetBase,
    SetTarget,
}

/// 移动选中实体
pub struct MoveCommand {
    status: Status,
    targets: Vec<EntityId>,
    base: Option<Point2>,
    preview: PreviewSet,
    prompt: String,
}

impl MoveCommand {
    pub fn new() -> Self {
        Self {
            status: Status::SelectObjects,
            targets: Vec::new(),
            base: None,
            preview: PreviewSet::new(),
            prompt: String::new(),
        }
    }

    fn commit(&mut self, doc: &mut Document, delta: Vector2) -> Transition {
        self.preview.clear(doc);

        let mut before = Vec::new();
        let mut after = Vec::new();
        for id in &self.targets {
            let Some(entity) = doc.entity(*id) else {
                continue;
            };
            let moved = entity
                .clone()
                .with_geometry(translated(&entity.geometry, &delta));
            before.push((*id, entity.clone()));
            after.push((*id, moved.clone()));
            doc.replace_entity(*id, moved);
        }
        debug!(count = after.len(), dx = delta.x, dy = delta.y, "entities moved");

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

impl Command for MoveCommand {
    fn name(&self) -> &'static str {
        "move"
    }

    fn start(&mut self, doc: &mut Document) {
        // 已有选择集时跳过选择阶段
        if doc.selection().is_empty() {
            self.prompt = "选择要移动的对象:".to_string();
        } else {
            self.targets = doc.selection_ordered();
            self.status = Status::SetBase;
            self.prompt = "指定基点:".to_string();
        }
    }

    fn prompt(&self) -> &str {
        &self.prompt
    }

    fn reference_point(&self) -> Option<Point2> {
        match self.status {
            Status::SetTarget => self.base,
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
                self.status = Status::SetBase;
                self.prompt = "指定基点:".to_string();
                Transition::Handled
            }
            InputEvent::Point(p) => match self.status {
                Status::SelectObjects => Transition::Ignored,
                Status::SetBase => {
                    self.base = Some(*p);
                    self.status = Status::SetTarget;
                    self.prompt = "指定目标点:".to_string();
                    Transition::Handled
                }
                Status::SetTarget => {
                    let base = match self.base {
                        Some(b) => b,
                        None => return Transition::Ignored,
                    };
                    self.commit(doc, p - base)
                }
            },
            InputEvent::Relative(delta) if self.status == Status::SetTarget => {
                self.commit(doc, *delta)
            }
            InputEvent::MouseMove(p) => match (self.status, self.base) {
                (Status::SetTarget, Some(base)) => {
                    let delta = p - base;
                    let geometries = self
                        .targets
                        .iter()
                        .filter_map(|id| doc.entity(*id).map(|e| translated(&e.geometry, &delta)))
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

/// 共享的选择阶段快照（测试用）
#[cfg(test)]
pub(crate) fn setup_selected_line(
    doc: &mut Document,
) -> (EntityId, draftcad_core::entity::Entity) {
    use draftcad_core::geometry::{Geometry, Line};
    let id = doc.add_geometry(Geometry::Line(Line::new(
        Point2::new(0.0, 0.0),
        Point2::new(10.0, 0.0),
    )));
    doc.add_to_selection(id);
    let entity = doc.entity(id).unwrap().clone();
    (id, entity)
}
