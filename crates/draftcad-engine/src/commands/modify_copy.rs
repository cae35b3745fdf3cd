//! 复制命令
//!
//! 与移动共享的选择/基点/目标点协议，但提交时创建平移后的新实体，
//! 原实体保持不动。

use crate::command::{keys, Command, CommandResult, InputEvent, PreviewSet, Transition};
use draftcad_core::document::Document;
use draftcad_core::entity::{Entity, EntityId};
use draftcad_core::math::{Point2, Vector2};
use draftcad_core::transform::translated;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    SelectObjects,
    SetBase,
    SetTarget,
}

/// 复制选中实体
pub struct CopyCommand {
    status: Status,
    targets: Vec<EntityId>,
    base: Option<Point2>,
    preview: PreviewSet,
    prompt: String,
}

impl CopyCommand {
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

        let mut copies: Vec<Entity> = Vec::new();
        for id in &self.targets {
            let Some(source) = doc.entity(*id) else {
                continue;
            };
            // 新身份，属性随源实体
            let mut copy = Entity::new(translated(&source.geometry, &delta))
                .with_layer(source.layer.clone());
            copy.color = source.color;
            copy.lineweight = source.lineweight;
            copies.push(copy);
        }
        for copy in &copies {
            doc.add_entity(copy.clone());
        }
        debug!(count = copies.len(), "entities copied");

        let ids: Vec<EntityId> = copies.iter().map(|e| e.id).collect();
        Transition::Completed(CommandResult::new(
            move |d: &mut Document| {
                for id in &ids {
                    d.remove_entity(*id);
                }
            },
            move |d: &mut Document| {
                for copy in &copies {
                    d.add_entity(copy.clone());
                }
            },
        ))
    }
}

impl Command for CopyCommand {
    fn name(&self) -> &'static str {
        "copy"
    }

    fn start(&mut self, doc: &mut Document) {
        if doc.selection().is_empty() {
            self.prompt = "选择要复制的对象:".to_string();
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
