//! 线段绘制命令
//!
//! 链式协议：起点之后每个确认点提交一条线段并成为下一条的起点。
//! Enter 完成（撤销移除整条链），Escape 取消但已提交的线段保留。

use crate::command::{keys, Command, CommandResult, InputEvent, PreviewSet, Transition};
use draftcad_core::document::Document;
use draftcad_core::entity::{Entity, EntityId};
use draftcad_core::geometry::{Geometry, Line};
use draftcad_core::math::{Point2, EPSILON};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    SetStart,
    SetNext,
}

/// 绘制线段
pub struct DrawLineCommand {
    status: Status,
    start: Option<Point2>,
    committed: Vec<(EntityId, Entity)>,
    preview: PreviewSet,
    prompt: String,
}

impl DrawLineCommand {
    pub fn new() -> Self {
        Self {
            status: Status::SetStart,
            start: None,
            committed: Vec::new(),
            preview: PreviewSet::new(),
            prompt: String::new(),
        }
    }

    fn commit_segment(&mut self, doc: &mut Document, start: Point2, end: Point2) {
        let id = doc.add_geometry(Geometry::Line(Line::new(start, end)));
        if let Some(entity) = doc.entity(id) {
            self.committed.push((id, entity.clone()));
        }
        debug!(entity = %id, "line segment committed");
        self.start = Some(end);
        self.prompt = "指定下一点 或 [Enter 结束]:".to_string();
    }

    /// 完成：撤销移除整条链，重做按原身份恢复
    fn finish(&mut self, doc: &mut Document) -> Transition {
        self.preview.clear(doc);
        if self.committed.is_empty() {
            return Transition::Cancelled;
        }
        let ids: Vec<EntityId> = self.committed.iter().map(|(id, _)| *id).collect();
        let entities: Vec<Entity> = self.committed.iter().map(|(_, e)| e.clone()).collect();
        Transition::Completed(CommandResult::new(
            move |d: &mut Document| {
                for id in &ids {
                    d.remove_entity(*id);
                }
            },
            move |d: &mut Document| {
                for e in &entities {
                    d.add_entity(e.clone());
                }
            },
        ))
    }
}

impl Command for DrawLineCommand {
    fn name(&self) -> &'static str {
        "line"
    }

    fn start(&mut self, _doc: &mut Document) {
        self.prompt = "指定第一点:".to_string();
    }

    fn prompt(&self) -> &str {
        &self.prompt
    }

    fn reference_point(&self) -> Option<Point2> {
        match self.status {
            Status::SetNext => self.start,
            Status::SetStart => None,
        }
    }

    fn handle_input(&mut self, doc: &mut Document, input: &InputEvent) -> Transition {
        match input {
            InputEvent::Key(k) if k == keys::ESCAPE => {
                // 已提交的线段保留，未完成的预览收回
                self.cancel(doc);
                Transition::Cancelled
            }
            InputEvent::Key(k) if k == keys::ENTER => self.finish(doc),
            InputEvent::Point(p) => match self.status {
                Status::SetStart => {
                    self.start = Some(*p);
                    self.status = Status::SetNext;
                    self.prompt = "指定下一点:".to_string();
                    Transition::Handled
                }
                Status::SetNext => {
                    let start = match self.start {
                        Some(s) => s,
                        None => return Transition::Ignored,
                    };
                    if (p - start).norm() <= EPSILON {
                        // 零长线段拒绝提交，留在当前子状态
                        self.prompt = "点重合，请指定不同的下一点:".to_string();
                        return Transition::Handled;
                    }
                    self.commit_segment(doc, start, *p);
                    Transition::Handled
                }
            },
            InputEvent::Relative(delta) => match (self.status, self.start) {
                (Status::SetNext, Some(start)) => {
                    if delta.norm() <= EPSILON {
                        return Transition::Handled;
                    }
                    self.commit_segment(doc, start, start + delta);
                    Transition::Handled
                }
                _ => Transition::Ignored,
            },
            InputEvent::MouseMove(p) => match (self.status, self.start) {
                (Status::SetNext, Some(start)) => {
                    self.preview
                        .replace(doc, vec![Geometry::Line(Line::new(start, *p))]);
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
