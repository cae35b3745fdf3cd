//! 缩放命令
//!
//! 选择集 -> 基点 -> 比例因子。指针模式下因子取指针到基点的
//! 距离除以 100，下限 0.1；显式距离输入直接作为因子。

use crate::command::{keys, Command, CommandResult, InputEvent, PreviewSet, Transition};
use draftcad_core::document::Document;
use draftcad_core::entity::EntityId;
use draftcad_core::math::Point2;
use draftcad_core::transform::scaled_about;
use tracing::debug;

/// 指针距离到比例因子的分母
const FACTOR_DENOMINATOR: f64 = 100.0;
/// 比例因子下限
const MIN_FACTOR: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    SelectObjects,
    SetBase,
    SetFactor,
}

/// 以基点缩放选中实体
pub struct ScaleCommand {
    status: Status,
    targets: Vec<EntityId>,
    base: Option<Point2>,
    preview: PreviewSet,
    prompt: String,
}

impl ScaleCommand {
    pub fn new() -> Self {
        Self {
            status: Status::SelectObjects,
            targets: Vec::new(),
            base: None,
            preview: PreviewSet::new(),
            prompt: String::new(),
        }
    }

    fn pointer_factor(base: &Point2, p: &Point2) -> f64 {
        ((p - base).norm() / FACTOR_DENOMINATOR).max(MIN_FACTOR)
    }

    fn commit(&mut self, doc: &mut Document, base: Point2, factor: f64) -> Transition {
        self.preview.clear(doc);

        let mut before = Vec::new();
        let mut after = Vec::new();
        for id in &self.targets {
            let Some(entity) = doc.entity(*id) else {
                continue;
            };
            let scaled = entity
                .clone()
                .with_geometry(scaled_about(&entity.geometry, &base, factor));
            before.push((*id, entity.clone()));
            after.push((*id, scaled.clone()));
            doc.replace_entity(*id, scaled);
        }
        debug!(count = after.len(), factor, "entities scaled");

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

impl Command for ScaleCommand {
    fn name(&self) -> &'static str {
        "scale"
    }

    fn start(&mut self, doc: &mut Document) {
        if doc.selection().is_empty() {
            self.prompt = "选择要缩放的对象:".to_string();
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
            Status::SetFactor => self.base,
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
                    self.status = Status::SetFactor;
                    self.prompt = "指定比例因子:".to_string();
                    Transition::Handled
                }
                Status::SetFactor => {
                    let base = match self.base {
                        Some(b) => b,
                        None => return Transition::Ignored,
                    };
                    let factor = Self::pointer_factor(&base, p);
                    self.commit(doc, base, factor)
                }
            },
            InputEvent::Distance(factor) if self.status == Status::SetFactor => {
                let base = match self.base {
                    Some(b) => b,
                    None => return Transition::Ignored,
                };
                self.commit(doc, base, factor.max(MIN_FACTOR))
            }
            InputEvent::MouseMove(p) => match (self.status, self.base) {
                (Status::SetFactor, Some(base)) => {
                    let factor = Self::pointer_factor(&base, p);
                    let geometries = self
                        .targets
                        .iter()
                        .filter_map(|id| {
                            doc.entity(*id)
                                .map(|e| scaled_about(&e.geometry, &base, factor))
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
