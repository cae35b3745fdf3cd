//! 延伸命令
//!
//! 先选边界，再点选要延伸的线段。点击点靠近哪个端点就延伸哪端：
//! 沿线段方向向外探测，取与边界最近的交点作为新端点；探测不到
//! 交点则拒绝并重新等待点选。

use crate::command::{keys, Command, CommandResult, InputEvent, Transition};
use crate::commands::pick_line_entity;
use draftcad_core::document::Document;
use draftcad_core::entity::EntityId;
use draftcad_core::geometry::{Geometry, Line};
use draftcad_core::intersect::intersections;
use draftcad_core::math::{normalize_or_zero, Point2, Vector2, EPSILON};
use tracing::debug;

/// 向外探测的长度（世界单位）
const PROBE_LENGTH: f64 = 1e6;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    SelectBoundaries,
    PickLine,
}

/// 延伸线段到边界
pub struct ExtendCommand {
    status: Status,
    boundaries: Vec<EntityId>,
    prompt: String,
}

impl ExtendCommand {
    pub fn new() -> Self {
        Self {
            status: Status::SelectBoundaries,
            boundaries: Vec::new(),
            prompt: String::new(),
        }
    }

    fn extend_at(&mut self, doc: &mut Document, target_id: EntityId, click: Point2) -> Transition {
        let Some(target) = doc.entity(target_id).cloned() else {
            return Transition::Handled;
        };
        let Geometry::Line(line) = target.geometry.clone() else {
            self.prompt = "只能延伸线段，请重新点选:".to_string();
            return Transition::Handled;
        };

        // 点击点更靠近哪个端点，就延伸哪端
        let extend_end = (click - line.end).norm() < (click - line.start).norm();
        let (anchor, moving) = if extend_end {
            (line.start, line.end)
        } else {
            (line.end, line.start)
        };
        let dir = normalize_or_zero(moving - anchor);
        if dir == Vector2::zeros() {
            return Transition::Handled;
        }

        // 从移动端沿方向向外探测
        let probe = Geometry::Line(Line::new(moving, moving + dir * PROBE_LENGTH));
        let mut best: Option<(f64, Point2)> = None;
        for boundary_id in &self.boundaries {
            if *boundary_id == target_id {
                continue;
            }
            let Some(boundary) = doc.entity(*boundary_id) else {
                continue;
            };
            for pt in intersections(&probe, &boundary.geometry) {
                let dist = (pt - moving).norm();
                if dist <= EPSILON {
                    continue; // 已经贴在边界上
                }
                if best.map_or(true, |(d, _)| dist < d) {
                    best = Some((dist, pt));
                }
            }
        }
        let Some((_, hit)) = best else {
            self.prompt = "该方向没有可延伸到的边界，请重新点选:".to_string();
            return Transition::Handled;
        };

        let extended = if extend_end {
            Line::new(line.start, hit)
        } else {
            Line::new(hit, line.end)
        };
        let before = target.clone();
        let after = target.with_geometry(Geometry::Line(extended));
        doc.replace_entity(target_id, after.clone());
        debug!(entity = %target_id, "line extended");

        Transition::Completed(CommandResult::new(
            move |d: &mut Document| {
                d.replace_entity(target_id, before.clone());
            },
            move |d: &mut Document| {
                d.replace_entity(target_id, after.clone());
            },
        ))
    }
}

impl Command for ExtendCommand {
    fn name(&self) -> &'static str {
        "extend"
    }

    fn start(&mut self, doc: &mut Document) {
        if doc.selection().is_empty() {
            self.prompt = "选择边界:".to_string();
        } else {
            self.boundaries = doc.selection_ordered();
            self.status = Status::PickLine;
            self.prompt = "点选要延伸的线段:".to_string();
        }
    }

    fn prompt(&self) -> &str {
        &self.prompt
    }

    fn handle_input(&mut self, doc: &mut Document, input: &InputEvent) -> Transition {
        match input {
            InputEvent::Key(k) if k == keys::ESCAPE => {
                self.cancel(doc);
                Transition::Cancelled
            }
            InputEvent::Selection(ids) if self.status == Status::SelectBoundaries => {
                doc.set_selection(ids.iter().copied());
                self.boundaries = doc.selection_ordered();
                if self.boundaries.is_empty() {
                    self.prompt = "未选中边界，请重新选择:".to_string();
                    return Transition::Handled;
                }
                self.status = Status::PickLine;
                self.prompt = "点选要延伸的线段:".to_string();
                Transition::Handled
            }
            InputEvent::Point(p) if self.status == Status::PickLine => {
                let Some(target_id) = pick_line_entity(doc, p) else {
                    self.prompt = "附近没有线段，请重新点选:".to_string();
                    return Transition::Handled;
                };
                self.extend_at(doc, target_id, *p)
            }
            _ => Transition::Ignored,
        }
    }

    fn cancel(&mut self, _doc: &mut Document) {}
}
