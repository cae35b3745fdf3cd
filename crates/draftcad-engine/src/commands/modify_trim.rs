//! 修剪命令
//!
//! 先选剪切边，再点选要剪掉的线段部位。以点击点在目标线段上的
//! 参数为中心，向两侧找最近的交点作为剪切范围；某一侧无交点时
//! 剪到该侧端点。落在线段端点上的交点不产生剪切。
//!
//! 目标限定为线段实体；圆/圆弧的部位修剪不在此命令范围内。

use crate::command::{keys, Command, CommandResult, InputEvent, Transition};
use crate::commands::pick_line_entity;
use draftcad_core::document::Document;
use draftcad_core::entity::{Entity, EntityId};
use draftcad_core::geometry::{Geometry, Line};
use draftcad_core::intersect::intersections;
use draftcad_core::math::Point2;
use tracing::debug;

/// 交点参数的端点剔除容差
const T_EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    SelectCuttingEdges,
    PickSegment,
}

/// 修剪线段
pub struct TrimCommand {
    status: Status,
    cutting_edges: Vec<EntityId>,
    prompt: String,
}

impl TrimCommand {
    pub fn new() -> Self {
        Self {
            status: Status::SelectCuttingEdges,
            cutting_edges: Vec::new(),
            prompt: String::new(),
        }
    }

    fn trim_at(&mut self, doc: &mut Document, target_id: EntityId, click: Point2) -> Transition {
        let Some(target) = doc.entity(target_id).cloned() else {
            return Transition::Handled;
        };
        let Geometry::Line(line) = target.geometry.clone() else {
            self.prompt = "只能修剪线段，请重新点选:".to_string();
            return Transition::Handled;
        };

        let dir = line.end - line.start;
        let len_sq = dir.norm_squared();
        if len_sq <= T_EPS {
            return Transition::Handled;
        }

        // 交点在目标线段上的参数；端点处的交点剔除
        let mut ts: Vec<f64> = Vec::new();
        for edge_id in &self.cutting_edges {
            if *edge_id == target_id {
                continue;
            }
            let Some(edge) = doc.entity(*edge_id) else {
                continue;
            };
            for pt in intersections(&target.geometry, &edge.geometry) {
                let t = (pt - line.start).dot(&dir) / len_sq;
                if t > T_EPS && t < 1.0 - T_EPS {
                    ts.push(t);
                }
            }
        }
        if ts.is_empty() {
            self.prompt = "与剪切边无交点，请重新点选:".to_string();
            return Transition::Handled;
        }

        let t_click = ((click - line.start).dot(&dir) / len_sq).clamp(0.0, 1.0);
        let lower = ts
            .iter()
            .copied()
            .filter(|t| *t <= t_click)
            .fold(None::<f64>, |acc, t| Some(acc.map_or(t, |a| a.max(t))));
        let upper = ts
            .iter()
            .copied()
            .filter(|t| *t >= t_click)
            .fold(None::<f64>, |acc, t| Some(acc.map_or(t, |a| a.min(t))));

        let point_at = |t: f64| line.start + dir * t;
        let low_piece = lower.map(|t| Line::new(line.start, point_at(t)));
        let high_piece = upper.map(|t| Line::new(point_at(t), line.end));

        let before = target.clone();
        let (after, added) = match (low_piece, high_piece) {
            (Some(low), Some(high)) => {
                let after = target.clone().with_geometry(Geometry::Line(low));
                let mut split = Entity::new(Geometry::Line(high)).with_layer(target.layer.clone());
                split.color = target.color;
                split.lineweight = target.lineweight;
                (after, Some(split))
            }
            (Some(low), None) => (target.clone().with_geometry(Geometry::Line(low)), None),
            (None, Some(high)) => (target.clone().with_geometry(Geometry::Line(high)), None),
            (None, None) => return Transition::Handled,
        };

        doc.replace_entity(target_id, after.clone());
        if let Some(split) = &added {
            doc.add_entity(split.clone());
        }
        debug!(entity = %target_id, split = added.is_some(), "line trimmed");

        let undo_added = added.clone();
        Transition::Completed(CommandResult::new(
            move |d: &mut Document| {
                d.replace_entity(target_id, before.clone());
                if let Some(split) = &undo_added {
                    d.remove_entity(split.id);
                }
            },
            move |d: &mut Document| {
                d.replace_entity(target_id, after.clone());
                if let Some(split) = &added {
                    d.add_entity(split.clone());
                }
            },
        ))
    }
}

impl Command for TrimCommand {
    fn name(&self) -> &'static str {
        "trim"
    }

    fn start(&mut self, doc: &mut Document) {
        if doc.selection().is_empty() {
            self.prompt = "选择剪切边:".to_string();
        } else {
            self.cutting_edges = doc.selection_ordered();
            self.status = Status::PickSegment;
            self.prompt = "点选要修剪的线段部位:".to_string();
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
            InputEvent::Selection(ids) if self.status == Status::SelectCuttingEdges => {
                doc.set_selection(ids.iter().copied());
                self.cutting_edges = doc.selection_ordered();
                if self.cutting_edges.is_empty() {
                    self.prompt = "未选中剪切边，请重新选择:".to_string();
                    return Transition::Handled;
                }
                self.status = Status::PickSegment;
                self.prompt = "点选要修剪的线段部位:".to_string();
                Transition::Handled
            }
            InputEvent::Point(p) if self.status == Status::PickSegment => {
                let Some(target_id) = pick_line_entity(doc, p) else {
                    self.prompt = "附近没有线段，请重新点选:".to_string();
                    return Transition::Handled;
                };
                self.trim_at(doc, target_id, *p)
            }
            _ => Transition::Ignored,
        }
    }

    fn cancel(&mut self, _doc: &mut Document) {}
}
