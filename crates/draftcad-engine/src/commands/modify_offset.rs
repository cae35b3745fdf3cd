//! 偏移命令
//!
//! 距离 -> 选实体 -> 点选偏移侧。在指定侧生成平行副本，原实体
//! 保持不动。圆/圆弧按半径增减；多段线逐段平移后在角点处求相邻
//! 偏移段的延长线交点（平行时直接衔接）。

use crate::command::{keys, Command, CommandResult, InputEvent, PreviewSet, Transition};
use draftcad_core::document::Document;
use draftcad_core::entity::{Entity, EntityId};
use draftcad_core::geometry::{Arc, Circle, Geometry, Line, Polyline, Rectangle};
use draftcad_core::intersect::line_line_infinite;
use draftcad_core::math::{normalize_or_zero, Point2, Vector2, EPSILON};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    SetDistance,
    SelectEntity,
    SetSide,
}

/// 偏移实体
pub struct OffsetCommand {
    status: Status,
    distance: f64,
    source: Option<EntityId>,
    preview: PreviewSet,
    prompt: String,
}

impl OffsetCommand {
    pub fn new() -> Self {
        Self {
            status: Status::SetDistance,
            distance: 0.0,
            source: None,
            preview: PreviewSet::new(),
            prompt: String::new(),
        }
    }

    fn commit(&mut self, doc: &mut Document, side: Point2) -> Transition {
        let Some(source_id) = self.source else {
            return Transition::Ignored;
        };
        let Some(source) = doc.entity(source_id).cloned() else {
            return Transition::Handled;
        };
        let Some(geometry) = offset_geometry(&source.geometry, self.distance, &side) else {
            self.prompt = "该侧无法生成偏移，请重新点选:".to_string();
            return Transition::Handled;
        };
        self.preview.clear(doc);

        let mut offset = Entity::new(geometry).with_layer(source.layer.clone());
        offset.color = source.color;
        offset.lineweight = source.lineweight;
        doc.add_entity(offset.clone());
        debug!(source = %source_id, entity = %offset.id, distance = self.distance, "entity offset");

        let id = offset.id;
        Transition::Completed(CommandResult::new(
            move |d: &mut Document| {
                d.remove_entity(id);
            },
            move |d: &mut Document| {
                d.add_entity(offset.clone());
            },
        ))
    }
}

impl Command for OffsetCommand {
    fn name(&self) -> &'static str {
        "offset"
    }

    fn start(&mut self, _doc: &mut Document) {
        self.prompt = "指定偏移距离:".to_string();
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
            InputEvent::Distance(d) if self.status == Status::SetDistance => {
                if *d <= EPSILON {
                    self.prompt = "偏移距离必须为正，请重新输入:".to_string();
                    return Transition::Handled;
                }
                self.distance = *d;
                self.status = Status::SelectEntity;
                self.prompt = "选择要偏移的实体:".to_string();
                Transition::Handled
            }
            InputEvent::Selection(ids) if self.status == Status::SelectEntity => {
                let picked = ids
                    .iter()
                    .find(|id| doc.entity(**id).is_some_and(|e| !e.is_preview));
                let Some(id) = picked else {
                    self.prompt = "未选中实体，请重新选择:".to_string();
                    return Transition::Handled;
                };
                self.source = Some(*id);
                self.status = Status::SetSide;
                self.prompt = "点选偏移侧:".to_string();
                Transition::Handled
            }
            InputEvent::Point(p) if self.status == Status::SetSide => self.commit(doc, *p),
            InputEvent::MouseMove(p) if self.status == Status::SetSide => {
                let Some(source_id) = self.source else {
                    return Transition::Ignored;
                };
                let geometries = doc
                    .entity(source_id)
                    .and_then(|e| offset_geometry(&e.geometry, self.distance, p))
                    .map(|g| vec![g])
                    .unwrap_or_default();
                self.preview.replace(doc, geometries);
                Transition::Handled
            }
            _ => Transition::Ignored,
        }
    }

    fn cancel(&mut self, doc: &mut Document) {
        self.preview.clear(doc);
    }
}

/// 在 `side` 所在一侧按距离偏移几何；无法偏移时返回 None
pub fn offset_geometry(geometry: &Geometry, distance: f64, side: &Point2) -> Option<Geometry> {
    match geometry {
        Geometry::Line(l) => {
            let dir = normalize_or_zero(l.end - l.start);
            if dir == Vector2::zeros() {
                return None;
            }
            let normal = Vector2::new(-dir.y, dir.x);
            let s = (side - l.start).dot(&normal);
            if s.abs() <= EPSILON {
                return None; // 点在线上，侧别无定义
            }
            let shift = normal * distance * s.signum();
            Some(Geometry::Line(Line::new(l.start + shift, l.end + shift)))
        }
        Geometry::Circle(c) => {
            let radius = offset_radius(c.radius, distance, (side - c.center).norm())?;
            Some(Geometry::Circle(Circle::new(c.center, radius)))
        }
        Geometry::Arc(a) => {
            let radius = offset_radius(a.radius, distance, (side - a.center).norm())?;
            Some(Geometry::Arc(Arc::new(
                a.center,
                radius,
                a.start_angle,
                a.end_angle,
            )))
        }
        Geometry::Rectangle(r) => {
            let bbox = r.bounding_box();
            let d = Vector2::new(distance, distance);
            if bbox.contains(side) {
                // 向内收缩不能吃掉矩形
                if r.width() <= 2.0 * distance + EPSILON || r.height() <= 2.0 * distance + EPSILON {
                    return None;
                }
                Some(Geometry::Rectangle(Rectangle::new(
                    bbox.min + d,
                    bbox.max - d,
                )))
            } else {
                Some(Geometry::Rectangle(Rectangle::new(
                    bbox.min - d,
                    bbox.max + d,
                )))
            }
        }
        Geometry::Polyline(pl) => offset_polyline(pl, distance, side).map(Geometry::Polyline),
    }
}

/// 圆/圆弧的半径偏移：点在外侧加、内侧减；减空返回 None
fn offset_radius(radius: f64, distance: f64, side_distance: f64) -> Option<f64> {
    let new_radius = if side_distance > radius {
        radius + distance
    } else {
        radius - distance
    };
    (new_radius > EPSILON).then_some(new_radius)
}

fn offset_polyline(pl: &Polyline, distance: f64, side: &Point2) -> Option<Polyline> {
    let segments = pl.segments();
    if segments.is_empty() {
        return None;
    }

    // 距指针最近的段决定偏移侧
    let nearest = segments
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            a.distance_to_point(side)
                .total_cmp(&b.distance_to_point(side))
        })
        .map(|(i, _)| i)?;

    let normals: Vec<Vector2> = segments
        .iter()
        .map(|seg| {
            let dir = normalize_or_zero(seg.end - seg.start);
            Vector2::new(-dir.y, dir.x)
        })
        .collect();
    if normals.iter().any(|n| *n == Vector2::zeros()) {
        return None; // 含退化段
    }

    let s = (side - segments[nearest].start).dot(&normals[nearest]);
    if s.abs() <= EPSILON {
        return None;
    }
    let sign = s.signum();

    let shifted: Vec<Line> = segments
        .iter()
        .zip(&normals)
        .map(|(seg, n)| {
            let shift = n * distance * sign;
            Line::new(seg.start + shift, seg.end + shift)
        })
        .collect();

    // 角点取相邻偏移段的延长线交点；平行段直接用段端点
    let corner = |prev: &Line, next: &Line| line_line_infinite(prev, next).unwrap_or(next.start);

    let vertices = if pl.closed {
        let n = shifted.len();
        (0..n)
            .map(|i| corner(&shifted[(i + n - 1) % n], &shifted[i]))
            .collect()
    } else {
        let mut vertices = Vec::with_capacity(pl.vertices.len());
        vertices.push(shifted[0].start);
        for pair in shifted.windows(2) {
            vertices.push(corner(&pair[0], &pair[1]));
        }
        vertices.push(shifted[shifted.len() - 1].end);
        vertices
    };
    Some(Polyline::new(vertices, pl.closed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_line_side() {
        let line = Geometry::Line(Line::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)));

        let above = offset_geometry(&line, 2.0, &Point2::new(5.0, 3.0)).unwrap();
        match above {
            Geometry::Line(l) => {
                assert!((l.start.y - 2.0).abs() < EPSILON);
                assert!((l.end.y - 2.0).abs() < EPSILON);
            }
            other => panic!("expected line, got {other:?}"),
        }

        let below = offset_geometry(&line, 2.0, &Point2::new(5.0, -3.0)).unwrap();
        match below {
            Geometry::Line(l) => assert!((l.start.y + 2.0).abs() < EPSILON),
            other => panic!("expected line, got {other:?}"),
        }
    }

    #[test]
    fn test_offset_circle_in_and_out() {
        let circle = Geometry::Circle(Circle::new(Point2::origin(), 5.0));

        match offset_geometry(&circle, 2.0, &Point2::new(10.0, 0.0)).unwrap() {
            Geometry::Circle(c) => assert!((c.radius - 7.0).abs() < EPSILON),
            other => panic!("expected circle, got {other:?}"),
        }
        match offset_geometry(&circle, 2.0, &Point2::new(1.0, 0.0)).unwrap() {
            Geometry::Circle(c) => assert!((c.radius - 3.0).abs() < EPSILON),
            other => panic!("expected circle, got {other:?}"),
        }

        // 内偏移吃掉整个圆
        assert!(offset_geometry(&circle, 6.0, &Point2::new(1.0, 0.0)).is_none());
    }

    #[test]
    fn test_offset_open_polyline_corner() {
        // L 形折线向外偏移，角点在两偏移段延长线交点
        let pl = Geometry::Polyline(Polyline::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 0.0),
                Point2::new(10.0, 10.0),
            ],
            false,
        ));
        match offset_geometry(&pl, 1.0, &Point2::new(5.0, -3.0)).unwrap() {
            Geometry::Polyline(out) => {
                assert_eq!(out.vertices.len(), 3);
                assert!((out.vertices[0].y + 1.0).abs() < EPSILON);
                // 角点同时满足两段的偏移
                assert!((out.vertices[1].x - 11.0).abs() < 1e-9);
                assert!((out.vertices[1].y + 1.0).abs() < 1e-9);
                assert!((out.vertices[2].x - 11.0).abs() < EPSILON);
            }
            other => panic!("expected polyline, got {other:?}"),
        }
    }

    #[test]
    fn test_offset_command_flow() {
        let mut doc = Document::new();
        let id = doc.add_geometry(Geometry::Line(Line::new(
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
        )));

        let mut cmd = OffsetCommand::new();
        cmd.start(&mut doc);
        cmd.handle_input(&mut doc, &InputEvent::Distance(2.0));
        cmd.handle_input(&mut doc, &InputEvent::Selection(vec![id]));
        let t = cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(5.0, 5.0)));
        assert!(matches!(t, Transition::Completed(_)));

        // 原实体不动，新增一条平行线
        assert_eq!(doc.len(), 2);
        assert!(doc.entity(id).is_some());
    }

    #[test]
    fn test_negative_distance_refused() {
        let mut doc = Document::new();
        let mut cmd = OffsetCommand::new();
        cmd.start(&mut doc);
        let t = cmd.handle_input(&mut doc, &InputEvent::Distance(-1.0));
        assert!(matches!(t, Transition::Handled));
        // 仍在距离阶段
        let t = cmd.handle_input(&mut doc, &InputEvent::Distance(1.0));
        assert!(matches!(t, Transition::Handled));
    }

    #[test]
    fn test_offset_undo_removes_copy() {
        let mut doc = Document::new();
        let id = doc.add_geometry(Geometry::Circle(Circle::new(Point2::origin(), 5.0)));

        let mut cmd = OffsetCommand::new();
        cmd.start(&mut doc);
        cmd.handle_input(&mut doc, &InputEvent::Distance(1.0));
        cmd.handle_input(&mut doc, &InputEvent::Selection(vec![id]));
        let t = cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(20.0, 0.0)));
        let mut result = match t {
            Transition::Completed(r) => r,
            other => panic!("expected completion, got {other:?}"),
        };
        assert_eq!(doc.len(), 2);

        result.undo.as_mut().unwrap()(&mut doc);
        assert_eq!(doc.len(), 1);
        result.redo.as_mut().unwrap()(&mut doc);
        assert_eq!(doc.len(), 2);
    }
}
