//! 圆弧绘制命令（三点：起点、弧上一点、终点）
//!
//! 三点共线时拒绝提交并重新等待终点。

use crate::command::{keys, Command, CommandResult, InputEvent, PreviewSet, Transition};
use draftcad_core::document::Document;
use draftcad_core::geometry::{Arc, Geometry, Line};
use draftcad_core::math::Point2;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    SetStart,
    SetSecond,
    SetEnd,
}

/// 绘制圆弧
pub struct DrawArcCommand {
    status: Status,
    p1: Option<Point2>,
    p2: Option<Point2>,
    preview: PreviewSet,
    prompt: String,
}

impl DrawArcCommand {
    pub fn new() -> Self {
        Self {
            status: Status::SetStart,
            p1: None,
            p2: None,
            preview: PreviewSet::new(),
            prompt: String::new(),
        }
    }
}

impl Command for DrawArcCommand {
    fn name(&self) -> &'static str {
        "arc"
    }

    fn start(&mut self, _doc: &mut Document) {
        self.prompt = "指定圆弧起点:".to_string();
    }

    fn prompt(&self) -> &str {
        &self.prompt
    }

    fn reference_point(&self) -> Option<Point2> {
        match self.status {
            Status::SetStart => None,
            Status::SetSecond => self.p1,
            Status::SetEnd => self.p2,
        }
    }

    fn handle_input(&mut self, doc: &mut Document, input: &InputEvent) -> Transition {
        match input {
            InputEvent::Key(k) if k == keys::ESCAPE => {
                self.cancel(doc);
                Transition::Cancelled
            }
            InputEvent::Point(p) => match self.status {
                Status::SetStart => {
                    self.p1 = Some(*p);
                    self.status = Status::SetSecond;
                    self.prompt = "指定弧上第二点:".to_string();
                    Transition::Handled
                }
                Status::SetSecond => {
                    self.p2 = Some(*p);
                    self.status = Status::SetEnd;
                    self.prompt = "指定圆弧终点:".to_string();
                    Transition::Handled
                }
                Status::SetEnd => {
                    let (p1, p2) = match (self.p1, self.p2) {
                        (Some(a), Some(b)) => (a, b),
                        _ => return Transition::Ignored,
                    };
                    let Some(arc) = Arc::from_three_points(p1, p2, *p) else {
                        // 三点共线
                        self.prompt = "三点共线，请指定不同的终点:".to_string();
                        return Transition::Handled;
                    };
                    self.preview.clear(doc);
                    let id = doc.add_geometry(Geometry::Arc(arc));
                    debug!(entity = %id, "arc committed");
                    let entity = doc.entity(id).cloned();
                    Transition::Completed(CommandResult::new(
                        move |d: &mut Document| {
                            d.remove_entity(id);
                        },
                        move |d: &mut Document| {
                            if let Some(e) = &entity {
                                d.add_entity(e.clone());
                            }
                        },
                    ))
                }
            },
            InputEvent::MouseMove(p) => match self.status {
                Status::SetStart => Transition::Ignored,
                Status::SetSecond => {
                    if let Some(p1) = self.p1 {
                        self.preview
                            .replace(doc, vec![Geometry::Line(Line::new(p1, *p))]);
                    }
                    Transition::Handled
                }
                Status::SetEnd => {
                    let (p1, p2) = match (self.p1, self.p2) {
                        (Some(a), Some(b)) => (a, b),
                        _ => return Transition::Ignored,
                    };
                    // 共线时退回弦线预览
                    let geometry = match Arc::from_three_points(p1, p2, *p) {
                        Some(arc) => Geometry::Arc(arc),
                        None => Geometry::Line(Line::new(p1, *p)),
                    };
                    self.preview.replace(doc, vec![geometry]);
                    Transition::Handled
                }
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
    use std::f64::consts::PI;

    #[test]
    fn test_three_points_commit_arc() {
        let mut doc = Document::new();
        let mut cmd = DrawArcCommand::new();
        cmd.start(&mut doc);

        cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(1.0, 0.0)));
        cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(0.0, 1.0)));
        let t = cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(-1.0, 0.0)));
        assert!(matches!(t, Transition::Completed(_)));

        match &doc.entities().next().unwrap().geometry {
            Geometry::Arc(a) => {
                assert!((a.radius - 1.0).abs() < 1e-9);
                assert!(a.contains_angle(PI / 2.0));
            }
            other => panic!("expected arc, got {other:?}"),
        };
    }

    #[test]
    fn test_collinear_points_refused() {
        let mut doc = Document::new();
        let mut cmd = DrawArcCommand::new();
        cmd.start(&mut doc);

        cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(0.0, 0.0)));
        cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(5.0, 0.0)));
        let t = cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(10.0, 0.0)));
        assert!(matches!(t, Transition::Handled));
        assert!(doc.is_empty());

        // 之后给出合法终点仍可完成
        let t = cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(10.0, 5.0)));
        assert!(matches!(t, Transition::Completed(_)));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_preview_falls_back_to_chord_when_collinear() {
        let mut doc = Document::new();
        let mut cmd = DrawArcCommand::new();
        cmd.start(&mut doc);

        cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(0.0, 0.0)));
        cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(5.0, 0.0)));
        cmd.handle_input(&mut doc, &InputEvent::MouseMove(Point2::new(10.0, 0.0)));

        let entity = doc.entities().next().unwrap();
        assert!(entity.is_preview);
        assert!(matches!(entity.geometry, Geometry::Line(_)));

        cmd.handle_input(&mut doc, &InputEvent::MouseMove(Point2::new(10.0, 5.0)));
        assert!(matches!(
            doc.entities().next().unwrap().geometry,
            Geometry::Arc(_)
        ));
        assert_eq!(doc.len(), 1);
    }
}
