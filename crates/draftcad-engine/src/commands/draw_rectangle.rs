//! 矩形绘制命令（两个对角点）

use crate::command::{keys, Command, CommandResult, InputEvent, PreviewSet, Transition};
use draftcad_core::document::Document;
use draftcad_core::geometry::{Geometry, Rectangle};
use draftcad_core::math::{Point2, EPSILON};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    SetFirstCorner,
    SetSecondCorner,
}

/// 绘制矩形
pub struct DrawRectangleCommand {
    status: Status,
    corner1: Option<Point2>,
    preview: PreviewSet,
    prompt: String,
}

impl DrawRectangleCommand {
    pub fn new() -> Self {
        Self {
            status: Status::SetFirstCorner,
            corner1: None,
            preview: PreviewSet::new(),
            prompt: String::new(),
        }
    }
}

impl Command for DrawRectangleCommand {
    fn name(&self) -> &'static str {
        "rectangle"
    }

    fn start(&mut self, _doc: &mut Document) {
        self.prompt = "指定第一个角点:".to_string();
    }

    fn prompt(&self) -> &str {
        &self.prompt
    }

    fn reference_point(&self) -> Option<Point2> {
        match self.status {
            Status::SetSecondCorner => self.corner1,
            Status::SetFirstCorner => None,
        }
    }

    fn handle_input(&mut self, doc: &mut Document, input: &InputEvent) -> Transition {
        match input {
            InputEvent::Key(k) if k == keys::ESCAPE => {
                self.cancel(doc);
                Transition::Cancelled
            }
            InputEvent::Point(p) => match self.status {
                Status::SetFirstCorner => {
                    self.corner1 = Some(*p);
                    self.status = Status::SetSecondCorner;
                    self.prompt = "指定对角点:".to_string();
                    Transition::Handled
                }
                Status::SetSecondCorner => {
                    let c1 = match self.corner1 {
                        Some(c) => c,
                        None => return Transition::Ignored,
                    };
                    let rect = Rectangle::new(c1, *p);
                    if rect.width() <= EPSILON || rect.height() <= EPSILON {
                        // 零面积矩形
                        self.prompt = "对角点与第一角点共线，请重新指定:".to_string();
                        return Transition::Handled;
                    }
                    self.preview.clear(doc);
                    let id = doc.add_geometry(Geometry::Rectangle(rect));
                    debug!(entity = %id, "rectangle committed");
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
            InputEvent::MouseMove(p) => match (self.status, self.corner1) {
                (Status::SetSecondCorner, Some(c1)) => {
                    self.preview
                        .replace(doc, vec![Geometry::Rectangle(Rectangle::new(c1, *p))]);
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

    #[test]
    fn test_two_corners_commit() {
        let mut doc = Document::new();
        let mut cmd = DrawRectangleCommand::new();
        cmd.start(&mut doc);

        cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(10.0, 10.0)));
        let t = cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(0.0, 0.0)));
        assert!(matches!(t, Transition::Completed(_)));

        match &doc.entities().next().unwrap().geometry {
            Geometry::Rectangle(r) => {
                assert!((r.width() - 10.0).abs() < EPSILON);
                assert!((r.height() - 10.0).abs() < EPSILON);
            }
            other => panic!("expected rectangle, got {other:?}"),
        };
    }

    #[test]
    fn test_zero_area_refused() {
        let mut doc = Document::new();
        let mut cmd = DrawRectangleCommand::new();
        cmd.start(&mut doc);

        cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(0.0, 0.0)));
        // 对角点与第一角点同一水平线：高度为零
        let t = cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(10.0, 0.0)));
        assert!(matches!(t, Transition::Handled));
        assert!(doc.is_empty());
    }

    #[test]
    fn test_preview_tracks_cursor() {
        let mut doc = Document::new();
        let mut cmd = DrawRectangleCommand::new();
        cmd.start(&mut doc);

        cmd.handle_input(&mut doc, &InputEvent::Point(Point2::new(0.0, 0.0)));
        cmd.handle_input(&mut doc, &InputEvent::MouseMove(Point2::new(5.0, 5.0)));
        cmd.handle_input(&mut doc, &InputEvent::MouseMove(Point2::new(8.0, 3.0)));
        assert_eq!(doc.len(), 1);
        assert!(doc.entities().next().unwrap().is_preview);

        cmd.cancel(&mut doc);
        assert!(doc.is_empty());
    }
}
