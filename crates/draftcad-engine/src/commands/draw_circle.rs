//! 圆绘制命令（圆心 + 半径）

use crate::command::{keys, Command, CommandResult, InputEvent, PreviewSet, Transition};
use draftcad_core::document::Document;
use draftcad_core::entity::Entity;
use draftcad_core::geometry::{Circle, Geometry};
use draftcad_core::math::{Point2, EPSILON};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    SetCenter,
    SetRadius,
}

/// 绘制圆
pub struct DrawCircleCommand {
    status: Status,
    center: Option<Point2>,
    preview: PreviewSet,
    prompt: String,
}

impl DrawCircleCommand {
    pub fn new() -> Self {
        Self {
            status: Status::SetCenter,
            center: None,
            preview: PreviewSet::new(),
            prompt: String::new(),
        }
    }

    fn commit(&mut self, doc: &mut Document, center: Point2, radius: f64) -> Transition {
        if radius <= EPSILON {
            self.prompt = "半径必须为正，请重新指定:".to_string();
            return Transition::Handled;
        }
        self.preview.clear(doc);
        let id = doc.add_geometry(Geometry::Circle(Circle::new(center, radius)));
        debug!(entity = %id, radius, "circle committed");
        let entity: Option<Entity> = doc.entity(id).cloned();
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
}

impl Command for DrawCircleCommand {
    fn name(&self) -> &'static str {
        "circle"
    }

    fn start(&mut self, _doc: &mut Document) {
        self.prompt = "指定圆心:".to_string();
    }

    fn prompt(&self) -> &str {
        &self.prompt
    }

    fn reference_point(&self) -> Option<Point2> {
        match self.status {
            Status::SetRadius => self.center,
            Status::SetCenter => None,
        }
    }

    fn handle_input(&mut self, doc: &mut Document, input: &InputEvent) -> Transition {
        match input {
            InputEvent::Key(k) if k == keys::ESCAPE => {
                self.cancel(doc);
                Transition::Cancelled
            }
            InputEvent::Point(p) => match self.status {
                Status::SetCenter => {
                    self.center = Some(*p);
                    self.status = Status::SetRadius;
                    self.prompt = "指定半径:".to_string();
                    Transition::Handled
                }
                Status::SetRadius => {
                    let center = match self.center {
                        Some(c) => c,
                        None => return Transition::Ignored,
                    };
                    self.commit(doc, center, (p - center).norm())
                }
            },
            InputEvent::Distance(r) => match (self.status, self.center) {
                (Status::SetRadius, Some(center)) => self.commit(doc, center, *r),
                _ => Transition::Ignored,
            },
            InputEvent::MouseMove(p) => match (self.status, self.center) {
                (Status::SetRadius, Some(center)) => {
                    let radius = (p - center).norm();
                    if radius > EPSILON {
                        self.preview
                            .replace(doc, vec![Geometry::Circle(Circle::new(center, radius))]);
                    }
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
