//! 多段线绘制命令
//!
//! 顶点逐个累积：`u` 撤销最近一个顶点，`c` 闭合（至少 3 个顶点），
//! Enter 以开放多段线结束（至少 2 个顶点）。预览分两部分：已定
//! 顶点链与最后顶点到指针的橡皮筋段。

use crate::command::{keys, Command, CommandResult, InputEvent, PreviewSet, Transition};
use draftcad_core::document::Document;
use draftcad_core::geometry::{Geometry, Line, Polyline};
use draftcad_core::math::{Point2, EPSILON};
use tracing::debug;

/// 绘制多段线
pub struct DrawPolylineCommand {
    vertices: Vec<Point2>,
    preview: PreviewSet,
    prompt: String,
}

impl DrawPolylineCommand {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            preview: PreviewSet::new(),
            prompt: String::new(),
        }
    }

    fn update_prompt(&mut self) {
        self.prompt = match self.vertices.len() {
            0 => "指定起点:".to_string(),
            1 => "指定下一点 或 [放弃(U)]:".to_string(),
            2 => "指定下一点 或 [放弃(U)/Enter 结束]:".to_string(),
            _ => "指定下一点 或 [闭合(C)/放弃(U)/Enter 结束]:".to_string(),
        };
    }

    fn refresh_preview(&mut self, doc: &mut Document, cursor: Option<Point2>) {
        let mut geometries = Vec::new();
        if self.vertices.len() >= 2 {
            geometries.push(Geometry::Polyline(Polyline::new(
                self.vertices.clone(),
                false,
            )));
        }
        if let (Some(last), Some(cursor)) = (self.vertices.last(), cursor) {
            geometries.push(Geometry::Line(Line::new(*last, cursor)));
        }
        self.preview.replace(doc, geometries);
    }

    fn commit(&mut self, doc: &mut Document, closed: bool) -> Transition {
        self.preview.clear(doc);
        let polyline = Polyline::new(std::mem::take(&mut self.vertices), closed);
        let id = doc.add_geometry(Geometry::Polyline(polyline));
        debug!(entity = %id, closed, "polyline committed");
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
}

impl Command for DrawPolylineCommand {
    fn name(&self) -> &'static str {
        "polyline"
    }

    fn start(&mut self, _doc: &mut Document) {
        self.update_prompt();
    }

    fn prompt(&self) -> &str {
        &self.prompt
    }

    fn reference_point(&self) -> Option<Point2> {
        self.vertices.last().copied()
    }

    fn handle_input(&mut self, doc: &mut Document, input: &InputEvent) -> Transition {
        match input {
            InputEvent::Key(k) if k == keys::ESCAPE => {
                self.cancel(doc);
                Transition::Cancelled
            }
            InputEvent::Key(k) if k == keys::ENTER => {
                if self.vertices.len() < 2 {
                    self.cancel(doc);
                    return Transition::Cancelled;
                }
                self.commit(doc, false)
            }
            InputEvent::Key(k) if k.eq_ignore_ascii_case("c") => {
                // 闭合需要至少 3 个顶点
                if self.vertices.len() < 3 {
                    self.prompt = "顶点不足，无法闭合:".to_string();
                    return Transition::Handled;
                }
                self.commit(doc, true)
            }
            InputEvent::Key(k) if k.eq_ignore_ascii_case("u") => {
                if self.vertices.pop().is_none() {
                    return Transition::Handled;
                }
                self.update_prompt();
                self.refresh_preview(doc, None);
                Transition::Handled
            }
            InputEvent::Point(p) => {
                if let Some(last) = self.vertices.last() {
                    if (p - last).norm() <= EPSILON {
                        // 重复顶点拒绝
                        self.prompt = "与上一顶点重合，请指定不同的点:".to_string();
                        return Transition::Handled;
                    }
                }
                self.vertices.push(*p);
                self.update_prompt();
                Transition::Handled
            }
            InputEvent::MouseMove(p) => {
                if self.vertices.is_empty() {
                    return Transition::Ignored;
                }
                self.refresh_preview(doc, Some(*p));
                Transition::Handled
            }
            _ => Transition::Ignored,
        }
    }

    fn cancel(&mut self, doc: &mut Document) {
        self.preview.clear(doc);
        self.vertices.clear();
    }
}
