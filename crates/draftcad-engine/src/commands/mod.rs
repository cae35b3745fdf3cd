//! 内建命令集
//!
//! 绘制：line / circle / arc / rectangle / polyline
//! 编辑：move / copy / rotate / scale / mirror / trim / extend / offset

pub mod draw_arc;
pub mod draw_circle;
pub mod draw_line;
pub mod draw_polyline;
pub mod draw_rectangle;
pub mod modify_copy;
pub mod modify_extend;
pub mod modify_mirror;
pub mod modify_move;
pub mod modify_offset;
pub mod modify_rotate;
pub mod modify_scale;
pub mod modify_trim;

pub use draw_arc::DrawArcCommand;
pub use draw_circle::DrawCircleCommand;
pub use draw_line::DrawLineCommand;
pub use draw_polyline::DrawPolylineCommand;
pub use draw_rectangle::DrawRectangleCommand;
pub use modify_copy::CopyCommand;
pub use modify_extend::ExtendCommand;
pub use modify_mirror::MirrorCommand;
pub use modify_move::MoveCommand;
pub use modify_offset::OffsetCommand;
pub use modify_rotate::RotateCommand;
pub use modify_scale::ScaleCommand;
pub use modify_trim::TrimCommand;

use crate::engine::CommandEngine;
use draftcad_core::document::Document;
use draftcad_core::entity::EntityId;
use draftcad_core::geometry::Geometry;
use draftcad_core::math::{BoundingBox2, Point2};

/// 点选线段的拾取半径（世界单位）
const PICK_TOLERANCE: f64 = 5.0;

/// 点选拾取：返回拾取半径内距离最近的线段实体
///
/// 修剪/延伸的目标限定为线段；预览实体不参与拾取。
pub(crate) fn pick_line_entity(doc: &Document, p: &Point2) -> Option<EntityId> {
    let window = BoundingBox2::around(*p, PICK_TOLERANCE);
    doc.query_entities(&window)
        .into_iter()
        .filter(|e| !e.is_preview)
        .filter_map(|e| match &e.geometry {
            Geometry::Line(l) => {
                let dist = l.distance_to_point(p);
                (dist <= PICK_TOLERANCE).then_some((e.id, dist))
            }
            _ => None,
        })
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(id, _)| id)
}

/// 注册全部内建命令
pub fn register_builtin(engine: &mut CommandEngine) {
    engine.register("line", Box::new(|_| Box::new(DrawLineCommand::new())));
    engine.register("circle", Box::new(|_| Box::new(DrawCircleCommand::new())));
    engine.register("arc", Box::new(|_| Box::new(DrawArcCommand::new())));
    engine.register(
        "rectangle",
        Box::new(|_| Box::new(DrawRectangleCommand::new())),
    );
    engine.register(
        "polyline",
        Box::new(|_| Box::new(DrawPolylineCommand::new())),
    );
    engine.register("move", Box::new(|_| Box::new(MoveCommand::new())));
    engine.register("copy", Box::new(|_| Box::new(CopyCommand::new())));
    engine.register("rotate", Box::new(|_| Box::new(RotateCommand::new())));
    engine.register("scale", Box::new(|_| Box::new(ScaleCommand::new())));
    engine.register("mirror", Box::new(|_| Box::new(MirrorCommand::new())));
    engine.register("trim", Box::new(|_| Box::new(TrimCommand::new())));
    engine.register("extend", Box::new(|_| Box::new(ExtendCommand::new())));
    engine.register("offset", Box::new(|_| Box::new(OffsetCommand::new())));
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftcad_core::geometry::{Circle, Line};

    #[test]
    fn test_pick_nearest_line() {
        let mut doc = Document::new();
        let near = doc.add_geometry(Geometry::Line(Line::new(
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
        )));
        let far = doc.add_geometry(Geometry::Line(Line::new(
            Point2::new(0.0, 3.0),
            Point2::new(10.0, 3.0),
        )));

        assert_eq!(pick_line_entity(&doc, &Point2::new(5.0, 1.0)), Some(near));
        assert_eq!(pick_line_entity(&doc, &Point2::new(5.0, 2.5)), Some(far));
        assert_eq!(pick_line_entity(&doc, &Point2::new(5.0, 100.0)), None);
    }

    #[test]
    fn test_pick_ignores_non_lines() {
        let mut doc = Document::new();
        doc.add_geometry(Geometry::Circle(Circle::new(Point2::origin(), 5.0)));
        assert_eq!(pick_line_entity(&doc, &Point2::new(5.0, 0.0)), None);
    }
}
