//! 几何变换
//!
//! 修改类命令（移动/复制/旋转/缩放/镜像）使用的纯变换函数。
//! 所有变换返回新值，不做原地修改。

use crate::geometry::{Arc, Circle, Geometry, Line, Polyline, Rectangle};
use crate::math::{rotate_vec, Point2, Vector2};

/// 点平移
#[inline]
pub fn translated_point(p: &Point2, delta: &Vector2) -> Point2 {
    p + delta
}

/// 点绕中心旋转（弧度，逆时针）
#[inline]
pub fn rotated_point(p: &Point2, center: &Point2, angle: f64) -> Point2 {
    center + rotate_vec(&(p - center), angle)
}

/// 点以中心缩放
#[inline]
pub fn scaled_point(p: &Point2, center: &Point2, factor: f64) -> Point2 {
    center + (p - center) * factor
}

/// 点关于直线（p1-p2）镜像
pub fn mirrored_point(p: &Point2, p1: &Point2, p2: &Point2) -> Point2 {
    let axis = crate::math::normalize_or_zero(p2 - p1);
    if axis == Vector2::zeros() {
        // 轴退化为一个点：关于该点做中心对称
        return Point2::new(2.0 * p1.x - p.x, 2.0 * p1.y - p.y);
    }
    let w = p - p1;
    let proj = axis * w.dot(&axis);
    let foot = p1 + proj;
    foot + (foot - p)
}

/// 几何平移
pub fn translated(geometry: &Geometry, delta: &Vector2) -> Geometry {
    map_points(geometry, |p| translated_point(p, delta), 1.0)
}

/// 几何绕中心旋转
pub fn rotated_about(geometry: &Geometry, center: &Point2, angle: f64) -> Geometry {
    match geometry {
        Geometry::Arc(a) => Geometry::Arc(Arc::new(
            rotated_point(&a.center, center, angle),
            a.radius,
            a.start_angle + angle,
            a.end_angle + angle,
        )),
        // 旋转会破坏矩形的轴对齐性：转为闭合多段线
        Geometry::Rectangle(r) => {
            let corners: Vec<Point2> = r
                .edges()
                .iter()
                .map(|e| rotated_point(&e.start, center, angle))
                .collect();
            Geometry::Polyline(Polyline::new(corners, true))
        }
        other => map_points(other, |p| rotated_point(p, center, angle), 1.0),
    }
}

/// 几何以中心缩放（factor > 0）
pub fn scaled_about(geometry: &Geometry, center: &Point2, factor: f64) -> Geometry {
    match geometry {
        Geometry::Arc(a) => Geometry::Arc(Arc::new(
            scaled_point(&a.center, center, factor),
            a.radius * factor,
            a.start_angle,
            a.end_angle,
        )),
        other => map_points(other, |p| scaled_point(p, center, factor), factor),
    }
}

/// 几何关于直线镜像
///
/// 镜像反转方向：圆弧重新推导角度并交换端点，保持扫角仍按
/// 逆时针约定度量。
pub fn mirrored_across(geometry: &Geometry, p1: &Point2, p2: &Point2) -> Geometry {
    match geometry {
        Geometry::Arc(a) => {
            let center = mirrored_point(&a.center, p1, p2);
            let start = mirrored_point(&a.start_point(), p1, p2);
            let end = mirrored_point(&a.end_point(), p1, p2);
            // 原起点镜像后成为终点
            let new_start = (end.y - center.y).atan2(end.x - center.x);
            let new_end = (start.y - center.y).atan2(start.x - center.x);
            Geometry::Arc(Arc::new(center, a.radius, new_start, new_end))
        }
        // 镜像同样破坏轴对齐性：矩形转为闭合多段线
        Geometry::Rectangle(r) => {
            let corners: Vec<Point2> = r
                .edges()
                .iter()
                .map(|e| mirrored_point(&e.start, p1, p2))
                .collect();
            Geometry::Polyline(Polyline::new(corners, true))
        }
        other => map_points(other, |p| mirrored_point(p, p1, p2), 1.0),
    }
}

/// 对几何中的每个定义点应用映射；`radius_factor` 用于缩放半径
fn map_points(geometry: &Geometry, f: impl Fn(&Point2) -> Point2, radius_factor: f64) -> Geometry {
    match geometry {
        Geometry::Line(l) => Geometry::Line(Line::new(f(&l.start), f(&l.end))),
        Geometry::Circle(c) => {
            Geometry::Circle(Circle::new(f(&c.center), c.radius * radius_factor))
        }
        Geometry::Arc(a) => Geometry::Arc(Arc::new(
            f(&a.center),
            a.radius * radius_factor,
            a.start_angle,
            a.end_angle,
        )),
        Geometry::Rectangle(r) => {
            Geometry::Rectangle(Rectangle::new(f(&r.corner1), f(&r.corner2)))
        }
        Geometry::Polyline(pl) => Geometry::Polyline(Polyline::new(
            pl.vertices.iter().map(|v| f(v)).collect(),
            pl.closed,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::EPSILON;
    use std::f64::consts::PI;

    #[test]
    fn test_translate_line() {
        let line = Geometry::Line(Line::new(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)));
        let moved = translated(&line, &Vector2::new(5.0, 3.0));
        match moved {
            Geometry::Line(l) => {
                assert_eq!(l.start, Point2::new(5.0, 3.0));
                assert_eq!(l.end, Point2::new(6.0, 3.0));
            }
            _ => panic!("expected line"),
        }
    }

    #[test]
    fn test_rotate_point_quarter_turn() {
        let p = rotated_point(&Point2::new(1.0, 0.0), &Point2::origin(), PI / 2.0);
        assert!(p.x.abs() < EPSILON);
        assert!((p.y - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_scale_circle() {
        let circle = Geometry::Circle(Circle::new(Point2::new(10.0, 0.0), 2.0));
        let scaled = scaled_about(&circle, &Point2::origin(), 2.0);
        match scaled {
            Geometry::Circle(c) => {
                assert_eq!(c.center, Point2::new(20.0, 0.0));
                assert!((c.radius - 4.0).abs() < EPSILON);
            }
            _ => panic!("expected circle"),
        }
    }

    #[test]
    fn test_mirror_point_across_vertical_axis() {
        let p = mirrored_point(
            &Point2::new(3.0, 2.0),
            &Point2::new(0.0, -1.0),
            &Point2::new(0.0, 1.0),
        );
        assert!((p.x + 3.0).abs() < EPSILON);
        assert!((p.y - 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_mirror_arc_keeps_ccw_sweep() {
        // 第一象限的四分之一弧，关于 y 轴镜像后落在第二象限
        let arc = Arc::new(Point2::origin(), 1.0, 0.0, PI / 2.0);
        let mirrored = mirrored_across(
            &Geometry::Arc(arc.clone()),
            &Point2::new(0.0, -1.0),
            &Point2::new(0.0, 1.0),
        );
        match mirrored {
            Geometry::Arc(m) => {
                assert!((m.sweep_angle() - arc.sweep_angle()).abs() < 1e-9);
                // 镜像后的弧覆盖 90°..180°
                assert!(m.contains_angle(3.0 * PI / 4.0));
                assert!(!m.contains_angle(PI / 4.0));
            }
            _ => panic!("expected arc"),
        }
    }

    #[test]
    fn test_rotate_rectangle_becomes_polyline() {
        let rect = Geometry::Rectangle(Rectangle::new(
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 1.0),
        ));
        match rotated_about(&rect, &Point2::origin(), PI / 4.0) {
            Geometry::Polyline(pl) => {
                assert_eq!(pl.vertices.len(), 4);
                assert!(pl.closed);
            }
            _ => panic!("expected polyline"),
        }
    }
}
