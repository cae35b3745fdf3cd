//! 几何图元定义
//!
//! 支持的基本图元：
//! - 线段 (Line)
//! - 圆 (Circle)
//! - 圆弧 (Arc)
//! - 矩形 (Rectangle)
//! - 多段线 (Polyline)
//!
//! `Geometry` 是封闭的枚举：新增图元种类时，编译器会在所有
//! 分派点（包围盒、交点、变换）强制补齐对应分支。

use crate::math::{BoundingBox2, Point2, Vector2, EPSILON};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// 几何类型枚举
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Line(Line),
    Circle(Circle),
    Arc(Arc),
    Rectangle(Rectangle),
    Polyline(Polyline),
}

impl Geometry {
    /// 获取几何的包围盒；无可计算包围盒（空多段线）返回 None
    pub fn bounding_box(&self) -> Option<BoundingBox2> {
        match self {
            Geometry::Line(l) => Some(l.bounding_box()),
            Geometry::Circle(c) => Some(c.bounding_box()),
            Geometry::Arc(a) => Some(a.bounding_box()),
            Geometry::Rectangle(r) => Some(r.bounding_box()),
            Geometry::Polyline(pl) => pl.bounding_box(),
        }
    }

    /// 获取几何的类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Line(_) => "Line",
            Geometry::Circle(_) => "Circle",
            Geometry::Arc(_) => "Arc",
            Geometry::Rectangle(_) => "Rectangle",
            Geometry::Polyline(_) => "Polyline",
        }
    }

    /// 几何是否退化（零长线段、非正半径、零面积矩形、顶点不足）
    ///
    /// 提交前的校验由命令负责；文档存储本身不做校验。
    pub fn is_degenerate(&self) -> bool {
        match self {
            Geometry::Line(l) => l.length() <= EPSILON,
            Geometry::Circle(c) => c.radius <= EPSILON,
            Geometry::Arc(a) => a.radius <= EPSILON,
            Geometry::Rectangle(r) => r.width() <= EPSILON || r.height() <= EPSILON,
            Geometry::Polyline(pl) => pl.vertices.len() < 2,
        }
    }
}

/// 线段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point2,
    pub end: Point2,
}

impl Line {
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// 计算线段长度
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// 计算线段中点
    pub fn midpoint(&self) -> Point2 {
        Point2::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }

    /// 线段上距离指定点最近的点（投影后夹取到 [0,1]）
    pub fn nearest_point(&self, point: &Point2) -> Point2 {
        let v = self.end - self.start;
        let w = point - self.start;

        let c1 = w.dot(&v);
        if c1 <= 0.0 {
            return self.start;
        }

        let c2 = v.dot(&v);
        if c2 <= c1 {
            return self.end;
        }

        self.start + v * (c1 / c2)
    }

    /// 计算点到线段的距离
    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        (point - self.nearest_point(point)).norm()
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::new(self.start, self.end)
    }
}

/// 圆
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point2, radius: f64) -> Self {
        Self { center, radius }
    }

    /// 获取圆上指定角度的点
    pub fn point_at_angle(&self, angle: f64) -> Point2 {
        Point2::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        )
    }

    /// 圆周上距离指定点最近的点（径向投影）
    ///
    /// 点与圆心重合时退化为角度 0 处的点。
    pub fn nearest_point(&self, point: &Point2) -> Point2 {
        let dir = crate::math::normalize_or_zero(point - self.center);
        if dir == Vector2::zeros() {
            return self.point_at_angle(0.0);
        }
        self.center + dir * self.radius
    }

    /// 计算点到圆周的距离
    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        ((point - self.center).norm() - self.radius).abs()
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::new(
            Point2::new(self.center.x - self.radius, self.center.y - self.radius),
            Point2::new(self.center.x + self.radius, self.center.y + self.radius),
        )
    }
}

/// 圆弧
///
/// 扫角始终从 start_angle 逆时针量到 end_angle；
/// `end_angle < start_angle` 时穿过 0 回绕。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub center: Point2,
    pub radius: f64,
    /// 起始角度（弧度）
    pub start_angle: f64,
    /// 终止角度（弧度）
    pub end_angle: f64,
}

impl Arc {
    pub fn new(center: Point2, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        Self {
            center,
            radius,
            start_angle,
            end_angle,
        }
    }

    /// 从三点创建圆弧（起点、弧上一点、终点）；三点共线返回 None
    pub fn from_three_points(p1: Point2, p2: Point2, p3: Point2) -> Option<Self> {
        let d = 2.0 * (p1.x * (p2.y - p3.y) + p2.x * (p3.y - p1.y) + p3.x * (p1.y - p2.y));

        if d.abs() < EPSILON {
            return None; // 三点共线
        }

        let ux = ((p1.x * p1.x + p1.y * p1.y) * (p2.y - p3.y)
            + (p2.x * p2.x + p2.y * p2.y) * (p3.y - p1.y)
            + (p3.x * p3.x + p3.y * p3.y) * (p1.y - p2.y))
            / d;
        let uy = ((p1.x * p1.x + p1.y * p1.y) * (p3.x - p2.x)
            + (p2.x * p2.x + p2.y * p2.y) * (p1.x - p3.x)
            + (p3.x * p3.x + p3.y * p3.y) * (p2.x - p1.x))
            / d;

        let center = Point2::new(ux, uy);
        let radius = (p1 - center).norm();

        let start_angle = (p1.y - center.y).atan2(p1.x - center.x);
        let mid_angle = (p2.y - center.y).atan2(p2.x - center.x);
        let end_angle = (p3.y - center.y).atan2(p3.x - center.x);

        // 保证弧从起点逆时针扫过中间点；否则交换端点
        let arc = Self::new(center, radius, start_angle, end_angle);
        if arc.contains_angle(mid_angle) {
            Some(arc)
        } else {
            Some(Self::new(center, radius, end_angle, start_angle))
        }
    }

    /// 计算扫过的角度（[0, 2π)）
    pub fn sweep_angle(&self) -> f64 {
        let mut sweep = self.end_angle - self.start_angle;
        while sweep < 0.0 {
            sweep += 2.0 * PI;
        }
        while sweep >= 2.0 * PI {
            sweep -= 2.0 * PI;
        }
        sweep
    }

    /// 获取起点
    pub fn start_point(&self) -> Point2 {
        Point2::new(
            self.center.x + self.radius * self.start_angle.cos(),
            self.center.y + self.radius * self.start_angle.sin(),
        )
    }

    /// 获取终点
    pub fn end_point(&self) -> Point2 {
        Point2::new(
            self.center.x + self.radius * self.end_angle.cos(),
            self.center.y + self.radius * self.end_angle.sin(),
        )
    }

    /// 弧的角平分点
    pub fn mid_point(&self) -> Point2 {
        let mid_angle = self.start_angle + self.sweep_angle() / 2.0;
        Point2::new(
            self.center.x + self.radius * mid_angle.cos(),
            self.center.y + self.radius * mid_angle.sin(),
        )
    }

    /// 检查角度是否在弧的扫角范围内
    pub fn contains_angle(&self, angle: f64) -> bool {
        let two_pi = 2.0 * PI;
        let norm = |mut a: f64| {
            while a < 0.0 {
                a += two_pi;
            }
            a % two_pi
        };

        let a = norm(angle);
        let start = norm(self.start_angle);
        let end = norm(self.end_angle);

        if start <= end {
            a >= start && a <= end
        } else {
            a >= start || a <= end
        }
    }

    /// 真实扫过范围的包围盒：端点加上落入扫角内的象限极值点
    pub fn bounding_box(&self) -> BoundingBox2 {
        let mut bbox = BoundingBox2::new(self.start_point(), self.end_point());

        for angle in [0.0, PI / 2.0, PI, 3.0 * PI / 2.0] {
            if self.contains_angle(angle) {
                bbox.expand_to_include(&Point2::new(
                    self.center.x + self.radius * angle.cos(),
                    self.center.y + self.radius * angle.sin(),
                ));
            }
        }

        bbox
    }
}

/// 矩形（两个对角点）
///
/// 宽高取绝对差，角点顺序不影响包围盒，但决定拖拽预览的方向。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub corner1: Point2,
    pub corner2: Point2,
}

impl Rectangle {
    pub fn new(corner1: Point2, corner2: Point2) -> Self {
        Self { corner1, corner2 }
    }

    pub fn width(&self) -> f64 {
        (self.corner2.x - self.corner1.x).abs()
    }

    pub fn height(&self) -> f64 {
        (self.corner2.y - self.corner1.y).abs()
    }

    /// 几何中心
    pub fn centroid(&self) -> Point2 {
        Point2::new(
            (self.corner1.x + self.corner2.x) / 2.0,
            (self.corner1.y + self.corner2.y) / 2.0,
        )
    }

    /// 四条边（按包围盒角点，逆时针）
    pub fn edges(&self) -> [Line; 4] {
        let bbox = self.bounding_box();
        let (min, max) = (bbox.min, bbox.max);
        let bl = min;
        let br = Point2::new(max.x, min.y);
        let tr = max;
        let tl = Point2::new(min.x, max.y);
        [
            Line::new(bl, br),
            Line::new(br, tr),
            Line::new(tr, tl),
            Line::new(tl, bl),
        ]
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::new(self.corner1, self.corner2)
    }
}

/// 多段线（有序顶点序列）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub vertices: Vec<Point2>,
    /// 是否闭合；闭合且顶点数 > 2 时隐含末顶点到首顶点的线段
    pub closed: bool,
}

impl Polyline {
    pub fn new(vertices: Vec<Point2>, closed: bool) -> Self {
        Self { vertices, closed }
    }

    /// 线段数量
    pub fn segment_count(&self) -> usize {
        if self.vertices.len() < 2 {
            return 0;
        }
        if self.closed && self.vertices.len() > 2 {
            self.vertices.len()
        } else {
            self.vertices.len() - 1
        }
    }

    /// 按顺序展开为线段
    pub fn segments(&self) -> Vec<Line> {
        (0..self.segment_count())
            .map(|i| {
                Line::new(
                    self.vertices[i],
                    self.vertices[(i + 1) % self.vertices.len()],
                )
            })
            .collect()
    }

    /// 计算总长度
    pub fn length(&self) -> f64 {
        self.segments().iter().map(Line::length).sum()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox2> {
        BoundingBox2::from_points(self.vertices.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_length() {
        let line = Line::new(Point2::new(0.0, 0.0), Point2::new(3.0, 4.0));
        assert!((line.length() - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_line_nearest_point_clamped() {
        let line = Line::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0));

        let mid = line.nearest_point(&Point2::new(5.0, 5.0));
        assert!((mid.x - 5.0).abs() < EPSILON);
        assert!(mid.y.abs() < EPSILON);

        // 投影落在线段外时夹取到端点
        let clamped = line.nearest_point(&Point2::new(-5.0, 3.0));
        assert_eq!(clamped, line.start);
    }

    #[test]
    fn test_circle_nearest_point() {
        let circle = Circle::new(Point2::new(0.0, 0.0), 5.0);
        let p = circle.nearest_point(&Point2::new(10.0, 0.0));
        assert!((p.x - 5.0).abs() < EPSILON);
        assert!(p.y.abs() < EPSILON);
    }

    #[test]
    fn test_arc_sweep_wraps_through_zero() {
        // 从 270° 扫到 90°，穿过 0°
        let arc = Arc::new(Point2::origin(), 1.0, 3.0 * PI / 2.0, PI / 2.0);
        assert!((arc.sweep_angle() - PI).abs() < 1e-12);
        assert!(arc.contains_angle(0.0));
        assert!(!arc.contains_angle(PI));
    }

    #[test]
    fn test_arc_swept_bounds() {
        // 第一象限的四分之一圆弧：0° 到 90°
        let arc = Arc::new(Point2::origin(), 10.0, 0.0, PI / 2.0);
        let bbox = arc.bounding_box();
        assert!((bbox.min.x - 0.0).abs() < EPSILON);
        assert!((bbox.min.y - 0.0).abs() < EPSILON);
        assert!((bbox.max.x - 10.0).abs() < EPSILON);
        assert!((bbox.max.y - 10.0).abs() < EPSILON);

        // 不是整圆的包围盒
        assert!(bbox.min.x > -1.0);
    }

    #[test]
    fn test_arc_from_three_points_orientation() {
        // 顶点在上方的半圆，中间点必须落在扫角内
        let arc = Arc::from_three_points(
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(-1.0, 0.0),
        )
        .unwrap();
        assert!((arc.radius - 1.0).abs() < 1e-9);
        assert!(arc.contains_angle(PI / 2.0));
    }

    #[test]
    fn test_rectangle_corner_order() {
        let a = Rectangle::new(Point2::new(10.0, 10.0), Point2::new(0.0, 0.0));
        let b = Rectangle::new(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
        assert_eq!(a.bounding_box(), b.bounding_box());
        assert!((a.width() - 10.0).abs() < EPSILON);
        assert_eq!(a.centroid(), Point2::new(5.0, 5.0));
    }

    #[test]
    fn test_polyline_closed_segments() {
        let open = Polyline::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 0.0),
                Point2::new(10.0, 10.0),
            ],
            false,
        );
        assert_eq!(open.segment_count(), 2);

        let closed = Polyline::new(open.vertices.clone(), true);
        assert_eq!(closed.segment_count(), 3);
        let last = closed.segments().pop().unwrap();
        assert_eq!(last.end, Point2::new(0.0, 0.0));

        // 两点闭合不追加隐含段
        let two = Polyline::new(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)], true);
        assert_eq!(two.segment_count(), 1);
    }

    #[test]
    fn test_degenerate_geometry() {
        let p = Point2::new(1.0, 1.0);
        assert!(Geometry::Line(Line::new(p, p)).is_degenerate());
        assert!(Geometry::Circle(Circle::new(p, 0.0)).is_degenerate());
        assert!(Geometry::Rectangle(Rectangle::new(p, Point2::new(1.0, 5.0))).is_degenerate());
        assert!(Geometry::Polyline(Polyline::new(vec![p], false)).is_degenerate());
        assert!(!Geometry::Line(Line::new(p, Point2::new(2.0, 2.0))).is_degenerate());
    }

    #[test]
    fn test_empty_polyline_has_no_bounds() {
        let g = Geometry::Polyline(Polyline::new(vec![], false));
        assert!(g.bounding_box().is_none());
    }
}
