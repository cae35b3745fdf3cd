//! 两两几何求交
//!
//! 全部为解析解，不做迭代逼近。退化、平行、不相交的情况
//! 一律返回空结果，从不 panic。
//!
//! 交点均限制在线段参数 [0,1] 与圆弧扫角范围内（有界求交，
//! 而非无限直线求交）。

use crate::geometry::{Arc, Circle, Geometry, Line};
use crate::math::{cross, Point2, Vector2, EPSILON};

/// 平行/重根判定容差
const PARALLEL_EPS: f64 = 1e-10;

/// 线段-线段交点（行列式法）
///
/// 行列式绝对值低于 1e-10 视为平行；两个参数都必须落在 [0,1]。
pub fn line_line(l1: &Line, l2: &Line) -> Option<Point2> {
    let d1 = l1.end - l1.start;
    let d2 = l2.end - l2.start;

    let det = cross(&d1, &d2);
    if det.abs() < PARALLEL_EPS {
        return None;
    }

    let w = l2.start - l1.start;
    let t1 = cross(&w, &d2) / det;
    let t2 = cross(&w, &d1) / det;

    if (0.0..=1.0).contains(&t1) && (0.0..=1.0).contains(&t2) {
        Some(l1.start + d1 * t1)
    } else {
        None
    }
}

/// 两条线段所在无限直线的交点（不做 [0,1] 参数限制）
///
/// 延伸/偏移类操作需要越过线段端点求交时使用。
pub fn line_line_infinite(l1: &Line, l2: &Line) -> Option<Point2> {
    let d1 = l1.end - l1.start;
    let d2 = l2.end - l2.start;

    let det = cross(&d1, &d2);
    if det.abs() < PARALLEL_EPS {
        return None;
    }

    let w = l2.start - l1.start;
    let t1 = cross(&w, &d2) / det;
    Some(l1.start + d1 * t1)
}

/// 线段-圆交点（线参数二次方程）
///
/// [0,1] 之外的根丢弃；两根间距小于 1e-10 时视为相切，只保留一个。
pub fn line_circle(line: &Line, circle: &Circle) -> Vec<Point2> {
    let d = line.end - line.start;
    let f = line.start - circle.center;

    let a = d.dot(&d);
    if a < EPSILON {
        return vec![]; // 退化线段
    }

    let b = 2.0 * f.dot(&d);
    let c = f.dot(&f) - circle.radius * circle.radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return vec![];
    }

    let sqrt_disc = discriminant.sqrt();
    let t1 = (-b - sqrt_disc) / (2.0 * a);
    let t2 = (-b + sqrt_disc) / (2.0 * a);

    let mut roots = vec![t1];
    if (t2 - t1).abs() >= PARALLEL_EPS {
        roots.push(t2);
    }

    roots
        .into_iter()
        .filter(|t| (0.0..=1.0).contains(t))
        .map(|t| line.start + d * t)
        .collect()
}

/// 圆-圆交点
///
/// 圆心距大于半径之和、小于半径之差、或两圆同心时无交点；
/// 相切时恰好一个交点。
pub fn circle_circle(c1: &Circle, c2: &Circle) -> Vec<Point2> {
    let d = (c2.center - c1.center).norm();

    if d > c1.radius + c2.radius || d < (c1.radius - c2.radius).abs() || d < EPSILON {
        return vec![];
    }

    let a = (c1.radius * c1.radius - c2.radius * c2.radius + d * d) / (2.0 * d);
    let h_sq = c1.radius * c1.radius - a * a;
    let h = h_sq.max(0.0).sqrt();

    let dir = (c2.center - c1.center) / d;
    let p = c1.center + dir * a;
    let perp = Vector2::new(-dir.y, dir.x);

    if h < PARALLEL_EPS {
        vec![p] // 相切
    } else {
        vec![p + perp * h, p - perp * h]
    }
}

/// 线段-圆弧交点：先与整圆求交，再过滤扫角范围
pub fn line_arc(line: &Line, arc: &Arc) -> Vec<Point2> {
    let circle = Circle::new(arc.center, arc.radius);
    line_circle(line, &circle)
        .into_iter()
        .filter(|p| arc.contains_angle((p.y - arc.center.y).atan2(p.x - arc.center.x)))
        .collect()
}

/// 求交用的基本曲线
enum Curve {
    Seg(Line),
    Circ(Circle),
    ArcSeg(Arc),
}

/// 将几何分解为基本曲线（矩形/多段线展开为边线段）
fn decompose(geometry: &Geometry) -> Vec<Curve> {
    match geometry {
        Geometry::Line(l) => vec![Curve::Seg(l.clone())],
        Geometry::Circle(c) => vec![Curve::Circ(c.clone())],
        Geometry::Arc(a) => vec![Curve::ArcSeg(a.clone())],
        Geometry::Rectangle(r) => r.edges().into_iter().map(Curve::Seg).collect(),
        Geometry::Polyline(pl) => pl.segments().into_iter().map(Curve::Seg).collect(),
    }
}

fn curve_curve(a: &Curve, b: &Curve) -> Vec<Point2> {
    let on_arc = |arc: &Arc, p: &Point2| {
        arc.contains_angle((p.y - arc.center.y).atan2(p.x - arc.center.x))
    };

    match (a, b) {
        (Curve::Seg(l1), Curve::Seg(l2)) => line_line(l1, l2).into_iter().collect(),
        (Curve::Seg(l), Curve::Circ(c)) | (Curve::Circ(c), Curve::Seg(l)) => line_circle(l, c),
        (Curve::Seg(l), Curve::ArcSeg(arc)) | (Curve::ArcSeg(arc), Curve::Seg(l)) => {
            line_arc(l, arc)
        }
        (Curve::Circ(c1), Curve::Circ(c2)) => circle_circle(c1, c2),
        (Curve::Circ(c), Curve::ArcSeg(arc)) | (Curve::ArcSeg(arc), Curve::Circ(c)) => {
            circle_circle(c, &Circle::new(arc.center, arc.radius))
                .into_iter()
                .filter(|p| on_arc(arc, p))
                .collect()
        }
        (Curve::ArcSeg(a1), Curve::ArcSeg(a2)) => circle_circle(
            &Circle::new(a1.center, a1.radius),
            &Circle::new(a2.center, a2.radius),
        )
        .into_iter()
        .filter(|p| on_arc(a1, p) && on_arc(a2, p))
        .collect(),
    }
}

/// 计算两个几何体的全部交点
pub fn intersections(g1: &Geometry, g2: &Geometry) -> Vec<Point2> {
    let curves1 = decompose(g1);
    let curves2 = decompose(g2);

    let mut result = Vec::new();
    for a in &curves1 {
        for b in &curves2 {
            result.extend(curve_curve(a, b));
        }
    }
    result
}
