//! 基础数学类型与向量运算
//!
//! 所有几何都以世界坐标（f64）表示。向量运算全部是无副作用的
//! 全函数：近零向量归一化返回零向量，而不是除以零。

use serde::{Deserialize, Serialize};

/// 2D 点（世界坐标）
pub type Point2 = nalgebra::Point2<f64>;

/// 2D 向量
pub type Vector2 = nalgebra::Vector2<f64>;

/// 几何容差
pub const EPSILON: f64 = 1e-9;

/// 2D 叉积（标量）
#[inline]
pub fn cross(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// 两点距离
#[inline]
pub fn distance(a: &Point2, b: &Point2) -> f64 {
    (b - a).norm()
}

/// 线性插值
#[inline]
pub fn lerp(a: &Point2, b: &Point2, t: f64) -> Point2 {
    a + (b - a) * t
}

/// 归一化；长度低于 EPSILON 时返回零向量
#[inline]
pub fn normalize_or_zero(v: Vector2) -> Vector2 {
    v.try_normalize(EPSILON).unwrap_or_else(Vector2::zeros)
}

/// 向量旋转（弧度，逆时针）
#[inline]
pub fn rotate_vec(v: &Vector2, angle: f64) -> Vector2 {
    let (sin, cos) = angle.sin_cos();
    Vector2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// 轴对齐包围盒
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox2 {
    pub min: Point2,
    pub max: Point2,
}

impl BoundingBox2 {
    /// 从两个任意角点创建（自动排序）
    pub fn new(a: Point2, b: Point2) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// 以某点为中心、半边长为 `half` 的正方形窗口
    pub fn around(center: Point2, half: f64) -> Self {
        Self {
            min: Point2::new(center.x - half, center.y - half),
            max: Point2::new(center.x + half, center.y + half),
        }
    }

    /// 从点集创建；空集返回 None
    pub fn from_points(points: impl IntoIterator<Item = Point2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self::new(first, first);
        for p in iter {
            bbox.expand_to_include(&p);
        }
        Some(bbox)
    }

    /// 扩展以包含指定点
    pub fn expand_to_include(&mut self, p: &Point2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// 合并另一个包围盒
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// 四周外扩 margin
    pub fn inflate(&self, margin: f64) -> Self {
        Self {
            min: Point2::new(self.min.x - margin, self.min.y - margin),
            max: Point2::new(self.max.x + margin, self.max.y + margin),
        }
    }

    pub fn contains(&self, p: &Point2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn center(&self) -> Point2 {
        Point2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_or_zero() {
        let v = normalize_or_zero(Vector2::new(3.0, 4.0));
        assert!((v.norm() - 1.0).abs() < EPSILON);

        // 近零向量不除以零
        let z = normalize_or_zero(Vector2::new(1e-12, -1e-12));
        assert_eq!(z, Vector2::zeros());
    }

    #[test]
    fn test_cross() {
        let a = Vector2::new(1.0, 0.0);
        let b = Vector2::new(0.0, 1.0);
        assert!((cross(&a, &b) - 1.0).abs() < EPSILON);
        assert!((cross(&b, &a) + 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_rotate_vec() {
        let v = rotate_vec(&Vector2::new(1.0, 0.0), std::f64::consts::FRAC_PI_2);
        assert!(v.x.abs() < EPSILON);
        assert!((v.y - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_lerp() {
        let p = lerp(&Point2::new(0.0, 0.0), &Point2::new(10.0, 20.0), 0.5);
        assert!((p.x - 5.0).abs() < EPSILON);
        assert!((p.y - 10.0).abs() < EPSILON);
    }

    #[test]
    fn test_bbox_ordering_insignificant() {
        let a = BoundingBox2::new(Point2::new(5.0, 7.0), Point2::new(1.0, 2.0));
        assert_eq!(a.min, Point2::new(1.0, 2.0));
        assert_eq!(a.max, Point2::new(5.0, 7.0));
    }

    #[test]
    fn test_bbox_intersects() {
        let a = BoundingBox2::new(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
        let b = BoundingBox2::new(Point2::new(5.0, 5.0), Point2::new(15.0, 15.0));
        let c = BoundingBox2::new(Point2::new(20.0, 20.0), Point2::new(30.0, 30.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_bbox_from_points_empty() {
        assert!(BoundingBox2::from_points(std::iter::empty()).is_none());
    }
}
