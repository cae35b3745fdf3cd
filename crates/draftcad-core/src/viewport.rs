//! 视口变换
//!
//! 屏幕坐标与世界坐标之间的纯仿射映射。缩放因子为正的各向同性
//! 标量（像素/世界单位）——捕捉引擎的容差换算依赖这一点。

use crate::math::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// 视口（平移 + 均匀缩放）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// 屏幕原点对应的世界坐标
    pub offset: Point2,
    /// 缩放（像素 / 世界单位，> 0）
    pub scale: f64,
}

impl Viewport {
    pub fn new(offset: Point2, scale: f64) -> Self {
        debug_assert!(scale > 0.0, "viewport scale must be positive");
        Self { offset, scale }
    }

    /// 屏幕坐标 -> 世界坐标
    pub fn to_world(&self, screen: Point2) -> Point2 {
        Point2::new(
            screen.x / self.scale + self.offset.x,
            screen.y / self.scale + self.offset.y,
        )
    }

    /// 世界坐标 -> 屏幕坐标
    pub fn to_screen(&self, world: Point2) -> Point2 {
        Point2::new(
            (world.x - self.offset.x) * self.scale,
            (world.y - self.offset.y) * self.scale,
        )
    }

    /// 平移视口（世界单位）
    pub fn pan(&mut self, delta: Vector2) {
        self.offset += delta;
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Point2::origin(),
            scale: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::EPSILON;

    #[test]
    fn test_round_trip() {
        let vp = Viewport::new(Point2::new(100.0, -50.0), 2.5);
        let world = Point2::new(12.0, 34.0);
        let back = vp.to_world(vp.to_screen(world));
        assert!((back.x - world.x).abs() < EPSILON);
        assert!((back.y - world.y).abs() < EPSILON);
    }

    #[test]
    fn test_scale_is_pixels_per_unit() {
        let vp = Viewport::new(Point2::origin(), 2.0);
        let s = vp.to_screen(Point2::new(10.0, 0.0));
        assert!((s.x - 20.0).abs() < EPSILON);
    }
}
