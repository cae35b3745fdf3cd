//! 实体标识与实体定义
//!
//! 实体 ID 由全局原子计数器生成，在实体生命周期内保持稳定。

use crate::geometry::Geometry;
use crate::layer::DEFAULT_LAYER;
use crate::math::BoundingBox2;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// 全局实体ID生成器
static ENTITY_COUNTER: AtomicU64 = AtomicU64::new(1);

/// 实体唯一标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// 创建新的实体ID
    pub fn new() -> Self {
        Self(ENTITY_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// 原始值（用于日志）
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// RGB 颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// CAD实体
///
/// 一个实体包含几何数据和视觉属性。几何值是不可变语义：
/// 修改通过文档存储按 ID 整体替换完成，预览副本与正式副本
/// 之间不存在别名。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// 唯一标识符
    pub id: EntityId,

    /// 几何类型和数据
    pub geometry: Geometry,

    /// 所属图层名（引用，不拥有）
    pub layer: String,

    /// 颜色覆盖；None 表示继承图层颜色
    pub color: Option<Color>,

    /// 线宽（世界单位，>= 0；屏幕空间最小值由渲染层保证）
    pub lineweight: f64,

    /// 是否为预览实体（命令进行中的临时反馈，终态前必被移除）
    pub is_preview: bool,
}

impl Entity {
    /// 创建新实体（默认图层 "0"）
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: EntityId::new(),
            geometry,
            layer: DEFAULT_LAYER.to_string(),
            color: None,
            lineweight: 0.0,
            is_preview: false,
        }
    }

    /// 获取包围盒
    pub fn bounding_box(&self) -> Option<BoundingBox2> {
        self.geometry.bounding_box()
    }

    /// 使用指定的图层
    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = layer.into();
        self
    }

    /// 使用指定颜色覆盖
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// 标记为预览实体
    pub fn as_preview(mut self) -> Self {
        self.is_preview = true;
        self
    }

    /// 保留身份、替换几何后的新值
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Line;
    use crate::math::Point2;

    #[test]
    fn test_entity_ids_unique() {
        let a = EntityId::new();
        let b = EntityId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_entity_builder() {
        let e = Entity::new(Geometry::Line(Line::new(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
        )))
        .with_layer("walls")
        .with_color(Color::new(255, 0, 0))
        .as_preview();

        assert_eq!(e.layer, "walls");
        assert!(e.is_preview);
        assert_eq!(e.color, Some(Color::new(255, 0, 0)));
    }

    #[test]
    fn test_with_geometry_keeps_identity() {
        let e = Entity::new(Geometry::Line(Line::new(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
        )));
        let id = e.id;
        let e2 = e.with_geometry(Geometry::Line(Line::new(
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
        )));
        assert_eq!(e2.id, id);
    }
}
