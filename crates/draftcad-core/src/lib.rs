//! DraftCAD 核心几何引擎
//!
//! 提供2D几何图元、文档存储、空间索引与对象捕捉。
//!
//! # 架构设计
//!
//! - `geometry`: 封闭的几何枚举与逐类型解析运算
//! - `document`: 实体/图层/选择集的唯一所有者，空间索引随每次
//!   修改保持一致
//! - `snap`: 指针移动时的捕捉候选枚举与最佳候选选取
//!
//! # 示例
//!
//! ```rust
//! use draftcad_core::prelude::*;
//!
//! let mut doc = Document::new();
//! let id = doc.add_geometry(Geometry::Line(Line::new(
//!     Point2::origin(),
//!     Point2::new(100.0, 50.0),
//! )));
//! assert!(doc.entity(id).is_some());
//! ```

pub mod document;
pub mod entity;
pub mod geometry;
pub mod intersect;
pub mod layer;
pub mod math;
pub mod snap;
pub mod spatial;
pub mod transform;
pub mod viewport;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::document::Document;
    pub use crate::entity::{Color, Entity, EntityId};
    pub use crate::geometry::{Arc, Circle, Geometry, Line, Polyline, Rectangle};
    pub use crate::layer::{Layer, DEFAULT_LAYER};
    pub use crate::math::{BoundingBox2, Point2, Vector2, EPSILON};
    pub use crate::snap::{apply_ortho, SnapCandidate, SnapConfig, SnapEngine, SnapKind, SnapMask};
    pub use crate::spatial::SpatialIndex;
    pub use crate::viewport::Viewport;
}
