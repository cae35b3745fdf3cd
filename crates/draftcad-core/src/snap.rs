//! 对象捕捉系统
//!
//! 每次指针移动时计算解析几何候选点（端点、中点、圆心、最近点、
//! 两两交点），并在屏幕像素容差内选出最佳者。
//!
//! 候选先在世界坐标中枚举，最终用屏幕距离排序：容差是固定的
//! 屏幕像素值，随视口缩放换算为世界单位。
//!
//! 支持的捕捉类型：
//! - 端点 (Endpoint)
//! - 中点 (Midpoint)
//! - 圆心/形心 (Center)
//! - 最近点 (Nearest)
//! - 交点 (Intersection)
//! - 网格点 (Grid)

use crate::document::Document;
use crate::entity::{Entity, EntityId};
use crate::geometry::Geometry;
use crate::intersect;
use crate::math::{BoundingBox2, Point2};
use crate::viewport::Viewport;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// 捕捉类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapKind {
    /// 端点捕捉
    Endpoint,
    /// 中点捕捉
    Midpoint,
    /// 圆心/形心捕捉
    Center,
    /// 最近点捕捉
    Nearest,
    /// 交点捕捉
    Intersection,
    /// 网格点捕捉
    Grid,
}

impl SnapKind {
    /// 捕捉标记字形（供渲染层绘制提示用）
    pub fn glyph(&self) -> &'static str {
        match self {
            SnapKind::Endpoint => "square",
            SnapKind::Midpoint => "triangle",
            SnapKind::Center => "circle",
            SnapKind::Nearest => "hourglass",
            SnapKind::Intersection => "cross",
            SnapKind::Grid => "dot",
        }
    }
}

/// 捕捉掩码（位域，用于快速启用/禁用捕捉类型）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapMask {
    bits: u8,
}

impl SnapMask {
    pub const ENDPOINT: u8 = 1 << 0;
    pub const MIDPOINT: u8 = 1 << 1;
    pub const CENTER: u8 = 1 << 2;
    pub const NEAREST: u8 = 1 << 3;
    pub const INTERSECTION: u8 = 1 << 4;
    pub const GRID: u8 = 1 << 5;

    pub const NONE: SnapMask = SnapMask { bits: 0 };
    pub const ALL: SnapMask = SnapMask { bits: 0xFF };

    pub fn new(bits: u8) -> Self {
        Self { bits }
    }

    fn bit(kind: SnapKind) -> u8 {
        match kind {
            SnapKind::Endpoint => Self::ENDPOINT,
            SnapKind::Midpoint => Self::MIDPOINT,
            SnapKind::Center => Self::CENTER,
            SnapKind::Nearest => Self::NEAREST,
            SnapKind::Intersection => Self::INTERSECTION,
            SnapKind::Grid => Self::GRID,
        }
    }

    pub fn is_enabled(&self, kind: SnapKind) -> bool {
        self.bits & Self::bit(kind) != 0
    }

    pub fn set(&mut self, kind: SnapKind, enabled: bool) {
        if enabled {
            self.bits |= Self::bit(kind);
        } else {
            self.bits &= !Self::bit(kind);
        }
    }

    pub fn toggle(&mut self, kind: SnapKind) {
        self.bits ^= Self::bit(kind);
    }
}

impl Default for SnapMask {
    fn default() -> Self {
        // 默认启用常用的捕捉类型
        Self {
            bits: Self::ENDPOINT | Self::MIDPOINT | Self::CENTER | Self::INTERSECTION,
        }
    }
}

/// 捕捉配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapConfig {
    /// 捕捉容差（屏幕像素）
    pub tolerance: f64,
    /// 交点捕捉的检索半径（世界单位，独立于逐实体容差窗口）
    pub intersection_radius: f64,
    /// 网格间距（世界单位）
    pub grid_spacing: f64,
    /// 启用的捕捉类型
    pub enabled_kinds: SnapMask,
    /// 捕捉总开关
    pub enabled: bool,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            tolerance: 10.0, // 10像素
            intersection_radius: 50.0,
            grid_spacing: 10.0,
            enabled_kinds: SnapMask::default(),
            enabled: true,
        }
    }
}

/// 捕捉候选
#[derive(Debug, Clone)]
pub struct SnapCandidate {
    /// 捕捉到的世界坐标
    pub point: Point2,
    /// 捕捉类型
    pub kind: SnapKind,
    /// 关联的实体（交点涉及两个实体，记 None）
    pub source: Option<EntityId>,
    /// 到原始指针的屏幕距离
    pub screen_distance: f64,
}

impl SnapCandidate {
    /// 渲染提示字形
    pub fn glyph(&self) -> &'static str {
        self.kind.glyph()
    }
}

/// 捕捉引擎
#[derive(Debug, Clone, Default)]
pub struct SnapEngine {
    config: SnapConfig,
}

impl SnapEngine {
    pub fn new(config: SnapConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SnapConfig {
        &mut self.config
    }

    /// 寻找最佳捕捉点
    ///
    /// # 参数
    /// - `pointer_screen`: 指针的屏幕坐标
    /// - `command_active`: 是否有命令正在运行（无命令时不捕捉）
    ///
    /// 返回屏幕距离最小、且在像素容差内的唯一候选；并列时先生成
    /// 者胜出（实体表迭代顺序在单次调用内确定）。
    pub fn find_snap_point(
        &self,
        doc: &Document,
        viewport: &Viewport,
        pointer_screen: Point2,
        command_active: bool,
    ) -> Option<SnapCandidate> {
        if !self.config.enabled || !command_active {
            return None;
        }

        let pointer_world = viewport.to_world(pointer_screen);
        let world_tolerance = self.config.tolerance / viewport.scale;
        let kinds = self.config.enabled_kinds;

        let mut candidates: Vec<(Point2, SnapKind, Option<EntityId>)> = Vec::new();

        // 1. 网格捕捉（不关联实体）
        if kinds.is_enabled(SnapKind::Grid) {
            candidates.push((
                self.grid_point(pointer_world),
                SnapKind::Grid,
                None,
            ));
        }

        // 2. 逐实体候选：容差窗口内的实体（预览实体不参与捕捉）
        let window = BoundingBox2::around(pointer_world, world_tolerance);
        let nearby: Vec<&Entity> = doc
            .query_entities(&window)
            .into_iter()
            .filter(|e| !e.is_preview)
            .collect();

        for entity in &nearby {
            collect_entity_candidates(entity, &pointer_world, kinds, &mut candidates);
        }

        // 3. 交点候选：独立的、更大的世界半径窗口内两两求交
        if kinds.is_enabled(SnapKind::Intersection) {
            let radius = self.config.intersection_radius;
            let wide = BoundingBox2::around(pointer_world, radius);
            let pair_set: Vec<&Entity> = doc
                .query_entities(&wide)
                .into_iter()
                .filter(|e| !e.is_preview)
                .collect();

            for i in 0..pair_set.len() {
                for j in (i + 1)..pair_set.len() {
                    for p in intersect::intersections(
                        &pair_set[i].geometry,
                        &pair_set[j].geometry,
                    ) {
                        if (p - pointer_world).norm() <= radius {
                            candidates.push((p, SnapKind::Intersection, None));
                        }
                    }
                }
            }
        }

        // 4. 屏幕距离排序：容差外丢弃，最小者胜出（严格小于保证先生成者赢）
        let mut best: Option<SnapCandidate> = None;
        for (point, kind, source) in candidates {
            let dist = (viewport.to_screen(point) - pointer_screen).norm();
            if dist > self.config.tolerance {
                continue;
            }
            if best.as_ref().map_or(true, |b| dist < b.screen_distance) {
                best = Some(SnapCandidate {
                    point,
                    kind,
                    source,
                    screen_distance: dist,
                });
            }
        }

        if let Some(ref b) = best {
            trace!(kind = ?b.kind, x = b.point.x, y = b.point.y, "snap");
        }
        best
    }

    /// 最近的网格点
    fn grid_point(&self, world: Point2) -> Point2 {
        let s = self.config.grid_spacing;
        Point2::new((world.x / s).round() * s, (world.y / s).round() * s)
    }
}

/// 收集单个实体的捕捉候选（交点除外）
fn collect_entity_candidates(
    entity: &Entity,
    pointer: &Point2,
    kinds: SnapMask,
    out: &mut Vec<(Point2, SnapKind, Option<EntityId>)>,
) {
    let id = Some(entity.id);
    let mut push = |p: Point2, kind: SnapKind| out.push((p, kind, id));

    match &entity.geometry {
        Geometry::Line(line) => {
            if kinds.is_enabled(SnapKind::Endpoint) {
                push(line.start, SnapKind::Endpoint);
                push(line.end, SnapKind::Endpoint);
            }
            if kinds.is_enabled(SnapKind::Midpoint) {
                push(line.midpoint(), SnapKind::Midpoint);
            }
            if kinds.is_enabled(SnapKind::Nearest) {
                push(line.nearest_point(pointer), SnapKind::Nearest);
            }
        }
        Geometry::Circle(circle) => {
            if kinds.is_enabled(SnapKind::Center) {
                push(circle.center, SnapKind::Center);
            }
            if kinds.is_enabled(SnapKind::Nearest) {
                push(circle.nearest_point(pointer), SnapKind::Nearest);
            }
        }
        Geometry::Arc(arc) => {
            if kinds.is_enabled(SnapKind::Endpoint) {
                push(arc.start_point(), SnapKind::Endpoint);
                push(arc.end_point(), SnapKind::Endpoint);
            }
            if kinds.is_enabled(SnapKind::Midpoint) {
                push(arc.mid_point(), SnapKind::Midpoint);
            }
            if kinds.is_enabled(SnapKind::Center) {
                push(arc.center, SnapKind::Center);
            }
        }
        Geometry::Rectangle(rect) => {
            let edges = rect.edges();
            if kinds.is_enabled(SnapKind::Endpoint) {
                for edge in &edges {
                    push(edge.start, SnapKind::Endpoint);
                }
            }
            if kinds.is_enabled(SnapKind::Midpoint) {
                for edge in &edges {
                    push(edge.midpoint(), SnapKind::Midpoint);
                }
            }
            if kinds.is_enabled(SnapKind::Center) {
                push(rect.centroid(), SnapKind::Center);
            }
            if kinds.is_enabled(SnapKind::Nearest) {
                for edge in &edges {
                    push(edge.nearest_point(pointer), SnapKind::Nearest);
                }
            }
        }
        Geometry::Polyline(pl) => {
            if kinds.is_enabled(SnapKind::Endpoint) {
                for v in &pl.vertices {
                    push(*v, SnapKind::Endpoint);
                }
            }
            let segments = pl.segments();
            if kinds.is_enabled(SnapKind::Midpoint) {
                for seg in &segments {
                    push(seg.midpoint(), SnapKind::Midpoint);
                }
            }
            if kinds.is_enabled(SnapKind::Nearest) {
                for seg in &segments {
                    push(seg.nearest_point(pointer), SnapKind::Nearest);
                }
            }
        }
    }
}

/// 正交约束
///
/// 把提议点锁到相对参考点增量较大的那根轴上（保持主运动方向）。
/// 没有参考点时原样返回。与捕捉的组合顺序固定：先捕捉、后正交——
/// 精确几何参考优先于轴锁定。
pub fn apply_ortho(reference: Option<Point2>, proposed: Point2) -> Point2 {
    let Some(reference) = reference else {
        return proposed;
    };

    let dx = (proposed.x - reference.x).abs();
    let dy = (proposed.y - reference.y).abs();
    if dx > dy {
        Point2::new(proposed.x, reference.y)
    } else {
        Point2::new(reference.x, proposed.y)
    }
}
