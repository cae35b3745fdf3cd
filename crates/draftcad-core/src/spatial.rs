//! 空间索引
//!
//! 均匀网格实现：包围盒登记到其覆盖的所有网格单元，范围查询
//! 只访问与查询矩形重叠的单元。对于数千实体的图纸，查询开销
//! 随实体数亚线性增长；线性扫描不满足该要求。
//!
//! 查询结果不保证顺序；相对存储的包围盒必须精确（不允许漏报，
//! 超出包围盒的误报由下游精确几何过滤）。

use crate::entity::EntityId;
use crate::math::BoundingBox2;
use std::collections::{HashMap, HashSet};

/// 均匀网格空间索引
#[derive(Debug, Default)]
pub struct SpatialIndex {
    /// 网格单元边长
    cell_size: f64,

    /// 网格单元 -> 实体列表
    cells: HashMap<(i64, i64), Vec<EntityId>>,

    /// 实体当前登记的包围盒
    bounds: HashMap<EntityId, BoundingBox2>,
}

impl SpatialIndex {
    /// 创建指定单元大小的索引
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            bounds: HashMap::new(),
        }
    }

    fn cell_of(&self, x: f64, y: f64) -> (i64, i64) {
        (
            (x / self.cell_size).floor() as i64,
            (y / self.cell_size).floor() as i64,
        )
    }

    /// 遍历包围盒覆盖的所有网格单元
    fn for_each_cell(&self, bbox: &BoundingBox2, mut f: impl FnMut((i64, i64))) {
        let (min_gx, min_gy) = self.cell_of(bbox.min.x, bbox.min.y);
        let (max_gx, max_gy) = self.cell_of(bbox.max.x, bbox.max.y);
        for gx in min_gx..=max_gx {
            for gy in min_gy..=max_gy {
                f((gx, gy));
            }
        }
    }

    /// 插入或更新实体的包围盒
    ///
    /// 包围盒可能改变，更新等价于删除旧记录后重新插入。
    pub fn insert(&mut self, id: EntityId, bbox: BoundingBox2) {
        self.remove(&id);

        let mut cells_to_fill = Vec::new();
        self.for_each_cell(&bbox, |cell| cells_to_fill.push(cell));
        for cell in cells_to_fill {
            self.cells.entry(cell).or_default().push(id);
        }
        self.bounds.insert(id, bbox);
    }

    /// 移除实体；不存在时返回 false
    pub fn remove(&mut self, id: &EntityId) -> bool {
        let Some(bbox) = self.bounds.remove(id) else {
            return false;
        };

        let mut touched = Vec::new();
        self.for_each_cell(&bbox, |cell| touched.push(cell));
        for cell in touched {
            if let Some(ids) = self.cells.get_mut(&cell) {
                ids.retain(|e| e != id);
                if ids.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
        true
    }

    /// 范围查询：返回包围盒与 `rect` 相交的所有实体
    pub fn query_rect(&self, rect: &BoundingBox2) -> Vec<EntityId> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();

        let (min_gx, min_gy) = self.cell_of(rect.min.x, rect.min.y);
        let (max_gx, max_gy) = self.cell_of(rect.max.x, rect.max.y);

        for gx in min_gx..=max_gx {
            for gy in min_gy..=max_gy {
                let Some(ids) = self.cells.get(&(gx, gy)) else {
                    continue;
                };
                for id in ids {
                    if !seen.insert(*id) {
                        continue;
                    }
                    // 网格只是粗筛，还需精确检查包围盒相交
                    if let Some(bbox) = self.bounds.get(id) {
                        if bbox.intersects(rect) {
                            result.push(*id);
                        }
                    }
                }
            }
        }

        result
    }

    /// 清空后从权威数据整体重建
    ///
    /// 批量操作绕过逐实体维护后调用。
    pub fn rebuild_from(&mut self, entries: impl IntoIterator<Item = (EntityId, BoundingBox2)>) {
        self.cells.clear();
        self.bounds.clear();
        for (id, bbox) in entries {
            self.insert(id, bbox);
        }
    }

    /// 清空索引
    pub fn clear(&mut self) {
        self.cells.clear();
        self.bounds.clear();
    }

    /// 已登记的实体数量
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// 实体当前登记的包围盒
    pub fn bbox_of(&self, id: &EntityId) -> Option<&BoundingBox2> {
        self.bounds.get(id)
    }
}

impl SpatialIndex {
    /// 默认网格大小（100 世界单位）
    pub fn default_grid() -> Self {
        Self::new(100.0)
    }
}
