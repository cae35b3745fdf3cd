//! 文档存储
//!
//! 实体集合、图层表、选择集与空间索引的唯一所有者。任何公共
//! 修改方法返回前，实体集合与空间索引保持一致——没有其它线程，
//! 也就不存在可被观察到的中间状态。
//!
//! 文档作为显式构造、依赖注入的对象传递给输入循环的持有者，
//! 不存在进程级单例。

use crate::entity::{Entity, EntityId};
use crate::geometry::Geometry;
use crate::layer::{Layer, DEFAULT_LAYER};
use crate::math::BoundingBox2;
use crate::spatial::SpatialIndex;
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::{debug, trace};

/// 绘图文档
#[derive(Debug)]
pub struct Document {
    /// 实体表（插入序迭代，捕捉引擎据此获得确定性的遍历顺序）
    entities: IndexMap<EntityId, Entity>,

    /// 图层表
    layers: IndexMap<String, Layer>,

    /// 选择集；成员必须指向现存实体
    selection: HashSet<EntityId>,

    /// 当前图层名
    current_layer: String,

    /// 空间索引
    index: SpatialIndex,
}

impl Document {
    pub fn new() -> Self {
        let mut layers = IndexMap::new();
        layers.insert(DEFAULT_LAYER.to_string(), Layer::default_layer());

        Self {
            entities: IndexMap::new(),
            layers,
            selection: HashSet::new(),
            current_layer: DEFAULT_LAYER.to_string(),
            index: SpatialIndex::default_grid(),
        }
    }

    // ========== 实体 ==========

    /// 添加实体，返回其 ID
    ///
    /// 此处不做几何校验：不提交退化几何是命令的职责。
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let id = entity.id;
        if let Some(bbox) = entity.bounding_box() {
            self.index.insert(id, bbox);
        }
        trace!(entity = %id, kind = entity.geometry.type_name(), "add entity");
        self.entities.insert(id, entity);
        id
    }

    /// 在当前图层添加几何
    pub fn add_geometry(&mut self, geometry: Geometry) -> EntityId {
        self.add_entity(Entity::new(geometry).with_layer(self.current_layer.clone()))
    }

    /// 按 ID 整体替换实体（不可变值替换，不做原地修补）
    ///
    /// ID 不存在时静默忽略；替换值的 ID 强制与 `id` 一致。
    pub fn replace_entity(&mut self, id: EntityId, mut entity: Entity) {
        if !self.entities.contains_key(&id) {
            return;
        }
        entity.id = id;

        // 几何可能变化：先摘除旧索引记录再重新登记
        self.index.remove(&id);
        if let Some(bbox) = entity.bounding_box() {
            self.index.insert(id, bbox);
        }
        self.entities.insert(id, entity);
    }

    /// 保留实体属性、仅替换几何
    pub fn update_geometry(&mut self, id: EntityId, geometry: Geometry) {
        let Some(existing) = self.entities.get(&id) else {
            return;
        };
        let replaced = existing.clone().with_geometry(geometry);
        self.replace_entity(id, replaced);
    }

    /// 移除实体；同时从索引和选择集中清除。不存在时为静默空操作
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        if self.entities.shift_remove(&id).is_none() {
            return false;
        }
        self.index.remove(&id);
        self.selection.remove(&id);
        trace!(entity = %id, "remove entity");
        true
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // ========== 选择集 ==========

    /// 设置选择集；不存在的 ID 静默丢弃
    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = EntityId>) {
        self.selection = ids
            .into_iter()
            .filter(|id| self.entities.contains_key(id))
            .collect();
    }

    /// 添加到选择集；ID 不存在时为静默空操作
    pub fn add_to_selection(&mut self, id: EntityId) {
        if self.entities.contains_key(&id) {
            self.selection.insert(id);
        }
    }

    pub fn remove_from_selection(&mut self, id: EntityId) {
        self.selection.remove(&id);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selection(&self) -> &HashSet<EntityId> {
        &self.selection
    }

    /// 选择集（按实体插入序，供需要确定顺序的命令使用）
    pub fn selection_ordered(&self) -> Vec<EntityId> {
        self.entities
            .keys()
            .filter(|id| self.selection.contains(id))
            .copied()
            .collect()
    }

    // ========== 空间查询 ==========

    /// 范围查询：返回包围盒与给定矩形相交的实体 ID
    ///
    /// 捕捉候选收集与点击测试的唯一读取路径。相对存储的包围盒
    /// 必须精确：漏报是正确性缺陷，包围盒内的误报交给下游精确
    /// 几何过滤。
    pub fn query_by_bounds(&self, bounds: &BoundingBox2) -> Vec<EntityId> {
        self.index.query_rect(bounds)
    }

    /// 范围查询，返回实体引用（按实体表插入序，保证确定性）
    pub fn query_entities(&self, bounds: &BoundingBox2) -> Vec<&Entity> {
        let hits: HashSet<EntityId> = self.index.query_rect(bounds).into_iter().collect();
        self.entities
            .values()
            .filter(|e| hits.contains(&e.id))
            .collect()
    }

    /// 从当前实体集合整体重建空间索引
    ///
    /// 批量操作绕过逐实体维护后调用；结果与增量维护一致。
    pub fn rebuild_spatial_index(&mut self) {
        debug!(entities = self.entities.len(), "rebuild spatial index");
        self.index.rebuild_from(
            self.entities
                .values()
                .filter_map(|e| e.bounding_box().map(|b| (e.id, b))),
        );
    }

    // ========== 图层 ==========

    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.insert(layer.name.clone(), layer);
    }

    /// 删除图层；其实体重新指派到图层 "0"
    ///
    /// 图层 "0" 不可删除。
    pub fn remove_layer(&mut self, name: &str) -> bool {
        if name == DEFAULT_LAYER || self.layers.shift_remove(name).is_none() {
            return false;
        }
        for entity in self.entities.values_mut() {
            if entity.layer == name {
                entity.layer = DEFAULT_LAYER.to_string();
            }
        }
        if self.current_layer == name {
            self.current_layer = DEFAULT_LAYER.to_string();
        }
        debug!(layer = name, "layer removed, entities reassigned to '0'");
        true
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values()
    }

    /// 设置当前图层；图层不存在时忽略
    pub fn set_current_layer(&mut self, name: &str) {
        if self.layers.contains_key(name) {
            self.current_layer = name.to_string();
        }
    }

    pub fn current_layer(&self) -> &str {
        &self.current_layer
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Circle, Line};
    use crate::math::Point2;

    fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Geometry {
        Geometry::Line(Line::new(Point2::new(x1, y1), Point2::new(x2, y2)))
    }

    #[test]
    fn test_removed_entity_never_queried() {
        let mut doc = Document::new();
        let id = doc.add_geometry(line(0.0, 0.0, 10.0, 10.0));
        let bounds = doc.entity(id).unwrap().bounding_box().unwrap();

        assert!(doc.remove_entity(id));
        // 索引绝不泄露过期条目
        assert!(!doc.query_by_bounds(&bounds).contains(&id));
        assert!(doc.entity(id).is_none());
    }

    #[test]
    fn test_replace_reindexes() {
        let mut doc = Document::new();
        let id = doc.add_geometry(line(0.0, 0.0, 1.0, 1.0));

        doc.update_geometry(id, line(100.0, 100.0, 110.0, 110.0));

        let old = BoundingBox2::new(Point2::new(-1.0, -1.0), Point2::new(2.0, 2.0));
        let new = BoundingBox2::new(Point2::new(99.0, 99.0), Point2::new(111.0, 111.0));
        assert!(!doc.query_by_bounds(&old).contains(&id));
        assert!(doc.query_by_bounds(&new).contains(&id));
    }

    #[test]
    fn test_rebuild_agrees_with_incremental() {
        let mut doc = Document::new();
        let a = doc.add_geometry(line(0.0, 0.0, 10.0, 0.0));
        let b = doc.add_geometry(Geometry::Circle(Circle::new(Point2::new(50.0, 50.0), 5.0)));
        doc.update_geometry(a, line(0.0, 0.0, 20.0, 0.0));
        doc.remove_entity(b);
        let c = doc.add_geometry(line(-30.0, -30.0, -20.0, -20.0));

        let query = BoundingBox2::new(Point2::new(-100.0, -100.0), Point2::new(100.0, 100.0));
        let mut before = doc.query_by_bounds(&query);

        doc.rebuild_spatial_index();
        let mut after = doc.query_by_bounds(&query);

        before.sort();
        after.sort();
        assert_eq!(before, after);
        assert!(after.contains(&a));
        assert!(after.contains(&c));
    }

    #[test]
    fn test_selection_cascades_on_remove() {
        let mut doc = Document::new();
        let id = doc.add_geometry(line(0.0, 0.0, 1.0, 1.0));
        doc.add_to_selection(id);
        assert!(doc.selection().contains(&id));

        doc.remove_entity(id);
        assert!(doc.selection().is_empty());
    }

    #[test]
    fn test_selecting_missing_id_is_noop() {
        let mut doc = Document::new();
        let live = doc.add_geometry(line(0.0, 0.0, 1.0, 1.0));
        let dead = doc.add_geometry(line(2.0, 2.0, 3.0, 3.0));
        doc.remove_entity(dead);

        doc.set_selection([live, dead]);
        assert_eq!(doc.selection().len(), 1);
        doc.add_to_selection(dead);
        assert_eq!(doc.selection().len(), 1);
    }

    #[test]
    fn test_layer_zero_protected() {
        let mut doc = Document::new();
        assert!(!doc.remove_layer(DEFAULT_LAYER));

        doc.add_layer(Layer::new("walls"));
        doc.set_current_layer("walls");
        let id = doc.add_geometry(line(0.0, 0.0, 1.0, 1.0));
        assert_eq!(doc.entity(id).unwrap().layer, "walls");

        assert!(doc.remove_layer("walls"));
        assert_eq!(doc.entity(id).unwrap().layer, DEFAULT_LAYER);
        assert_eq!(doc.current_layer(), DEFAULT_LAYER);
    }

    #[test]
    fn test_replace_missing_id_is_noop() {
        let mut doc = Document::new();
        let ghost = Entity::new(line(0.0, 0.0, 1.0, 1.0));
        let ghost_id = ghost.id;
        doc.replace_entity(ghost_id, ghost);
        assert!(doc.is_empty());
        assert!(doc.entity(ghost_id).is_none());
    }
}
