//! 命令契约
//!
//! 每个绘图/编辑工具是一个独立的状态机，采用显式的泵模型：
//! 调用方的事件循环持有"等待下一个输入"的挂起点，命令本身只是
//! 纯粹的状态机，无需事件循环即可单元测试。

use draftcad_core::document::Document;
use draftcad_core::entity::{Entity, EntityId};
use draftcad_core::geometry::Geometry;
use draftcad_core::math::{Point2, Vector2};

/// 常用按键标识
pub mod keys {
    pub const ESCAPE: &str = "Escape";
    pub const ENTER: &str = "Enter";
}

/// 路由给活动命令的输入事件
///
/// 原始文本/键盘布局的解析属于被排除的 UI 层；到达这里的事件
/// 已经是类型化的值。
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// 确认的点（世界坐标，可能已被捕捉/正交修正）
    Point(Point2),
    /// 指针移动（世界坐标，驱动预览）
    MouseMove(Point2),
    /// 按键标识
    Key(String),
    /// 实体选择
    Selection(Vec<EntityId>),
    /// 标量距离
    Distance(f64),
    /// 角度（弧度）
    Angle(f64),
    /// 相对坐标增量
    Relative(Vector2),
    /// 文本输入
    Text(String),
}

/// 命令完成结果：撤销/重做闭包，恰好捕获还原所需的实体与偏移
pub struct CommandResult {
    pub undo: Option<Box<dyn FnMut(&mut Document) + Send>>,
    pub redo: Option<Box<dyn FnMut(&mut Document) + Send>>,
}

impl CommandResult {
    /// 无撤销内容的空结果
    pub fn empty() -> Self {
        Self {
            undo: None,
            redo: None,
        }
    }

    pub fn new(
        undo: impl FnMut(&mut Document) + Send + 'static,
        redo: impl FnMut(&mut Document) + Send + 'static,
    ) -> Self {
        Self {
            undo: Some(Box::new(undo)),
            redo: Some(Box::new(redo)),
        }
    }
}

impl std::fmt::Debug for CommandResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandResult")
            .field("undo", &self.undo.is_some())
            .field("redo", &self.redo.is_some())
            .finish()
    }
}

/// 一次输入泵送后的状态迁移
#[derive(Debug)]
pub enum Transition {
    /// 当前子状态不期待该输入，静默忽略（调用方可回落到全局快捷键）
    Ignored,
    /// 输入已消费，命令继续运行
    Handled,
    /// 命令成功完成
    Completed(CommandResult),
    /// 命令被取消（预览已全部收回）
    Cancelled,
}

/// 命令 trait - 所有绘图/编辑工具的核心接口
///
/// 任何退出路径（完成、取消、被新命令抢占）之后，命令创建的
/// 预览实体必须已全部从文档移除。
pub trait Command: Send {
    /// 命令名（小写）
    fn name(&self) -> &'static str;

    /// 启动：设置初始提示
    fn start(&mut self, doc: &mut Document);

    /// 当前用户提示
    fn prompt(&self) -> &str;

    /// 正交约束的参考点（无则返回 None）
    fn reference_point(&self) -> Option<Point2> {
        None
    }

    /// 处理一个输入事件，推进内部子状态
    fn handle_input(&mut self, doc: &mut Document, input: &InputEvent) -> Transition;

    /// 取消：同步收回全部预览实体
    fn cancel(&mut self, doc: &mut Document);
}

/// 预览集合
///
/// 预览实体的替换式维护：每次指针移动整组替换，绝不累积重复。
/// 几何数量不变时按 ID 原位替换，保持文档中恰好一份预览。
#[derive(Debug, Default)]
pub struct PreviewSet {
    ids: Vec<EntityId>,
}

impl PreviewSet {
    pub fn new() -> Self {
        Self { ids: Vec::new() }
    }

    /// 用新几何整组替换当前预览
    pub fn replace(&mut self, doc: &mut Document, geometries: Vec<Geometry>) {
        if self.ids.len() == geometries.len() {
            for (id, geometry) in self.ids.iter().zip(geometries) {
                doc.update_geometry(*id, geometry);
            }
        } else {
            self.clear(doc);
            for geometry in geometries {
                let entity = Entity::new(geometry)
                    .with_layer(doc.current_layer().to_string())
                    .as_preview();
                self.ids.push(doc.add_entity(entity));
            }
        }
    }

    /// 移除全部预览实体
    pub fn clear(&mut self, doc: &mut Document) {
        for id in self.ids.drain(..) {
            doc.remove_entity(id);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
