//! DraftCAD 命令引擎
//!
//! 绘图/编辑命令的状态机、命令注册与分发、撤销/重做历史。
//!
//! # 架构设计
//!
//! - `command`: 命令契约（输入事件、状态迁移、预览集合）
//! - `engine`: 注册表 + 唯一活动命令槽 + 历史；输入事件由调用方
//!   的事件循环泵送进来
//! - `history`: 线性撤销/重做栈，条目携带还原闭包
//! - `commands`: 13 个内建绘制/编辑命令
//!
//! # 示例
//!
//! ```rust
//! use draftcad_core::prelude::*;
//! use draftcad_engine::prelude::*;
//!
//! let mut doc = Document::new();
//! let mut engine = CommandEngine::new();
//! register_builtin(&mut engine);
//!
//! engine.run(&mut doc, "circle", &[]).unwrap();
//! engine.send_input(&mut doc, &InputEvent::Point(Point2::origin()));
//! let outcome = engine.send_input(&mut doc, &InputEvent::Distance(10.0));
//! assert_eq!(outcome, InputOutcome::Completed);
//! assert_eq!(doc.len(), 1);
//!
//! engine.undo(&mut doc);
//! assert!(doc.is_empty());
//! ```

pub mod command;
pub mod commands;
pub mod engine;
pub mod history;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::command::{keys, Command, CommandResult, InputEvent, PreviewSet, Transition};
    pub use crate::commands::register_builtin;
    pub use crate::engine::{CommandEngine, EngineError, InputOutcome};
    pub use crate::history::{CommandHistory, HistoryEntry};
}
