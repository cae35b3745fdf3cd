//! 命令引擎
//!
//! 命令注册表、唯一活动命令槽与命令历史的持有者。文档与引擎均
//! 由调用方构造并显式传入，方法签名里的 `&mut Document` 就是
//! 全部依赖。
//!
//! 不变量：任意时刻至多一个活动命令。启动新命令前，旧命令先被
//! 同步取消并收回其全部预览。

use crate::command::{Command, InputEvent, Transition};
use crate::history::{CommandHistory, HistoryEntry};
use draftcad_core::document::Document;
use draftcad_core::math::Point2;
use std::collections::HashMap;
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info, warn};

/// 命令引擎错误
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

/// 输入分发结果（对调用方隐藏命令内部迁移细节）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// 无活动命令，或活动命令不消费该输入
    Ignored,
    /// 输入已消费
    Handled,
    /// 活动命令完成，结果已入历史
    Completed,
    /// 活动命令被取消
    Cancelled,
}

/// 命令工厂：由启动参数构造命令实例
pub type CommandFactory = Box<dyn Fn(&[String]) -> Box<dyn Command> + Send>;

struct ActiveCommand {
    command: Box<dyn Command>,
    name: String,
    args: Vec<String>,
}

/// 命令引擎
pub struct CommandEngine {
    registry: HashMap<String, CommandFactory>,
    active: Option<ActiveCommand>,
    history: CommandHistory,
}

impl CommandEngine {
    pub fn new() -> Self {
        Self {
            registry: HashMap::new(),
            active: None,
            history: CommandHistory::new(),
        }
    }

    /// 注册命令工厂；命令名统一小写
    pub fn register(&mut self, name: &str, factory: CommandFactory) {
        self.registry.insert(name.to_lowercase(), factory);
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.contains_key(&name.to_lowercase())
    }

    /// 启动命令（名称大小写不敏感）
    ///
    /// 名称未注册时返回错误且不改变任何状态；否则先同步取消当前
    /// 活动命令，再启动新命令。
    pub fn run(&mut self, doc: &mut Document, name: &str, args: &[String]) -> Result<(), EngineError> {
        let key = name.to_lowercase();
        if !self.registry.contains_key(&key) {
            warn!(command = %name, "unknown command");
            return Err(EngineError::UnknownCommand(name.to_string()));
        }

        self.cancel(doc);

        let Some(factory) = self.registry.get(&key) else {
            return Err(EngineError::UnknownCommand(name.to_string()));
        };
        let mut command = factory(args);
        info!(command = %key, "command started");
        command.start(doc);
        self.active = Some(ActiveCommand {
            command,
            name: key,
            args: args.to_vec(),
        });
        Ok(())
    }

    /// 取消当前活动命令；无活动命令时为幂等空操作
    pub fn cancel(&mut self, doc: &mut Document) -> bool {
        let Some(mut active) = self.active.take() else {
            return false;
        };
        debug!(command = %active.name, "command cancelled");
        active.command.cancel(doc);
        true
    }

    /// 向活动命令分发一个输入事件
    ///
    /// 命令完成时其结果立即入历史；取消与忽略不产生历史条目。
    pub fn send_input(&mut self, doc: &mut Document, input: &InputEvent) -> InputOutcome {
        let Some(mut active) = self.active.take() else {
            return InputOutcome::Ignored;
        };

        match active.command.handle_input(doc, input) {
            Transition::Ignored => {
                self.active = Some(active);
                InputOutcome::Ignored
            }
            Transition::Handled => {
                self.active = Some(active);
                InputOutcome::Handled
            }
            Transition::Completed(result) => {
                info!(command = %active.name, "command completed");
                self.history.push(HistoryEntry {
                    name: active.name,
                    args: active.args,
                    result,
                    timestamp: SystemTime::now(),
                });
                InputOutcome::Completed
            }
            Transition::Cancelled => {
                debug!(command = %active.name, "command cancelled by input");
                InputOutcome::Cancelled
            }
        }
    }

    /// 撤销最近一条历史
    pub fn undo(&mut self, doc: &mut Document) -> bool {
        self.history.undo(doc)
    }

    /// 重做最近撤销的历史
    pub fn redo(&mut self, doc: &mut Document) -> bool {
        self.history.redo(doc)
    }

    /// 以原参数重新启动最近完成的命令；历史为空时返回 Ok(false)
    pub fn repeat_last(&mut self, doc: &mut Document) -> Result<bool, EngineError> {
        let Some(entry) = self.history.last() else {
            return Ok(false);
        };
        let (name, args) = (entry.name.clone(), entry.args.clone());
        self.run(doc, &name, &args)?;
        Ok(true)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.name.as_str())
    }

    /// 活动命令的当前提示
    pub fn prompt(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.command.prompt())
    }

    /// 活动命令的正交参考点
    pub fn reference_point(&self) -> Option<Point2> {
        self.active.as_ref().and_then(|a| a.command.reference_point())
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }
}

impl Default for CommandEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::keys;
    use crate::commands::register_builtin;

    fn engine() -> CommandEngine {
        let mut engine = CommandEngine::new();
        register_builtin(&mut engine);
        engine
    }

    #[test]
    fn test_unknown_command_rejected() {
        let mut doc = Document::new();
        let mut engine = engine();
        let err = engine.run(&mut doc, "frobnicate", &[]);
        assert!(matches!(err, Err(EngineError::UnknownCommand(_))));
        assert!(!engine.is_active());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_command_name_case_insensitive() {
        let mut doc = Document::new();
        let mut engine = engine();
        assert!(engine.run(&mut doc, "LINE", &[]).is_ok());
        assert_eq!(engine.active_name(), Some("line"));
    }

    #[test]
    fn test_new_command_cancels_active() {
        let mut doc = Document::new();
        let mut engine = engine();
        engine.run(&mut doc, "line", &[]).unwrap();
        assert_eq!(
            engine.send_input(&mut doc, &InputEvent::Point(Point2::origin())),
            InputOutcome::Handled
        );
        engine.send_input(&mut doc, &InputEvent::MouseMove(Point2::new(5.0, 5.0)));
        assert!(!doc.is_empty()); // 预览存在

        // B 启动抢占 A：A 的预览全部收回
        engine.run(&mut doc, "circle", &[]).unwrap();
        assert_eq!(engine.active_name(), Some("circle"));
        assert!(doc.entities().all(|e| !e.is_preview));
    }

    #[test]
    fn test_idle_cancel_idempotent() {
        let mut doc = Document::new();
        let mut engine = engine();
        assert!(!engine.cancel(&mut doc));
        assert!(!engine.cancel(&mut doc));
        assert_eq!(
            engine.send_input(&mut doc, &InputEvent::Point(Point2::origin())),
            InputOutcome::Ignored
        );
    }

    #[test]
    fn test_cancelled_command_leaves_no_history() {
        let mut doc = Document::new();
        let mut engine = engine();
        engine.run(&mut doc, "line", &[]).unwrap();
        let outcome = engine.send_input(&mut doc, &InputEvent::Key(keys::ESCAPE.to_string()));
        assert_eq!(outcome, InputOutcome::Cancelled);
        assert!(!engine.is_active());
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_repeat_last_restarts_command() {
        let mut doc = Document::new();
        let mut engine = engine();
        engine.run(&mut doc, "circle", &[]).unwrap();
        engine.send_input(&mut doc, &InputEvent::Point(Point2::origin()));
        engine.send_input(&mut doc, &InputEvent::Distance(5.0));
        assert!(!engine.is_active());
        assert_eq!(engine.history().len(), 1);

        assert!(engine.repeat_last(&mut doc).unwrap());
        assert_eq!(engine.active_name(), Some("circle"));
    }

    #[test]
    fn test_repeat_last_empty_history() {
        let mut doc = Document::new();
        let mut engine = engine();
        assert!(!engine.repeat_last(&mut doc).unwrap());
    }
}
