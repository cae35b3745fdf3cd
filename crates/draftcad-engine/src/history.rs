//! 命令历史
//!
//! 线性撤销/重做栈。游标指向最后一个已生效的条目；撤销后推入
//! 新条目时，游标之后的重做分支被截断，不保留历史树。

use crate::command::CommandResult;
use draftcad_core::document::Document;
use std::time::SystemTime;
use tracing::debug;

/// 一条已完成命令的记录
#[derive(Debug)]
pub struct HistoryEntry {
    /// 命令名（小写）
    pub name: String,
    /// 启动参数
    pub args: Vec<String>,
    /// 撤销/重做闭包
    pub result: CommandResult,
    /// 完成时刻
    pub timestamp: SystemTime,
}

/// 命令历史栈
#[derive(Debug)]
pub struct CommandHistory {
    entries: Vec<HistoryEntry>,
    /// 最后一个已生效条目的下标；-1 表示全部已撤销
    cursor: i64,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursor: -1,
        }
    }

    /// 推入新条目；游标之后的重做分支被丢弃
    pub fn push(&mut self, entry: HistoryEntry) {
        let keep = (self.cursor + 1) as usize;
        if keep < self.entries.len() {
            debug!(
                discarded = self.entries.len() - keep,
                "redo branch truncated"
            );
            self.entries.truncate(keep);
        }
        self.entries.push(entry);
        self.cursor = self.entries.len() as i64 - 1;
    }

    /// 撤销游标处的条目；无可撤销内容时返回 false
    pub fn undo(&mut self, doc: &mut Document) -> bool {
        if self.cursor < 0 {
            return false;
        }
        let entry = &mut self.entries[self.cursor as usize];
        debug!(command = %entry.name, "undo");
        if let Some(f) = entry.result.undo.as_mut() {
            f(doc);
        }
        self.cursor -= 1;
        true
    }

    /// 重做游标后的条目；无可重做内容时返回 false
    pub fn redo(&mut self, doc: &mut Document) -> bool {
        let next = self.cursor + 1;
        if next as usize >= self.entries.len() {
            return false;
        }
        let entry = &mut self.entries[next as usize];
        debug!(command = %entry.name, "redo");
        if let Some(f) = entry.result.redo.as_mut() {
            f(doc);
        }
        self.cursor = next;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.cursor >= 0
    }

    pub fn can_redo(&self) -> bool {
        ((self.cursor + 1) as usize) < self.entries.len()
    }

    /// 最近推入的条目（重复命令用）
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = -1;
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandResult;
    use draftcad_core::document::Document;
    use draftcad_core::geometry::{Geometry, Line};
    use draftcad_core::math::Point2;

    fn add_line_entry(doc: &mut Document, x: f64) -> HistoryEntry {
        let id = doc.add_geometry(Geometry::Line(Line::new(
            Point2::new(x, 0.0),
            Point2::new(x + 1.0, 0.0),
        )));
        let entity = doc.entity(id).unwrap().clone();
        HistoryEntry {
            name: "line".to_string(),
            args: Vec::new(),
            result: CommandResult::new(
                move |d: &mut Document| {
                    d.remove_entity(id);
                },
                move |d: &mut Document| {
                    d.add_entity(entity.clone());
                },
            ),
            timestamp: SystemTime::now(),
        }
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut doc = Document::new();
        let mut history = CommandHistory::new();
        history.push(add_line_entry(&mut doc, 0.0));
        assert_eq!(doc.len(), 1);

        assert!(history.undo(&mut doc));
        assert!(doc.is_empty());
        assert!(!history.undo(&mut doc));

        assert!(history.redo(&mut doc));
        assert_eq!(doc.len(), 1);
        assert!(!history.redo(&mut doc));
    }

    #[test]
    fn test_push_truncates_redo_branch() {
        let mut doc = Document::new();
        let mut history = CommandHistory::new();
        history.push(add_line_entry(&mut doc, 0.0));
        history.push(add_line_entry(&mut doc, 10.0));
        assert_eq!(history.len(), 2);

        history.undo(&mut doc);
        history.push(add_line_entry(&mut doc, 20.0));

        // 被撤销的分支已丢弃
        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        assert_eq!(doc.len(), 2);
    }
}
