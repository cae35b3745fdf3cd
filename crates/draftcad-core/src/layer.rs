//! 图层定义
//!
//! 图层 "0" 永远存在且不可删除；删除其它图层时实体回落到 "0"。

use crate::entity::Color;
use serde::{Deserialize, Serialize};

/// 默认图层名
pub const DEFAULT_LAYER: &str = "0";

/// 图层
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    pub color: Color,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            locked: false,
            color: Color::WHITE,
        }
    }

    /// 默认图层 "0"
    pub fn default_layer() -> Self {
        Self::new(DEFAULT_LAYER)
    }
}
