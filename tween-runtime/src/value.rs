//! # Value 模块
//!
//! 补间数据的统一表示：数值叶子或嵌套的属性映射。
//!
//! `to`、`from` 以及基于映射的目标都使用同一种结构，
//! 递归插值在三者之间同步遍历。

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 属性映射（键 -> 值）
pub type PropertyMap = BTreeMap<String, Value>;

/// 补间值
///
/// JSON 中的数字对应 `Leaf`，对象对应 `Node`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// 数值
    Leaf(f32),
    /// 嵌套映射
    Node(PropertyMap),
}

/// 值的种类，用于错误信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Leaf,
    Node,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf => write!(f, "数值"),
            Self::Node => write!(f, "嵌套映射"),
        }
    }
}

impl Value {
    /// 创建空的嵌套映射
    pub fn node() -> Self {
        Self::Node(PropertyMap::new())
    }

    /// 值的种类
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Leaf(_) => ValueKind::Leaf,
            Self::Node(_) => ValueKind::Node,
        }
    }

    /// 作为数值读取
    pub fn as_leaf(&self) -> Option<f32> {
        match self {
            Self::Leaf(v) => Some(*v),
            Self::Node(_) => None,
        }
    }

    /// 作为映射读取
    pub fn as_node(&self) -> Option<&PropertyMap> {
        match self {
            Self::Leaf(_) => None,
            Self::Node(map) => Some(map),
        }
    }

    /// 按点分隔路径读取，例如 `"position.x"`
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(self, |value, key| match value {
            Self::Node(map) => map.get(key),
            Self::Leaf(_) => None,
        })
    }

    /// 按点分隔路径读取数值
    pub fn leaf_at(&self, path: &str) -> Option<f32> {
        self.get_path(path).and_then(Value::as_leaf)
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::node()
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Leaf(v)
    }
}

impl From<PropertyMap> for Value {
    fn from(map: PropertyMap) -> Self {
        Self::Node(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Node(props(iter))
    }
}

/// 由键值对构造属性映射
///
/// ```rust,ignore
/// let goal = props([("x", 100.0), ("y", 50.0)]);
/// let nested = props([("pos", Value::from(props([("x", 10.0)])))]);
/// ```
pub fn props<K, V, I>(entries: I) -> PropertyMap
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
