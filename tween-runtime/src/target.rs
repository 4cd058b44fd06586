//! # Target 模块
//!
//! 补间目标接口定义。
//!
//! ## 核心概念
//!
//! - `Animatable`: 可被补间写入的属性集合（getter/setter + 嵌套访问）
//! - `SharedTarget`: 外部持有、补间只引用的目标句柄
//!
//! 目标由调用方拥有，补间只持有 `Rc<RefCell<_>>` 引用，
//! 不会整体复制或接管目标。

use std::cell::RefCell;
use std::rc::Rc;

use crate::point::Point;
use crate::value::{PropertyMap, Value};

/// 共享目标句柄
pub type SharedTarget = Rc<RefCell<dyn Animatable>>;

/// 将目标包装为共享句柄
pub fn shared<T: Animatable + 'static>(target: T) -> Rc<RefCell<T>> {
    Rc::new(RefCell::new(target))
}

/// 可动画对象接口
///
/// 对象通过实现此 trait 暴露可被补间读取和写入的属性。
///
/// ## 实现示例
///
/// ```rust,ignore
/// struct Sprite {
///     alpha: f32,
///     position: Point,
/// }
///
/// impl Animatable for Sprite {
///     fn property(&self, key: &str) -> Option<Value> {
///         match key {
///             "alpha" => Some(Value::Leaf(self.alpha)),
///             "position" => Some(Value::from(self.position)),
///             _ => None,
///         }
///     }
///
///     fn set_property(&mut self, key: &str, value: f32) -> bool {
///         match key {
///             "alpha" => { self.alpha = value; true }
///             _ => false,
///         }
///     }
///
///     fn property_mut(&mut self, key: &str) -> Option<&mut dyn Animatable> {
///         match key {
///             "position" => Some(&mut self.position),
///             _ => None,
///         }
///     }
///
///     fn set_position(&mut self, point: Point) {
///         self.position = point;
///     }
/// }
/// ```
pub trait Animatable {
    /// 读取属性的当前值
    ///
    /// 嵌套属性返回完整的深拷贝，调用方拿到的快照与目标不再共享数据。
    fn property(&self, key: &str) -> Option<Value>;

    /// 写入数值属性
    ///
    /// # 返回
    /// - `true`: 写入成功
    /// - `false`: 属性不存在或不是数值
    fn set_property(&mut self, key: &str, value: f32) -> bool;

    /// 获取嵌套属性的可变访问
    fn property_mut(&mut self, _key: &str) -> Option<&mut dyn Animatable> {
        None
    }

    /// 以一次调用写入位置的两个坐标
    fn set_position(&mut self, point: Point) {
        if let Some(position) = self.property_mut("position") {
            position.set_property("x", point.x);
            position.set_property("y", point.y);
        }
    }
}

impl Animatable for Value {
    fn property(&self, key: &str) -> Option<Value> {
        self.as_node()?.get(key).cloned()
    }

    fn set_property(&mut self, key: &str, value: f32) -> bool {
        match self {
            Value::Node(map) => match map.get_mut(key) {
                Some(Value::Leaf(slot)) => {
                    *slot = value;
                    true
                }
                _ => false,
            },
            Value::Leaf(_) => false,
        }
    }

    fn property_mut(&mut self, key: &str) -> Option<&mut dyn Animatable> {
        match self {
            Value::Node(map) => match map.get_mut(key) {
                Some(child) if matches!(child, Value::Node(_)) => Some(child),
                _ => None,
            },
            Value::Leaf(_) => None,
        }
    }

    fn set_position(&mut self, point: Point) {
        let Value::Node(map) = self else {
            return;
        };
        let position = map.entry("position".to_string()).or_default();
        if !matches!(position, Value::Node(_)) {
            *position = Value::node();
        }
        if let Value::Node(coords) = position {
            coords.insert("x".to_string(), Value::Leaf(point.x));
            coords.insert("y".to_string(), Value::Leaf(point.y));
        }
    }
}

impl Animatable for Point {
    fn property(&self, key: &str) -> Option<Value> {
        match key {
            "x" => Some(Value::Leaf(self.x)),
            "y" => Some(Value::Leaf(self.y)),
            _ => None,
        }
    }

    fn set_property(&mut self, key: &str, value: f32) -> bool {
        match key {
            "x" => {
                self.x = value;
                true
            }
            "y" => {
                self.y = value;
                true
            }
            _ => false,
        }
    }

    fn set_position(&mut self, point: Point) {
        *self = point;
    }
}

impl From<Point> for Value {
    fn from(point: Point) -> Self {
        let mut map = PropertyMap::new();
        map.insert("x".to_string(), Value::Leaf(point.x));
        map.insert("y".to_string(), Value::Leaf(point.y));
        Value::Node(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::props;

    #[test]
    fn test_value_target() {
        let mut target = Value::from(props([("alpha", 1.0)]));

        assert_eq!(target.property("alpha"), Some(Value::Leaf(1.0)));
        assert_eq!(target.property("unknown"), None);

        assert!(target.set_property("alpha", 0.5));
        assert_eq!(target.leaf_at("alpha"), Some(0.5));

        // 不存在的属性不会被创建
        assert!(!target.set_property("unknown", 0.0));
        assert_eq!(target.property("unknown"), None);
    }

    #[test]
    fn test_value_nested_access() {
        let mut target = Value::from(props([("pos", Value::from(Point::new(1.0, 2.0)))]));

        // 嵌套属性不能直接写数值
        assert!(!target.set_property("pos", 3.0));

        let pos = target.property_mut("pos").unwrap();
        assert!(pos.set_property("x", 5.0));
        assert_eq!(target.leaf_at("pos.x"), Some(5.0));
    }

    #[test]
    fn test_property_is_snapshot() {
        let mut target = Value::from(props([("pos", Value::from(Point::zero()))]));
        let snapshot = target.property("pos").unwrap();

        target.property_mut("pos").unwrap().set_property("x", 9.0);

        assert_eq!(snapshot.leaf_at("x"), Some(0.0));
        assert_eq!(target.leaf_at("pos.x"), Some(9.0));
    }

    #[test]
    fn test_value_set_position() {
        let mut target = Value::from(props([("alpha", 1.0)]));
        target.set_position(Point::new(3.0, 4.0));
        assert_eq!(target.leaf_at("position.x"), Some(3.0));
        assert_eq!(target.leaf_at("position.y"), Some(4.0));

        target.set_position(Point::new(-1.0, 0.5));
        assert_eq!(target.leaf_at("position.x"), Some(-1.0));
        assert_eq!(target.leaf_at("position.y"), Some(0.5));
    }

    #[test]
    fn test_point_target() {
        let mut point = Point::new(1.0, 1.0);
        assert!(point.set_property("y", 7.0));
        assert!(!point.set_property("z", 7.0));
        assert_eq!(point.property("y"), Some(Value::Leaf(7.0)));
        assert_eq!(Value::from(point), Value::from(Point::new(1.0, 7.0)));
    }
}
