//! # Interpolate 模块
//!
//! 递归插值引擎。
//!
//! - [`capture_baseline`]: 补间开始时从目标捕获 `from` 中缺失的起始值
//! - [`apply_interpolation`]: 每帧按进度把插值结果写回目标
//!
//! 两者都沿 `to` 的结构递归，`from` 与目标在同一路径上同步下降。

use crate::error::{TweenError, TweenResult};
use crate::target::Animatable;
use crate::value::{PropertyMap, Value, ValueKind};

/// 捕获起始值
///
/// 对 `to` 中的每个键：
/// - `from` 中已有值（包括显式给出的 0）：保持不变；若两边都是嵌套映射，
///   继续向下只补全缺失的子键
/// - `from` 中没有值：从目标读取。嵌套映射整体深拷贝，
///   之后对目标的原地写入不会影响已捕获的起始值
///
/// 目标缺少属性或结构不一致时返回错误，错误路径为点分隔的完整键路径。
pub fn capture_baseline(
    to: &PropertyMap,
    from: &mut PropertyMap,
    target: &dyn Animatable,
) -> TweenResult<()> {
    for (key, goal) in to {
        match from.get_mut(key) {
            Some(existing) => match (goal, existing) {
                (Value::Leaf(_), Value::Leaf(_)) => {
                    // 显式给出的起始值同样要求目标上存在对应的数值属性
                    match target.property(key) {
                        Some(Value::Leaf(_)) => {}
                        Some(current) => {
                            return Err(TweenError::mismatch(
                                key,
                                ValueKind::Leaf,
                                current.kind(),
                            ));
                        }
                        None => return Err(TweenError::missing(key)),
                    }
                }
                (Value::Node(goal), Value::Node(base)) => {
                    let current = target
                        .property(key)
                        .ok_or_else(|| TweenError::missing(key))?;
                    capture_baseline(goal, base, &current).map_err(|e| e.nested(key))?;
                }
                (goal, existing) => {
                    return Err(TweenError::mismatch(key, goal.kind(), existing.kind()));
                }
            },
            None => {
                let current = target
                    .property(key)
                    .ok_or_else(|| TweenError::missing(key))?;
                match (goal, &current) {
                    (Value::Leaf(_), Value::Leaf(_)) => {}
                    (Value::Node(goal), Value::Node(snapshot)) => {
                        // 快照已包含全部子键，递归只做结构校验
                        let mut snapshot = snapshot.clone();
                        capture_baseline(goal, &mut snapshot, &current)
                            .map_err(|e| e.nested(key))?;
                    }
                    (goal, current) => {
                        return Err(TweenError::mismatch(key, goal.kind(), current.kind()));
                    }
                }
                from.insert(key.clone(), current);
            }
        }
    }
    Ok(())
}

/// 按进度写入插值结果
///
/// 对 `to` 中的每个数值叶子写入 `from + (to - from) * easing(elapsed / duration)`。
/// 同一帧内所有叶子使用相同的进度。
///
/// `from` 中没有对应键的条目会被跳过：只有往返的回程阶段会出现这种情况，
/// 即深拷贝带入、但 `to` 中未声明的子键。
pub fn apply_interpolation(
    to: &PropertyMap,
    from: &PropertyMap,
    target: &mut dyn Animatable,
    duration: f32,
    elapsed: f32,
    easing: &dyn Fn(f32) -> f32,
) -> TweenResult<()> {
    let t = elapsed / duration;

    for (key, goal) in to {
        let Some(base) = from.get(key) else {
            continue;
        };

        match (goal, base) {
            (Value::Node(goal), Value::Node(base)) => {
                let child = target
                    .property_mut(key)
                    .ok_or_else(|| TweenError::missing(key))?;
                apply_interpolation(goal, base, child, duration, elapsed, easing)
                    .map_err(|e| e.nested(key))?;
            }
            (Value::Leaf(goal), Value::Leaf(base)) => {
                let value = base + (goal - base) * easing(t);
                if !target.set_property(key, value) {
                    return Err(TweenError::rejected(key));
                }
            }
            (goal, base) => {
                return Err(TweenError::mismatch(key, goal.kind(), base.kind()));
            }
        }
    }
    Ok(())
}
