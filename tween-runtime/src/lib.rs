//! # Tween Runtime
//!
//! 基于时间轴的补间动画核心库。
//!
//! ## 架构概述
//!
//! `tween-runtime` 不持有计时器，也不做渲染。宿主每帧把经过的时间传进来，
//! 补间按进度把插值结果写回宿主拥有的目标对象：
//!
//! ```text
//! Host                          Runtime
//!   │                              │
//!   │──── update(delta_ms) ──────►│ 推进时间轴
//!   │                              │ 写入目标属性
//!   │◄─── Vec<(TweenId, TweenEvent)> │
//!   │                              │
//! ```
//!
//! ## 核心类型
//!
//! - [`Tween`]：补间实例（时间轴状态机）
//! - [`TweenManager`]：补间登记表，统一推进并汇总事件
//! - [`Animatable`]：目标对象接口
//! - [`Value`]：数值叶子或嵌套属性映射
//! - [`TweenPath`]：路径几何接口，默认实现 [`Polyline`]
//!
//! ## 使用示例
//!
//! ```ignore
//! use tween_runtime::{EasingFunction, TweenManager, Value, props, shared};
//!
//! let sprite = shared(Value::from(props([("alpha", 1.0)])));
//! let manager = TweenManager::new();
//!
//! let fade = manager.create_tween(sprite.clone());
//! {
//!     let mut fade = fade.borrow_mut();
//!     fade.set_to(props([("alpha", 0.0)]));
//!     fade.duration = 300.0;
//!     fade.easing = EasingFunction::OutQuad.ease();
//!     fade.start();
//! }
//!
//! loop {
//!     for (id, event) in manager.update(16.0) {
//!         // ...
//!     }
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`tween`]：补间实例与生命周期事件
//! - [`interpolate`]：递归插值（捕获起始值、写入插值结果）
//! - [`manager`]：补间管理器
//! - [`easing`]：缓动函数
//! - [`path`]：路径插值
//! - [`config`]：声明式配置
//! - [`error`]：错误类型定义

pub mod config;
pub mod easing;
pub mod error;
pub mod interpolate;
pub mod manager;
pub mod path;
pub mod point;
pub mod target;
pub mod tween;
pub mod value;

// 重导出核心类型
pub use config::{PathConfig, SceneConfig, TweenConfig};
pub use easing::{Ease, EasingFunction};
pub use error::{ConfigError, TweenError, TweenResult};
pub use interpolate::{apply_interpolation, capture_baseline};
pub use manager::{ManagerHandle, TweenManager};
pub use path::{Polyline, TweenPath};
pub use point::Point;
pub use target::{Animatable, SharedTarget, shared};
pub use tween::{ListenerId, Tween, TweenEvent, TweenId, TweenRef};
pub use value::{PropertyMap, Value, ValueKind, props};
