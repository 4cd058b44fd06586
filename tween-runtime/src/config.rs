//! # Config 模块
//!
//! 补间的声明式配置，与构建器方法一一对应。
//!
//! ```json
//! {
//!   "to": { "position": { "x": 200 } },
//!   "duration": 500,
//!   "easing": "outBack",
//!   "pingPong": true,
//!   "chain": { "to": { "alpha": 0 }, "duration": 200 }
//! }
//! ```
//!
//! 所有字段都有默认值，省略即使用 [`Tween::default`] 的对应配置。

use std::fs;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::easing::EasingFunction;
use crate::error::ConfigError;
use crate::interpolate::capture_baseline;
use crate::path::Polyline;
use crate::point::Point;
use crate::target::SharedTarget;
use crate::tween::{Tween, TweenRef};
use crate::value::{PropertyMap, Value};

/// 补间配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweenConfig {
    /// 目标值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<PropertyMap>,

    /// 起始值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<PropertyMap>,

    /// 时长（毫秒）
    #[serde(default)]
    pub duration: f32,

    /// 延迟（毫秒）
    #[serde(default)]
    pub delay: f32,

    /// 额外重复次数
    #[serde(default)]
    pub repeat: u32,

    /// 无限循环
    #[serde(default, rename = "loop")]
    pub looping: bool,

    /// 往返模式
    #[serde(default)]
    pub ping_pong: bool,

    /// 结束后由管理器移除
    #[serde(default)]
    pub expire: bool,

    /// 缓动函数
    #[serde(default)]
    pub easing: EasingFunction,

    /// 路径
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathConfig>,

    /// 链式后继
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<Box<TweenConfig>>,
}

/// 折线路径配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathConfig {
    /// 顶点序列
    pub points: Vec<Point>,

    /// 是否闭合
    #[serde(default)]
    pub closed: bool,

    /// 反向行进
    #[serde(default)]
    pub reverse: bool,
}

impl PathConfig {
    /// 构建折线
    pub fn build(&self) -> Polyline {
        let path = Polyline::from_points(self.points.iter().copied());
        if self.closed { path.close() } else { path }
    }
}

/// 场景配置：一个目标对象与作用于它的一组补间
///
/// 供无界面的播放器和场景检查工具使用。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneConfig {
    /// 目标对象的初始属性
    #[serde(default)]
    pub target: PropertyMap,

    /// 补间列表（按顺序登记）
    #[serde(default)]
    pub tweens: Vec<TweenConfig>,

    /// 帧率
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,

    /// 最大帧数
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_frames: Option<u32>,
}

fn read_json(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl SceneConfig {
    /// 从 JSON 文本解析
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// 从文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&read_json(path.as_ref())?)
    }

    /// 验证配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == Some(0) {
            return Err(ConfigError::Invalid("fps 必须大于 0".to_string()));
        }

        for (i, tween) in self.tweens.iter().enumerate() {
            tween
                .validate()
                .map_err(|e| ConfigError::Invalid(format!("tweens[{i}]: {e}")))?;
        }
        Ok(())
    }

    /// 检查每个补间（包括链式后继）的 `to` / `from` 与目标结构是否一致
    pub fn check_targets(&self) -> Result<(), ConfigError> {
        let target = Value::Node(self.target.clone());

        for (i, tween) in self.tweens.iter().enumerate() {
            let mut current = Some(tween);
            let mut depth = 0;
            while let Some(config) = current {
                if let Some(to) = &config.to {
                    let mut from = config.from.clone().unwrap_or_default();
                    capture_baseline(to, &mut from, &target).map_err(|e| {
                        ConfigError::Invalid(format!("tweens[{i}] chain[{depth}]: {e}"))
                    })?;
                }
                current = config.chain.as_deref();
                depth += 1;
            }
        }
        Ok(())
    }
}

impl TweenConfig {
    /// 从 JSON 文本解析
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// 从文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&read_json(path.as_ref())?)
    }

    /// 验证配置
    ///
    /// 链式后继一并验证，错误信息带上所在的链深度。
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_at(0)
    }

    fn validate_at(&self, depth: usize) -> Result<(), ConfigError> {
        let location = if depth == 0 {
            String::new()
        } else {
            format!("chain[{depth}] ")
        };

        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "{location}duration 必须是非负有限数: {}",
                self.duration
            )));
        }

        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "{location}delay 必须是非负有限数: {}",
                self.delay
            )));
        }

        if let Some(path) = &self.path
            && path.points.len() < 2
        {
            return Err(ConfigError::Invalid(format!(
                "{location}path 至少需要 2 个顶点，实际 {}",
                path.points.len()
            )));
        }

        match &self.chain {
            Some(next) => next.validate_at(depth + 1),
            None => Ok(()),
        }
    }

    /// 链条长度（包括自身）
    pub fn chain_len(&self) -> usize {
        1 + self.chain.as_ref().map_or(0, |next| next.chain_len())
    }
}

impl Tween {
    /// 应用配置（不处理 `chain`）
    pub fn configure(&mut self, config: &TweenConfig) {
        if let Some(to) = &config.to {
            self.set_to(to.clone());
        }
        if let Some(from) = &config.from {
            self.set_from(from.clone());
        }
        self.duration = config.duration;
        self.delay = config.delay;
        self.repeat = config.repeat;
        self.looping = config.looping;
        self.ping_pong = config.ping_pong;
        self.expire = config.expire;
        self.easing = config.easing.ease();
        if let Some(path) = &config.path {
            self.set_path(Some(Rc::new(path.build())), path.reverse);
        }
    }

    /// 由配置创建补间，并按 `chain` 递归创建链式后继
    ///
    /// 返回链条的第一个补间（未激活）。
    pub fn from_config(target: SharedTarget, config: &TweenConfig) -> TweenRef {
        let mut tween = Tween::new(Rc::clone(&target));
        tween.configure(config);
        if let Some(next) = &config.chain {
            tween.chain(Some(Tween::from_config(target, next)));
        }
        tween.shared()
    }
}
