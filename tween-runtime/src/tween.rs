//! # Tween 模块
//!
//! 单个补间实例：时间轴状态机 + 递归插值 + 可选的路径插值 + 链式后继。
//!
//! ## 状态流转
//!
//! ```text
//! 未激活 ──start()──► 延迟 ──► Start ──► 推进 ──┬─► PingPong（回程）──► 推进
//!                                               ├─► Repeat ──► 推进
//!                                               └─► End ──► 激活链式后继
//! ```
//!
//! 所有时间都由外部每帧传入的增量累积，补间自身不持有计时器。

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace, warn};

use crate::easing::{Ease, EasingFunction};
use crate::error::TweenResult;
use crate::interpolate::{apply_interpolation, capture_baseline};
use crate::manager::ManagerHandle;
use crate::path::TweenPath;
use crate::target::SharedTarget;
use crate::value::PropertyMap;

/// 共享补间句柄
pub type TweenRef = Rc<RefCell<Tween>>;

static NEXT_TWEEN_ID: AtomicU64 = AtomicU64::new(1);

/// 补间 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(pub u64);

impl TweenId {
    fn next() -> Self {
        Self(NEXT_TWEEN_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TweenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tween({})", self.0)
    }
}

/// 补间生命周期事件
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenEvent {
    /// 首次推进（延迟结束后）
    Start,
    /// 推进一帧，携带累计进度（毫秒，回程阶段包含去程时长）
    Update(f32),
    /// 被 `stop()` 停止
    Stop,
    /// 去程结束，进入回程
    PingPong,
    /// 完成一次重复，携带已完成的重复次数
    Repeat(u32),
    /// 彻底结束
    End,
}

/// 监听器 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(TweenId, &TweenEvent)>;

/// 补间实例
///
/// 把目标上的数值属性从起始值（`from`，未给出时在开始时从目标捕获）
/// 插值到目标值（`to`）。由外部每帧调用 [`Tween::update`] 驱动。
///
/// 事件监听器在 `update` 内同步调用，监听器中不要再借用同一个补间。
pub struct Tween {
    id: TweenId,
    /// 目标对象（外部持有）
    pub target: Option<SharedTarget>,
    to: Option<PropertyMap>,
    from: Option<PropertyMap>,

    /// 总时长（毫秒）；往返模式下去程和回程各占一半
    pub duration: f32,
    /// 开始前的延迟（毫秒）
    pub delay: f32,
    /// 额外重复次数
    pub repeat: u32,
    /// 无限循环
    pub looping: bool,
    /// 往返模式
    pub ping_pong: bool,
    /// 结束后由管理器自动移除
    pub expire: bool,
    /// 缓动函数
    pub easing: Ease,

    /// 路径（可选）
    path: Option<Rc<dyn TweenPath>>,
    /// 反向沿路径行进
    pub path_reverse: bool,
    path_from: f32,
    path_to: f32,

    active: bool,
    is_started: bool,
    is_ended: bool,
    delay_elapsed: f32,
    elapsed: f32,
    repeat_count: u32,
    ping_pong_active: bool,

    chain_next: Option<TweenRef>,
    pub(crate) manager: Option<ManagerHandle>,

    listeners: Vec<(ListenerId, Listener)>,
    next_listener_id: u64,
}

impl Default for Tween {
    fn default() -> Self {
        Self {
            id: TweenId::next(),
            target: None,
            to: None,
            from: None,
            duration: 0.0,
            delay: 0.0,
            repeat: 0,
            looping: false,
            ping_pong: false,
            expire: false,
            easing: EasingFunction::Linear.ease(),
            path: None,
            path_reverse: false,
            path_from: 0.0,
            path_to: 0.0,
            active: false,
            is_started: false,
            is_ended: false,
            delay_elapsed: 0.0,
            elapsed: 0.0,
            repeat_count: 0,
            ping_pong_active: false,
            chain_next: None,
            manager: None,
            listeners: Vec::new(),
            next_listener_id: 1,
        }
    }
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("id", &self.id)
            .field("active", &self.active)
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed)
            .field("repeat_count", &self.repeat_count)
            .field("ping_pong_active", &self.ping_pong_active)
            .field("is_started", &self.is_started)
            .field("is_ended", &self.is_ended)
            .field("has_path", &self.path.is_some())
            .field("has_chain", &self.chain_next.is_some())
            .finish()
    }
}

impl Tween {
    /// 创建绑定到目标的补间（未激活）
    pub fn new(target: SharedTarget) -> Self {
        Self {
            target: Some(target),
            ..Self::default()
        }
    }

    /// 包装为共享句柄
    pub fn shared(self) -> TweenRef {
        Rc::new(RefCell::new(self))
    }

    // ========== 构建 ==========

    /// 设置目标值
    pub fn to(mut self, data: PropertyMap) -> Self {
        self.to = Some(data);
        self
    }

    /// 设置起始值（未给出的键在开始时从目标捕获）
    pub fn from(mut self, data: PropertyMap) -> Self {
        self.from = Some(data);
        self
    }

    /// 设置时长（毫秒）
    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    /// 设置延迟（毫秒）
    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    /// 设置额外重复次数
    pub fn with_repeat(mut self, repeat: u32) -> Self {
        self.repeat = repeat;
        self
    }

    /// 设置无限循环
    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// 设置往返模式
    pub fn with_ping_pong(mut self, ping_pong: bool) -> Self {
        self.ping_pong = ping_pong;
        self
    }

    /// 设置结束后是否由管理器移除
    pub fn with_expire(mut self, expire: bool) -> Self {
        self.expire = expire;
        self
    }

    /// 使用内置缓动函数
    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing.ease();
        self
    }

    /// 使用自定义缓动函数
    pub fn with_ease_fn(mut self, ease: impl Fn(f32) -> f32 + 'static) -> Self {
        self.easing = Rc::new(ease);
        self
    }

    /// 沿路径移动目标位置
    pub fn with_path(mut self, path: Rc<dyn TweenPath>, reverse: bool) -> Self {
        self.set_path(Some(path), reverse);
        self
    }

    /// 设置目标值（已共享的补间使用）
    pub fn set_to(&mut self, data: PropertyMap) {
        self.to = Some(data);
    }

    /// 设置起始值（已共享的补间使用）
    pub fn set_from(&mut self, data: PropertyMap) {
        self.from = Some(data);
    }

    /// 设置或移除路径
    pub fn set_path(&mut self, path: Option<Rc<dyn TweenPath>>, reverse: bool) {
        self.path = path;
        self.path_reverse = reverse;
    }

    // ========== 控制 ==========

    /// 激活
    pub fn start(&mut self) {
        self.active = true;
    }

    /// 停止（不重置进度，再次 `start()` 从当前位置继续）
    pub fn stop(&mut self) {
        self.active = false;
        self.emit(TweenEvent::Stop);
    }

    /// 从管理器中移除
    pub fn remove(&mut self) {
        if let Some(manager) = self.manager.as_ref().and_then(ManagerHandle::upgrade) {
            manager.remove(self.id);
        }
    }

    /// 设置链式后继，未给出时创建绑定到同一目标的新补间
    ///
    /// 返回后继，便于继续构建链条。后继只在本补间自然结束时被激活。
    pub fn chain(&mut self, next: Option<TweenRef>) -> TweenRef {
        let next = next.unwrap_or_else(|| {
            Tween {
                target: self.target.clone(),
                ..Tween::default()
            }
            .shared()
        });
        self.chain_next = Some(Rc::clone(&next));
        next
    }

    /// 重置时间轴与状态，保留配置
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.repeat_count = 0;
        self.delay_elapsed = 0.0;
        self.is_started = false;
        self.is_ended = false;

        if self.ping_pong_active {
            self.swap_legs();
            self.ping_pong_active = false;
        }
    }

    /// 恢复全部默认配置
    ///
    /// 保留 ID、目标、管理器引用与监听器。
    pub fn clear(&mut self) {
        let id = self.id;
        let target = self.target.take();
        let manager = self.manager.take();
        let listeners = std::mem::take(&mut self.listeners);
        let next_listener_id = self.next_listener_id;

        *self = Self {
            id,
            target,
            manager,
            listeners,
            next_listener_id,
            ..Self::default()
        };
    }

    // ========== 事件 ==========

    /// 注册事件监听器
    pub fn on_event(&mut self, listener: impl FnMut(TweenId, &TweenEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// 移除事件监听器
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: TweenEvent) {
        trace!(tween = %self.id, event = ?event, "补间事件");
        let id = self.id;
        for (_, listener) in &mut self.listeners {
            listener(id, &event);
        }
        // 登记在管理器中时，事件同时进入管理器的队列
        if let Some(manager) = self.manager.as_ref().and_then(ManagerHandle::upgrade) {
            manager.record(id, event);
        }
    }

    // ========== 更新 ==========

    /// 推进一帧
    ///
    /// # 参数
    /// - `_delta`: 帧缩放增量（保留给调度器使用）
    /// - `delta_ms`: 本帧经过的毫秒数
    ///
    /// # 返回
    /// - `Ok(())`: 正常推进，或因配置不完整跳过本帧
    /// - `Err(_)`: `to`/`from` 与目标结构不一致，补间已被停用
    pub fn update(&mut self, _delta: f32, delta_ms: f32) -> TweenResult<()> {
        let result = self.advance(delta_ms);
        if let Err(e) = &result {
            self.active = false;
            warn!(tween = %self.id, error = %e, "补间数据与目标结构不一致，已停用");
        }
        result
    }

    fn advance(&mut self, delta_ms: f32) -> TweenResult<()> {
        // 没有任何插值内容的补间（只用于延迟或链式）不受此门槛限制
        let has_payload = self.to.is_some() || self.path.is_some();
        if has_payload && !self.can_update() {
            return Ok(());
        }

        if self.delay > self.delay_elapsed {
            self.delay_elapsed += delta_ms;
            return Ok(());
        }

        if !self.is_started {
            self.parse_data()?;
            self.is_started = true;
            debug!(tween = %self.id, "补间开始");
            self.emit(TweenEvent::Start);
        }

        let time = self.effective_duration();
        if time <= self.elapsed {
            return Ok(());
        }

        let tentative = self.elapsed + delta_ms;
        let ended = tentative >= time;
        self.elapsed = if ended { time } else { tentative };
        self.apply(time)?;

        let progress = if self.ping_pong_active {
            time + self.elapsed
        } else {
            self.elapsed
        };
        self.emit(TweenEvent::Update(progress));

        if ended {
            self.finish_leg();
        }
        Ok(())
    }

    /// 一段（去程或回程）结束
    fn finish_leg(&mut self) {
        if self.ping_pong && !self.ping_pong_active {
            self.ping_pong_active = true;
            self.swap_legs();
            debug!(tween = %self.id, "进入回程");
            self.emit(TweenEvent::PingPong);
            self.elapsed = 0.0;
            return;
        }

        if self.looping || self.repeat > self.repeat_count {
            self.repeat_count = self.repeat_count.saturating_add(1);
            debug!(tween = %self.id, count = self.repeat_count, "补间重复");
            self.emit(TweenEvent::Repeat(self.repeat_count));
            self.elapsed = 0.0;

            if self.ping_pong_active {
                self.swap_legs();
                self.ping_pong_active = false;
            }
            return;
        }

        self.is_ended = true;
        self.active = false;
        debug!(tween = %self.id, "补间结束");
        self.emit(TweenEvent::End);
        self.activate_chain();
    }

    fn activate_chain(&mut self) {
        let Some(next) = self.chain_next.clone() else {
            return;
        };

        let next_id = match next.try_borrow_mut() {
            Ok(mut successor) => {
                // 未登记的前驱不覆盖后继已有的管理器引用
                if let Some(handle) = &self.manager {
                    successor.manager = Some(handle.clone());
                }
                successor.start();
                successor.id
            }
            Err(_) => {
                warn!(tween = %self.id, "链式后继正被借用，无法激活");
                return;
            }
        };
        debug!(tween = %self.id, next = %next_id, "激活链式后继");

        if let Some(manager) = self.manager.as_ref().and_then(ManagerHandle::upgrade) {
            manager.register(next);
        }
    }

    /// 交换去程与回程的端点
    fn swap_legs(&mut self) {
        std::mem::swap(&mut self.to, &mut self.from);
        if self.path.is_some() {
            std::mem::swap(&mut self.path_to, &mut self.path_from);
        }
    }

    /// 开始时捕获起始值并计算路径端点
    fn parse_data(&mut self) -> TweenResult<()> {
        if self.is_started {
            return Ok(());
        }

        let from = self.from.get_or_insert_with(PropertyMap::new);
        if let (Some(to), Some(target)) = (&self.to, &self.target) {
            capture_baseline(to, from, &*target.borrow())?;
        }

        if let Some(path) = &self.path {
            let distance = path.total_distance();
            (self.path_from, self.path_to) = if self.path_reverse {
                (distance, 0.0)
            } else {
                (0.0, distance)
            };
        }
        Ok(())
    }

    /// 在当前进度写入目标
    fn apply(&self, time: f32) -> TweenResult<()> {
        let Some(target) = &self.target else {
            return Ok(());
        };
        let mut target = target.borrow_mut();

        if let (Some(to), Some(from)) = (&self.to, &self.from) {
            apply_interpolation(to, from, &mut *target, time, self.elapsed, &*self.easing)?;
        }

        if let Some(path) = &self.path {
            let t = self.elapsed / time;
            let distance = self.path_from + (self.path_to - self.path_from) * (self.easing)(t);
            target.set_position(path.point_at_distance(distance));
        }
        Ok(())
    }

    fn can_update(&self) -> bool {
        self.duration > 0.0 && self.active && self.target.is_some()
    }

    // ========== 查询 ==========

    /// 补间 ID
    pub fn id(&self) -> TweenId {
        self.id
    }

    /// 是否激活
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// 是否已开始
    pub fn is_started(&self) -> bool {
        self.is_started
    }

    /// 是否已结束
    pub fn is_ended(&self) -> bool {
        self.is_ended
    }

    /// 当前段内已经过的时间（毫秒）
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// 延迟阶段已经过的时间（毫秒）
    pub fn delay_elapsed(&self) -> f32 {
        self.delay_elapsed
    }

    /// 已完成的重复次数
    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    /// 是否处于回程
    pub fn is_ping_pong_active(&self) -> bool {
        self.ping_pong_active
    }

    /// 每段的有效时长：往返模式为总时长的一半
    pub fn effective_duration(&self) -> f32 {
        if self.ping_pong {
            self.duration / 2.0
        } else {
            self.duration
        }
    }

    /// 当前的目标值
    pub fn goal(&self) -> Option<&PropertyMap> {
        self.to.as_ref()
    }

    /// 当前的起始值
    pub fn baseline(&self) -> Option<&PropertyMap> {
        self.from.as_ref()
    }

    /// 当前段的路径端点（起点距离，终点距离）
    pub fn path_bounds(&self) -> (f32, f32) {
        (self.path_from, self.path_to)
    }

    /// 链式后继
    pub fn chained(&self) -> Option<&TweenRef> {
        self.chain_next.as_ref()
    }

    /// 所属管理器
    pub fn manager(&self) -> Option<&ManagerHandle> {
        self.manager.as_ref()
    }
}
