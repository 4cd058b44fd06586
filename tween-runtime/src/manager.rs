//! # Manager 模块
//!
//! 补间管理器：集中登记补间，每帧统一推进，并汇总事件。
//!
//! ```rust,ignore
//! let manager = TweenManager::new();
//! let tween = manager.create_tween(target);
//! tween.borrow_mut().set_to(props([("alpha", 0.0)]));
//! tween.borrow_mut().duration = 300.0;
//! tween.borrow_mut().start();
//!
//! // 每帧
//! for (id, event) in manager.update(16.0) {
//!     // ...
//! }
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::target::SharedTarget;
use crate::tween::{Tween, TweenEvent, TweenId, TweenRef};

/// 60 FPS 下一帧的毫秒数
const FRAME_MS: f32 = 1000.0 / 60.0;

#[derive(Default)]
struct ManagerState {
    /// 已登记的补间（按登记顺序推进）
    tweens: Vec<(TweenId, TweenRef)>,
    /// 待取出的事件队列
    events: Vec<(TweenId, TweenEvent)>,
}

impl ManagerState {
    fn contains(&self, id: TweenId) -> bool {
        self.tweens.iter().any(|(tween_id, _)| *tween_id == id)
    }
}

/// 补间管理器
///
/// 克隆开销很小，所有克隆共享同一份登记表。
#[derive(Clone, Default)]
pub struct TweenManager {
    state: Rc<RefCell<ManagerState>>,
}

/// 补间持有的管理器弱引用
#[derive(Clone)]
pub struct ManagerHandle(Weak<RefCell<ManagerState>>);

impl ManagerHandle {
    /// 获取管理器（已被释放时返回 `None`）
    pub fn upgrade(&self) -> Option<TweenManager> {
        self.0.upgrade().map(|state| TweenManager { state })
    }

    /// 是否指向指定的管理器
    pub fn points_to(&self, manager: &TweenManager) -> bool {
        Weak::as_ptr(&self.0) == Rc::as_ptr(&manager.state)
    }
}

impl fmt::Debug for ManagerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerHandle")
            .field("alive", &(self.0.strong_count() > 0))
            .finish()
    }
}

impl fmt::Debug for TweenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("TweenManager")
            .field("tweens", &state.tweens.len())
            .field("pending_events", &state.events.len())
            .finish()
    }
}

impl TweenManager {
    /// 创建空管理器
    pub fn new() -> Self {
        Self::default()
    }

    /// 弱引用句柄
    pub fn handle(&self) -> ManagerHandle {
        ManagerHandle(Rc::downgrade(&self.state))
    }

    /// 创建绑定到目标的补间并登记
    pub fn create_tween(&self, target: SharedTarget) -> TweenRef {
        let tween = Tween::new(target).shared();
        self.add(&tween);
        tween
    }

    /// 登记补间并设置其管理器引用
    ///
    /// 重复登记同一补间不会产生副作用。
    pub fn add(&self, tween: &TweenRef) {
        match tween.try_borrow_mut() {
            Ok(mut t) => t.manager = Some(self.handle()),
            Err(_) => {
                warn!("补间正被借用，无法设置管理器");
                return;
            }
        }
        self.register(Rc::clone(tween));
    }

    /// 登记补间（不修改其管理器引用）
    pub(crate) fn register(&self, tween: TweenRef) {
        let id = match tween.try_borrow() {
            Ok(t) => t.id(),
            Err(_) => {
                warn!("补间正被借用，无法登记");
                return;
            }
        };

        let mut state = self.state.borrow_mut();
        if state.contains(id) {
            return;
        }
        state.tweens.push((id, tween));
        debug!(tween = %id, "登记补间");
    }

    /// 记录补间发出的事件
    ///
    /// 由补间经 [`ManagerHandle`] 调用，只接收仍处于登记中的补间的事件。
    pub(crate) fn record(&self, id: TweenId, event: TweenEvent) {
        if let Ok(mut state) = self.state.try_borrow_mut()
            && state.contains(id)
        {
            state.events.push((id, event));
        }
    }

    /// 注销补间
    ///
    /// # 返回
    /// - `true`: 补间已登记并被移除
    /// - `false`: 补间未登记
    pub fn remove(&self, id: TweenId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.tweens.len();
        state.tweens.retain(|(tween_id, _)| *tween_id != id);
        let removed = state.tweens.len() != before;
        if removed {
            debug!(tween = %id, "注销补间");
        }
        removed
    }

    /// 推进一帧
    ///
    /// 只推进帧开始时处于激活状态的补间。本帧内被链式激活的后继
    /// （无论是新登记的还是早已登记的）都从下一帧开始推进。
    ///
    /// # 返回
    /// 本帧内所有已登记补间发出的事件（按发生顺序）
    pub fn update(&self, delta_ms: f32) -> Vec<(TweenId, TweenEvent)> {
        let delta = delta_ms / FRAME_MS;
        let snapshot: Vec<(TweenId, TweenRef, bool)> = self
            .state
            .borrow()
            .tweens
            .iter()
            .map(|(id, tween)| {
                let active = tween.try_borrow().is_ok_and(|t| t.is_active());
                (*id, Rc::clone(tween), active)
            })
            .collect();

        let mut to_remove = Vec::new();
        for (id, tween, was_active) in &snapshot {
            let Ok(mut tween) = tween.try_borrow_mut() else {
                warn!(tween = %id, "补间正被借用，跳过本帧");
                continue;
            };

            if *was_active
                && tween.is_active()
                && let Err(e) = tween.update(delta, delta_ms)
            {
                warn!(tween = %id, error = %e, "补间更新失败，已注销");
                to_remove.push(*id);
                continue;
            }

            if tween.is_ended() && tween.expire {
                to_remove.push(*id);
            }
        }

        for id in to_remove {
            self.remove(id);
        }

        std::mem::take(&mut self.state.borrow_mut().events)
    }

    /// 查询作用于指定目标的补间
    pub fn tweens_for_target(&self, target: &SharedTarget) -> Vec<TweenRef> {
        let address = Rc::as_ptr(target) as *const ();
        self.state
            .borrow()
            .tweens
            .iter()
            .filter(|(_, tween)| {
                tween.try_borrow().is_ok_and(|t| {
                    t.target
                        .as_ref()
                        .is_some_and(|own| Rc::as_ptr(own) as *const () == address)
                })
            })
            .map(|(_, tween)| Rc::clone(tween))
            .collect()
    }

    /// 按 ID 查找补间
    pub fn get(&self, id: TweenId) -> Option<TweenRef> {
        self.state
            .borrow()
            .tweens
            .iter()
            .find(|(tween_id, _)| *tween_id == id)
            .map(|(_, tween)| Rc::clone(tween))
    }

    /// 是否登记了指定补间
    pub fn contains(&self, id: TweenId) -> bool {
        self.state.borrow().contains(id)
    }

    /// 已登记的补间数量
    pub fn len(&self) -> usize {
        self.state.borrow().tweens.len()
    }

    /// 是否没有登记任何补间
    pub fn is_empty(&self) -> bool {
        self.state.borrow().tweens.is_empty()
    }

    /// 激活中的补间数量
    pub fn active_count(&self) -> usize {
        self.state
            .borrow()
            .tweens
            .iter()
            .filter(|(_, tween)| tween.try_borrow().is_ok_and(|t| t.is_active()))
            .count()
    }

    /// 是否有激活中的补间
    pub fn has_active_tweens(&self) -> bool {
        self.active_count() > 0
    }

    /// 注销所有补间并丢弃未取出的事件
    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.tweens.clear();
        state.events.clear();
        debug!("清空补间管理器");
    }
}
