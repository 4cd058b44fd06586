//! # 补间生命周期集成测试
//!
//! 通过公共 API 与管理器测试完整的补间流程：
//! 进度、往返、重复、循环、链式、嵌套属性与路径。

use std::cell::RefCell;
use std::rc::Rc;

use tween_runtime::{
    Animatable, EasingFunction, Point, Polyline, SceneConfig, SharedTarget, Tween, TweenError,
    TweenEvent, TweenManager, TweenRef, Value, props, shared,
};

/// 测试用精灵：字段固定，不接受未知属性
#[derive(Debug, Default)]
struct Sprite {
    alpha: f32,
    position: Point,
    scale: Point,
}

impl Animatable for Sprite {
    fn property(&self, key: &str) -> Option<Value> {
        match key {
            "alpha" => Some(Value::Leaf(self.alpha)),
            "position" => Some(Value::from(self.position)),
            "scale" => Some(Value::from(self.scale)),
            _ => None,
        }
    }

    fn set_property(&mut self, key: &str, value: f32) -> bool {
        match key {
            "alpha" => {
                self.alpha = value;
                true
            }
            _ => false,
        }
    }

    fn property_mut(&mut self, key: &str) -> Option<&mut dyn Animatable> {
        match key {
            "position" => Some(&mut self.position),
            "scale" => Some(&mut self.scale),
            _ => None,
        }
    }

    fn set_position(&mut self, point: Point) {
        self.position = point;
    }
}

/// 记录补间发出的所有事件
fn record(tween: &TweenRef) -> Rc<RefCell<Vec<TweenEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    tween
        .borrow_mut()
        .on_event(move |_, event| sink.borrow_mut().push(*event));
    events
}

fn step(tween: &TweenRef, delta_ms: f32) {
    tween
        .borrow_mut()
        .update(delta_ms / (1000.0 / 60.0), delta_ms)
        .unwrap();
}

/// 测试线性补间按四等分推进
#[test]
fn test_linear_quarters() {
    let target = shared(Value::from(props([("x", 0.0)])));
    let tween = Tween::new(target.clone())
        .to(props([("x", 100.0)]))
        .with_duration(1000.0)
        .shared();
    let events = record(&tween);
    tween.borrow_mut().start();

    let mut seen = Vec::new();
    for _ in 0..4 {
        step(&tween, 250.0);
        seen.push(target.borrow().leaf_at("x").unwrap());
    }

    assert_eq!(seen, vec![25.0, 50.0, 75.0, 100.0]);
    let events = events.borrow();
    assert_eq!(events.first(), Some(&TweenEvent::Start));
    assert_eq!(events.last(), Some(&TweenEvent::End));
    assert_eq!(
        events.iter().filter(|e| **e == TweenEvent::End).count(),
        1
    );
}

/// 测试往返后回到起始值，且只发出一次 PingPong
#[test]
fn test_ping_pong_returns_to_baseline() {
    let sprite = shared(Sprite {
        alpha: 0.2,
        ..Sprite::default()
    });
    let tween = Tween::new(sprite.clone())
        .to(props([("alpha", 1.0)]))
        .with_duration(400.0)
        .with_ping_pong(true)
        .with_easing(EasingFunction::InOutQuad)
        .shared();
    let events = record(&tween);
    tween.borrow_mut().start();

    for _ in 0..8 {
        step(&tween, 50.0);
    }

    assert!((sprite.borrow().alpha - 0.2).abs() < 1e-6);
    let events = events.borrow();
    assert_eq!(
        events.iter().filter(|e| **e == TweenEvent::PingPong).count(),
        1
    );
    assert_eq!(events.last(), Some(&TweenEvent::End));
}

/// 测试往返 + 重复的完整事件序列
#[test]
fn test_ping_pong_repeat_event_sequence() {
    let target = shared(Value::from(props([("x", 0.0)])));
    let tween = Tween::new(target)
        .to(props([("x", 10.0)]))
        .with_duration(200.0)
        .with_ping_pong(true)
        .with_repeat(1)
        .shared();
    let events = record(&tween);
    tween.borrow_mut().start();

    for _ in 0..10 {
        step(&tween, 50.0);
    }
    tween.borrow_mut().stop();

    insta::assert_debug_snapshot!(events.borrow(), @r"
    [
        Start,
        Update(
            50.0,
        ),
        Update(
            100.0,
        ),
        PingPong,
        Update(
            150.0,
        ),
        Update(
            200.0,
        ),
        Repeat(
            1,
        ),
        Update(
            50.0,
        ),
        Update(
            100.0,
        ),
        PingPong,
        Update(
            150.0,
        ),
        Update(
            200.0,
        ),
        End,
        Stop,
    ]
    ");
}

/// 测试 N 次重复
#[test]
fn test_repeat_count() {
    let target = shared(Value::from(props([("x", 0.0)])));
    let tween = Tween::new(target)
        .to(props([("x", 1.0)]))
        .with_duration(100.0)
        .with_repeat(3)
        .shared();
    let events = record(&tween);
    tween.borrow_mut().start();

    for _ in 0..20 {
        step(&tween, 100.0);
    }

    let events = events.borrow();
    let repeats = events
        .iter()
        .filter(|e| matches!(e, TweenEvent::Repeat(_)))
        .count();
    assert_eq!(repeats, 3);
    assert_eq!(events.last(), Some(&TweenEvent::End));
    assert_eq!(tween.borrow().repeat_count(), 3);
}

/// 测试无限循环永不结束
#[test]
fn test_loop_never_ends() {
    let target = shared(Value::from(props([("x", 0.0)])));
    let tween = Tween::new(target)
        .to(props([("x", 1.0)]))
        .with_duration(100.0)
        .with_loop(true)
        .with_repeat(1)
        .shared();
    let events = record(&tween);
    tween.borrow_mut().start();

    for _ in 0..1000 {
        step(&tween, 33.0);
    }

    assert!(tween.borrow().is_active());
    assert!(!tween.borrow().is_ended());
    assert!(!events.borrow().contains(&TweenEvent::End));
}

/// 测试起始值与目标互不影响
#[test]
fn test_baseline_is_independent_of_target() {
    let sprite = shared(Sprite {
        position: Point::new(10.0, 20.0),
        ..Sprite::default()
    });
    let tween = Tween::new(sprite.clone())
        .to(props([("position", Value::from(props([("x", 110.0)])))]))
        .with_duration(100.0)
        .shared();
    tween.borrow_mut().start();

    step(&tween, 50.0);
    assert_eq!(sprite.borrow().position, Point::new(60.0, 20.0));

    let tween = tween.borrow();
    let baseline = tween.baseline().unwrap();
    // 深拷贝了完整的 position，且不随写入改变
    assert_eq!(baseline["position"], Value::from(Point::new(10.0, 20.0)));
}

/// 测试显式给出的 0 起始值不会被目标当前值覆盖
#[test]
fn test_explicit_zero_baseline() {
    let sprite = shared(Sprite {
        alpha: 0.8,
        ..Sprite::default()
    });
    let tween = Tween::new(sprite.clone())
        .from(props([("alpha", 0.0)]))
        .to(props([("alpha", 1.0)]))
        .with_duration(100.0)
        .shared();
    tween.borrow_mut().start();

    step(&tween, 25.0);
    assert_eq!(sprite.borrow().alpha, 0.25);
}

/// 测试链式补间按顺序执行，且延迟从后继激活时开始计算
#[test]
fn test_chain_order_through_manager() {
    let sprite = shared(Sprite::default());
    let manager = TweenManager::new();

    let fade_in = manager.create_tween(sprite.clone());
    {
        let mut t = fade_in.borrow_mut();
        t.set_to(props([("alpha", 1.0)]));
        t.duration = 100.0;
    }
    let grow = fade_in.borrow_mut().chain(None);
    {
        let mut t = grow.borrow_mut();
        t.set_to(props([("scale", Value::from(Point::new(2.0, 2.0)))]));
        t.duration = 100.0;
        t.delay = 50.0;
    }
    let fade_id = fade_in.borrow().id();
    let grow_id = grow.borrow().id();
    fade_in.borrow_mut().start();

    let mut order = Vec::new();
    for _ in 0..10 {
        for (id, event) in manager.update(50.0) {
            if matches!(event, TweenEvent::Start | TweenEvent::End) {
                order.push((id, event));
            }
        }
    }

    assert_eq!(
        order,
        vec![
            (fade_id, TweenEvent::Start),
            (fade_id, TweenEvent::End),
            (grow_id, TweenEvent::Start),
            (grow_id, TweenEvent::End),
        ]
    );
    assert_eq!(sprite.borrow().alpha, 1.0);
    assert_eq!(sprite.borrow().scale, Point::new(2.0, 2.0));
}

/// 测试 stop 后链式后继不会被激活
#[test]
fn test_stop_prevents_chain() {
    let sprite = shared(Sprite::default());
    let manager = TweenManager::new();
    let first = manager.create_tween(sprite.clone());
    {
        let mut t = first.borrow_mut();
        t.set_to(props([("alpha", 1.0)]));
        t.duration = 100.0;
    }
    let second = first.borrow_mut().chain(None);
    first.borrow_mut().start();

    manager.update(50.0);
    first.borrow_mut().stop();
    for _ in 0..5 {
        manager.update(50.0);
    }

    assert!(!second.borrow().is_active());
    assert!(!manager.contains(second.borrow().id()));
    assert_eq!(sprite.borrow().alpha, 0.5);
}

/// 测试嵌套属性的每个叶子都被插值
#[test]
fn test_nested_properties() {
    let target = shared(Value::from(props([
        ("alpha", Value::Leaf(0.0)),
        (
            "transform",
            Value::from(props([
                ("position", Value::from(Point::new(0.0, 0.0))),
                ("rotation", Value::Leaf(0.0)),
            ])),
        ),
    ])));
    let tween = Tween::new(target.clone())
        .to(props([
            ("alpha", Value::Leaf(1.0)),
            (
                "transform",
                Value::from(props([
                    ("position", Value::from(Point::new(100.0, -50.0))),
                    ("rotation", Value::Leaf(4.0)),
                ])),
            ),
        ]))
        .with_duration(100.0)
        .shared();
    tween.borrow_mut().start();

    step(&tween, 50.0);

    let target = target.borrow();
    assert_eq!(target.leaf_at("alpha"), Some(0.5));
    assert_eq!(target.leaf_at("transform.position.x"), Some(50.0));
    assert_eq!(target.leaf_at("transform.position.y"), Some(-25.0));
    assert_eq!(target.leaf_at("transform.rotation"), Some(2.0));
}

/// 测试路径插值与属性插值同时进行
#[test]
fn test_path_with_properties() {
    let sprite = shared(Sprite::default());
    let path = Polyline::new()
        .move_to(0.0, 0.0)
        .line_to(100.0, 0.0)
        .line_to(100.0, 100.0);
    let tween = Tween::new(sprite.clone())
        .to(props([("alpha", 1.0)]))
        .with_path(Rc::new(path), false)
        .with_duration(200.0)
        .shared();
    tween.borrow_mut().start();

    step(&tween, 50.0);
    assert_eq!(sprite.borrow().position, Point::new(50.0, 0.0));
    assert_eq!(sprite.borrow().alpha, 0.25);

    step(&tween, 100.0);
    assert_eq!(sprite.borrow().position, Point::new(100.0, 50.0));

    step(&tween, 50.0);
    assert_eq!(sprite.borrow().position, Point::new(100.0, 100.0));
    assert!(tween.borrow().is_ended());
}

/// 测试结束后自动移除
#[test]
fn test_manager_expire() {
    let sprite = shared(Sprite::default());
    let manager = TweenManager::new();

    let tween = manager.create_tween(sprite.clone());
    {
        let mut t = tween.borrow_mut();
        t.set_to(props([("alpha", 1.0)]));
        t.duration = 100.0;
        t.expire = true;
        t.start();
    }

    manager.update(50.0);
    assert_eq!(manager.len(), 1);
    manager.update(50.0);
    assert!(manager.is_empty());

    let target: SharedTarget = sprite;
    assert!(manager.tweens_for_target(&target).is_empty());
}

/// 测试结构不一致时补间被停用并返回错误
#[test]
fn test_shape_mismatch_is_reported() {
    let sprite = shared(Sprite::default());
    let tween = Tween::new(sprite.clone())
        .to(props([("position", 5.0)]))
        .with_duration(100.0)
        .shared();
    tween.borrow_mut().start();

    let err = tween.borrow_mut().update(1.0, 16.0).unwrap_err();
    assert!(matches!(err, TweenError::ShapeMismatch { .. }));
    assert_eq!(err.path(), "position");
    assert!(!tween.borrow().is_active());
    assert_eq!(sprite.borrow().position, Point::zero());
}

/// 测试未知属性的写入被拒绝
#[test]
fn test_unknown_property_is_reported() {
    let sprite = shared(Sprite::default());
    let tween = Tween::new(sprite)
        .to(props([("scale", Value::from(props([("z", 2.0)])))]))
        .with_duration(100.0)
        .shared();
    tween.borrow_mut().start();

    let err = tween.borrow_mut().update(1.0, 16.0).unwrap_err();
    assert_eq!(
        err,
        TweenError::MissingProperty {
            path: "scale.z".to_string()
        }
    );
}

/// 测试场景配置驱动的完整播放
#[test]
fn test_scene_playback() {
    let scene = SceneConfig::from_json(
        r#"{
            "target": { "alpha": 0, "position": { "x": 0, "y": 0 } },
            "tweens": [
                { "to": { "alpha": 1 }, "duration": 100, "expire": true,
                  "chain": { "to": { "alpha": 0 }, "duration": 100, "expire": true } },
                { "duration": 200, "path": { "points": [{ "x": 0, "y": 0 }, { "x": 0, "y": 40 }] } }
            ]
        }"#,
    )
    .unwrap();
    scene.validate().unwrap();
    scene.check_targets().unwrap();

    let target = shared(Value::Node(scene.target.clone()));
    let manager = TweenManager::new();
    for config in &scene.tweens {
        let tween = Tween::from_config(target.clone(), config);
        manager.add(&tween);
        tween.borrow_mut().start();
    }

    let mut frames = 0;
    while manager.has_active_tweens() && frames < 100 {
        manager.update(50.0);
        frames += 1;
    }

    assert_eq!(frames, 4);
    assert_eq!(target.borrow().leaf_at("alpha"), Some(0.0));
    assert_eq!(target.borrow().leaf_at("position.y"), Some(40.0));
    // 补间链全部过期移除，只剩路径补间
    assert_eq!(manager.len(), 1);
}
