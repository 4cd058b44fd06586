//! # Tween Play
//!
//! 无界面的补间播放器：加载场景文件，按固定帧率推进补间，输出事件与最终状态。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p tween-cli -- scenes/demo.json
//! cargo run -p tween-cli -- scenes/demo.json --fps 30 --max-frames 120 -v
//!
//! # 或安装后直接使用
//! cargo install --path tween-cli
//! tween-play scenes/demo.json
//! ```

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context;
use clap::Parser;
use tracing::{Level, info};
use tween_runtime::{SceneConfig, Tween, TweenEvent, TweenManager, Value};

const DEFAULT_FPS: u32 = 60;
const DEFAULT_MAX_FRAMES: u32 = 600;

#[derive(Parser)]
#[command(name = "tween-play")]
#[command(about = "补间播放器 - 按固定帧率推进场景中的补间并输出最终状态")]
#[command(version)]
struct Cli {
    /// 场景文件（JSON）
    scene: PathBuf,

    /// 帧率（覆盖场景文件中的 fps）
    #[arg(long)]
    fps: Option<u32>,

    /// 最大帧数（覆盖场景文件中的 maxFrames）
    #[arg(long)]
    max_frames: Option<u32>,

    /// 输出更多日志（-v: debug，-vv: trace）
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// 只输出警告和错误
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> Level {
        if self.quiet {
            return Level::WARN;
        }
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

/// 播放结果
#[derive(Debug)]
struct Playback {
    /// 实际推进的帧数
    frames: u32,
    /// 收到的事件数
    events: usize,
    /// 结束时仍有补间在运行（达到帧数上限）
    truncated: bool,
    /// 目标的最终状态
    target: Value,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_target(false)
        .init();

    let scene = SceneConfig::load(&cli.scene)
        .with_context(|| format!("加载场景失败: {}", cli.scene.display()))?;
    scene.validate().context("场景配置无效")?;

    let fps = cli.fps.or(scene.fps).unwrap_or(DEFAULT_FPS);
    anyhow::ensure!(fps > 0, "fps 必须大于 0");
    let max_frames = cli
        .max_frames
        .or(scene.max_frames)
        .unwrap_or(DEFAULT_MAX_FRAMES);

    let playback = play(&scene, fps, max_frames);

    if playback.truncated {
        tracing::warn!(frames = playback.frames, "达到帧数上限，仍有补间在运行");
    }
    info!(
        frames = playback.frames,
        events = playback.events,
        "播放结束"
    );

    let json = serde_json::to_string_pretty(&playback.target).context("序列化最终状态失败")?;
    println!("{json}");
    Ok(())
}

/// 按固定帧率推进场景，直到没有运行中的补间或达到帧数上限
fn play(scene: &SceneConfig, fps: u32, max_frames: u32) -> Playback {
    let target = Rc::new(RefCell::new(Value::Node(scene.target.clone())));
    let manager = TweenManager::new();

    for config in &scene.tweens {
        let tween = Tween::from_config(target.clone(), config);
        manager.add(&tween);
        tween.borrow_mut().start();
    }
    info!(tweens = manager.len(), fps, "场景已加载");

    let frame_ms = 1000.0 / fps as f32;
    let mut frames = 0;
    let mut events = 0;

    while frames < max_frames && manager.has_active_tweens() {
        frames += 1;
        for (id, event) in manager.update(frame_ms) {
            events += 1;
            match event {
                TweenEvent::Update(_) => tracing::trace!(tween = %id, frame = frames, ?event),
                _ => info!(tween = %id, frame = frames, ?event, "补间事件"),
            }
        }
    }

    let truncated = manager.has_active_tweens();
    let target = target.borrow().clone();
    Playback {
        frames,
        events,
        truncated,
        target,
    }
}
