//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 tween-runtime 覆盖率
//! - `scene-check`: 检查场景文件（JSON 结构、配置取值、属性与目标是否匹配）

use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use tween_runtime::SceneConfig;
use walkdir::WalkDir;

fn run(step: &str, cmd: &mut Command) -> anyhow::Result<()> {
    eprintln!("\n==> {step}");
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{step} failed with {status}");
    }
    Ok(())
}

fn ensure_cargo_llvm_cov_available() -> anyhow::Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.args(["llvm-cov", "--version"]);
    match cmd.status() {
        Ok(s) if s.success() => Ok(()),
        _ => anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        ),
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            let mut fmt = Command::new("cargo");
            fmt.args(["fmt", "--all", "--", "--check"]);
            run("cargo fmt --all -- --check", &mut fmt)?;

            let mut clippy = Command::new("cargo");
            clippy.args(["clippy", "--workspace", "--all-targets"]);
            run("cargo clippy --workspace --all-targets", &mut clippy)?;

            let mut test = Command::new("cargo");
            test.args(["test", "--workspace"]);
            run("cargo test --workspace", &mut test)?;

            scene_check(None)?;
        }
        "cov-runtime" => {
            ensure_cargo_llvm_cov_available()?;

            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "-p", "tween-runtime", "--html"]);
            run("cargo llvm-cov -p tween-runtime --html", &mut cov)?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "scene-check" => {
            let path = args.next();
            scene_check(path.as_deref())?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查，并检查 scenes/
  cov-runtime     运行 tween-runtime 覆盖率报告
  scene-check     检查场景文件

SCENE-CHECK:
  cargo xtask scene-check [path]

  不带参数：检查 scenes/ 下所有 .json 文件
  带路径参数：检查指定文件或目录

  检查内容：
    - JSON 结构与字段类型
    - 时长、延迟、帧率、路径顶点数
    - 补间属性与目标的结构是否一致（包括链式后继）

ALIASES (in .cargo/config.toml):
  cargo check-all     -> cargo xtask check-all
  cargo cov-runtime   -> cargo xtask cov-runtime
  cargo scene-check   -> cargo xtask scene-check
"#
    );
}

//=============================================================================
// scene-check 命令实现
//=============================================================================

/// 默认场景目录（相对于 workspace root）
const SCENES_DIR: &str = "scenes";

/// 场景检查结果
#[derive(Default)]
struct SceneCheckResult {
    /// 检查的场景数量
    scenes_checked: usize,
    /// 出错的场景
    failures: Vec<(PathBuf, String)>,
}

/// 执行场景检查
fn scene_check(path: Option<&str>) -> anyhow::Result<()> {
    let files = match path {
        Some(p) => {
            let path = PathBuf::from(p);
            if path.is_file() {
                vec![path]
            } else if path.is_dir() {
                collect_scene_files(&path)
            } else {
                anyhow::bail!("路径不存在: {}", p);
            }
        }
        None => {
            let dir = Path::new(SCENES_DIR);
            if !dir.exists() {
                anyhow::bail!(
                    "默认场景目录不存在: {}\n请在 workspace 根目录运行，或指定场景路径",
                    dir.display()
                );
            }
            collect_scene_files(dir)
        }
    };

    if files.is_empty() {
        eprintln!("未找到场景文件（.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个场景文件...\n", files.len());

    let mut result = SceneCheckResult::default();
    for file in &files {
        result.scenes_checked += 1;
        if let Err(e) = check_scene_file(file) {
            result.failures.push((file.clone(), e));
        }
    }

    print_check_result(&result);

    if !result.failures.is_empty() {
        anyhow::bail!("场景检查发现错误");
    }
    Ok(())
}

/// 收集目录下的所有场景文件
fn collect_scene_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

/// 检查单个场景文件
fn check_scene_file(file: &Path) -> Result<(), String> {
    let scene = SceneConfig::load(file).map_err(|e| e.to_string())?;
    scene.validate().map_err(|e| e.to_string())?;
    scene.check_targets().map_err(|e| e.to_string())?;

    if scene.tweens.is_empty() {
        eprintln!("[WARN] {}: 没有任何补间", file.display());
    }
    Ok(())
}

/// 输出检查结果
fn print_check_result(result: &SceneCheckResult) {
    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {} 个场景", result.scenes_checked);
    eprintln!();

    for (file, error) in &result.failures {
        eprintln!("[ERROR] {}: {}", file.display(), error);
    }

    eprintln!();
    if result.failures.is_empty() {
        eprintln!("✅ 检查通过，无错误");
    } else {
        eprintln!("❌ {} 个错误", result.failures.len());
    }
}
