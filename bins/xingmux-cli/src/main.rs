//! xingmux - MP3 Xing 头写入工具
//!
//! `rewrite` 为 MPEG 音频流插入 (或替换) Xing 头,
//! `inspect` 读取文件首帧的 Xing / Info 标签并统计帧数.

mod inspect;
mod logging;
mod rewrite;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::process;

use xing_core::{ClockTime, Rational};

#[derive(Parser, Debug)]
#[command(name = "xingmux", version, about = "纯 Rust MP3 Xing 头写入工具")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// 日志级别 (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 插入 Xing 头并输出新的流
    Rewrite(RewriteArgs),
    /// 显示已有 Xing 头与帧统计
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
pub struct RewriteArgs {
    /// 输入文件路径, "-" 表示标准输入
    input: String,

    /// 输出文件路径, "-" 表示标准输出 (无法回写最终头帧)
    output: String,

    /// 每次读取的字节数
    #[arg(long, default_value_t = 64 * 1024, value_parser = clap::value_parser!(u32).range(1..))]
    chunk_size: u32,

    /// 覆盖输出文件
    #[arg(short = 'y', long)]
    overwrite: bool,

    /// 输出 JSON 格式的处理摘要
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// 输入文件路径
    input: String,

    /// 输出 JSON 格式
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init("xingmux", cli.verbose) {
        eprintln!("警告: 日志初始化失败: {e:#}");
    }

    let result = match &cli.command {
        Command::Rewrite(args) => rewrite::run(args),
        Command::Inspect(args) => inspect::run(args),
    };

    if let Err(e) = result {
        log::error!("{e:#}");
        eprintln!("错误: {e:#}");
        process::exit(1);
    }
}

/// 纳秒时长换算为秒
fn clock_to_seconds(time: ClockTime) -> f64 {
    Rational::NANO.ticks_to_seconds(i64::try_from(time).unwrap_or(i64::MAX))
}

/// 以 JSON 打印摘要
fn print_json<T: Serialize>(value: &T, to_stderr: bool) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    if to_stderr {
        eprintln!("{text}");
    } else {
        println!("{text}");
    }
    Ok(())
}
