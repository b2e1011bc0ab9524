//! `rewrite` 子命令: 读取 MPEG 音频流, 经封装器输出带 Xing 头的新流.

use anyhow::{Context, Result, bail};
use log::info;
use serde::Serialize;
use std::path::Path;

use xing_format::{HeaderStatus, IoContext, Segment, XingMuxer};

use crate::{RewriteArgs, clock_to_seconds, print_json};

/// 处理摘要
#[derive(Serialize)]
struct RewriteSummary {
    input: String,
    output: String,
    /// "final" / "provisional" / "none"
    header: &'static str,
    frames: u64,
    duration_secs: f64,
    output_bytes: u64,
    tags_dropped: u64,
    bytes_skipped: u64,
}

pub fn run(args: &RewriteArgs) -> Result<()> {
    let to_stdout = args.output == "-";
    if !to_stdout && !args.overwrite && Path::new(&args.output).exists() {
        bail!("输出文件已存在 '{}', 使用 -y 覆盖", args.output);
    }

    let mut input = if args.input == "-" {
        IoContext::stdin()
    } else {
        IoContext::open_read(&args.input)
            .with_context(|| format!("打开输入文件失败: {}", args.input))?
    };
    let mut output = if to_stdout {
        IoContext::stdout()
    } else {
        IoContext::open_write(&args.output)
            .with_context(|| format!("创建输出文件失败: {}", args.output))?
    };

    let mut mux = XingMuxer::new();
    mux.handle_segment(&mut output, Segment::bytes(0))?;

    let mut buf = vec![0u8; args.chunk_size as usize];
    loop {
        let n = input.read(&mut buf).context("读取输入失败")?;
        if n == 0 {
            break;
        }
        mux.push(&mut output, &buf[..n]).context("写入输出失败")?;
    }

    let status = mux.finish(&mut output).context("结束输出失败")?;
    let stats = mux.stats();
    info!(
        "完成: {} 帧, {} 字节, 头帧状态 {:?}",
        stats.frames_emitted, stats.byte_count, status
    );

    let summary = RewriteSummary {
        input: args.input.clone(),
        output: args.output.clone(),
        header: match status {
            HeaderStatus::Final => "final",
            HeaderStatus::Provisional => "provisional",
            HeaderStatus::None => "none",
        },
        frames: stats.frames_emitted,
        duration_secs: clock_to_seconds(stats.duration),
        output_bytes: stats.byte_count,
        tags_dropped: stats.tags_dropped,
        bytes_skipped: stats.bytes_skipped,
    };

    // 输出到 stdout 时摘要改写到 stderr
    if args.json {
        return print_json(&summary, to_stdout);
    }
    if status == HeaderStatus::None {
        eprintln!("警告: 输入中没有 MPEG 音频帧");
    }
    eprintln!(
        "{} -> {}: {} 帧, {:.3} 秒, {} 字节, Xing 头: {}",
        summary.input,
        summary.output,
        summary.frames,
        summary.duration_secs,
        summary.output_bytes,
        summary.header
    );
    if summary.tags_dropped > 0 {
        eprintln!("已替换输入中原有的 {} 个 VBR 标签帧", summary.tags_dropped);
    }
    Ok(())
}
