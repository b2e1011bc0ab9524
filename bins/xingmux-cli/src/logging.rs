//! 日志初始化模块.
//!
//! 双输出:
//! - console: 彩色, 输出到 stderr (stdout 可能承载音频数据), 默认 warn
//! - file: 无色, 无 target, 默认 info
//!
//! 两者均可通过 -v/-vv 提升, XINGMUX_LOG 环境变量覆盖文件级别.
//! 库 crate 通过 `log` 宏输出的记录由 tracing-subscriber 自动桥接.
//!
//! 日志文件输出到 $cwd/logs/{prefix}.{date}.log

use anyhow::{Context, Result};
use chrono::{Datelike, Local, Timelike};
use std::sync::OnceLock;
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, FormatEvent, FormatFields, format::Writer},
    layer::{Layer, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
};

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// 初始化日志系统
///
/// - `file_prefix`: 日志文件前缀 (如 "xingmux")
/// - `verbosity`: 0=默认, 1=debug, 2+=trace (由 -v/-vv 控制)
pub fn init(file_prefix: &str, verbosity: u8) -> Result<()> {
    std::fs::create_dir_all("logs").context("创建日志目录失败")?;

    let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix(file_prefix)
        .filename_suffix("log")
        .build("logs")
        .context("创建日志文件失败")?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    LOG_GUARD.set(guard).ok();

    let (console_level, file_level) = match verbosity {
        0 => ("warn", "info"),
        1 => ("debug", "debug"),
        _ => ("trace", "trace"),
    };

    let console_filter = EnvFilter::new(console_level);
    let console_layer = fmt::Layer::default()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .event_format(ConsoleFormatter)
        .with_filter(console_filter);

    let file_filter =
        EnvFilter::try_from_env("XINGMUX_LOG").unwrap_or_else(|_| EnvFilter::new(file_level));

    let file_layer = fmt::Layer::default()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(file_filter);

    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("日志系统已初始化")?;
    Ok(())
}

/// 写入 `[月-日 时:分:秒.毫秒]` 时间戳
fn write_timestamp(writer: &mut Writer<'_>) -> std::fmt::Result {
    let now = Local::now();
    write!(
        writer,
        "[{:02}-{:02} {:02}:{:02}:{:02}.{:03}]",
        now.month(),
        now.day(),
        now.hour(),
        now.minute(),
        now.second(),
        now.timestamp_subsec_millis(),
    )
}

/// Console 格式: 彩色级别, 时间戳 + 来源 crate
struct ConsoleFormatter;

impl<S, N> FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let color = match *meta.level() {
            tracing::Level::ERROR => "\x1b[31m",
            tracing::Level::WARN => "\x1b[33m",
            tracing::Level::INFO => "\x1b[32m",
            _ => "\x1b[34m",
        };
        // log 桥接的记录 target 为模块路径, 只保留 crate 名
        let source = meta.target().split("::").next().unwrap_or_default();
        write_timestamp(&mut writer)?;
        write!(writer, " {color}{:5}\x1b[0m {source} > ", meta.level())?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// File 格式: 无色, 无 target, 时间戳 + 级别 + 消息
struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        write_timestamp(&mut writer)?;
        write!(writer, " {:5} > ", event.metadata().level())?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
