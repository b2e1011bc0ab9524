//! 段 (segment) 声明.
//!
//! 上游在推送数据前声明流的计量方式. 封装器输出以字节计量,
//! 以便结束时回到字节 0 覆盖 Xing 头.

use xing_core::ClockTime;

/// 段的计量格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentFormat {
    /// 按时间 (纳秒)
    Time,
    /// 按字节
    Bytes,
}

/// 段声明
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// 计量格式
    pub format: SegmentFormat,
    /// 起始位置
    pub start: u64,
    /// 结束位置, `None` 表示未知
    pub stop: Option<u64>,
}

impl Segment {
    /// 字节段, 结束位置未知
    pub const fn bytes(start: u64) -> Self {
        Self {
            format: SegmentFormat::Bytes,
            start,
            stop: None,
        }
    }

    /// 时间段
    pub const fn time(start: ClockTime, stop: Option<ClockTime>) -> Self {
        Self {
            format: SegmentFormat::Time,
            start,
            stop,
        }
    }
}
