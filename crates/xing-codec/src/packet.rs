//! 输出数据包 (Packet).
//!
//! 表示封装器向下游推送的一段完整数据: 一个 MPEG 音频帧或一个 Xing 头帧,
//! 并附带时间戳、时长和字节偏移等带外信息.

use bytes::Bytes;
use xing_core::Rational;

/// 数据包类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
    /// 合成的 Xing 头帧 (不含音频)
    XingHeader,
    /// 原始音频帧
    Audio,
}

/// 输出数据包
#[derive(Debug, Clone)]
pub struct Packet {
    /// 帧数据 (含 4 字节帧头)
    pub data: Bytes,
    /// 数据包类型
    pub kind: PacketKind,
    /// 显示时间戳 (以 time_base 为单位, 头帧为 0)
    pub pts: i64,
    /// 数据包时长 (以 time_base 为单位, 头帧为 0)
    pub duration: i64,
    /// 时间基
    pub time_base: Rational,
    /// 在输出流中的起始字节偏移
    pub pos: u64,
}

impl Packet {
    /// 创建音频帧数据包
    pub fn audio(data: impl Into<Bytes>, pts: i64, duration: i64, pos: u64) -> Self {
        Self {
            data: data.into(),
            kind: PacketKind::Audio,
            pts,
            duration,
            time_base: Rational::NANO,
            pos,
        }
    }

    /// 创建 Xing 头帧数据包, 总是位于输出流开头
    pub fn xing_header(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            kind: PacketKind::XingHeader,
            pts: 0,
            duration: 0,
            time_base: Rational::NANO,
            pos: 0,
        }
    }

    /// 数据大小 (字节)
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 结束字节偏移 (不含)
    pub fn end_pos(&self) -> u64 {
        self.pos + self.data.len() as u64
    }

    /// 是否为 Xing 头帧
    pub fn is_xing_header(&self) -> bool {
        self.kind == PacketKind::XingHeader
    }
}
