//! 下游数据包接收端 (PacketSink) trait 定义.
//!
//! 封装器通过此 trait 向下游推送数据包和控制信号.
//! 回写 Xing 头依赖下游的 [`PacketSink::reposition`] 能力, 该能力可能不可用.

use std::io::SeekFrom;

use log::debug;
use xing_codec::Packet;
use xing_core::{XingError, XingResult};

use crate::io::IoContext;
use crate::segment::{Segment, SegmentFormat};

/// 下游接收端 trait
///
/// 使用流程:
/// 1. (可选) `push_segment()` 声明字节段
/// 2. 循环 `push_packet()` 推送数据包
/// 3. 流结束时可能调用 `reposition(0)`, 成功后再推送一次最终头帧
/// 4. `push_eos()` 通知流结束
pub trait PacketSink {
    /// 推送一个数据包, 返回错误表示致命的下游失败
    fn push_packet(&mut self, packet: Packet) -> XingResult<()>;

    /// 推送段声明
    fn push_segment(&mut self, segment: &Segment) -> XingResult<()>;

    /// 请求回到指定字节偏移, 后续数据包将覆盖该位置的数据
    ///
    /// 不支持随机访问的下游返回 [`XingError::Unsupported`].
    fn reposition(&mut self, offset: u64) -> XingResult<()>;

    /// 通知流结束
    fn push_eos(&mut self) -> XingResult<()>;
}

impl PacketSink for IoContext {
    fn push_packet(&mut self, packet: Packet) -> XingResult<()> {
        self.write_all(&packet.data)
    }

    fn push_segment(&mut self, segment: &Segment) -> XingResult<()> {
        if segment.format != SegmentFormat::Bytes {
            return Err(XingError::InvalidArgument(
                "I/O 输出只接受字节段".into(),
            ));
        }
        if self.position()? != segment.start {
            self.reposition(segment.start)?;
        }
        Ok(())
    }

    fn reposition(&mut self, offset: u64) -> XingResult<()> {
        if !self.is_seekable() {
            return Err(XingError::Unsupported("输出不支持随机访问".into()));
        }
        self.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    fn push_eos(&mut self) -> XingResult<()> {
        debug!("I/O 输出收到流结束");
        self.flush()
    }
}

/// 下游收到的事件
#[derive(Debug, Clone)]
pub enum SinkEvent {
    /// 数据包
    Packet(Packet),
    /// 段声明
    Segment(Segment),
    /// 回到字节偏移
    Reposition(u64),
    /// 流结束
    Eos,
}

/// 记录所有事件的内存接收端
///
/// 可配置是否支持回写, 也可在第 N 个数据包时模拟下游失败.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// 按顺序记录的事件
    pub events: Vec<SinkEvent>,
    /// 是否支持 reposition
    pub seekable: bool,
    /// 在推送第 N 个 (从 0 开始) 数据包时返回错误
    pub fail_at_packet: Option<usize>,
    packets_pushed: usize,
}

impl RecordingSink {
    /// 支持回写的接收端
    pub fn seekable() -> Self {
        Self {
            seekable: true,
            ..Self::default()
        }
    }

    /// 不支持回写的接收端
    pub fn non_seekable() -> Self {
        Self::default()
    }

    /// 在推送第 `index` 个 (从 0 开始) 数据包时模拟下游失败
    pub fn fail_at(mut self, index: usize) -> Self {
        self.fail_at_packet = Some(index);
        self
    }

    /// 已收到的数据包
    pub fn packets(&self) -> impl Iterator<Item = &Packet> {
        self.events.iter().filter_map(|e| match e {
            SinkEvent::Packet(p) => Some(p),
            _ => None,
        })
    }

    /// 按 reposition 语义回放, 得到下游最终看到的字节流
    pub fn output(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut pos = 0usize;
        for event in &self.events {
            match event {
                SinkEvent::Packet(p) => {
                    let end = pos + p.data.len();
                    if out.len() < end {
                        out.resize(end, 0);
                    }
                    out[pos..end].copy_from_slice(&p.data);
                    pos = end;
                }
                SinkEvent::Reposition(offset) => pos = *offset as usize,
                SinkEvent::Segment(_) | SinkEvent::Eos => {}
            }
        }
        out
    }
}

impl PacketSink for RecordingSink {
    fn push_packet(&mut self, packet: Packet) -> XingResult<()> {
        let index = self.packets_pushed;
        self.packets_pushed += 1;
        if self.fail_at_packet == Some(index) {
            return Err(XingError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "模拟的下游失败",
            )));
        }
        self.events.push(SinkEvent::Packet(packet));
        Ok(())
    }

    fn push_segment(&mut self, segment: &Segment) -> XingResult<()> {
        self.events.push(SinkEvent::Segment(*segment));
        Ok(())
    }

    fn reposition(&mut self, offset: u64) -> XingResult<()> {
        if !self.seekable {
            return Err(XingError::Unsupported("记录接收端不支持回写".into()));
        }
        self.events.push(SinkEvent::Reposition(offset));
        Ok(())
    }

    fn push_eos(&mut self) -> XingResult<()> {
        self.events.push(SinkEvent::Eos);
        Ok(())
    }
}
