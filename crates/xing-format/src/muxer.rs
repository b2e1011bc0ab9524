//! Xing 头封装器 (流协调器).
//!
//! 从任意切分的 MPEG 音频字节流中重组完整帧, 在首个音频帧之前插入
//! 一个 Xing 头帧, 并在流结束时回到字节 0 用最终统计信息覆盖它.
//!
//! 处理流程:
//! 1. `push()` 追加数据, 按帧头切分, 无效帧头逐字节跳过 (重新同步)
//! 2. 第一个非标签帧到达时推送临时头帧, 进入 `Streaming`
//! 3. 每帧记录 seek 表并附带时间戳、时长与字节偏移推送
//! 4. `finish()` 请求下游回到字节 0, 成功则推送最终头帧

use bytes::{Buf, Bytes, BytesMut};
use log::{debug, error, info, trace, warn};
use xing_codec::Packet;
use xing_codec::parsers::mpeg_audio::vbr_tag::has_vbr_tag;
use xing_codec::parsers::mpeg_audio::{FrameInfo, HEADER_SIZE};
use xing_core::{ClockTime, XingResult};

use crate::seek_table::SeekTable;
use crate::segment::{Segment, SegmentFormat};
use crate::sink::PacketSink;
use crate::xing_header::build_xing_header;

/// 封装器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuxState {
    /// 尚未输出头帧
    Idle,
    /// 已输出临时头帧, 正在透传音频帧
    Streaming,
}

/// 单条流的累计状态
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamState {
    /// 已输出音频的累计时长 (纳秒)
    pub duration: ClockTime,
    /// 已输出的累计字节数 (含头帧)
    pub byte_count: u64,
    /// seek 表
    pub seek_table: SeekTable,
    /// 首个音频帧的帧头, 头帧以它为模板
    pub first_header: Option<u32>,
    /// 是否已推送头帧
    pub header_sent: bool,
}

/// 封装统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MuxStats {
    /// 已推送的音频帧数
    pub frames_emitted: u64,
    /// 丢弃的已有 VBR 标签帧数
    pub tags_dropped: u64,
    /// 重新同步时跳过的字节数
    pub bytes_skipped: u64,
    /// 音频总时长 (纳秒)
    pub duration: ClockTime,
    /// 输出总字节数 (含头帧)
    pub byte_count: u64,
}

/// 流结束后输出中头帧的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStatus {
    /// 未输出任何头帧 (流中没有音频帧)
    None,
    /// 仅有临时头帧, 下游不支持回写或最终头帧生成失败
    Provisional,
    /// 已用最终统计信息覆盖
    Final,
}

/// Xing 头封装器
pub struct XingMuxer {
    /// 帧重组缓冲区
    adapter: BytesMut,
    state: MuxState,
    stream: StreamState,
    stats: MuxStats,
}

impl XingMuxer {
    /// 创建封装器实例
    pub fn new() -> Self {
        Self {
            adapter: BytesMut::new(),
            state: MuxState::Idle,
            stream: StreamState::default(),
            stats: MuxStats::default(),
        }
    }

    /// 当前状态
    pub fn state(&self) -> MuxState {
        self.state
    }

    /// 累计流状态
    pub fn stream_state(&self) -> &StreamState {
        &self.stream
    }

    /// 封装统计
    pub fn stats(&self) -> MuxStats {
        MuxStats {
            duration: self.stream.duration,
            byte_count: self.stream.byte_count,
            ..self.stats
        }
    }

    /// 缓冲区中尚未组成完整帧的字节数
    pub fn pending(&self) -> usize {
        self.adapter.len()
    }

    /// 推送一段输入数据, 输出其中所有完整帧
    ///
    /// 下游推送失败时立即返回错误. 失败的帧已移出缓冲区且计入统计,
    /// 此后应中止该流或先调用 `reset()`.
    pub fn push(&mut self, sink: &mut dyn PacketSink, data: &[u8]) -> XingResult<()> {
        self.adapter.extend_from_slice(data);

        while self.adapter.len() >= HEADER_SIZE {
            let info = match FrameInfo::peek(&self.adapter) {
                Some(Ok(info)) => info,
                Some(Err(reason)) => {
                    trace!("无效帧头 ({reason}), 跳过 1 字节");
                    self.adapter.advance(1);
                    self.stats.bytes_skipped += 1;
                    continue;
                }
                None => break,
            };

            let frame_size = info.frame_size as usize;
            if self.adapter.len() < frame_size {
                trace!(
                    "等待更多数据: 需要 {} 字节, 已缓冲 {} 字节",
                    frame_size,
                    self.adapter.len()
                );
                break;
            }

            let frame = self.adapter.split_to(frame_size).freeze();
            self.handle_frame(sink, &info, frame)?;
        }
        Ok(())
    }

    fn handle_frame(
        &mut self,
        sink: &mut dyn PacketSink,
        info: &FrameInfo,
        frame: Bytes,
    ) -> XingResult<()> {
        if self.state == MuxState::Idle {
            if has_vbr_tag(info.header, &frame) {
                debug!("丢弃输入中已有的 VBR 标签帧 ({} 字节)", frame.len());
                self.stats.tags_dropped += 1;
                return Ok(());
            }
            self.send_provisional_header(sink, info.header)?;
        }

        let duration = info.duration();
        let pts = self.stream.duration;
        let pos = self.stream.byte_count;

        self.stream.seek_table.record(pts, pos);
        self.stream.byte_count += frame.len() as u64;
        self.stream.duration += duration;
        self.stats.frames_emitted += 1;

        let packet = Packet::audio(frame, clock_to_i64(pts), clock_to_i64(duration), pos);
        sink.push_packet(packet)
    }

    fn send_provisional_header(
        &mut self,
        sink: &mut dyn PacketSink,
        first_header: u32,
    ) -> XingResult<()> {
        let header = build_xing_header(first_header, None, None, &self.stream.seek_table)?;
        let header_size = header.len() as u64;
        debug!(
            "首帧帧头 {:#010x}, 推送临时 Xing 头 ({} 字节)",
            first_header, header_size
        );

        sink.push_packet(Packet::xing_header(header))?;

        self.stream.first_header = Some(first_header);
        self.stream.header_sent = true;
        self.stream.byte_count += header_size;
        self.state = MuxState::Streaming;
        Ok(())
    }

    /// 处理流结束
    ///
    /// 若已输出头帧, 请求下游回到字节 0 并推送最终头帧. 回写失败只记录
    /// 警告, 临时头帧保留在输出中. 最后向下游传递流结束.
    pub fn finish(&mut self, sink: &mut dyn PacketSink) -> XingResult<HeaderStatus> {
        if !self.adapter.is_empty() {
            debug!("流结束时丢弃 {} 字节不完整数据", self.adapter.len());
            self.adapter.clear();
        }

        let status = match self.stream.first_header {
            Some(first_header) if self.stream.header_sent => {
                self.rewrite_header(sink, first_header)
            }
            _ => {
                debug!("流中没有音频帧, 未输出 Xing 头");
                HeaderStatus::None
            }
        };

        sink.push_eos()?;
        Ok(status)
    }

    fn rewrite_header(&mut self, sink: &mut dyn PacketSink, first_header: u32) -> HeaderStatus {
        if let Err(e) = sink.reposition(0) {
            warn!("无法回到字节 0 写入最终 Xing 头: {e}");
            return HeaderStatus::Provisional;
        }

        let header = match build_xing_header(
            first_header,
            Some(self.stream.duration),
            Some(self.stream.byte_count),
            &self.stream.seek_table,
        ) {
            Ok(header) => header,
            Err(e) => {
                warn!("生成最终 Xing 头失败: {e}");
                return HeaderStatus::Provisional;
            }
        };

        info!(
            "写入最终 Xing 头: {} 帧, {} 字节",
            self.stats.frames_emitted, self.stream.byte_count
        );
        match sink.push_packet(Packet::xing_header(header)) {
            Ok(()) => HeaderStatus::Final,
            Err(e) => {
                warn!("推送最终 Xing 头失败: {e}");
                HeaderStatus::Provisional
            }
        }
    }

    /// 处理上游的段声明
    ///
    /// 头帧推送之后的段声明被拒绝 (返回 `Ok(false)`). 字节段原样转发,
    /// 时间段替换为从 0 开始的字节段.
    pub fn handle_segment(
        &mut self,
        sink: &mut dyn PacketSink,
        segment: Segment,
    ) -> XingResult<bool> {
        if self.stream.header_sent {
            error!("已推送 Xing 头, 丢弃段声明 {segment:?}");
            return Ok(false);
        }

        let segment = match segment.format {
            SegmentFormat::Bytes => segment,
            SegmentFormat::Time => Segment::bytes(0),
        };
        sink.push_segment(&segment)?;
        Ok(true)
    }

    /// 清空所有状态, 回到 `Idle`
    pub fn reset(&mut self) {
        self.adapter.clear();
        self.state = MuxState::Idle;
        self.stream = StreamState::default();
        self.stats = MuxStats::default();
    }
}

impl Default for XingMuxer {
    fn default() -> Self {
        Self::new()
    }
}

fn clock_to_i64(time: ClockTime) -> i64 {
    i64::try_from(time).unwrap_or(i64::MAX)
}
