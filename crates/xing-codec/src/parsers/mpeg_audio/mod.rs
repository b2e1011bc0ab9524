//! MPEG 音频帧头解析器.
//!
//! 帧头结构 (32 位):
//! ```text
//! AAAA AAAA  AAAB BCCD  EEEE FFGH  IIJJ KLMM
//! A = 同步位 (11 bit, 全1)   B = MPEG 版本    C = 层
//! D = CRC 保护              E = 比特率索引    F = 采样率索引
//! G = 填充位                H = 私有位        I = 声道模式
//! J = 模式扩展              K = 版权         L = 原始/复制
//! M = 强调
//! ```
//!
//! 支持 MPEG-1/2/2.5 的 Layer I/II/III. 解析只关心帧长与时长,
//! 不解码音频数据.

mod tables;
pub mod vbr_tag;

use xing_core::clock::samples_to_clock;
use xing_core::{ClockTime, InvalidHeader};

pub use tables::{BITRATES, SAMPLE_RATES};
pub use vbr_tag::{XingFlags, XingTag, has_vbr_tag, xing_offset};

/// 帧头长度 (字节)
pub const HEADER_SIZE: usize = 4;

/// 同步字掩码
pub const SYNC_MASK: u32 = 0xFFE0_0000;

/// 比特率索引字段掩码
pub const BITRATE_INDEX_MASK: u32 = 0x0000_F000;

/// 比特率索引字段偏移
pub const BITRATE_INDEX_SHIFT: u32 = 12;

/// 合法帧的最小长度 (MPEG-2 Layer III, 8 kbps, 24 kHz)
pub const MIN_FRAME_SIZE: u32 = 24;

/// MPEG 音频版本
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    /// MPEG-1
    Mpeg1,
    /// MPEG-2
    Mpeg2,
    /// MPEG-2.5
    Mpeg25,
}

impl MpegVersion {
    /// 从帧头版本位 (bit 20-19) 解析, 保留值返回 `None`
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits & 0x03 {
            3 => Some(Self::Mpeg1),
            2 => Some(Self::Mpeg2),
            0 => Some(Self::Mpeg25),
            _ => None,
        }
    }
}

/// 声道模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    /// 立体声
    Stereo,
    /// 联合立体声
    JointStereo,
    /// 双声道
    DualChannel,
    /// 单声道
    Mono,
}

impl ChannelMode {
    /// 从帧头声道模式位 (bit 7-6) 解析
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0x03 {
            0 => Self::Stereo,
            1 => Self::JointStereo,
            2 => Self::DualChannel,
            _ => Self::Mono,
        }
    }

    /// 声道数
    pub fn channels(self) -> u32 {
        if self == Self::Mono { 1 } else { 2 }
    }
}

/// 从已解析帧头推导出的帧描述
///
/// 每帧重新计算: VBR 流中比特率与声道模式可能逐帧变化.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    /// 原始 32 位帧头
    pub header: u32,
    /// MPEG 版本
    pub version: MpegVersion,
    /// 层 (1, 2, 3)
    pub layer: u32,
    /// 低采样率标志 (MPEG-1 为 0, 其余为 1)
    pub lsf: u32,
    /// 是否为 MPEG-2.5
    pub mpeg25: bool,
    /// 比特率 (bps)
    pub bitrate: u32,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 是否有填充
    pub padding: bool,
    /// 声道模式
    pub channel_mode: ChannelMode,
    /// 声道数
    pub channels: u32,
    /// 帧总字节数 (含头部)
    pub frame_size: u32,
    /// 每帧采样数
    pub samples_per_frame: u32,
}

impl FrameInfo {
    /// 解析 4 字节帧头
    pub fn parse(header: u32) -> Result<Self, InvalidHeader> {
        if header & SYNC_MASK != SYNC_MASK {
            return Err(InvalidHeader::Sync);
        }
        let version = MpegVersion::from_bits(header >> 19).ok_or(InvalidHeader::Version)?;

        let layer_bits = (header >> 17) & 0x03;
        if layer_bits == 0 {
            return Err(InvalidHeader::Layer);
        }

        let bitrate_index = bitrate_index(header);
        if bitrate_index == 0 || bitrate_index == 0x0F {
            return Err(InvalidHeader::Bitrate(bitrate_index));
        }

        let sr_index = ((header >> 10) & 0x03) as usize;
        if sr_index == 3 {
            return Err(InvalidHeader::SampleRate);
        }

        // 强调值 2 为保留值
        if header & 0x0000_0002 != 0 {
            return Err(InvalidHeader::Emphasis);
        }

        let (lsf, mpeg25) = match version {
            MpegVersion::Mpeg1 => (0u32, false),
            MpegVersion::Mpeg2 => (1, false),
            MpegVersion::Mpeg25 => (1, true),
        };

        let layer = 4 - layer_bits;
        let bitrate =
            BITRATES[lsf as usize][(layer - 1) as usize][usize::from(bitrate_index)] * 1000;
        if bitrate == 0 {
            return Err(InvalidHeader::Bitrate(bitrate_index));
        }
        let sample_rate = SAMPLE_RATES[lsf as usize + usize::from(mpeg25)][sr_index];

        let padding = (header >> 9) & 0x01 == 1;
        let pad = u32::from(padding);
        let channel_mode = ChannelMode::from_bits(header >> 6);

        let frame_size = match layer {
            1 => 4 * (bitrate * 12 / sample_rate + pad),
            2 => bitrate * 144 / sample_rate + pad,
            _ => bitrate * 144 / (sample_rate << lsf) + pad,
        };

        let samples_per_frame = if layer == 1 {
            384
        } else if layer == 2 || lsf == 0 {
            1152
        } else {
            576
        };

        Ok(Self {
            header,
            version,
            layer,
            lsf,
            mpeg25,
            bitrate,
            sample_rate,
            padding,
            channel_mode,
            channels: channel_mode.channels(),
            frame_size,
            samples_per_frame,
        })
    }

    /// 从字节切片开头解析帧头, 不足 4 字节返回 `None`
    pub fn peek(data: &[u8]) -> Option<Result<Self, InvalidHeader>> {
        read_header(data).map(Self::parse)
    }

    /// 单帧时长 (纳秒)
    pub fn duration(&self) -> ClockTime {
        samples_to_clock(u64::from(self.samples_per_frame), self.sample_rate)
    }

    /// 帧内 VBR 标签的起始偏移 (相对于帧头之后)
    pub fn xing_offset(&self) -> u32 {
        xing_offset(self.header)
    }
}

/// 读取切片开头的大端 32 位帧头
pub fn read_header(data: &[u8]) -> Option<u32> {
    let bytes: [u8; 4] = data.get(..HEADER_SIZE)?.try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}

/// 取帧头中的比特率索引
pub fn bitrate_index(header: u32) -> u8 {
    ((header & BITRATE_INDEX_MASK) >> BITRATE_INDEX_SHIFT) as u8
}

/// 替换帧头中的比特率索引, 其余字段保持不变
pub fn with_bitrate_index(header: u32, index: u8) -> u32 {
    (header & !BITRATE_INDEX_MASK) | ((u32::from(index) & 0x0F) << BITRATE_INDEX_SHIFT)
}
