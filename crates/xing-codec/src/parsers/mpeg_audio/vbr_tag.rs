//! VBR 标签 (Xing / Info / VBRI) 定位与读取.
//!
//! Xing 标签位于首帧 side info 之后, 布局:
//! ```text
//! [帧头 4B][side info: 9/17/32B]["Xing"][flags 4B][frames 4B?][bytes 4B?][TOC 100B?][quality 4B?]
//! ```
//! 所有整数字段均为大端序.

use bitflags::bitflags;
use byteorder::{BigEndian, ByteOrder};
use log::debug;

use super::HEADER_SIZE;

/// Xing 标签标识
pub const XING_MAGIC: &[u8; 4] = b"Xing";

/// CBR 流使用的 Info 标签标识 (与 Xing 布局相同)
pub const INFO_MAGIC: &[u8; 4] = b"Info";

/// Fraunhofer VBRI 标签标识
pub const VBRI_MAGIC: &[u8; 4] = b"VBRI";

/// TOC (seek 表) 长度
pub const TOC_SIZE: usize = 100;

/// 完整 Xing 标签负载长度: magic + flags + frames + bytes + TOC
pub const XING_PAYLOAD_SIZE: u32 = 4 + 4 + 4 + 4 + TOC_SIZE as u32;

bitflags! {
    /// Xing 标签 flags 字段
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct XingFlags: u32 {
        /// 含总帧数
        const FRAMES = 1 << 0;
        /// 含总字节数
        const BYTES = 1 << 1;
        /// 含 100 字节 TOC
        const TOC = 1 << 2;
        /// 含质量指示
        const QUALITY = 1 << 3;
    }
}

/// 计算 VBR 标签相对于帧头之后的偏移 (即 side info 长度)
///
/// | 版本 | 立体声 | 单声道 |
/// |------|--------|--------|
/// | MPEG-1 | 32 | 17 |
/// | MPEG-2/2.5 | 17 | 9 |
pub fn xing_offset(header: u32) -> u32 {
    let is_mpeg1 = (header >> 19) & 0x03 == 0x03;
    let is_mono = (header >> 6) & 0x03 == 0x03;
    match (is_mpeg1, is_mono) {
        (true, false) => 32,
        (true, true) => 17,
        (false, false) => 17,
        (false, true) => 9,
    }
}

/// 判断帧内是否已有 VBR 标签
///
/// `frame` 为完整帧数据 (含帧头). 帧太短时视为没有标签.
pub fn has_vbr_tag(header: u32, frame: &[u8]) -> bool {
    let start = HEADER_SIZE + xing_offset(header) as usize;
    match frame.get(start..start + 4) {
        Some(tag) => tag == XING_MAGIC || tag == INFO_MAGIC || tag == VBRI_MAGIC,
        None => false,
    }
}

/// 已解析的 Xing / Info 标签
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XingTag {
    /// 是否为 Info 标签 (CBR)
    pub is_info: bool,
    /// flags 字段
    pub flags: XingFlags,
    /// 总帧数
    pub frames: Option<u32>,
    /// 总字节数
    pub bytes: Option<u32>,
    /// TOC
    pub toc: Option<[u8; TOC_SIZE]>,
    /// 质量指示 (0-100)
    pub quality: Option<u32>,
}

impl XingTag {
    /// 从完整帧数据 (含帧头) 中读取 Xing / Info 标签
    ///
    /// 标识不匹配或数据被截断时返回 `None`.
    pub fn parse(frame: &[u8]) -> Option<Self> {
        let header = super::read_header(frame)?;
        let mut pos = HEADER_SIZE + xing_offset(header) as usize;

        let magic = frame.get(pos..pos + 4)?;
        let is_info = match magic {
            m if m == XING_MAGIC => false,
            m if m == INFO_MAGIC => true,
            _ => return None,
        };
        pos += 4;

        let flags = XingFlags::from_bits_retain(read_u32(frame, &mut pos)?);

        let frames = if flags.contains(XingFlags::FRAMES) {
            Some(read_u32(frame, &mut pos)?)
        } else {
            None
        };
        let bytes = if flags.contains(XingFlags::BYTES) {
            Some(read_u32(frame, &mut pos)?)
        } else {
            None
        };
        let toc = if flags.contains(XingFlags::TOC) {
            let mut toc = [0u8; TOC_SIZE];
            toc.copy_from_slice(frame.get(pos..pos + TOC_SIZE)?);
            pos += TOC_SIZE;
            Some(toc)
        } else {
            None
        };
        let quality = if flags.contains(XingFlags::QUALITY) {
            Some(read_u32(frame, &mut pos)?)
        } else {
            None
        };

        debug!(
            "发现 {} 标签: flags={:#x}, frames={frames:?}, bytes={bytes:?}",
            if is_info { "Info" } else { "Xing" },
            flags.bits()
        );
        Some(Self {
            is_info,
            flags,
            frames,
            bytes,
            toc,
            quality,
        })
    }
}

/// 读取大端 u32 并前移位置
fn read_u32(data: &[u8], pos: &mut usize) -> Option<u32> {
    let bytes = data.get(*pos..*pos + 4)?;
    *pos += 4;
    Some(BigEndian::read_u32(bytes))
}
