//! Xing 头帧合成.
//!
//! 以首帧帧头为模板, 从最低比特率开始寻找一个帧长足以容纳完整
//! Xing 标签 (帧数 + 字节数 + TOC) 的比特率索引, 再按当前已知的
//! 统计信息填写标签. 版本、层、采样率与声道模式保持与首帧一致.

use byteorder::{BigEndian, ByteOrder};
use bytes::{Bytes, BytesMut};
use log::debug;
use xing_codec::parsers::mpeg_audio::vbr_tag::{XING_MAGIC, XING_PAYLOAD_SIZE, XingFlags};
use xing_codec::parsers::mpeg_audio::{FrameInfo, HEADER_SIZE, with_bitrate_index, xing_offset};
use xing_core::clock::scale_u64_round;
use xing_core::{ClockTime, NSEC_PER_SEC, XingError, XingResult};

use crate::seek_table::SeekTable;

/// 比特率索引搜索上限 (不含): 索引字段只有 4 位, 15 为保留值
const BITRATE_INDEX_LIMIT: u8 = 15;

/// 容纳 `payload` 字节标签负载所需的最小帧长
pub fn required_frame_size(header: u32, payload: u32) -> u32 {
    HEADER_SIZE as u32 + xing_offset(header) + payload
}

/// 从索引 1 开始递增比特率, 返回第一个帧长不小于所需长度的帧描述
pub fn select_bitrate(first_header: u32, payload: u32) -> XingResult<FrameInfo> {
    let required = required_frame_size(first_header, payload);
    for index in 1..BITRATE_INDEX_LIMIT {
        let candidate = with_bitrate_index(first_header, index);
        match FrameInfo::parse(candidate) {
            Ok(info) if info.frame_size >= required => return Ok(info),
            Ok(_) => {}
            Err(reason) => return Err(reason.into()),
        }
    }
    Err(XingError::NoUsableBitrate { required })
}

/// 合成 Xing 头帧
///
/// - `duration`: 流总时长, 已知时写入总帧数
/// - `byte_count`: 输出流总字节数 (含头帧本身), 已知且非 0 时写入
/// - 两者均已知且 seek 表非空时写入 TOC
pub fn build_xing_header(
    first_header: u32,
    duration: Option<ClockTime>,
    byte_count: Option<u64>,
    seek_table: &SeekTable,
) -> XingResult<Bytes> {
    let info = select_bitrate(first_header, XING_PAYLOAD_SIZE)?;

    let mut buf = BytesMut::zeroed(info.frame_size as usize);
    BigEndian::write_u32(&mut buf[..HEADER_SIZE], info.header);

    let mut pos = HEADER_SIZE + info.xing_offset() as usize;
    buf[pos..pos + 4].copy_from_slice(XING_MAGIC);
    pos += 4;
    let flags_pos = pos;
    pos += 4;

    let mut flags = XingFlags::empty();

    if let Some(duration) = duration {
        // 逐帧累加的时长经过截断, 四舍五入才能还原准确帧数
        let frames = scale_u64_round(
            duration,
            u64::from(info.sample_rate),
            NSEC_PER_SEC * u64::from(info.samples_per_frame),
        );
        debug!("Xing 头: 总帧数 {frames}");
        BigEndian::write_u32(&mut buf[pos..pos + 4], saturate_u32(frames));
        flags |= XingFlags::FRAMES;
        pos += 4;
    }

    let byte_count = byte_count.filter(|&bytes| bytes > 0);
    if let Some(bytes) = byte_count {
        debug!("Xing 头: 总字节数 {bytes}");
        BigEndian::write_u32(&mut buf[pos..pos + 4], saturate_u32(bytes));
        flags |= XingFlags::BYTES;
        pos += 4;
    }

    if let (Some(duration), Some(bytes)) = (duration, byte_count) {
        if !seek_table.is_empty() {
            debug!("Xing 头: 写入 TOC ({} 个条目)", seek_table.len());
            let toc = seek_table.to_toc(duration, bytes);
            buf[pos..pos + toc.len()].copy_from_slice(&toc);
            flags |= XingFlags::TOC;
        }
    }

    BigEndian::write_u32(&mut buf[flags_pos..flags_pos + 4], flags.bits());
    debug!(
        "Xing 头帧: {} 字节, 比特率 {} kbps, flags={:#x}",
        info.frame_size,
        info.bitrate / 1000,
        flags.bits()
    );
    Ok(buf.freeze())
}

fn saturate_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use xing_codec::parsers::mpeg_audio::XingTag;
    use xing_codec::parsers::mpeg_audio::bitrate_index;
    use xing_core::clock::samples_to_clock;

    /// MPEG-1 Layer III, 128 kbps, 44100 Hz, 立体声
    const MPEG1_STEREO: u32 = 0xFFFB_9000;
    /// MPEG-1 Layer III, 128 kbps, 44100 Hz, 单声道
    const MPEG1_MONO: u32 = 0xFFFB_90C0;
    /// MPEG-2 Layer III, 64 kbps, 22050 Hz, 立体声
    const MPEG2_STEREO: u32 = 0xFFF3_8000;

    #[test]
    fn test_选择最低可用比特率() {
        // 需要 4 + 32 + 116 = 152 字节
        // 索引 1 (32k) = 104, 索引 2 (40k) = 130, 索引 3 (48k) = 156
        let info = select_bitrate(MPEG1_STEREO, XING_PAYLOAD_SIZE).unwrap();
        assert_eq!(bitrate_index(info.header), 3);
        assert_eq!(info.frame_size, 156);
    }

    #[test]
    fn test_负载增大时递增比特率() {
        // 4 + 32 + 104 = 140: 索引 1 的 104 字节不够, 索引 2 的 130 字节也不够
        let info = select_bitrate(MPEG1_STEREO, 104).unwrap();
        assert!(info.frame_size >= 140);
        assert_eq!(bitrate_index(info.header), 3);

        // 负载小于索引 1 帧长时直接使用索引 1
        let info = select_bitrate(MPEG1_STEREO, 4).unwrap();
        assert_eq!(bitrate_index(info.header), 1);
    }

    #[test]
    fn test_无可用比特率() {
        let err = select_bitrate(MPEG1_STEREO, 100_000).unwrap_err();
        assert!(matches!(err, XingError::NoUsableBitrate { required: 100_036 }));
    }

    #[test]
    fn test_临时头_无统计信息() {
        let header = build_xing_header(MPEG1_STEREO, None, None, &SeekTable::new()).unwrap();
        assert_eq!(header.len(), 156);
        assert_eq!(&header[36..40], b"Xing");
        assert_eq!(&header[40..44], &[0, 0, 0, 0]);
        // 其余字段全为 0
        assert!(header[44..].iter().all(|&b| b == 0));

        let tag = XingTag::parse(&header).unwrap();
        assert!(tag.flags.is_empty());
    }

    #[test]
    fn test_头帧可被重新解析() {
        for first in [MPEG1_STEREO, MPEG1_MONO, MPEG2_STEREO, MPEG1_STEREO | 0x200] {
            let header = build_xing_header(first, None, None, &SeekTable::new()).unwrap();
            let info = FrameInfo::peek(&header).unwrap().unwrap();
            assert_eq!(info.frame_size as usize, header.len());
            assert_eq!(info.sample_rate, FrameInfo::parse(first).unwrap().sample_rate);
            assert_eq!(info.channel_mode, FrameInfo::parse(first).unwrap().channel_mode);
            assert!(XingTag::parse(&header).is_some());
        }
    }

    #[test]
    fn test_最终头_完整字段() {
        let frames = 250u64;
        let frame_ns = samples_to_clock(1152, 44100);
        let mut table = SeekTable::new();
        let mut bytes = 156u64;
        for i in 0..frames {
            table.record(i * frame_ns, bytes);
            bytes += 417;
        }
        let duration = frames * frame_ns;

        let header = build_xing_header(MPEG1_STEREO, Some(duration), Some(bytes), &table).unwrap();
        let tag = XingTag::parse(&header).unwrap();
        assert_eq!(tag.flags, XingFlags::FRAMES | XingFlags::BYTES | XingFlags::TOC);
        assert_eq!(tag.frames, Some(250));
        assert_eq!(tag.bytes, Some(bytes as u32));
        let toc = tag.toc.unwrap();
        assert_eq!(toc[0], 0);
        assert!(toc.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_只有时长时不写_toc() {
        let mut table = SeekTable::new();
        table.record(0, 0);
        let header =
            build_xing_header(MPEG1_STEREO, Some(NSEC_PER_SEC), None, &table).unwrap();
        let tag = XingTag::parse(&header).unwrap();
        assert_eq!(tag.flags, XingFlags::FRAMES);
        // 1 秒 @ 44100 Hz / 1152 = 38.28
        assert_eq!(tag.frames, Some(38));
        assert_eq!(tag.toc, None);
    }

    #[test]
    fn test_字节数为零视为未知() {
        let header =
            build_xing_header(MPEG1_STEREO, None, Some(0), &SeekTable::new()).unwrap();
        let tag = XingTag::parse(&header).unwrap();
        assert!(tag.flags.is_empty());
    }

    #[test]
    fn test_空_seek_表不写_toc() {
        let header =
            build_xing_header(MPEG1_STEREO, Some(NSEC_PER_SEC), Some(10_000), &SeekTable::new())
                .unwrap();
        let tag = XingTag::parse(&header).unwrap();
        assert_eq!(tag.flags, XingFlags::FRAMES | XingFlags::BYTES);
    }
}
