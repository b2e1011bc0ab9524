//! 端到端集成测试: MPEG 音频流的 Xing 头封装管线.
//!
//! 测试流程: 生成 MPEG 音频帧 → 分块推送 → 输出到文件/内存/记录接收端 → 解析 Xing 头验证

use std::io::SeekFrom;

use xingmux::codec::FrameInfo;
use xingmux::codec::parsers::mpeg_audio::XingTag;
use xingmux::codec::parsers::mpeg_audio::vbr_tag::XingFlags;
use xingmux::core::clock::samples_to_clock;
use xingmux::format::{
    HeaderStatus, IoContext, MemoryBackend, MuxState, PacketSink, RecordingSink, Segment,
    SegmentFormat, SinkEvent, XingMuxer,
};

/// MPEG-1 Layer III, 44100 Hz, 联合立体声, 比特率索引待填
const MPEG1_BASE: u32 = 0xFFFB_0040;
/// MPEG-2 Layer III, 22050 Hz, 单声道, 比特率索引待填
const MPEG2_MONO_BASE: u32 = 0xFFF3_00C0;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 生成一个以 `header` 开头、以 `fill` 填充的完整帧
fn make_frame(header: u32, fill: u8) -> Vec<u8> {
    let info = FrameInfo::parse(header).unwrap();
    let mut data = vec![fill; info.frame_size as usize];
    data[..4].copy_from_slice(&header.to_be_bytes());
    data
}

/// 生成比特率逐帧变化的 VBR 流
fn make_vbr_stream(base: u32, frames: usize) -> Vec<u8> {
    const INDICES: [u32; 5] = [9, 11, 5, 14, 7];
    (0..frames)
        .flat_map(|i| {
            let header = base | (INDICES[i % INDICES.len()] << 12);
            make_frame(header, (i % 0x70) as u8)
        })
        .collect()
}

/// 生成带 LAME 风格 Info 标签的首帧
fn make_info_tag_frame(header: u32) -> Vec<u8> {
    let mut data = make_frame(header, 0);
    data[36..40].copy_from_slice(b"Info");
    data[40..44].copy_from_slice(&0x0Fu32.to_be_bytes());
    data
}

fn mux_all(
    mux: &mut XingMuxer,
    sink: &mut dyn PacketSink,
    data: &[u8],
    chunk: usize,
) -> HeaderStatus {
    for part in data.chunks(chunk) {
        mux.push(sink, part).unwrap();
    }
    mux.finish(sink).unwrap()
}

fn assert_toc_valid(toc: &[u8; 100]) {
    assert_eq!(toc[0], 0);
    for pair in toc.windows(2) {
        assert!(pair[0] <= pair[1], "TOC 非单调: {toc:?}");
    }
}

#[test]
fn test_vbr_流写入文件并回写最终头() {
    init_logger();
    let input = make_vbr_stream(MPEG1_BASE, 300);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.mp3");
    let path_str = path.to_str().unwrap();

    let mut io = IoContext::open_write(path_str).unwrap();
    let mut mux = XingMuxer::new();
    assert!(mux.handle_segment(&mut io, Segment::bytes(0)).unwrap());
    let status = mux_all(&mut mux, &mut io, &input, 1000);
    assert_eq!(status, HeaderStatus::Final);
    drop(io);

    let output = std::fs::read(&path).unwrap();
    let header_info = FrameInfo::peek(&output).unwrap().unwrap();
    let header_size = header_info.frame_size as usize;
    assert_eq!(header_info.sample_rate, 44100);
    assert_eq!(output.len(), header_size + input.len());
    assert_eq!(&output[header_size..], &input[..]);

    let tag = XingTag::parse(&output).unwrap();
    assert!(!tag.is_info);
    assert_eq!(tag.flags, XingFlags::FRAMES | XingFlags::BYTES | XingFlags::TOC);
    assert_eq!(tag.frames, Some(300));
    assert_eq!(tag.bytes, Some(output.len() as u32));
    assert_toc_valid(&tag.toc.unwrap());

    let stats = mux.stats();
    assert_eq!(stats.frames_emitted, 300);
    assert_eq!(stats.byte_count, output.len() as u64);
    assert_eq!(stats.duration, 300 * samples_to_clock(1152, 44100));
}

#[test]
fn test_替换已有_info_标签() {
    init_logger();
    let first = MPEG1_BASE | (9 << 12);
    let tag_frame = make_info_tag_frame(first);
    let audio = make_vbr_stream(MPEG1_BASE, 40);
    let input = [tag_frame.clone(), audio.clone()].concat();

    let mut io = IoContext::new(Box::new(MemoryBackend::new()));
    let mut mux = XingMuxer::new();
    assert_eq!(mux_all(&mut mux, &mut io, &input, 333), HeaderStatus::Final);
    assert_eq!(mux.stats().tags_dropped, 1);

    let size = io.size().unwrap() as usize;
    io.seek(SeekFrom::Start(0)).unwrap();
    let output = io.read_bytes(size).unwrap();

    let tag = XingTag::parse(&output).unwrap();
    assert!(!tag.is_info);
    assert_eq!(tag.frames, Some(40));
    let header_size = output.len() - audio.len();
    assert_eq!(&output[header_size..], &audio[..]);
}

#[test]
fn test_mpeg2_单声道流() {
    init_logger();
    let input = make_vbr_stream(MPEG2_MONO_BASE, 120);
    let mut sink = RecordingSink::seekable();
    let mut mux = XingMuxer::new();
    assert_eq!(mux_all(&mut mux, &mut sink, &input, 4096), HeaderStatus::Final);

    let output = sink.output();
    let header = FrameInfo::peek(&output).unwrap().unwrap();
    assert_eq!(header.lsf, 1);
    assert_eq!(header.channels, 1);
    assert_eq!(header.samples_per_frame, 576);
    // MPEG-2 单声道: 标签位于帧头后 9 字节
    assert_eq!(&output[13..17], b"Xing");

    let tag = XingTag::parse(&output).unwrap();
    assert_eq!(tag.frames, Some(120));
    assert_eq!(tag.bytes, Some(output.len() as u32));
}

#[test]
fn test_分块方式不影响输出() {
    init_logger();
    let mut garbage_prefix = vec![0x12, 0xFF, 0x00, 0x7E];
    garbage_prefix.extend(make_vbr_stream(MPEG1_BASE, 50));
    let input = garbage_prefix;

    let mut outputs = Vec::new();
    for chunk in [1, 7, 418, 65536] {
        let mut sink = RecordingSink::seekable();
        let mut mux = XingMuxer::new();
        mux_all(&mut mux, &mut sink, &input, chunk);
        assert_eq!(mux.stats().bytes_skipped, 4);
        outputs.push(sink.output());
    }
    for output in &outputs[1..] {
        assert_eq!(output, &outputs[0]);
    }
}

#[test]
fn test_不可回写输出保留临时头() {
    init_logger();
    let input = make_vbr_stream(MPEG1_BASE, 20);

    let mut io = IoContext::new(Box::new(MemoryBackend::non_seekable()));
    let mut mux = XingMuxer::new();
    assert_eq!(mux_all(&mut mux, &mut io, &input, 512), HeaderStatus::Provisional);
    assert_eq!(io.size(), Some(mux.stats().byte_count));

    let mut sink = RecordingSink::non_seekable();
    let mut mux = XingMuxer::new();
    assert_eq!(mux_all(&mut mux, &mut sink, &input, 512), HeaderStatus::Provisional);
    let tag = XingTag::parse(&sink.output()).unwrap();
    assert!(tag.flags.is_empty());
    assert!(!sink.events.iter().any(|e| matches!(e, SinkEvent::Reposition(_))));
}

#[test]
fn test_时间段转换为字节段() {
    init_logger();
    let mut sink = RecordingSink::seekable();
    let mut mux = XingMuxer::new();
    assert!(mux.handle_segment(&mut sink, Segment::time(0, None)).unwrap());

    let input = make_vbr_stream(MPEG1_BASE, 3);
    mux.push(&mut sink, &input).unwrap();
    assert_eq!(mux.state(), MuxState::Streaming);
    assert!(!mux.handle_segment(&mut sink, Segment::time(0, None)).unwrap());

    let segments: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            SinkEvent::Segment(s) => Some(*s),
            _ => None,
        })
        .collect();
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].format, SegmentFormat::Bytes);
    assert_eq!(segments[0].start, 0);
    assert_eq!(segments[0].stop, None);
}

#[test]
fn test_重置后处理第二条流() {
    init_logger();
    let mut mux = XingMuxer::new();

    let mut first = RecordingSink::seekable();
    mux_all(&mut mux, &mut first, &make_vbr_stream(MPEG1_BASE, 10), 100);
    mux.reset();
    assert_eq!(mux.state(), MuxState::Idle);

    let mut second = RecordingSink::seekable();
    mux_all(&mut mux, &mut second, &make_vbr_stream(MPEG2_MONO_BASE, 5), 100);
    let tag = XingTag::parse(&second.output()).unwrap();
    assert_eq!(tag.frames, Some(5));
}
