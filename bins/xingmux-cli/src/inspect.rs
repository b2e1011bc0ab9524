//! `inspect` 子命令: 读取首帧的 Xing / Info 标签并逐帧统计.

use anyhow::{Context, Result, bail};
use serde::Serialize;

use xing_codec::FrameInfo;
use xing_codec::parsers::mpeg_audio::XingTag;
use xing_codec::parsers::mpeg_audio::vbr_tag::has_vbr_tag;
use xing_core::ClockTime;
use xing_format::IoContext;

use crate::{InspectArgs, clock_to_seconds, print_json};

#[derive(Serialize)]
struct InspectOutput {
    filename: String,
    file_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_frame: Option<FrameSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<TagSummary>,
    /// 逐帧扫描得到的音频帧数 (不含标签帧)
    counted_frames: u64,
    counted_duration_secs: f64,
    /// 重新同步时跳过的字节数
    skipped_bytes: u64,
}

#[derive(Serialize)]
struct FrameSummary {
    offset: u64,
    version: String,
    layer: u32,
    sample_rate: u32,
    channels: u32,
    bit_rate: u32,
    frame_size: u32,
}

#[derive(Serialize)]
struct TagSummary {
    kind: &'static str,
    flags: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    frames: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes: Option<u32>,
    has_toc: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    quality: Option<u32>,
}

pub fn run(args: &InspectArgs) -> Result<()> {
    let mut io = IoContext::open_read(&args.input)
        .with_context(|| format!("打开输入文件失败: {}", args.input))?;
    let data = read_all(&mut io)?;
    let output = inspect(&args.input, &data);

    if output.first_frame.is_none() {
        bail!("'{}' 中没有找到 MPEG 音频帧", args.input);
    }
    if args.json {
        return print_json(&output, false);
    }
    print_text(&output);
    Ok(())
}

fn read_all(io: &mut IoContext) -> Result<Vec<u8>> {
    let mut data = Vec::with_capacity(io.size().unwrap_or(0) as usize);
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = io.read(&mut buf).context("读取输入失败")?;
        if n == 0 {
            return Ok(data);
        }
        data.extend_from_slice(&buf[..n]);
    }
}

fn inspect(filename: &str, data: &[u8]) -> InspectOutput {
    let mut output = InspectOutput {
        filename: filename.to_string(),
        file_size: data.len() as u64,
        first_frame: None,
        tag: None,
        counted_frames: 0,
        counted_duration_secs: 0.0,
        skipped_bytes: 0,
    };

    let mut duration: ClockTime = 0;
    let mut pos = 0usize;
    while let Some(peeked) = FrameInfo::peek(&data[pos..]) {
        let info = match peeked {
            Ok(info) => info,
            Err(_) => {
                pos += 1;
                output.skipped_bytes += 1;
                continue;
            }
        };
        let end = pos + info.frame_size as usize;
        if end > data.len() {
            break;
        }
        let frame = &data[pos..end];

        if output.first_frame.is_none() {
            output.first_frame = Some(FrameSummary {
                offset: pos as u64,
                version: format!("{:?}", info.version),
                layer: info.layer,
                sample_rate: info.sample_rate,
                channels: info.channels,
                bit_rate: info.bitrate,
                frame_size: info.frame_size,
            });
            if has_vbr_tag(info.header, frame) {
                output.tag = XingTag::parse(frame).map(|tag| TagSummary {
                    kind: if tag.is_info { "Info" } else { "Xing" },
                    flags: tag.flags.bits(),
                    frames: tag.frames,
                    bytes: tag.bytes,
                    has_toc: tag.toc.is_some(),
                    quality: tag.quality,
                });
                pos = end;
                continue;
            }
        }

        output.counted_frames += 1;
        duration += info.duration();
        pos = end;
    }

    output.counted_duration_secs = clock_to_seconds(duration);
    output
}

fn print_text(output: &InspectOutput) {
    println!("文件: {} ({} 字节)", output.filename, output.file_size);
    if let Some(frame) = &output.first_frame {
        println!(
            "首帧: 偏移 {}, {} Layer {}, {} Hz, {} 声道, {} kbps, {} 字节",
            frame.offset,
            frame.version,
            frame.layer,
            frame.sample_rate,
            frame.channels,
            frame.bit_rate / 1000,
            frame.frame_size
        );
    }
    match &output.tag {
        Some(tag) => {
            println!("标签: {} (flags={:#x})", tag.kind, tag.flags);
            if let Some(frames) = tag.frames {
                println!("  帧数: {frames}");
            }
            if let Some(bytes) = tag.bytes {
                println!("  字节数: {bytes}");
            }
            println!("  TOC: {}", if tag.has_toc { "有" } else { "无" });
        }
        None => println!("标签: 无"),
    }
    println!(
        "扫描: {} 帧, {:.3} 秒, 跳过 {} 字节",
        output.counted_frames, output.counted_duration_secs, output.skipped_bytes
    );
}
