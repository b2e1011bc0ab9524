//! # xing-codec
//!
//! xingmux 码流层: MPEG 音频帧头解析、VBR 标签定位与数据包 (Packet) 抽象.
//!
//! ## 使用示例
//!
//! ```rust
//! use xing_codec::parsers::mpeg_audio::FrameInfo;
//!
//! // MPEG-1 Layer III, 128 kbps, 44100 Hz, 立体声
//! let info = FrameInfo::parse(0xFFFB_9000).unwrap();
//! assert_eq!(info.frame_size, 417);
//! assert_eq!(info.samples_per_frame, 1152);
//! ```

pub mod packet;
pub mod parsers;

// 重导出常用类型
pub use packet::{Packet, PacketKind};
pub use parsers::mpeg_audio::{ChannelMode, FrameInfo, MpegVersion};
