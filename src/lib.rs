//! # xingmux
//!
//! 纯 Rust 实现的 MPEG 音频 Xing 头封装器.
//!
//! 输入任意切分的 MPEG-1/2/2.5 音频裸流, 输出在首个音频帧之前插入
//! Xing 头帧的同一条流. 流结束时若下游支持回写, 头帧会被替换为带有
//! 总帧数、总字节数与 TOC 的最终版本.
//!
//! # 快速开始
//!
//! ```rust
//! use xingmux::format::{HeaderStatus, RecordingSink, XingMuxer};
//!
//! // 两个 MPEG-1 Layer III 128 kbps 帧
//! let mut frame = vec![0u8; 417];
//! frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x00]);
//! let input = [frame.clone(), frame].concat();
//!
//! let mut mux = XingMuxer::new();
//! let mut sink = RecordingSink::seekable();
//! mux.push(&mut sink, &input).unwrap();
//! assert_eq!(mux.finish(&mut sink).unwrap(), HeaderStatus::Final);
//! assert_eq!(sink.output().len(), 156 + 2 * 417);
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `xing-core` | 错误类型、时间基与时钟换算 |
//! | `xing-codec` | MPEG 音频帧头解析、VBR 标签、数据包 |
//! | `xing-format` | 封装器、seek 表、下游接收端与 I/O |

/// 核心类型与工具
pub use xing_core as core;

/// 帧头解析与数据包
pub use xing_codec as codec;

/// 封装器与 I/O
pub use xing_format as format;

/// 获取 xingmux 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
