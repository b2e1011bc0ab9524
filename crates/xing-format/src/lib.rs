//! # xing-format
//!
//! xingmux 封装层: 在 MPEG 音频流前插入 Xing 头帧, 流结束时回写最终统计.
//!
//! 封装器通过 [`PacketSink`] 向下游输出, [`IoContext`] 提供文件、内存与
//! 管道三种输出后端.

pub mod io;
pub mod muxer;
pub mod seek_table;
pub mod segment;
pub mod sink;
pub mod xing_header;

// 重导出常用类型
pub use io::{IoContext, MemoryBackend};
pub use muxer::{HeaderStatus, MuxState, MuxStats, StreamState, XingMuxer};
pub use seek_table::SeekTable;
pub use segment::{Segment, SegmentFormat};
pub use sink::{PacketSink, RecordingSink, SinkEvent};
pub use xing_header::build_xing_header;
