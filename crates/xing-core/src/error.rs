//! 统一错误类型定义.
//!
//! 所有 xingmux crate 共用的错误类型, 支持跨模块传播.

use thiserror::Error;

/// MPEG 音频帧头校验失败的原因
///
/// 每个变体对应一项帧头合法性检查.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidHeader {
    /// 同步字 (高 11 位) 不全为 1
    #[error("同步字无效")]
    Sync,

    /// MPEG 版本为保留值
    #[error("MPEG 版本为保留值")]
    Version,

    /// 层为保留值
    #[error("MPEG 层为保留值")]
    Layer,

    /// 比特率索引为 free format (0) 或保留值 (15)
    #[error("比特率索引无效: {0}")]
    Bitrate(u8),

    /// 采样率索引为保留值
    #[error("采样率索引为保留值")]
    SampleRate,

    /// 强调 (emphasis) 字段为保留值
    #[error("强调字段无效")]
    Emphasis,
}

/// xingmux 统一错误类型
#[derive(Debug, Error)]
pub enum XingError {
    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 不支持的操作
    #[error("不支持的操作: {0}")]
    Unsupported(String),

    /// 帧头无效
    #[error("帧头无效: {0}")]
    InvalidHeader(#[from] InvalidHeader),

    /// 找不到能容纳 Xing 标签的比特率
    #[error("没有可用的比特率能容纳 Xing 标签 (需要 {required} 字节)")]
    NoUsableBitrate {
        /// 需要的最小帧长 (字节)
        required: u32,
    },

    /// I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 已到达流末尾
    #[error("已到达流末尾")]
    Eof,
}

/// xingmux 统一 Result 类型
pub type XingResult<T> = Result<T, XingError>;
