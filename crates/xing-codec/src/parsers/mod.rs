//! 码流解析器.

pub mod mpeg_audio;
