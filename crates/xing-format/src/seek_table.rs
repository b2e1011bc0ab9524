//! Xing TOC 所需的稀疏 seek 表.
//!
//! 流的总时长直到结束才可知, 因此无法在写入时直接按百分比分桶.
//! 表按固定间隔 (`stride` 帧) 采样 (时间戳, 字节偏移), 容量写满时
//! 丢弃奇数位置的条目并将间隔加倍, 使条目始终均匀覆盖整条流.

use xing_core::ClockTime;
use xing_core::clock::scale_u64;
use xing_codec::parsers::mpeg_audio::vbr_tag::TOC_SIZE;

/// seek 表容量
pub const SEEK_TABLE_CAPACITY: usize = 100;

/// seek 表条目
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeekEntry {
    /// 帧起始时间 (纳秒)
    pub timestamp: ClockTime,
    /// 帧在输出流中的字节偏移
    pub byte: u64,
}

/// 固定容量的 seek 表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeekTable {
    entries: [SeekEntry; SEEK_TABLE_CAPACITY],
    len: usize,
    /// 采样间隔 (帧)
    stride: u64,
    /// 已经过 `record` 的帧数
    frames_seen: u64,
}

impl SeekTable {
    /// 创建空表
    pub fn new() -> Self {
        Self {
            entries: [SeekEntry::default(); SEEK_TABLE_CAPACITY],
            len: 0,
            stride: 1,
            frames_seen: 0,
        }
    }

    /// 记录一帧的起始时间与字节偏移
    ///
    /// 第一条记录的字节偏移固定为 0: 部分解析器要求 TOC 首项为 0.
    pub fn record(&mut self, timestamp: ClockTime, byte: u64) {
        let index = self.frames_seen;
        self.frames_seen += 1;
        if index % self.stride != 0 {
            return;
        }
        if self.len == SEEK_TABLE_CAPACITY {
            self.compact();
        }

        let byte = if self.len == 0 { 0 } else { byte };
        self.entries[self.len] = SeekEntry { timestamp, byte };
        self.len += 1;
    }

    /// 保留偶数位置的条目, 采样间隔加倍
    fn compact(&mut self) {
        let half = SEEK_TABLE_CAPACITY / 2;
        for i in 0..half {
            self.entries[i] = self.entries[i * 2];
        }
        for entry in &mut self.entries[half..] {
            *entry = SeekEntry::default();
        }
        self.len = half;
        self.stride *= 2;
    }

    /// 已记录的条目
    pub fn entries(&self) -> &[SeekEntry] {
        &self.entries[..self.len]
    }

    /// 条目数
    pub fn len(&self) -> usize {
        self.len
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 当前采样间隔 (帧)
    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// 清空
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// 生成 100 字节 TOC
    ///
    /// 第 `p` 项取时间不晚于总时长 `p%` 的最后一个条目,
    /// 其字节偏移按 `byte * 256 / total_bytes` 缩放到 0-255.
    /// 表为空或总量为 0 时全为 0.
    pub fn to_toc(&self, total_duration: ClockTime, total_bytes: u64) -> [u8; TOC_SIZE] {
        let mut toc = [0u8; TOC_SIZE];
        let entries = self.entries();
        if entries.is_empty() || total_duration == 0 || total_bytes == 0 {
            return toc;
        }

        let mut cursor = 0;
        for (percent, slot) in toc.iter_mut().enumerate() {
            while cursor + 1 < entries.len()
                && scale_u64(entries[cursor + 1].timestamp, 100, total_duration) <= percent as u64
            {
                cursor += 1;
            }
            *slot = scale_u64(entries[cursor].byte, 256, total_bytes).min(255) as u8;
        }
        toc
    }
}

impl Default for SeekTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_NS: ClockTime = 26_122_448;
    const FRAME_BYTES: u64 = 417;

    fn fill(table: &mut SeekTable, frames: u64, header_bytes: u64) {
        for i in 0..frames {
            table.record(i * FRAME_NS, header_bytes + i * FRAME_BYTES);
        }
    }

    #[test]
    fn test_first_entry_forced_to_zero() {
        let mut table = SeekTable::new();
        table.record(0, 156);
        table.record(FRAME_NS, 573);
        assert_eq!(table.entries()[0], SeekEntry { timestamp: 0, byte: 0 });
        assert_eq!(table.entries()[1].byte, 573);
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let mut table = SeekTable::new();
        fill(&mut table, 100, 0);
        assert_eq!(table.len(), 100);
        assert_eq!(table.stride(), 1);

        // 第 101 帧触发压缩
        table.record(100 * FRAME_NS, 100 * FRAME_BYTES);
        assert_eq!(table.len(), 51);
        assert_eq!(table.stride(), 2);

        let mut table = SeekTable::new();
        fill(&mut table, 10_000, 0);
        assert!(table.len() <= SEEK_TABLE_CAPACITY);
        assert!(table.len() >= SEEK_TABLE_CAPACITY / 2);
    }

    #[test]
    fn test_entries_evenly_spaced_after_compaction() {
        let mut table = SeekTable::new();
        fill(&mut table, 1000, 0);
        let stride = table.stride();
        for (i, entry) in table.entries().iter().enumerate() {
            assert_eq!(entry.timestamp, i as u64 * stride * FRAME_NS);
        }
    }

    #[test]
    fn test_entries_monotonic() {
        let mut table = SeekTable::new();
        fill(&mut table, 777, 156);
        for pair in table.entries().windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
            assert!(pair[0].byte <= pair[1].byte);
        }
    }

    #[test]
    fn test_toc_monotonic_and_starts_at_zero() {
        let frames = 500;
        let mut table = SeekTable::new();
        fill(&mut table, frames, 156);
        let total_duration = frames * FRAME_NS;
        let total_bytes = 156 + frames * FRAME_BYTES;

        let toc = table.to_toc(total_duration, total_bytes);
        assert_eq!(toc[0], 0);
        for pair in toc.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        // CBR 流: 50% 处约为 128/256
        assert!((120..=130).contains(&toc[50]), "toc[50] = {}", toc[50]);
        assert!(toc[99] >= 245);
    }

    #[test]
    fn test_toc_empty_table() {
        let table = SeekTable::new();
        assert_eq!(table.to_toc(1_000, 1_000), [0u8; TOC_SIZE]);
    }

    #[test]
    fn test_toc_zero_totals() {
        let mut table = SeekTable::new();
        fill(&mut table, 10, 0);
        assert_eq!(table.to_toc(0, 1_000), [0u8; TOC_SIZE]);
        assert_eq!(table.to_toc(1_000, 0), [0u8; TOC_SIZE]);
    }

    #[test]
    fn test_clear_resets_stride() {
        let mut table = SeekTable::new();
        fill(&mut table, 300, 0);
        table.clear();
        assert_eq!(table, SeekTable::new());
    }
}
