//! 时钟时间与整数缩放.
//!
//! 时长与时间戳统一使用纳秒 (`u64`) 表示.
//! 缩放运算使用 u128 中间值, 避免 `a * b / c` 溢出.

/// 时钟时间, 单位纳秒
pub type ClockTime = u64;

/// 每秒纳秒数
pub const NSEC_PER_SEC: ClockTime = 1_000_000_000;

/// 计算 `val * num / denom`, 向下取整
///
/// `denom` 为 0 或结果超出 u64 时返回 `u64::MAX`.
pub fn scale_u64(val: u64, num: u64, denom: u64) -> u64 {
    if denom == 0 {
        return u64::MAX;
    }
    let result = u128::from(val) * u128::from(num) / u128::from(denom);
    u64::try_from(result).unwrap_or(u64::MAX)
}

/// 计算 `val * num / denom`, 四舍五入
///
/// `denom` 为 0 或结果超出 u64 时返回 `u64::MAX`.
pub fn scale_u64_round(val: u64, num: u64, denom: u64) -> u64 {
    if denom == 0 {
        return u64::MAX;
    }
    let denom = u128::from(denom);
    let result = (u128::from(val) * u128::from(num) + denom / 2) / denom;
    u64::try_from(result).unwrap_or(u64::MAX)
}

/// 将样本数换算为时长 (纳秒)
pub fn samples_to_clock(samples: u64, sample_rate: u32) -> ClockTime {
    scale_u64(samples, NSEC_PER_SEC, u64::from(sample_rate))
}
