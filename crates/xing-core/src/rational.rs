//! 有理数类型, 用于数据包的时间基 (time_base).

use std::fmt;

/// 有理数, 由分子和分母组成
///
/// 数据包的时间戳以 time_base 为单位, 本项目统一使用纳秒时间基 [`Rational::NANO`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    /// 分子
    pub num: i32,
    /// 分母
    pub den: i32,
}

impl Rational {
    /// 纳秒时间基 (1/1_000_000_000)
    pub const NANO: Self = Self {
        num: 1,
        den: 1_000_000_000,
    };

    /// 转换为 f64 浮点数, 分母为 0 时返回 `f64::NAN`
    pub fn to_f64(self) -> f64 {
        if self.den == 0 {
            return f64::NAN;
        }
        f64::from(self.num) / f64::from(self.den)
    }

    /// 将以本时间基表示的整数值换算为秒
    pub fn ticks_to_seconds(self, ticks: i64) -> f64 {
        ticks as f64 * self.to_f64()
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}
