//! # xing-core
//!
//! xingmux 核心库, 提供错误类型、时间基与时钟换算等基础设施.
//!
//! 其余 crate (`xing-codec`, `xing-format`) 均依赖本 crate.

pub mod clock;
pub mod error;
pub mod rational;

// 重导出常用类型
pub use clock::{ClockTime, NSEC_PER_SEC};
pub use error::{InvalidHeader, XingError, XingResult};
pub use rational::Rational;
