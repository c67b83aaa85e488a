//! 时间类型模块
//!
//! `Timestamp` 是可序列化的毫秒时间戳，用于增量同步的 `since` 参数、
//! 通知 ID 等场景。内部为 `i64`，线路上序列化为裸数字。

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};
use std::time::Duration;

/// 毫秒时间戳
///
/// 自 Unix 纪元以来的毫秒数。`Default` 为 0，表示"从未同步过"。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// 创建新的时间戳
    #[inline]
    pub const fn new(ms: i64) -> Self {
        Self(ms)
    }

    /// 当前时刻
    ///
    /// chrono 在 wasm32 目标上走 JS `Date`，原生目标走系统时钟。
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }

    /// 获取毫秒值
    #[inline]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    /// 获取秒值
    #[inline]
    pub const fn as_secs(&self) -> i64 {
        self.0 / 1000
    }

    /// 是否从未同步过（零值哨兵）
    #[inline]
    pub const fn is_epoch(&self) -> bool {
        self.0 == 0
    }

    /// 解析 RFC 3339 时间字符串（上游记录的 createdAt/updatedAt 格式）
    ///
    /// 返回 None 如果解析失败
    pub fn parse_rfc3339(s: &str) -> Option<Self> {
        chrono::DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| Self(dt.timestamp_millis()))
    }
}

impl From<i64> for Timestamp {
    fn from(ms: i64) -> Self {
        Self(ms)
    }
}

impl From<Timestamp> for i64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl Add<Duration> for Timestamp {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + rhs.as_millis() as i64)
    }
}

impl Sub<Duration> for Timestamp {
    type Output = Self;

    fn sub(self, rhs: Duration) -> Self::Output {
        Self(self.0 - rhs.as_millis() as i64)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_bare_number() {
        let ts = Timestamp::new(1_700_000_000_000);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "1700000000000");
        let back: Timestamp = serde_json::from_str("1700000000000").unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn default_is_epoch_sentinel() {
        assert!(Timestamp::default().is_epoch());
        assert!(!Timestamp::now().is_epoch());
    }

    #[test]
    fn parses_rfc3339_strings() {
        let ts = Timestamp::parse_rfc3339("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(ts.as_secs(), 1_704_067_200);
        assert!(Timestamp::parse_rfc3339("not-a-date").is_none());
    }

    #[test]
    fn duration_arithmetic() {
        let ts = Timestamp::new(10_000);
        assert_eq!((ts + Duration::from_secs(5)).as_millis(), 15_000);
        assert_eq!((ts - Duration::from_secs(5)).as_secs(), 5);
        assert!(ts < ts + Duration::from_millis(1));
    }
}
