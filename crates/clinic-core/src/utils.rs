//! 通用工具函数

use std::sync::atomic::{AtomicU64, Ordering};

/// 单调递增的标识符生成器
///
/// 患者和预约的编号都由它分配，保证进程生命周期内不重复。
#[derive(Debug)]
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    pub fn new(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start.max(1)),
        }
    }

    /// 从已有编号之后开始分配
    pub fn after<I>(existing: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        let max = existing.into_iter().max().unwrap_or(0);
        Self::new(max + 1)
    }

    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// 预留编号，确保之后分配的编号都大于 `id`
    pub fn reserve(&self, id: u64) {
        self.next.fetch_max(id + 1, Ordering::Relaxed);
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(1)
    }
}

/// 四舍五入到一位小数
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let ids = IdGenerator::after([3, 8, 5]);
        assert_eq!(ids.next_id(), 9);
        assert_eq!(ids.next_id(), 10);

        ids.reserve(42);
        assert_eq!(ids.next_id(), 43);

        ids.reserve(7);
        assert_eq!(ids.next_id(), 44);
    }

    #[test]
    fn test_round_to_tenth() {
        assert_eq!(round_to_tenth(22.985), 23.0);
        assert_eq!(round_to_tenth(23.44), 23.4);
    }
}
