//! 通用工具函数

use chrono::{DateTime, Local};

/// 页面上"最后更新"时间的显示格式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// 日期显示格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 四舍五入到两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 检查数值是否恰好为两位小数
pub fn is_rounded2(value: f64) -> bool {
    (round2(value) - value).abs() < 1e-9
}

/// 格式化"最后更新"时间戳
pub fn format_timestamp(at: &DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// 格式化百分比（0.93 -> "93%"）
pub fn format_percent(ratio: f64) -> String {
    format!("{:.0}%", ratio * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.756), 0.76);
        assert_eq!(round2(0.754), 0.75);
        assert_eq!(round2(0.9), 0.9);
        assert!(is_rounded2(round2(0.123456)));
        assert!(!is_rounded2(0.123));
    }

    #[test]
    fn test_format_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 42).unwrap();
        assert_eq!(format_timestamp(&at), "2024-03-07 09:05");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.93), "93%");
        assert_eq!(format_percent(1.0), "100%");
    }
}
