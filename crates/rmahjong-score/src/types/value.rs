//! 確定値（ConfirmedValue）
//!
//! 確定値はレートを掛けた精算用の値で、小数になりうる。
//! 取り消し（undo）で累計を厳密に元へ戻せるよう、内部では 1/1000 点単位の
//! 固定小数点整数として保持し、JSON には通常の数値として書き出す。

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// 確定値（1/1000 点単位の固定小数点）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct ConfirmedValue(i64);

impl ConfirmedValue {
    /// ゼロ
    pub const ZERO: ConfirmedValue = ConfirmedValue(0);

    /// 1点あたりの内部単位数
    pub const SCALE: i64 = 1000;

    /// 内部単位の生値から生成
    #[inline]
    pub const fn from_raw(raw: i64) -> ConfirmedValue {
        ConfirmedValue(raw)
    }

    /// 実数値から生成する（1/1000 点未満は四捨五入）
    #[inline]
    pub fn from_f64(v: f64) -> ConfirmedValue {
        ConfirmedValue((v * Self::SCALE as f64).round() as i64)
    }

    /// 実数値として取得
    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / Self::SCALE as f64
    }

    /// 生の値を取得
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::Neg for ConfirmedValue {
    type Output = ConfirmedValue;

    #[inline]
    fn neg(self) -> ConfirmedValue {
        ConfirmedValue(-self.0)
    }
}

impl std::ops::Add for ConfirmedValue {
    type Output = ConfirmedValue;

    #[inline]
    fn add(self, rhs: ConfirmedValue) -> ConfirmedValue {
        ConfirmedValue(self.0 + rhs.0)
    }
}

impl std::ops::Sub for ConfirmedValue {
    type Output = ConfirmedValue;

    #[inline]
    fn sub(self, rhs: ConfirmedValue) -> ConfirmedValue {
        ConfirmedValue(self.0 - rhs.0)
    }
}

impl std::ops::AddAssign for ConfirmedValue {
    #[inline]
    fn add_assign(&mut self, rhs: ConfirmedValue) {
        self.0 += rhs.0;
    }
}

impl std::ops::SubAssign for ConfirmedValue {
    #[inline]
    fn sub_assign(&mut self, rhs: ConfirmedValue) {
        self.0 -= rhs.0;
    }
}

impl std::iter::Sum for ConfirmedValue {
    fn sum<I: Iterator<Item = ConfirmedValue>>(iter: I) -> ConfirmedValue {
        iter.fold(ConfirmedValue::ZERO, |acc, v| acc + v)
    }
}

impl fmt::Display for ConfirmedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+.1}", self.as_f64())
    }
}

impl Serialize for ConfirmedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for ConfirmedValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = f64::deserialize(deserializer)?;
        if !v.is_finite() {
            return Err(serde::de::Error::custom("confirmed value must be finite"));
        }
        Ok(ConfirmedValue::from_f64(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_f64_rounds_to_thousandths() {
        assert_eq!(ConfirmedValue::from_f64(1700.0).raw(), 1_700_000);
        assert_eq!(ConfirmedValue::from_f64(-0.0004).raw(), 0);
        assert_eq!(ConfirmedValue::from_f64(0.0005).raw(), 1);
        assert_eq!(ConfirmedValue::from_f64(-1900.25).as_f64(), -1900.25);
    }

    #[test]
    fn test_add_then_sub_is_exact() {
        let base = ConfirmedValue::from_f64(0.1);
        let delta = ConfirmedValue::from_f64(0.2);
        let mut acc = base;
        acc += delta;
        acc -= delta;
        assert_eq!(acc, base);
    }

    #[test]
    fn test_json_roundtrip_keeps_raw_value() {
        let v = ConfirmedValue::from_f64(-633.333);
        let s = serde_json::to_string(&v).unwrap();
        assert_eq!(s, "-633.333");
        let back: ConfirmedValue = serde_json::from_str(&s).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn test_display_has_sign() {
        assert_eq!(ConfirmedValue::from_f64(5700.0).to_string(), "+5700.0");
        assert_eq!(ConfirmedValue::from_f64(-600.0).to_string(), "-600.0");
    }
}
