// crates/fc_foundation/src/dimension_set.rs

//! 量纲集合
//!
//! 七个基本量纲（质量、长度、时间、温度、物质的量、电流、发光强度）的指数向量。
//!
//! # 运算规则
//!
//! - `+`/`-`: 要求两侧量纲相等，结果为左侧量纲
//! - `*`/`/`: 指数逐项相加/相减
//! - 超越函数（`trans`）: 要求无量纲
//!
//! 指数比较带容差 [`SMALL_EXPONENT`]，以容纳 `sqrt`/`cbrt` 产生的分数指数。
//!
//! # 示例
//!
//! ```
//! use fc_foundation::dimension_set::{DimensionSet, DIM_LENGTH, DIM_TIME, DIM_VELOCITY};
//!
//! let u = DIM_LENGTH / DIM_TIME;
//! assert_eq!(u, DIM_VELOCITY);
//! assert_eq!(u.to_string(), "[0 1 -1 0 0 0 0]");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Div, Index, Mul};
use std::str::FromStr;

use crate::error::{fatal, FoamError, FoamResult};

/// 基本量纲个数
pub const N_DIMENSIONS: usize = 7;

/// 指数比较容差
pub const SMALL_EXPONENT: f64 = 1e-15;

/// 基本量纲下标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum DimensionType {
    /// 质量 kg
    Mass = 0,
    /// 长度 m
    Length = 1,
    /// 时间 s
    Time = 2,
    /// 温度 K
    Temperature = 3,
    /// 物质的量 mol
    Moles = 4,
    /// 电流 A
    Current = 5,
    /// 发光强度 cd
    LuminousIntensity = 6,
}

impl DimensionType {
    /// 全部量纲，按下标顺序
    pub const ALL: [DimensionType; N_DIMENSIONS] = [
        Self::Mass,
        Self::Length,
        Self::Time,
        Self::Temperature,
        Self::Moles,
        Self::Current,
        Self::LuminousIntensity,
    ];

    /// SI 单位符号
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Mass => "kg",
            Self::Length => "m",
            Self::Time => "s",
            Self::Temperature => "K",
            Self::Moles => "mol",
            Self::Current => "A",
            Self::LuminousIntensity => "cd",
        }
    }
}

/// 量纲集合
#[derive(Debug, Clone, Copy, Default)]
pub struct DimensionSet {
    exponents: [f64; N_DIMENSIONS],
}

impl DimensionSet {
    /// 由完整指数向量构造
    pub const fn new(exponents: [f64; N_DIMENSIONS]) -> Self {
        Self { exponents }
    }

    /// 由前五个量纲构造（电流、发光强度为零）
    pub const fn new5(mass: f64, length: f64, time: f64, temperature: f64, moles: f64) -> Self {
        Self::new([mass, length, time, temperature, moles, 0.0, 0.0])
    }

    /// 指数向量
    pub fn exponents(&self) -> &[f64; N_DIMENSIONS] {
        &self.exponents
    }

    /// 是否无量纲
    pub fn dimensionless(&self) -> bool {
        self.exponents.iter().all(|e| e.abs() < SMALL_EXPONENT)
    }

    /// 显式重置为另一量纲
    ///
    /// 这是构造之后修改量纲的唯一途径。
    pub fn reset(&mut self, other: &DimensionSet) {
        self.exponents = other.exponents;
    }

    /// 检查两个量纲是否一致，用于 `+`/`-`/赋值
    pub fn check_same(&self, other: &DimensionSet, operation: &str) -> FoamResult<()> {
        if self == other {
            Ok(())
        } else {
            Err(FoamError::dimension_mismatch(operation, self, other))
        }
    }

    /// 加法：要求量纲相等，返回左侧量纲
    pub fn checked_add(&self, other: &DimensionSet) -> FoamResult<DimensionSet> {
        self.check_same(other, "+")?;
        Ok(*self)
    }

    /// 减法：要求量纲相等，返回左侧量纲
    pub fn checked_sub(&self, other: &DimensionSet) -> FoamResult<DimensionSet> {
        self.check_same(other, "-")?;
        Ok(*self)
    }

    /// 幂
    pub fn pow(&self, p: f64) -> DimensionSet {
        let mut out = *self;
        out.exponents.iter_mut().for_each(|e| *e *= p);
        out
    }

    /// 平方
    pub fn sqr(&self) -> DimensionSet {
        self.pow(2.0)
    }

    /// 平方根
    pub fn sqrt(&self) -> DimensionSet {
        self.pow(0.5)
    }

    /// 立方根
    pub fn cbrt(&self) -> DimensionSet {
        self.pow(1.0 / 3.0)
    }

    /// 倒数
    pub fn inv(&self) -> DimensionSet {
        self.pow(-1.0)
    }

    /// 超越函数（exp、log、sin 等）的参数量纲检查
    pub fn trans(&self) -> FoamResult<DimensionSet> {
        if self.dimensionless() {
            Ok(*self)
        } else {
            Err(FoamError::dimension_mismatch("trans", self, DIMLESS))
        }
    }

    /// 单位文本，如 `kg m^-3`
    pub fn unit_string(&self) -> String {
        let parts: Vec<String> = DimensionType::ALL
            .iter()
            .filter(|d| self[**d].abs() >= SMALL_EXPONENT)
            .map(|d| {
                let e = self[*d];
                if (e - 1.0).abs() < SMALL_EXPONENT {
                    d.symbol().to_string()
                } else {
                    format!("{}^{}", d.symbol(), format_exponent(e))
                }
            })
            .collect();
        if parts.is_empty() {
            "-".into()
        } else {
            parts.join(" ")
        }
    }
}

fn format_exponent(e: f64) -> String {
    if (e - e.round()).abs() < SMALL_EXPONENT {
        format!("{}", e.round() as i64)
    } else {
        format!("{e}")
    }
}

impl PartialEq for DimensionSet {
    fn eq(&self, other: &Self) -> bool {
        self.exponents
            .iter()
            .zip(other.exponents.iter())
            .all(|(a, b)| (a - b).abs() <= SMALL_EXPONENT)
    }
}

impl Index<DimensionType> for DimensionSet {
    type Output = f64;

    fn index(&self, d: DimensionType) -> &f64 {
        &self.exponents[d as usize]
    }
}

impl Index<usize> for DimensionSet {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.exponents[i]
    }
}

impl Mul for DimensionSet {
    type Output = DimensionSet;

    fn mul(self, rhs: DimensionSet) -> DimensionSet {
        let mut out = self;
        for (a, b) in out.exponents.iter_mut().zip(rhs.exponents.iter()) {
            *a += b;
        }
        out
    }
}

impl Div for DimensionSet {
    type Output = DimensionSet;

    fn div(self, rhs: DimensionSet) -> DimensionSet {
        let mut out = self;
        for (a, b) in out.exponents.iter_mut().zip(rhs.exponents.iter()) {
            *a -= b;
        }
        out
    }
}

/// `+` 运算符：量纲不等时为致命错误
impl std::ops::Add for DimensionSet {
    type Output = DimensionSet;

    #[track_caller]
    fn add(self, rhs: DimensionSet) -> DimensionSet {
        self.checked_add(&rhs).unwrap_or_else(|e| fatal(e))
    }
}

/// `-` 运算符：量纲不等时为致命错误
impl std::ops::Sub for DimensionSet {
    type Output = DimensionSet;

    #[track_caller]
    fn sub(self, rhs: DimensionSet) -> DimensionSet {
        self.checked_sub(&rhs).unwrap_or_else(|e| fatal(e))
    }
}

impl fmt::Display for DimensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.exponents.iter().map(|e| format_exponent(*e)).collect();
        write!(f, "[{}]", parts.join(" "))
    }
}

impl TryFrom<&[f64]> for DimensionSet {
    type Error = FoamError;

    fn try_from(values: &[f64]) -> FoamResult<Self> {
        match values.len() {
            5 => Ok(Self::new5(values[0], values[1], values[2], values[3], values[4])),
            N_DIMENSIONS => {
                let mut exponents = [0.0; N_DIMENSIONS];
                exponents.copy_from_slice(values);
                Ok(Self::new(exponents))
            }
            n => Err(FoamError::parse(
                "dimensions",
                format!("需要 5 或 7 个指数, 实际 {n} 个"),
            )),
        }
    }
}

impl FromStr for DimensionSet {
    type Err = FoamError;

    fn from_str(s: &str) -> FoamResult<Self> {
        let inner = s
            .trim()
            .strip_prefix('[')
            .and_then(|t| t.strip_suffix(']'))
            .ok_or_else(|| FoamError::parse("dimensions", format!("缺少方括号: '{s}'")))?;
        let values = inner
            .split_whitespace()
            .map(|t| {
                t.parse::<f64>()
                    .map_err(|_| FoamError::parse("dimensions", format!("无效指数 '{t}'")))
            })
            .collect::<FoamResult<Vec<f64>>>()?;
        Self::try_from(values.as_slice())
    }
}

impl Serialize for DimensionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DimensionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            List(Vec<f64>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
            Repr::List(v) => DimensionSet::try_from(v.as_slice()).map_err(serde::de::Error::custom),
        }
    }
}

// ========================================================================
// 常用量纲
// ========================================================================

/// 无量纲
pub const DIMLESS: DimensionSet = DimensionSet::new([0.0; N_DIMENSIONS]);
/// 质量
pub const DIM_MASS: DimensionSet = DimensionSet::new5(1.0, 0.0, 0.0, 0.0, 0.0);
/// 长度
pub const DIM_LENGTH: DimensionSet = DimensionSet::new5(0.0, 1.0, 0.0, 0.0, 0.0);
/// 时间
pub const DIM_TIME: DimensionSet = DimensionSet::new5(0.0, 0.0, 1.0, 0.0, 0.0);
/// 温度
pub const DIM_TEMPERATURE: DimensionSet = DimensionSet::new5(0.0, 0.0, 0.0, 1.0, 0.0);
/// 物质的量
pub const DIM_MOLES: DimensionSet = DimensionSet::new5(0.0, 0.0, 0.0, 0.0, 1.0);
/// 电流
pub const DIM_CURRENT: DimensionSet = DimensionSet::new([0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
/// 发光强度
pub const DIM_LUMINOUS_INTENSITY: DimensionSet =
    DimensionSet::new([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);

/// 面积 m^2
pub const DIM_AREA: DimensionSet = DimensionSet::new5(0.0, 2.0, 0.0, 0.0, 0.0);
/// 体积 m^3
pub const DIM_VOLUME: DimensionSet = DimensionSet::new5(0.0, 3.0, 0.0, 0.0, 0.0);
/// 速率 s^-1
pub const DIM_RATE: DimensionSet = DimensionSet::new5(0.0, 0.0, -1.0, 0.0, 0.0);
/// 速度 m/s
pub const DIM_VELOCITY: DimensionSet = DimensionSet::new5(0.0, 1.0, -1.0, 0.0, 0.0);
/// 加速度 m/s^2
pub const DIM_ACCELERATION: DimensionSet = DimensionSet::new5(0.0, 1.0, -2.0, 0.0, 0.0);
/// 密度 kg/m^3
pub const DIM_DENSITY: DimensionSet = DimensionSet::new5(1.0, -3.0, 0.0, 0.0, 0.0);
/// 力 N
pub const DIM_FORCE: DimensionSet = DimensionSet::new5(1.0, 1.0, -2.0, 0.0, 0.0);
/// 压力 Pa
pub const DIM_PRESSURE: DimensionSet = DimensionSet::new5(1.0, -1.0, -2.0, 0.0, 0.0);
/// 运动压力 m^2/s^2
pub const DIM_KINEMATIC_PRESSURE: DimensionSet = DimensionSet::new5(0.0, 2.0, -2.0, 0.0, 0.0);
/// 能量 J
pub const DIM_ENERGY: DimensionSet = DimensionSet::new5(1.0, 2.0, -2.0, 0.0, 0.0);
/// 功率 W
pub const DIM_POWER: DimensionSet = DimensionSet::new5(1.0, 2.0, -3.0, 0.0, 0.0);
/// 运动粘度 m^2/s
pub const DIM_KINEMATIC_VISCOSITY: DimensionSet = DimensionSet::new5(0.0, 2.0, -1.0, 0.0, 0.0);
/// 动力粘度 Pa s
pub const DIM_DYNAMIC_VISCOSITY: DimensionSet = DimensionSet::new5(1.0, -1.0, -1.0, 0.0, 0.0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_adds_exponents() {
        let a = DIM_MASS / DIM_VOLUME;
        let b = DIM_VELOCITY;
        let c = a * b;
        for i in 0..N_DIMENSIONS {
            assert!((c[i] - (a[i] + b[i])).abs() < SMALL_EXPONENT);
        }
        assert_eq!(a, DIM_DENSITY);
    }

    #[test]
    fn test_add_requires_equal() {
        assert_eq!(DIM_PRESSURE.checked_add(&DIM_PRESSURE).unwrap(), DIM_PRESSURE);
        assert!(DIM_PRESSURE.checked_add(&DIM_VELOCITY).is_err());
        assert!(DIM_LENGTH.checked_sub(&DIM_TIME).is_err());
    }

    #[test]
    #[should_panic(expected = "量纲不一致")]
    fn test_add_operator_is_fatal() {
        let _ = DIM_LENGTH + DIM_TIME;
    }

    #[test]
    fn test_tolerance() {
        let a = DIM_AREA.sqrt();
        assert_eq!(a, DIM_LENGTH);
        let b = DimensionSet::new5(0.0, 1.0 + 1e-16, 0.0, 0.0, 0.0);
        assert_eq!(b, DIM_LENGTH);
        let c = DimensionSet::new5(0.0, 1.0 + 1e-12, 0.0, 0.0, 0.0);
        assert_ne!(c, DIM_LENGTH);
    }

    #[test]
    fn test_cbrt_of_volume() {
        assert_eq!(DIM_VOLUME.cbrt(), DIM_LENGTH);
        assert_eq!(DIM_RATE.inv(), DIM_TIME);
    }

    #[test]
    fn test_trans_requires_dimless() {
        assert!(DIMLESS.trans().is_ok());
        assert!(DIM_TEMPERATURE.trans().is_err());
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(DIM_PRESSURE.to_string(), "[1 -1 -2 0 0 0 0]");
        let parsed: DimensionSet = "[1 -1 -2 0 0]".parse().unwrap();
        assert_eq!(parsed, DIM_PRESSURE);
        assert!("1 -1 -2".parse::<DimensionSet>().is_err());
        assert!("[1 2 3]".parse::<DimensionSet>().is_err());
    }

    #[test]
    fn test_serde_forms() {
        let a: DimensionSet = serde_json::from_str("\"[0 2 -1 0 0 0 0]\"").unwrap();
        let b: DimensionSet = serde_json::from_str("[0, 2, -1, 0, 0]").unwrap();
        assert_eq!(a, DIM_KINEMATIC_VISCOSITY);
        assert_eq!(b, DIM_KINEMATIC_VISCOSITY);
        let text = serde_json::to_string(&DIM_DENSITY).unwrap();
        assert_eq!(text, "\"[1 -3 0 0 0 0 0]\"");
    }

    #[test]
    fn test_reset() {
        let mut d = DIM_LENGTH;
        d.reset(&DIM_TIME);
        assert_eq!(d, DIM_TIME);
    }

    #[test]
    fn test_unit_string() {
        assert_eq!(DIM_DENSITY.unit_string(), "kg m^-3");
        assert_eq!(DIMLESS.unit_string(), "-");
    }
}
