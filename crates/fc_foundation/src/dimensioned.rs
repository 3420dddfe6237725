// crates/fc_foundation/src/dimensioned.rs

//! 带量纲的量
//!
//! `Dimensioned<T>` 是 (名称, 量纲, 值) 三元组。两个带量纲量之间的运算
//! 与 [`DimensionSet`] 的运算规则完全一致：加减要求量纲相等，乘除合并指数。
//!
//! `checked_*` 方法返回 `FoamResult`；运算符重载在量纲不一致时走致命错误路径。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::dimension_set::{DimensionSet, DIMLESS};
use crate::error::{fatal, FoamResult};
use crate::field_value::FieldValue;

/// 带量纲的量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensioned<T> {
    /// 名称
    #[serde(default)]
    pub name: String,
    /// 量纲
    pub dimensions: DimensionSet,
    /// 值
    pub value: T,
}

/// 带量纲标量
pub type DimensionedScalar = Dimensioned<f64>;

impl<T: FieldValue> Dimensioned<T> {
    /// 构造
    pub fn new(name: impl Into<String>, dimensions: DimensionSet, value: T) -> Self {
        Self {
            name: name.into(),
            dimensions,
            value,
        }
    }

    /// 无量纲量
    pub fn dimless(name: impl Into<String>, value: T) -> Self {
        Self::new(name, DIMLESS, value)
    }

    /// 量纲
    pub fn dimensions(&self) -> &DimensionSet {
        &self.dimensions
    }

    /// 值
    pub fn value(&self) -> T {
        self.value
    }

    /// 加法（检查量纲）
    pub fn checked_add(&self, other: &Self) -> FoamResult<Self> {
        let dims = self.dimensions.checked_add(&other.dimensions)?;
        Ok(Self::new(
            format!("({}+{})", self.name, other.name),
            dims,
            self.value + other.value,
        ))
    }

    /// 减法（检查量纲）
    pub fn checked_sub(&self, other: &Self) -> FoamResult<Self> {
        let dims = self.dimensions.checked_sub(&other.dimensions)?;
        Ok(Self::new(
            format!("({}-{})", self.name, other.name),
            dims,
            self.value - other.value,
        ))
    }

    /// 赋值（检查量纲）
    pub fn assign(&mut self, other: &Self) -> FoamResult<()> {
        self.dimensions.check_same(&other.dimensions, "=")?;
        self.value = other.value;
        Ok(())
    }

    /// 取分量
    pub fn component(&self, d: usize) -> DimensionedScalar {
        Dimensioned::new(
            format!("{}.component({})", self.name, d),
            self.dimensions,
            self.value.component(d),
        )
    }

    /// 替换分量
    pub fn replace(&mut self, d: usize, sc: &DimensionedScalar) -> FoamResult<()> {
        self.dimensions.check_same(&sc.dimensions, "replace")?;
        self.value.set_component(d, sc.value);
        Ok(())
    }

    /// 模
    pub fn mag(&self) -> DimensionedScalar {
        Dimensioned::new(format!("mag({})", self.name), self.dimensions, self.value.mag())
    }

    /// 乘以带量纲标量
    pub fn scaled(&self, s: &DimensionedScalar) -> Self {
        Self::new(
            format!("({}*{})", self.name, s.name),
            self.dimensions * s.dimensions,
            self.value.scale(s.value),
        )
    }
}

impl DimensionedScalar {
    /// 幂
    pub fn pow(&self, p: f64) -> Self {
        Self::new(
            format!("pow({},{})", self.name, p),
            self.dimensions.pow(p),
            self.value.powf(p),
        )
    }

    /// 平方根
    pub fn sqrt(&self) -> Self {
        Self::new(
            format!("sqrt({})", self.name),
            self.dimensions.sqrt(),
            self.value.sqrt(),
        )
    }

    /// 指数函数，要求无量纲
    pub fn exp(&self) -> FoamResult<Self> {
        let dims = self.dimensions.trans()?;
        Ok(Self::new(format!("exp({})", self.name), dims, self.value.exp()))
    }

    /// 自然对数，要求无量纲
    pub fn ln(&self) -> FoamResult<Self> {
        let dims = self.dimensions.trans()?;
        Ok(Self::new(format!("log({})", self.name), dims, self.value.ln()))
    }
}

impl<T: FieldValue> fmt::Display for Dimensioned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.name, self.dimensions, self.value)
    }
}

impl<T: FieldValue> Add for Dimensioned<T> {
    type Output = Dimensioned<T>;

    #[track_caller]
    fn add(self, rhs: Self) -> Self {
        self.checked_add(&rhs).unwrap_or_else(|e| fatal(e))
    }
}

impl<T: FieldValue> Sub for Dimensioned<T> {
    type Output = Dimensioned<T>;

    #[track_caller]
    fn sub(self, rhs: Self) -> Self {
        self.checked_sub(&rhs).unwrap_or_else(|e| fatal(e))
    }
}

impl<T: FieldValue> Neg for Dimensioned<T> {
    type Output = Dimensioned<T>;

    fn neg(self) -> Self {
        Self::new(format!("-{}", self.name), self.dimensions, -self.value)
    }
}

impl<T: FieldValue> Mul<DimensionedScalar> for Dimensioned<T> {
    type Output = Dimensioned<T>;

    fn mul(self, rhs: DimensionedScalar) -> Self {
        self.scaled(&rhs)
    }
}

impl Div for DimensionedScalar {
    type Output = DimensionedScalar;

    fn div(self, rhs: DimensionedScalar) -> DimensionedScalar {
        Self::new(
            format!("({}|{})", self.name, rhs.name),
            self.dimensions / rhs.dimensions,
            self.value / rhs.value,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension_set::{DIM_DENSITY, DIM_LENGTH, DIM_MASS, DIM_VELOCITY, DIM_VOLUME};
    use glam::DVec3;

    #[test]
    fn test_add_same_dimensions() {
        let a = Dimensioned::new("a", DIM_LENGTH, 1.0);
        let b = Dimensioned::new("b", DIM_LENGTH, 2.5);
        let c = a + b;
        assert_eq!(c.value, 3.5);
        assert_eq!(c.dimensions, DIM_LENGTH);
        assert_eq!(c.name, "(a+b)");
    }

    #[test]
    fn test_checked_add_mismatch() {
        let a = Dimensioned::new("a", DIM_LENGTH, 1.0);
        let b = Dimensioned::new("b", DIM_MASS, 1.0);
        assert!(a.checked_add(&b).is_err());
        assert!(a.checked_sub(&b).is_err());
    }

    #[test]
    #[should_panic(expected = "FOAM FATAL ERROR")]
    fn test_operator_mismatch_is_fatal() {
        let a = Dimensioned::new("a", DIM_LENGTH, 1.0);
        let b = Dimensioned::new("b", DIM_MASS, 1.0);
        let _ = a - b;
    }

    #[test]
    fn test_mul_div_propagate() {
        let m = Dimensioned::new("m", DIM_MASS, 2.0);
        let v = Dimensioned::new("V", DIM_VOLUME, 4.0);
        let rho = m / v;
        assert_eq!(rho.dimensions, DIM_DENSITY);
        assert_eq!(rho.value, 0.5);

        let u = Dimensioned::new("U", DIM_VELOCITY, DVec3::new(1.0, 0.0, 0.0));
        let flux = u * rho;
        assert_eq!(flux.dimensions, DIM_VELOCITY * DIM_DENSITY);
        assert_eq!(flux.value, DVec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_component_keeps_dimensions() {
        let u = Dimensioned::new("U", DIM_VELOCITY, DVec3::new(1.0, 2.0, 3.0));
        let uy = u.component(1);
        assert_eq!(uy.value, 2.0);
        assert_eq!(uy.dimensions, DIM_VELOCITY);
        assert!((u.mag().value - 14.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_exp_requires_dimless() {
        let x = Dimensioned::dimless("x", 0.0);
        assert_eq!(x.exp().unwrap().value, 1.0);
        let l = Dimensioned::new("L", DIM_LENGTH, 1.0);
        assert!(l.ln().is_err());
    }

    #[test]
    fn test_from_json() {
        let rho: DimensionedScalar =
            serde_json::from_str(r#"{"dimensions": "[1 -3 0 0 0]", "value": 1.2}"#).unwrap();
        assert_eq!(rho.dimensions, DIM_DENSITY);
        assert_eq!(rho.value, 1.2);
    }
}
