// crates/fc_foundation/src/field_value.rs

//! 场值类型
//!
//! 场与边界条件对值类型泛型化。`FieldValue` 抽象出标量、矢量、张量共有的
//! 分量访问与代数运算，使边界条件只需实现一次。
//!
//! - `f64`: 标量
//! - `glam::DVec3`: 矢量
//! - [`Tensor`]: 3x3 张量（行主序分量 xx xy xz yx yy yz zx zy zz）

use glam::{DMat3, DVec3};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// 场值类型
pub trait FieldValue:
    Copy
    + Debug
    + Default
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + Serialize
    + DeserializeOwned
    + 'static
{
    /// 分量个数
    const N_COMPONENTS: usize;
    /// 类型名（用于场类型名，如 `volScalarField`）
    const TYPE_NAME: &'static str;
    /// 分量名
    const COMPONENT_NAMES: &'static [&'static str];

    /// 零值
    fn zero() -> Self {
        Self::default()
    }

    /// 所有分量均为 `v`
    fn splat(v: f64) -> Self;

    /// 读取分量
    fn component(&self, d: usize) -> f64;

    /// 写入分量
    fn set_component(&mut self, d: usize, v: f64);

    /// 数乘
    fn scale(self, s: f64) -> Self;

    /// 模
    fn mag(&self) -> f64;

    /// 逐分量乘
    fn cmpt_multiply(self, other: Self) -> Self {
        let mut out = self;
        for d in 0..Self::N_COMPONENTS {
            out.set_component(d, self.component(d) * other.component(d));
        }
        out
    }

    /// 逐分量最小
    fn cmpt_min(self, other: Self) -> Self {
        let mut out = self;
        for d in 0..Self::N_COMPONENTS {
            out.set_component(d, self.component(d).min(other.component(d)));
        }
        out
    }

    /// 逐分量最大
    fn cmpt_max(self, other: Self) -> Self {
        let mut out = self;
        for d in 0..Self::N_COMPONENTS {
            out.set_component(d, self.component(d).max(other.component(d)));
        }
        out
    }

    /// 坐标变换（旋转）
    fn transform(&self, rotation: &DMat3) -> Self;

    /// 按分量名查找下标
    fn component_index(name: &str) -> Option<usize> {
        Self::COMPONENT_NAMES.iter().position(|n| *n == name)
    }
}

impl FieldValue for f64 {
    const N_COMPONENTS: usize = 1;
    const TYPE_NAME: &'static str = "scalar";
    const COMPONENT_NAMES: &'static [&'static str] = &["x"];

    fn splat(v: f64) -> Self {
        v
    }

    fn component(&self, _d: usize) -> f64 {
        *self
    }

    fn set_component(&mut self, _d: usize, v: f64) {
        *self = v;
    }

    fn scale(self, s: f64) -> Self {
        self * s
    }

    fn mag(&self) -> f64 {
        self.abs()
    }

    fn transform(&self, _rotation: &DMat3) -> Self {
        *self
    }
}

impl FieldValue for DVec3 {
    const N_COMPONENTS: usize = 3;
    const TYPE_NAME: &'static str = "vector";
    const COMPONENT_NAMES: &'static [&'static str] = &["x", "y", "z"];

    fn splat(v: f64) -> Self {
        DVec3::splat(v)
    }

    fn component(&self, d: usize) -> f64 {
        self[d]
    }

    fn set_component(&mut self, d: usize, v: f64) {
        self[d] = v;
    }

    fn scale(self, s: f64) -> Self {
        self * s
    }

    fn mag(&self) -> f64 {
        self.length()
    }

    fn transform(&self, rotation: &DMat3) -> Self {
        *rotation * *self
    }
}

/// 3x3 张量，行主序
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tensor(pub [f64; 9]);

impl Tensor {
    /// 零张量
    pub const ZERO: Tensor = Tensor([0.0; 9]);
    /// 单位张量
    pub const I: Tensor = Tensor([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);

    /// 由行构造
    pub fn from_rows(x: DVec3, y: DVec3, z: DVec3) -> Self {
        Tensor([x.x, x.y, x.z, y.x, y.y, y.z, z.x, z.y, z.z])
    }

    /// 并矢 a b
    pub fn outer(a: DVec3, b: DVec3) -> Self {
        Self::from_rows(b * a.x, b * a.y, b * a.z)
    }

    /// 转置
    pub fn transposed(&self) -> Self {
        let t = &self.0;
        Tensor([t[0], t[3], t[6], t[1], t[4], t[7], t[2], t[5], t[8]])
    }

    /// 迹
    pub fn trace(&self) -> f64 {
        self.0[0] + self.0[4] + self.0[8]
    }

    /// 转为 glam 矩阵（glam 为列主序）
    pub fn to_mat3(&self) -> DMat3 {
        DMat3::from_cols_array(&self.transposed().0)
    }

    /// 由 glam 矩阵构造
    pub fn from_mat3(m: &DMat3) -> Self {
        Tensor(m.to_cols_array()).transposed()
    }
}

impl Add for Tensor {
    type Output = Tensor;

    fn add(mut self, rhs: Tensor) -> Tensor {
        self += rhs;
        self
    }
}

impl Sub for Tensor {
    type Output = Tensor;

    fn sub(mut self, rhs: Tensor) -> Tensor {
        self -= rhs;
        self
    }
}

impl AddAssign for Tensor {
    fn add_assign(&mut self, rhs: Tensor) {
        self.0.iter_mut().zip(rhs.0.iter()).for_each(|(a, b)| *a += b);
    }
}

impl SubAssign for Tensor {
    fn sub_assign(&mut self, rhs: Tensor) {
        self.0.iter_mut().zip(rhs.0.iter()).for_each(|(a, b)| *a -= b);
    }
}

impl Neg for Tensor {
    type Output = Tensor;

    fn neg(self) -> Tensor {
        Tensor(self.0.map(|v| -v))
    }
}

impl Mul<f64> for Tensor {
    type Output = Tensor;

    fn mul(self, s: f64) -> Tensor {
        Tensor(self.0.map(|v| v * s))
    }
}

impl FieldValue for Tensor {
    const N_COMPONENTS: usize = 9;
    const TYPE_NAME: &'static str = "tensor";
    const COMPONENT_NAMES: &'static [&'static str] =
        &["xx", "xy", "xz", "yx", "yy", "yz", "zx", "zy", "zz"];

    fn splat(v: f64) -> Self {
        Tensor([v; 9])
    }

    fn component(&self, d: usize) -> f64 {
        self.0[d]
    }

    fn set_component(&mut self, d: usize, v: f64) {
        self.0[d] = v;
    }

    fn scale(self, s: f64) -> Self {
        self * s
    }

    fn mag(&self) -> f64 {
        self.0.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    fn transform(&self, rotation: &DMat3) -> Self {
        let m = *rotation * self.to_mat3() * rotation.transpose();
        Tensor::from_mat3(&m)
    }
}

/// 将类型名首字母大写，用于拼接场类型名（`vol` + `Scalar` + `Field`）
pub fn capitalised_type_name<T: FieldValue>() -> String {
    let mut chars = T::TYPE_NAME.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_components() {
        let mut s = 2.0_f64;
        assert_eq!(s.component(0), 2.0);
        s.set_component(0, 3.0);
        assert_eq!(s, 3.0);
        assert_eq!(<f64 as FieldValue>::N_COMPONENTS, 1);
    }

    #[test]
    fn test_vector_components() {
        let mut v = DVec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.component(1), 2.0);
        v.set_component(2, -1.0);
        assert_eq!(v, DVec3::new(1.0, 2.0, -1.0));
        assert_eq!(DVec3::component_index("z"), Some(2));
    }

    #[test]
    fn test_tensor_row_major() {
        let t = Tensor::from_rows(
            DVec3::new(1.0, 2.0, 3.0),
            DVec3::new(4.0, 5.0, 6.0),
            DVec3::new(7.0, 8.0, 9.0),
        );
        assert_eq!(t.component(Tensor::component_index("xy").unwrap()), 2.0);
        assert_eq!(t.component(Tensor::component_index("zx").unwrap()), 7.0);
        assert_eq!(t.trace(), 15.0);
        assert_eq!(Tensor::from_mat3(&t.to_mat3()), t);
    }

    #[test]
    fn test_tensor_transform_identity_invariant() {
        let rot = DMat3::from_rotation_z(0.3);
        let i = Tensor::I.transform(&rot);
        for d in 0..9 {
            assert!((i.component(d) - Tensor::I.component(d)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_vector_transform() {
        let rot = DMat3::from_rotation_z(std::f64::consts::FRAC_PI_2);
        let v = DVec3::X.transform(&rot);
        assert!((v - DVec3::Y).length() < 1e-12);
    }

    #[test]
    fn test_cmpt_ops() {
        let a = DVec3::new(1.0, -2.0, 3.0);
        let b = DVec3::new(2.0, 2.0, -1.0);
        assert_eq!(a.cmpt_min(b), DVec3::new(1.0, -2.0, -1.0));
        assert_eq!(a.cmpt_max(b), DVec3::new(2.0, 2.0, 3.0));
        assert_eq!(a.cmpt_multiply(b), DVec3::new(2.0, -4.0, -3.0));
    }

    #[test]
    fn test_capitalised_type_name() {
        assert_eq!(capitalised_type_name::<f64>(), "Scalar");
        assert_eq!(capitalised_type_name::<DVec3>(), "Vector");
        assert_eq!(capitalised_type_name::<Tensor>(), "Tensor");
    }
}
