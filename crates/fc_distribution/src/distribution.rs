// crates/fc_distribution/src/distribution.rs

//! 分布接口与运行时选择
//!
//! 分布由字典中的 `type` 选择。每个分布有两个尺寸指数：
//!
//! - `Q`：字典参数所定义的密度的原生加权（0 为按个数，3 为按体积/质量）
//! - `sampleQ`：调用方需要的采样加权
//!
//! 实际采样所用密度为原生密度乘以 `x^q` 后归一化，`q = sampleQ - Q`。
//! 按个数采样与按体积采样必须通过这一指数换算，不能混用。
//!
//! # 示例
//!
//! ```
//! use fc_config::Dictionary;
//! use fc_distribution::{new_distribution, RandomGenerator};
//!
//! let dict = Dictionary::from_json_str(
//!     "injector::sizeDistribution",
//!     r#"{"type": "uniform", "min": 1e-4, "max": 3e-4}"#,
//! ).unwrap();
//! let mut d = new_distribution(&dict, RandomGenerator::new(1), 0).unwrap();
//! assert!((d.mean() - 2e-4).abs() < 1e-16);
//! let x = d.sample();
//! assert!(x >= 1e-4 && x <= 3e-4);
//! ```

use std::fmt;

use tracing::debug;

use fc_config::Dictionary;
use fc_foundation::{FoamError, FoamResult};

use crate::continuous::Continuous;
use crate::densities::{Exponential, Lognormal, MassRosinRammler, Normal, RosinRammler, Uniform};
use crate::discrete::{FixedValue, MultiFixedValue};
use crate::random::RandomGenerator;
use crate::tabulated::{TabulatedCumulative, TabulatedDensity};

/// 可选择的分布类型名（有序）
pub const DISTRIBUTION_TYPES: &[&str] = &[
    "RosinRammler",
    "exponential",
    "fixedValue",
    "lognormal",
    "massRosinRammler",
    "multiFixedValue",
    "normal",
    "tabulatedCumulative",
    "tabulatedDensity",
    "uniform",
];

// ============================================================
// 分布接口
// ============================================================

/// 统计分布
pub trait Distribution: fmt::Debug {
    /// 类型名
    fn type_name(&self) -> &'static str;

    /// 原生尺寸指数 `Q`
    fn native_q(&self) -> i32;

    /// 采样尺寸指数 `sampleQ`
    fn sample_q(&self) -> i32;

    /// 有效重加权指数
    fn q(&self) -> i32 {
        self.sample_q() - self.native_q()
    }

    /// 最小值
    fn min(&self) -> f64;

    /// 最大值
    fn max(&self) -> f64;

    /// 采样密度下的均值
    fn mean(&self) -> f64;

    /// 随机数发生器
    fn random_mut(&mut self) -> &mut RandomGenerator;

    /// 抽取一个样本
    fn sample(&mut self) -> f64;

    /// 抽取 n 个样本
    fn sample_n(&mut self, n: usize) -> Vec<f64> {
        (0..n).map(|_| self.sample()).collect()
    }

    /// 开始一段采样，`repeat` 为真时重放上一段
    fn start(&mut self, repeat: bool) {
        self.random_mut().start(repeat);
    }

    /// 从最小值积分到各 `x` 的 `PDF·x^e`
    ///
    /// `consistent` 为真时不走解析捷径，所有调用使用同一数值积分，
    /// 不同 `x`/`e` 的结果可以相互组合（例如分段求和）而不产生舍入差异。
    fn integral_pdf_x_pow(&self, x: &[f64], e: i32, consistent: bool) -> Vec<f64>;

    /// 采样密度
    fn pdf(&self, x: &[f64]) -> Vec<f64>;

    /// 累积分布
    fn cdf(&self, x: &[f64]) -> Vec<f64> {
        self.integral_pdf_x_pow(x, 0, false)
    }

    /// 绘图用的 n 个等距点
    fn plot_x(&self, n: usize) -> Vec<f64> {
        linspace(self.min(), self.max(), n)
    }

    /// 以新的采样指数复制
    fn clone_with_sample_q(&self, sample_q: i32) -> FoamResult<Box<dyn Distribution>>;

    /// 写出为字典
    fn to_dictionary(&self) -> FoamResult<Dictionary>;
}

/// [a, b] 上的 n 个等距点（n < 2 时只含 a）
pub fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
    if n < 2 {
        return vec![a];
    }
    let h = (b - a) / (n - 1) as f64;
    let mut out: Vec<f64> = (0..n).map(|i| a + h * i as f64).collect();
    out[n - 1] = b;
    out
}

// ============================================================
// 运行时选择
// ============================================================

/// 按字典 `type` 构造分布
///
/// 未知类型立即报错，不做回退。
pub fn new_distribution(
    dict: &Dictionary,
    rnd: RandomGenerator,
    sample_q: i32,
) -> FoamResult<Box<dyn Distribution>> {
    let type_name = dict.type_name()?;
    debug!("选择分布 {} ({})", type_name, dict.scope());

    let d: Box<dyn Distribution> = match type_name.as_str() {
        "fixedValue" => Box::new(FixedValue::from_dictionary(dict, rnd, sample_q)?),
        "multiFixedValue" => Box::new(MultiFixedValue::from_dictionary(dict, rnd, sample_q)?),
        "uniform" => Box::new(Continuous::<Uniform>::from_dictionary(dict, rnd, sample_q)?),
        "normal" => Box::new(Continuous::<Normal>::from_dictionary(dict, rnd, sample_q)?),
        "lognormal" => Box::new(Continuous::<Lognormal>::from_dictionary(dict, rnd, sample_q)?),
        "RosinRammler" => {
            Box::new(Continuous::<RosinRammler>::from_dictionary(dict, rnd, sample_q)?)
        }
        "massRosinRammler" => {
            Box::new(Continuous::<MassRosinRammler>::from_dictionary(dict, rnd, sample_q)?)
        }
        "exponential" => {
            Box::new(Continuous::<Exponential>::from_dictionary(dict, rnd, sample_q)?)
        }
        "tabulatedDensity" => {
            Box::new(Continuous::<TabulatedDensity>::from_dictionary(dict, rnd, sample_q)?)
        }
        "tabulatedCumulative" => {
            Box::new(Continuous::<TabulatedCumulative>::from_dictionary(dict, rnd, sample_q)?)
        }
        other => {
            return Err(FoamError::unknown_type(
                "distribution",
                other,
                DISTRIBUTION_TYPES.iter().map(|s| s.to_string()).collect(),
            ))
        }
    };
    Ok(d)
}

/// 校验尺寸分布的取值范围
pub(crate) fn check_range(scope: &str, min: f64, max: f64) -> FoamResult<()> {
    if !(min.is_finite() && max.is_finite()) || min < 0.0 {
        return Err(FoamError::invalid_entry(
            scope,
            "min",
            format!("范围须为有限非负值, 实际 [{min}, {max}]"),
        ));
    }
    if min >= max {
        return Err(FoamError::invalid_entry(
            scope,
            "max",
            format!("最大值 {max} 须大于最小值 {min}"),
        ));
    }
    Ok(())
}

/// 校验负指数重加权的可行性
pub(crate) fn check_q(scope: &str, min: f64, q: i32) -> FoamResult<()> {
    if q < 0 && min <= 0.0 {
        return Err(FoamError::invalid_entry(
            scope,
            "Q",
            format!("重加权指数 q = {q} 为负时最小值须为正, 实际 {min}"),
        ));
    }
    Ok(())
}
