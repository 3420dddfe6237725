// crates/fc_distribution/src/densities.rs

//! 参数化密度
//!
//! | 类型 | 参数 | 解析捷径 |
//! |------|------|----------|
//! | `uniform` | `min`, `max` | 任意 q 的采样、积分、均值 |
//! | `normal` | `min`, `max`, `mu`, `sigma` | 无（截断，数值表） |
//! | `lognormal` | `min`, `max`, `mu`, `sigma` | 无（截断，数值表） |
//! | `RosinRammler` | `min`, `max`, `d`, `n` | q = 0 的采样与 CDF |
//! | `massRosinRammler` | 同上，原生 Q = 3 | q = 0 的采样与 CDF |
//! | `exponential` | `min`, `max`, `lambda` | q = 0 的采样、CDF、均值 |

use fc_config::Dictionary;
use fc_foundation::{FoamError, FoamResult};

use crate::continuous::{pow_integral, Density};

/// 读取正参数
fn positive(dict: &Dictionary, key: &str) -> FoamResult<f64> {
    let v: f64 = dict.lookup(key)?;
    if !(v > 0.0 && v.is_finite()) {
        return Err(FoamError::invalid_entry(
            dict.scope(),
            key,
            format!("须为正数, 实际 {v}"),
        ));
    }
    Ok(v)
}

fn bounds(dict: &Dictionary) -> FoamResult<(f64, f64)> {
    Ok((dict.lookup("min")?, dict.lookup("max")?))
}

fn write_bounds(dict: &mut Dictionary, min: f64, max: f64) -> FoamResult<()> {
    dict.set("min", min)?;
    dict.set("max", max)?;
    Ok(())
}

// ============================================================
// uniform
// ============================================================

/// 均匀分布
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform {
    /// 最小值
    pub min: f64,
    /// 最大值
    pub max: f64,
}

impl Density for Uniform {
    const TYPE_NAME: &'static str = "uniform";

    fn from_dictionary(dict: &Dictionary) -> FoamResult<Self> {
        let (min, max) = bounds(dict)?;
        Ok(Self { min, max })
    }

    fn write(&self, dict: &mut Dictionary) -> FoamResult<()> {
        write_bounds(dict, self.min, self.max)
    }

    fn min(&self) -> f64 {
        self.min
    }

    fn max(&self) -> f64 {
        self.max
    }

    fn raw_pdf(&self, _x: f64) -> f64 {
        1.0
    }

    fn analytic_sample(&self, u: f64, q: i32) -> Option<f64> {
        let (a, b) = (self.min, self.max);
        Some(match q {
            0 => a + (b - a) * u,
            -1 => a * (b / a).powf(u),
            _ => {
                let p = (q + 1) as f64;
                (a.powf(p) + u * (b.powf(p) - a.powf(p))).powf(1.0 / p)
            }
        })
    }

    fn analytic_integral(&self, x: f64, e: i32, q: i32) -> Option<f64> {
        if self.min <= 0.0 && q + e < 0 {
            return None;
        }
        Some(pow_integral(self.min, x, q + e) / pow_integral(self.min, self.max, q))
    }

    fn analytic_mean(&self, q: i32) -> Option<f64> {
        if q == 0 {
            return Some(0.5 * (self.min + self.max));
        }
        Some(pow_integral(self.min, self.max, q + 1) / pow_integral(self.min, self.max, q))
    }
}

// ============================================================
// normal
// ============================================================

/// 截断正态分布
#[derive(Debug, Clone, PartialEq)]
pub struct Normal {
    /// 最小值
    pub min: f64,
    /// 最大值
    pub max: f64,
    /// 未截断分布的均值
    pub mu: f64,
    /// 未截断分布的标准差
    pub sigma: f64,
}

impl Density for Normal {
    const TYPE_NAME: &'static str = "normal";

    fn from_dictionary(dict: &Dictionary) -> FoamResult<Self> {
        let (min, max) = bounds(dict)?;
        Ok(Self {
            min,
            max,
            mu: dict.lookup("mu")?,
            sigma: positive(dict, "sigma")?,
        })
    }

    fn write(&self, dict: &mut Dictionary) -> FoamResult<()> {
        write_bounds(dict, self.min, self.max)?;
        dict.set("mu", self.mu)?;
        dict.set("sigma", self.sigma)?;
        Ok(())
    }

    fn min(&self) -> f64 {
        self.min
    }

    fn max(&self) -> f64 {
        self.max
    }

    fn raw_pdf(&self, x: f64) -> f64 {
        let z = (x - self.mu) / self.sigma;
        (-0.5 * z * z).exp()
    }
}

// ============================================================
// lognormal
// ============================================================

/// 截断对数正态分布
///
/// `mu`、`sigma` 是 x 本身（未截断时）的均值与标准差，内部换算为 ln x 的参数。
#[derive(Debug, Clone, PartialEq)]
pub struct Lognormal {
    /// 最小值
    pub min: f64,
    /// 最大值
    pub max: f64,
    /// x 的均值
    pub mu: f64,
    /// x 的标准差
    pub sigma: f64,
}

impl Lognormal {
    /// ln x 的均值与标准差
    fn log_params(&self) -> (f64, f64) {
        let s2 = (1.0 + (self.sigma / self.mu).powi(2)).ln();
        (self.mu.ln() - 0.5 * s2, s2.sqrt())
    }
}

impl Density for Lognormal {
    const TYPE_NAME: &'static str = "lognormal";

    fn from_dictionary(dict: &Dictionary) -> FoamResult<Self> {
        let (min, max) = bounds(dict)?;
        Ok(Self {
            min,
            max,
            mu: positive(dict, "mu")?,
            sigma: positive(dict, "sigma")?,
        })
    }

    fn write(&self, dict: &mut Dictionary) -> FoamResult<()> {
        write_bounds(dict, self.min, self.max)?;
        dict.set("mu", self.mu)?;
        dict.set("sigma", self.sigma)?;
        Ok(())
    }

    fn min(&self) -> f64 {
        self.min
    }

    fn max(&self) -> f64 {
        self.max
    }

    fn raw_pdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        let (m, s) = self.log_params();
        let z = (x.ln() - m) / s;
        (-0.5 * z * z).exp() / x
    }
}

// ============================================================
// Rosin-Rammler
// ============================================================

/// 截断 Rosin-Rammler（Weibull）分布
#[derive(Debug, Clone, PartialEq)]
pub struct RosinRammler {
    /// 最小值
    pub min: f64,
    /// 最大值
    pub max: f64,
    /// 特征尺寸
    pub d: f64,
    /// 分布指数
    pub n: f64,
}

impl RosinRammler {
    /// 未截断累积分布
    fn phi(&self, x: f64) -> f64 {
        1.0 - (-(x / self.d).powf(self.n)).exp()
    }

    fn read(dict: &Dictionary) -> FoamResult<Self> {
        let (min, max) = bounds(dict)?;
        Ok(Self {
            min,
            max,
            d: positive(dict, "d")?,
            n: positive(dict, "n")?,
        })
    }

    fn write_params(&self, dict: &mut Dictionary) -> FoamResult<()> {
        write_bounds(dict, self.min, self.max)?;
        dict.set("d", self.d)?;
        dict.set("n", self.n)?;
        Ok(())
    }

    fn density(&self, x: f64) -> f64 {
        if x <= 0.0 && self.n < 1.0 {
            return 0.0;
        }
        let r = x / self.d;
        self.n / self.d * r.powf(self.n - 1.0) * (-r.powf(self.n)).exp()
    }

    fn sample_native(&self, u: f64) -> f64 {
        let (pa, pb) = (self.phi(self.min), self.phi(self.max));
        let p = pa + u * (pb - pa);
        self.d * (-(1.0 - p).ln()).powf(1.0 / self.n)
    }

    fn cdf_native(&self, x: f64) -> f64 {
        let (pa, pb) = (self.phi(self.min), self.phi(self.max));
        (self.phi(x) - pa) / (pb - pa)
    }
}

impl Density for RosinRammler {
    const TYPE_NAME: &'static str = "RosinRammler";

    fn from_dictionary(dict: &Dictionary) -> FoamResult<Self> {
        Self::read(dict)
    }

    fn write(&self, dict: &mut Dictionary) -> FoamResult<()> {
        self.write_params(dict)
    }

    fn min(&self) -> f64 {
        self.min
    }

    fn max(&self) -> f64 {
        self.max
    }

    fn raw_pdf(&self, x: f64) -> f64 {
        self.density(x)
    }

    fn analytic_sample(&self, u: f64, q: i32) -> Option<f64> {
        (q == 0).then(|| self.sample_native(u))
    }

    fn analytic_integral(&self, x: f64, e: i32, q: i32) -> Option<f64> {
        (q == 0 && e == 0).then(|| self.cdf_native(x))
    }
}

/// 质量加权的 Rosin-Rammler 分布
///
/// 参数描述的是质量（体积）分布，原生指数 Q = 3。按个数采样时 q = -3。
#[derive(Debug, Clone, PartialEq)]
pub struct MassRosinRammler(pub RosinRammler);

impl Density for MassRosinRammler {
    const TYPE_NAME: &'static str = "massRosinRammler";
    const DEFAULT_Q: i32 = 3;

    fn from_dictionary(dict: &Dictionary) -> FoamResult<Self> {
        RosinRammler::read(dict).map(Self)
    }

    fn write(&self, dict: &mut Dictionary) -> FoamResult<()> {
        self.0.write_params(dict)
    }

    fn min(&self) -> f64 {
        self.0.min
    }

    fn max(&self) -> f64 {
        self.0.max
    }

    fn raw_pdf(&self, x: f64) -> f64 {
        self.0.density(x)
    }

    fn analytic_sample(&self, u: f64, q: i32) -> Option<f64> {
        (q == 0).then(|| self.0.sample_native(u))
    }

    fn analytic_integral(&self, x: f64, e: i32, q: i32) -> Option<f64> {
        (q == 0 && e == 0).then(|| self.0.cdf_native(x))
    }
}

// ============================================================
// exponential
// ============================================================

/// 截断指数分布
#[derive(Debug, Clone, PartialEq)]
pub struct Exponential {
    /// 最小值
    pub min: f64,
    /// 最大值
    pub max: f64,
    /// 衰减率
    pub lambda: f64,
}

impl Exponential {
    fn tail(&self, x: f64) -> f64 {
        (-self.lambda * x).exp()
    }
}

impl Density for Exponential {
    const TYPE_NAME: &'static str = "exponential";

    fn from_dictionary(dict: &Dictionary) -> FoamResult<Self> {
        let (min, max) = bounds(dict)?;
        Ok(Self {
            min,
            max,
            lambda: positive(dict, "lambda")?,
        })
    }

    fn write(&self, dict: &mut Dictionary) -> FoamResult<()> {
        write_bounds(dict, self.min, self.max)?;
        dict.set("lambda", self.lambda)?;
        Ok(())
    }

    fn min(&self) -> f64 {
        self.min
    }

    fn max(&self) -> f64 {
        self.max
    }

    fn raw_pdf(&self, x: f64) -> f64 {
        self.tail(x)
    }

    fn analytic_sample(&self, u: f64, q: i32) -> Option<f64> {
        if q != 0 {
            return None;
        }
        let (ta, tb) = (self.tail(self.min), self.tail(self.max));
        Some(-(ta - u * (ta - tb)).ln() / self.lambda)
    }

    fn analytic_integral(&self, x: f64, e: i32, q: i32) -> Option<f64> {
        if q != 0 || e != 0 {
            return None;
        }
        let (ta, tb) = (self.tail(self.min), self.tail(self.max));
        Some((ta - self.tail(x)) / (ta - tb))
    }

    fn analytic_mean(&self, q: i32) -> Option<f64> {
        if q != 0 {
            return None;
        }
        let l = self.lambda;
        // ∫ x e^{-λx} dx = -(x/λ + 1/λ²) e^{-λx}
        let g = |x: f64| -(x / l + 1.0 / (l * l)) * self.tail(x);
        let norm = (self.tail(self.min) - self.tail(self.max)) / l;
        Some((g(self.max) - g(self.min)) / norm)
    }
}
