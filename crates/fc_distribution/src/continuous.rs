// crates/fc_distribution/src/continuous.rs

//! 连续分布的通用实现
//!
//! 具体分布只需给出未归一化的原生密度 [`Density::raw_pdf`]，以及可选的解析捷径。
//! [`Continuous`] 在 `[min, max]` 上建立固定的数值表：
//!
//! - 节点为等距点并入密度的间断点
//! - 被积函数 `raw_pdf(x)·x^q` 用梯形法累积，按总积分归一化，表尾累积值恰为 1
//! - 采样在同一张表上做逆 CDF（线性密度的分段二次求解）
//!
//! `consistent = true` 时所有积分都走数值表，解析捷径只在 `consistent = false` 时使用。

use std::fmt;

use fc_config::Dictionary;
use fc_foundation::{FoamError, FoamResult};

use crate::distribution::{check_q, check_range, Distribution};
use crate::random::RandomGenerator;

/// 数值表的等距区间数
pub const N_TABLE_INTERVALS: usize = 1000;

// ============================================================
// 密度接口
// ============================================================

/// 连续分布的原生密度
pub trait Density: Clone + fmt::Debug + 'static {
    /// 类型名
    const TYPE_NAME: &'static str;

    /// 字典未给出 `Q` 时的原生尺寸指数
    const DEFAULT_Q: i32 = 0;

    /// 从字典读取参数
    fn from_dictionary(dict: &Dictionary) -> FoamResult<Self>;

    /// 写出参数
    fn write(&self, dict: &mut Dictionary) -> FoamResult<()>;

    /// 最小值
    fn min(&self) -> f64;

    /// 最大值
    fn max(&self) -> f64;

    /// 未归一化的原生密度，`[min, max]` 内非负
    fn raw_pdf(&self, x: f64) -> f64;

    /// 密度的间断点，并入数值表节点
    fn breakpoints(&self) -> Vec<f64> {
        Vec::new()
    }

    /// 解析逆 CDF：`u ∈ [0, 1)` 对应的样本
    fn analytic_sample(&self, _u: f64, _q: i32) -> Option<f64> {
        None
    }

    /// 解析积分：归一化后 `∫_min^x PDF·ξ^e dξ`
    fn analytic_integral(&self, _x: f64, _e: i32, _q: i32) -> Option<f64> {
        None
    }

    /// 解析均值
    fn analytic_mean(&self, _q: i32) -> Option<f64> {
        None
    }
}

// ============================================================
// 数值表
// ============================================================

/// `raw_pdf·x^q` 在固定节点上的梯形累积
#[derive(Debug, Clone)]
pub(crate) struct NumericTable {
    x: Vec<f64>,
    f: Vec<f64>,
    cumulative: Vec<f64>,
    total: f64,
}

impl NumericTable {
    pub(crate) fn build<D: Density>(density: &D, q: i32, scope: &str) -> FoamResult<Self> {
        let (min, max) = (density.min(), density.max());
        let span = max - min;

        let mut x = crate::distribution::linspace(min, max, N_TABLE_INTERVALS + 1);
        x.extend(
            density
                .breakpoints()
                .into_iter()
                .filter(|b| *b > min && *b < max),
        );
        x.sort_by(|a, b| a.total_cmp(b));
        x.dedup_by(|a, b| (*a - *b).abs() <= 1e-12 * span);

        let f: Vec<f64> = x.iter().map(|&xi| density.raw_pdf(xi) * xi.powi(q)).collect();
        if f.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(FoamError::invalid_entry(
                scope,
                "distribution",
                "密度须为有限非负值",
            ));
        }

        let cumulative = cumulative_trapezoid(&x, &f);
        let total = cumulative.last().copied().unwrap_or(0.0);
        if total <= 0.0 {
            return Err(FoamError::invalid_entry(
                scope,
                "distribution",
                format!("[{min}, {max}] 上的密度积分为零 (q = {q})"),
            ));
        }

        Ok(Self {
            x,
            f,
            cumulative,
            total,
        })
    }

    /// 所在区间下标
    fn interval(&self, x: f64) -> usize {
        let n = self.x.len();
        self.x.partition_point(|v| *v <= x).clamp(1, n - 1) - 1
    }

    /// 归一化后的 `∫_min^x f·ξ^e`
    pub(crate) fn integrals(&self, xs: &[f64], e: i32) -> Vec<f64> {
        let f: Vec<f64>;
        let cumulative: Vec<f64>;
        let (f_ref, cum_ref) = if e == 0 {
            (&self.f, &self.cumulative)
        } else {
            f = self
                .x
                .iter()
                .zip(&self.f)
                .map(|(x, v)| v * x.powi(e))
                .collect();
            cumulative = cumulative_trapezoid(&self.x, &f);
            (&f, &cumulative)
        };

        let first = self.x[0];
        let last = self.x[self.x.len() - 1];
        xs.iter()
            .map(|&xi| {
                if xi <= first {
                    return 0.0;
                }
                if xi >= last {
                    return cum_ref[cum_ref.len() - 1] / self.total;
                }
                let j = self.interval(xi);
                let t = (xi - self.x[j]) / (self.x[j + 1] - self.x[j]);
                let fx = f_ref[j] + (f_ref[j + 1] - f_ref[j]) * t;
                (cum_ref[j] + 0.5 * (xi - self.x[j]) * (f_ref[j] + fx)) / self.total
            })
            .collect()
    }

    /// 逆 CDF
    pub(crate) fn invert(&self, u: f64) -> f64 {
        let target = u.clamp(0.0, 1.0) * self.total;
        let n = self.x.len();
        let j = self
            .cumulative
            .partition_point(|c| *c <= target)
            .clamp(1, n - 1)
            - 1;

        let h = self.x[j + 1] - self.x[j];
        let r = target - self.cumulative[j];
        let fj = self.f[j];
        let slope = (self.f[j + 1] - fj) / h;
        // fj·d + slope·d²/2 = r
        let denom = fj + (fj * fj + 2.0 * slope * r).max(0.0).sqrt();
        let d = if denom > 0.0 { 2.0 * r / denom } else { 0.0 };
        self.x[j] + d.clamp(0.0, h)
    }

    pub(crate) fn mean(&self) -> f64 {
        let last = self.x[self.x.len() - 1];
        self.integrals(&[last], 1)[0]
    }
}

fn cumulative_trapezoid(x: &[f64], f: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(x.len());
    let mut acc = 0.0;
    out.push(acc);
    for i in 1..x.len() {
        acc += 0.5 * (x[i] - x[i - 1]) * (f[i] + f[i - 1]);
        out.push(acc);
    }
    out
}

/// `∫_a^b x^p dx`
pub(crate) fn pow_integral(a: f64, b: f64, p: i32) -> f64 {
    if p == -1 {
        (b / a).ln()
    } else {
        let p1 = p + 1;
        (b.powi(p1) - a.powi(p1)) / p1 as f64
    }
}

// ============================================================
// 通用连续分布
// ============================================================

/// 由密度定义的连续分布
#[derive(Debug, Clone)]
pub struct Continuous<D: Density> {
    density: D,
    native_q: i32,
    sample_q: i32,
    table: NumericTable,
    rnd: RandomGenerator,
    scope: String,
}

impl<D: Density> Continuous<D> {
    /// 由密度构造
    pub fn new(
        density: D,
        native_q: i32,
        sample_q: i32,
        rnd: RandomGenerator,
        scope: impl Into<String>,
    ) -> FoamResult<Self> {
        let scope = scope.into();
        check_range(&scope, density.min(), density.max())?;
        let q = sample_q - native_q;
        check_q(&scope, density.min(), q)?;
        let table = NumericTable::build(&density, q, &scope)?;
        Ok(Self {
            density,
            native_q,
            sample_q,
            table,
            rnd,
            scope,
        })
    }

    /// 从字典构造，`Q` 缺省为密度的原生指数
    pub fn from_dictionary(
        dict: &Dictionary,
        rnd: RandomGenerator,
        sample_q: i32,
    ) -> FoamResult<Self> {
        let density = D::from_dictionary(dict)?;
        let native_q = dict.lookup_or("Q", D::DEFAULT_Q)?;
        Self::new(density, native_q, sample_q, rnd, dict.scope())
    }

    /// 原生密度
    pub fn density(&self) -> &D {
        &self.density
    }
}

impl<D: Density> Distribution for Continuous<D> {
    fn type_name(&self) -> &'static str {
        D::TYPE_NAME
    }

    fn native_q(&self) -> i32 {
        self.native_q
    }

    fn sample_q(&self) -> i32 {
        self.sample_q
    }

    fn min(&self) -> f64 {
        self.density.min()
    }

    fn max(&self) -> f64 {
        self.density.max()
    }

    fn mean(&self) -> f64 {
        self.density
            .analytic_mean(self.q())
            .unwrap_or_else(|| self.table.mean())
    }

    fn random_mut(&mut self) -> &mut RandomGenerator {
        &mut self.rnd
    }

    fn sample(&mut self) -> f64 {
        let u = self.rnd.sample01();
        let x = self
            .density
            .analytic_sample(u, self.q())
            .unwrap_or_else(|| self.table.invert(u));
        x.clamp(self.min(), self.max())
    }

    fn integral_pdf_x_pow(&self, x: &[f64], e: i32, consistent: bool) -> Vec<f64> {
        if !consistent {
            let q = self.q();
            let (min, max) = (self.min(), self.max());
            let analytic: Option<Vec<f64>> = x
                .iter()
                .map(|&xi| self.density.analytic_integral(xi.clamp(min, max), e, q))
                .collect();
            if let Some(values) = analytic {
                return values;
            }
        }
        self.table.integrals(x, e)
    }

    fn pdf(&self, x: &[f64]) -> Vec<f64> {
        let q = self.q();
        x.iter()
            .map(|&xi| {
                if xi < self.min() || xi > self.max() {
                    0.0
                } else {
                    self.density.raw_pdf(xi) * xi.powi(q) / self.table.total
                }
            })
            .collect()
    }

    fn clone_with_sample_q(&self, sample_q: i32) -> FoamResult<Box<dyn Distribution>> {
        Ok(Box::new(Self::new(
            self.density.clone(),
            self.native_q,
            sample_q,
            self.rnd.clone(),
            self.scope.clone(),
        )?))
    }

    fn to_dictionary(&self) -> FoamResult<Dictionary> {
        let mut dict = Dictionary::new(self.scope.clone());
        dict.set("type", D::TYPE_NAME)?;
        dict.set("Q", self.native_q)?;
        self.density.write(&mut dict)?;
        Ok(dict)
    }
}
