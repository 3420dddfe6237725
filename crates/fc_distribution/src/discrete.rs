// crates/fc_distribution/src/discrete.rs

//! 离散分布：单值与多值

use fc_config::Dictionary;
use fc_foundation::{FoamError, FoamResult};

use crate::distribution::{check_q, Distribution};
use crate::random::RandomGenerator;

// ============================================================
// fixedValue
// ============================================================

/// 单值分布，所有样本都等于 `value`
#[derive(Debug, Clone)]
pub struct FixedValue {
    value: f64,
    sample_q: i32,
    rnd: RandomGenerator,
    scope: String,
}

impl FixedValue {
    /// 构造
    pub fn new(value: f64, sample_q: i32, rnd: RandomGenerator) -> Self {
        Self {
            value,
            sample_q,
            rnd,
            scope: "fixedValue".into(),
        }
    }

    /// 从字典构造
    pub fn from_dictionary(
        dict: &Dictionary,
        rnd: RandomGenerator,
        sample_q: i32,
    ) -> FoamResult<Self> {
        let value: f64 = dict.lookup("value")?;
        Ok(Self {
            value,
            sample_q,
            rnd,
            scope: dict.scope().to_string(),
        })
    }

    /// 取值
    pub fn value(&self) -> f64 {
        self.value
    }
}

impl Distribution for FixedValue {
    fn type_name(&self) -> &'static str {
        "fixedValue"
    }

    // 单点分布的重加权没有意义，原生指数取采样指数
    fn native_q(&self) -> i32 {
        self.sample_q
    }

    fn sample_q(&self) -> i32 {
        self.sample_q
    }

    fn min(&self) -> f64 {
        self.value
    }

    fn max(&self) -> f64 {
        self.value
    }

    fn mean(&self) -> f64 {
        self.value
    }

    fn random_mut(&mut self) -> &mut RandomGenerator {
        &mut self.rnd
    }

    fn sample(&mut self) -> f64 {
        self.value
    }

    fn integral_pdf_x_pow(&self, x: &[f64], e: i32, _consistent: bool) -> Vec<f64> {
        x.iter()
            .map(|&xi| if xi < self.value { 0.0 } else { self.value.powi(e) })
            .collect()
    }

    // 狄拉克分布没有有限密度
    fn pdf(&self, x: &[f64]) -> Vec<f64> {
        vec![0.0; x.len()]
    }

    fn plot_x(&self, _n: usize) -> Vec<f64> {
        vec![self.value]
    }

    fn clone_with_sample_q(&self, sample_q: i32) -> FoamResult<Box<dyn Distribution>> {
        let mut d = self.clone();
        d.sample_q = sample_q;
        Ok(Box::new(d))
    }

    fn to_dictionary(&self) -> FoamResult<Dictionary> {
        let mut dict = Dictionary::new(self.scope.clone());
        dict.set("type", "fixedValue")?;
        dict.set("value", self.value)?;
        Ok(dict)
    }
}

// ============================================================
// multiFixedValue
// ============================================================

/// 多值分布
///
/// 字典条目 `distribution` 为 `[[x, w], ...]`，权重按原生指数 `Q` 给出，
/// 采样概率为 `w·x^q` 归一化。
#[derive(Debug, Clone)]
pub struct MultiFixedValue {
    values: Vec<f64>,
    weights: Vec<f64>,
    probabilities: Vec<f64>,
    native_q: i32,
    sample_q: i32,
    rnd: RandomGenerator,
    scope: String,
}

impl MultiFixedValue {
    /// 由取值与原生权重构造，取值会被排序
    pub fn new(
        mut rows: Vec<(f64, f64)>,
        native_q: i32,
        sample_q: i32,
        rnd: RandomGenerator,
        scope: impl Into<String>,
    ) -> FoamResult<Self> {
        let scope = scope.into();
        if rows.is_empty() {
            return Err(FoamError::invalid_entry(&scope, "distribution", "没有取值"));
        }
        if rows.iter().any(|(x, w)| !x.is_finite() || *w < 0.0) {
            return Err(FoamError::invalid_entry(
                &scope,
                "distribution",
                "取值须有限、权重须非负",
            ));
        }
        rows.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (values, weights): (Vec<f64>, Vec<f64>) = rows.into_iter().unzip();

        let q = sample_q - native_q;
        check_q(&scope, values[0], q)?;
        let reweighted: Vec<f64> = values
            .iter()
            .zip(&weights)
            .map(|(x, w)| w * x.powi(q))
            .collect();
        let total: f64 = reweighted.iter().sum();
        if total <= 0.0 {
            return Err(FoamError::invalid_entry(&scope, "distribution", "权重之和为零"));
        }
        let probabilities = reweighted.iter().map(|w| w / total).collect();

        Ok(Self {
            values,
            weights,
            probabilities,
            native_q,
            sample_q,
            rnd,
            scope,
        })
    }

    /// 从字典构造
    pub fn from_dictionary(
        dict: &Dictionary,
        rnd: RandomGenerator,
        sample_q: i32,
    ) -> FoamResult<Self> {
        let rows: Vec<[f64; 2]> = dict.lookup("distribution")?;
        let native_q = dict.lookup_or("Q", 0)?;
        Self::new(
            rows.into_iter().map(|r| (r[0], r[1])).collect(),
            native_q,
            sample_q,
            rnd,
            dict.scope(),
        )
    }

    /// 采样概率
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }
}

impl Distribution for MultiFixedValue {
    fn type_name(&self) -> &'static str {
        "multiFixedValue"
    }

    fn native_q(&self) -> i32 {
        self.native_q
    }

    fn sample_q(&self) -> i32 {
        self.sample_q
    }

    fn min(&self) -> f64 {
        self.values[0]
    }

    fn max(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    fn mean(&self) -> f64 {
        self.values
            .iter()
            .zip(&self.probabilities)
            .map(|(x, p)| x * p)
            .sum()
    }

    fn random_mut(&mut self) -> &mut RandomGenerator {
        &mut self.rnd
    }

    fn sample(&mut self) -> f64 {
        let u = self.rnd.sample01();
        let mut acc = 0.0;
        for (x, p) in self.values.iter().zip(&self.probabilities) {
            acc += p;
            if u < acc {
                return *x;
            }
        }
        self.max()
    }

    fn integral_pdf_x_pow(&self, x: &[f64], e: i32, _consistent: bool) -> Vec<f64> {
        x.iter()
            .map(|&xi| {
                self.values
                    .iter()
                    .zip(&self.probabilities)
                    .take_while(|(v, _)| **v <= xi)
                    .map(|(v, p)| p * v.powi(e))
                    .sum()
            })
            .collect()
    }

    fn pdf(&self, x: &[f64]) -> Vec<f64> {
        vec![0.0; x.len()]
    }

    fn plot_x(&self, _n: usize) -> Vec<f64> {
        self.values.clone()
    }

    fn clone_with_sample_q(&self, sample_q: i32) -> FoamResult<Box<dyn Distribution>> {
        Ok(Box::new(Self::new(
            self.values.iter().copied().zip(self.weights.iter().copied()).collect(),
            self.native_q,
            sample_q,
            self.rnd.clone(),
            self.scope.clone(),
        )?))
    }

    fn to_dictionary(&self) -> FoamResult<Dictionary> {
        let mut dict = Dictionary::new(self.scope.clone());
        dict.set("type", "multiFixedValue")?;
        dict.set("Q", self.native_q)?;
        let rows: Vec<[f64; 2]> = self
            .values
            .iter()
            .zip(&self.weights)
            .map(|(x, w)| [*x, *w])
            .collect();
        dict.set("distribution", rows)?;
        Ok(dict)
    }
}
