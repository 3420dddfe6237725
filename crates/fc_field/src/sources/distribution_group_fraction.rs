// crates/fc_field/src/sources/distribution_group_fraction.rs

//! distributionGroupFraction - 按尺寸分布分配的组分数源
//!
//! 群体平衡模型把颗粒尺寸离散为若干组 `x_0 < x_1 < ... < x_{n-1}`。注入的
//! 颗粒按体积加权分布（`sampleQ = 3`）分配到各组，组 `i` 的份额 `η_i` 为分布
//! 与以体积 `v = x³` 为自变量的帽函数之积的积分：
//!
//! ```text
//! η_i = ∫ h_i(x³) PDF₃(x) dx
//!
//!          (v - v_{i-1}) / (v_i - v_{i-1})   x ∈ [x_{i-1}, x_i]
//! h_i  =   (v_{i+1} - v) / (v_{i+1} - v_i)   x ∈ [x_i, x_{i+1}]
//! ```
//!
//! 首组另得 `x_0` 以下的全部份额，末组另得 `x_{n-1}` 以上的全部份额，
//! 因此 `Σ η_i = 1`。积分使用 consistent 路径，保证分段结果可加。
//!
//! `η` 按需计算并缓存，组划分、分布参数或网格变化后须调用 `clear_cache`。

use std::rc::Rc;

use fc_config::Dictionary;
use fc_distribution::{new_distribution, Distribution, RandomGenerator};
use fc_foundation::{Demand, FoamError, FoamResult};

use super::{FieldSource, SourceContext};

/// 分配分布所用的采样尺寸指数（体积加权）
pub const GROUP_SAMPLE_Q: i32 = 3;

/// 尺寸组分数源（仅标量）
#[derive(Debug, Clone)]
pub struct DistributionGroupFractionSource {
    index: usize,
    sizes: Vec<f64>,
    distribution: Rc<dyn Distribution>,
    eta: Demand<f64>,
}

impl DistributionGroupFractionSource {
    /// 类型名
    pub const TYPE_NAME: &'static str = "distributionGroupFraction";

    /// 从字典构造：`index`、`sizes`、`distribution`
    pub fn from_dictionary(dict: &Dictionary) -> FoamResult<Self> {
        let index: usize = dict.lookup("index")?;
        let sizes: Vec<f64> = dict.lookup("sizes")?;
        let distribution = new_distribution(
            &dict.sub_dict("distribution")?,
            RandomGenerator::default(),
            GROUP_SAMPLE_Q,
        )?;
        Self::new(index, sizes, Rc::from(distribution)).map_err(|e| match e {
            FoamError::InvalidEntry { key, reason, .. } => {
                FoamError::invalid_entry(dict.scope(), key, reason)
            }
            other => other,
        })
    }

    /// 由组尺寸和分布构造
    pub fn new(index: usize, sizes: Vec<f64>, distribution: Rc<dyn Distribution>) -> FoamResult<Self> {
        let scope = Self::TYPE_NAME;
        if sizes.is_empty() {
            return Err(FoamError::invalid_entry(scope, "sizes", "至少需要一个组"));
        }
        if sizes.iter().any(|x| !(x.is_finite() && *x > 0.0)) {
            return Err(FoamError::invalid_entry(scope, "sizes", "尺寸必须为正"));
        }
        if sizes.windows(2).any(|w| w[1] <= w[0]) {
            return Err(FoamError::invalid_entry(scope, "sizes", "尺寸必须严格递增"));
        }
        if index >= sizes.len() {
            return Err(FoamError::invalid_entry(
                scope,
                "index",
                format!("{index} 超出组数 {}", sizes.len()),
            ));
        }
        Ok(Self {
            index,
            sizes,
            distribution,
            eta: Demand::default(),
        })
    }

    /// 组编号
    pub fn index(&self) -> usize {
        self.index
    }

    /// 组尺寸
    pub fn sizes(&self) -> &[f64] {
        &self.sizes
    }

    /// 分配分布
    pub fn distribution(&self) -> &dyn Distribution {
        self.distribution.as_ref()
    }

    /// 本组份额（按需计算）
    pub fn eta(&self) -> f64 {
        *self.eta.get_or_eval(|| self.compute_eta())
    }

    /// 份额是否已缓存
    pub fn eta_cached(&self) -> bool {
        self.eta.is_evaluated()
    }

    fn compute_eta(&self) -> f64 {
        let x = &self.sizes;
        let i = self.index;
        let n = x.len();
        let d = self.distribution.as_ref();
        let cdf = |xi: f64| d.integral_pdf_x_pow(&[xi], 0, true)[0];

        let mut eta = 0.0;
        if i == 0 {
            eta += cdf(x[0]);
        }
        if i == n - 1 {
            eta += 1.0 - cdf(x[n - 1]);
        }
        if i > 0 {
            let (i0, i3, va, vb) = interval_moments(d, x[i - 1], x[i]);
            eta += (i3 - va * i0) / (vb - va);
        }
        if i + 1 < n {
            let (i0, i3, va, vb) = interval_moments(d, x[i], x[i + 1]);
            eta += (vb * i0 - i3) / (vb - va);
        }
        tracing::trace!("{} 组 {} 份额 {:.6e}", Self::TYPE_NAME, i, eta);
        eta
    }
}

/// 区间 `[a, b]` 上的零阶、三阶矩与端点体积
fn interval_moments(d: &dyn Distribution, a: f64, b: f64) -> (f64, f64, f64, f64) {
    let m0 = d.integral_pdf_x_pow(&[a, b], 0, true);
    let m3 = d.integral_pdf_x_pow(&[a, b], 3, true);
    (m0[1] - m0[0], m3[1] - m3[0], a.powi(3), b.powi(3))
}

impl FieldSource<f64> for DistributionGroupFractionSource {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn source_value(&self, ctx: &SourceContext<'_, f64>) -> FoamResult<Vec<f64>> {
        Ok(vec![self.eta(); ctx.size()])
    }

    fn internal_coeff(&self, ctx: &SourceContext<'_, f64>) -> FoamResult<Vec<f64>> {
        Ok(ctx
            .rate
            .iter()
            .map(|r| if *r > 0.0 { 0.0 } else { 1.0 })
            .collect())
    }

    fn clone_box(&self) -> Box<dyn FieldSource<f64>> {
        Box::new(self.clone())
    }

    fn clear_cache(&mut self) {
        self.eta.invalidate();
    }

    fn write(&self, dict: &mut Dictionary) -> FoamResult<()> {
        dict.set("type", Self::TYPE_NAME)?;
        dict.set("index", self.index)?;
        dict.set("sizes", &self.sizes)?;
        dict.add_sub_dict("distribution", self.distribution.to_dictionary()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZES: [f64; 4] = [1e-4, 2e-4, 3e-4, 4e-4];

    fn group(index: usize, distribution: &str) -> DistributionGroupFractionSource {
        let text = format!(
            r#"{{"type": "distributionGroupFraction", "index": {index}, "sizes": {:?}, "distribution": {distribution}}}"#,
            SIZES
        );
        let d = Dictionary::from_json_str("alpha::sources::inlet", &text).unwrap();
        DistributionGroupFractionSource::from_dictionary(&d).unwrap()
    }

    #[test]
    fn test_fractions_sum_to_one() {
        let dist = r#"{"type": "RosinRammler", "min": 5e-5, "max": 5e-4, "d": 2e-4, "n": 3.0}"#;
        let total: f64 = (0..SIZES.len()).map(|i| group(i, dist).eta()).sum();
        assert!((total - 1.0).abs() < 1e-12, "total = {total}");
    }

    #[test]
    fn test_narrow_uniform_lands_in_one_group() {
        // 分布全部落在 [x_1, x_2] 内且集中在 x_1 附近
        let dist = r#"{"type": "uniform", "min": 2e-4, "max": 2.0001e-4}"#;
        let eta1 = group(1, dist).eta();
        assert!(eta1 > 0.99, "eta1 = {eta1}");
        assert!(group(3, dist).eta().abs() < 1e-12);
    }

    #[test]
    fn test_eta_is_cached_until_cleared() {
        let dist = r#"{"type": "uniform", "min": 1e-4, "max": 4e-4}"#;
        let mut src = group(2, dist);
        assert!(!src.eta_cached());
        let eta = src.eta();
        assert!(src.eta_cached());
        assert_eq!(src.eta(), eta);
        src.clear_cache();
        assert!(!src.eta_cached());
    }

    #[test]
    fn test_inflow_takes_eta() {
        let dist = r#"{"type": "uniform", "min": 1e-4, "max": 4e-4}"#;
        let src = group(0, dist);
        let internal = [0.7, 0.2];
        let ctx = SourceContext::new(&[0, 1], &internal, &[1.0, -1.0], 0.0).unwrap();
        let v = src.value(&ctx).unwrap();
        assert_eq!(v[0], src.eta());
        assert_eq!(v[1], 0.2);
    }

    #[test]
    fn test_invalid_groups() {
        let dist = r#"{"type": "uniform", "min": 1e-4, "max": 4e-4}"#;
        let d = Dictionary::from_json_str(
            "s",
            &format!(r#"{{"index": 5, "sizes": [1e-4, 2e-4], "distribution": {dist}}}"#),
        )
        .unwrap();
        assert!(DistributionGroupFractionSource::from_dictionary(&d).is_err());
        let d = Dictionary::from_json_str(
            "s",
            &format!(r#"{{"index": 0, "sizes": [2e-4, 1e-4], "distribution": {dist}}}"#),
        )
        .unwrap();
        assert!(DistributionGroupFractionSource::from_dictionary(&d).is_err());
    }
}
