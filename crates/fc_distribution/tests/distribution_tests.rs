//! crates/fc_distribution/tests/distribution_tests.rs
//!
//! 分布采样与积分测试
//!
//! 覆盖：
//! - 均匀分布的均值与样本均值
//! - consistent 积分的端点与分段可加性
//! - 尺寸指数 q = sampleQ - Q
//! - start(repeat) 重放
//! - 字典写出后重建
//! - 未知类型立即报错

use fc_config::Dictionary;
use fc_distribution::{new_distribution, Distribution, RandomGenerator};
use fc_foundation::FoamError;

// ============================================================
// 辅助
// ============================================================

fn build(text: &str, seed: u64, sample_q: i32) -> Box<dyn Distribution> {
    let dict = Dictionary::from_json_str("injector::sizeDistribution", text).unwrap();
    new_distribution(&dict, RandomGenerator::new(seed), sample_q).unwrap()
}

fn sample_mean(d: &mut dyn Distribution, n: usize) -> f64 {
    d.sample_n(n).iter().sum::<f64>() / n as f64
}

const UNIFORM: &str = r#"{"type": "uniform", "min": 1.0, "max": 3.0}"#;

// ============================================================
// 均匀分布
// ============================================================

#[test]
fn test_uniform_mean() {
    let d = build(UNIFORM, 0, 0);
    assert_eq!(d.mean(), 2.0);
    assert_eq!(d.q(), 0);
}

#[test]
fn test_uniform_sample_mean_converges() {
    let mut d = build(UNIFORM, 12345, 0);
    let samples = d.sample_n(10_000);
    assert!(samples.iter().all(|x| (1.0..=3.0).contains(x)));
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    // 标准误差约 0.0058
    assert!((mean - 2.0).abs() < 0.03, "mean = {mean}");
}

#[test]
fn test_consistent_integral_endpoints() {
    let d = build(UNIFORM, 0, 0);
    let cdf = d.integral_pdf_x_pow(&[1.0, 3.0], 0, true);
    assert_eq!(cdf, vec![0.0, 1.0]);

    let cdf = d.integral_pdf_x_pow(&[1.0, 3.0], 0, false);
    assert_eq!(cdf, vec![0.0, 1.0]);
}

#[test]
fn test_consistent_integrals_are_additive() {
    let d = build(
        r#"{"type": "normal", "min": 0.0, "max": 2.0, "mu": 0.8, "sigma": 0.3}"#,
        0,
        0,
    );
    let edges = [0.0, 0.37, 0.9, 1.41, 2.0];
    let cumulative = d.integral_pdf_x_pow(&edges, 0, true);
    let parts: f64 = cumulative.windows(2).map(|w| w[1] - w[0]).sum();
    assert!((parts - 1.0).abs() < 1e-14);
    assert_eq!(cumulative[4], 1.0);

    // 一阶矩在 max 处等于均值
    let m = d.integral_pdf_x_pow(&[2.0], 1, true)[0];
    assert!((m - d.mean()).abs() < 1e-12);
}

#[test]
fn test_analytic_and_numeric_paths_agree() {
    let d = build(UNIFORM, 0, 3);
    let x = [1.5, 2.0, 2.5];
    let analytic = d.integral_pdf_x_pow(&x, 1, false);
    let numeric = d.integral_pdf_x_pow(&x, 1, true);
    for (a, b) in analytic.iter().zip(&numeric) {
        assert!((a - b).abs() < 1e-5, "{a} vs {b}");
    }
}

// ============================================================
// 尺寸指数
// ============================================================

#[test]
fn test_q_is_sample_q_minus_native_q() {
    let mass = r#"{"type": "massRosinRammler", "min": 1e-5, "max": 1e-3, "d": 2e-4, "n": 2.0}"#;
    let by_number = build(mass, 0, 0);
    assert_eq!(by_number.native_q(), 3);
    assert_eq!(by_number.sample_q(), 0);
    assert_eq!(by_number.q(), -3);

    let by_mass = by_number.clone_with_sample_q(3).unwrap();
    assert_eq!(by_mass.q(), 0);
    // 按个数采样偏向小颗粒
    assert!(by_number.mean() < by_mass.mean());
}

#[test]
fn test_volume_weighted_uniform_sampling() {
    let mut d = build(UNIFORM, 99, 3);
    assert_eq!(d.q(), 3);
    // ∫x⁴/∫x³ 在 [1, 3] 上
    let expected = ((243.0 - 1.0) / 5.0) / ((81.0 - 1.0) / 4.0);
    assert!((d.mean() - expected).abs() < 1e-12);
    let mean = sample_mean(d.as_mut(), 10_000);
    assert!((mean - expected).abs() < 0.03, "mean = {mean}");
}

#[test]
fn test_explicit_q_entry() {
    let d = build(
        r#"{"type": "uniform", "min": 1.0, "max": 3.0, "Q": 3}"#,
        0,
        0,
    );
    assert_eq!(d.q(), -3);
    assert!(d.mean() < 2.0);
}

// ============================================================
// 可重放采样
// ============================================================

#[test]
fn test_start_repeat_reproduces_sequence() {
    let mut d = build(
        r#"{"type": "RosinRammler", "min": 1e-5, "max": 1e-3, "d": 2e-4, "n": 2.0}"#,
        7,
        0,
    );
    d.start(false);
    let first = d.sample_n(50);
    d.start(true);
    let again = d.sample_n(50);
    assert_eq!(first, again);
}

#[test]
fn test_same_seed_same_samples_across_instances() {
    let text = r#"{"type": "lognormal", "min": 1e-5, "max": 1e-3, "mu": 1e-4, "sigma": 5e-5}"#;
    let mut a = build(text, 3, 0);
    let mut b = build(text, 3, 0);
    assert_eq!(a.sample_n(20), b.sample_n(20));
}

// ============================================================
// 其他类型
// ============================================================

#[test]
fn test_tabulated_density_symmetric_triangle() {
    let d = build(
        r#"{"type": "tabulatedDensity", "distribution": [[0.0, 0.0], [1.0, 1.0], [2.0, 0.0]]}"#,
        0,
        0,
    );
    assert!((d.mean() - 1.0).abs() < 1e-9);
    let cdf = d.cdf(&[1.0]);
    assert!((cdf[0] - 0.5).abs() < 1e-12);
}

#[test]
fn test_exponential_cdf_monotone() {
    let d = build(
        r#"{"type": "exponential", "min": 0.0, "max": 5.0, "lambda": 1.5}"#,
        0,
        0,
    );
    let x = d.plot_x(50);
    let cdf = d.cdf(&x);
    assert_eq!(cdf[0], 0.0);
    assert!((cdf[49] - 1.0).abs() < 1e-14);
    assert!(cdf.windows(2).all(|w| w[1] >= w[0]));
    let pdf = d.pdf(&x);
    assert!(pdf.windows(2).all(|w| w[1] <= w[0]));
}

#[test]
fn test_to_dictionary_rebuilds_same_distribution() {
    let d = build(
        r#"{"type": "normal", "min": 0.0, "max": 2.0, "mu": 1.0, "sigma": 0.5}"#,
        0,
        0,
    );
    let dict = d.to_dictionary().unwrap();
    assert_eq!(dict.type_name().unwrap(), "normal");
    let rebuilt = new_distribution(&dict, RandomGenerator::new(0), 0).unwrap();
    assert!((rebuilt.mean() - d.mean()).abs() < 1e-15);
    // 对称截断，均值等于 mu
    assert!((d.mean() - 1.0).abs() < 1e-9);
}

#[test]
fn test_unknown_type_fails_fast() {
    let dict = Dictionary::from_json_str("d", r#"{"type": "bogusType"}"#).unwrap();
    match new_distribution(&dict, RandomGenerator::new(0), 0) {
        Err(FoamError::UnknownType { category, type_name, valid }) => {
            assert_eq!(category, "distribution");
            assert_eq!(type_name, "bogusType");
            assert_eq!(valid.len(), 10);
        }
        other => panic!("expected UnknownType, got {other:?}"),
    }
}

#[test]
fn test_invalid_range_rejected() {
    let dict = Dictionary::from_json_str(
        "d",
        r#"{"type": "uniform", "min": 3.0, "max": 1.0}"#,
    )
    .unwrap();
    assert!(new_distribution(&dict, RandomGenerator::new(0), 0).is_err());
}
