// crates/fc_distribution/src/tabulated.rs

//! 表格分布
//!
//! 字典条目 `distribution` 为 `[[x, y], ...]`，x 严格递增。
//!
//! - `tabulatedDensity`：y 为密度值（未归一化），两点之间线性插值
//! - `tabulatedCumulative`：y 为累积分布，单调不减，两点之间密度为常数

use fc_config::Dictionary;
use fc_foundation::{FoamError, FoamResult};

use crate::continuous::Density;

fn read_table(dict: &Dictionary) -> FoamResult<(Vec<f64>, Vec<f64>)> {
    let rows: Vec<[f64; 2]> = dict.lookup("distribution")?;
    if rows.len() < 2 {
        return Err(FoamError::invalid_entry(
            dict.scope(),
            "distribution",
            format!("至少需要两个点, 实际 {}", rows.len()),
        ));
    }
    if rows.windows(2).any(|w| w[1][0] <= w[0][0]) {
        return Err(FoamError::invalid_entry(
            dict.scope(),
            "distribution",
            "x 须严格递增",
        ));
    }
    Ok(rows.iter().map(|r| (r[0], r[1])).unzip())
}

fn write_table(dict: &mut Dictionary, x: &[f64], y: &[f64]) -> FoamResult<()> {
    let rows: Vec<[f64; 2]> = x.iter().zip(y).map(|(a, b)| [*a, *b]).collect();
    dict.set("distribution", rows)?;
    Ok(())
}

/// 所在区间 j：x[j] <= v < x[j+1]
fn interval(x: &[f64], v: f64) -> usize {
    x.partition_point(|xi| *xi <= v).clamp(1, x.len() - 1) - 1
}

// ============================================================
// tabulatedDensity
// ============================================================

/// 表格密度
#[derive(Debug, Clone, PartialEq)]
pub struct TabulatedDensity {
    x: Vec<f64>,
    pdf: Vec<f64>,
}

impl TabulatedDensity {
    /// 由数据点构造
    pub fn new(x: Vec<f64>, pdf: Vec<f64>) -> Self {
        Self { x, pdf }
    }
}

impl Density for TabulatedDensity {
    const TYPE_NAME: &'static str = "tabulatedDensity";

    fn from_dictionary(dict: &Dictionary) -> FoamResult<Self> {
        let (x, pdf) = read_table(dict)?;
        if pdf.iter().any(|v| *v < 0.0) {
            return Err(FoamError::invalid_entry(
                dict.scope(),
                "distribution",
                "密度不能为负",
            ));
        }
        Ok(Self { x, pdf })
    }

    fn write(&self, dict: &mut Dictionary) -> FoamResult<()> {
        write_table(dict, &self.x, &self.pdf)
    }

    fn min(&self) -> f64 {
        self.x[0]
    }

    fn max(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    fn raw_pdf(&self, v: f64) -> f64 {
        let j = interval(&self.x, v);
        let t = ((v - self.x[j]) / (self.x[j + 1] - self.x[j])).clamp(0.0, 1.0);
        self.pdf[j] + (self.pdf[j + 1] - self.pdf[j]) * t
    }

    fn breakpoints(&self) -> Vec<f64> {
        self.x.clone()
    }
}

// ============================================================
// tabulatedCumulative
// ============================================================

/// 表格累积分布
#[derive(Debug, Clone, PartialEq)]
pub struct TabulatedCumulative {
    x: Vec<f64>,
    cdf: Vec<f64>,
}

impl TabulatedCumulative {
    /// 归一化后的累积值
    fn normalised(&self, j: usize) -> f64 {
        let (c0, c1) = (self.cdf[0], self.cdf[self.cdf.len() - 1]);
        (self.cdf[j] - c0) / (c1 - c0)
    }
}

impl Density for TabulatedCumulative {
    const TYPE_NAME: &'static str = "tabulatedCumulative";

    fn from_dictionary(dict: &Dictionary) -> FoamResult<Self> {
        let (x, cdf) = read_table(dict)?;
        if cdf.windows(2).any(|w| w[1] < w[0]) || cdf[cdf.len() - 1] <= cdf[0] {
            return Err(FoamError::invalid_entry(
                dict.scope(),
                "distribution",
                "累积分布须单调不减且不为常数",
            ));
        }
        Ok(Self { x, cdf })
    }

    fn write(&self, dict: &mut Dictionary) -> FoamResult<()> {
        write_table(dict, &self.x, &self.cdf)
    }

    fn min(&self) -> f64 {
        self.x[0]
    }

    fn max(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    fn raw_pdf(&self, v: f64) -> f64 {
        let j = interval(&self.x, v);
        (self.cdf[j + 1] - self.cdf[j]) / (self.x[j + 1] - self.x[j])
    }

    fn breakpoints(&self) -> Vec<f64> {
        self.x.clone()
    }

    fn analytic_sample(&self, u: f64, q: i32) -> Option<f64> {
        if q != 0 {
            return None;
        }
        let n = self.x.len();
        let j = (0..n - 1)
            .find(|&j| self.normalised(j + 1) > u)
            .unwrap_or(n - 2);
        let (c0, c1) = (self.normalised(j), self.normalised(j + 1));
        let t = if c1 > c0 { (u - c0) / (c1 - c0) } else { 0.0 };
        Some(self.x[j] + t * (self.x[j + 1] - self.x[j]))
    }

    fn analytic_integral(&self, v: f64, e: i32, q: i32) -> Option<f64> {
        if q != 0 || e != 0 {
            return None;
        }
        let j = interval(&self.x, v);
        let t = ((v - self.x[j]) / (self.x[j + 1] - self.x[j])).clamp(0.0, 1.0);
        let (c0, c1) = (self.normalised(j), self.normalised(j + 1));
        Some(c0 + t * (c1 - c0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(text: &str) -> Dictionary {
        Dictionary::from_json_str("sizeDistribution", text).unwrap()
    }

    #[test]
    fn test_density_interpolates() {
        let d = TabulatedDensity::from_dictionary(&dict(
            r#"{"distribution": [[0.0, 0.0], [1.0, 2.0], [2.0, 0.0]]}"#,
        ))
        .unwrap();
        assert_eq!(d.raw_pdf(0.5), 1.0);
        assert_eq!(d.raw_pdf(1.5), 1.0);
        assert_eq!(d.raw_pdf(2.0), 0.0);
        assert_eq!(d.breakpoints(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_unsorted_table_rejected() {
        let err = TabulatedDensity::from_dictionary(&dict(
            r#"{"distribution": [[1.0, 1.0], [0.5, 1.0]]}"#,
        ))
        .unwrap_err();
        assert!(err.to_string().contains("distribution"));
    }

    #[test]
    fn test_cumulative_inverse() {
        let c = TabulatedCumulative::from_dictionary(&dict(
            r#"{"distribution": [[1.0, 0.0], [2.0, 0.5], [4.0, 1.0]]}"#,
        ))
        .unwrap();
        assert_eq!(c.analytic_sample(0.25, 0), Some(1.5));
        assert_eq!(c.analytic_sample(0.75, 0), Some(3.0));
        assert_eq!(c.analytic_integral(3.0, 0, 0), Some(0.75));
        assert_eq!(c.analytic_integral(4.0, 0, 0), Some(1.0));
        assert_eq!(c.raw_pdf(3.0), 0.25);
    }
}
