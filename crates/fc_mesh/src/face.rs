// crates/fc_mesh/src/face.rs

//! 多边形面
//!
//! 面是有序的点编号列表，面积矢量按右手法则确定方向。内部面的面积矢量
//! 由 owner 指向 neighbour，边界面指向域外。
//!
//! # 几何算法
//!
//! - 三角形直接计算
//! - 多边形以点平均值为顶点分解为三角扇，面心按投影面积加权
//! - 扫掠体积按三角扇逐片计算，每片用两种四面体分解的平均值

use glam::DVec3;
use serde::{Deserialize, Serialize};

use fc_foundation::VSMALL;

/// 多边形面
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Face(pub Vec<usize>);

impl Face {
    /// 由点编号构造
    pub fn new(points: impl Into<Vec<usize>>) -> Self {
        Self(points.into())
    }

    /// 点数
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 点编号
    #[inline]
    pub fn points(&self) -> &[usize] {
        &self.0
    }

    /// 反向（翻转法向）
    pub fn reversed(&self) -> Self {
        let mut pts = self.0.clone();
        if pts.len() > 1 {
            pts[1..].reverse();
        }
        Self(pts)
    }

    /// 边（首尾相连）
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.0.len();
        (0..n).map(move |i| (self.0[i], self.0[(i + 1) % n]))
    }

    /// 点坐标平均值
    pub fn average(&self, points: &[DVec3]) -> DVec3 {
        if self.0.is_empty() {
            return DVec3::ZERO;
        }
        self.0.iter().map(|&p| points[p]).sum::<DVec3>() / self.0.len() as f64
    }

    /// 面心与面积矢量
    pub fn centre_and_area(&self, points: &[DVec3]) -> (DVec3, DVec3) {
        let n = self.0.len();
        if n < 3 {
            return (self.average(points), DVec3::ZERO);
        }
        if n == 3 {
            let (a, b, c) = (points[self.0[0]], points[self.0[1]], points[self.0[2]]);
            return ((a + b + c) / 3.0, 0.5 * (b - a).cross(c - a));
        }

        let p_avg = self.average(points);
        let mut sum_n = DVec3::ZERO;
        for (a, b) in self.edges() {
            sum_n += (points[b] - points[a]).cross(p_avg - points[a]);
        }
        let mag_n = sum_n.length();
        if mag_n < VSMALL {
            return (p_avg, DVec3::ZERO);
        }
        let unit_n = sum_n / mag_n;

        let mut sum_a = 0.0;
        let mut sum_ac = DVec3::ZERO;
        for (a, b) in self.edges() {
            let (pa, pb) = (points[a], points[b]);
            let tri_n = (pb - pa).cross(p_avg - pa);
            let a_proj = tri_n.dot(unit_n);
            sum_a += a_proj;
            sum_ac += a_proj * (pa + pb + p_avg);
        }
        let centre = if sum_a.abs() > VSMALL {
            sum_ac / (3.0 * sum_a)
        } else {
            p_avg
        };
        (centre, 0.5 * sum_n)
    }

    /// 面心
    pub fn centre(&self, points: &[DVec3]) -> DVec3 {
        self.centre_and_area(points).0
    }

    /// 面积矢量
    pub fn area(&self, points: &[DVec3]) -> DVec3 {
        self.centre_and_area(points).1
    }

    /// 面积大小
    pub fn mag(&self, points: &[DVec3]) -> f64 {
        self.area(points).length()
    }

    /// 点从 `old_points` 移动到 `new_points` 时扫掠的体积
    ///
    /// 沿面积矢量方向运动为正。
    pub fn swept_vol(&self, old_points: &[DVec3], new_points: &[DVec3]) -> f64 {
        let n = self.0.len();
        if n < 3 {
            return 0.0;
        }
        let c_old = self.centre(old_points);
        let c_new = self.centre(new_points);
        let mut sv = 0.0;
        for (a, b) in self.edges() {
            let old = [c_old, old_points[a], old_points[b]];
            let new = [c_new, new_points[a], new_points[b]];
            sv += triangle_swept_vol(&old, &new);
        }
        sv
    }
}

impl From<Vec<usize>> for Face {
    fn from(points: Vec<usize>) -> Self {
        Self(points)
    }
}

impl std::ops::Index<usize> for Face {
    type Output = usize;

    fn index(&self, i: usize) -> &usize {
        &self.0[i]
    }
}

/// 三角形从 `t0` 移动到 `t1` 扫掠的体积
fn triangle_swept_vol(t0: &[DVec3; 3], t1: &[DVec3; 3]) -> f64 {
    let [a, b, c] = *t0;
    let [ta, tb, tc] = *t1;
    (1.0 / 12.0)
        * ((ta - a).dot((b - a).cross(c - a))
            + (tb - b).dot((c - b).cross(ta - b))
            + (c - tc).dot((tb - tc).cross(ta - tc))
            + (ta - a).dot((b - a).cross(c - a))
            + (b - tb).dot((ta - tb).cross(tc - tb))
            + (c - tc).dot((b - tc).cross(ta - tc)))
}
