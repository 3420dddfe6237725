// crates/fc_mesh/src/cell_shape.rs

//! 单元形状识别
//!
//! 按面数和各面点数识别标准单元模型，其余归为一般多面体。

use serde::{Deserialize, Serialize};

/// 单元模型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellModel {
    /// 六面体
    Hex,
    /// 三棱柱
    Prism,
    /// 四棱锥
    Pyr,
    /// 四面体
    Tet,
    /// 一般多面体
    Poly,
}

impl CellModel {
    /// 模型名
    pub fn name(self) -> &'static str {
        match self {
            Self::Hex => "hex",
            Self::Prism => "prism",
            Self::Pyr => "pyr",
            Self::Tet => "tet",
            Self::Poly => "poly",
        }
    }

    /// 标准模型的点数（多面体为 `None`）
    pub fn n_points(self) -> Option<usize> {
        match self {
            Self::Hex => Some(8),
            Self::Prism => Some(6),
            Self::Pyr => Some(5),
            Self::Tet => Some(4),
            Self::Poly => None,
        }
    }

    /// 由各面点数和单元点数识别
    pub fn classify(face_sizes: &[usize], n_cell_points: usize) -> Self {
        let tris = face_sizes.iter().filter(|n| **n == 3).count();
        let quads = face_sizes.iter().filter(|n| **n == 4).count();
        let model = match (face_sizes.len(), tris, quads) {
            (6, 0, 6) => Self::Hex,
            (5, 2, 3) => Self::Prism,
            (5, 4, 1) => Self::Pyr,
            (4, 4, 0) => Self::Tet,
            _ => Self::Poly,
        };
        match model.n_points() {
            Some(n) if n != n_cell_points => Self::Poly,
            _ => model,
        }
    }
}

/// 单元形状：模型与点编号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellShape {
    /// 模型
    pub model: CellModel,
    /// 单元的点（去重，升序）
    pub points: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(CellModel::classify(&[4; 6], 8), CellModel::Hex);
        assert_eq!(CellModel::classify(&[3, 3, 4, 4, 4], 6), CellModel::Prism);
        assert_eq!(CellModel::classify(&[3, 3, 3, 3, 4], 5), CellModel::Pyr);
        assert_eq!(CellModel::classify(&[3; 4], 4), CellModel::Tet);
        assert_eq!(CellModel::classify(&[4, 4, 4, 4, 4, 4, 4], 10), CellModel::Poly);
        // 面数吻合但点数不对
        assert_eq!(CellModel::classify(&[4; 6], 9), CellModel::Poly);
    }
}
