// crates/fc_mesh/src/block_mesh.rs

//! 块网格生成
//!
//! 由 [`BlockMeshSpec`] 生成轴对齐的结构化六面体网格。
//!
//! # 编号
//!
//! - 点 `(i, j, k)` 编号 `i + (nx+1)·(j + (ny+1)·k)`
//! - 单元 `(i, j, k)` 编号 `i + nx·(j + ny·k)`
//! - 内部面按 owner 单元顺序生成（每个单元依次为 +x、+y、+z 邻居），
//!   得到上三角顺序
//! - 边界面按补丁顺序、补丁内按侧面顺序生成

use glam::DVec3;
use tracing::info;

use fc_config::{BlockMeshSpec, BoxSide};

use crate::error::{MeshError, MeshResult};
use crate::face::Face;
use crate::patch::{PatchKind, PolyPatch};
use crate::poly_mesh::PolyMesh;

/// 块网格生成器
#[derive(Debug, Clone)]
pub struct BlockMesh {
    spec: BlockMeshSpec,
}

impl BlockMesh {
    /// 构造
    pub fn new(spec: BlockMeshSpec) -> Self {
        Self { spec }
    }

    /// 描述
    pub fn spec(&self) -> &BlockMeshSpec {
        &self.spec
    }

    fn point_index(&self, i: usize, j: usize, k: usize) -> usize {
        let [nx, ny, _] = self.spec.cells;
        i + (nx + 1) * (j + (ny + 1) * k)
    }

    fn cell_index(&self, i: usize, j: usize, k: usize) -> usize {
        let [nx, ny, _] = self.spec.cells;
        i + nx * (j + ny * k)
    }

    /// 法向沿 `axis` 正向、位于格点 `(i, j, k)` 处的面
    fn positive_face(&self, axis: usize, i: usize, j: usize, k: usize) -> Face {
        let p = |a, b, c| self.point_index(a, b, c);
        match axis {
            0 => Face::new(vec![p(i, j, k), p(i, j + 1, k), p(i, j + 1, k + 1), p(i, j, k + 1)]),
            1 => Face::new(vec![p(i, j, k), p(i, j, k + 1), p(i + 1, j, k + 1), p(i + 1, j, k)]),
            _ => Face::new(vec![p(i, j, k), p(i + 1, j, k), p(i + 1, j + 1, k), p(i, j + 1, k)]),
        }
    }

    /// 侧面上的边界面及其 owner 单元
    fn side_faces(&self, side: BoxSide) -> Vec<(Face, usize)> {
        let [nx, ny, nz] = self.spec.cells;
        let axis = side.axis();
        let mut out = Vec::new();
        // 侧面上两个切向方向的单元数
        let (na, nb) = match axis {
            0 => (ny, nz),
            1 => (nx, nz),
            _ => (nx, ny),
        };
        let layer = if side.is_max() { self.spec.cells[axis] } else { 0 };
        let cell_layer = if side.is_max() { layer - 1 } else { 0 };
        for b in 0..nb {
            for a in 0..na {
                let (ijk, cell) = match axis {
                    0 => ((layer, a, b), self.cell_index(cell_layer, a, b)),
                    1 => ((a, layer, b), self.cell_index(a, cell_layer, b)),
                    _ => ((a, b, layer), self.cell_index(a, b, cell_layer)),
                };
                let face = self.positive_face(axis, ijk.0, ijk.1, ijk.2);
                let face = if side.is_max() { face } else { face.reversed() };
                out.push((face, cell));
            }
        }
        out
    }

    /// 生成网格
    pub fn generate(&self, name: &str) -> MeshResult<PolyMesh> {
        self.spec
            .validate()
            .map_err(|e| MeshError::topology("blockMesh", e.to_string()))?;
        let [nx, ny, nz] = self.spec.cells;
        let origin = DVec3::from_array(self.spec.origin);
        let delta = DVec3::from_array(self.spec.lengths)
            / DVec3::new(nx as f64, ny as f64, nz as f64);

        let mut points = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
        for k in 0..=nz {
            for j in 0..=ny {
                for i in 0..=nx {
                    points.push(origin + DVec3::new(i as f64, j as f64, k as f64) * delta);
                }
            }
        }

        let mut faces = Vec::new();
        let mut owner = Vec::new();
        let mut neighbour = Vec::new();
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let c = self.cell_index(i, j, k);
                    if i + 1 < nx {
                        faces.push(self.positive_face(0, i + 1, j, k));
                        owner.push(c);
                        neighbour.push(self.cell_index(i + 1, j, k));
                    }
                    if j + 1 < ny {
                        faces.push(self.positive_face(1, i, j + 1, k));
                        owner.push(c);
                        neighbour.push(self.cell_index(i, j + 1, k));
                    }
                    if k + 1 < nz {
                        faces.push(self.positive_face(2, i, j, k + 1));
                        owner.push(c);
                        neighbour.push(self.cell_index(i, j, k + 1));
                    }
                }
            }
        }

        let mut patches = Vec::with_capacity(self.spec.patches.len());
        for spec in &self.spec.patches {
            let kind: PatchKind = spec.patch_type.parse()?;
            let start = faces.len();
            for side in &spec.sides {
                for (f, c) in self.side_faces(*side) {
                    faces.push(f);
                    owner.push(c);
                }
            }
            let mut patch = PolyPatch::new(&spec.name, kind, start, faces.len() - start)
                .with_groups(spec.groups.clone());
            if let Some(nbr) = &spec.neighbour_patch {
                patch = patch.with_neighbour_patch(nbr);
            }
            patches.push(patch);
        }

        let mesh = PolyMesh::new(name, points, faces, owner, neighbour, patches)?;
        info!(
            "块网格 {}: {}x{}x{} = {} 单元",
            name,
            nx,
            ny,
            nz,
            mesh.n_cells()
        );
        Ok(mesh)
    }
}
