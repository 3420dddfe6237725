// crates/fc_mesh/src/geo_mesh.rs

//! 几何网格标记
//!
//! 场按其值所在的实体（单元、内部面、点、粒子）区分。每种实体由一个零尺寸
//! 标记类型表示，提供实体数和网格变化时的数据重排。
//!
//! | 标记 | 实体 | 补丁元素 |
//! |------|------|----------|
//! | [`VolMesh`] | 单元 | 补丁面 |
//! | [`SurfaceMesh`] | 内部面 | 补丁面 |
//! | [`PointMesh`] | 点 | 补丁点 |
//! | [`LagrangianGeoMesh`](crate::lagrangian::LagrangianGeoMesh) | 粒子 | 无 |

use glam::DVec3;

use fc_foundation::{
    FieldValue, FoamResult, PolyDistributionMap, PolyMeshMap, PolyTopoChangeMap, VSMALL,
};

use crate::poly_mesh::PolyMesh;

/// 几何网格
pub trait GeoMesh: 'static {
    /// 底层网格
    type Mesh: 'static;

    /// 场类型名前缀（`vol`、`surface`、`point` ...）
    const NAME: &'static str;

    /// 实体数
    fn size(mesh: &Self::Mesh) -> usize;

    /// 拓扑变化后重排内部值；`None` 表示不受影响
    fn map_topo_change<T: FieldValue>(
        mesh: &Self::Mesh,
        map: &PolyTopoChangeMap,
        values: &[T],
    ) -> FoamResult<Option<Vec<T>>>;

    /// 网格间映射后重排内部值
    fn map_mesh<T: FieldValue>(
        mesh: &Self::Mesh,
        map: &PolyMeshMap,
        values: &[T],
    ) -> FoamResult<Option<Vec<T>>>;

    /// 重分布内部值
    fn distribute<T: FieldValue>(
        mesh: &Self::Mesh,
        map: &PolyDistributionMap,
        values: &[T],
    ) -> FoamResult<Option<Vec<T>>>;
}

/// 带边界的几何网格
pub trait BoundaryGeoMesh: GeoMesh<Mesh = PolyMesh> {
    /// 补丁值是否同时是内部值（点场的补丁点也是网格点）
    const PATCH_VALUES_IN_INTERNAL: bool = false;

    /// 补丁元素数
    fn patch_size(mesh: &PolyMesh, patch_i: usize) -> usize;

    /// 补丁元素的单位外法向；没有逐元素法向时返回 `None`
    fn patch_normals(_mesh: &PolyMesh, _patch_i: usize) -> Option<Vec<DVec3>> {
        None
    }

    /// 补丁元素到相邻内部实体的法向距离倒数
    fn patch_delta_coeffs(mesh: &PolyMesh, patch_i: usize) -> Vec<f64> {
        vec![1.0; Self::patch_size(mesh, patch_i)]
    }

    /// 补丁元素相邻的内部实体
    ///
    /// 体场为补丁面的 owner 单元，点场为补丁点；面场的内部值在内部面上，
    /// 与补丁面不相邻，返回 `None`。
    fn patch_internal_addressing(mesh: &PolyMesh, patch_i: usize) -> Option<Vec<usize>>;

    /// 拓扑变化后重排补丁值（网格已是新网格）
    ///
    /// `None` 表示补丁值应由内部值重新求得。
    fn map_patch_topo_change<T: FieldValue>(
        mesh: &PolyMesh,
        map: &PolyTopoChangeMap,
        patch_i: usize,
        values: &[T],
    ) -> FoamResult<Option<Vec<T>>>;

    /// 网格间映射后重排补丁值
    fn map_patch_mesh<T: FieldValue>(
        mesh: &PolyMesh,
        map: &PolyMeshMap,
        patch_i: usize,
        values: &[T],
    ) -> FoamResult<Option<Vec<T>>>;

    /// 重分布补丁值
    fn distribute_patch<T: FieldValue>(
        mesh: &PolyMesh,
        map: &PolyDistributionMap,
        patch_i: usize,
        values: &[T],
    ) -> FoamResult<Option<Vec<T>>>;
}

// ============================================================
// VolMesh
// ============================================================

/// 单元中心场
#[derive(Debug, Clone, Copy, Default)]
pub struct VolMesh;

impl GeoMesh for VolMesh {
    type Mesh = PolyMesh;
    const NAME: &'static str = "vol";

    fn size(mesh: &PolyMesh) -> usize {
        mesh.n_cells()
    }

    fn map_topo_change<T: FieldValue>(
        _mesh: &PolyMesh,
        map: &PolyTopoChangeMap,
        values: &[T],
    ) -> FoamResult<Option<Vec<T>>> {
        map.map_cell_values(values, &T::zero()).map(Some)
    }

    fn map_mesh<T: FieldValue>(
        _mesh: &PolyMesh,
        map: &PolyMeshMap,
        values: &[T],
    ) -> FoamResult<Option<Vec<T>>> {
        map.map_cell_values(values).map(Some)
    }

    fn distribute<T: FieldValue>(
        _mesh: &PolyMesh,
        map: &PolyDistributionMap,
        values: &[T],
    ) -> FoamResult<Option<Vec<T>>> {
        map.distribute_cell_values(values).map(Some)
    }
}

impl BoundaryGeoMesh for VolMesh {
    fn patch_size(mesh: &PolyMesh, patch_i: usize) -> usize {
        mesh.boundary_mesh()[patch_i].size()
    }

    fn patch_normals(mesh: &PolyMesh, patch_i: usize) -> Option<Vec<DVec3>> {
        Some(mesh.patch_normals(patch_i))
    }

    fn patch_delta_coeffs(mesh: &PolyMesh, patch_i: usize) -> Vec<f64> {
        let cc = mesh.cell_centres();
        mesh.patch_normals(patch_i)
            .iter()
            .zip(mesh.patch_face_centres(patch_i))
            .zip(mesh.patch_face_cells(patch_i))
            .map(|((n, cf), c)| 1.0 / n.dot(*cf - cc[*c]).max(VSMALL))
            .collect()
    }

    fn patch_internal_addressing(mesh: &PolyMesh, patch_i: usize) -> Option<Vec<usize>> {
        Some(mesh.patch_face_cells(patch_i).to_vec())
    }

    fn map_patch_topo_change<T: FieldValue>(
        mesh: &PolyMesh,
        map: &PolyTopoChangeMap,
        patch_i: usize,
        values: &[T],
    ) -> FoamResult<Option<Vec<T>>> {
        map_face_patch(mesh, map, patch_i, values)
    }

    fn map_patch_mesh<T: FieldValue>(
        _mesh: &PolyMesh,
        map: &PolyMeshMap,
        patch_i: usize,
        values: &[T],
    ) -> FoamResult<Option<Vec<T>>> {
        Ok(map.map_patch_values(patch_i, values))
    }

    fn distribute_patch<T: FieldValue>(
        _mesh: &PolyMesh,
        map: &PolyDistributionMap,
        patch_i: usize,
        values: &[T],
    ) -> FoamResult<Option<Vec<T>>> {
        map.distribute_patch_values(patch_i, values).map(Some)
    }
}

// ============================================================
// SurfaceMesh
// ============================================================

/// 面心场（内部值在内部面上）
#[derive(Debug, Clone, Copy, Default)]
pub struct SurfaceMesh;

impl GeoMesh for SurfaceMesh {
    type Mesh = PolyMesh;
    const NAME: &'static str = "surface";

    fn size(mesh: &PolyMesh) -> usize {
        mesh.n_internal_faces()
    }

    fn map_topo_change<T: FieldValue>(
        mesh: &PolyMesh,
        map: &PolyTopoChangeMap,
        values: &[T],
    ) -> FoamResult<Option<Vec<T>>> {
        map.map_internal_face_values(values, mesh.n_internal_faces(), T::zero())
            .map(Some)
    }

    fn map_mesh<T: FieldValue>(
        _mesh: &PolyMesh,
        map: &PolyMeshMap,
        values: &[T],
    ) -> FoamResult<Option<Vec<T>>> {
        map.map_internal_face_values(values).map(Some)
    }

    fn distribute<T: FieldValue>(
        mesh: &PolyMesh,
        map: &PolyDistributionMap,
        values: &[T],
    ) -> FoamResult<Option<Vec<T>>> {
        // 面重分布表覆盖全部面；内部面在前，补齐后重分布再截取
        let n_old = map
            .faces
            .sub_map
            .iter()
            .flatten()
            .max()
            .map_or(0, |m| m + 1)
            .max(values.len());
        let mut padded = values.to_vec();
        padded.resize(n_old, T::zero());
        let mut out = map.distribute_face_values(&padded)?;
        out.truncate(mesh.n_internal_faces());
        Ok(Some(out))
    }
}

impl BoundaryGeoMesh for SurfaceMesh {
    fn patch_size(mesh: &PolyMesh, patch_i: usize) -> usize {
        mesh.boundary_mesh()[patch_i].size()
    }

    fn patch_normals(mesh: &PolyMesh, patch_i: usize) -> Option<Vec<DVec3>> {
        Some(mesh.patch_normals(patch_i))
    }

    fn patch_internal_addressing(_mesh: &PolyMesh, _patch_i: usize) -> Option<Vec<usize>> {
        None
    }

    fn map_patch_topo_change<T: FieldValue>(
        mesh: &PolyMesh,
        map: &PolyTopoChangeMap,
        patch_i: usize,
        values: &[T],
    ) -> FoamResult<Option<Vec<T>>> {
        map_face_patch(mesh, map, patch_i, values)
    }

    fn map_patch_mesh<T: FieldValue>(
        _mesh: &PolyMesh,
        map: &PolyMeshMap,
        patch_i: usize,
        values: &[T],
    ) -> FoamResult<Option<Vec<T>>> {
        Ok(map.map_patch_values(patch_i, values))
    }

    fn distribute_patch<T: FieldValue>(
        _mesh: &PolyMesh,
        map: &PolyDistributionMap,
        patch_i: usize,
        values: &[T],
    ) -> FoamResult<Option<Vec<T>>> {
        map.distribute_patch_values(patch_i, values).map(Some)
    }
}

// ============================================================
// PointMesh
// ============================================================

/// 点场
#[derive(Debug, Clone, Copy, Default)]
pub struct PointMesh;

impl GeoMesh for PointMesh {
    type Mesh = PolyMesh;
    const NAME: &'static str = "point";

    fn size(mesh: &PolyMesh) -> usize {
        mesh.n_points()
    }

    fn map_topo_change<T: FieldValue>(
        _mesh: &PolyMesh,
        map: &PolyTopoChangeMap,
        values: &[T],
    ) -> FoamResult<Option<Vec<T>>> {
        map.map_point_values(values, &T::zero()).map(Some)
    }

    fn map_mesh<T: FieldValue>(
        _mesh: &PolyMesh,
        map: &PolyMeshMap,
        values: &[T],
    ) -> FoamResult<Option<Vec<T>>> {
        map.map_point_values(values).map(Some)
    }

    fn distribute<T: FieldValue>(
        _mesh: &PolyMesh,
        map: &PolyDistributionMap,
        values: &[T],
    ) -> FoamResult<Option<Vec<T>>> {
        map.distribute_point_values(values).map(Some)
    }
}

impl BoundaryGeoMesh for PointMesh {
    const PATCH_VALUES_IN_INTERNAL: bool = true;

    fn patch_size(mesh: &PolyMesh, patch_i: usize) -> usize {
        mesh.patch_points(patch_i).len()
    }

    fn patch_internal_addressing(mesh: &PolyMesh, patch_i: usize) -> Option<Vec<usize>> {
        Some(mesh.patch_points(patch_i))
    }

    // 补丁点值随内部点值重新求得
    fn map_patch_topo_change<T: FieldValue>(
        _mesh: &PolyMesh,
        _map: &PolyTopoChangeMap,
        _patch_i: usize,
        _values: &[T],
    ) -> FoamResult<Option<Vec<T>>> {
        Ok(None)
    }

    fn map_patch_mesh<T: FieldValue>(
        _mesh: &PolyMesh,
        _map: &PolyMeshMap,
        _patch_i: usize,
        _values: &[T],
    ) -> FoamResult<Option<Vec<T>>> {
        Ok(None)
    }

    fn distribute_patch<T: FieldValue>(
        _mesh: &PolyMesh,
        _map: &PolyDistributionMap,
        _patch_i: usize,
        _values: &[T],
    ) -> FoamResult<Option<Vec<T>>> {
        Ok(None)
    }
}

fn map_face_patch<T: FieldValue>(
    mesh: &PolyMesh,
    map: &PolyTopoChangeMap,
    patch_i: usize,
    values: &[T],
) -> FoamResult<Option<Vec<T>>> {
    let patch = &mesh.boundary_mesh()[patch_i];
    map.map_patch_values(patch_i, patch.start(), patch.size(), values, &T::zero())
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_mesh::BlockMesh;
    use fc_config::BlockMeshSpec;

    fn mesh() -> PolyMesh {
        BlockMesh::new(BlockMeshSpec::default()).generate("region0").unwrap()
    }

    #[test]
    fn test_sizes() {
        let m = mesh();
        assert_eq!(VolMesh::size(&m), 8);
        assert_eq!(SurfaceMesh::size(&m), 12);
        assert_eq!(PointMesh::size(&m), 27);
        assert_eq!(VolMesh::patch_size(&m, 0), 24);
        assert_eq!(PointMesh::patch_size(&m, 0), 26);
        assert!(SurfaceMesh::patch_internal_addressing(&m, 0).is_none());
    }

    #[test]
    fn test_patch_delta_coeffs() {
        // 单位立方体 2x2x2，单元中心到边界面距离 0.25
        let m = mesh();
        let d = VolMesh::patch_delta_coeffs(&m, 0);
        assert_eq!(d.len(), 24);
        assert!(d.iter().all(|v| (v - 4.0).abs() < 1e-12));
        assert_eq!(PointMesh::patch_delta_coeffs(&m, 0), vec![1.0; 26]);
        assert!(PointMesh::patch_normals(&m, 0).is_none());
    }

    #[test]
    fn test_identity_topo_change() {
        let m = mesh();
        let map = PolyTopoChangeMap::identity(m.old_sizes());
        let values: Vec<f64> = (0..8).map(|c| c as f64).collect();
        let mapped = VolMesh::map_topo_change(&m, &map, &values).unwrap().unwrap();
        assert_eq!(mapped, values);
    }

    #[test]
    fn test_surface_distribute_identity() {
        let m = mesh();
        let map = PolyDistributionMap::serial_identity(
            m.n_points(),
            m.n_faces(),
            m.n_cells(),
            &m.boundary_mesh().sizes(),
        );
        let values: Vec<f64> = (0..12).map(|f| f as f64).collect();
        let out = SurfaceMesh::distribute(&m, &map, &values).unwrap().unwrap();
        assert_eq!(out, values);
    }
}
