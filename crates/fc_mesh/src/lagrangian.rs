// crates/fc_mesh/src/lagrangian.rs

//! 拉格朗日粒子网格
//!
//! 粒子以所在单元和位置描述。注入、删除粒子时返回 [`DirectMap`]，
//! 粒子场据此重排；网格拓扑变化时粒子所在单元重新编号。

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use glam::DVec3;
use tracing::{debug, warn};

use fc_foundation::{
    DirectMap, FieldValue, FoamError, FoamResult, PolyDistributionMap, PolyMeshMap,
    PolyTopoChangeMap,
};

use crate::geo_mesh::GeoMesh;
use crate::mesh_region::MeshHandle;

/// 粒子
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// 所在单元
    pub cell: usize,
    /// 位置
    pub position: DVec3,
}

/// 拉格朗日网格
#[derive(Debug)]
pub struct LagrangianMesh {
    name: String,
    mesh: MeshHandle,
    particles: Vec<Particle>,
}

impl LagrangianMesh {
    /// 空云
    pub fn new(name: impl Into<String>, mesh: MeshHandle) -> Self {
        Self {
            name: name.into(),
            mesh,
            particles: Vec::new(),
        }
    }

    /// 名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 所在的多面体网格
    pub fn mesh(&self) -> &MeshHandle {
        &self.mesh
    }

    /// 粒子数
    pub fn size(&self) -> usize {
        self.particles.len()
    }

    /// 粒子
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// 注入粒子，追加在末尾
    pub fn inject(&mut self, new: Vec<Particle>) -> FoamResult<DirectMap> {
        let n_cells = self.mesh.borrow().n_cells();
        for p in &new {
            FoamError::check_index("particle cell", p.cell, n_cells)?;
        }
        let n_old = self.particles.len();
        let addressing = (0..n_old).map(Some).chain(new.iter().map(|_| None)).collect();
        self.particles.extend(new);
        debug!("{}: 注入后 {} 个粒子", self.name, self.particles.len());
        DirectMap::new(n_old, addressing)
    }

    /// 删除粒子，其余保持原有顺序
    pub fn remove(&mut self, indices: &BTreeSet<usize>) -> FoamResult<DirectMap> {
        let n_old = self.particles.len();
        if let Some(i) = indices.iter().find(|i| **i >= n_old) {
            return Err(FoamError::index_out_of_bounds("particle", *i, n_old));
        }
        let kept: Vec<usize> = (0..n_old).filter(|i| !indices.contains(i)).collect();
        self.particles = kept.iter().map(|i| self.particles[*i]).collect();
        DirectMap::new(n_old, kept.into_iter().map(Some).collect())
    }

    /// 网格拓扑变化后更新粒子所在单元
    ///
    /// 所在单元被删除的粒子改放到最近的单元中心所在单元。
    pub fn topo_change(&mut self, map: &PolyTopoChangeMap) -> FoamResult<()> {
        let mesh = self.mesh.borrow();
        let reverse = map.reverse_cell_map();
        let mut relocated = 0;
        for p in &mut self.particles {
            match reverse.get(p.cell).copied().flatten() {
                Some(c) => p.cell = c,
                None => {
                    p.cell = mesh.find_nearest_cell(p.position).ok_or_else(|| {
                        FoamError::invalid_mesh("拓扑变化后网格没有单元，无法放置粒子")
                    })?;
                    relocated += 1;
                }
            }
        }
        if relocated > 0 {
            warn!("{}: {} 个粒子所在单元被删除，已重新定位", self.name, relocated);
        }
        Ok(())
    }
}

/// 粒子场标记
#[derive(Debug, Clone, Copy, Default)]
pub struct LagrangianGeoMesh;

impl GeoMesh for LagrangianGeoMesh {
    type Mesh = LagrangianMesh;
    const NAME: &'static str = "lagrangian";

    fn size(mesh: &LagrangianMesh) -> usize {
        mesh.size()
    }

    // 多面体网格变化不改变粒子数
    fn map_topo_change<T: FieldValue>(
        _mesh: &LagrangianMesh,
        _map: &PolyTopoChangeMap,
        _values: &[T],
    ) -> FoamResult<Option<Vec<T>>> {
        Ok(None)
    }

    fn map_mesh<T: FieldValue>(
        _mesh: &LagrangianMesh,
        _map: &PolyMeshMap,
        _values: &[T],
    ) -> FoamResult<Option<Vec<T>>> {
        Ok(None)
    }

    fn distribute<T: FieldValue>(
        _mesh: &LagrangianMesh,
        _map: &PolyDistributionMap,
        _values: &[T],
    ) -> FoamResult<Option<Vec<T>>> {
        Ok(None)
    }
}

/// 共享的拉格朗日网格
pub type LagrangianHandle = Rc<RefCell<LagrangianMesh>>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_mesh::BlockMesh;
    use fc_config::BlockMeshSpec;

    fn cloud() -> LagrangianMesh {
        let mesh = BlockMesh::new(BlockMeshSpec::default()).generate("region0").unwrap();
        LagrangianMesh::new("cloud", Rc::new(RefCell::new(mesh)))
    }

    #[test]
    fn test_inject_and_remove() {
        let mut cloud = cloud();
        let map = cloud
            .inject(vec![
                Particle { cell: 0, position: DVec3::splat(0.25) },
                Particle { cell: 7, position: DVec3::splat(0.75) },
            ])
            .unwrap();
        assert_eq!(map.size(), 2);
        assert_eq!(map.addressing, vec![None, None]);

        let map = cloud
            .inject(vec![Particle { cell: 3, position: DVec3::new(0.75, 0.75, 0.25) }])
            .unwrap();
        assert_eq!(map.addressing, vec![Some(0), Some(1), None]);

        let map = cloud.remove(&[1].into_iter().collect()).unwrap();
        assert_eq!(map.addressing, vec![Some(0), Some(2)]);
        assert_eq!(cloud.size(), 2);
        assert_eq!(cloud.particles()[1].cell, 3);
    }

    #[test]
    fn test_inject_rejects_bad_cell() {
        let mut cloud = cloud();
        assert!(cloud
            .inject(vec![Particle { cell: 8, position: DVec3::ZERO }])
            .is_err());
        assert_eq!(cloud.size(), 0);
    }
}
