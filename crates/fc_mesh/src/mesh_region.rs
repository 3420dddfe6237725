// crates/fc_mesh/src/mesh_region.rs

//! MeshRegion - 网格区域
//!
//! 区域把一套网格和存放该网格上对象（场等）的注册表绑在一起，
//! 作为子注册表挂在 [`Time`](fc_registry::Time) 的根注册表下。
//!
//! 网格变化的顺序固定：先更新网格本身（区域、缓存、粒子所在单元），
//! 再通知注册表中的对象。对象收到通知时看到的已是新网格。

use std::cell::RefCell;
use std::rc::Rc;

use tracing::info;

use fc_foundation::{FoamResult, PolyDistributionMap, PolyMeshMap, PolyTopoChangeMap};
use fc_registry::{IoObject, MapStatus, ObjectRegistry, RegIoObject};

use crate::lagrangian::LagrangianHandle;
use crate::poly_mesh::PolyMesh;

/// 共享的多面体网格
pub type MeshHandle = Rc<RefCell<PolyMesh>>;

/// 网格区域
#[derive(Debug)]
pub struct MeshRegion {
    mesh: MeshHandle,
    db: ObjectRegistry,
    clouds: Vec<LagrangianHandle>,
}

impl MeshRegion {
    /// 在父注册表下创建区域，区域名取网格名
    pub fn new(parent: &ObjectRegistry, mesh: PolyMesh) -> Self {
        let db = parent.new_child(mesh.name());
        Self {
            mesh: Rc::new(RefCell::new(mesh)),
            db,
            clouds: Vec::new(),
        }
    }

    /// 网格句柄
    pub fn mesh(&self) -> &MeshHandle {
        &self.mesh
    }

    /// 区域注册表
    pub fn db(&self) -> &ObjectRegistry {
        &self.db
    }

    /// 区域注册表（可变）
    pub fn db_mut(&mut self) -> &mut ObjectRegistry {
        &mut self.db
    }

    /// 附加粒子云，网格拓扑变化时一并更新
    pub fn add_cloud(&mut self, cloud: LagrangianHandle) {
        self.clouds.push(cloud);
    }

    /// 移动网格点并通知对象，返回各面扫掠体积
    pub fn move_points(&mut self, new_points: Vec<glam::DVec3>) -> FoamResult<Vec<f64>> {
        let swept = self.mesh.borrow_mut().set_points(new_points)?;
        self.db.move_points()?;
        Ok(swept)
    }

    /// 拓扑变化：网格原始数据须已替换
    pub fn topo_change(&mut self, map: &PolyTopoChangeMap) -> FoamResult<Vec<String>> {
        self.mesh.borrow_mut().topo_change(map)?;
        for cloud in &self.clouds {
            cloud.borrow_mut().topo_change(map)?;
        }
        let unhandled = self.db.topo_change(map)?;
        info!(
            "区域 {} 拓扑变化: {} 单元, {} 个对象未处理",
            self.db.name(),
            map.n_cells(),
            unhandled.len()
        );
        Ok(unhandled)
    }

    /// 网格间映射
    pub fn map_mesh(&mut self, map: &PolyMeshMap) -> FoamResult<Vec<String>> {
        self.mesh.borrow_mut().map_mesh(map)?;
        self.db.map_mesh(map)
    }

    /// 重分布
    pub fn distribute(&mut self, map: &PolyDistributionMap) -> FoamResult<Vec<String>> {
        self.mesh.borrow_mut().distribute(map)?;
        self.db.distribute(map)
    }
}

impl RegIoObject for MeshRegion {
    fn io(&self) -> &IoObject {
        self.db.io()
    }

    fn io_mut(&mut self) -> &mut IoObject {
        self.db.io_mut()
    }

    fn type_name(&self) -> String {
        "polyMesh".into()
    }

    fn modified(&self) -> bool {
        false
    }

    fn as_registry(&self) -> Option<&ObjectRegistry> {
        Some(&self.db)
    }

    fn as_registry_mut(&mut self) -> Option<&mut ObjectRegistry> {
        Some(&mut self.db)
    }

    // 网格点须已由 `MeshRegion::move_points` 移动
    fn move_points(&mut self) -> FoamResult<MapStatus> {
        self.db.move_points()?;
        Ok(MapStatus::Handled)
    }

    fn topo_change(&mut self, map: &PolyTopoChangeMap) -> FoamResult<MapStatus> {
        MeshRegion::topo_change(self, map)?;
        Ok(MapStatus::Handled)
    }

    fn map_mesh(&mut self, map: &PolyMeshMap) -> FoamResult<MapStatus> {
        MeshRegion::map_mesh(self, map)?;
        Ok(MapStatus::Handled)
    }

    fn distribute(&mut self, map: &PolyDistributionMap) -> FoamResult<MapStatus> {
        MeshRegion::distribute(self, map)?;
        Ok(MapStatus::Handled)
    }
}
