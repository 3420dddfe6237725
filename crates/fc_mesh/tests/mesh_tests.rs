//! crates/fc_mesh/tests/mesh_tests.rs
//!
//! 网格层集成测试
//!
//! - 点移动：实体数不变、扫掠体积
//! - 拓扑变化：单元重编号、面翻转、区域与粒子更新、对象通知顺序
//! - 网格检查：不闭合单元

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::DVec3;

use fc_config::{BlockMeshSpec, BoxSide, PatchSpec};
use fc_foundation::{FoamResult, PolyTopoChangeMap};
use fc_mesh::{
    BlockMesh, Face, LagrangianMesh, MeshHandle, MeshRegion, Particle, PolyMesh, Zone,
};
use fc_registry::{IoObject, MapStatus, RegIoObject, Time};

// ============================================================
// 辅助
// ============================================================

fn channel_spec() -> BlockMeshSpec {
    let patch = |name: &str, kind: &str, sides: Vec<BoxSide>| PatchSpec {
        name: name.into(),
        patch_type: kind.into(),
        sides,
        groups: vec![],
        neighbour_patch: None,
    };
    BlockMeshSpec {
        cells: [4, 2, 2],
        lengths: [2.0, 1.0, 1.0],
        patches: vec![
            patch("inlet", "patch", vec![BoxSide::XMin]),
            patch("outlet", "patch", vec![BoxSide::XMax]),
            patch("walls", "wall", vec![BoxSide::YMin, BoxSide::YMax]),
            patch("top", "patch", vec![BoxSide::ZMax]),
            patch("bottom", "wall", vec![BoxSide::ZMin]),
        ],
        ..Default::default()
    }
}

fn channel() -> PolyMesh {
    BlockMesh::new(channel_spec()).generate("region0").unwrap()
}

/// 记录收到拓扑变化通知时网格单元数的对象
struct MeshObserver {
    io: IoObject,
    mesh: MeshHandle,
    seen_cells: Cell<Option<usize>>,
    moves: Cell<usize>,
}

impl RegIoObject for MeshObserver {
    fn io(&self) -> &IoObject {
        &self.io
    }

    fn io_mut(&mut self) -> &mut IoObject {
        &mut self.io
    }

    fn type_name(&self) -> String {
        "observer".into()
    }

    fn move_points(&mut self) -> FoamResult<MapStatus> {
        self.moves.set(self.moves.get() + 1);
        Ok(MapStatus::Handled)
    }

    fn topo_change(&mut self, map: &PolyTopoChangeMap) -> FoamResult<MapStatus> {
        let n = self.mesh.borrow().n_cells();
        assert_eq!(n, map.n_cells());
        self.seen_cells.set(Some(n));
        Ok(MapStatus::Handled)
    }
}

/// 单元编号反转：c -> n-1-c。内部面的 owner/neighbour 交换，面反向。
fn reverse_cells(mesh: &mut PolyMesh) -> PolyTopoChangeMap {
    let old = mesh.old_sizes();
    let n = mesh.n_cells();
    let n_internal = mesh.n_internal_faces();
    let mut faces: Vec<Face> = mesh.faces().to_vec();
    let mut owner: Vec<usize> = mesh.owner().iter().map(|c| n - 1 - c).collect();
    let mut neighbour: Vec<usize> = mesh.neighbour().iter().map(|c| n - 1 - c).collect();
    for f in 0..n_internal {
        std::mem::swap(&mut owner[f], &mut neighbour[f]);
        faces[f] = faces[f].reversed();
    }
    let starts = mesh.boundary_mesh().starts();
    let sizes = mesh.boundary_mesh().sizes();
    mesh.reset_primitives(None, faces, owner, neighbour, &starts, &sizes, true)
        .unwrap();

    PolyTopoChangeMap::new(
        old.clone(),
        (0..old.n_points).map(Some).collect(),
        (0..old.n_faces).map(Some).collect(),
        (0..n).map(|c| Some(n - 1 - c)).collect(),
    )
    .unwrap()
    .with_flipped_faces(0..n_internal)
}

// ============================================================
// 点移动
// ============================================================

#[test]
fn test_set_points_keeps_entity_counts() {
    let mut mesh = channel();
    let before = (mesh.n_points(), mesh.n_faces(), mesh.n_internal_faces(), mesh.n_cells());
    let v0 = mesh.cell_volumes().to_vec();

    let h = 0.1;
    let moved: Vec<DVec3> = mesh.points().iter().map(|p| *p + DVec3::new(0.0, 0.0, h)).collect();
    let swept = mesh.set_points(moved).unwrap();

    let after = (mesh.n_points(), mesh.n_faces(), mesh.n_internal_faces(), mesh.n_cells());
    assert_eq!(before, after);
    assert_eq!(swept.len(), mesh.n_faces());

    // 整体平移体积不变
    for (a, b) in v0.iter().zip(mesh.cell_volumes()) {
        assert!((a - b).abs() < 1e-12);
    }

    // 扫掠体积 = h·A·n_z
    let top = mesh.boundary_mesh().find_patch_id("top").unwrap();
    let bottom = mesh.boundary_mesh().find_patch_id("bottom").unwrap();
    for f in mesh.boundary_mesh()[top].range() {
        let a = mesh.face_areas()[f];
        assert!((swept[f] - h * a.z).abs() < 1e-12);
        assert!(swept[f] > 0.0);
    }
    for f in mesh.boundary_mesh()[bottom].range() {
        assert!(swept[f] < 0.0);
    }
    // 侧面沿切向滑动
    let inlet = mesh.boundary_mesh().find_patch_id("inlet").unwrap();
    for f in mesh.boundary_mesh()[inlet].range() {
        assert!(swept[f].abs() < 1e-12);
    }
}

#[test]
fn test_region_move_points_notifies_objects() {
    let time = Time::new(".", "case");
    let mut region = MeshRegion::new(time.db(), channel());
    let observer = MeshObserver {
        io: region.db().io_object("observer", "0"),
        mesh: region.mesh().clone(),
        seen_cells: Cell::new(None),
        moves: Cell::new(0),
    };
    region.db_mut().store(observer).unwrap();

    let moved: Vec<DVec3> = region.mesh().borrow().points().iter().map(|p| *p * 1.5).collect();
    let swept = region.move_points(moved).unwrap();
    assert_eq!(swept.len(), region.mesh().borrow().n_faces());
    assert_eq!(region.db().lookup_object::<MeshObserver>("observer").unwrap().moves.get(), 1);
    assert!(region.mesh().borrow().moving());
}

// ============================================================
// 拓扑变化
// ============================================================

#[test]
fn test_topo_change_updates_zones_and_cloud() {
    let time = Time::new(".", "case");
    let mut mesh = channel();
    mesh.cell_zones_mut().add(Zone::new("porous", vec![0, 1]));
    let n_internal = mesh.n_internal_faces();
    mesh.face_zones_mut()
        .add(Zone::with_flip("baffle", vec![0], vec![false]));
    let old_volumes = mesh.cell_volumes().to_vec();
    let old_centres = mesh.cell_centres().to_vec();
    let n = mesh.n_cells();

    let mut region = MeshRegion::new(time.db(), mesh);
    let cloud = Rc::new(RefCell::new(LagrangianMesh::new("cloud", region.mesh().clone())));
    cloud
        .borrow_mut()
        .inject(vec![Particle { cell: 2, position: old_centres[2] }])
        .unwrap();
    region.add_cloud(cloud.clone());

    let map = reverse_cells(&mut region.mesh().borrow_mut());
    assert!(map.morphing());
    let unhandled = region.topo_change(&map).unwrap();
    assert!(unhandled.is_empty());

    let mesh = region.mesh().borrow();
    assert!(mesh.topo_changing());
    assert!(mesh.check_mesh().ok());
    assert_eq!(mesh.cell_zones().get("porous").unwrap().indices(), &[n - 1, n - 2]);
    let baffle = mesh.face_zones().get("baffle").unwrap();
    assert_eq!(baffle.indices(), &[0]);
    assert!(baffle.flipped(0));
    assert_eq!(cloud.borrow().particles()[0].cell, n - 3);
    for c in 0..n {
        assert!((mesh.cell_volumes()[c] - old_volumes[n - 1 - c]).abs() < 1e-12);
        assert!((mesh.cell_centres()[c] - old_centres[n - 1 - c]).length() < 1e-12);
    }
    assert!(n_internal > 0);
}

#[test]
fn test_objects_see_new_mesh_on_topo_change() {
    let mut time = Time::new(".", "case");
    let mut region = MeshRegion::new(time.db(), channel());
    let observer = MeshObserver {
        io: region.db().io_object("observer", "0"),
        mesh: region.mesh().clone(),
        seen_cells: Cell::new(None),
        moves: Cell::new(0),
    };
    region.db_mut().store(observer).unwrap();
    let handle = region.mesh().clone();
    time.db_mut().check_in(Box::new(region)).ok().unwrap();

    let map = reverse_cells(&mut handle.borrow_mut());
    // 经根注册表分派：区域先更新网格再通知对象
    let unhandled = time.db_mut().topo_change(&map).unwrap();
    assert!(unhandled.is_empty());
    let db = time.region("region0").unwrap();
    let observer = db.lookup_object::<MeshObserver>("observer").unwrap();
    assert_eq!(observer.seen_cells.get(), Some(16));
}

// ============================================================
// 网格检查
// ============================================================

#[test]
fn test_check_mesh_detects_open_cell() {
    let mesh = channel();
    let mut faces = mesh.faces().to_vec();
    let last = faces.len() - 1;
    faces[last] = faces[last].reversed();
    let patches = mesh.boundary_mesh().patches().to_vec();
    let broken = PolyMesh::new(
        "broken",
        mesh.points().to_vec(),
        faces,
        mesh.owner().to_vec(),
        mesh.neighbour().to_vec(),
        patches,
    )
    .unwrap();
    let check = broken.check_mesh();
    assert!(!check.ok());
    assert!(check.issues.iter().any(|i| i.contains("不闭合")));
}
