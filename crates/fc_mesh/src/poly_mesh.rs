// crates/fc_mesh/src/poly_mesh.rs

//! PolyMesh - 多面体网格
//!
//! 面-单元拓扑：点坐标、面（点编号列表）、owner/neighbour 和边界补丁。
//!
//! # 约定
//!
//! - 内部面在前，编号 `[0, n_internal_faces)`；owner 与 neighbour 不要求有序，
//!   但不能相同
//! - 边界面在后，按补丁连续存放
//! - 面积矢量由 owner 指向 neighbour（边界面指向域外）
//!
//! # 按需缓存
//!
//! 几何量（面心、面积矢量、单元中心、体积、包围盒、求解方向、四面体基点）
//! 与派生寻址（单元面、单元邻接、点-单元、点-面、单元点、单元形状）均在首次
//! 访问时计算。点移动只清除几何缓存；拓扑变化清除全部缓存。

use std::collections::BTreeSet;
use std::fmt;

use glam::DVec3;
use tracing::{debug, warn};

use fc_foundation::{
    Demand, FoamError, FoamResult, OldMeshSizes, PolyDistributionMap, PolyMeshMap,
    PolyTopoChangeMap, VSMALL,
};

use crate::boundary_mesh::PolyBoundaryMesh;
use crate::cell_shape::{CellModel, CellShape};
use crate::error::{MeshError, MeshResult};
use crate::face::Face;
use crate::patch::{PatchKind, PolyPatch};
use crate::zones::{ZoneKind, ZoneMesh};

/// 闭合性检查的相对容差
const CLOSED_TOLERANCE: f64 = 1e-6;

/// 求解方向判定阈值
const DIRECTION_TOLERANCE: f64 = 1e-6;

// ============================================================
// 几何缓存
// ============================================================

/// 网格几何量
#[derive(Debug, Clone, Default)]
pub struct MeshGeometry {
    /// 面心
    pub face_centres: Vec<DVec3>,
    /// 面积矢量
    pub face_areas: Vec<DVec3>,
    /// 单元中心
    pub cell_centres: Vec<DVec3>,
    /// 单元体积
    pub cell_volumes: Vec<f64>,
}

/// 轴对齐包围盒
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundBox {
    /// 最小角点
    pub min: DVec3,
    /// 最大角点
    pub max: DVec3,
}

impl BoundBox {
    /// 由点集构造；空点集得到零盒
    pub fn from_points(points: &[DVec3]) -> Self {
        let mut iter = points.iter();
        let Some(first) = iter.next() else {
            return Self {
                min: DVec3::ZERO,
                max: DVec3::ZERO,
            };
        };
        let (min, max) = iter.fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Self { min, max }
    }

    /// 对角线
    pub fn span(&self) -> DVec3 {
        self.max - self.min
    }

    /// 中心
    pub fn centre(&self) -> DVec3 {
        0.5 * (self.min + self.max)
    }

    /// 是否包含点
    pub fn contains(&self, p: DVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

#[derive(Debug, Clone, Copy)]
struct Directions {
    geometric: [i8; 3],
    solution: [i8; 3],
}

/// 网格统计
#[derive(Debug, Clone)]
pub struct MeshStatistics {
    /// 点数
    pub n_points: usize,
    /// 面数
    pub n_faces: usize,
    /// 内部面数
    pub n_internal_faces: usize,
    /// 单元数
    pub n_cells: usize,
    /// 补丁数
    pub n_patches: usize,
    /// 总体积
    pub total_volume: f64,
    /// 最小单元体积
    pub min_cell_volume: f64,
    /// 最大单元体积
    pub max_cell_volume: f64,
    /// 包围盒
    pub bounds: BoundBox,
}

impl fmt::Display for MeshStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== 网格统计 ===")?;
        writeln!(f, "点数: {}", self.n_points)?;
        writeln!(
            f,
            "面数: {} (内部: {}, 边界: {})",
            self.n_faces,
            self.n_internal_faces,
            self.n_faces - self.n_internal_faces
        )?;
        writeln!(f, "单元数: {}", self.n_cells)?;
        writeln!(f, "补丁数: {}", self.n_patches)?;
        writeln!(f, "总体积: {:.6e}", self.total_volume)?;
        writeln!(
            f,
            "单元体积: [{:.6e}, {:.6e}]",
            self.min_cell_volume, self.max_cell_volume
        )?;
        write!(
            f,
            "包围盒: ({:.4}, {:.4}, {:.4}) -> ({:.4}, {:.4}, {:.4})",
            self.bounds.min.x,
            self.bounds.min.y,
            self.bounds.min.z,
            self.bounds.max.x,
            self.bounds.max.y,
            self.bounds.max.z
        )
    }
}

/// 网格检查结果
#[derive(Debug, Clone, Default)]
pub struct MeshCheck {
    /// 发现的问题
    pub issues: Vec<String>,
}

impl MeshCheck {
    /// 是否通过
    pub fn ok(&self) -> bool {
        self.issues.is_empty()
    }
}

// ============================================================
// PolyMesh
// ============================================================

/// 多面体网格
#[derive(Debug, Clone)]
pub struct PolyMesh {
    name: String,
    points: Vec<DVec3>,
    old_points: Option<Vec<DVec3>>,
    faces: Vec<Face>,
    owner: Vec<usize>,
    neighbour: Vec<usize>,
    n_cells: usize,
    boundary: PolyBoundaryMesh,
    point_zones: ZoneMesh,
    face_zones: ZoneMesh,
    cell_zones: ZoneMesh,
    moving: bool,
    topo_changing: bool,

    geometry: Demand<MeshGeometry>,
    bounds: Demand<BoundBox>,
    directions: Demand<Directions>,
    tet_base_pt_is: Demand<Vec<Option<usize>>>,

    cells: Demand<Vec<Vec<usize>>>,
    cell_cells: Demand<Vec<Vec<usize>>>,
    point_cells: Demand<Vec<Vec<usize>>>,
    point_faces: Demand<Vec<Vec<usize>>>,
    cell_points: Demand<Vec<Vec<usize>>>,
    cell_shapes: Demand<Vec<CellShape>>,
    edges: Demand<Vec<(usize, usize)>>,
}

/// 校验原始拓扑，返回单元数
fn check_primitives(
    n_points: usize,
    faces: &[Face],
    owner: &[usize],
    neighbour: &[usize],
) -> MeshResult<usize> {
    MeshError::check_size("owner", faces.len(), owner.len())?;
    if neighbour.len() > faces.len() {
        return Err(MeshError::topology(
            "primitives",
            format!("neighbour 长度 {} 超过面数 {}", neighbour.len(), faces.len()),
        ));
    }
    for (fi, f) in faces.iter().enumerate() {
        if f.len() < 3 {
            return Err(MeshError::topology("primitives", format!("面 {fi} 只有 {} 个点", f.len())));
        }
        if let Some(p) = f.points().iter().find(|p| **p >= n_points) {
            return Err(MeshError::topology(
                "primitives",
                format!("面 {fi} 引用点 {p}，点数为 {n_points}"),
            ));
        }
    }
    for (fi, (o, n)) in owner.iter().zip(neighbour).enumerate() {
        if o == n {
            return Err(MeshError::topology(
                "primitives",
                format!("内部面 {fi} 的 owner 与 neighbour 同为单元 {o}"),
            ));
        }
    }
    Ok(owner
        .iter()
        .chain(neighbour)
        .max()
        .map_or(0, |c| c + 1))
}

impl PolyMesh {
    /// 由原始拓扑构造
    pub fn new(
        name: impl Into<String>,
        points: Vec<DVec3>,
        faces: Vec<Face>,
        owner: Vec<usize>,
        neighbour: Vec<usize>,
        patches: Vec<PolyPatch>,
    ) -> MeshResult<Self> {
        let n_cells = check_primitives(points.len(), &faces, &owner, &neighbour)?;
        let boundary = PolyBoundaryMesh::new(patches);
        boundary.check_definition(neighbour.len(), faces.len())?;
        let mesh = Self {
            name: name.into(),
            points,
            old_points: None,
            faces,
            owner,
            neighbour,
            n_cells,
            boundary,
            point_zones: ZoneMesh::new(ZoneKind::Point),
            face_zones: ZoneMesh::new(ZoneKind::Face),
            cell_zones: ZoneMesh::new(ZoneKind::Cell),
            moving: false,
            topo_changing: false,
            geometry: Demand::new(),
            bounds: Demand::new(),
            directions: Demand::new(),
            tet_base_pt_is: Demand::new(),
            cells: Demand::new(),
            cell_cells: Demand::new(),
            point_cells: Demand::new(),
            point_faces: Demand::new(),
            cell_points: Demand::new(),
            cell_shapes: Demand::new(),
            edges: Demand::new(),
        };
        debug!(
            "网格 {}: {} 点, {} 面, {} 单元, {} 补丁",
            mesh.name,
            mesh.n_points(),
            mesh.n_faces(),
            mesh.n_cells,
            mesh.boundary.len()
        );
        Ok(mesh)
    }

    // ========================================================
    // 原始数据
    // ========================================================

    /// 名称（区域名）
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 点坐标
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// 上一次移动前的点坐标
    pub fn old_points(&self) -> Option<&[DVec3]> {
        self.old_points.as_deref()
    }

    /// 面
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// 面的 owner 单元
    pub fn owner(&self) -> &[usize] {
        &self.owner
    }

    /// 内部面的 neighbour 单元
    pub fn neighbour(&self) -> &[usize] {
        &self.neighbour
    }

    /// 点数
    #[inline]
    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    /// 面数
    #[inline]
    pub fn n_faces(&self) -> usize {
        self.faces.len()
    }

    /// 内部面数
    #[inline]
    pub fn n_internal_faces(&self) -> usize {
        self.neighbour.len()
    }

    /// 边界面数
    #[inline]
    pub fn n_boundary_faces(&self) -> usize {
        self.faces.len() - self.neighbour.len()
    }

    /// 单元数
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// 是否为内部面
    #[inline]
    pub fn is_internal_face(&self, face: usize) -> bool {
        face < self.neighbour.len()
    }

    /// 边界
    pub fn boundary_mesh(&self) -> &PolyBoundaryMesh {
        &self.boundary
    }

    /// 点区域
    pub fn point_zones(&self) -> &ZoneMesh {
        &self.point_zones
    }

    /// 点区域（可变）
    pub fn point_zones_mut(&mut self) -> &mut ZoneMesh {
        &mut self.point_zones
    }

    /// 面区域
    pub fn face_zones(&self) -> &ZoneMesh {
        &self.face_zones
    }

    /// 面区域（可变）
    pub fn face_zones_mut(&mut self) -> &mut ZoneMesh {
        &mut self.face_zones
    }

    /// 单元区域
    pub fn cell_zones(&self) -> &ZoneMesh {
        &self.cell_zones
    }

    /// 单元区域（可变）
    pub fn cell_zones_mut(&mut self) -> &mut ZoneMesh {
        &mut self.cell_zones
    }

    /// 点是否移动过
    pub fn moving(&self) -> bool {
        self.moving
    }

    /// 拓扑是否变化过
    pub fn topo_changing(&self) -> bool {
        self.topo_changing
    }

    /// 当前规模，作为拓扑变化映射的“旧网格”描述
    pub fn old_sizes(&self) -> OldMeshSizes {
        OldMeshSizes {
            n_points: self.n_points(),
            n_faces: self.n_faces(),
            n_internal_faces: self.n_internal_faces(),
            n_cells: self.n_cells,
            patch_starts: self.boundary.starts(),
            patch_sizes: self.boundary.sizes(),
        }
    }

    // ========================================================
    // 几何
    // ========================================================

    /// 几何量
    pub fn geometry(&self) -> &MeshGeometry {
        self.geometry.get_or_eval(|| self.calc_geometry())
    }

    /// 面心
    pub fn face_centres(&self) -> &[DVec3] {
        &self.geometry().face_centres
    }

    /// 面积矢量
    pub fn face_areas(&self) -> &[DVec3] {
        &self.geometry().face_areas
    }

    /// 单元中心
    pub fn cell_centres(&self) -> &[DVec3] {
        &self.geometry().cell_centres
    }

    /// 单元体积
    pub fn cell_volumes(&self) -> &[f64] {
        &self.geometry().cell_volumes
    }

    /// 几何缓存是否已计算
    pub fn has_geometry(&self) -> bool {
        self.geometry.is_evaluated()
    }

    fn calc_geometry(&self) -> MeshGeometry {
        let (face_centres, face_areas): (Vec<_>, Vec<_>) = self
            .faces
            .iter()
            .map(|f| f.centre_and_area(&self.points))
            .unzip();

        // 以面心平均值为估计中心，把单元分解为以各面为底的棱锥
        let mut c_est = vec![DVec3::ZERO; self.n_cells];
        let mut n_cell_faces = vec![0usize; self.n_cells];
        for (fi, fc) in face_centres.iter().enumerate() {
            c_est[self.owner[fi]] += *fc;
            n_cell_faces[self.owner[fi]] += 1;
            if let Some(&nei) = self.neighbour.get(fi) {
                c_est[nei] += *fc;
                n_cell_faces[nei] += 1;
            }
        }
        for (c, n) in c_est.iter_mut().zip(&n_cell_faces) {
            if *n > 0 {
                *c /= *n as f64;
            }
        }

        let mut cell_centres = vec![DVec3::ZERO; self.n_cells];
        let mut cell_volumes = vec![0.0; self.n_cells];
        for fi in 0..self.faces.len() {
            let (fc, fa) = (face_centres[fi], face_areas[fi]);
            let own = self.owner[fi];
            let pyr3 = fa.dot(fc - c_est[own]);
            cell_centres[own] += pyr3 * (0.75 * fc + 0.25 * c_est[own]);
            cell_volumes[own] += pyr3;
            if let Some(&nei) = self.neighbour.get(fi) {
                let pyr3 = fa.dot(c_est[nei] - fc);
                cell_centres[nei] += pyr3 * (0.75 * fc + 0.25 * c_est[nei]);
                cell_volumes[nei] += pyr3;
            }
        }
        for c in 0..self.n_cells {
            if cell_volumes[c].abs() > VSMALL {
                cell_centres[c] /= cell_volumes[c];
            } else {
                cell_centres[c] = c_est[c];
            }
            cell_volumes[c] /= 3.0;
        }

        MeshGeometry {
            face_centres,
            face_areas,
            cell_centres,
            cell_volumes,
        }
    }

    /// 包围盒
    pub fn bounds(&self) -> BoundBox {
        *self.bounds.get_or_eval(|| BoundBox::from_points(&self.points))
    }

    fn directions(&self) -> Directions {
        *self.directions.get_or_eval(|| {
            let mut n_empty = 0;
            let mut n_wedge = 0;
            let mut empty_dir = DVec3::ZERO;
            let mut wedge_dir = DVec3::ZERO;
            let areas = self.face_areas();
            for p in self.boundary.iter().filter(|p| p.size() > 0) {
                match p.kind() {
                    PatchKind::Empty => {
                        n_empty += 1;
                        empty_dir += areas[p.range()].iter().map(|a| a.abs()).sum::<DVec3>();
                    }
                    PatchKind::Wedge => {
                        n_wedge += 1;
                        let n = areas[p.range()].iter().sum::<DVec3>().normalize_or_zero();
                        wedge_dir += n.abs();
                    }
                    _ => {}
                }
            }

            let mut solution = [1i8; 3];
            if n_empty > 0 {
                let dir = empty_dir.normalize_or_zero();
                for (d, s) in solution.iter_mut().enumerate() {
                    *s = if dir[d] > DIRECTION_TOLERANCE { -1 } else { 1 };
                }
            }
            let mut geometric = solution;
            if n_wedge > 0 {
                let dir = wedge_dir.normalize_or_zero();
                for (d, g) in geometric.iter_mut().enumerate() {
                    *g = if dir[d] > DIRECTION_TOLERANCE { -1 } else { 1 };
                }
            }
            Directions {
                geometric,
                solution,
            }
        })
    }

    /// 几何方向：1 为有效方向，-1 为空或楔形方向
    pub fn geometric_d(&self) -> [i8; 3] {
        self.directions().geometric
    }

    /// 求解方向：1 为求解方向，-1 为空方向
    pub fn solution_d(&self) -> [i8; 3] {
        self.directions().solution
    }

    /// 几何维数
    pub fn n_geometric_d(&self) -> usize {
        self.geometric_d().iter().filter(|d| **d == 1).count()
    }

    /// 求解维数
    pub fn n_solution_d(&self) -> usize {
        self.solution_d().iter().filter(|d| **d == 1).count()
    }

    /// 每个面的四面体分解基点（面内局部编号）
    ///
    /// 选择第一个使所有以 owner 和 neighbour 中心为顶点的四面体体积为正的点；
    /// 不存在时为 `None`。
    pub fn tet_base_pt_is(&self) -> &[Option<usize>] {
        self.tet_base_pt_is.get_or_eval(|| {
            let cc = self.cell_centres();
            self.faces
                .iter()
                .enumerate()
                .map(|(fi, f)| {
                    let own_c = cc[self.owner[fi]];
                    let nei_c = self.neighbour.get(fi).map(|n| cc[*n]);
                    self.find_base_point(f, own_c, nei_c)
                })
                .collect()
        })
    }

    fn find_base_point(&self, f: &Face, own_c: DVec3, nei_c: Option<DVec3>) -> Option<usize> {
        let n = f.len();
        let pts = f.points();
        (0..n).find(|&base| {
            let pb = self.points[pts[base]];
            (1..n - 1).all(|j| {
                let pa = self.points[pts[(base + j) % n]];
                let pc = self.points[pts[(base + j + 1) % n]];
                let tri = 0.5 * (pa - pb).cross(pc - pb);
                let own_ok = tri.dot(pb - own_c) > 0.0;
                let nei_ok = nei_c.map_or(true, |c| tri.dot(c - pb) > 0.0);
                own_ok && nei_ok
            })
        })
    }

    /// 离点最近的单元中心
    pub fn find_nearest_cell(&self, p: DVec3) -> Option<usize> {
        self.cell_centres()
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.distance_squared(p).total_cmp(&b.distance_squared(p)))
            .map(|(i, _)| i)
    }

    // ========================================================
    // 派生寻址
    // ========================================================

    /// 单元的面
    pub fn cells(&self) -> &[Vec<usize>] {
        self.cells.get_or_eval(|| {
            let mut cells = vec![Vec::new(); self.n_cells];
            for (fi, &own) in self.owner.iter().enumerate() {
                cells[own].push(fi);
            }
            for (fi, &nei) in self.neighbour.iter().enumerate() {
                cells[nei].push(fi);
            }
            for c in &mut cells {
                c.sort_unstable();
            }
            cells
        })
    }

    /// 单元的相邻单元
    pub fn cell_cells(&self) -> &[Vec<usize>] {
        self.cell_cells.get_or_eval(|| {
            let mut cc = vec![Vec::new(); self.n_cells];
            for (fi, &nei) in self.neighbour.iter().enumerate() {
                let own = self.owner[fi];
                cc[own].push(nei);
                cc[nei].push(own);
            }
            for c in &mut cc {
                c.sort_unstable();
                c.dedup();
            }
            cc
        })
    }

    /// 点所在的面
    pub fn point_faces(&self) -> &[Vec<usize>] {
        self.point_faces.get_or_eval(|| {
            let mut pf = vec![Vec::new(); self.n_points()];
            for (fi, f) in self.faces.iter().enumerate() {
                for &p in f.points() {
                    pf[p].push(fi);
                }
            }
            pf
        })
    }

    /// 点所在的单元
    pub fn point_cells(&self) -> &[Vec<usize>] {
        self.point_cells.get_or_eval(|| {
            self.point_faces()
                .iter()
                .map(|faces| {
                    let set: BTreeSet<usize> = faces
                        .iter()
                        .flat_map(|&f| {
                            std::iter::once(self.owner[f]).chain(self.neighbour.get(f).copied())
                        })
                        .collect();
                    set.into_iter().collect()
                })
                .collect()
        })
    }

    /// 单元的点
    pub fn cell_points(&self) -> &[Vec<usize>] {
        self.cell_points.get_or_eval(|| {
            self.cells()
                .iter()
                .map(|faces| {
                    let set: BTreeSet<usize> = faces
                        .iter()
                        .flat_map(|&f| self.faces[f].points().iter().copied())
                        .collect();
                    set.into_iter().collect()
                })
                .collect()
        })
    }

    /// 单元形状
    pub fn cell_shapes(&self) -> &[CellShape] {
        self.cell_shapes.get_or_eval(|| {
            self.cells()
                .iter()
                .zip(self.cell_points())
                .map(|(faces, points)| {
                    let sizes: Vec<usize> = faces.iter().map(|&f| self.faces[f].len()).collect();
                    CellShape {
                        model: CellModel::classify(&sizes, points.len()),
                        points: points.clone(),
                    }
                })
                .collect()
        })
    }

    /// 网格边（点对升序，去重）
    pub fn edges(&self) -> &[(usize, usize)] {
        self.edges.get_or_eval(|| {
            let set: BTreeSet<(usize, usize)> = self
                .faces
                .iter()
                .flat_map(|f| f.edges().map(|(a, b)| (a.min(b), a.max(b))))
                .collect();
            set.into_iter().collect()
        })
    }

    /// 边数
    pub fn n_edges(&self) -> usize {
        self.edges().len()
    }

    // ========================================================
    // 补丁辅助
    // ========================================================

    /// 补丁面心
    pub fn patch_face_centres(&self, patch_i: usize) -> &[DVec3] {
        &self.face_centres()[self.boundary[patch_i].range()]
    }

    /// 补丁面积矢量
    pub fn patch_face_areas(&self, patch_i: usize) -> &[DVec3] {
        &self.face_areas()[self.boundary[patch_i].range()]
    }

    /// 补丁面相邻的单元
    pub fn patch_face_cells(&self, patch_i: usize) -> &[usize] {
        &self.owner[self.boundary[patch_i].range()]
    }

    /// 补丁面的单位法向
    pub fn patch_normals(&self, patch_i: usize) -> Vec<DVec3> {
        self.patch_face_areas(patch_i)
            .iter()
            .map(|a| a.normalize_or_zero())
            .collect()
    }

    /// 补丁上的网格点（升序）
    pub fn patch_points(&self, patch_i: usize) -> Vec<usize> {
        let set: BTreeSet<usize> = self.faces[self.boundary[patch_i].range()]
            .iter()
            .flat_map(|f| f.points().iter().copied())
            .collect();
        set.into_iter().collect()
    }

    // ========================================================
    // 缓存管理
    // ========================================================

    /// 清除几何缓存
    pub fn clear_geom(&mut self) {
        self.geometry.invalidate();
        self.bounds.invalidate();
        self.directions.invalidate();
        self.tet_base_pt_is.invalidate();
    }

    /// 清除派生寻址
    pub fn clear_addressing(&mut self) {
        self.cells.invalidate();
        self.cell_cells.invalidate();
        self.point_cells.invalidate();
        self.point_faces.invalidate();
        self.cell_points.invalidate();
        self.cell_shapes.invalidate();
        self.edges.invalidate();
        self.point_zones.clear_addressing();
        self.face_zones.clear_addressing();
        self.cell_zones.clear_addressing();
    }

    /// 清除全部缓存
    pub fn clear_out(&mut self) {
        self.clear_geom();
        self.clear_addressing();
    }

    // ========================================================
    // 网格变化
    // ========================================================

    /// 移动点，返回各面扫掠体积
    ///
    /// 实体数不变；旧坐标保留为 `old_points`，几何缓存失效。
    pub fn set_points(&mut self, new_points: Vec<DVec3>) -> MeshResult<Vec<f64>> {
        MeshError::check_size("points", self.n_points(), new_points.len())?;
        let swept = self
            .faces
            .iter()
            .map(|f| f.swept_vol(&self.points, &new_points))
            .collect();
        self.old_points = Some(std::mem::replace(&mut self.points, new_points));
        self.moving = true;
        self.clear_geom();
        Ok(swept)
    }

    /// 替换原始拓扑
    ///
    /// 补丁保留名称和类型，只更新范围。`valid_boundary` 为真时检查边界定义；
    /// 为假时调用方负责随后补上合法的边界。
    #[allow(clippy::too_many_arguments)]
    pub fn reset_primitives(
        &mut self,
        points: Option<Vec<DVec3>>,
        faces: Vec<Face>,
        owner: Vec<usize>,
        neighbour: Vec<usize>,
        patch_starts: &[usize],
        patch_sizes: &[usize],
        valid_boundary: bool,
    ) -> MeshResult<()> {
        let n_points = points.as_ref().map_or(self.n_points(), |p| p.len());
        let n_cells = check_primitives(n_points, &faces, &owner, &neighbour)?;
        self.boundary.reset(patch_starts, patch_sizes)?;
        if valid_boundary {
            self.boundary.check_definition(neighbour.len(), faces.len())?;
        }
        if let Some(points) = points {
            self.points = points;
        }
        self.faces = faces;
        self.owner = owner;
        self.neighbour = neighbour;
        self.n_cells = n_cells;
        self.clear_out();
        Ok(())
    }

    /// 拓扑变化通知：原始拓扑已由 [`reset_primitives`](Self::reset_primitives)
    /// 替换，这里更新区域和旧坐标并清除缓存
    pub fn topo_change(&mut self, map: &PolyTopoChangeMap) -> MeshResult<()> {
        MeshError::check_size("topo change points", self.n_points(), map.n_points())?;
        MeshError::check_size("topo change faces", self.n_faces(), map.n_faces())?;
        MeshError::check_size("topo change cells", self.n_cells, map.n_cells())?;

        let no_flip = BTreeSet::new();
        self.point_zones.topo_change(map.reverse_point_map(), &no_flip);
        self.face_zones
            .topo_change(map.reverse_face_map(), map.flip_face_flux());
        self.cell_zones.topo_change(map.reverse_cell_map(), &no_flip);

        if let Some(old) = self.old_points.take() {
            let mapped = map
                .point_map()
                .iter()
                .zip(&self.points)
                .map(|(src, current)| src.and_then(|p| old.get(p).copied()).unwrap_or(*current))
                .collect();
            self.old_points = Some(mapped);
        }
        self.topo_changing = true;
        self.clear_out();
        Ok(())
    }

    /// 网格间映射通知：网格已整体替换
    ///
    /// 超出新网格范围的区域被丢弃。
    pub fn map_mesh(&mut self, map: &PolyMeshMap) -> FoamResult<()> {
        map.validate()?;
        FoamError::check_size("mesh map cells", self.n_cells, map.cell_addressing.len())?;
        FoamError::check_size("mesh map points", self.n_points(), map.point_addressing.len())?;
        let (n_points, n_faces, n_cells) = (self.n_points(), self.n_faces(), self.n_cells);
        for (zones, n) in [
            (&mut self.point_zones, n_points),
            (&mut self.face_zones, n_faces),
            (&mut self.cell_zones, n_cells),
        ] {
            if let Err(msg) = zones.check(n) {
                warn!("网格映射后丢弃区域: {}", msg);
                *zones = ZoneMesh::new(zones.kind());
            }
        }
        self.old_points = None;
        self.moving = false;
        self.clear_out();
        Ok(())
    }

    /// 重分布通知：原始拓扑已替换为本进程的新部分，这里重分布区域
    pub fn distribute(&mut self, map: &PolyDistributionMap) -> FoamResult<()> {
        FoamError::check_size("distributed points", self.n_points(), map.points.construct_size)?;
        FoamError::check_size("distributed faces", self.n_faces(), map.faces.construct_size)?;
        FoamError::check_size("distributed cells", self.n_cells, map.cells.construct_size)?;
        self.point_zones.distribute(&map.points, map.my_proc)?;
        self.face_zones.distribute(&map.faces, map.my_proc)?;
        self.cell_zones.distribute(&map.cells, map.my_proc)?;
        self.old_points = None;
        self.clear_out();
        Ok(())
    }

    // ========================================================
    // 检查与统计
    // ========================================================

    /// 检查网格：拓扑范围、边界定义、区域、单元闭合性、正体积
    pub fn check_mesh(&self) -> MeshCheck {
        let mut check = MeshCheck::default();
        if let Err(e) = check_primitives(self.n_points(), &self.faces, &self.owner, &self.neighbour) {
            check.issues.push(e.to_string());
            return check;
        }
        if let Err(e) = self
            .boundary
            .check_definition(self.n_internal_faces(), self.n_faces())
        {
            check.issues.push(e.to_string());
        }
        for (zones, n) in [
            (&self.point_zones, self.n_points()),
            (&self.face_zones, self.n_faces()),
            (&self.cell_zones, self.n_cells),
        ] {
            if let Err(msg) = zones.check(n) {
                check.issues.push(msg);
            }
        }

        // 闭合性：每个单元外法向面积矢量之和为零
        let areas = self.face_areas();
        let mut sum_a = vec![DVec3::ZERO; self.n_cells];
        let mut sum_mag = vec![0.0; self.n_cells];
        for (fi, a) in areas.iter().enumerate() {
            sum_a[self.owner[fi]] += *a;
            sum_mag[self.owner[fi]] += a.length();
            if let Some(&nei) = self.neighbour.get(fi) {
                sum_a[nei] -= *a;
                sum_mag[nei] += a.length();
            }
        }
        let open: Vec<usize> = (0..self.n_cells)
            .filter(|&c| sum_a[c].length() > CLOSED_TOLERANCE * sum_mag[c].max(VSMALL))
            .collect();
        if !open.is_empty() {
            check
                .issues
                .push(format!("{} 个单元不闭合，首个: {}", open.len(), open[0]));
        }

        let negative: Vec<usize> = self
            .cell_volumes()
            .iter()
            .enumerate()
            .filter(|(_, v)| **v <= VSMALL)
            .map(|(c, _)| c)
            .collect();
        if !negative.is_empty() {
            check.issues.push(format!(
                "{} 个单元体积非正，首个: {}",
                negative.len(),
                negative[0]
            ));
        }

        for issue in &check.issues {
            warn!("网格 {}: {}", self.name, issue);
        }
        check
    }

    /// 统计信息
    pub fn statistics(&self) -> MeshStatistics {
        let vols = self.cell_volumes();
        MeshStatistics {
            n_points: self.n_points(),
            n_faces: self.n_faces(),
            n_internal_faces: self.n_internal_faces(),
            n_cells: self.n_cells,
            n_patches: self.boundary.len(),
            total_volume: vols.iter().sum(),
            min_cell_volume: vols.iter().copied().fold(f64::INFINITY, f64::min),
            max_cell_volume: vols.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            bounds: self.bounds(),
        }
    }
}
