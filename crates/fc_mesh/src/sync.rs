// crates/fc_mesh/src/sync.rs

//! 耦合边界同步
//!
//! 共享实体（耦合补丁两侧的点和面）上的值按合并操作取得一致：
//!
//! - 循环补丁：两侧在同一进程内，点按平移后坐标配对，面按补丁内序号配对
//! - 处理器补丁：通过 [`Pstream`] 与相邻进程交换
//!
//! 处理器补丁两侧的点、面顺序一致，交换数据按补丁顺序拼接。

use std::collections::BTreeMap;

use tracing::debug;

use fc_foundation::{FoamError, FoamResult};

use crate::patch::{PatchKind, PolyPatch};
use crate::poly_mesh::PolyMesh;

/// 点配对的相对容差（相对包围盒对角线）
const MATCH_TOLERANCE: f64 = 1e-6;

/// 进程间通信
pub trait Pstream {
    /// 进程数
    fn n_procs(&self) -> usize;

    /// 本进程号
    fn my_proc(&self) -> usize;

    /// 是否并行
    fn parallel(&self) -> bool {
        self.n_procs() > 1
    }

    /// 全交换：`send[p]` 发往进程 p，返回 `recv[p]` 为来自进程 p 的数据
    fn exchange<T: Clone>(&self, send: Vec<Vec<T>>) -> FoamResult<Vec<Vec<T>>>;
}

/// 单进程通信：只允许与自身交换
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialPstream;

impl Pstream for SerialPstream {
    fn n_procs(&self) -> usize {
        1
    }

    fn my_proc(&self) -> usize {
        0
    }

    fn exchange<T: Clone>(&self, send: Vec<Vec<T>>) -> FoamResult<Vec<Vec<T>>> {
        if send.len() != 1 {
            return Err(FoamError::invalid_map(format!(
                "单进程交换需要 1 个发送列表，实际 {}",
                send.len()
            )));
        }
        Ok(send)
    }
}

/// 耦合边界同步工具
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncTools;

impl SyncTools {
    /// 同步点值
    ///
    /// `values` 覆盖全部网格点。共享点上的值经 `combine` 合并后写回两侧。
    pub fn sync_point_list<T, P, F>(
        mesh: &PolyMesh,
        pstream: &P,
        values: &mut [T],
        combine: F,
    ) -> FoamResult<()>
    where
        T: Clone,
        P: Pstream,
        F: Fn(&mut T, &T),
    {
        FoamError::check_size("point values", mesh.n_points(), values.len())?;

        for (a, b) in cyclic_pairs(mesh)? {
            for (pa, pb) in match_cyclic_points(mesh, a, b)? {
                combine_pair(values, pa, pb, &combine);
            }
        }

        let procs: Vec<&PolyPatch> = processor_patches(mesh, pstream)?;
        if procs.is_empty() {
            return Ok(());
        }
        let patch_points: BTreeMap<usize, Vec<usize>> = procs
            .iter()
            .map(|p| (p.index(), mesh.patch_points(p.index())))
            .collect();
        exchange_and_combine(pstream, &procs, values, &combine, |patch| {
            patch_points[&patch.index()].clone()
        })
    }

    /// 同步边界面值
    ///
    /// `values` 按边界面编号（全局面编号减去内部面数）存放。
    pub fn sync_boundary_face_list<T, P, F>(
        mesh: &PolyMesh,
        pstream: &P,
        values: &mut [T],
        combine: F,
    ) -> FoamResult<()>
    where
        T: Clone,
        P: Pstream,
        F: Fn(&mut T, &T),
    {
        FoamError::check_size("boundary face values", mesh.n_boundary_faces(), values.len())?;
        let offset = mesh.n_internal_faces();
        let b = mesh.boundary_mesh();

        for (ai, bi) in cyclic_pairs(mesh)? {
            let (pa, pb) = (&b[ai], &b[bi]);
            for k in 0..pa.size() {
                combine_pair(values, pa.start() - offset + k, pb.start() - offset + k, &combine);
            }
        }

        let procs = processor_patches(mesh, pstream)?;
        if procs.is_empty() {
            return Ok(());
        }
        exchange_and_combine(pstream, &procs, values, &combine, |patch| {
            patch.range().map(|f| f - offset).collect()
        })
    }
}

fn combine_pair<T: Clone, F: Fn(&mut T, &T)>(values: &mut [T], a: usize, b: usize, combine: &F) {
    if a == b {
        return;
    }
    let mut merged = values[a].clone();
    combine(&mut merged, &values[b]);
    values[a] = merged.clone();
    values[b] = merged;
}

/// 循环补丁对，每对只列一次
fn cyclic_pairs(mesh: &PolyMesh) -> FoamResult<Vec<(usize, usize)>> {
    let b = mesh.boundary_mesh();
    let mut pairs = Vec::new();
    for p in b.iter().filter(|p| p.kind() == PatchKind::Cyclic) {
        let nbr = p
            .neighbour_patch()
            .ok_or_else(|| FoamError::invalid_mesh(format!("循环补丁 '{}' 未指定配对补丁", p.name())))?;
        let nbr_i = b.find_index(nbr)?;
        if p.index() < nbr_i {
            pairs.push((p.index(), nbr_i));
        }
    }
    Ok(pairs)
}

/// 按平移配对循环补丁两侧的点
fn match_cyclic_points(mesh: &PolyMesh, a: usize, b: usize) -> FoamResult<Vec<(usize, usize)>> {
    let centroid = |patch_i: usize| {
        let fc = mesh.patch_face_centres(patch_i);
        fc.iter().sum::<glam::DVec3>() / fc.len().max(1) as f64
    };
    let separation = centroid(b) - centroid(a);
    let tol = MATCH_TOLERANCE * mesh.bounds().span().length().max(1.0);

    let pts = mesh.points();
    let b_points = mesh.patch_points(b);
    let mut pairs = Vec::new();
    for pa in mesh.patch_points(a) {
        let target = pts[pa] + separation;
        let pb = b_points
            .iter()
            .copied()
            .find(|pb| pts[*pb].distance(target) < tol)
            .ok_or_else(|| {
                FoamError::invalid_mesh(format!(
                    "循环补丁 '{}' 的点 {} 在 '{}' 上没有对应点",
                    mesh.boundary_mesh()[a].name(),
                    pa,
                    mesh.boundary_mesh()[b].name()
                ))
            })?;
        pairs.push((pa, pb));
    }
    debug!(
        "循环补丁 {} <-> {}: {} 对点",
        mesh.boundary_mesh()[a].name(),
        mesh.boundary_mesh()[b].name(),
        pairs.len()
    );
    Ok(pairs)
}

fn processor_patches<'a, P: Pstream>(mesh: &'a PolyMesh, pstream: &P) -> FoamResult<Vec<&'a PolyPatch>> {
    let mut procs = Vec::new();
    for p in mesh
        .boundary_mesh()
        .iter()
        .filter(|p| p.kind() == PatchKind::Processor)
    {
        match p.neighbour_proc() {
            Some(q) if q < pstream.n_procs() && q != pstream.my_proc() => procs.push(p),
            other => {
                return Err(FoamError::invalid_mesh(format!(
                    "处理器补丁 '{}' 的相邻进程 {:?} 无效 (进程 {}/{})",
                    p.name(),
                    other,
                    pstream.my_proc(),
                    pstream.n_procs()
                )))
            }
        }
    }
    Ok(procs)
}

fn exchange_and_combine<T, P, F>(
    pstream: &P,
    procs: &[&PolyPatch],
    values: &mut [T],
    combine: &F,
    addressing: impl Fn(&PolyPatch) -> Vec<usize>,
) -> FoamResult<()>
where
    T: Clone,
    P: Pstream,
    F: Fn(&mut T, &T),
{
    let mut send: Vec<Vec<T>> = vec![Vec::new(); pstream.n_procs()];
    for p in procs {
        if let Some(q) = p.neighbour_proc() {
            send[q].extend(addressing(p).into_iter().map(|i| values[i].clone()));
        }
    }
    let recv = pstream.exchange(send)?;
    let mut cursor = vec![0usize; pstream.n_procs()];
    for p in procs {
        let Some(q) = p.neighbour_proc() else { continue };
        for i in addressing(p) {
            let other = recv
                .get(q)
                .and_then(|r| r.get(cursor[q]))
                .ok_or_else(|| FoamError::invalid_map(format!("来自进程 {q} 的数据不足")))?;
            combine(&mut values[i], other);
            cursor[q] += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_mesh::BlockMesh;
    use fc_config::{BlockMeshSpec, BoxSide, PatchSpec};

    fn cyclic_mesh() -> PolyMesh {
        let spec = BlockMeshSpec {
            cells: [3, 2, 2],
            lengths: [3.0, 1.0, 1.0],
            patches: vec![
                PatchSpec {
                    name: "left".into(),
                    patch_type: "cyclic".into(),
                    sides: vec![BoxSide::XMin],
                    groups: vec![],
                    neighbour_patch: Some("right".into()),
                },
                PatchSpec {
                    name: "right".into(),
                    patch_type: "cyclic".into(),
                    sides: vec![BoxSide::XMax],
                    groups: vec![],
                    neighbour_patch: Some("left".into()),
                },
                PatchSpec {
                    name: "walls".into(),
                    patch_type: "wall".into(),
                    sides: vec![BoxSide::YMin, BoxSide::YMax, BoxSide::ZMin, BoxSide::ZMax],
                    groups: vec![],
                    neighbour_patch: None,
                },
            ],
            ..Default::default()
        };
        BlockMesh::new(spec).generate("periodic").unwrap()
    }

    #[test]
    fn test_sync_point_list_cyclic() {
        let mesh = cyclic_mesh();
        let mut values: Vec<f64> = mesh.points().iter().map(|p| p.x).collect();
        SyncTools::sync_point_list(&mesh, &SerialPstream, &mut values, |a, b| *a = a.max(*b))
            .unwrap();
        // 两侧点都取到 x = 3
        for p in mesh.patch_points(0) {
            assert_eq!(values[p], 3.0);
        }
        // 内部点不变
        let interior = mesh.points().iter().position(|p| p.x == 1.0).unwrap();
        assert_eq!(values[interior], 1.0);
    }

    #[test]
    fn test_sync_boundary_faces_cyclic() {
        let mesh = cyclic_mesh();
        let mut values = vec![1.0; mesh.n_boundary_faces()];
        SyncTools::sync_boundary_face_list(&mesh, &SerialPstream, &mut values, |a, b| *a += *b)
            .unwrap();
        let left = &mesh.boundary_mesh()[0];
        let right = &mesh.boundary_mesh()[1];
        let off = mesh.n_internal_faces();
        assert_eq!(values[left.start() - off], 2.0);
        assert_eq!(values[right.start() - off], 2.0);
        // 壁面不受影响
        assert_eq!(*values.last().unwrap(), 1.0);
    }

    #[test]
    fn test_serial_exchange() {
        let recv = SerialPstream.exchange(vec![vec![1, 2]]).unwrap();
        assert_eq!(recv, vec![vec![1, 2]]);
        assert!(SerialPstream.exchange::<i32>(vec![vec![], vec![]]).is_err());
    }
}
