// crates/fc_foundation/src/mapping.rs

//! 拓扑变化映射
//!
//! 网格拓扑变化（加密、合并、重排）、网格间映射和跨进程重分布由外部引擎产生映射对象，
//! 本模块只定义映射的数据表示及按映射重排数据的操作。注册在网格上的对象（区域、场）
//! 收到映射后自行调用这些操作更新数据。
//!
//! - [`PolyTopoChangeMap`]: 新旧编号的对应关系（新 -> 旧，带反向表）
//! - [`PolyMeshMap`]: 网格间映射，新单元由旧单元加权插值
//! - [`PolyDistributionMap`]: 重分布的发送/构造表
//! - [`DirectMap`]: 单一实体集合的直接映射（粒子注入/删除）
//!
//! 映射表中 `None` 表示新实体无来源（新增），由调用方提供的默认值填充。

use std::collections::BTreeSet;

use crate::error::{FoamError, FoamResult};
use crate::field_value::FieldValue;

/// 新 -> 旧 的地址表
pub type Addressing = Vec<Option<usize>>;

/// 加权地址表：每个新实体由若干 (旧实体, 权重) 插值
pub type WeightedAddressing = Vec<Vec<(usize, f64)>>;

/// 按地址表重排
pub fn map_list<T: Clone>(values: &[T], addressing: &[Option<usize>], default: &T) -> Vec<T> {
    addressing
        .iter()
        .map(|a| match a {
            Some(old) => values[*old].clone(),
            None => default.clone(),
        })
        .collect()
}

/// 由 新->旧 表求 旧->新 表；多个新实体来自同一旧实体时取第一个
pub fn reverse_addressing(addressing: &[Option<usize>], n_old: usize) -> Addressing {
    let mut reverse = vec![None; n_old];
    for (new_i, a) in addressing.iter().enumerate() {
        if let Some(old) = *a {
            if reverse[old].is_none() {
                reverse[old] = Some(new_i);
            }
        }
    }
    reverse
}

/// 按加权地址表插值
pub fn map_weighted<T: FieldValue>(values: &[T], addressing: &[Vec<(usize, f64)>]) -> Vec<T> {
    addressing
        .iter()
        .map(|stencil| {
            stencil
                .iter()
                .fold(T::zero(), |acc, (old, w)| acc + values[*old].scale(*w))
        })
        .collect()
}

fn check_addressing(name: &str, addressing: &[Option<usize>], n_old: usize) -> FoamResult<()> {
    match addressing.iter().flatten().find(|old| **old >= n_old) {
        Some(bad) => Err(FoamError::invalid_map(format!(
            "{name} 引用旧编号 {bad}, 旧实体数 {n_old}"
        ))),
        None => Ok(()),
    }
}

// ============================================================
// PolyTopoChangeMap
// ============================================================

/// 拓扑变化前的网格规模
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OldMeshSizes {
    /// 点数
    pub n_points: usize,
    /// 面数
    pub n_faces: usize,
    /// 内部面数
    pub n_internal_faces: usize,
    /// 单元数
    pub n_cells: usize,
    /// 各补丁起始面
    pub patch_starts: Vec<usize>,
    /// 各补丁面数
    pub patch_sizes: Vec<usize>,
}

/// 拓扑变化映射
#[derive(Debug, Clone)]
pub struct PolyTopoChangeMap {
    old: OldMeshSizes,
    point_map: Addressing,
    face_map: Addressing,
    cell_map: Addressing,
    reverse_point_map: Addressing,
    reverse_face_map: Addressing,
    reverse_cell_map: Addressing,
    flip_face_flux: BTreeSet<usize>,
}

impl PolyTopoChangeMap {
    /// 由 新->旧 表构造，反向表自动生成
    pub fn new(
        old: OldMeshSizes,
        point_map: Addressing,
        face_map: Addressing,
        cell_map: Addressing,
    ) -> FoamResult<Self> {
        check_addressing("pointMap", &point_map, old.n_points)?;
        check_addressing("faceMap", &face_map, old.n_faces)?;
        check_addressing("cellMap", &cell_map, old.n_cells)?;
        if old.patch_starts.len() != old.patch_sizes.len() {
            return Err(FoamError::invalid_map("旧补丁起始与大小列表长度不一致"));
        }
        let reverse_point_map = reverse_addressing(&point_map, old.n_points);
        let reverse_face_map = reverse_addressing(&face_map, old.n_faces);
        let reverse_cell_map = reverse_addressing(&cell_map, old.n_cells);
        Ok(Self {
            old,
            point_map,
            face_map,
            cell_map,
            reverse_point_map,
            reverse_face_map,
            reverse_cell_map,
            flip_face_flux: BTreeSet::new(),
        })
    }

    /// 恒等映射（拓扑未变，仅重建数据结构）
    pub fn identity(old: OldMeshSizes) -> Self {
        let point_map = (0..old.n_points).map(Some).collect::<Vec<_>>();
        let face_map = (0..old.n_faces).map(Some).collect::<Vec<_>>();
        let cell_map = (0..old.n_cells).map(Some).collect::<Vec<_>>();
        Self {
            reverse_point_map: point_map.clone(),
            reverse_face_map: face_map.clone(),
            reverse_cell_map: cell_map.clone(),
            point_map,
            face_map,
            cell_map,
            old,
            flip_face_flux: BTreeSet::new(),
        }
    }

    /// 标记翻转方向的（新）面
    pub fn with_flipped_faces(mut self, faces: impl IntoIterator<Item = usize>) -> Self {
        self.flip_face_flux.extend(faces);
        self
    }

    /// 旧网格规模
    pub fn old(&self) -> &OldMeshSizes {
        &self.old
    }

    /// 旧点数
    pub fn n_old_points(&self) -> usize {
        self.old.n_points
    }

    /// 旧面数
    pub fn n_old_faces(&self) -> usize {
        self.old.n_faces
    }

    /// 旧单元数
    pub fn n_old_cells(&self) -> usize {
        self.old.n_cells
    }

    /// 旧内部面数
    pub fn n_old_internal_faces(&self) -> usize {
        self.old.n_internal_faces
    }

    /// 新点数
    pub fn n_points(&self) -> usize {
        self.point_map.len()
    }

    /// 新面数
    pub fn n_faces(&self) -> usize {
        self.face_map.len()
    }

    /// 新单元数
    pub fn n_cells(&self) -> usize {
        self.cell_map.len()
    }

    /// 点 新->旧
    pub fn point_map(&self) -> &[Option<usize>] {
        &self.point_map
    }

    /// 面 新->旧
    pub fn face_map(&self) -> &[Option<usize>] {
        &self.face_map
    }

    /// 单元 新->旧
    pub fn cell_map(&self) -> &[Option<usize>] {
        &self.cell_map
    }

    /// 点 旧->新
    pub fn reverse_point_map(&self) -> &[Option<usize>] {
        &self.reverse_point_map
    }

    /// 面 旧->新
    pub fn reverse_face_map(&self) -> &[Option<usize>] {
        &self.reverse_face_map
    }

    /// 单元 旧->新
    pub fn reverse_cell_map(&self) -> &[Option<usize>] {
        &self.reverse_cell_map
    }

    /// 方向翻转的新面
    pub fn flip_face_flux(&self) -> &BTreeSet<usize> {
        &self.flip_face_flux
    }

    /// 拓扑是否真正改变
    pub fn morphing(&self) -> bool {
        let changed = |map: &[Option<usize>], n_old: usize| {
            map.len() != n_old || map.iter().enumerate().any(|(i, a)| *a != Some(i))
        };
        changed(&self.point_map, self.old.n_points)
            || changed(&self.face_map, self.old.n_faces)
            || changed(&self.cell_map, self.old.n_cells)
            || !self.flip_face_flux.is_empty()
    }

    /// 重排单元数据
    pub fn map_cell_values<T: Clone>(&self, values: &[T], default: &T) -> FoamResult<Vec<T>> {
        FoamError::check_size("cell values", self.old.n_cells, values.len())?;
        Ok(map_list(values, &self.cell_map, default))
    }

    /// 重排点数据
    pub fn map_point_values<T: Clone>(&self, values: &[T], default: &T) -> FoamResult<Vec<T>> {
        FoamError::check_size("point values", self.old.n_points, values.len())?;
        Ok(map_list(values, &self.point_map, default))
    }

    /// 重排内部面数据；翻转面上的值取反
    ///
    /// 只有来自旧内部面的新内部面继承旧值，其余取默认值。
    pub fn map_internal_face_values<T: FieldValue>(
        &self,
        values: &[T],
        n_new_internal_faces: usize,
        default: T,
    ) -> FoamResult<Vec<T>> {
        FoamError::check_size("internal face values", self.old.n_internal_faces, values.len())?;
        Ok((0..n_new_internal_faces)
            .map(|f| match self.face_map.get(f).copied().flatten() {
                Some(old) if old < self.old.n_internal_faces => {
                    if self.flip_face_flux.contains(&f) {
                        -values[old]
                    } else {
                        values[old]
                    }
                }
                _ => default,
            })
            .collect())
    }

    /// 补丁面映射：新补丁局部编号 -> 旧补丁局部编号
    ///
    /// 来自其他补丁或内部面的新面视为新增（`None`）。
    pub fn patch_face_map(&self, patch_i: usize, new_start: usize, new_size: usize) -> Addressing {
        let old_range = match (
            self.old.patch_starts.get(patch_i),
            self.old.patch_sizes.get(patch_i),
        ) {
            (Some(s), Some(n)) => *s..*s + *n,
            _ => return vec![None; new_size],
        };
        (new_start..new_start + new_size)
            .map(|f| {
                self.face_map
                    .get(f)
                    .copied()
                    .flatten()
                    .filter(|old| old_range.contains(old))
                    .map(|old| old - old_range.start)
            })
            .collect()
    }

    /// 重排补丁面数据
    pub fn map_patch_values<T: Clone>(
        &self,
        patch_i: usize,
        new_start: usize,
        new_size: usize,
        values: &[T],
        default: &T,
    ) -> FoamResult<Vec<T>> {
        if let Some(old_size) = self.old.patch_sizes.get(patch_i) {
            FoamError::check_size("patch values", *old_size, values.len())?;
        }
        Ok(map_list(
            values,
            &self.patch_face_map(patch_i, new_start, new_size),
            default,
        ))
    }

    /// 重编号一组旧编号（区域成员），丢弃已删除的实体
    pub fn renumber(reverse: &[Option<usize>], old_indices: &[usize]) -> Vec<usize> {
        old_indices
            .iter()
            .filter_map(|i| reverse.get(*i).copied().flatten())
            .collect()
    }
}

// ============================================================
// PolyMeshMap
// ============================================================

/// 网格间映射
#[derive(Debug, Clone, Default)]
pub struct PolyMeshMap {
    /// 旧单元数
    pub n_old_cells: usize,
    /// 旧点数
    pub n_old_points: usize,
    /// 旧内部面数
    pub n_old_internal_faces: usize,
    /// 新单元的插值模板
    pub cell_addressing: WeightedAddressing,
    /// 新点的插值模板
    pub point_addressing: WeightedAddressing,
    /// 新内部面的插值模板
    pub face_addressing: WeightedAddressing,
    /// 各补丁新面的插值模板（旧补丁局部编号）
    pub patch_addressing: Vec<WeightedAddressing>,
}

impl PolyMeshMap {
    fn check(name: &str, addressing: &WeightedAddressing, n_old: usize) -> FoamResult<()> {
        if addressing.iter().flatten().any(|(old, _)| *old >= n_old) {
            return Err(FoamError::invalid_map(format!("{name} 引用超出旧实体数 {n_old}")));
        }
        Ok(())
    }

    /// 校验地址表
    pub fn validate(&self) -> FoamResult<()> {
        Self::check("cellAddressing", &self.cell_addressing, self.n_old_cells)?;
        Self::check("pointAddressing", &self.point_addressing, self.n_old_points)?;
        Self::check("faceAddressing", &self.face_addressing, self.n_old_internal_faces)
    }

    /// 插值单元数据
    pub fn map_cell_values<T: FieldValue>(&self, values: &[T]) -> FoamResult<Vec<T>> {
        FoamError::check_size("cell values", self.n_old_cells, values.len())?;
        Ok(map_weighted(values, &self.cell_addressing))
    }

    /// 插值点数据
    pub fn map_point_values<T: FieldValue>(&self, values: &[T]) -> FoamResult<Vec<T>> {
        FoamError::check_size("point values", self.n_old_points, values.len())?;
        Ok(map_weighted(values, &self.point_addressing))
    }

    /// 插值内部面数据
    pub fn map_internal_face_values<T: FieldValue>(&self, values: &[T]) -> FoamResult<Vec<T>> {
        FoamError::check_size("internal face values", self.n_old_internal_faces, values.len())?;
        Ok(map_weighted(values, &self.face_addressing))
    }

    /// 插值补丁数据；没有模板的补丁返回 `None`
    pub fn map_patch_values<T: FieldValue>(&self, patch_i: usize, values: &[T]) -> Option<Vec<T>> {
        self.patch_addressing
            .get(patch_i)
            .map(|a| map_weighted(values, a))
    }
}

// ============================================================
// PolyDistributionMap
// ============================================================

/// 单类实体的重分布表
///
/// `sub_map[p]` 列出发送给进程 p 的本地元素；`construct_map[p]` 列出从进程 p 收到的
/// 第 i 个元素在新列表中的位置。
#[derive(Debug, Clone, Default)]
pub struct DistributionSchedule {
    /// 新列表长度
    pub construct_size: usize,
    /// 发送表
    pub sub_map: Vec<Vec<usize>>,
    /// 构造表
    pub construct_map: Vec<Vec<usize>>,
}

impl DistributionSchedule {
    /// 单进程下的恒等表
    pub fn identity(n: usize) -> Self {
        Self {
            construct_size: n,
            sub_map: vec![(0..n).collect()],
            construct_map: vec![(0..n).collect()],
        }
    }

    /// 本进程内执行重分布
    ///
    /// 只处理本进程到本进程的部分；存在跨进程交换时返回错误，
    /// 此时需要由并行通信层先完成交换。
    pub fn distribute<T: Clone>(&self, my_proc: usize, values: &[T]) -> FoamResult<Vec<T>> {
        for (p, (send, recv)) in self.sub_map.iter().zip(self.construct_map.iter()).enumerate() {
            if p != my_proc && (!send.is_empty() || !recv.is_empty()) {
                return Err(FoamError::invalid_map(format!(
                    "进程 {my_proc} 与进程 {p} 之间的交换需要并行通信"
                )));
            }
        }
        let send = self
            .sub_map
            .get(my_proc)
            .ok_or_else(|| FoamError::invalid_map(format!("缺少进程 {my_proc} 的发送表")))?;
        let recv = self
            .construct_map
            .get(my_proc)
            .ok_or_else(|| FoamError::invalid_map(format!("缺少进程 {my_proc} 的构造表")))?;
        FoamError::check_size("distribution self-exchange", send.len(), recv.len())?;

        let mut out: Vec<Option<T>> = vec![None; self.construct_size];
        for (src, dst) in send.iter().zip(recv.iter()) {
            let value = values
                .get(*src)
                .ok_or_else(|| FoamError::index_out_of_bounds("subMap", *src, values.len()))?;
            let slot = out
                .get_mut(*dst)
                .ok_or_else(|| FoamError::index_out_of_bounds("constructMap", *dst, self.construct_size))?;
            *slot = Some(value.clone());
        }
        out.into_iter()
            .enumerate()
            .map(|(i, v)| v.ok_or_else(|| FoamError::invalid_map(format!("新元素 {i} 未被构造"))))
            .collect()
    }
}

/// 重分布映射
#[derive(Debug, Clone, Default)]
pub struct PolyDistributionMap {
    /// 进程数
    pub n_procs: usize,
    /// 本进程号
    pub my_proc: usize,
    /// 点
    pub points: DistributionSchedule,
    /// 面
    pub faces: DistributionSchedule,
    /// 单元
    pub cells: DistributionSchedule,
    /// 各补丁面
    pub patch_faces: Vec<DistributionSchedule>,
}

impl PolyDistributionMap {
    /// 单进程下的恒等重分布
    pub fn serial_identity(
        n_points: usize,
        n_faces: usize,
        n_cells: usize,
        patch_sizes: &[usize],
    ) -> Self {
        Self {
            n_procs: 1,
            my_proc: 0,
            points: DistributionSchedule::identity(n_points),
            faces: DistributionSchedule::identity(n_faces),
            cells: DistributionSchedule::identity(n_cells),
            patch_faces: patch_sizes
                .iter()
                .map(|n| DistributionSchedule::identity(*n))
                .collect(),
        }
    }

    /// 重分布单元数据
    pub fn distribute_cell_values<T: Clone>(&self, values: &[T]) -> FoamResult<Vec<T>> {
        self.cells.distribute(self.my_proc, values)
    }

    /// 重分布点数据
    pub fn distribute_point_values<T: Clone>(&self, values: &[T]) -> FoamResult<Vec<T>> {
        self.points.distribute(self.my_proc, values)
    }

    /// 重分布面数据
    pub fn distribute_face_values<T: Clone>(&self, values: &[T]) -> FoamResult<Vec<T>> {
        self.faces.distribute(self.my_proc, values)
    }

    /// 重分布补丁面数据
    pub fn distribute_patch_values<T: Clone>(&self, patch_i: usize, values: &[T]) -> FoamResult<Vec<T>> {
        self.patch_faces
            .get(patch_i)
            .ok_or_else(|| FoamError::invalid_map(format!("缺少补丁 {patch_i} 的重分布表")))?
            .distribute(self.my_proc, values)
    }
}

// ============================================================
// DirectMap
// ============================================================

/// 单一实体集合的直接映射
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectMap {
    /// 旧实体数
    pub n_old: usize,
    /// 新 -> 旧
    pub addressing: Addressing,
}

impl DirectMap {
    /// 构造并校验
    pub fn new(n_old: usize, addressing: Addressing) -> FoamResult<Self> {
        check_addressing("directAddressing", &addressing, n_old)?;
        Ok(Self { n_old, addressing })
    }

    /// 新实体数
    pub fn size(&self) -> usize {
        self.addressing.len()
    }

    /// 重排数据
    pub fn apply<T: Clone>(&self, values: &[T], default: &T) -> FoamResult<Vec<T>> {
        FoamError::check_size("direct map values", self.n_old, values.len())?;
        Ok(map_list(values, &self.addressing, default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn old_sizes() -> OldMeshSizes {
        OldMeshSizes {
            n_points: 4,
            n_faces: 5,
            n_internal_faces: 2,
            n_cells: 3,
            patch_starts: vec![2, 4],
            patch_sizes: vec![2, 1],
        }
    }

    #[test]
    fn test_identity_not_morphing() {
        let map = PolyTopoChangeMap::identity(old_sizes());
        assert!(!map.morphing());
        assert_eq!(map.n_cells(), 3);
    }

    #[test]
    fn test_cell_removal() {
        // 删除单元 1
        let map = PolyTopoChangeMap::new(
            old_sizes(),
            (0..4).map(Some).collect(),
            (0..5).map(Some).collect(),
            vec![Some(0), Some(2)],
        )
        .unwrap();
        assert!(map.morphing());
        assert_eq!(map.reverse_cell_map(), &[Some(0), None, Some(1)]);
        let mapped = map.map_cell_values(&[10.0, 20.0, 30.0], &0.0).unwrap();
        assert_eq!(mapped, vec![10.0, 30.0]);
    }

    #[test]
    fn test_bad_addressing_rejected() {
        let r = PolyTopoChangeMap::new(old_sizes(), vec![Some(9)], vec![], vec![]);
        assert!(matches!(r, Err(FoamError::InvalidMap { .. })));
    }

    #[test]
    fn test_internal_face_flip() {
        let map = PolyTopoChangeMap::new(
            old_sizes(),
            (0..4).map(Some).collect(),
            vec![Some(1), Some(0), None, Some(2), Some(3), Some(4)],
            (0..3).map(Some).collect(),
        )
        .unwrap()
        .with_flipped_faces([1]);
        let mapped = map.map_internal_face_values(&[1.0, 2.0], 3, 0.0).unwrap();
        assert_eq!(mapped, vec![2.0, -1.0, 0.0]);
    }

    #[test]
    fn test_patch_face_map() {
        // 新补丁 0 从面 3 开始，含旧补丁面 2、3 以及一个新增面
        let map = PolyTopoChangeMap::new(
            old_sizes(),
            (0..4).map(Some).collect(),
            vec![Some(0), Some(1), None, Some(3), None, Some(2), Some(4)],
            (0..3).map(Some).collect(),
        )
        .unwrap();
        assert_eq!(map.patch_face_map(0, 3, 3), vec![Some(1), None, Some(0)]);
        assert_eq!(map.patch_face_map(1, 6, 1), vec![Some(0)]);
        assert_eq!(map.patch_face_map(2, 7, 2), vec![None, None]);
    }

    #[test]
    fn test_renumber() {
        let reverse = vec![Some(1), None, Some(0)];
        assert_eq!(PolyTopoChangeMap::renumber(&reverse, &[0, 1, 2]), vec![1, 0]);
    }

    #[test]
    fn test_mesh_map_weighted() {
        let map = PolyMeshMap {
            n_old_cells: 2,
            cell_addressing: vec![vec![(0, 0.5), (1, 0.5)], vec![(1, 1.0)], vec![]],
            ..Default::default()
        };
        let mapped = map.map_cell_values(&[2.0, 4.0]).unwrap();
        assert_eq!(mapped, vec![3.0, 4.0, 0.0]);
    }

    #[test]
    fn test_serial_distribution() {
        let schedule = DistributionSchedule {
            construct_size: 3,
            sub_map: vec![vec![2, 0, 1]],
            construct_map: vec![vec![0, 1, 2]],
        };
        let out = schedule.distribute(0, &['a', 'b', 'c']).unwrap();
        assert_eq!(out, vec!['c', 'a', 'b']);
    }

    #[test]
    fn test_distribution_rejects_remote() {
        let schedule = DistributionSchedule {
            construct_size: 1,
            sub_map: vec![vec![0], vec![1]],
            construct_map: vec![vec![0], vec![]],
        };
        assert!(schedule.distribute(0, &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_distribution_unfilled_rejected() {
        let schedule = DistributionSchedule {
            construct_size: 2,
            sub_map: vec![vec![0]],
            construct_map: vec![vec![0]],
        };
        assert!(schedule.distribute(0, &[1.0]).is_err());
    }

    #[test]
    fn test_direct_map() {
        let map = DirectMap::new(3, vec![Some(2), None]).unwrap();
        assert_eq!(map.apply(&[1, 2, 3], &0).unwrap(), vec![3, 0]);
        assert!(DirectMap::new(1, vec![Some(1)]).is_err());
    }
}
