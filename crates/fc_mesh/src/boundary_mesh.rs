// crates/fc_mesh/src/boundary_mesh.rs

//! 边界网格
//!
//! 补丁的有序集合。补丁按序首尾相接，覆盖 `[n_internal_faces, n_faces)`。

use std::collections::BTreeSet;
use std::ops::Index;

use crate::error::{MeshError, MeshResult};
use crate::patch::{PatchKind, PolyPatch};

/// 边界网格
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolyBoundaryMesh {
    patches: Vec<PolyPatch>,
}

impl PolyBoundaryMesh {
    /// 由补丁列表构造，补丁序号按位置重置
    pub fn new(mut patches: Vec<PolyPatch>) -> Self {
        for (i, p) in patches.iter_mut().enumerate() {
            p.set_index(i);
        }
        Self { patches }
    }

    /// 补丁数
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// 是否没有补丁
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// 全部补丁
    pub fn patches(&self) -> &[PolyPatch] {
        &self.patches
    }

    /// 迭代
    pub fn iter(&self) -> std::slice::Iter<'_, PolyPatch> {
        self.patches.iter()
    }

    /// 补丁名
    pub fn names(&self) -> Vec<String> {
        self.patches.iter().map(|p| p.name().to_string()).collect()
    }

    /// 补丁类型
    pub fn kinds(&self) -> Vec<PatchKind> {
        self.patches.iter().map(|p| p.kind()).collect()
    }

    /// 按名称查找补丁序号
    pub fn find_patch_id(&self, name: &str) -> Option<usize> {
        self.patches.iter().position(|p| p.name() == name)
    }

    /// 按名称查找补丁序号，不存在时报错
    pub fn find_index(&self, name: &str) -> MeshResult<usize> {
        self.find_patch_id(name)
            .ok_or_else(|| MeshError::PatchNotFound {
                name: name.to_string(),
                available: self.names(),
            })
    }

    /// 按名称或组名收集补丁序号
    pub fn patch_set(&self, names: &[&str]) -> BTreeSet<usize> {
        self.patches
            .iter()
            .filter(|p| names.iter().any(|n| p.name() == *n || p.in_group(n)))
            .map(|p| p.index())
            .collect()
    }

    /// 边界面总数
    pub fn n_faces(&self) -> usize {
        self.patches.iter().map(|p| p.size()).sum()
    }

    /// 第一个边界面
    pub fn start(&self) -> Option<usize> {
        self.patches.first().map(|p| p.start())
    }

    /// 全局面所在的补丁
    pub fn which_patch(&self, face: usize) -> Option<usize> {
        self.patches.iter().position(|p| p.range().contains(&face))
    }

    /// 各补丁起始面
    pub fn starts(&self) -> Vec<usize> {
        self.patches.iter().map(|p| p.start()).collect()
    }

    /// 各补丁面数
    pub fn sizes(&self) -> Vec<usize> {
        self.patches.iter().map(|p| p.size()).collect()
    }

    /// 检查定义：补丁连续、覆盖全部边界面、名称唯一、循环补丁配对
    pub fn check_definition(&self, n_internal_faces: usize, n_faces: usize) -> MeshResult<()> {
        let mut next = n_internal_faces;
        let mut names = BTreeSet::new();
        for p in &self.patches {
            if !names.insert(p.name()) {
                return Err(MeshError::boundary(format!("补丁名 '{}' 重复", p.name())));
            }
            if p.start() != next {
                return Err(MeshError::boundary(format!(
                    "补丁 '{}' 起始面 {} 不连续，期望 {}",
                    p.name(),
                    p.start(),
                    next
                )));
            }
            next += p.size();
        }
        if next != n_faces {
            return Err(MeshError::boundary(format!(
                "边界面止于 {next}，网格面数为 {n_faces}"
            )));
        }
        for p in self.patches.iter().filter(|p| p.kind() == PatchKind::Cyclic) {
            let nbr = p
                .neighbour_patch()
                .ok_or_else(|| MeshError::boundary(format!("循环补丁 '{}' 未指定配对补丁", p.name())))?;
            let nbr_i = self.find_index(nbr)?;
            let other = &self.patches[nbr_i];
            if other.kind() != PatchKind::Cyclic || other.neighbour_patch() != Some(p.name()) {
                return Err(MeshError::boundary(format!(
                    "循环补丁 '{}' 与 '{}' 未互相配对",
                    p.name(),
                    nbr
                )));
            }
            if other.size() != p.size() {
                return Err(MeshError::boundary(format!(
                    "循环补丁 '{}' ({}) 与 '{}' ({}) 面数不同",
                    p.name(),
                    p.size(),
                    nbr,
                    other.size()
                )));
            }
        }
        Ok(())
    }

    /// 重置补丁范围（拓扑变化后）
    pub fn reset(&mut self, starts: &[usize], sizes: &[usize]) -> MeshResult<()> {
        MeshError::check_size("patch starts", self.patches.len(), starts.len())?;
        MeshError::check_size("patch sizes", self.patches.len(), sizes.len())?;
        for (p, (s, n)) in self.patches.iter_mut().zip(starts.iter().zip(sizes)) {
            p.reset(*s, *n);
        }
        Ok(())
    }
}

impl Index<usize> for PolyBoundaryMesh {
    type Output = PolyPatch;

    fn index(&self, i: usize) -> &PolyPatch {
        &self.patches[i]
    }
}

impl<'a> IntoIterator for &'a PolyBoundaryMesh {
    type Item = &'a PolyPatch;
    type IntoIter = std::slice::Iter<'a, PolyPatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.patches.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundary() -> PolyBoundaryMesh {
        PolyBoundaryMesh::new(vec![
            PolyPatch::new("inlet", PatchKind::Patch, 4, 2).with_groups(vec!["ends".into()]),
            PolyPatch::new("outlet", PatchKind::Patch, 6, 2).with_groups(vec!["ends".into()]),
            PolyPatch::new("walls", PatchKind::Wall, 8, 3),
        ])
    }

    #[test]
    fn test_lookup() {
        let b = boundary();
        assert_eq!(b.find_patch_id("outlet"), Some(1));
        assert_eq!(b[2].index(), 2);
        assert!(b.find_index("missing").is_err());
        assert_eq!(b.which_patch(9), Some(2));
        assert_eq!(b.patch_set(&["ends"]).into_iter().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_check_definition() {
        let b = boundary();
        assert!(b.check_definition(4, 11).is_ok());
        assert!(b.check_definition(3, 11).is_err());
        assert!(b.check_definition(4, 12).is_err());
    }

    #[test]
    fn test_cyclic_pairing() {
        let b = PolyBoundaryMesh::new(vec![
            PolyPatch::new("left", PatchKind::Cyclic, 0, 2).with_neighbour_patch("right"),
            PolyPatch::new("right", PatchKind::Cyclic, 2, 2).with_neighbour_patch("left"),
        ]);
        assert!(b.check_definition(0, 4).is_ok());

        let unpaired = PolyBoundaryMesh::new(vec![
            PolyPatch::new("left", PatchKind::Cyclic, 0, 2).with_neighbour_patch("right"),
            PolyPatch::new("right", PatchKind::Cyclic, 2, 1).with_neighbour_patch("left"),
        ]);
        assert!(unpaired.check_definition(0, 3).is_err());
    }
}
