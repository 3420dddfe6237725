// crates/fc_mesh/src/patch.rs

//! 边界补丁
//!
//! 补丁是面列表中一段连续的边界面 `[start, start + size)`。约束类补丁
//! （empty、wedge、对称、循环、处理器）对其上的补丁场类型有强制要求。

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MeshError;

/// 补丁类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PatchKind {
    /// 普通补丁
    Patch,
    /// 壁面
    Wall,
    /// 降维方向上的空补丁
    Empty,
    /// 轴对称楔形
    Wedge,
    /// 平面对称
    SymmetryPlane,
    /// 一般对称
    Symmetry,
    /// 循环（周期）
    Cyclic,
    /// 处理器间边界
    Processor,
}

impl PatchKind {
    /// 全部类型
    pub const ALL: [PatchKind; 8] = [
        Self::Patch,
        Self::Wall,
        Self::Empty,
        Self::Wedge,
        Self::SymmetryPlane,
        Self::Symmetry,
        Self::Cyclic,
        Self::Processor,
    ];

    /// 运行时类型名
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Patch => "patch",
            Self::Wall => "wall",
            Self::Empty => "empty",
            Self::Wedge => "wedge",
            Self::SymmetryPlane => "symmetryPlane",
            Self::Symmetry => "symmetry",
            Self::Cyclic => "cyclic",
            Self::Processor => "processor",
        }
    }

    /// 是否为约束类型
    pub fn is_constraint(self) -> bool {
        !matches!(self, Self::Patch | Self::Wall)
    }

    /// 约束类型名（非约束类型返回 `None`）
    pub fn constraint_type(self) -> Option<&'static str> {
        self.is_constraint().then(|| self.type_name())
    }

    /// 是否与另一侧耦合
    pub fn is_coupled(self) -> bool {
        matches!(self, Self::Cyclic | Self::Processor)
    }
}

impl fmt::Display for PatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for PatchKind {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.type_name() == s)
            .ok_or_else(|| MeshError::UnknownPatchType {
                type_name: s.to_string(),
            })
    }
}

/// 边界补丁
#[derive(Debug, Clone, PartialEq)]
pub struct PolyPatch {
    name: String,
    kind: PatchKind,
    start: usize,
    size: usize,
    index: usize,
    groups: Vec<String>,
    neighbour_patch: Option<String>,
    neighbour_proc: Option<usize>,
}

impl PolyPatch {
    /// 构造
    pub fn new(name: impl Into<String>, kind: PatchKind, start: usize, size: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            start,
            size,
            index: 0,
            groups: Vec::new(),
            neighbour_patch: None,
            neighbour_proc: None,
        }
    }

    /// 设置补丁组
    pub fn with_groups(mut self, groups: Vec<String>) -> Self {
        self.groups = groups;
        self
    }

    /// 设置循环配对补丁
    pub fn with_neighbour_patch(mut self, name: impl Into<String>) -> Self {
        self.neighbour_patch = Some(name.into());
        self
    }

    /// 设置处理器补丁的相邻进程
    pub fn with_neighbour_proc(mut self, proc: usize) -> Self {
        self.neighbour_proc = Some(proc);
        self
    }

    /// 名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 类型
    pub fn kind(&self) -> PatchKind {
        self.kind
    }

    /// 类型名
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// 起始面
    pub fn start(&self) -> usize {
        self.start
    }

    /// 面数
    pub fn size(&self) -> usize {
        self.size
    }

    /// 面编号范围
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.size
    }

    /// 在边界中的序号
    pub fn index(&self) -> usize {
        self.index
    }

    /// 补丁组
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// 是否属于组
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    /// 循环配对补丁
    pub fn neighbour_patch(&self) -> Option<&str> {
        self.neighbour_patch.as_deref()
    }

    /// 相邻进程
    pub fn neighbour_proc(&self) -> Option<usize> {
        self.neighbour_proc
    }

    /// 全局面编号转为补丁局部编号
    pub fn which_face(&self, face: usize) -> Option<usize> {
        self.range().contains(&face).then(|| face - self.start)
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub(crate) fn reset(&mut self, start: usize, size: usize) {
        self.start = start;
        self.size = size;
    }
}
