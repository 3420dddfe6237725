// crates/fc_config/src/case_config.rs

//! CaseConfig - 算例配置
//!
//! 一个算例由时间控制、调试开关、注册表策略、块网格描述和若干场字典组成，
//! 整体以 JSON 文件给出。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::dictionary::Dictionary;
use crate::error::{ConfigError, ConfigResult};
use crate::switches::{DebugSwitches, ReadPropagation};

/// 算例配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseConfig {
    /// 根目录
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// 算例名
    #[serde(default = "default_case_name")]
    pub case_name: String,

    /// 起始时间 [s]
    #[serde(default)]
    pub start_time: f64,

    /// 结束时间 [s]
    #[serde(default = "default_end_time")]
    pub end_time: f64,

    /// 时间步长 [s]
    #[serde(default = "default_delta_t")]
    pub delta_t: f64,

    /// 调试开关
    #[serde(default)]
    pub debug_switches: DebugSwitches,

    /// 需要缓存的临时对象名
    #[serde(default)]
    pub cache_temporary_objects: Vec<String>,

    /// 依赖重读的传播方式
    #[serde(default)]
    pub read_propagation: ReadPropagation,

    /// 事件计数上限
    #[serde(default = "default_event_limit")]
    pub event_limit: u64,

    /// 块网格
    #[serde(default)]
    pub mesh: BlockMeshSpec,

    /// 场字典，按场名
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

fn default_root_path() -> PathBuf { PathBuf::from(".") }
fn default_case_name() -> String { "case".into() }
fn default_end_time() -> f64 { 1.0 }
fn default_delta_t() -> f64 { 0.1 }
fn default_event_limit() -> u64 { u64::MAX }

impl Default for CaseConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            case_name: default_case_name(),
            start_time: 0.0,
            end_time: default_end_time(),
            delta_t: default_delta_t(),
            debug_switches: DebugSwitches::default(),
            cache_temporary_objects: Vec::new(),
            read_propagation: ReadPropagation::default(),
            event_limit: default_event_limit(),
            mesh: BlockMeshSpec::default(),
            fields: BTreeMap::new(),
        }
    }
}

impl CaseConfig {
    /// 从 JSON 文件读取并校验
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// 从 JSON 文本读取并校验
    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// 校验配置
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.delta_t > 0.0) {
            return Err(ConfigError::invalid_value(
                "deltaT",
                self.delta_t.to_string(),
                "必须为正",
            ));
        }
        if self.end_time < self.start_time {
            return Err(ConfigError::invalid_value(
                "endTime",
                self.end_time.to_string(),
                format!("不能早于 startTime = {}", self.start_time),
            ));
        }
        if self.event_limit < 2 {
            return Err(ConfigError::invalid_value(
                "eventLimit",
                self.event_limit.to_string(),
                "至少为 2",
            ));
        }
        if self.case_name.is_empty() {
            return Err(ConfigError::invalid_value("caseName", "", "不能为空"));
        }
        for (name, value) in &self.fields {
            if !value.is_object() {
                return Err(ConfigError::invalid_value(
                    format!("fields::{name}"),
                    value.to_string(),
                    "场字典必须是 JSON 对象",
                ));
            }
        }
        self.mesh.validate()
    }

    /// 场字典
    pub fn field_dict(&self, name: &str) -> ConfigResult<Dictionary> {
        let value = self
            .fields
            .get(name)
            .ok_or_else(|| ConfigError::missing("fields", name))?;
        Dictionary::from_value(name, value.clone())
    }

    /// 场名（有序）
    pub fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }
}

/// 盒子的侧面
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoxSide {
    /// x 最小
    XMin,
    /// x 最大
    XMax,
    /// y 最小
    YMin,
    /// y 最大
    YMax,
    /// z 最小
    ZMin,
    /// z 最大
    ZMax,
}

impl BoxSide {
    /// 全部侧面，按生成顺序
    pub const ALL: [BoxSide; 6] = [
        Self::XMin,
        Self::XMax,
        Self::YMin,
        Self::YMax,
        Self::ZMin,
        Self::ZMax,
    ];

    /// 法向方向下标
    pub fn axis(self) -> usize {
        match self {
            Self::XMin | Self::XMax => 0,
            Self::YMin | Self::YMax => 1,
            Self::ZMin | Self::ZMax => 2,
        }
    }

    /// 是否为最大侧
    pub fn is_max(self) -> bool {
        matches!(self, Self::XMax | Self::YMax | Self::ZMax)
    }
}

/// 块网格补丁描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchSpec {
    /// 补丁名
    pub name: String,
    /// 补丁类型（patch、wall、empty、symmetryPlane、wedge、cyclic ...）
    #[serde(rename = "type", default = "default_patch_type")]
    pub patch_type: String,
    /// 组成补丁的侧面
    pub sides: Vec<BoxSide>,
    /// 补丁组
    #[serde(default)]
    pub groups: Vec<String>,
    /// 循环补丁的配对补丁名
    #[serde(default)]
    pub neighbour_patch: Option<String>,
}

fn default_patch_type() -> String { "patch".into() }

/// 块网格描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockMeshSpec {
    /// 原点
    #[serde(default)]
    pub origin: [f64; 3],
    /// 边长
    #[serde(default = "default_lengths")]
    pub lengths: [f64; 3],
    /// 各方向单元数
    #[serde(default = "default_cells")]
    pub cells: [usize; 3],
    /// 补丁
    #[serde(default = "default_patches")]
    pub patches: Vec<PatchSpec>,
}

fn default_lengths() -> [f64; 3] { [1.0, 1.0, 1.0] }
fn default_cells() -> [usize; 3] { [2, 2, 2] }
fn default_patches() -> Vec<PatchSpec> {
    vec![PatchSpec {
        name: "walls".into(),
        patch_type: "wall".into(),
        sides: BoxSide::ALL.to_vec(),
        groups: Vec::new(),
        neighbour_patch: None,
    }]
}

impl Default for BlockMeshSpec {
    fn default() -> Self {
        Self {
            origin: [0.0; 3],
            lengths: default_lengths(),
            cells: default_cells(),
            patches: default_patches(),
        }
    }
}

impl BlockMeshSpec {
    /// 校验：边长为正、单元数为正、每个侧面恰好属于一个补丁、补丁名唯一
    pub fn validate(&self) -> ConfigResult<()> {
        for (d, l) in self.lengths.iter().enumerate() {
            if !(*l > 0.0) {
                return Err(ConfigError::invalid_value(
                    format!("mesh::lengths[{d}]"),
                    l.to_string(),
                    "必须为正",
                ));
            }
        }
        for (d, n) in self.cells.iter().enumerate() {
            if *n == 0 {
                return Err(ConfigError::invalid_value(
                    format!("mesh::cells[{d}]"),
                    "0",
                    "必须为正",
                ));
            }
        }
        let mut names = BTreeSet::new();
        let mut seen = BTreeSet::new();
        for patch in &self.patches {
            if !names.insert(patch.name.as_str()) {
                return Err(ConfigError::invalid_value(
                    "mesh::patches",
                    &patch.name,
                    "补丁名重复",
                ));
            }
            for side in &patch.sides {
                if !seen.insert(*side) {
                    return Err(ConfigError::invalid_value(
                        format!("mesh::patches::{}", patch.name),
                        format!("{side:?}"),
                        "侧面已属于其他补丁",
                    ));
                }
            }
        }
        if let Some(side) = BoxSide::ALL.iter().find(|s| !seen.contains(*s)) {
            return Err(ConfigError::invalid_value(
                "mesh::patches",
                format!("{side:?}"),
                "侧面未分配补丁",
            ));
        }
        Ok(())
    }

    /// 单元总数
    pub fn n_cells(&self) -> usize {
        self.cells.iter().product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = CaseConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mesh.n_cells(), 8);
    }

    #[test]
    fn test_from_json() {
        let config = CaseConfig::from_json_str(
            r#"{
                "caseName": "cavity",
                "deltaT": 0.01,
                "readPropagation": "transitive",
                "debugSwitches": { "disallowGenericPatchField": true },
                "mesh": {
                    "cells": [3, 2, 1],
                    "patches": [
                        { "name": "inlet", "sides": ["xMin"] },
                        { "name": "outlet", "sides": ["xMax"] },
                        { "name": "walls", "type": "wall", "sides": ["yMin", "yMax"] },
                        { "name": "frontAndBack", "type": "empty", "sides": ["zMin", "zMax"] }
                    ]
                },
                "fields": { "p": { "dimensions": "[0 2 -2 0 0]", "internalField": 0.0 } }
            }"#,
        )
        .unwrap();
        assert_eq!(config.case_name, "cavity");
        assert_eq!(config.read_propagation, ReadPropagation::Transitive);
        assert!(config.debug_switches.disallow_generic_patch_field);
        assert_eq!(config.mesh.patches[0].patch_type, "patch");
        let p = config.field_dict("p").unwrap();
        assert_eq!(p.scope(), "p");
        assert!(config.field_dict("U").is_err());
    }

    #[test]
    fn test_rejects_bad_delta_t() {
        let config = CaseConfig {
            delta_t: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unassigned_side() {
        let mut mesh = BlockMeshSpec::default();
        mesh.patches[0].sides.pop();
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_rejects_duplicate_side() {
        let mut mesh = BlockMeshSpec::default();
        mesh.patches.push(PatchSpec {
            name: "extra".into(),
            patch_type: "patch".into(),
            sides: vec![BoxSide::XMin],
            groups: vec![],
            neighbour_patch: None,
        });
        assert!(mesh.validate().is_err());
    }
}
