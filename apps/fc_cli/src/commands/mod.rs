// apps/fc_cli/src/commands/mod.rs

//! 子命令与共用的算例装载

pub mod info;
pub mod validate;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use fc_config::{CaseConfig, DebugSwitches, Dictionary};
use fc_field::{GeometricField, PatchField, SelectableValue};
use fc_foundation::{DVec3, FoamError, FoamResult, Tensor};
use fc_mesh::{BlockMesh, BoundaryGeoMesh, MeshRegion, PointMesh, SurfaceMesh, VolMesh};
use fc_registry::Time;

/// 装载后的算例
pub struct LoadedCase {
    /// 配置
    pub config: CaseConfig,
    /// 时间与根注册表
    pub time: Time,
    /// 默认区域
    pub region: MeshRegion,
}

/// 读取配置并生成网格
pub fn load_case(path: &Path) -> Result<LoadedCase> {
    let config = CaseConfig::from_file(path)
        .with_context(|| format!("无法读取算例配置 {}", path.display()))?;
    let time = Time::from_config(&config)?;
    let mesh = BlockMesh::new(config.mesh.clone())
        .generate("region0")
        .context("块网格生成失败")?;
    let region = MeshRegion::new(time.db(), mesh);
    Ok(LoadedCase {
        config,
        time,
        region,
    })
}

// ============================================================
// 场类型
// ============================================================

/// 命令行支持的几何场类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    /// 体标量场
    VolScalar,
    /// 体矢量场
    VolVector,
    /// 体张量场
    VolTensor,
    /// 面标量场
    SurfaceScalar,
    /// 点标量场
    PointScalar,
    /// 点矢量场
    PointVector,
}

impl FieldClass {
    /// 全部类型
    pub const ALL: [FieldClass; 6] = [
        Self::VolScalar,
        Self::VolVector,
        Self::VolTensor,
        Self::SurfaceScalar,
        Self::PointScalar,
        Self::PointVector,
    ];

    /// 场类型名
    pub fn type_name(self) -> &'static str {
        match self {
            Self::VolScalar => "volScalarField",
            Self::VolVector => "volVectorField",
            Self::VolTensor => "volTensorField",
            Self::SurfaceScalar => "surfaceScalarField",
            Self::PointScalar => "pointScalarField",
            Self::PointVector => "pointVectorField",
        }
    }

    /// 取 `class` 条目；缺省时按 `internalField` 的分量数推断体场类型
    pub fn from_dictionary(dict: &Dictionary) -> FoamResult<Self> {
        if let Some(class) = dict.lookup_opt::<String>("class")? {
            return Self::ALL
                .into_iter()
                .find(|c| c.type_name() == class)
                .ok_or_else(|| {
                    FoamError::unknown_type(
                        "field class",
                        class,
                        Self::ALL.iter().map(|c| c.type_name().to_string()).collect(),
                    )
                });
        }
        let sample = match dict.get("internalField") {
            Some(Value::Object(entry)) => entry
                .get("uniform")
                .or_else(|| entry.get("nonuniform").and_then(|v| v.get(0))),
            other => other,
        };
        match sample {
            Some(Value::Number(_)) => Ok(Self::VolScalar),
            Some(Value::Array(a)) if a.len() == 3 => Ok(Self::VolVector),
            Some(Value::Array(a)) if a.len() == 9 => Ok(Self::VolTensor),
            _ => Err(FoamError::invalid_entry(
                dict.scope(),
                "internalField",
                "无法推断场类型, 请给出 class",
            )),
        }
    }
}

// ============================================================
// 场装载
// ============================================================

/// 已装载场的概要
#[derive(Debug, Clone)]
pub struct FieldSummary {
    /// 场名
    pub name: String,
    /// 场类型名
    pub class: String,
    /// 内部值个数
    pub size: usize,
    /// 量纲
    pub dimensions: String,
    /// 补丁名与补丁场类型
    pub boundary: Vec<(String, String)>,
    /// 场源名与类型；哨兵时为空
    pub sources: BTreeMap<String, String>,
}

/// 读取场字典、求边界值并注册到区域
pub fn read_field(
    region: &mut MeshRegion,
    instance: &str,
    name: &str,
    dict: &Dictionary,
    switches: &DebugSwitches,
) -> FoamResult<FieldSummary> {
    let class = FieldClass::from_dictionary(dict)?;
    match class {
        FieldClass::VolScalar => read_as::<f64, VolMesh>(region, instance, name, dict, switches),
        FieldClass::VolVector => read_as::<DVec3, VolMesh>(region, instance, name, dict, switches),
        FieldClass::VolTensor => read_as::<Tensor, VolMesh>(region, instance, name, dict, switches),
        FieldClass::SurfaceScalar => {
            read_as::<f64, SurfaceMesh>(region, instance, name, dict, switches)
        }
        FieldClass::PointScalar => read_as::<f64, PointMesh>(region, instance, name, dict, switches),
        FieldClass::PointVector => {
            read_as::<DVec3, PointMesh>(region, instance, name, dict, switches)
        }
    }
}

fn read_as<T: SelectableValue, G: BoundaryGeoMesh>(
    region: &mut MeshRegion,
    instance: &str,
    name: &str,
    dict: &Dictionary,
    switches: &DebugSwitches,
) -> FoamResult<FieldSummary> {
    let io = region.db().io_object(name, instance);
    let mut field =
        GeometricField::<T, G>::from_dictionary(io, region.mesh().clone(), dict, switches)?;
    field.correct_boundary_conditions()?;

    let summary = FieldSummary {
        name: name.to_string(),
        class: GeometricField::<T, G>::field_type_name(),
        size: field.values().len(),
        dimensions: field.dimensions().to_string(),
        boundary: field
            .boundary_field()
            .iter()
            .map(|pf| (pf.patch().name().to_string(), pf.type_name().to_string()))
            .collect(),
        sources: field.sources().types(),
    };
    region.db_mut().store(field)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_inference() {
        let d = Dictionary::from_json_str("U", r#"{"internalField": {"uniform": [0, 0, 0]}}"#)
            .unwrap();
        assert_eq!(FieldClass::from_dictionary(&d).unwrap(), FieldClass::VolVector);

        let d = Dictionary::from_json_str("p", r#"{"internalField": {"nonuniform": [1, 2]}}"#)
            .unwrap();
        assert_eq!(FieldClass::from_dictionary(&d).unwrap(), FieldClass::VolScalar);

        let d = Dictionary::from_json_str("d", r#"{"class": "pointVectorField"}"#).unwrap();
        assert_eq!(FieldClass::from_dictionary(&d).unwrap(), FieldClass::PointVector);

        let d = Dictionary::from_json_str("d", r#"{"class": "areaScalarField"}"#).unwrap();
        assert!(FieldClass::from_dictionary(&d).is_err());
    }

    #[test]
    fn test_read_field_registers_object() {
        let config = CaseConfig::from_json_str(
            r#"{
                "fields": {
                    "T": {
                        "dimensions": [0, 0, 0, 1, 0, 0, 0],
                        "internalField": {"uniform": 300.0},
                        "boundaryField": {"walls": {"type": "fixedValue", "value": {"uniform": 350.0}}}
                    }
                }
            }"#,
        )
        .unwrap();
        let time = Time::from_config(&config).unwrap();
        let mesh = BlockMesh::new(config.mesh.clone()).generate("region0").unwrap();
        let mut region = MeshRegion::new(time.db(), mesh);

        let dict = config.field_dict("T").unwrap();
        let summary = read_field(&mut region, "0", "T", &dict, &config.debug_switches).unwrap();
        assert_eq!(summary.class, "volScalarField");
        assert_eq!(summary.size, 8);
        assert_eq!(summary.boundary, vec![("walls".to_string(), "fixedValue".to_string())]);
        assert!(summary.sources.is_empty());
        assert!(region.db().contains("T"));
    }

    #[test]
    fn test_sample_case_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("cases/channel.json");
        let mut case = load_case(&path).unwrap();
        assert_eq!(case.region.mesh().borrow().n_cells(), 200);

        let switches = case.config.debug_switches.clone();
        for name in case.config.field_names() {
            let dict = case.config.field_dict(&name).unwrap();
            let summary = read_field(&mut case.region, "0", &name, &dict, &switches).unwrap();
            assert_eq!(summary.size, 200);
            assert_eq!(summary.boundary[3].1, "empty");
        }
        assert!(case.region.db().contains("f.1"));
    }
}
