// apps/fc_cli/src/commands/validate.rs

//! 算例校验命令
//!
//! 依次检查配置、网格和全部场字典：场按字典构造、求一次边界值并注册。

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use tracing::{error, info, warn};

use fc_field::SelectableValue;
use fc_foundation::{DVec3, Tensor};

use super::{load_case, read_field, FieldSummary};

/// 校验参数
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// 算例配置文件
    #[arg(short, long)]
    pub config: PathBuf,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 校验结果
#[derive(Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn is_ok_strict(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// 执行校验命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== FoamCore 算例校验 ===");
    println!("检查算例: {}", args.config.display());

    let mut result = ValidationResult::default();
    let mut case = match load_case(&args.config) {
        Ok(case) => case,
        Err(e) => {
            result.add_error(format!("{e:#}"));
            return print_validation_result(&result, args.strict);
        }
    };
    println!("  ✓ 配置有效");

    let check = case.region.mesh().borrow().check_mesh();
    if check.ok() {
        println!("  ✓ 网格检查通过 ({} 单元)", case.region.mesh().borrow().n_cells());
    } else {
        for issue in check.issues {
            result.add_error(format!("网格: {issue}"));
        }
    }

    let instance = case.time.time_name();
    let switches = case.config.debug_switches.clone();
    for name in case.config.field_names() {
        let summary = case
            .config
            .field_dict(&name)
            .map_err(Into::into)
            .and_then(|dict| read_field(&mut case.region, &instance, &name, &dict, &switches));
        match summary {
            Ok(summary) => {
                check_placeholders(&summary, &mut result);
                print_summary(&summary);
            }
            Err(e) => result.add_error(format!("场 {name}: {e}")),
        }
    }

    print_validation_result(&result, args.strict)
}

/// 回退到占位类型的补丁记为警告
fn check_placeholders(summary: &FieldSummary, result: &mut ValidationResult) {
    let known = match summary.class.as_str() {
        c if c.ends_with("VectorField") => DVec3::patch_field_table().type_names(),
        c if c.ends_with("TensorField") => Tensor::patch_field_table().type_names(),
        _ => f64::patch_field_table().type_names(),
    };
    for (patch, type_name) in &summary.boundary {
        if !known.contains(type_name) {
            result.add_warning(format!(
                "场 {} 补丁 {}: 类型 {} 未知, 已按 generic 读入",
                summary.name, patch, type_name
            ));
        }
    }
}

fn print_summary(summary: &FieldSummary) {
    println!(
        "  ✓ {} {} {} ({} 值)",
        summary.class, summary.name, summary.dimensions, summary.size
    );
    for (patch, type_name) in &summary.boundary {
        println!("      {patch:<12} {type_name}");
    }
    for (source, type_name) in &summary.sources {
        println!("      源 {source:<10} {type_name}");
    }
}

fn print_validation_result(result: &ValidationResult, strict: bool) -> Result<()> {
    println!("\n=== 校验结果 ===");

    for msg in &result.errors {
        error!("{msg}");
        println!("  ✗ {msg}");
    }
    for msg in &result.warnings {
        warn!("{msg}");
        println!("  ! {msg}");
    }

    let passed = if strict {
        result.is_ok_strict()
    } else {
        result.is_ok()
    };
    if !passed {
        bail!(
            "校验失败: {} 个错误, {} 个警告",
            result.errors.len(),
            result.warnings.len()
        );
    }
    println!("  ✓ 校验通过");
    Ok(())
}
