// apps/fc_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示运行时选择表和算例概要。

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use tracing::info;

use fc_config::DebugSwitches;
use fc_distribution::DISTRIBUTION_TYPES;
use fc_field::SelectableValue;
use fc_foundation::{DVec3, Tensor};

use super::load_case;

/// 信息显示参数
#[derive(Debug, Args)]
pub struct InfoArgs {
    /// 算例配置文件
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 显示运行时类型表
    #[arg(long)]
    pub types: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== FoamCore 信息 ===");

    if args.types || args.config.is_none() {
        print_type_tables();
    }

    if let Some(path) = &args.config {
        if args.types {
            println!();
        }
        print_case(path)?;
    }

    Ok(())
}

fn print_type_tables() {
    println!("=== 运行时类型表 ===");
    println!("FoamCore CLI 版本: {}", env!("CARGO_PKG_VERSION"));

    println!("\n补丁场类型:");
    println!("  scalar: {}", f64::patch_field_table().type_names().join(", "));
    println!("  vector: {}", DVec3::patch_field_table().type_names().join(", "));
    println!("  tensor: {}", Tensor::patch_field_table().type_names().join(", "));

    println!("\n场源类型:");
    println!("  scalar: {}", f64::field_source_table().type_names().join(", "));
    println!("  vector: {}", DVec3::field_source_table().type_names().join(", "));
    println!("  tensor: {}", Tensor::field_source_table().type_names().join(", "));

    println!("\n分布类型: {}", DISTRIBUTION_TYPES.join(", "));

    let switches = DebugSwitches::default();
    println!("\n默认调试开关:");
    println!("  disallowGenericPatchField: {}", switches.disallow_generic_patch_field);
    println!("  checkFieldDimensions: {}", switches.check_field_dimensions);
    println!("  registryDebug: {}", switches.registry_debug);
}

fn print_case(path: &Path) -> Result<()> {
    let case = load_case(path)?;
    let config = &case.config;

    println!("=== 算例 {} ===", config.case_name);
    println!(
        "时间: {} -> {}, deltaT = {}",
        config.start_time, config.end_time, config.delta_t
    );

    let mesh = case.region.mesh().borrow();
    println!("\n{}", mesh.statistics());

    println!("\n补丁:");
    for patch in mesh.boundary_mesh().iter() {
        let groups = if patch.groups().is_empty() {
            String::new()
        } else {
            format!(" 组 [{}]", patch.groups().join(", "))
        };
        println!(
            "  {:<12} {:<14} {:>6} 面{}",
            patch.name(),
            patch.type_name(),
            patch.size(),
            groups
        );
    }

    println!("\n场: {}", config.field_names().join(", "));
    Ok(())
}
