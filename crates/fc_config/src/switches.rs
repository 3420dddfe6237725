// crates/fc_config/src/switches.rs

//! 调试开关与注册表策略
//!
//! 开关值在启动阶段从算例配置读入，之后作为普通值传给需要的组件，
//! 不依赖任何静态初始化顺序。

use serde::{Deserialize, Serialize};

/// 调试开关
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugSwitches {
    /// 禁止未知边界类型回退到 generic 占位类型
    ///
    /// 默认允许回退（发出警告）；置为 true 时未知类型立即报错。
    #[serde(default)]
    pub disallow_generic_patch_field: bool,

    /// 场复合赋值（`+=`/`-=`）时检查量纲
    #[serde(default)]
    pub check_field_dimensions: bool,

    /// 注册表调试输出
    #[serde(default)]
    pub registry_debug: bool,
}

/// 依赖重读的传播方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadPropagation {
    /// 只重读被修改对象的直接依赖者，每次调用传播一层
    #[default]
    SingleLevel,
    /// 沿依赖链传播直到不动点
    Transitive,
}
