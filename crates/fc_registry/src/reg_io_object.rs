// crates/fc_registry/src/reg_io_object.rs

//! RegIoObject - 可注册对象接口
//!
//! 所有可放入 [`ObjectRegistry`](crate::ObjectRegistry) 的对象都实现本 trait。
//! 除身份信息外，接口还包括：
//!
//! - 重读：`modified` / `read`
//! - 写出：`write_data`
//! - 网格变化通知：`move_points` / `topo_change` / `map_mesh` / `distribute`
//!
//! 拓扑变化通知的默认实现返回 [`MapStatus::Unhandled`]，注册表据此发出警告：
//! 未处理拓扑变化的对象保留的是旧尺寸的数据。

use std::any::Any;

use fc_foundation::{FoamError, FoamResult, PolyDistributionMap, PolyMeshMap, PolyTopoChangeMap};

use crate::io_object::IoObject;
use crate::object_registry::ObjectRegistry;

/// 向 `Any` 的转换，用于按具体类型查找
pub trait AsAny: Any {
    /// 只读转换
    fn as_any(&self) -> &dyn Any;
    /// 可变转换
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// 所有权转换
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// 网格变化通知的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapStatus {
    /// 已按映射更新
    Handled,
    /// 与网格无关，无需更新
    Unaffected,
    /// 未实现处理，数据可能过期
    Unhandled,
}

/// 可注册对象
pub trait RegIoObject: AsAny {
    /// 身份与磁盘位置
    fn io(&self) -> &IoObject;

    /// 可变身份
    fn io_mut(&mut self) -> &mut IoObject;

    /// 运行时类型名（如 `volScalarField`）
    fn type_name(&self) -> String;

    /// 名称
    fn name(&self) -> &str {
        self.io().name()
    }

    /// 底层存储是否在上次读取之后被修改
    fn modified(&self) -> bool {
        self.io().file_modified()
    }

    /// 重读底层存储，返回是否读到了新内容
    fn read(&mut self) -> FoamResult<bool> {
        Ok(false)
    }

    /// 写出内容
    fn write_data(&self) -> FoamResult<serde_json::Value> {
        Err(FoamError::not_implemented(format!(
            "{}::write_data ({})",
            self.type_name(),
            self.name()
        )))
    }

    /// 作为子注册表
    fn as_registry(&self) -> Option<&ObjectRegistry> {
        None
    }

    /// 作为可变子注册表
    fn as_registry_mut(&mut self) -> Option<&mut ObjectRegistry> {
        None
    }

    /// 网格点移动（几何变化，实体数不变）
    fn move_points(&mut self) -> FoamResult<MapStatus> {
        Ok(MapStatus::Unaffected)
    }

    /// 拓扑变化
    fn topo_change(&mut self, _map: &PolyTopoChangeMap) -> FoamResult<MapStatus> {
        Ok(MapStatus::Unhandled)
    }

    /// 网格间映射
    fn map_mesh(&mut self, _map: &PolyMeshMap) -> FoamResult<MapStatus> {
        Ok(MapStatus::Unhandled)
    }

    /// 跨进程重分布
    fn distribute(&mut self, _map: &PolyDistributionMap) -> FoamResult<MapStatus> {
        Ok(MapStatus::Unhandled)
    }
}

/// 类型名的最后一段，用于错误信息
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(i) => &full[i + 2..],
        None => full,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain {
        io: IoObject,
    }

    impl RegIoObject for Plain {
        fn io(&self) -> &IoObject {
            &self.io
        }

        fn io_mut(&mut self) -> &mut IoObject {
            &mut self.io
        }

        fn type_name(&self) -> String {
            "plain".into()
        }
    }

    #[test]
    fn test_defaults() {
        let mut p = Plain {
            io: IoObject::detached("x"),
        };
        assert_eq!(p.name(), "x");
        assert!(!p.modified());
        assert!(!p.read().unwrap());
        assert!(matches!(p.write_data(), Err(FoamError::NotImplemented { .. })));
        assert_eq!(p.move_points().unwrap(), MapStatus::Unaffected);
        let map = PolyMeshMap::default();
        assert_eq!(p.map_mesh(&map).unwrap(), MapStatus::Unhandled);
    }

    #[test]
    fn test_downcast_through_trait_object() {
        let b: Box<dyn RegIoObject> = Box::new(Plain {
            io: IoObject::detached("y"),
        });
        assert!(b.as_ref().as_any().downcast_ref::<Plain>().is_some());
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<Plain>(), "Plain");
        assert_eq!(short_type_name::<Vec<f64>>(), "Vec<f64>");
    }
}
