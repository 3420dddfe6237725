// crates/fc_registry/src/time.rs

//! Time - 根注册表与时间控制
//!
//! `Time` 拥有根注册表，记录当前时间值、时间步长和时间索引。区域（网格及其对象）
//! 作为子注册表挂在根注册表下。

use tracing::{debug, info};

use fc_config::CaseConfig;
use fc_foundation::FoamResult;

use crate::io_object::DbLocation;
use crate::object_registry::ObjectRegistry;

/// 时间名的有效数字位数
pub const TIME_PRECISION: usize = 6;

/// 时间值转为目录名，6 位有效数字，去掉多余的零
pub fn time_name(t: f64) -> String {
    if t == 0.0 {
        return "0".into();
    }
    let rounded: f64 = format!("{:.*e}", TIME_PRECISION - 1, t)
        .parse()
        .unwrap_or(t);
    format!("{rounded}")
}

/// 根注册表与时间
#[derive(Debug)]
pub struct Time {
    db: ObjectRegistry,
    value: f64,
    delta_t: f64,
    delta_t0: f64,
    time_index: usize,
    start_time: f64,
    end_time: f64,
}

impl Time {
    /// 构造
    pub fn new(root_path: impl Into<std::path::PathBuf>, case_name: impl Into<String>) -> Self {
        let location = DbLocation::new(root_path, case_name);
        Self {
            db: ObjectRegistry::new("time", location),
            value: 0.0,
            delta_t: 1.0,
            delta_t0: 1.0,
            time_index: 0,
            start_time: 0.0,
            end_time: f64::MAX,
        }
    }

    /// 由算例配置构造，并应用注册表策略
    pub fn from_config(config: &CaseConfig) -> FoamResult<Self> {
        config.validate()?;
        let mut time = Self::new(config.root_path.clone(), config.case_name.clone());
        time.value = config.start_time;
        time.start_time = config.start_time;
        time.end_time = config.end_time;
        time.delta_t = config.delta_t;
        time.delta_t0 = config.delta_t;
        time.db.set_event_limit(config.event_limit);
        time.db.set_read_propagation(config.read_propagation);
        time.db.set_debug(config.debug_switches.registry_debug);
        time.db
            .set_cache_temporary_objects(config.cache_temporary_objects.iter().cloned());
        info!(
            "算例 {}: 时间 {} -> {}, deltaT = {}",
            config.case_name, config.start_time, config.end_time, config.delta_t
        );
        Ok(time)
    }

    /// 根注册表
    pub fn db(&self) -> &ObjectRegistry {
        &self.db
    }

    /// 根注册表（可变）
    pub fn db_mut(&mut self) -> &mut ObjectRegistry {
        &mut self.db
    }

    /// 当前时间
    pub fn value(&self) -> f64 {
        self.value
    }

    /// 当前时间名
    pub fn time_name(&self) -> String {
        time_name(self.value)
    }

    /// 时间步长
    pub fn delta_t(&self) -> f64 {
        self.delta_t
    }

    /// 上一步的时间步长
    pub fn delta_t0(&self) -> f64 {
        self.delta_t0
    }

    /// 设置时间步长
    pub fn set_delta_t(&mut self, delta_t: f64) {
        self.delta_t = delta_t;
    }

    /// 时间索引
    pub fn time_index(&self) -> usize {
        self.time_index
    }

    /// 起始时间
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// 结束时间
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// 是否继续推进
    pub fn run(&self) -> bool {
        self.value < self.end_time - 0.5 * self.delta_t
    }

    /// 推进一个时间步
    ///
    /// 上一轮求值缓存的临时对象在此释放。
    pub fn increment(&mut self) {
        self.db.clear_cached_temporaries();
        self.delta_t0 = self.delta_t;
        self.value += self.delta_t;
        self.time_index += 1;
        debug!("时间 = {} (索引 {})", self.time_name(), self.time_index);
    }

    /// 区域注册表
    pub fn region(&self, name: &str) -> FoamResult<&ObjectRegistry> {
        self.db.sub_registry(name)
    }

    /// 区域注册表（可变）
    pub fn region_mut(&mut self, name: &str) -> FoamResult<&mut ObjectRegistry> {
        self.db.sub_registry_mut(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_name() {
        assert_eq!(time_name(0.0), "0");
        assert_eq!(time_name(0.1 + 0.2), "0.3");
        assert_eq!(time_name(1.0), "1");
        assert_eq!(time_name(2.5), "2.5");
        assert_eq!(time_name(1.0 / 3.0), "0.333333");
    }

    #[test]
    fn test_increment_and_run() {
        let config = CaseConfig {
            end_time: 0.3,
            delta_t: 0.1,
            ..Default::default()
        };
        let mut time = Time::from_config(&config).unwrap();
        let mut steps = 0;
        while time.run() {
            time.increment();
            steps += 1;
        }
        assert_eq!(steps, 3);
        assert_eq!(time.time_index(), 3);
        assert_eq!(time.time_name(), "0.3");
    }

    #[test]
    fn test_region_missing() {
        let time = Time::new(".", "case");
        assert!(time.region("fluid").is_err());
    }
}
