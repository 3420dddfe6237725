// crates/fc_registry/src/object_registry.rs

//! ObjectRegistry - 层级命名对象库
//!
//! 注册表按名称保存可注册对象，并以子注册表的形式组织成树，根为 [`Time`](crate::Time)。
//!
//! # 所有权模型
//!
//! - **拥有表**: `check_in` 传入 `Box<dyn RegIoObject>`，注册表拥有对象，`check_out` 时销毁
//! - **引用表**: `check_in_shared` 传入 `Rc<RefCell<T>>`，注册表只保存弱引用，
//!   对象由调用方拥有；调用方释放后条目自动失效
//! - **临时对象缓存**: 名字在缓存策略中的临时对象由 `cache_temporary_object` 接管，
//!   保留到本轮求值结束（`clear_cached_temporaries`）
//!
//! 同一注册表内名称唯一（三张表合计）。
//!
//! # 事件计数
//!
//! `get_event` 返回严格递增的事件号，用于判断依赖是否比自身更新。计数达到上限时
//! 按原有先后顺序把所有非零事件号重新编号为 1, 2, 3, ...，之后继续递增，
//! 事件号之间的先后关系保持不变。
//!
//! 事件号以注册表内的事件表为准，对象自身的 `event_no` 只是副本。共享对象正被
//! 调用方借用时副本无法写回，记为未同步，在之后的事件操作中补写。
//!
//! # 遍历顺序
//!
//! 内部哈希表的遍历顺序不稳定；需要确定顺序时使用 `sorted_toc`。
//! 所有批量操作（重读、写出、拓扑变化分派）按名称排序遍历。

use std::any::Any;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use fc_config::ReadPropagation;
use fc_foundation::{FoamError, FoamResult, PolyDistributionMap, PolyMeshMap, PolyTopoChangeMap};

use crate::io_object::{DbLocation, IoObject, ObjectId, WriteOption};
use crate::reg_io_object::{short_type_name, MapStatus, RegIoObject};

/// 非拥有条目
struct SharedEntry {
    id: ObjectId,
    object: Weak<RefCell<dyn RegIoObject>>,
    any: Weak<dyn Any>,
}

impl SharedEntry {
    fn upgrade(&self) -> Option<Rc<RefCell<dyn RegIoObject>>> {
        self.object.upgrade()
    }
}

/// 重读报告
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadReport {
    /// 因存储被修改而重读的对象
    pub modified: Vec<String>,
    /// 作为依赖者被重读的对象
    pub dependents: Vec<String>,
    /// 尚待下次调用重读的依赖者（单层传播时）
    pub pending: Vec<String>,
}

impl ReadReport {
    /// 本次重读的对象总数
    pub fn n_read(&self) -> usize {
        self.modified.len() + self.dependents.len()
    }

    fn merge_prefixed(&mut self, prefix: &str, other: ReadReport) {
        let p = |n: String| format!("{prefix}/{n}");
        self.modified.extend(other.modified.into_iter().map(p));
        self.dependents.extend(other.dependents.into_iter().map(p));
        self.pending.extend(other.pending.into_iter().map(p));
    }
}

/// 命名对象注册表
pub struct ObjectRegistry {
    io: IoObject,
    location: DbLocation,
    owned: HashMap<String, Box<dyn RegIoObject>>,
    shared: HashMap<String, SharedEntry>,
    cached: HashMap<String, Box<dyn RegIoObject>>,
    cache_policy: BTreeMap<String, bool>,
    event: u64,
    event_limit: u64,
    events: HashMap<String, u64>,
    unsynced_events: BTreeSet<String>,
    dependents: HashMap<String, BTreeSet<String>>,
    pending_reads: BTreeSet<String>,
    read_propagation: ReadPropagation,
    debug: bool,
}

impl ObjectRegistry {
    /// 根注册表
    pub fn new(name: impl Into<String>, location: DbLocation) -> Self {
        Self {
            io: IoObject::new(name, "", &location),
            location,
            owned: HashMap::new(),
            shared: HashMap::new(),
            cached: HashMap::new(),
            cache_policy: BTreeMap::new(),
            event: 1,
            event_limit: u64::MAX,
            events: HashMap::new(),
            unsynced_events: BTreeSet::new(),
            dependents: HashMap::new(),
            pending_reads: BTreeSet::new(),
            read_propagation: ReadPropagation::SingleLevel,
            debug: false,
        }
    }

    /// 子注册表，位于 `dbDir/name`，继承策略设置
    pub fn new_child(&self, name: &str) -> Self {
        let mut child = Self::new(name, self.location.child(name));
        child.event_limit = self.event_limit;
        child.read_propagation = self.read_propagation;
        child.debug = self.debug;
        child
    }

    /// 名称
    pub fn name(&self) -> &str {
        self.io.name()
    }

    /// 磁盘位置
    pub fn location(&self) -> &DbLocation {
        &self.location
    }

    /// 为本注册表中的对象构造 IoObject
    pub fn io_object(&self, name: impl Into<String>, instance: impl Into<String>) -> IoObject {
        IoObject::new(name, instance, &self.location)
    }

    /// 设置事件计数上限
    pub fn set_event_limit(&mut self, limit: u64) {
        self.event_limit = limit.max(2);
    }

    /// 设置重读传播方式
    pub fn set_read_propagation(&mut self, propagation: ReadPropagation) {
        self.read_propagation = propagation;
    }

    /// 重读传播方式
    pub fn read_propagation(&self) -> ReadPropagation {
        self.read_propagation
    }

    /// 调试输出
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    // ========================================================================
    // 目录
    // ========================================================================

    /// 对象个数（含已失效的共享条目之外的全部）
    pub fn len(&self) -> usize {
        self.owned.len() + self.cached.len() + self.live_shared().count()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn live_shared(&self) -> impl Iterator<Item = (&String, &SharedEntry)> {
        self.shared.iter().filter(|(_, e)| e.object.strong_count() > 0)
    }

    /// 名称列表（顺序不定）
    pub fn toc(&self) -> Vec<String> {
        self.owned
            .keys()
            .chain(self.cached.keys())
            .chain(self.live_shared().map(|(k, _)| k))
            .cloned()
            .collect()
    }

    /// 有序名称列表
    pub fn sorted_toc(&self) -> Vec<String> {
        let mut names = self.toc();
        names.sort();
        names
    }

    /// 是否有此名称的对象（任意类型）
    pub fn contains(&self, name: &str) -> bool {
        self.owned.contains_key(name)
            || self.cached.contains_key(name)
            || self
                .shared
                .get(name)
                .map_or(false, |e| e.object.strong_count() > 0)
    }

    /// 给定类型的对象名（有序）
    pub fn names_of<T: RegIoObject>(&self) -> Vec<String> {
        self.sorted_toc()
            .into_iter()
            .filter(|n| self.found_object::<T>(n))
            .collect()
    }

    /// 给定运行时类型名的对象名（有序）
    pub fn names_of_type(&self, type_name: &str) -> Vec<String> {
        self.sorted_toc()
            .into_iter()
            .filter(|n| self.type_name_of(n).as_deref() == Some(type_name))
            .collect()
    }

    /// 对象的运行时类型名
    pub fn type_name_of(&self, name: &str) -> Option<String> {
        if let Some(obj) = self.owned.get(name).or_else(|| self.cached.get(name)) {
            return Some(obj.type_name());
        }
        let rc = self.shared.get(name)?.upgrade()?;
        let type_name = rc.try_borrow().ok()?.type_name();
        Some(type_name)
    }

    // ========================================================================
    // 注册与注销
    // ========================================================================

    /// 注册并移交所有权
    ///
    /// 与缓存的临时对象同名时替换之；与其他对象同名时失败并原样退回对象。
    pub fn check_in(
        &mut self,
        mut object: Box<dyn RegIoObject>,
    ) -> Result<ObjectId, Box<dyn RegIoObject>> {
        let name = object.name().to_string();
        if self.taken_by_registered(&name) {
            if self.debug {
                warn!("注册表 {}: 名称 {} 已被占用, 注册失败", self.name(), name);
            }
            return Err(object);
        }
        if self.cached.remove(&name).is_some() {
            debug!("注册表 {}: 新对象 {} 替换缓存的临时对象", self.name(), name);
        }
        self.forget_event(&name);
        object.io_mut().set_registered(true);
        let id = object.io().id();
        if self.debug {
            debug!("注册表 {}: 注册 {} {}", self.name(), object.type_name(), name);
        }
        self.owned.insert(name, object);
        Ok(id)
    }

    /// 注册并返回具体类型的可变引用
    pub fn store<T: RegIoObject>(&mut self, object: T) -> FoamResult<&mut T> {
        let name = object.name().to_string();
        self.check_in(Box::new(object)).map_err(|rejected| {
            FoamError::internal(format!(
                "注册表 {} 中已存在对象 {}",
                self.name(),
                rejected.name()
            ))
        })?;
        self.lookup_object_mut::<T>(&name)
    }

    /// 注册调用方拥有的对象（只保存弱引用）
    pub fn check_in_shared<T: RegIoObject>(&mut self, object: &Rc<RefCell<T>>) -> FoamResult<ObjectId> {
        let mut obj = object
            .try_borrow_mut()
            .map_err(|_| FoamError::internal("注册时对象正被借用"))?;
        let (name, id) = (obj.name().to_string(), obj.io().id());
        if self.taken_by_registered(&name) {
            return Err(FoamError::internal(format!(
                "注册表 {} 中已存在对象 {}",
                self.name(),
                name
            )));
        }
        obj.io_mut().set_registered(true);
        drop(obj);
        self.cached.remove(&name);
        self.forget_event(&name);
        let dyn_rc: Rc<RefCell<dyn RegIoObject>> = object.clone();
        let any_rc: Rc<dyn Any> = object.clone();
        self.shared.insert(
            name,
            SharedEntry {
                id,
                object: Rc::downgrade(&dyn_rc),
                any: Rc::downgrade(&any_rc),
            },
        );
        Ok(id)
    }

    /// 名称是否被缓存临时对象以外的对象占用（顺带清理失效的共享条目）
    fn taken_by_registered(&mut self, name: &str) -> bool {
        self.purge_dead(name);
        self.owned.contains_key(name) || self.shared.contains_key(name)
    }

    fn purge_dead(&mut self, name: &str) {
        if let Some(e) = self.shared.get(name) {
            if e.object.strong_count() == 0 {
                self.shared.remove(name);
            }
        }
    }

    fn id_of(&self, name: &str) -> Option<ObjectId> {
        if let Some(obj) = self.owned.get(name).or_else(|| self.cached.get(name)) {
            return Some(obj.io().id());
        }
        self.shared
            .get(name)
            .filter(|e| e.object.strong_count() > 0)
            .map(|e| e.id)
    }

    /// 注销对象
    ///
    /// `id` 与所存储对象不一致时只发出警告并返回 false。拥有的对象随之销毁。
    pub fn check_out(&mut self, name: &str, id: ObjectId) -> bool {
        match self.id_of(name) {
            None => {
                if self.debug {
                    warn!("注册表 {}: 找不到要注销的对象 {}", self.name(), name);
                }
                false
            }
            Some(stored) if stored != id => {
                warn!(
                    "注册表 {}: 注销 {} 时对象 {} 与存储的对象 {} 不一致, 未注销",
                    self.name(),
                    name,
                    id,
                    stored
                );
                false
            }
            Some(_) => {
                if self.owned.remove(name).is_none() && self.cached.remove(name).is_none() {
                    if let Some(rc) = self.shared.remove(name).and_then(|e| e.upgrade()) {
                        if let Ok(mut obj) = rc.try_borrow_mut() {
                            obj.io_mut().set_registered(false);
                        }
                    }
                }
                self.remove_dependencies(name);
                self.forget_event(name);
                if self.debug {
                    debug!("注册表 {}: 注销 {}", self.name(), name);
                }
                true
            }
        }
    }

    /// 注销拥有的对象并交还所有权
    pub fn release(&mut self, name: &str) -> Option<Box<dyn RegIoObject>> {
        let mut obj = self.owned.remove(name).or_else(|| self.cached.remove(name))?;
        obj.io_mut().set_registered(false);
        self.remove_dependencies(name);
        self.forget_event(name);
        Some(obj)
    }

    /// 注销拥有的对象并交还具体类型
    pub fn release_as<T: RegIoObject>(&mut self, name: &str) -> FoamResult<Box<T>> {
        if !self.found_object::<T>(name) {
            return Err(self.not_found::<T>(name));
        }
        let obj = self
            .release(name)
            .ok_or_else(|| FoamError::internal(format!("对象 {name} 不归注册表所有")))?;
        obj.into_any()
            .downcast::<T>()
            .map_err(|_| FoamError::internal(format!("对象 {name} 类型转换失败")))
    }

    // ========================================================================
    // 查找
    // ========================================================================

    fn not_found<T: ?Sized>(&self, name: &str) -> FoamError {
        FoamError::not_found(self.name(), name, short_type_name::<T>(), self.sorted_toc())
    }

    /// 是否有给定类型的对象
    pub fn found_object<T: RegIoObject>(&self, name: &str) -> bool {
        if let Some(obj) = self.owned.get(name).or_else(|| self.cached.get(name)) {
            return (**obj).as_any().is::<T>();
        }
        self.shared
            .get(name)
            .and_then(|e| e.any.upgrade())
            .map_or(false, |any| any.is::<RefCell<T>>())
    }

    /// 按名称与类型查找拥有的对象
    ///
    /// 对象不存在或类型不符时返回错误，错误中列出注册表现有对象。
    /// 共享对象用 [`lookup_shared`](Self::lookup_shared) 查找。
    pub fn lookup_object<T: RegIoObject>(&self, name: &str) -> FoamResult<&T> {
        match self.owned.get(name).or_else(|| self.cached.get(name)) {
            Some(obj) => (**obj)
                .as_any()
                .downcast_ref::<T>()
                .ok_or_else(|| FoamError::wrong_type(name, short_type_name::<T>(), obj.type_name())),
            None => Err(self.not_found::<T>(name)),
        }
    }

    /// 按名称与类型查找拥有的对象（可变）
    pub fn lookup_object_mut<T: RegIoObject>(&mut self, name: &str) -> FoamResult<&mut T> {
        let err = self.not_found::<T>(name);
        let obj = match self.owned.get_mut(name) {
            Some(obj) => obj,
            None => self.cached.get_mut(name).ok_or(err)?,
        };
        let actual = obj.type_name();
        (**obj)
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or_else(|| FoamError::wrong_type(name, short_type_name::<T>(), actual))
    }

    /// 按名称与类型查找共享对象
    pub fn lookup_shared<T: RegIoObject>(&self, name: &str) -> FoamResult<Rc<RefCell<T>>> {
        let any = self
            .shared
            .get(name)
            .and_then(|e| e.any.upgrade())
            .ok_or_else(|| self.not_found::<T>(name))?;
        any.downcast::<RefCell<T>>().map_err(|_| {
            FoamError::wrong_type(
                name,
                short_type_name::<T>(),
                self.type_name_of(name).unwrap_or_default(),
            )
        })
    }

    /// 给定类型的全部拥有对象，按名称排序
    pub fn lookup_class<T: RegIoObject>(&self) -> Vec<(&str, &T)> {
        let mut out: Vec<(&str, &T)> = self
            .owned
            .iter()
            .chain(self.cached.iter())
            .filter_map(|(k, v)| (**v).as_any().downcast_ref::<T>().map(|t| (k.as_str(), t)))
            .collect();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }

    /// 子注册表
    pub fn sub_registry(&self, name: &str) -> FoamResult<&ObjectRegistry> {
        self.owned
            .get(name)
            .and_then(|o| o.as_registry())
            .ok_or_else(|| self.not_found::<ObjectRegistry>(name))
    }

    /// 子注册表（可变）
    pub fn sub_registry_mut(&mut self, name: &str) -> FoamResult<&mut ObjectRegistry> {
        let err = self.not_found::<ObjectRegistry>(name);
        self.owned
            .get_mut(name)
            .and_then(|o| o.as_registry_mut())
            .ok_or(err)
    }

    /// 对指定对象执行可变操作（拥有或共享）
    pub fn with_object_mut<R>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut dyn RegIoObject) -> R,
    ) -> FoamResult<R> {
        if let Some(obj) = self.owned.get_mut(name).or_else(|| self.cached.get_mut(name)) {
            return Ok(f(&mut **obj));
        }
        let rc = self
            .shared
            .get(name)
            .and_then(|e| e.upgrade())
            .ok_or_else(|| self.not_found::<dyn RegIoObject>(name))?;
        let mut obj = rc
            .try_borrow_mut()
            .map_err(|_| FoamError::internal(format!("共享对象 {name} 正被借用")))?;
        Ok(f(&mut *obj))
    }

    /// 对指定对象执行只读操作（拥有或共享）
    pub fn with_object<R>(&self, name: &str, f: impl FnOnce(&dyn RegIoObject) -> R) -> FoamResult<R> {
        if let Some(obj) = self.owned.get(name).or_else(|| self.cached.get(name)) {
            return Ok(f(&**obj));
        }
        let rc = self
            .shared
            .get(name)
            .and_then(|e| e.upgrade())
            .ok_or_else(|| self.not_found::<dyn RegIoObject>(name))?;
        let obj = rc
            .try_borrow()
            .map_err(|_| FoamError::internal(format!("共享对象 {name} 正被借用")))?;
        Ok(f(&*obj))
    }

    fn for_each_sorted_mut(
        &mut self,
        mut f: impl FnMut(&str, &mut dyn RegIoObject) -> FoamResult<()>,
    ) -> FoamResult<()> {
        for name in self.sorted_toc() {
            self.with_object_mut(&name, |obj| f(&name, obj))??;
        }
        Ok(())
    }

    // ========================================================================
    // 事件
    // ========================================================================

    /// 当前事件计数
    pub fn event(&self) -> u64 {
        self.event
    }

    /// 取下一个事件号
    ///
    /// 计数达到上限时发出警告，按原有先后把所有非零事件号重编为 1, 2, ...，
    /// 返回值大于全部重编后的事件号。
    pub fn get_event(&mut self) -> u64 {
        self.sync_pending_events();
        let mut current = self.event;
        self.event += 1;

        if self.event >= self.event_limit {
            warn!(
                "注册表 {}: 事件计数溢出, 重置所有依赖对象的事件号, 可能导致额外的重新计算",
                self.name()
            );
            let mut stamped: Vec<(u64, String)> = Vec::new();
            for name in self.sorted_toc() {
                if let Ok(n) = self.event_no(&name) {
                    if n != 0 {
                        stamped.push((n, name));
                    }
                }
            }
            stamped.sort();
            self.events.clear();
            let mut next = 1;
            for (_, name) in stamped {
                self.events.insert(name.clone(), next);
                self.sync_event(name);
                next += 1;
            }
            current = next;
            self.event = next + 1;
        }
        current
    }

    /// 对象的事件号（未标记过为 0）
    pub fn event_no(&self, name: &str) -> FoamResult<u64> {
        if !self.contains(name) {
            return Err(self.not_found::<dyn RegIoObject>(name));
        }
        match self.events.get(name) {
            Some(event) => Ok(*event),
            None => self.with_object(name, |o| o.io().event_no()),
        }
    }

    /// 标记对象为最新（事件号取下一个事件）
    pub fn set_up_to_date(&mut self, name: &str) -> FoamResult<u64> {
        if !self.contains(name) {
            return Err(self.not_found::<dyn RegIoObject>(name));
        }
        let event = self.get_event();
        self.events.insert(name.to_string(), event);
        self.sync_event(name.to_string());
        Ok(event)
    }

    /// 对象是否比全部依赖都新
    pub fn up_to_date(&self, name: &str, dependencies: &[&str]) -> FoamResult<bool> {
        let own = self.event_no(name)?;
        for dep in dependencies {
            if self.event_no(dep)? >= own {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// 事件号写回对象；对象正被借用时记为未同步
    fn sync_event(&mut self, name: String) {
        let Some(&event) = self.events.get(&name) else {
            self.unsynced_events.remove(&name);
            return;
        };
        match self.with_object_mut(&name, |o| o.io_mut().set_event_no(event)) {
            Ok(()) => {
                self.unsynced_events.remove(&name);
            }
            Err(_) => {
                if self.unsynced_events.insert(name.clone()) {
                    warn!(
                        "注册表 {}: 对象 {} 正被借用, 事件号 {} 暂存于注册表",
                        self.name(),
                        name,
                        event
                    );
                }
            }
        }
    }

    /// 补写未同步的事件号
    fn sync_pending_events(&mut self) {
        let pending: Vec<String> = self.unsynced_events.iter().cloned().collect();
        for name in pending {
            if self.contains(&name) {
                self.sync_event(name);
            } else {
                self.unsynced_events.remove(&name);
            }
        }
    }

    fn forget_event(&mut self, name: &str) {
        self.events.remove(name);
        self.unsynced_events.remove(name);
    }

    // ========================================================================
    // 临时对象缓存
    // ========================================================================

    /// 设置需要缓存的临时对象名
    pub fn set_cache_temporary_objects<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cache_policy = names.into_iter().map(|n| (n.into(), false)).collect();
    }

    /// 名称是否在缓存策略中
    pub fn caches_temporary(&self, name: &str) -> bool {
        self.cache_policy.contains_key(name)
    }

    /// 交由注册表缓存临时对象
    ///
    /// 名称在策略中时注册表接管对象并返回 `None`；否则原样退回，由调用方销毁。
    pub fn cache_temporary_object(
        &mut self,
        mut object: Box<dyn RegIoObject>,
    ) -> Option<Box<dyn RegIoObject>> {
        let name = object.name().to_string();
        match self.cache_policy.get_mut(&name) {
            Some(cached) => {
                if self.owned.contains_key(&name) || self.shared.contains_key(&name) {
                    warn!(
                        "注册表 {}: 临时对象 {} 与已注册对象同名, 不缓存",
                        self.io.name(),
                        name
                    );
                    return Some(object);
                }
                *cached = true;
                self.events.remove(&name);
                self.unsynced_events.remove(&name);
                object.io_mut().set_registered(true);
                debug!("注册表 {}: 缓存临时对象 {}", self.io.name(), name);
                self.cached.insert(name, object);
                None
            }
            None => Some(object),
        }
    }

    /// 缓存中的临时对象名（有序）
    pub fn cached_temporaries(&self) -> Vec<String> {
        let mut names: Vec<String> = self.cached.keys().cloned().collect();
        names.sort();
        names
    }

    /// 结束一轮求值：释放缓存的临时对象，对从未出现的策略名发出警告
    pub fn clear_cached_temporaries(&mut self) -> Vec<String> {
        let never: Vec<String> = self
            .cache_policy
            .iter()
            .filter(|(_, cached)| !**cached)
            .map(|(n, _)| n.clone())
            .collect();
        for name in &never {
            warn!("注册表 {}: 请求缓存的临时对象 {} 未被构造", self.name(), name);
        }
        self.cached.clear();
        self.cache_policy.values_mut().for_each(|c| *c = false);
        never
    }

    // ========================================================================
    // 依赖与重读
    // ========================================================================

    /// 声明 `dependent` 依赖于 `on`
    pub fn add_dependency(&mut self, dependent: &str, on: &str) -> FoamResult<()> {
        for n in [dependent, on] {
            if !self.contains(n) {
                return Err(self.not_found::<dyn RegIoObject>(n));
            }
        }
        self.dependents
            .entry(on.to_string())
            .or_default()
            .insert(dependent.to_string());
        Ok(())
    }

    /// 直接依赖于 `name` 的对象（有序）
    pub fn dependents_of(&self, name: &str) -> Vec<String> {
        self.dependents
            .get(name)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn remove_dependencies(&mut self, name: &str) {
        self.dependents.remove(name);
        for set in self.dependents.values_mut() {
            set.remove(name);
        }
        self.pending_reads.remove(name);
    }

    fn next_level(&self, from: &BTreeSet<String>, done: &BTreeSet<String>) -> BTreeSet<String> {
        from.iter()
            .flat_map(|n| self.dependents_of(n))
            .filter(|d| !done.contains(d) && self.contains(d))
            .collect()
    }

    /// 重读存储被修改的对象并传播给依赖者
    ///
    /// 单层传播（默认）时每次调用只重读直接依赖者，更深的依赖者记为待读，
    /// 在下一次调用时重读；传递传播时沿依赖链一直重读到不动点。
    /// 子注册表递归处理。
    pub fn read_modified_objects(&mut self) -> FoamResult<ReadReport> {
        let mut report = ReadReport::default();
        let mut done: BTreeSet<String> = BTreeSet::new();

        // 存储被修改的对象与上次遗留的待读对象
        let mut modified: BTreeSet<String> = std::mem::take(&mut self.pending_reads)
            .into_iter()
            .filter(|n| self.contains(n))
            .collect();
        for name in self.sorted_toc() {
            if self.with_object(&name, |o| o.modified())? {
                modified.insert(name);
            }
        }
        for name in &modified {
            self.with_object_mut(name, |o| o.read())??;
            report.modified.push(name.clone());
            done.insert(name.clone());
        }

        let mut frontier = self.next_level(&modified, &done);
        while !frontier.is_empty() {
            for name in &frontier {
                self.with_object_mut(name, |o| o.read())??;
                report.dependents.push(name.clone());
                done.insert(name.clone());
            }
            let next = self.next_level(&frontier, &done);
            if self.read_propagation == ReadPropagation::SingleLevel {
                report.pending = next.iter().cloned().collect();
                self.pending_reads = next;
                break;
            }
            frontier = next;
        }

        // 子注册表
        let mut sub_names: Vec<String> = self
            .owned
            .iter()
            .filter(|(_, o)| o.as_registry().is_some())
            .map(|(k, _)| k.clone())
            .collect();
        sub_names.sort();
        for sub in sub_names {
            if let Some(reg) = self.owned.get_mut(&sub).and_then(|o| o.as_registry_mut()) {
                let sub_report = reg.read_modified_objects()?;
                report.merge_prefixed(&sub, sub_report);
            }
        }

        if report.n_read() > 0 {
            debug!(
                "注册表 {}: 重读 {} 个对象, 待读 {} 个",
                self.name(),
                report.n_read(),
                report.pending.len()
            );
        }
        Ok(report)
    }

    // ========================================================================
    // 写出
    // ========================================================================

    /// 写出所有 AUTO_WRITE 对象到各自的对象路径，返回写出的路径
    pub fn write_objects(&self) -> FoamResult<Vec<std::path::PathBuf>> {
        let mut written = Vec::new();
        for name in self.sorted_toc() {
            let (auto, path, data) = self.with_object(&name, |o| {
                let auto = o.io().write_opt() == WriteOption::AutoWrite;
                let data = if auto { Some(o.write_data()) } else { None };
                (auto, o.io().object_path(), data)
            })?;
            if let Some(reg) = self.owned.get(&name).and_then(|o| o.as_registry()) {
                written.extend(reg.write_objects()?);
            }
            if !auto {
                continue;
            }
            let value = data.unwrap_or_else(|| Err(FoamError::internal("写出数据缺失")))?;
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            std::fs::write(&path, serde_json::to_string_pretty(&value)?)?;
            written.push(path);
        }
        Ok(written)
    }

    // ========================================================================
    // 网格变化分派
    // ========================================================================

    fn dispatch(
        &mut self,
        what: &str,
        mut f: impl FnMut(&mut dyn RegIoObject) -> FoamResult<MapStatus>,
    ) -> FoamResult<Vec<String>> {
        let registry = self.name().to_string();
        let mut unhandled = Vec::new();
        self.for_each_sorted_mut(|name, obj| {
            if f(obj)? == MapStatus::Unhandled {
                warn!(
                    "注册表 {}: 对象 {} ({}) 未处理 {}, 其数据可能与网格不一致",
                    registry,
                    name,
                    obj.type_name(),
                    what
                );
                unhandled.push(name.to_string());
            }
            Ok(())
        })?;
        Ok(unhandled)
    }

    /// 通知所有对象网格点已移动，返回未处理的对象名
    pub fn move_points(&mut self) -> FoamResult<Vec<String>> {
        self.dispatch("movePoints", |o| o.move_points())
    }

    /// 通知所有对象拓扑已变化，返回未处理的对象名
    pub fn topo_change(&mut self, map: &PolyTopoChangeMap) -> FoamResult<Vec<String>> {
        self.dispatch("topoChange", |o| o.topo_change(map))
    }

    /// 通知所有对象网格间映射，返回未处理的对象名
    pub fn map_mesh(&mut self, map: &PolyMeshMap) -> FoamResult<Vec<String>> {
        self.dispatch("mapMesh", |o| o.map_mesh(map))
    }

    /// 通知所有对象重分布，返回未处理的对象名
    pub fn distribute(&mut self, map: &PolyDistributionMap) -> FoamResult<Vec<String>> {
        self.dispatch("distribute", |o| o.distribute(map))
    }
}

/// 注册表本身也是可注册对象，以支持层级结构
impl RegIoObject for ObjectRegistry {
    fn io(&self) -> &IoObject {
        &self.io
    }

    fn io_mut(&mut self) -> &mut IoObject {
        &mut self.io
    }

    fn type_name(&self) -> String {
        "objectRegistry".into()
    }

    fn modified(&self) -> bool {
        false
    }

    fn as_registry(&self) -> Option<&ObjectRegistry> {
        Some(self)
    }

    fn as_registry_mut(&mut self) -> Option<&mut ObjectRegistry> {
        Some(self)
    }

    fn move_points(&mut self) -> FoamResult<MapStatus> {
        ObjectRegistry::move_points(self)?;
        Ok(MapStatus::Handled)
    }

    fn topo_change(&mut self, map: &PolyTopoChangeMap) -> FoamResult<MapStatus> {
        ObjectRegistry::topo_change(self, map)?;
        Ok(MapStatus::Handled)
    }

    fn map_mesh(&mut self, map: &PolyMeshMap) -> FoamResult<MapStatus> {
        ObjectRegistry::map_mesh(self, map)?;
        Ok(MapStatus::Handled)
    }

    fn distribute(&mut self, map: &PolyDistributionMap) -> FoamResult<MapStatus> {
        ObjectRegistry::distribute(self, map)?;
        Ok(MapStatus::Handled)
    }
}

impl std::fmt::Debug for ObjectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectRegistry")
            .field("name", &self.name())
            .field("objects", &self.sorted_toc())
            .field("event", &self.event)
            .finish()
    }
}
