// crates/fc_foundation/src/demand.rs

//! 按需计算缓存
//!
//! 网格几何、寻址、分配系数等派生量在首次访问时计算并缓存，
//! 在任何可能使其过期的修改之后显式失效。
//!
//! 状态是显式的 [`CacheState`]：`Unevaluated` 只表示“尚未计算”，
//! 不兼作“不适用”。不适用的量应在值类型中表达（例如 `Option<T>`）。
//!
//! 读取只需 `&self`，失效需要 `&mut self`：在借用检查层面保证不会在读取缓存引用的
//! 同时使其失效。

use std::cell::OnceCell;
use std::fmt;

/// 缓存状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// 尚未计算
    Unevaluated,
    /// 已计算
    Evaluated,
}

/// 按需计算的缓存值
pub struct Demand<T> {
    cell: OnceCell<T>,
}

impl<T> Demand<T> {
    /// 空缓存
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// 当前状态
    pub fn state(&self) -> CacheState {
        if self.cell.get().is_some() {
            CacheState::Evaluated
        } else {
            CacheState::Unevaluated
        }
    }

    /// 是否已计算
    pub fn is_evaluated(&self) -> bool {
        self.state() == CacheState::Evaluated
    }

    /// 已缓存的值
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    /// 取值，未计算时调用 `eval`
    pub fn get_or_eval(&self, eval: impl FnOnce() -> T) -> &T {
        self.cell.get_or_init(eval)
    }

    /// 取值，计算可能失败
    pub fn try_get_or_eval<E>(&self, eval: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
        if let Some(v) = self.cell.get() {
            return Ok(v);
        }
        let v = eval()?;
        Ok(self.cell.get_or_init(move || v))
    }

    /// 直接设置缓存值
    pub fn set(&mut self, value: T) {
        self.cell = OnceCell::from(value);
    }

    /// 失效，返回 true 表示之前已计算
    pub fn invalidate(&mut self) -> bool {
        self.cell.take().is_some()
    }

    /// 取出缓存值并置为未计算
    pub fn take(&mut self) -> Option<T> {
        self.cell.take()
    }
}

impl<T> Default for Demand<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Demand<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Demand<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(v) => f.debug_tuple("Evaluated").field(v).finish(),
            None => f.write_str("Unevaluated"),
        }
    }
}
