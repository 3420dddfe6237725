// crates/fc_field/src/old_time.rs

//! 旧时间层
//!
//! 瞬态格式需要前几个时间步的场值。`OldTimeField` 保存按时间倒序排列的快照：
//! 第 1 层为上一时间步，第 2 层为再上一步。时间索引前进后首次调用
//! `store_old_times` 时整体后移一层，同一时间步内重复调用不做任何事。

/// 旧时间快照链
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OldTimeField<T> {
    levels: Vec<Vec<T>>,
    max_levels: usize,
    time_index: Option<usize>,
}

impl<T: Clone> OldTimeField<T> {
    /// 最多保存 `max_levels` 层
    pub fn new(max_levels: usize) -> Self {
        Self {
            levels: Vec::new(),
            max_levels,
            time_index: None,
        }
    }

    /// 已保存的层数
    pub fn n_old_times(&self) -> usize {
        self.levels.len()
    }

    /// 第 `level` 层（从 1 开始）
    pub fn old_time(&self, level: usize) -> Option<&[T]> {
        level
            .checked_sub(1)
            .and_then(|i| self.levels.get(i))
            .map(Vec::as_slice)
    }

    /// 时间索引变化时把当前值压入链首，返回是否压入
    pub fn store_old_times(&mut self, time_index: usize, current: &[T]) -> bool {
        if self.time_index == Some(time_index) {
            return false;
        }
        self.time_index = Some(time_index);
        self.store_old_time(current);
        true
    }

    /// 无条件压入当前值
    pub fn store_old_time(&mut self, current: &[T]) {
        if self.max_levels == 0 {
            return;
        }
        self.levels.insert(0, current.to_vec());
        self.levels.truncate(self.max_levels);
    }

    /// 以同一变换更新所有层（拓扑变化、重分布）；任一层失败时各层保持不变
    pub fn try_map_levels<E>(
        &mut self,
        f: impl FnMut(&[T]) -> Result<Option<Vec<T>>, E>,
    ) -> Result<(), E> {
        let mapped = self
            .levels
            .iter()
            .map(|level| level.as_slice())
            .map(f)
            .collect::<Result<Vec<_>, E>>()?;
        for (level, m) in self.levels.iter_mut().zip(mapped) {
            if let Some(m) = m {
                *level = m;
            }
        }
        Ok(())
    }

    /// 丢弃全部旧时间层
    pub fn clear(&mut self) {
        self.levels.clear();
        self.time_index = None;
    }
}
