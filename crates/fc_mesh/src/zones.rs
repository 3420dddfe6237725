// crates/fc_mesh/src/zones.rs

//! 网格区域
//!
//! 点、面、单元的命名子集。面区域额外记录每个面相对区域方向是否翻转。
//! 实体到区域的反查表按需构建，区域内容变化时失效。

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use fc_foundation::{Demand, DistributionSchedule, FoamResult};

/// 区域作用的实体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZoneKind {
    /// 点
    Point,
    /// 面
    Face,
    /// 单元
    Cell,
}

impl ZoneKind {
    /// 运行时类型名
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Point => "pointZone",
            Self::Face => "faceZone",
            Self::Cell => "cellZone",
        }
    }
}

/// 区域
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Zone {
    name: String,
    indices: Vec<usize>,
    flip: Vec<bool>,
}

impl Zone {
    /// 点或单元区域
    pub fn new(name: impl Into<String>, indices: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            indices,
            flip: Vec::new(),
        }
    }

    /// 带翻转标记的面区域
    pub fn with_flip(name: impl Into<String>, indices: Vec<usize>, flip: Vec<bool>) -> Self {
        Self {
            name: name.into(),
            indices,
            flip,
        }
    }

    /// 名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 成员
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// 成员数
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// 第 i 个成员是否翻转（只对面区域有意义）
    pub fn flipped(&self, i: usize) -> bool {
        self.flip.get(i).copied().unwrap_or(false)
    }

    fn has_flip(&self) -> bool {
        !self.flip.is_empty()
    }
}

/// 区域集合
#[derive(Debug, Clone)]
pub struct ZoneMesh {
    kind: ZoneKind,
    zones: Vec<Zone>,
    lookup: Demand<HashMap<usize, usize>>,
}

impl ZoneMesh {
    /// 空集合
    pub fn new(kind: ZoneKind) -> Self {
        Self {
            kind,
            zones: Vec::new(),
            lookup: Demand::new(),
        }
    }

    /// 实体类型
    pub fn kind(&self) -> ZoneKind {
        self.kind
    }

    /// 区域数
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// 全部区域
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// 区域名
    pub fn names(&self) -> Vec<String> {
        self.zones.iter().map(|z| z.name.clone()).collect()
    }

    /// 添加区域，同名区域被替换
    pub fn add(&mut self, zone: Zone) {
        match self.find_zone_id(&zone.name) {
            Some(i) => self.zones[i] = zone,
            None => self.zones.push(zone),
        }
        self.lookup.invalidate();
    }

    /// 按名称查找
    pub fn find_zone_id(&self, name: &str) -> Option<usize> {
        self.zones.iter().position(|z| z.name == name)
    }

    /// 按名称取区域
    pub fn get(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name == name)
    }

    /// 实体到区域的反查表（属于多个区域时取第一个）
    pub fn whole_zone(&self) -> &HashMap<usize, usize> {
        self.lookup.get_or_eval(|| {
            let mut map = HashMap::new();
            for (zi, z) in self.zones.iter().enumerate() {
                for &i in &z.indices {
                    map.entry(i).or_insert(zi);
                }
            }
            map
        })
    }

    /// 实体所在区域
    pub fn which_zone(&self, index: usize) -> Option<usize> {
        self.whole_zone().get(&index).copied()
    }

    /// 清除反查表
    pub fn clear_addressing(&mut self) {
        self.lookup.invalidate();
    }

    /// 拓扑变化后重编号成员
    ///
    /// `reverse` 为 旧->新 表，已删除的实体从区域移除。面区域中
    /// `flipped` 内的新面翻转标记取反。
    pub fn topo_change(&mut self, reverse: &[Option<usize>], flipped: &BTreeSet<usize>) {
        for z in &mut self.zones {
            let has_flip = z.has_flip();
            let mut indices = Vec::with_capacity(z.indices.len());
            let mut flip = Vec::new();
            for (k, old) in z.indices.iter().enumerate() {
                if let Some(new) = reverse.get(*old).copied().flatten() {
                    indices.push(new);
                    if has_flip {
                        flip.push(z.flipped(k) ^ flipped.contains(&new));
                    }
                }
            }
            z.indices = indices;
            z.flip = flip;
        }
        self.lookup.invalidate();
    }

    /// 重分布后更新成员
    ///
    /// 成员关系以旧实体上的标记表示，随 `schedule` 重分布后取回新编号。
    pub fn distribute(&mut self, schedule: &DistributionSchedule, my_proc: usize) -> FoamResult<()> {
        let n_old = schedule
            .sub_map
            .iter()
            .flatten()
            .max()
            .map_or(0, |m| m + 1);
        for z in &mut self.zones {
            let mut member = vec![0u8; n_old];
            for (k, &i) in z.indices.iter().enumerate() {
                if i < n_old {
                    member[i] = if z.flipped(k) { 2 } else { 1 };
                }
            }
            let member = schedule.distribute(my_proc, &member)?;
            let has_flip = z.has_flip();
            z.indices = member
                .iter()
                .enumerate()
                .filter(|(_, m)| **m > 0)
                .map(|(i, _)| i)
                .collect();
            z.flip = if has_flip {
                member.iter().filter(|m| **m > 0).map(|m| *m == 2).collect()
            } else {
                Vec::new()
            };
        }
        self.lookup.invalidate();
        Ok(())
    }

    /// 成员编号是否都小于 `n`
    pub fn check(&self, n: usize) -> Result<(), String> {
        for z in &self.zones {
            if let Some(i) = z.indices.iter().find(|i| **i >= n) {
                return Err(format!(
                    "{} '{}' 成员 {} 越界 (实体数 {})",
                    self.kind.type_name(),
                    z.name,
                    i,
                    n
                ));
            }
            if z.has_flip() && z.flip.len() != z.indices.len() {
                return Err(format!("{} '{}' 翻转标记数不一致", self.kind.type_name(), z.name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_which_zone() {
        let mut zm = ZoneMesh::new(ZoneKind::Cell);
        zm.add(Zone::new("a", vec![0, 1]));
        zm.add(Zone::new("b", vec![1, 2]));
        assert_eq!(zm.which_zone(1), Some(0));
        assert_eq!(zm.which_zone(2), Some(1));
        assert_eq!(zm.which_zone(3), None);

        zm.add(Zone::new("a", vec![3]));
        assert_eq!(zm.which_zone(3), Some(0));
        assert_eq!(zm.which_zone(1), Some(1));
    }

    #[test]
    fn test_topo_change_renumbers_and_flips() {
        let mut zm = ZoneMesh::new(ZoneKind::Face);
        zm.add(Zone::with_flip("baffle", vec![0, 2, 3], vec![false, true, false]));
        // 旧面 2 被删除，旧面 3 变为新面 1 且翻转
        let reverse = vec![Some(0), None, None, Some(1)];
        let flipped: BTreeSet<usize> = [1].into_iter().collect();
        zm.topo_change(&reverse, &flipped);
        let z = zm.get("baffle").unwrap();
        assert_eq!(z.indices(), &[0, 1]);
        assert!(!z.flipped(0));
        assert!(z.flipped(1));
    }

    #[test]
    fn test_check_out_of_range() {
        let mut zm = ZoneMesh::new(ZoneKind::Point);
        zm.add(Zone::new("p", vec![5]));
        assert!(zm.check(6).is_ok());
        assert!(zm.check(5).is_err());
    }
}
