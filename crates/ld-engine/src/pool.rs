//! Prize pool configuration

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// A named collection of prize units.
///
/// `items` may repeat a label to represent several units of the same prize.
/// A pool without an item list holds `count` units that are all labelled
/// with the pool name. Invariant: `drawn_count <= capacity()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizePool {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<String>,
    /// Unit count for a pool without an item list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default)]
    pub drawn_count: usize,
    /// Grand-prize presentation
    #[serde(default)]
    pub is_headline: bool,
}

impl PrizePool {
    pub fn new(id: impl Into<String>, name: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            items,
            count: None,
            drawn_count: 0,
            is_headline: false,
        }
    }

    /// Builder: mark as headline prize
    pub fn headline(mut self) -> Self {
        self.is_headline = true;
        self
    }

    /// A pool of `count` identical units labelled with the pool name
    pub fn uniform(id: impl Into<String>, name: impl Into<String>, count: usize) -> Self {
        Self {
            count: Some(count),
            ..Self::new(id, name, Vec::new())
        }
    }

    /// Total units ever available
    pub fn capacity(&self) -> usize {
        if self.items.is_empty() {
            self.count.unwrap_or(0)
        } else {
            self.items.len()
        }
    }

    /// Units not yet drawn
    pub fn remaining(&self) -> usize {
        self.capacity().saturating_sub(self.drawn_count)
    }

    /// Every unit label, in pool order (item-less pools repeat the pool name)
    pub fn unit_labels(&self) -> Vec<String> {
        if self.items.is_empty() {
            vec![self.name.clone(); self.capacity()]
        } else {
            self.items.clone()
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

/// Expand `(label, count)` pairs into a flat unit list
pub fn generate_items(entries: &[(&str, usize)]) -> Vec<String> {
    entries
        .iter()
        .flat_map(|&(label, count)| std::iter::repeat_n(label.to_string(), count))
        .collect()
}

/// Ordered set of prize pools as configured for a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolSet {
    pub pools: Vec<PrizePool>,
}

impl PoolSet {
    pub fn new(pools: Vec<PrizePool>) -> Self {
        Self { pools }
    }

    /// The built-in company-party line-up
    pub fn festival() -> Self {
        let lucky = generate_items(&[
            ("Family Care Gift Set", 2),
            ("Good Fortune Plush", 1),
            ("Prosperity Plush", 1),
            ("Health Kettle", 2),
            ("High-Speed Blender", 1),
            ("Hair Dryer", 1),
            ("Power Bank", 1),
            ("Lumbar Cushion", 1),
            ("Heated Mouse Pad", 1),
            ("Folding Camp Table Set", 1),
            ("Electric Oven", 1),
            ("Camping Tent", 1),
            ("Clay Pot", 1),
            ("Smart Body Scale", 1),
            ("Neck Massage Pillow", 2),
            ("Bluetooth Selfie Stick", 1),
            ("Zodiac Horse Figure", 1),
            ("Scratch Cards & Lottery Tickets", 3),
        ]);

        Self::new(vec![
            PrizePool::new("first", "First Prize", vec!["HUAWEI Tablet".into()]).headline(),
            PrizePool::new("second", "Second Prize", generate_items(&[("Smart Watch", 2)])),
            PrizePool::new("third", "Third Prize", generate_items(&[("Smart Band", 5)])),
            PrizePool::new(
                "sunshine",
                "Sunshine Award",
                generate_items(&[("Paid Day Off", 5)]),
            ),
            PrizePool::new(
                "redpacket",
                "New Year Red Packet",
                generate_items(&[("88 Cash Red Packet", 5)]),
            ),
            PrizePool::new("lucky", "Lucky Award", lucky),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&PrizePool> {
        self.pools.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Reject duplicate ids and impossible draw counts
    pub fn validate(&self) -> ConfigResult<()> {
        for (i, pool) in self.pools.iter().enumerate() {
            if pool.id.is_empty() {
                return Err(ConfigError::InvalidParam(format!("pool #{i} has an empty id")));
            }
            if self.pools[..i].iter().any(|p| p.id == pool.id) {
                return Err(ConfigError::InvalidParam(format!("duplicate pool id: {}", pool.id)));
            }
            if pool.drawn_count > pool.capacity() {
                return Err(ConfigError::InvalidParam(format!(
                    "pool {}: drawn_count {} exceeds capacity {}",
                    pool.id,
                    pool.drawn_count,
                    pool.capacity()
                )));
            }
        }
        Ok(())
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let set: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => serde_yml::from_str(&content)?,
            _ => serde_json::from_str(&content)?,
        };
        set.validate()?;
        log::info!("Loaded {} prize pools from {}", set.len(), path.display());
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_items_expands_counts() {
        let items = generate_items(&[("Watch", 2), ("Band", 1)]);
        assert_eq!(items, vec!["Watch", "Watch", "Band"]);
    }

    #[test]
    fn test_festival_preset() {
        let set = PoolSet::festival();
        set.validate().unwrap();

        assert_eq!(set.len(), 6);
        assert!(set.get("first").unwrap().is_headline);
        assert_eq!(set.get("third").unwrap().capacity(), 5);
        assert_eq!(set.get("lucky").unwrap().capacity(), 23);
    }

    #[test]
    fn test_item_less_pool_without_count_is_empty() {
        let pool = PrizePool::new("none", "Nothing", vec![]);
        assert_eq!(pool.capacity(), 0);
        assert!(pool.is_exhausted());
    }

    #[test]
    fn test_remaining_saturates() {
        let mut pool = PrizePool::new("x", "X", vec!["a".into()]);
        assert_eq!(pool.remaining(), 1);
        pool.drawn_count = 1;
        assert!(pool.is_exhausted());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let set = PoolSet::new(vec![
            PrizePool::new("a", "A", vec![]),
            PrizePool::new("a", "Again", vec![]),
        ]);
        assert!(set.validate().is_err());
    }

    #[test]
    fn test_yaml_pools() {
        let yaml = r#"
pools:
  - id: grand
    name: Grand Prize
    items: [Car]
    is_headline: true
  - id: cash
    name: Cash
    count: 3
"#;
        let set: PoolSet = serde_yml::from_str(yaml).unwrap();
        set.validate().unwrap();
        assert!(set.get("grand").unwrap().is_headline);
        let cash = set.get("cash").unwrap();
        assert_eq!(cash.capacity(), 3);
        assert_eq!(cash.unit_labels(), vec!["Cash", "Cash", "Cash"]);
    }
}
