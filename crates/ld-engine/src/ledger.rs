//! Inventory ledger — prize pools, remaining capacity, draw history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::participant::{Participant, RevealMark, Winner};
use crate::pool::{PoolSet, PrizePool};

/// One committed draw. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub pool_id: String,
    pub pool_name: String,
    pub winners: Vec<Winner>,
    pub timestamp: DateTime<Utc>,
}

/// Tracks how much of every pool has been drawn.
///
/// `drawn_count` only grows, through [`InventoryLedger::reserve_and_commit`],
/// until an explicit [`InventoryLedger::reset_all`].
#[derive(Debug, Clone, Default)]
pub struct InventoryLedger {
    pools: Vec<PrizePool>,
    history: Vec<DrawRecord>,
    /// `drawn_count` per pool as configured, before any recorded draw
    configured: Vec<usize>,
}

impl InventoryLedger {
    pub fn new(pools: PoolSet) -> Self {
        let configured = pools.pools.iter().map(|p| p.drawn_count).collect();
        Self {
            pools: pools.pools,
            history: Vec::new(),
            configured,
        }
    }

    pub fn pools(&self) -> &[PrizePool] {
        &self.pools
    }

    pub fn pool(&self, pool_id: &str) -> Option<&PrizePool> {
        self.pools.iter().find(|p| p.id == pool_id)
    }

    pub fn history(&self) -> &[DrawRecord] {
        &self.history
    }

    /// Units left in a pool; 0 for an exhausted or unknown pool
    pub fn remaining_capacity(&self, pool_id: &str) -> usize {
        self.pool(pool_id).map_or(0, PrizePool::remaining)
    }

    /// Unit labels not yet handed out, in pool order.
    ///
    /// Units are consumed in shuffled order, so the leftovers are the pool's
    /// units minus every item already assigned from it.
    pub fn remaining_items(&self, pool_id: &str) -> Vec<String> {
        let Some(pool) = self.pool(pool_id) else {
            return Vec::new();
        };

        let mut left = pool.unit_labels();
        let assigned = self
            .history
            .iter()
            .filter(|r| r.pool_id == pool_id)
            .flat_map(|r| r.winners.iter().map(|w| w.assigned_item.as_str()));
        for item in assigned {
            if let Some(pos) = left.iter().position(|l| l == item) {
                left.remove(pos);
            }
        }

        // Pre-drawn units from configuration have no history entry
        let excess = left.len().saturating_sub(pool.remaining());
        left.drain(..excess);
        left
    }

    /// Commit a completed draw.
    ///
    /// Fails without mutating anything when the pool is unknown, when the
    /// winners do not fit the remaining capacity, or when winners and items
    /// differ in length.
    pub fn reserve_and_commit(
        &mut self,
        pool_id: &str,
        winners: &[Participant],
        assigned_items: &[String],
    ) -> LedgerResult<&DrawRecord> {
        let idx = self
            .pools
            .iter()
            .position(|p| p.id == pool_id)
            .ok_or_else(|| LedgerError::UnknownPool(pool_id.to_string()))?;

        let remaining = self.pools[idx].remaining();
        debug_assert!(
            winners.len() <= remaining,
            "orchestrator must clamp to capacity before sampling"
        );
        if winners.len() > remaining {
            return Err(LedgerError::CapacityExceeded {
                pool_id: pool_id.to_string(),
                requested: winners.len(),
                remaining,
            });
        }
        if winners.len() != assigned_items.len() {
            return Err(LedgerError::ItemMismatch {
                pool_id: pool_id.to_string(),
                winners: winners.len(),
                items: assigned_items.len(),
            });
        }

        let pool = &mut self.pools[idx];
        pool.drawn_count += winners.len();

        let record = DrawRecord {
            pool_id: pool.id.clone(),
            pool_name: pool.name.clone(),
            winners: winners
                .iter()
                .zip(assigned_items)
                .map(|(p, item)| Winner {
                    participant: p.clone(),
                    assigned_item: item.clone(),
                    revealing: RevealMark::Revealed,
                })
                .collect(),
            timestamp: Utc::now(),
        };

        log::info!(
            "Committed {} winner(s) to pool '{}' ({}/{} drawn)",
            record.winners.len(),
            pool.id,
            pool.drawn_count,
            pool.capacity()
        );

        let at = self.history.len();
        self.history.push(record);
        Ok(&self.history[at])
    }

    /// Irreversible: every pool back to zero drawn, history cleared
    pub fn reset_all(&mut self) {
        for pool in &mut self.pools {
            pool.drawn_count = 0;
        }
        self.history.clear();
        log::info!("Ledger reset: {} pools cleared", self.pools.len());
    }

    /// Rebuild drawn counts from persisted history, on top of the counts the
    /// pools were configured with.
    ///
    /// All-or-nothing: a record for an unknown pool or one that would overflow
    /// a pool leaves the ledger as it was.
    pub fn restore(&mut self, history: Vec<DrawRecord>) -> LedgerResult<()> {
        let mut pools = self.pools.clone();
        for (pool, &configured) in pools.iter_mut().zip(&self.configured) {
            pool.drawn_count = configured;
        }

        for record in &history {
            let pool = pools
                .iter_mut()
                .find(|p| p.id == record.pool_id)
                .ok_or_else(|| LedgerError::UnknownPool(record.pool_id.clone()))?;
            if record.winners.len() > pool.remaining() {
                return Err(LedgerError::CapacityExceeded {
                    pool_id: record.pool_id.clone(),
                    requested: record.winners.len(),
                    remaining: pool.remaining(),
                });
            }
            pool.drawn_count += record.winners.len();
        }

        self.pools = pools;
        self.history = history;
        log::info!("Ledger restored from {} history records", self.history.len());
        Ok(())
    }
}
