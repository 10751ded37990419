//! 奖励层：用户档案、奖励检查点、配饰商店
//!
//! 核心只在明确的检查点调用这里；同一道题的解题奖励最多发放一次
//! （rewarded_problems 标记保证幂等）。

pub mod profile;
pub mod shop;

use std::sync::Arc;

pub use profile::{JsonProfileStore, MemoryProfileStore, ProfileStore, UserProfile};
pub use shop::{accessories_by_slot, all_accessories, get_accessory, Accessory, SLOTS};

use chrono::Utc;

use crate::coach::CoachError;

/// 购买结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Purchased,
    AlreadyOwned,
    /// 差多少鱼币
    NotEnoughCurrency(i64),
    UnknownItem,
}

/// 奖励检查点：围绕 ProfileStore 的鱼币发放、解题计数与商店操作
#[derive(Clone)]
pub struct RewardCheckpoint {
    store: Arc<dyn ProfileStore>,
    coins_per_solve: i64,
}

impl RewardCheckpoint {
    pub fn new(store: Arc<dyn ProfileStore>, coins_per_solve: i64) -> Self {
        Self {
            store,
            coins_per_solve,
        }
    }

    pub fn store(&self) -> &Arc<dyn ProfileStore> {
        &self.store
    }

    /// 加鱼币，返回新余额
    pub fn award(&self, user_id: &str, amount: i64) -> Result<i64, CoachError> {
        let mut profile = self.touch(user_id);
        profile.currency += amount;
        let balance = profile.currency;
        self.store.update(user_id, profile)?;
        Ok(balance)
    }

    /// 解题计数 +1，返回新计数
    pub fn record_solved(&self, user_id: &str) -> Result<u32, CoachError> {
        let mut profile = self.touch(user_id);
        profile.solved_questions += 1;
        let count = profile.solved_questions;
        self.store.update(user_id, profile)?;
        Ok(count)
    }

    /// 解题奖励检查点：同一 problem 仅发放一次。
    /// 返回是否实际发放（已发放过返回 false）。
    pub fn grant_solve(&self, user_id: &str, problem_key: &str) -> Result<bool, CoachError> {
        let mut profile = self.touch(user_id);
        if profile.rewarded_problems.contains(problem_key) {
            return Ok(false);
        }

        profile.rewarded_problems.insert(problem_key.to_string());
        profile.currency += self.coins_per_solve;
        profile.solved_questions += 1;
        self.store.update(user_id, profile)?;
        tracing::info!(user = user_id, problem = problem_key, "solve reward granted");
        Ok(true)
    }

    /// 购买配饰：校验存在、未拥有、余额充足
    pub fn purchase(&self, user_id: &str, item_id: &str) -> Result<PurchaseOutcome, CoachError> {
        let Some(item) = get_accessory(item_id) else {
            return Ok(PurchaseOutcome::UnknownItem);
        };

        let mut profile = self.touch(user_id);
        if profile.inventory.iter().any(|i| i == item_id) {
            return Ok(PurchaseOutcome::AlreadyOwned);
        }
        if profile.currency < item.price {
            return Ok(PurchaseOutcome::NotEnoughCurrency(
                item.price - profile.currency,
            ));
        }

        profile.currency -= item.price;
        profile.inventory.push(item_id.to_string());
        self.store.update(user_id, profile)?;
        Ok(PurchaseOutcome::Purchased)
    }

    /// 装备已拥有的配饰到其槽位；未拥有或未知配饰返回 false
    pub fn equip(&self, user_id: &str, item_id: &str) -> Result<bool, CoachError> {
        let Some(item) = get_accessory(item_id) else {
            return Ok(false);
        };

        let mut profile = self.touch(user_id);
        if !profile.inventory.iter().any(|i| i == item_id) {
            return Ok(false);
        }

        profile
            .equipped
            .insert(item.slot.to_string(), item_id.to_string());
        self.store.update(user_id, profile)?;
        Ok(true)
    }

    /// 卸下槽位上的配饰
    pub fn unequip(&self, user_id: &str, slot: &str) -> Result<(), CoachError> {
        let mut profile = self.touch(user_id);
        profile.equipped.remove(slot);
        self.store.update(user_id, profile)
    }

    /// 读档案，首次出现时补 created_at
    fn touch(&self, user_id: &str) -> UserProfile {
        let mut profile = self.store.get(user_id);
        if profile.created_at.is_none() {
            profile.created_at = Some(Utc::now());
        }
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkpoint() -> RewardCheckpoint {
        RewardCheckpoint::new(Arc::new(MemoryProfileStore::new()), 10)
    }

    #[test]
    fn test_award_and_solved_counter() {
        let rewards = checkpoint();
        assert_eq!(rewards.award("alma", 25).unwrap(), 25);
        assert_eq!(rewards.award("alma", 5).unwrap(), 30);
        assert_eq!(rewards.record_solved("alma").unwrap(), 1);
    }

    #[test]
    fn test_grant_solve_is_idempotent_per_problem() {
        let rewards = checkpoint();
        assert!(rewards.grant_solve("alma", "q1").unwrap());
        assert!(!rewards.grant_solve("alma", "q1").unwrap());
        assert!(rewards.grant_solve("alma", "q2").unwrap());

        let profile = rewards.store().get("alma");
        assert_eq!(profile.currency, 20);
        assert_eq!(profile.solved_questions, 2);
    }

    #[test]
    fn test_purchase_checks() {
        let rewards = checkpoint();
        assert_eq!(
            rewards.purchase("alma", "party_hat").unwrap(),
            PurchaseOutcome::NotEnoughCurrency(15)
        );

        rewards.award("alma", 100).unwrap();
        assert_eq!(
            rewards.purchase("alma", "party_hat").unwrap(),
            PurchaseOutcome::Purchased
        );
        assert_eq!(
            rewards.purchase("alma", "party_hat").unwrap(),
            PurchaseOutcome::AlreadyOwned
        );
        assert_eq!(
            rewards.purchase("alma", "jetpack").unwrap(),
            PurchaseOutcome::UnknownItem
        );

        assert_eq!(rewards.store().get("alma").currency, 85);
    }

    #[test]
    fn test_equip_requires_ownership() {
        let rewards = checkpoint();
        assert!(!rewards.equip("alma", "crown").unwrap());

        rewards.award("alma", 100).unwrap();
        rewards.purchase("alma", "crown").unwrap();
        assert!(rewards.equip("alma", "crown").unwrap());
        assert_eq!(
            rewards.store().get("alma").equipped.get("head").map(String::as_str),
            Some("crown")
        );

        rewards.unequip("alma", "head").unwrap();
        assert!(rewards.store().get("alma").equipped.get("head").is_none());
    }
}
