//! 用户档案：键值记录存取
//!
//! 奖励协作方的本地实现。记录字段全部带默认值：残缺档案解析为默认值，
//! 绝不让一轮辅导因此崩溃。

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coach::CoachError;

/// 单个用户的档案记录（鱼币余额、解题计数、装扮）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    /// 鱼币余额
    #[serde(default)]
    pub currency: i64,
    #[serde(default)]
    pub solved_questions: u32,
    /// 已购配饰 id
    #[serde(default)]
    pub inventory: Vec<String>,
    /// 槽位 -> 已装备配饰 id
    #[serde(default)]
    pub equipped: HashMap<String, String>,
    /// 已发放过奖励的题目（奖励检查点的幂等标记）
    #[serde(default)]
    pub rewarded_problems: HashSet<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// 档案存储：get 对缺失用户返回默认档案，update 整体写回
pub trait ProfileStore: Send + Sync {
    fn get(&self, user_id: &str) -> UserProfile;
    fn update(&self, user_id: &str, profile: UserProfile) -> Result<(), CoachError>;
}

/// 内存档案存储（测试与无持久化场景）
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    users: Mutex<HashMap<String, UserProfile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn get(&self, user_id: &str) -> UserProfile {
        self.users
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    fn update(&self, user_id: &str, profile: UserProfile) -> Result<(), CoachError> {
        self.users
            .lock()
            .unwrap()
            .insert(user_id.to_string(), profile);
        Ok(())
    }
}

/// 单文件 JSON 档案存储：user_id -> UserProfile 的整表读写
#[derive(Debug)]
pub struct JsonProfileStore {
    path: PathBuf,
}

impl JsonProfileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// 文件不存在返回空表；解析失败视为损坏，记 warn 后按空表处理
    fn load(&self) -> HashMap<String, UserProfile> {
        let Ok(data) = std::fs::read_to_string(&self.path) else {
            return HashMap::new();
        };
        match serde_json::from_str(&data) {
            Ok(users) => users,
            Err(e) => {
                tracing::warn!("Malformed profile file {}: {}", self.path.display(), e);
                HashMap::new()
            }
        }
    }

    fn save(&self, users: &HashMap<String, UserProfile>) -> Result<(), CoachError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CoachError::Profile(e.to_string()))?;
        }
        let data =
            serde_json::to_string_pretty(users).map_err(|e| CoachError::Profile(e.to_string()))?;
        std::fs::write(&self.path, data).map_err(|e| CoachError::Profile(e.to_string()))
    }
}

impl ProfileStore for JsonProfileStore {
    fn get(&self, user_id: &str) -> UserProfile {
        self.load().get(user_id).cloned().unwrap_or_default()
    }

    fn update(&self, user_id: &str, profile: UserProfile) -> Result<(), CoachError> {
        let mut users = self.load();
        users.insert(user_id.to_string(), profile);
        self.save(&users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_defaults_for_unknown_user() {
        let store = MemoryProfileStore::new();
        let profile = store.get("nobody");
        assert_eq!(profile.currency, 0);
        assert_eq!(profile.solved_questions, 0);
        assert!(profile.inventory.is_empty());
    }

    #[test]
    fn test_json_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonProfileStore::new(dir.path().join("profiles.json"));

        let mut profile = store.get("alma");
        profile.currency = 42;
        profile.inventory.push("grad_cap".to_string());
        store.update("alma", profile).unwrap();

        let read_back = store.get("alma");
        assert_eq!(read_back.currency, 42);
        assert_eq!(read_back.inventory, vec!["grad_cap"]);
    }

    #[test]
    fn test_json_store_malformed_record_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");

        // 缺字段的记录照样解析，缺失处取默认
        std::fs::write(&path, r#"{"alma": {"currency": 7}}"#).unwrap();
        let store = JsonProfileStore::new(&path);
        let profile = store.get("alma");
        assert_eq!(profile.currency, 7);
        assert!(profile.rewarded_problems.is_empty());

        // 整个文件损坏时不崩溃，按空表处理
        std::fs::write(&path, "not json at all").unwrap();
        let profile = store.get("alma");
        assert_eq!(profile.currency, 0);
    }
}
