//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `COACH__*` 覆盖（双下划线表示嵌套，
//! 如 `COACH__LLM__PROVIDER=mock`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub rewards: RewardsSection,
}

/// [app] 段：应用名与默认用户
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: Option<String>,
    /// 无登录时使用的用户 id
    pub default_user: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            default_user: "student".to_string(),
        }
    }
}

/// [llm] 段：后端选择
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：openai（任意兼容端点）/ mock（离线）
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    /// 不设置时回退 OPENAI_API_KEY 环境变量
    pub api_key: Option<String>,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            api_key: None,
        }
    }
}

/// [rewards] 段：每题奖励与档案文件
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RewardsSection {
    /// 每解出一题发放的鱼币数
    pub coins_per_solve: i64,
    /// 设置后用 JSON 文件档案存储，否则仅内存
    pub profile_path: Option<PathBuf>,
}

impl Default for RewardsSection {
    fn default() -> Self {
        Self {
            coins_per_solve: 10,
            profile_path: None,
        }
    }
}

/// 从 config 目录加载配置，环境变量 COACH__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 COACH__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("COACH")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
