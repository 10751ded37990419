//! LLM 层：客户端抽象与实现（OpenAI 兼容 / Mock）

pub mod mock;
pub mod openai;
pub mod traits;

use std::sync::Arc;

use crate::config::AppConfig;

pub use mock::MockLlmClient;
pub use openai::{OpenAiClient, TokenUsage};
pub use traits::{LlmClient, LlmError, Message, Role};

/// 根据配置创建 LLM 客户端。
///
/// provider = "mock" 时返回 Mock（离线/测试）；否则要求 API Key
/// （配置项或 OPENAI_API_KEY 环境变量），缺失即为致命配置错误，不回退。
pub fn create_llm_from_config(cfg: &AppConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    let provider = cfg.llm.provider.to_lowercase();

    if provider == "mock" {
        tracing::warn!("Using Mock LLM (provider = mock)");
        return Ok(Arc::new(MockLlmClient::new()));
    }

    let api_key = cfg
        .llm
        .api_key
        .clone()
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .ok_or_else(|| LlmError::MissingApiKey(provider.clone()))?;

    let base = cfg.llm.base_url.as_deref();
    tracing::info!("Using OpenAI-compatible LLM ({})", cfg.llm.model);
    Ok(Arc::new(OpenAiClient::new(base, &cfg.llm.model, &api_key)))
}
