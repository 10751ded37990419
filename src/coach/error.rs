//! 辅导核心错误类型
//!
//! 配置错误在启动时即致命；生成调用失败按轮次失败上抛，不自动重试。

use thiserror::Error;

use crate::llm::LlmError;

#[derive(Error, Debug)]
pub enum CoachError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("No problem loaded")]
    NoProblem,

    #[error("Profile store error: {0}")]
    Profile(String),
}
