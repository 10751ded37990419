//! Coach - Rust 代数辅导智能体
//!
//! 模块划分：
//! - **coach**: 辅导核心（阶段状态机、启发式分类器、会话状态、轮次编排）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **exam**: 题目记录与题库（摄取接口的消费侧）
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Mock）
//! - **rewards**: 用户档案、解题奖励检查点、配饰商店

pub mod coach;
pub mod config;
pub mod exam;
pub mod llm;
pub mod observability;
pub mod rewards;

pub use coach::{process_turn, Coach, CoachError, Stage, TurnOutcome, TurnRequest};
