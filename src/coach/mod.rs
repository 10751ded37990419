//! 辅导核心：阶段状态机、启发式分类器、会话状态与轮次编排

pub mod classify;
pub mod error;
pub mod orchestrator;
pub mod prompt;
pub mod session;
pub mod stage;

pub use classify::{classify_reply, is_answer_claim, is_completion, is_substantive, Outcome};
pub use error::CoachError;
pub use orchestrator::{process_turn, Coach, TurnOutcome, TurnRequest};
pub use prompt::{build_query, build_system_prompt, StageContext};
pub use session::{Confidence, SessionState, ValidationSubstate};
pub use stage::{complete_validation_round, determine_stage, update_counters, Stage};
