//! 阶段状态机：六个教学阶段与每轮转移契约
//!
//! 转移按严格优先级求值，首个命中即定；尝试计数更新在定阶之前执行。
//! 尝试次数达到上限不再自动揭示答案：无明确请求时一直辅导（ExtendedHelp）。

use crate::coach::classify;
use crate::coach::session::SessionState;

/// 教学阶段（每轮重算；Reveal 仅在 reveal_now / problem_solved 成立时保持）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// 新题起步
    Setup = 0,
    /// 初次尝试辅导（第 1-2 次）
    FirstAttempt = 1,
    /// 验证学生断言的答案
    Validation = 2,
    /// 诊断与修正（第 3-4 次）
    Diagnose = 3,
    /// 持续辅导（第 5 次及以后，不自动揭示）
    ExtendedHelp = 4,
    /// 答案揭示 / 解后反思
    Reveal = 5,
}

impl Stage {
    pub fn id(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Setup => "New Problem Setup",
            Stage::FirstAttempt => "First Attempt Coaching",
            Stage::Validation => "Validation Path",
            Stage::Diagnose => "Diagnose & Repair",
            Stage::ExtendedHelp => "Extended Help",
            Stage::Reveal => "Answer Reveal",
        }
    }
}

/// 定阶前的计数器更新，按顺序执行：
/// a. 消息追加进工作日志；
/// b. 首条实质性消息把计数从 0 提到 1（后续实质性消息不在此自增，
///    超过 1 只走下面的验证结算路径，属有意的不对称）；
/// c. 上一轮处于验证阶段且验证已完成而未解决：断言的答案是错的，
///    记一次消耗的尝试并复位验证标志，回到辅导。
pub fn update_counters(state: &mut SessionState, message: &str) {
    state.work_history.push(message.to_string());

    if classify::is_substantive(message) && state.attempt_count == 0 {
        state.attempt_count = 1;
    }

    if state.stage == Stage::Validation && state.answer_validated && !state.problem_solved {
        state.attempt_count += 1;
        state.answer_validated = false;
        state.student_claimed_answer = false;
    }
}

/// 确定本轮阶段并写回 state.stage。严格优先级，首个命中即返回：
/// 1. reveal_now（明确请求，粘滞）
/// 2. problem_solved（解后反思，非答案披露）
/// 3. 计数 0 → Setup
/// 4. 答案断言且未验证 → Validation（同时记录断言标志）
/// 5. 计数 1-2 → FirstAttempt
/// 6. 计数 3-4 → Diagnose
/// 7. 计数 ≥5 → ExtendedHelp（无限期辅导，从不自动揭示）
pub fn determine_stage(state: &mut SessionState, message: &str) -> Stage {
    let next = if state.reveal_now {
        Stage::Reveal
    } else if state.problem_solved {
        Stage::Reveal
    } else if state.attempt_count == 0 {
        Stage::Setup
    } else if classify::is_answer_claim(message) && !state.answer_validated {
        state.student_claimed_answer = true;
        Stage::Validation
    } else if matches!(state.attempt_count, 1 | 2) {
        Stage::FirstAttempt
    } else if matches!(state.attempt_count, 3 | 4) {
        Stage::Diagnose
    } else {
        Stage::ExtendedHelp
    };

    state.stage = next;
    next
}

/// 回复返回并分类之后调用：本轮处于验证阶段则无条件标记验证完成，
/// 供下一轮 update_counters 消费（严格延迟一轮的尝试自增）。
pub fn complete_validation_round(state: &mut SessionState) {
    if state.stage == Stage::Validation {
        state.answer_validated = true;
    }
}
