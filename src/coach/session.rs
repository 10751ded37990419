//! 会话状态：每道题一份，由编排器独占
//!
//! 计数器与验证标志构成嵌在 stage 内的小型次级状态机；validation_substate()
//! 提供可审计的合成视图（合法组合见 ValidationSubstate）。

use serde::{Deserialize, Serialize};

use crate::coach::stage::Stage;

/// 学生信心信号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Med,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Med => "med",
            Confidence::High => "high",
        }
    }
}

/// 验证子状态（由标志位推导的审计视图）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationSubstate {
    /// 无未决断言
    None,
    /// 学生已断言答案，等待验证轮完成
    AwaitingValidation,
    /// 答案已确认正确，等待学生讲解思路
    AwaitingExplanation,
    /// 讲解通过，问题解决（终态）
    Resolved,
}

/// 单个辅导会话的全部状态。
///
/// problem / problem_id / correct_answer 在 set_problem 后对本会话不可变；
/// attempt_count 单调不减，仅 set_problem 清零。
#[derive(Debug, Clone)]
pub struct SessionState {
    pub problem: String,
    pub problem_id: Option<String>,
    pub correct_answer: Option<String>,
    /// 实质性尝试次数
    pub attempt_count: u32,
    /// 每轮重新计算，不跨题持久
    pub stage: Stage,
    /// 一旦置真即粘滞，仅 set_problem 清除
    pub reveal_now: bool,
    pub student_claimed_answer: bool,
    pub answer_validated: bool,
    pub answer_is_correct: bool,
    pub awaiting_explanation: bool,
    pub problem_solved: bool,
    /// 学生原始消息的只追加日志，仅供审计，不回读入分类逻辑
    pub work_history: Vec<String>,
    pub student_age_band: String,
    pub confidence: Option<Confidence>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            problem: String::new(),
            problem_id: None,
            correct_answer: None,
            attempt_count: 0,
            stage: Stage::Setup,
            reveal_now: false,
            student_claimed_answer: false,
            answer_validated: false,
            answer_is_correct: false,
            awaiting_explanation: false,
            problem_solved: false,
            work_history: Vec::new(),
            student_age_band: "middle school".to_string(),
            confidence: None,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 载入新题：题面与编号更新，计数器与全部标志复位（学生画像保留）
    pub fn set_problem(&mut self, problem: impl Into<String>, problem_id: Option<String>) {
        self.problem = problem.into();
        self.problem_id = problem_id;
        self.correct_answer = None;
        self.attempt_count = 0;
        self.stage = Stage::Setup;
        self.reveal_now = false;
        self.student_claimed_answer = false;
        self.answer_validated = false;
        self.answer_is_correct = false;
        self.awaiting_explanation = false;
        self.problem_solved = false;
        self.work_history.clear();
    }

    /// 标志位的合成视图
    pub fn validation_substate(&self) -> ValidationSubstate {
        if self.problem_solved {
            ValidationSubstate::Resolved
        } else if self.awaiting_explanation {
            ValidationSubstate::AwaitingExplanation
        } else if self.student_claimed_answer {
            ValidationSubstate::AwaitingValidation
        } else {
            ValidationSubstate::None
        }
    }

    /// 标志位组合的约束检查（仅 debug 构建）
    pub(crate) fn assert_invariants(&self) {
        debug_assert!(
            !self.awaiting_explanation || self.answer_is_correct,
            "awaiting_explanation implies answer_is_correct"
        );
        debug_assert!(
            !self.problem_solved || !self.awaiting_explanation,
            "solved problems have no pending explanation"
        );
    }
}
