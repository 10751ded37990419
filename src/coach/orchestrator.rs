//! 轮次编排：一次请求/响应循环的组装
//!
//! 顺序：计数器更新 → 定阶 → 组装指令载荷 → 调用生成器 → 回复判定 →
//! 验证/讲解/解决标志更新 → 奖励检查点（每题至多一次）。副作用仅限
//! 会话状态与奖励检查点调用；生成器失败按轮次失败上抛。

use std::sync::Arc;

use crate::coach::classify::{self, Outcome};
use crate::coach::error::CoachError;
use crate::coach::prompt::{self, StageContext};
use crate::coach::session::{Confidence, SessionState};
use crate::coach::stage;
use crate::llm::{LlmClient, Message};
use crate::rewards::RewardCheckpoint;

/// 辅导教练：独占持有一个会话的状态。
///
/// 同一会话严格串行（一轮完整结束才能开始下一轮）；不同会话各自持有
/// Coach 实例，可并行，无共享可变状态。
pub struct Coach {
    llm: Arc<dyn LlmClient>,
    pub state: SessionState,
    rewards: Option<RewardCheckpoint>,
    user_id: String,
    session_id: String,
}

impl Coach {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            state: SessionState::new(),
            rewards: None,
            user_id: "student".to_string(),
            session_id: format!("session_{}", uuid::Uuid::new_v4()),
        }
    }

    /// 挂接奖励检查点与对应用户
    pub fn with_rewards(mut self, rewards: RewardCheckpoint, user_id: impl Into<String>) -> Self {
        self.rewards = Some(rewards);
        self.user_id = user_id.into();
        self
    }

    pub fn set_problem(&mut self, problem: impl Into<String>, problem_id: Option<String>) {
        self.state.set_problem(problem, problem_id);
        tracing::info!(session = %self.session_id, "new problem loaded");
    }

    /// 题目已知的标准答案（仅插值进系统提示，核心不据此判分）
    pub fn set_correct_answer(&mut self, answer: impl Into<String>) {
        self.state.correct_answer = Some(answer.into());
    }

    pub fn set_student_profile(&mut self, age_band: impl Into<String>, confidence: Option<Confidence>) {
        self.state.student_age_band = age_band.into();
        self.state.confidence = confidence;
    }

    /// 明确请求揭示答案（粘滞，直到换题）
    pub fn force_reveal(&mut self) {
        self.state.reveal_now = true;
        self.state.stage = stage::Stage::Reveal;
    }

    /// 外部直接判定本题已解（如选择题对了正确选项）
    pub fn mark_correct(&mut self) {
        self.state.problem_solved = true;
    }

    /// 处理一条学生消息，返回教练回复。
    ///
    /// 生成器调用是唯一挂起点；调用失败前已发生的计数/阶段更新不回滚
    /// （接受的幂等性风险，见 DESIGN.md）。
    pub async fn respond(&mut self, message: &str) -> Result<String, CoachError> {
        if self.state.problem.is_empty() {
            return Err(CoachError::NoProblem);
        }

        stage::update_counters(&mut self.state, message);
        let current = stage::determine_stage(&mut self.state, message);
        tracing::debug!(
            session = %self.session_id,
            stage = current.id(),
            attempts = self.state.attempt_count,
            "stage determined"
        );

        let system = prompt::build_system_prompt(&self.state);
        let query = prompt::build_query(&StageContext::of(&self.state), message);

        let reply = self
            .llm
            .complete(&[Message::system(system), Message::user(query)])
            .await?;

        let outcome = classify::classify_reply(&reply);
        self.apply_outcome(&reply, outcome);
        stage::complete_validation_round(&mut self.state);
        self.state.assert_invariants();

        Ok(reply)
    }

    /// 回复判定的下游效果：验证阶段的首次确认 → 进入讲解环节；
    /// 讲解环节再次确认且命中完成词 → 题目解决并触发奖励检查点。
    fn apply_outcome(&mut self, reply: &str, outcome: Outcome) {
        if outcome != Outcome::Correct {
            return;
        }

        if !self.state.answer_is_correct {
            // 确认只对验证通道内的答案声明生效；揭示/辅导阶段的
            // 鼓励措辞（"Well done" 等）不构成对学生答案的判定
            if self.state.stage != stage::Stage::Validation {
                return;
            }
            self.state.answer_is_correct = true;
            self.state.awaiting_explanation = true;
            tracing::debug!(session = %self.session_id, "answer confirmed, awaiting explanation");
        } else if self.state.awaiting_explanation && classify::is_completion(reply) {
            self.state.problem_solved = true;
            self.state.awaiting_explanation = false;
            tracing::info!(session = %self.session_id, "problem solved");

            if let Some(rewards) = &self.rewards {
                let key = self
                    .state
                    .problem_id
                    .clone()
                    .unwrap_or_else(|| self.state.problem.clone());
                // 奖励入账失败不吞掉整轮回复，记 warn 继续
                if let Err(e) = rewards.grant_solve(&self.user_id, &key) {
                    tracing::warn!("reward grant failed: {}", e);
                }
            }
        }
    }
}

/// 无状态轮次请求：会话连续性的标志由调用方携带
#[derive(Debug, Clone, Default)]
pub struct TurnRequest {
    pub problem: String,
    pub student_message: String,
    pub attempt_count: u32,
    pub reveal_now: bool,
    pub correct_answer: Option<String>,
    pub answer_is_correct: bool,
    pub awaiting_explanation: bool,
    pub problem_id: Option<String>,
    pub student_age_band: Option<String>,
    pub confidence: Option<Confidence>,
}

/// 无状态轮次结果
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub response: String,
    pub answer_is_correct: bool,
    pub awaiting_explanation: bool,
    pub problem_solved: bool,
}

/// 程序化单轮 API：核心自身不跨调用保存状态。
pub async fn process_turn(
    llm: Arc<dyn LlmClient>,
    req: TurnRequest,
) -> Result<TurnOutcome, CoachError> {
    let mut coach = Coach::new(llm);
    coach.set_problem(req.problem, req.problem_id);

    coach.state.attempt_count = req.attempt_count;
    coach.state.reveal_now = req.reveal_now;
    coach.state.correct_answer = req.correct_answer;
    // 不变式：awaiting_explanation 蕴含 answer_is_correct
    coach.state.answer_is_correct = req.answer_is_correct || req.awaiting_explanation;
    coach.state.awaiting_explanation = req.awaiting_explanation;
    if let Some(age_band) = req.student_age_band {
        coach.state.student_age_band = age_band;
    }
    coach.state.confidence = req.confidence;

    let response = coach.respond(&req.student_message).await?;

    Ok(TurnOutcome {
        response,
        answer_is_correct: coach.state.answer_is_correct,
        awaiting_explanation: coach.state.awaiting_explanation,
        problem_solved: coach.state.problem_solved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coach::stage::Stage;
    use crate::llm::MockLlmClient;
    use crate::rewards::{MemoryProfileStore, ProfileStore, RewardCheckpoint};

    fn coach_with(replies: &[&str]) -> Coach {
        let llm = Arc::new(MockLlmClient::scripted(replies.iter().copied()));
        let mut coach = Coach::new(llm);
        coach.set_problem("Solve for x: 3x + 7 = 22", Some("q1".to_string()));
        coach
    }

    #[tokio::test]
    async fn test_respond_requires_problem() {
        let mut coach = Coach::new(Arc::new(MockLlmClient::new()));
        assert!(matches!(
            coach.respond("hello").await,
            Err(CoachError::NoProblem)
        ));
    }

    #[tokio::test]
    async fn test_first_correct_enters_explanation_round() {
        let mut coach = coach_with(&["That's correct! Can you walk me through it?"]);
        coach.state.attempt_count = 1;

        coach.respond("x = 5").await.unwrap();

        assert_eq!(coach.state.stage, Stage::Validation);
        assert!(coach.state.answer_is_correct);
        assert!(coach.state.awaiting_explanation);
        assert!(!coach.state.problem_solved);
        // 验证轮完成标记已写，等待下一轮消费
        assert!(coach.state.answer_validated);
    }

    #[tokio::test]
    async fn test_completion_after_explanation_solves_problem() {
        let mut coach = coach_with(&[
            "That's correct! Can you walk me through it?",
            "Perfect! You really understand this one.",
        ]);
        coach.state.attempt_count = 1;

        coach.respond("x = 5").await.unwrap();
        coach.respond("i subtracted 7 then divided by 3").await.unwrap();

        assert!(coach.state.problem_solved);
        assert!(!coach.state.awaiting_explanation);
    }

    #[tokio::test]
    async fn test_first_correct_never_solves_even_with_completion_phrase() {
        let mut coach = coach_with(&["Perfect! You got it!"]);
        coach.state.attempt_count = 1;

        coach.respond("x = 5").await.unwrap();

        // 首次确认只进入讲解环节，完成词不直接跳到解决
        assert!(coach.state.awaiting_explanation);
        assert!(!coach.state.problem_solved);
    }

    #[tokio::test]
    async fn test_confirmation_outside_validation_is_ignored() {
        // 辅导阶段的鼓励语也会命中确认词，但没有答案断言就没有判定
        let mut coach = coach_with(&["Great work so far! Keep going with that idea."]);
        coach.state.attempt_count = 1;

        coach.respond("first i subtract 7").await.unwrap();

        assert_eq!(coach.state.stage, Stage::FirstAttempt);
        assert!(!coach.state.answer_is_correct);
        assert!(!coach.state.awaiting_explanation);
    }

    #[tokio::test]
    async fn test_reward_granted_once_per_problem() {
        let store = Arc::new(MemoryProfileStore::new());
        let llm = Arc::new(MockLlmClient::scripted([
            "That's correct! Walk me through it?",
            "Perfect! You really understand this one.",
            "Well done! Perfect explanation all over again!",
        ]));
        let mut coach = Coach::new(llm)
            .with_rewards(RewardCheckpoint::new(store.clone(), 10), "alma");
        coach.set_problem("Solve for x: 3x + 7 = 22", Some("q1".to_string()));
        coach.state.attempt_count = 1;

        coach.respond("x = 5").await.unwrap();
        coach.respond("i subtracted 7 then divided by 3").await.unwrap();
        // 解决后的反思轮再次命中完成词，不再发奖
        coach.respond("i could do another").await.unwrap();

        let profile = store.get("alma");
        assert_eq!(profile.currency, 10);
        assert_eq!(profile.solved_questions, 1);
    }

    #[tokio::test]
    async fn test_solved_is_terminal_reveal() {
        let mut coach = coach_with(&["anything", "anything", "anything"]);
        coach.state.attempt_count = 2;
        coach.mark_correct();

        for msg in ["hello", "x = 9", "3 + 4 = 7"] {
            coach.respond(msg).await.unwrap();
            assert_eq!(coach.state.stage, Stage::Reveal);
        }
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        // 空脚本 Mock 会回显，不会失败；这里用一个始终报错的桩
        struct FailingLlm;

        #[async_trait::async_trait]
        impl crate::llm::LlmClient for FailingLlm {
            async fn complete(
                &self,
                _messages: &[Message],
            ) -> Result<String, crate::llm::LlmError> {
                Err(crate::llm::LlmError::Request("boom".to_string()))
            }
        }

        let mut coach = Coach::new(Arc::new(FailingLlm));
        coach.set_problem("p", None);
        assert!(matches!(
            coach.respond("first step?").await,
            Err(CoachError::Llm(_))
        ));
    }

    #[tokio::test]
    async fn test_process_turn_stateless_roundtrip() {
        let llm = Arc::new(MockLlmClient::scripted([
            "That's correct! Can you walk me through it?",
        ]));

        let outcome = process_turn(
            llm,
            TurnRequest {
                problem: "Solve for x: 3x + 7 = 22".to_string(),
                student_message: "x = 5".to_string(),
                attempt_count: 1,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(outcome.answer_is_correct);
        assert!(outcome.awaiting_explanation);
        assert!(!outcome.problem_solved);
        assert!(outcome.response.contains("correct"));
    }

    #[tokio::test]
    async fn test_process_turn_explanation_continuation() {
        let llm = Arc::new(MockLlmClient::scripted([
            "Perfect! You really understand this one.",
        ]));

        // 上一轮已确认正确，调用方带着标志续传
        let outcome = process_turn(
            llm,
            TurnRequest {
                problem: "Solve for x: 3x + 7 = 22".to_string(),
                student_message: "i subtracted 7 from both sides".to_string(),
                attempt_count: 1,
                awaiting_explanation: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(outcome.problem_solved);
        assert!(!outcome.awaiting_explanation);
    }
}
