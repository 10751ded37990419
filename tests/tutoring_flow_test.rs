//! 辅导流程集成测试
//!
//! 用脚本化 Mock LLM 按轮推进完整会话，校验阶段转移、尝试计数与奖励发放。

use std::sync::Arc;

use coach::coach::{Coach, Stage, ValidationSubstate};
use coach::exam::QuestionBank;
use coach::llm::MockLlmClient;
use coach::rewards::{MemoryProfileStore, ProfileStore, RewardCheckpoint};

fn scripted_coach(replies: &[&str]) -> Coach {
    let llm = Arc::new(MockLlmClient::scripted(replies.iter().copied()));
    let mut coach = Coach::new(llm);
    coach.set_problem("Solve for x: 3x + 7 = 22", Some("sample_1".to_string()));
    coach
}

#[tokio::test]
async fn test_setup_then_first_attempt_then_failed_validation() {
    let mut coach = scripted_coach(&[
        "Okay! So what are we trying to find here?",
        "Good start! What's your next step?",
        "Nice! Walk me through how you figured that out?",
        "Hmm, not quite — check your division.",
    ]);

    // 问候：非实质性，停在 Setup
    coach.respond("hello").await.unwrap();
    assert_eq!(coach.state.stage, Stage::Setup);
    assert_eq!(coach.state.attempt_count, 0);

    // 首条实质性消息：计为第 1 次尝试
    coach.respond("first I subtract 7 from both sides").await.unwrap();
    assert_eq!(coach.state.stage, Stage::FirstAttempt);
    assert_eq!(coach.state.attempt_count, 1);

    // 答案断言：进验证，回复只是追问讲解（Neutral），验证轮标记完成
    coach.respond("x = 4").await.unwrap();
    assert_eq!(coach.state.stage, Stage::Validation);
    assert!(coach.state.student_claimed_answer);
    assert!(coach.state.answer_validated);
    assert_eq!(
        coach.state.validation_substate(),
        ValidationSubstate::AwaitingValidation
    );

    // 答案是错的：验证轮结算消耗一次尝试，回到辅导
    coach.respond("i divided wrong maybe").await.unwrap();
    assert_eq!(coach.state.attempt_count, 2);
    assert!(!coach.state.answer_validated);
    assert!(!coach.state.student_claimed_answer);
    assert_eq!(coach.state.stage, Stage::FirstAttempt);
}

#[tokio::test]
async fn test_correct_claim_explanation_and_single_reward() {
    let store = Arc::new(MemoryProfileStore::new());
    let llm = Arc::new(MockLlmClient::scripted([
        "Okay! What are we solving for?",
        "That's correct! Can you walk me through it?",
        "Perfect! You really understand this one.",
        "Well done again — want another problem?",
    ]));
    let mut coach =
        Coach::new(llm).with_rewards(RewardCheckpoint::new(store.clone(), 10), "alma");

    let bank = QuestionBank::sample();
    let q = bank.get(2).unwrap();
    coach.set_problem(q.problem_text(), Some(q.problem_id()));
    coach.set_correct_answer(q.choice(q.correct_answer).unwrap());

    coach.respond("first i set 3x - 2 equal to |x + 2|").await.unwrap();
    assert_eq!(coach.state.attempt_count, 1);

    // 断言正确答案：确认 → 等待讲解
    coach.respond("I got 2, is that the answer?").await.unwrap();
    assert!(coach.state.answer_is_correct);
    assert!(coach.state.awaiting_explanation);
    assert_eq!(
        coach.state.validation_substate(),
        ValidationSubstate::AwaitingExplanation
    );

    // 讲解通过：解决 + 发奖
    coach.respond("both sides equal 4 when x = 2").await.unwrap();
    assert!(coach.state.problem_solved);
    assert_eq!(
        coach.state.validation_substate(),
        ValidationSubstate::Resolved
    );

    // 解决后的反思轮再次命中完成词：不重复发奖
    coach.respond("that felt good").await.unwrap();
    assert_eq!(coach.state.stage, Stage::Reveal);

    let profile = store.get("alma");
    assert_eq!(profile.currency, 10);
    assert_eq!(profile.solved_questions, 1);
}

#[tokio::test]
async fn test_forced_reveal_is_sticky_until_new_problem() {
    let mut coach = scripted_coach(&["Here's the answer...", "More reflection.", "Fresh start!"]);

    coach.force_reveal();
    coach.respond("Please show me the answer").await.unwrap();
    assert_eq!(coach.state.stage, Stage::Reveal);

    // 后续任何消息都停留在 Reveal
    coach.respond("first i would try dividing").await.unwrap();
    assert_eq!(coach.state.stage, Stage::Reveal);

    // 换题清除粘滞
    coach.set_problem("Solve for y: 2y - 4 = 10", None);
    assert!(!coach.state.reveal_now);
    coach.respond("hello").await.unwrap();
    assert_eq!(coach.state.stage, Stage::Setup);
}

#[tokio::test]
async fn test_reveal_encouragement_never_confirms_or_rewards() {
    let store = Arc::new(MemoryProfileStore::new());
    let llm = Arc::new(MockLlmClient::scripted([
        "Well done giving it a shot! The answer is x = 5. First, subtract 7 from both sides...",
        "Perfect — now you know the trick for next time.",
    ]));
    let mut coach =
        Coach::new(llm).with_rewards(RewardCheckpoint::new(store.clone(), 10), "alma");
    coach.set_problem("Solve for x: 3x + 7 = 22", Some("sample_1".to_string()));
    coach.state.attempt_count = 3;

    // 揭示阶段的鼓励措辞会命中确认/完成词，但学生从未断言过答案
    coach.force_reveal();
    coach.respond("Please show me the answer").await.unwrap();
    coach.respond("oh i see, thanks").await.unwrap();

    assert_eq!(coach.state.stage, Stage::Reveal);
    assert!(!coach.state.answer_is_correct);
    assert!(!coach.state.awaiting_explanation);
    assert!(!coach.state.problem_solved);

    let profile = store.get("alma");
    assert_eq!(profile.currency, 0);
    assert_eq!(profile.solved_questions, 0);
}

#[tokio::test]
async fn test_extended_help_keeps_coaching() {
    let mut coach = scripted_coach(&["Hint 1", "Hint 2", "Hint 3"]);
    coach.state.attempt_count = 5;

    for msg in [
        "i tried multiplying both sides",
        "then i added 7",
        "still stuck on the division",
    ] {
        coach.respond(msg).await.unwrap();
        assert_eq!(coach.state.stage, Stage::ExtendedHelp);
    }
    // 尝试再多也不自动揭示
    assert!(!coach.state.reveal_now);
}

#[tokio::test]
async fn test_work_history_records_raw_messages() {
    let mut coach = scripted_coach(&["a", "b"]);
    coach.respond("hello").await.unwrap();
    coach.respond("x = 5").await.unwrap();
    assert_eq!(coach.state.work_history, vec!["hello", "x = 5"]);
}
