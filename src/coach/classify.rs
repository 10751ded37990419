//! 启发式文本分类：实质性尝试、答案断言、回复判定
//!
//! 全部为词表包含匹配（非语义验证），表驱动，便于单独测试与扩充词表。
//! 已知缺口：词表不做否定处理（"it's NOT 5" 仍会命中断言词），沿用原有启发式，见 DESIGN.md。

/// 非实质性消息：问候、求助、表达困惑（需与归一化后的消息完全相等）
const NON_SUBSTANTIVE: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "help",
    "?",
    "what",
    "how",
    "why",
    "i don't know",
    "idk",
    "i'm stuck",
    "confused",
];

/// 实质性标记：运算符、变量字母、推理连接词、代数词汇（包含即命中）
const SUBSTANTIVE_MARKERS: &[&str] = &[
    "+", "-", "*", "/", "=", "x", "y", "first", "then", "so", "because", "if", "multiply",
    "divide", "add", "subtract", "equation", "solve", "variable",
];

/// 答案断言词：故意偏宽，"is it 5?" 这类疑问也按断言处理
const ANSWER_INDICATORS: &[&str] = &[
    "is the answer",
    "my answer",
    "i got",
    "the answer is",
    "i think it's",
    "it equals",
    "x =",
    "x=",
    "= ",
    "equals",
    "answer:",
    "final answer",
    "solution is",
    "it's ",
    "is it",
    "would it be",
    "i believe",
];

/// 确认词（强信号）：命中即判 Correct，优先级高于否定词
const CONFIRM_PHRASES: &[&str] = &[
    "that's correct",
    "is correct",
    "you're correct",
    "that's the right answer",
    "the right answer",
    "you got it",
    "you nailed it",
    "exactly right",
    "you solved it",
    "problem solved",
    "well done",
    "great work",
    "perfect",
    "nice work",
    "good job",
    "that's it!",
];

/// 否定/质疑词：仅在无确认词时检查
const REJECT_PHRASES: &[&str] = &[
    "not quite",
    "not correct",
    "incorrect",
    "try again",
    "not right",
    "that's not",
    "wrong",
    "close but",
    "almost",
    "not exactly",
    "let's think",
    "think about",
    "check your",
    "look again",
    "careful",
    "watch out",
    "hmm",
    "are you sure",
];

/// 完成词（确认词的更严格子集）：讲解通过、问题真正解决时教练会用的措辞
const COMPLETION_PHRASES: &[&str] = &[
    "perfect",
    "excellent",
    "you nailed it",
    "great job",
    "well done",
    "you really understand",
    "nice work",
];

/// 生成器回复的判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 确认答案正确
    Correct,
    /// 否定或质疑
    Incorrect,
    /// 尚无结论（如仍在追问讲解）
    Neutral,
}

/// 判断学生消息是否为实质性解题尝试（而非问候/含糊提问）。
///
/// 有意偏向误报：含连接词但无数学内容的消息也算尝试，宁可推进对话也不停滞。
pub fn is_substantive(message: &str) -> bool {
    let msg = message.trim().to_lowercase();

    if msg.len() < 3 || NON_SUBSTANTIVE.contains(&msg.as_str()) {
        return false;
    }

    SUBSTANTIVE_MARKERS.iter().any(|m| msg.contains(m))
}

/// 判断学生消息是否在断言一个最终答案
pub fn is_answer_claim(message: &str) -> bool {
    let msg = message.to_lowercase();
    ANSWER_INDICATORS.iter().any(|p| msg.contains(p))
}

/// 从教练回复判定正误结论。
///
/// 严格按优先级：确认词先查且命中即胜（"almost, but I see you got it"
/// 同时含犹疑词时不误判为 Incorrect）；其次否定词；都未命中为 Neutral。
pub fn classify_reply(reply: &str) -> Outcome {
    let reply = reply.to_lowercase();

    if CONFIRM_PHRASES.iter().any(|p| reply.contains(p)) {
        return Outcome::Correct;
    }

    if REJECT_PHRASES.iter().any(|p| reply.contains(p)) {
        return Outcome::Incorrect;
    }

    Outcome::Neutral
}

/// 回复是否命中完成词（讲解环节通过的标志）
pub fn is_completion(reply: &str) -> bool {
    let reply = reply.to_lowercase();
    COMPLETION_PHRASES.iter().any(|p| reply.contains(p))
}
