//! 试题层：已抽取的题目记录与题库
//!
//! 核心只消费抽取完成的 (题面, 选项, 正确选项) 记录；PDF / 图像的版面
//! 解析由外部摄取方完成。题库可从 JSON 文件加载，另内置一组样例题。

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::coach::CoachError;

fn default_correct_answer() -> u32 {
    1
}

/// 单道选择题（correct_answer 为 1 起始的选项号）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub number: u32,
    pub text: String,
    pub choices: Vec<String>,
    #[serde(default = "default_correct_answer")]
    pub correct_answer: u32,
    #[serde(default)]
    pub page: u32,
}

impl Question {
    /// 渲染成交给教练的题面：正文 + 选项列表
    pub fn problem_text(&self) -> String {
        if self.choices.is_empty() {
            return self.text.clone();
        }
        format!("{}\n\nChoices:\n{}", self.text, self.choices.join("\n"))
    }

    /// 题目标识（奖励检查点的幂等键）
    pub fn problem_id(&self) -> String {
        format!("q{}_{}", self.page, self.number)
    }

    pub fn choice(&self, n: u32) -> Option<&str> {
        if n == 0 {
            return None;
        }
        self.choices.get((n - 1) as usize).map(String::as_str)
    }
}

/// 从 "(2) some text" 形式的选项串取出选项号，取不出返回 0
pub fn selected_answer_number(choice: &str) -> u32 {
    let choice = choice.trim();
    if let Some(rest) = choice.strip_prefix('(') {
        if let Some(end) = rest.find(')') {
            if let Ok(n) = rest[..end].trim().parse() {
                return n;
            }
        }
    }
    0
}

/// 一组题目
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// 从 JSON 文件加载（顶层为 Question 数组）
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CoachError> {
        let data = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CoachError::Config(format!("question bank: {}", e)))?;
        let questions: Vec<Question> = serde_json::from_str(&data)
            .map_err(|e| CoachError::Config(format!("question bank: {}", e)))?;
        Ok(Self { questions })
    }

    /// 内置样例题（Regents 风格）
    pub fn sample() -> Self {
        let questions = vec![
            Question {
                number: 1,
                text: "A part of Jennifer's work to solve the equation 2(6x² − 3) = 11x² − x is shown below.\n\nGiven: 2(6x² − 3) = 11x² − x\nStep 1: 12x² − 6 = 11x² − x\n\nWhich property justifies her first step?".to_string(),
                choices: vec![
                    "(1) identity property of multiplication".to_string(),
                    "(2) multiplication property of equality".to_string(),
                    "(3) commutative property of multiplication".to_string(),
                    "(4) distributive property of multiplication over subtraction".to_string(),
                ],
                correct_answer: 4,
                page: 2,
            },
            Question {
                number: 2,
                text: "Which value of x results in equal outputs for j(x) = 3x − 2 and b(x) = |x + 2|?".to_string(),
                choices: vec![
                    "(1) −2".to_string(),
                    "(2) 2".to_string(),
                    "(3) 2/3".to_string(),
                    "(4) 4".to_string(),
                ],
                correct_answer: 2,
                page: 2,
            },
            Question {
                number: 3,
                text: "The expression 49x² − 36 is equivalent to".to_string(),
                choices: vec![
                    "(1) (7x − 6)²".to_string(),
                    "(2) (24.5x − 18)²".to_string(),
                    "(3) (7x − 6)(7x + 6)".to_string(),
                    "(4) (24.5x − 18)(24.5x + 18)".to_string(),
                ],
                correct_answer: 3,
                page: 2,
            },
        ];
        Self { questions }
    }

    pub fn get(&self, number: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.number == number)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}
