//! Coach - Rust 代数辅导智能体
//!
//! 入口：初始化日志、加载配置、创建 LLM 客户端与奖励检查点，运行交互式辅导会话。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};

use coach::coach::{Coach, Confidence};
use coach::config::load_config;
use coach::exam::{Question, QuestionBank};
use coach::llm::{create_llm_from_config, LlmClient};
use coach::observability;
use coach::rewards::{
    all_accessories, JsonProfileStore, MemoryProfileStore, ProfileStore, PurchaseOutcome,
    RewardCheckpoint,
};

const SAMPLE_PROBLEM: &str = "Solve for x: 3x + 7 = 22";

fn print_banner() {
    println!("\n{}", "=".repeat(60));
    println!("  Algebra Coach - Interactive Session");
    println!("{}", "=".repeat(60));
    println!("\nCommands:");
    println!("  /problem <text>  - Set a new problem");
    println!("  /bank [path]     - Load a question bank (JSON; no path = samples)");
    println!("  /q <n>           - Jump to question <n> from the bank");
    println!("  /answer <n>      - Submit choice <n> as your answer");
    println!("  /reveal          - Force reveal the answer");
    println!("  /correct         - Mark answer as correct");
    println!("  /status          - Show session state");
    println!("  /shop            - List accessories");
    println!("  /buy <id>        - Buy an accessory");
    println!("  /equip <id>      - Equip an owned accessory");
    println!("  /unequip <slot>  - Clear a slot (head/eyes/neck/back)");
    println!("  /reset           - Reset the session");
    println!("  /quit            - Exit");
    println!("{}\n", "=".repeat(60));
}

/// 把题库中的一道题装入会话（题面、幂等键与标准答案）
fn load_question(coach: &mut Coach, q: &Question) {
    coach.set_problem(q.problem_text(), Some(q.problem_id()));
    if let Some(answer) = q.choice(q.correct_answer) {
        coach.set_correct_answer(answer);
    }
    println!("\nQuestion {}:\n{}", q.number, q.problem_text());
}

async fn say(coach: &mut Coach, message: &str) {
    match coach.respond(message).await {
        Ok(reply) => println!("\nCoach: {}", reply),
        Err(e) => eprintln!("\nError: {}", e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let cfg = load_config(None).context("Failed to load config")?;
    let llm = create_llm_from_config(&cfg).context("Failed to create LLM client")?;

    let store: Arc<dyn ProfileStore> = match &cfg.rewards.profile_path {
        Some(path) => Arc::new(JsonProfileStore::new(path)),
        None => Arc::new(MemoryProfileStore::new()),
    };
    let rewards = RewardCheckpoint::new(store.clone(), cfg.rewards.coins_per_solve);
    let user_id = cfg.app.default_user.clone();

    let mut coach = Coach::new(llm.clone()).with_rewards(rewards.clone(), user_id.clone());
    coach.set_student_profile("middle school", Some(Confidence::Med));

    print_banner();

    let mut bank = QuestionBank::sample();
    let mut current_question: Option<Question> = None;

    coach.set_problem(SAMPLE_PROBLEM, Some("sample_1".to_string()));
    println!("Sample problem loaded: {}", SAMPLE_PROBLEM);

    say(&mut coach, "I'm ready to start").await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        println!();
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(rest) = input.strip_prefix('/') {
            let (cmd, arg) = match rest.split_once(char::is_whitespace) {
                Some((c, a)) => (c.to_lowercase(), a.trim().to_string()),
                None => (rest.to_lowercase(), String::new()),
            };

            match cmd.as_str() {
                "quit" => {
                    println!("\nGreat work today! Keep practicing!");
                    break;
                }
                "problem" => {
                    if arg.is_empty() {
                        println!("Usage: /problem <problem text>");
                        continue;
                    }
                    current_question = None;
                    coach.set_problem(arg.clone(), None);
                    println!("\nNew problem set: {}", arg);
                    say(&mut coach, "I'm ready to start").await;
                }
                "bank" => {
                    if arg.is_empty() {
                        bank = QuestionBank::sample();
                    } else {
                        match QuestionBank::from_json_file(PathBuf::from(&arg)) {
                            Ok(loaded) => bank = loaded,
                            Err(e) => {
                                eprintln!("Could not load bank: {}", e);
                                continue;
                            }
                        }
                    }
                    println!("\nBank loaded: {} questions", bank.len());
                    for q in bank.iter() {
                        println!("  {}. {}", q.number, q.text.lines().next().unwrap_or(""));
                    }
                }
                "q" => {
                    let Some(q) = arg.parse().ok().and_then(|n: u32| bank.get(n)).cloned() else {
                        println!("No such question. Try /bank first.");
                        continue;
                    };
                    load_question(&mut coach, &q);
                    current_question = Some(q);
                    say(&mut coach, "I'm ready to start").await;
                }
                "answer" => {
                    let Some(q) = current_question.as_ref() else {
                        println!("Pick a question first with /q <n>.");
                        continue;
                    };
                    let Some(choice) = arg.parse().ok().and_then(|n| q.choice(n)) else {
                        println!("Usage: /answer <choice number>");
                        continue;
                    };
                    let message = format!("My answer is {}", choice);
                    println!("You: {}", message);
                    say(&mut coach, &message).await;
                }
                "reveal" => {
                    coach.force_reveal();
                    say(&mut coach, "Please show me the answer").await;
                }
                "correct" => {
                    coach.mark_correct();
                    println!("\nMarked as correct!");
                }
                "status" => {
                    let s = &coach.state;
                    let profile = store.get(&user_id);
                    println!("\nSession Status:");
                    println!("  Stage: {} ({})", s.stage.id(), s.stage.name());
                    println!("  Attempts: {}", s.attempt_count);
                    println!("  Claimed answer: {}", s.student_claimed_answer);
                    println!("  Validation: {:?}", s.validation_substate());
                    println!("  Solved: {}", s.problem_solved);
                    println!("  Reveal mode: {}", s.reveal_now);
                    println!("  Fish: {}  Solved total: {}", profile.currency, profile.solved_questions);
                    let (prompt, completion, total) = llm.token_usage();
                    println!("  Tokens: {} prompt / {} completion / {} total", prompt, completion, total);
                }
                "shop" => {
                    let profile = store.get(&user_id);
                    println!("\nShop (you have {} fish):", profile.currency);
                    for a in all_accessories() {
                        let owned = if profile.inventory.iter().any(|i| i == a.id) {
                            " [owned]"
                        } else {
                            ""
                        };
                        println!("  {} {:<15} {:>4} fish  ({}){}", a.emoji, a.id, a.price, a.slot, owned);
                    }
                }
                "buy" => {
                    match rewards.purchase(&user_id, &arg) {
                        Ok(PurchaseOutcome::Purchased) => println!("Item purchased!"),
                        Ok(PurchaseOutcome::AlreadyOwned) => println!("You already own this item!"),
                        Ok(PurchaseOutcome::NotEnoughCurrency(short)) => {
                            println!("Not enough fish! You need {} more.", short)
                        }
                        Ok(PurchaseOutcome::UnknownItem) => println!("Unknown item: {}", arg),
                        Err(e) => eprintln!("Purchase failed: {}", e),
                    }
                }
                "equip" => {
                    match rewards.equip(&user_id, &arg) {
                        Ok(true) => println!("Equipped {}!", arg),
                        Ok(false) => println!("You don't own that (or it doesn't exist)."),
                        Err(e) => eprintln!("Equip failed: {}", e),
                    }
                }
                "unequip" => {
                    match rewards.unequip(&user_id, &arg) {
                        Ok(()) => println!("Slot {} cleared.", arg),
                        Err(e) => eprintln!("Unequip failed: {}", e),
                    }
                }
                "reset" => {
                    let problem = coach.state.problem.clone();
                    let problem_id = coach.state.problem_id.clone();
                    coach.set_problem(problem, problem_id);
                    println!("\nSession reset.");
                    say(&mut coach, "I'm ready to start").await;
                }
                _ => println!("Unknown command: /{}", cmd),
            }
            continue;
        }

        say(&mut coach, input).await;
    }

    Ok(())
}
