use anyhow::Result;
use sfcore_ai_conversation::{
    ConversationSession, PromptConfig, SessionConfig, SessionPersistence, SessionState, TextGenerator,
};
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::Args;

/// Topics shown by the `mem` command
const MEM_PREVIEW: usize = 3;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Quit,
    Clear,
    Memory,
    Skip,
    Message(String),
}

fn parse_input(line: &str) -> Command {
    let input = line.trim();
    match input.to_lowercase().as_str() {
        "quit" => Command::Quit,
        "clear" => Command::Clear,
        "mem" => Command::Memory,
        "" => Command::Skip,
        _ => Command::Message(input.to_string()),
    }
}

/// Resumed state plus the line to show the user, if any.
fn initial_state(path: Option<&str>) -> (SessionState, Option<String>) {
    match path {
        Some(path) if Path::new(path).exists() => match SessionPersistence::try_load(path) {
            Ok(state) => {
                let notice = format!("History loaded ({} messages)", state.history.len());
                (state, Some(notice))
            }
            Err(e) => (SessionState::default(), Some(format!("Failed to load history: {}", e))),
        },
        _ => (SessionState::default(), None),
    }
}

pub async fn run(args: &Args, generator: &dyn TextGenerator) -> Result<()> {
    let config = SessionConfig {
        sampling: args.sampling(),
        ..SessionConfig::default()
    };
    let (state, notice) = initial_state(args.load_history.as_deref());
    if let Some(notice) = notice {
        println!("{}\n", notice);
    }
    let mut session = ConversationSession::start(config, PromptConfig::default(), state);

    let mut token_count: u64 = 0;
    let start_time = Instant::now();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Chat mode (type 'quit' to exit, 'clear' to reset, 'mem' to show memory)\n");

    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        // EOF ends the conversation like `quit`
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            Command::Quit => break,
            Command::Skip => continue,
            Command::Clear => {
                session.reset();
                token_count = 0;
                println!("History and memory cleared.\n");
            }
            Command::Memory => {
                println!("\nMemory: Topics={:?}\n", session.memory().recent(MEM_PREVIEW));
            }
            Command::Message(text) => {
                match session
                    .run_turn(generator, &text, &args.system, args.enable_memory)
                    .await
                {
                    Ok(reply) => {
                        println!("Assistant: {}\n", reply);
                        token_count += u64::from(args.max_tokens);
                    }
                    Err(e) => {
                        warn!("Turn failed: {}", e);
                        println!("Error generating response.\n");
                    }
                }
            }
        }
    }

    session.terminate();

    if let Some(path) = &args.save_history {
        match SessionPersistence::save(path, &session.snapshot()) {
            Ok(()) => println!("\nHistory saved to {}", path),
            Err(e) => println!("\nFailed to save history: {}", e),
        }
    }

    println!(
        "\nStats: {} exchanges, ~{} tokens, {:.1}s total",
        session.history().len(),
        token_count,
        start_time.elapsed().as_secs_f64()
    );
    println!("Memory: {} topics retained", session.memory().len());

    Ok(())
}
