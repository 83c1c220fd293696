use anyhow::Result;
use clap::{Parser, ValueEnum};
use sfcore_ai_conversation::{GenerationRequest, SamplingParams, TextGenerator};
use sfcore_ai_engine::{metrics, EngineOptions, LlamaServerEngine};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod chat;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// One prompt, raw continuation
    Single,
    /// Interactive multi-turn conversation
    Chat,
}

#[derive(Parser, Debug)]
#[command(
    name = "sfcore-ai-cli",
    version,
    about = "SFCore AI - conversational CLI over llama-server",
    after_help = "Examples:
  sfcore-ai-cli --prompt \"Hello\"
  sfcore-ai-cli --mode chat
  sfcore-ai-cli --mode chat --max-tokens 150 --system \"You are helpful\"
  sfcore-ai-cli --mode chat --save-history chat.json --enable-memory"
)]
struct Args {
    /// Initial text (single mode only)
    #[arg(long, default_value = "")]
    prompt: String,

    /// Model name sent to llama-server ("default" = whatever the server loaded)
    #[arg(long, default_value = "default")]
    model: String,

    /// llama-server base URL
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 120)]
    timeout: u64,

    /// Maximum tokens to generate
    #[arg(long, default_value_t = 80)]
    max_tokens: u32,

    // === Sampling Options ===
    /// Temperature for sampling (0.1-2.0).
    ///
    /// - 0.1: Near greedy, repetitive but coherent.
    /// - 0.8 (Default): Balanced.
    /// - 1.5+: Creative, prone to drifting off topic.
    #[arg(long, default_value_t = 0.8)]
    temperature: f32,

    /// Top-K sampling: only the K most likely tokens are considered.
    #[arg(long, default_value_t = 50)]
    top_k: u32,

    /// Top-P (nucleus) sampling: smallest token set with cumulative probability P.
    #[arg(long, default_value_t = 0.95)]
    top_p: f32,

    /// Execution mode
    #[arg(long, value_enum, default_value_t = Mode::Single)]
    mode: Mode,

    /// System prompt for AI behavior
    #[arg(long, default_value = "")]
    system: String,

    /// Save chat history to JSON file on exit
    #[arg(long)]
    save_history: Option<String>,

    /// Load chat history from JSON file
    #[arg(long)]
    load_history: Option<String>,

    /// Enable long-term memory for topics
    #[arg(long, default_value_t = false)]
    enable_memory: bool,
}

impl Args {
    fn sampling(&self) -> SamplingParams {
        SamplingParams {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_k: self.top_k,
            top_p: self.top_p,
        }
    }

    fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            base_url: self.server_url.clone(),
            model: (self.model != "default").then(|| self.model.clone()),
            timeout_seconds: self.timeout,
            return_full_text: true,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr and stay quiet by default so the transcript is readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let args = Args::parse();
    info!("SFCore AI CLI - llama-server backend ({})", args.server_url);

    println!("\nConnecting to '{}' (model: {})...", args.server_url, args.model);
    let engine = LlamaServerEngine::new(args.engine_options())?;

    match args.mode {
        Mode::Chat => chat::run(&args, &engine).await,
        Mode::Single => single_mode(&args, &engine).await,
    }
}

async fn single_mode(args: &Args, engine: &LlamaServerEngine) -> Result<()> {
    let prompt = if args.prompt.is_empty() {
        "Hello, I am an AI assistant".to_string()
    } else {
        args.prompt.clone()
    };

    println!("Generating response...\n");
    let before = metrics::RuntimeMetrics::capture();
    let start = Instant::now();
    let request = GenerationRequest::new(prompt.clone(), args.sampling());

    match engine.generate(&request).await {
        Ok(result) => {
            let elapsed = start.elapsed().as_secs_f64();
            let after = metrics::RuntimeMetrics::capture();
            println!("Prompt:\n{}", prompt);
            println!("\nResponse:\n{}", result);
            println!(
                "\nTime: {:.2}s | Max tokens: {} | Temperature: {}",
                elapsed, args.max_tokens, args.temperature
            );
            eprintln!(
                "[memory] rss: {:.1} -> {:.1} MB",
                before.process_rss_mb, after.process_rss_mb
            );
        }
        Err(e) => eprintln!("Error generating text: {:#}", e),
    }

    Ok(())
}
