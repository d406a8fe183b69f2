//! Tekir Routing Inspector
//!
//! Build the routing stack from the environment, print the binding table,
//! and optionally send one prompt through it.
//!
//! Usage:
//!   cargo run --bin tekir-routes
//!   cargo run --bin tekir-routes -- --provider deepseek --reasoning --prompt "Why is the sky blue?"
//!   TEKIR_ENV=test cargo run --bin tekir-routes -- --prompt hello --stream

use std::env;
use std::io::Write;

use anyhow::Context;
use futures::StreamExt;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tekir_inference::{
    binding_spec, ChatPreference, ChatRequest, ChatRouter, Environment, InferenceConfig, StreamPart,
};

#[derive(Debug, Default)]
struct Args {
    provider: Option<String>,
    reasoning: bool,
    prompt: Option<String>,
    stream: bool,
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    let mut result = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--provider" | "-p" => {
                i += 1;
                if i < args.len() {
                    result.provider = Some(args[i].clone());
                }
            }
            "--reasoning" | "-r" => {
                result.reasoning = true;
            }
            "--prompt" => {
                i += 1;
                if i < args.len() {
                    result.prompt = Some(args[i].clone());
                }
            }
            "--stream" | "-s" => {
                result.stream = true;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    result
}

fn print_help() {
    println!(
        r#"
Tekir Routing Inspector

Usage: cargo run --bin tekir-routes -- [OPTIONS]

Options:
  -p, --provider <ID>     Provider id as stored in the chat-model cookie (default: openai)
  -r, --reasoning         Enable reasoning
      --prompt <TEXT>     Send one prompt through the routed model
  -s, --stream            Stream the response
  -h, --help              Print help

Environment Variables:
  TEKIR_ENV                 test or production (default: production)
  OPENROUTER_API_KEY        Required in production
  OPENROUTER_BASE_URL       Upstream endpoint (default: https://openrouter.ai/api/v1)
  OPENROUTER_HTTP_REFERER   HTTP-Referer header (default: https://tekir.co)
  OPENROUTER_X_TITLE        X-Title header (default: Tekir)
  OPENROUTER_TIMEOUT        Request timeout in seconds (default: 300)
  LOG_FORMAT                json or text (default: text)
  LOG_FILE                  Log file path (optional, rotated daily)
  LOG_ANSI                  true/false override for ANSI colors
"#
    );
}

/// Initialize tracing. Console output goes to stderr so the table stays clean.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = env::var("LOG_FILE").ok();
    let log_ansi = env::var("LOG_ANSI").ok().map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tekir_inference=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    let guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("tekir-routes.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stderr)"),
        "Logging initialized"
    );

    guard
}

fn print_table(router: &ChatRouter, environment: Environment) {
    println!("Environment: {}", environment);
    println!();
    println!(
        "{:<24} {:<10} {:<22} {:<32} {}",
        "PROVIDER", "REASONING", "MODEL ID", "UPSTREAM", "EXTRACTS"
    );

    for provider in router.providers() {
        for reasoning in [false, true] {
            let preference = ChatPreference::new(provider.id.clone(), reasoning);
            let model_id = preference.model_id();
            let upstream = router
                .bindings()
                .get(model_id)
                .map(|handle| handle.model_id().to_string())
                .unwrap_or_else(|| "(unbound)".to_string());
            let tag = binding_spec(model_id)
                .and_then(|spec| spec.reasoning_tag)
                .map(|tag| format!("<{}>", tag))
                .unwrap_or_else(|| "-".to_string());

            println!(
                "{:<24} {:<10} {:<22} {:<32} {}",
                provider.to_string(),
                reasoning,
                model_id,
                upstream,
                tag
            );
        }
    }
    println!();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = init_logging();
    let args = parse_args();

    let config = InferenceConfig::from_env().context("Failed to load configuration")?;
    let router = ChatRouter::from_config(&config).context("Failed to build chat router")?;

    print_table(&router, config.environment);

    let Some(prompt) = args.prompt else {
        return Ok(());
    };

    let preference = ChatPreference::from_stored(
        args.provider.as_deref(),
        Some(if args.reasoning { "true" } else { "false" }),
    );
    let routed = router.route(&preference)?;
    let request = ChatRequest::from_prompt(prompt);

    println!(
        "Routing {} -> {} ({})",
        router.selected_provider(&preference),
        routed.model_id,
        routed.handle.model_id()
    );
    println!();

    if args.stream {
        let mut stream = routed.handle.stream(&request).await?;
        let mut stdout = std::io::stdout();
        let mut channel = None;

        while let Some(part) = stream.next().await {
            match part? {
                StreamPart::ReasoningDelta(delta) => {
                    if channel != Some("reasoning") {
                        writeln!(stdout, "\n[reasoning]")?;
                        channel = Some("reasoning");
                    }
                    write!(stdout, "{}", delta)?;
                }
                StreamPart::TextDelta(delta) => {
                    if channel != Some("answer") {
                        writeln!(stdout, "\n[answer]")?;
                        channel = Some("answer");
                    }
                    write!(stdout, "{}", delta)?;
                }
                StreamPart::Finish(reason) => {
                    writeln!(stdout, "\n\n[finish: {}]", reason.as_deref().unwrap_or("none"))?;
                }
            }
            stdout.flush()?;
        }
    } else {
        let generation = routed.handle.generate(&request).await?;
        if let Some(reasoning) = generation.reasoning {
            println!("[reasoning]\n{}\n", reasoning);
        }
        println!("[answer]\n{}", generation.text);
        if let Some(usage) = generation.usage {
            println!(
                "\n[usage: {} prompt + {} completion = {} tokens]",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }
    }

    Ok(())
}
