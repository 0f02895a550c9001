use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use object_counter::{analyzer, cli, config, encoder, session};
use analyzer::{CountResult, GeminiClient};
use cli::{Cli, Commands};
use config::Config;
use session::{Session, SessionState};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Count { image, json, model } => {
            let config = Config::load()?;
            let ok = count(&config, &image, json, model).await?;
            if !ok {
                std::process::exit(1);
            }
        }

        Commands::Config { set_api_key, show } => {
            // 壊れた設定ファイルでもキーを書き直せるようにする
            let mut config = Config::load_or_default()?;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  エンドポイント: {}", config.endpoint);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                match config.thinking_budget {
                    Some(budget) => println!("  思考トークン: {}", budget),
                    None => println!("  思考トークン: 無効"),
                }
                println!("  APIキー: {}", if config.has_api_key() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// 画像1枚を数えて結果を表示。失敗時は `Ok(false)`
async fn count(config: &Config, image: &Path, json: bool, model: Option<String>) -> anyhow::Result<bool> {
    let encoded = encoder::encode_file(image)
        .await
        .with_context(|| format!("read {}", image.display()))?;

    let mut client_config = config.client_config();
    if let Some(model) = model {
        client_config.model = model;
    }
    let client = GeminiClient::with_http(client_config)?;

    let shared = Mutex::new(Session::new());
    shared
        .lock()
        .map_err(|_| anyhow::anyhow!("session lock poisoned"))?
        .select_image(encoded);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    spinner.set_message(format!("Counting objects... ({})", client.model()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    session::run_analysis(&shared, &client).await;
    spinner.finish_and_clear();

    let session = shared
        .into_inner()
        .map_err(|_| anyhow::anyhow!("session lock poisoned"))?;

    match session.state() {
        SessionState::Success(result) => {
            if json {
                println!("{}", serde_json::to_string_pretty(result)?);
            } else {
                print_result(result);
            }
            Ok(true)
        }
        SessionState::Failed(message) => {
            eprintln!("✖ Analysis Failed");
            eprintln!("  {}", message);
            Ok(false)
        }
        other => {
            eprintln!("✖ Analysis did not complete (state: {})", other.as_str());
            Ok(false)
        }
    }
}

fn print_result(result: &CountResult) {
    println!("✅ Analysis Complete\n");
    println!("  Detected Object: {}", result.subject_label);
    println!("  Count:           {}", result.count);
    println!("\n  AI Reasoning:");
    println!("    {}", result.rationale);
}
