use build_runner::config::cli::LogFormat;
use build_runner::core::session::{CloseReason, SessionState};
use build_runner::core::state::ViewState;
use build_runner::core::viewer::{export_log, Frame, RenderedLine};
use build_runner::core::ConfigProvider;
use build_runner::utils::error::ErrorSeverity;
use build_runner::utils::{logger, validation::Validate};
use build_runner::{
    BuildRunner, CliConfig, HttpBuildClient, LocalStorage, LogViewer, RunnerError,
};
use clap::Parser;
use std::io::{IsTerminal, Write};
use std::sync::Arc;
use std::time::Duration;

/// How long a finished build waits for its trigger request before exiting.
const TRIGGER_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    tracing::info!("Starting build-runner");

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    if cli.verbose {
        tracing::debug!("Resolved config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    let client = Arc::new(HttpBuildClient::from_config(&config));
    let mut runner = BuildRunner::new(client.clone(), client, config.theme());
    let viewer = LogViewer::new(config.viewer_height(), config.color);
    let form = cli.form(config.mode());

    println!("{}", viewer.header(runner.state().theme()));

    if let Err(e) = runner.submit(&form) {
        tracing::error!("❌ Build not started: {}", e);
        fail(&e);
    }

    // 非終端機輸出時只逐行印出，不重繪
    let live = std::io::stdout().is_terminal();
    let mut frame = Frame::default();
    if live {
        draw(&viewer, runner.state(), &mut frame);
    }

    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);
    let mut interrupted = false;
    loop {
        let update = tokio::select! {
            update = runner.next_update() => update,
            _ = &mut interrupt => {
                interrupted = true;
                None
            }
        };
        let Some(update) = update else { break };

        if live {
            draw(&viewer, runner.state(), &mut frame);
        } else if let Some(line) = &update.appended {
            println!("{}", viewer.paint(&RenderedLine::log(line.as_str()), runner.state().theme()));
        }
    }

    if interrupted {
        tracing::warn!("Interrupted, closing the log stream");
        runner.cancel();
    } else if tokio::time::timeout(TRIGGER_GRACE, runner.wait_for_trigger())
        .await
        .is_err()
    {
        tracing::warn!("Build trigger still unanswered, not waiting for it");
    }
    if live {
        draw(&viewer, runner.state(), &mut frame);
    }

    let final_state = runner.state().session().state();

    if let Some(dir) = &config.export_dir {
        let storage = LocalStorage::new(dir.clone());
        match export_log(&storage, runner.state().buffer()).await {
            Ok(path) => println!("📥 Log saved to: {}", path),
            Err(e) => {
                tracing::warn!("Log export skipped: {}", e);
                eprintln!("💡 {}", e.user_friendly_message());
            }
        }
    }

    match final_state {
        SessionState::Closed(CloseReason::Completed) => {
            println!("✅ Build finished ({} log lines)", runner.state().buffer().len());
            Ok(())
        }
        SessionState::Closed(CloseReason::Cancelled) => {
            println!("🛑 Build log stream closed");
            std::process::exit(130);
        }
        _ => fail(&RunnerError::stream("the build did not report completion")),
    }
}

fn draw(viewer: &LogViewer, state: &ViewState, frame: &mut Frame) {
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = stdout
        .write_all(viewer.redraw(state, frame).as_bytes())
        .and_then(|()| stdout.flush())
    {
        tracing::warn!("Failed to redraw the log view: {}", e);
    }
}

fn fail(e: &RunnerError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 依錯誤嚴重度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
