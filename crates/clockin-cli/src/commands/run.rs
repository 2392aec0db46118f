use std::io::Write;
use std::sync::Arc;

use clap::Args;
use clockin_core::{Config, Event, FocusApp, KeyValueStore, TimerView, TokioScheduler};
use tokio::sync::mpsc;
use tracing::debug;

use super::{open_kv, CommandResult};
use crate::presenter::TerminalPresenter;

#[derive(Args)]
pub struct RunArgs {
    /// Session length in minutes (default: the first gradation)
    #[arg(short, long)]
    minutes: Option<u32>,
    /// Task to credit the session to
    #[arg(short, long)]
    task: Option<String>,
}

pub fn run(args: RunArgs) -> CommandResult {
    let (config, kv) = open_kv()?;
    // Single thread: completion handling runs inside the tick, before the
    // loop below sees the completion event.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(countdown(config, kv, args))
}

async fn countdown(config: Config, kv: Arc<dyn KeyValueStore>, args: RunArgs) -> CommandResult {
    let app = FocusApp::with_tick_interval(
        kv,
        Arc::new(TokioScheduler::current()),
        Arc::new(TerminalPresenter),
        config.tick_interval(),
    );

    if let Some(task) = &args.task {
        app.timer().set_task_name(task);
    }
    let minutes = match args.minutes {
        Some(minutes) => minutes,
        None => app
            .settings()
            .gradations()
            .first()
            .copied()
            .unwrap_or(app.timer().state().selected_duration),
    };
    app.timer().select_duration(minutes);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _events = app.timer().subscribe_events(move |event| {
        if event.is_completion() {
            let _ = tx.send(event.clone());
        }
    });
    let _frames = app.timer().subscribe_view(render);

    if app.timer().start().is_none() {
        return Err(format!("nothing to count down ({minutes} minutes)").into());
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                if let Event::TimerCompleted { duration_min, is_cooldown, .. } = event {
                    debug!(duration_min, is_cooldown, "completion observed");
                }
                if !app.timer().state().is_running {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                if let Some(minutes) = app.abandon() {
                    println!("\nstopped, {minutes:.1} minutes credited");
                } else {
                    println!("\nstopped");
                }
                break;
            }
        }
    }

    app.shutdown();
    println!();
    Ok(())
}

fn render(view: &TimerView) {
    let label = if view.is_cooldown { "cooldown" } else { "focus" };
    let mut out = std::io::stdout().lock();
    let _ = write!(
        out,
        "\r{label:<8} {} {:>5.1}%  {}",
        view.formatted_time, view.progress, view.task_name
    );
    let _ = out.flush();
}
