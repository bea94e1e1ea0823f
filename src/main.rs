/// Entry point and dashboard loop.

mod config;
mod domain;
mod error;
mod link;
mod sim;
mod ui;

use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;

use config::DashboardConfig;
use domain::board::BoardDescriptor;
use link::transport::Transport;
use sim::channel::Channel;
use sim::event::SessionEvent;
use sim::log::LogSink;
use sim::session::Session;
use ui::input::{InputState, UiAction};
use ui::renderer::{LinkView, Renderer};

const CLOCK_TICK: Duration = Duration::from_secs(1);
/// How long status messages stay up.
const MESSAGE_MS: u64 = 2000;

fn main() {
    let config = DashboardConfig::load();
    init_tracing(&config);

    let mut session = Session::new(config.session.duration_secs);
    for warning in &config.warnings {
        session.logs.error(warning.clone());
    }
    match BoardDescriptor::load(&config.session.board_file) {
        Ok(board) => {
            tracing::info!(
                path = %config.session.board_file.display(),
                instructions = board.instructions.len(),
                greens = board.green_count(),
                "board loaded"
            );
            session = session.with_board(board);
        }
        Err(e) => session.logs.error(format!(
            "Failed to load {}: {e}",
            config.session.board_file.display()
        )),
    }

    let transport = Transport::connect(
        &config.link.peer_url,
        config.link.connect_timeout,
        &mut session.logs,
    );
    let mut channel = Channel::new(session, transport);

    let mut renderer = Renderer::new(config.general.theme, config.general.log_rows);

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        channel.shutdown();
        return;
    }

    let result = dashboard_loop(&mut channel, &mut renderer, &config);

    channel.shutdown();

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Dashboard error: {e}");
    }

    println!();
    println!("Final Score: {}", channel.session.score);
}

/// Trace to the configured log file. Without one, tracing stays off so
/// nothing is written over the terminal UI.
fn init_tracing(config: &DashboardConfig) {
    let Some(path) = &config.general.log_file else { return };
    let file = match File::create(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("could not open log file {}: {e}", path.display());
            return;
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();
}

fn dashboard_loop(
    channel: &mut Channel,
    renderer: &mut Renderer,
    config: &DashboardConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let frame = Duration::from_millis(config.general.frame_ms);
    let message_frames = (MESSAGE_MS / config.general.frame_ms).max(1) as u32;
    let mut last_tick = Instant::now();

    loop {
        kb.drain_events();
        let mut events = Vec::new();
        for action in kb.actions() {
            if action == UiAction::Quit {
                return Ok(());
            }
            events.extend(handle_action(channel, action));
        }

        events.extend(channel.pump());

        if last_tick.elapsed() >= CLOCK_TICK {
            events.extend(channel.session.tick_clock());
            last_tick = Instant::now();
        }

        for event in &events {
            if let Some(msg) = event_message(event) {
                channel.session.set_message(&msg, message_frames);
            }
        }
        channel.session.tick_message();

        let link = LinkView { connected: channel.is_connected(), peer: channel.peer() };
        renderer.render(&channel.session, &link)?;
        std::thread::sleep(frame);
    }
}

fn handle_action(channel: &mut Channel, action: UiAction) -> Vec<SessionEvent> {
    match action {
        UiAction::StartGame => return channel.start_game(),
        UiAction::FinishRun => channel.finish_run(),
        UiAction::EmergencyStop => channel.emergency_stop(),
        UiAction::ToggleArmed => channel.toggle_armed(),
        UiAction::ToggleManual => channel.toggle_manual_control(),
        UiAction::Calibrate => channel.calibrate(),
        UiAction::ResetRoute => channel.reset_route(),
        UiAction::ScoreUp => channel.bump_score(true),
        UiAction::ScoreDown => channel.bump_score(false),
        UiAction::Drive(command) => return channel.drive(command),
        UiAction::Quit => {}
    }
    Vec::new()
}

/// Short status line for events worth surfacing.
fn event_message(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::BonusScored { amount } => Some(format!("Bonus +{amount}")),
        SessionEvent::ItemPicked { row, col, first_time: true } => {
            Some(format!("Picked up item at ({row},{col})"))
        }
        SessionEvent::Stopped => Some("Route complete".into()),
        SessionEvent::Blocked => Some("Edge of board".into()),
        SessionEvent::Deferred { index } => Some(format!("Step {index} held until start")),
        SessionEvent::LookupMiss { index } => Some(format!("No instruction at step {index}")),
        SessionEvent::ClockExpired => Some("Time's up!".into()),
        _ => None,
    }
}
