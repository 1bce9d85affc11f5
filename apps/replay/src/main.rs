use std::{path::PathBuf, sync::Arc, thread, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use shared::{domain::InteractionRegion, protocol::GestureEvent};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracking::{event_queue, load_settings, scripted::GestureScript, EngineConfig, TrackingEngine};
use ui_bridge::{pump, GestureHandler, Rect, WidgetBoard};

/// Replays a recorded gesture script through the tracking engine and a
/// widget board, printing every event as a JSON line.
#[derive(Parser, Debug)]
struct Args {
    /// JSON gesture script.
    #[arg(long)]
    script: PathBuf,
    /// TOML settings file; `APP__*` environment variables still apply.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Interaction region as `x,y,width,height`. Defaults to the camera size.
    #[arg(long)]
    region: Option<InteractionRegion>,
    /// Events dispatched per UI frame.
    #[arg(long, default_value_t = 64)]
    budget: usize,
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
}

/// Feeds the board and keeps a copy of every event.
struct Session {
    board: WidgetBoard,
    events: Vec<GestureEvent>,
}

impl GestureHandler for Session {
    fn cursor_moved(&mut self, x: i32, y: i32) {
        self.events.cursor_moved(x, y);
        self.board.cursor_moved(x, y);
    }

    fn pinch_started(&mut self, x: i32, y: i32) {
        self.events.pinch_started(x, y);
        self.board.pinch_started(x, y);
    }

    fn drag_started(&mut self, x: i32, y: i32, start_x: i32, start_y: i32) {
        self.events.drag_started(x, y, start_x, start_y);
        self.board.drag_started(x, y, start_x, start_y);
    }

    fn drag_moved(&mut self, x: i32, y: i32, dx: i32, dy: i32) {
        self.events.drag_moved(x, y, dx, dy);
        self.board.drag_moved(x, y, dx, dy);
    }

    fn drag_ended(&mut self, x: i32, y: i32) {
        self.events.drag_ended(x, y);
        self.board.drag_ended(x, y);
    }

    fn clicked(&mut self, x: i32, y: i32) {
        self.events.clicked(x, y);
        self.board.clicked(x, y);
    }
}

fn board_area(region: &InteractionRegion) -> Rect {
    Rect::new(
        region.x() as i32,
        region.y() as i32,
        region.width() as i32,
        region.height() as i32,
    )
}

/// Four panels stacked down the middle of the area, like a mirror dashboard.
fn default_layout(area: Rect) -> Vec<(&'static str, Rect)> {
    let width = (area.width / 3).max(1);
    let height = (area.height / 5).max(1);
    let x = area.x + (area.width - width) / 2;
    let gap = (area.height - 4 * height) / 5;
    ["clock", "weather", "calendar", "notes"]
        .into_iter()
        .zip(0..)
        .map(|(name, slot)| {
            let y = area.y + gap + slot * (height + gap);
            (name, Rect::new(x, y, width, height))
        })
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = load_settings(args.config.as_deref()).context("failed to load settings")?;
    let script = GestureScript::load(&args.script)?;
    let region = match args.region {
        Some(region) => region,
        None => EngineConfig::camera_region(&settings).context("invalid camera size")?,
    };

    let mut board = WidgetBoard::new(board_area(&region)).context("invalid board area")?;
    for (name, bounds) in default_layout(board.area()) {
        board
            .add_widget(name, bounds)
            .with_context(|| format!("failed to place widget {name}"))?;
    }
    let mut session = Session {
        board,
        events: Vec::new(),
    };

    let (sender, receiver) = event_queue(settings.engine.event_queue_capacity);
    let (source, detector, progress) = script.into_collaborators();
    let handle = TrackingEngine::new(EngineConfig::from_settings(&settings, region))
        .start(Box::new(source), Box::new(detector), Arc::new(sender))
        .context("failed to start gesture tracking")?;

    let frame = Duration::from_millis(args.frame_ms);
    while !progress.is_exhausted() {
        pump(&receiver, &mut session, args.budget);
        thread::sleep(frame);
    }
    let stats = handle.stats();
    handle.stop().context("failed to stop gesture tracking")?;

    while !pump(&receiver, &mut session, args.budget).disconnected {}

    for event in &session.events {
        println!("{}", serde_json::to_string(event)?);
    }
    for notice in session.board.take_notices() {
        println!("{}", serde_json::to_string(&notice)?);
    }
    println!("{}", serde_json::to_string(session.board.widgets())?);

    info!(
        steps = progress.total(),
        events = session.events.len(),
        dropped_cursor_moves = receiver.dropped_cursor_moves(),
        stats = ?stats,
        "replay finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_region_and_defaults() {
        let args = Args::try_parse_from([
            "replay",
            "--script",
            "demo.json",
            "--region",
            "10,20,300,200",
        ])
        .expect("args");
        assert_eq!(args.script, PathBuf::from("demo.json"));
        assert_eq!(args.config, None);
        assert_eq!(
            args.region,
            Some(InteractionRegion::new(10.0, 20.0, 300.0, 200.0).expect("region"))
        );
        assert_eq!(args.budget, 64);
    }

    #[test]
    fn rejects_malformed_region() {
        assert!(
            Args::try_parse_from(["replay", "--script", "demo.json", "--region", "1,2,0,4"])
                .is_err()
        );
        assert!(
            Args::try_parse_from(["replay", "--script", "demo.json", "--region", "1,2"]).is_err()
        );
    }

    #[test]
    fn default_layout_fits_the_board() {
        let area = Rect::new(0, 0, 640, 480);
        let mut board = WidgetBoard::new(area).expect("board");
        for (name, bounds) in default_layout(area) {
            board.add_widget(name, bounds).expect("widget");
            assert_eq!(
                board.widget(name).map(|widget| widget.bounds()),
                Some(bounds)
            );
        }
        assert_eq!(board.widgets().len(), 4);
        assert_eq!(
            board.hit_test(320, 34).map(|widget| widget.name()),
            Some("clock")
        );
    }

    #[test]
    fn session_forwards_to_board_and_log() {
        let area = Rect::new(0, 0, 640, 480);
        let mut session = Session {
            board: WidgetBoard::new(area).expect("board"),
            events: Vec::new(),
        };
        ui_bridge::dispatch(GestureEvent::CursorMove { x: 3, y: 4 }, &mut session);
        assert_eq!(session.events, vec![GestureEvent::CursorMove { x: 3, y: 4 }]);
        assert_eq!(session.board.cursor(), (3, 4));
    }
}
