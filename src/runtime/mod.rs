use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::{MediaPlayer, RodioPlayer, UnavailablePlayer};
use crate::library::{Analyzer, TagAnalyzer};

mod event_loop;
mod logging;
mod settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    logging::init(&settings.logging);
    info!("starting setwheel v{}", env!("CARGO_PKG_VERSION"));

    let player: Box<dyn MediaPlayer> = match RodioPlayer::open() {
        Ok(p) => Box::new(p),
        Err(e) => {
            warn!(error = %e, "playback disabled");
            Box::new(UnavailablePlayer)
        }
    };
    let analyzer: Arc<dyn Analyzer> = Arc::new(TagAnalyzer::new(settings.analysis.clone()));
    let mut app = App::new(&settings, player, analyzer);

    let dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok());
    if let Some(dir) = dir {
        app.start_scan(dir);
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::default();
        event_loop::run(&mut terminal, &settings, &mut app, &mut state)
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    info!("setwheel exiting");
    run_result
}
