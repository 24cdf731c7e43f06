use std::fs::File;
use std::io::{self, Write};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cybertree::cli::Cli;
use cybertree::graphics::Canvas;
use cybertree::hand::HandFeed;
use cybertree::layout::ParticleKind;
use cybertree::state::AppState;
use cybertree::widget::TreeView;
use cybertree::Scene;

/// Raw-mode alternate screen, restored on drop
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            io::stdout(),
            cursor::Show,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    // Set verbosity
    if cli.verbose > 0 {
        builder.filter_level(match cli.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    } else if cli.quiet {
        builder.filter_level(log::LevelFilter::Error);
    }

    if let Some(path) = &cli.log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

/// Terminal size in cells, falling back to 80x24
fn terminal_size() -> (usize, usize) {
    match termsize::get() {
        Some(size) if size.cols > 0 && size.rows > 0 => (size.cols as usize, size.rows as usize),
        _ => {
            log::warn!("Could not query terminal size, assuming 80x24");
            (80, 24)
        }
    }
}

fn print_summary(scene: &Scene, seed: u64) {
    println!("seed:       {seed}");
    println!("particles:  {}", scene.particle_count());
    for kind in ParticleKind::ALL {
        let group = scene.group(kind);
        let share = if scene.particle_count() == 0 {
            0.0
        } else {
            group.len() as f64 * 100.0 / scene.particle_count() as f64
        };
        println!("{:<11} {:>6} ({share:.1}%)", format!("{}:", kind.name()), group.len());
    }
    let heights = scene
        .groups()
        .iter()
        .flat_map(|g| g.particles())
        .map(|p| p.assembled_position.y);
    let (low, high) = heights.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), y| {
        (lo.min(y), hi.max(y))
    });
    if low <= high {
        println!("height:     {low:.3} .. {high:.3}");
    }
    println!("topper:     {}-point star", scene.topper().geometry().points());
}

fn run(cli: &Cli, scene: &mut Scene, feed: Option<&HandFeed>) -> Result<()> {
    let mut stdout = io::stdout();
    let mut view = TreeView::new();
    let mut state = AppState::default();

    let (width, height) = terminal_size();
    let mut canvas = Canvas::new(width, height);
    let frame_duration = cli.frame_duration();
    let mut last_frame = Instant::now();
    let mut feed_open = feed.is_some();

    while !state.quit {
        // Handle input until the next frame is due
        let deadline = last_frame + frame_duration;
        loop {
            let timeout = deadline.saturating_duration_since(Instant::now());
            if !event::poll(timeout)? {
                break;
            }
            match event::read()? {
                Event::Resize(cols, rows) => canvas.resize(cols as usize, rows as usize),
                other => view.handle_event(&other, &mut state, scene),
            }
            if state.quit {
                break;
            }
        }

        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        if let Some(feed) = feed.filter(|f| feed_open && !f.is_running()) {
            log::warn!("Hand feed {} ended, mouse only from now on", feed.path().display());
            feed_open = false;
        }

        let hand = feed.and_then(HandFeed::latest);
        if state.paused {
            scene.observe_hand(hand);
        } else {
            scene.tick(dt, hand)?;
        }

        view.render(&mut canvas, scene, &state);
        canvas.present(&mut stdout)?;
    }

    stdout.flush()?;
    log::info!("Exiting after {} frames", scene.frame());
    Ok(())
}

/// Main function
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let seed = cli.seed.unwrap_or_else(|| rand::rng().random());
    log::info!("Layout seed: {seed}");

    let config = cli.scene_config();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut scene = Scene::new(&config, &mut rng).context("Failed to build the tree")?;

    if cli.summary {
        print_summary(&scene, seed);
        return Ok(());
    }

    let feed = match &cli.hand_feed {
        Some(path) => match HandFeed::open(path, cli.stale_after()) {
            Ok(feed) => Some(feed),
            Err(e) => {
                log::warn!("Hand tracking unavailable, using mouse only: {e}");
                None
            }
        },
        None => None,
    };

    let _guard = TerminalGuard::enter().context("Failed to set up the terminal")?;
    run(&cli, &mut scene, feed.as_ref())
}
