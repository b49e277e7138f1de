use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::fs::File;
use std::time::Instant;
use tui_globe::app::{App, FrameClock};
use tui_globe::config::Args;
use tui_globe::ui;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal, &args);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    if let Err(e) = &result {
        log::error!("exiting: {e:#}");
    }
    result
}

/// Logs go to `--log-file` since stdout belongs to the UI. Without one,
/// logging is only switched on when RUST_LOG asks for it, and then goes
/// to stderr.
fn init_logging(args: &Args) -> Result<()> {
    use env_logger::{Builder, Env, Target};

    match &args.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            Builder::from_env(Env::default().default_filter_or("info"))
                .target(Target::Pipe(Box::new(file)))
                .init();
        }
        None if std::env::var_os("RUST_LOG").is_some() => env_logger::init(),
        None => {}
    }
    Ok(())
}

/// Hover highlights, left click selects, left drag orbits, wheel zooms.
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let (col, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Moved => app.pointer_move(col, row),
        MouseEventKind::Down(MouseButton::Left) => app.press(col, row),
        MouseEventKind::Drag(MouseButton::Left) => app.drag(col, row),
        MouseEventKind::Up(MouseButton::Left) => app.release(col, row),
        MouseEventKind::ScrollUp => app.zoom_in(),
        MouseEventKind::ScrollDown => app.zoom_out(),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, args: &Args) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::start(size.width as usize, size.height as usize, args);
    log::info!(
        "globe started at {}x{} cells, loading {}",
        size.width,
        size.height,
        args.data.display()
    );

    let mut clock = FrameClock::new(args.frame_time(), Instant::now());

    // Main loop
    loop {
        // Draw
        terminal.draw(|frame| ui::render(frame, &app))?;

        if event::poll(clock.remaining(Instant::now()))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                            // Orbit with hjkl or arrow keys
                            KeyCode::Left | KeyCode::Char('h') => app.orbit(-10, 0),
                            KeyCode::Right | KeyCode::Char('l') => app.orbit(10, 0),
                            KeyCode::Up | KeyCode::Char('k') => app.orbit(0, -10),
                            KeyCode::Down | KeyCode::Char('j') => app.orbit(0, 10),

                            // Zoom
                            KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                            KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                            KeyCode::Char('c') | KeyCode::Char('C') => app.focus_highlight(),
                            KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),

                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse);
                }
                Event::Resize(width, height) => {
                    app.resize(width as usize, height as usize);
                }
                _ => {}
            }
        }

        // Moon orbit, idle spin, background load; once per frame however
        // many events arrived
        if clock.due(Instant::now()) {
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
