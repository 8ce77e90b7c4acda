//! algoscope trace viewer - Terminal User Interface
//!
//! Plays a traced algorithm step by step using ratatui.
//! App logic lives in `algoscope::tui::viewer_app`.

#![forbid(unsafe_code)]

#[cfg(feature = "tui")]
fn main() -> std::io::Result<()> {
    use algoscope::cli::{load_config, Session};
    use algoscope::tui::viewer_app::ViewerApp;

    let Some(session) = Session::parse_from(std::env::args()) else {
        eprintln!("Usage: algoscope-tui [ALGORITHM] [--values LIST] [--random N] [--seed N]");
        eprintln!("                     [--target N] [--grid ROWS] [--config PATH]");
        std::process::exit(1);
    };

    let config = match load_config(session.config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            std::process::exit(1);
        }
    };

    let app = ViewerApp::new(session.algorithm, session.input, config);
    if let Some(error) = &app.error {
        eprintln!("Error: {error}");
        std::process::exit(2);
    }

    tui::run(app)
}

#[cfg(not(feature = "tui"))]
fn main() {
    eprintln!("TUI feature not enabled. Run with: cargo run --bin algoscope-tui --features tui");
    std::process::exit(1);
}

#[cfg(feature = "tui")]
mod tui {
    use algoscope::render::{BLOCKED, OPEN, PATH};
    use algoscope::trace::{Cell, Grid, Highlight, Step, Subject};
    use algoscope::tui::viewer_app::ViewerApp;
    use crossterm::{
        event::{self, Event, KeyEventKind},
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    };
    use ratatui::{
        backend::CrosstermBackend,
        layout::{Constraint, Direction, Layout, Rect},
        style::{Color, Modifier, Style},
        text::{Line, Span},
        widgets::{Bar, BarChart, BarGroup, Block, Borders, Gauge, Paragraph},
        Frame, Terminal,
    };
    use std::collections::HashSet;
    use std::io;
    use std::time::{Duration, Instant};

    /// Poll interval while nothing is playing.
    const IDLE_POLL: Duration = Duration::from_millis(250);

    pub fn run(mut app: ViewerApp) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, crossterm::cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = run_main_loop(&mut terminal, &mut app);

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        )?;

        result
    }

    fn run_main_loop(
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        app: &mut ViewerApp,
    ) -> io::Result<()> {
        let mut last_tick = Instant::now();

        loop {
            terminal.draw(|f| ui(f, app))?;

            // Speed changes apply from the next tick on.
            let tick_rate = if app.playback.is_playing() {
                app.playback.tick_interval()
            } else {
                IDLE_POLL
            };

            let timeout = tick_rate.saturating_sub(last_tick.elapsed());
            if crossterm::event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        app.handle_key(key.code);
                    }
                }
            }

            if !app.playback.is_playing() {
                last_tick = Instant::now();
            } else if last_tick.elapsed() >= tick_rate {
                app.tick();
                last_tick = Instant::now();
            }

            if app.should_quit() {
                break;
            }
        }

        Ok(())
    }

    fn ui(f: &mut Frame, app: &ViewerApp) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(f.area());

        render_title(f, chunks[0], app);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(chunks[1]);

        render_subject(f, main_chunks[0], app);
        render_controls(f, main_chunks[1], app);
        render_progress(f, chunks[2], app);
        render_status_bar(f, chunks[3], app);
    }

    fn render_title(f: &mut Frame, area: Rect, app: &ViewerApp) {
        let title = Paragraph::new(vec![Line::from(vec![
            Span::styled(
                format!(" {} ", app.algorithm.display_name()),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("- seed {} ", app.seed())),
            Span::styled(
                format!("[{}]", app.algorithm.name()),
                Style::default().fg(Color::Gray),
            ),
        ])])
        .block(Block::default().borders(Borders::ALL).title("algoscope"));
        f.render_widget(title, area);
    }

    fn render_subject(f: &mut Frame, area: Rect, app: &ViewerApp) {
        let Some(step) = app.current_step() else {
            let empty = Paragraph::new("No trace")
                .block(Block::default().borders(Borders::ALL).title("Trace"));
            f.render_widget(empty, area);
            return;
        };
        match step.subject() {
            Subject::Array(values) => render_bars(f, area, values, step),
            Subject::Grid(grid) => render_grid(f, area, grid, step),
        }
    }

    /// Bar heights with negative values lifted so the smallest sits at 1.
    fn bar_heights(values: &[i64]) -> Vec<u64> {
        let floor = values.iter().copied().min().unwrap_or(0).min(1).saturating_sub(1);
        values
            .iter()
            .map(|&v| u64::try_from(v.saturating_sub(floor)).unwrap_or(0))
            .collect()
    }

    fn render_bars(f: &mut Frame, area: Rect, values: &[i64], step: &Step) {
        let highlighted: HashSet<usize> = step.highlight().indices().iter().copied().collect();
        let heights = bar_heights(values);
        let bars: Vec<Bar> = values
            .iter()
            .zip(&heights)
            .enumerate()
            .map(|(i, (&value, &height))| {
                let color = if highlighted.contains(&i) {
                    Color::Yellow
                } else {
                    Color::Blue
                };
                Bar::default()
                    .value(height)
                    .text_value(value.to_string())
                    .label(Line::from(i.to_string()))
                    .style(Style::default().fg(color))
            })
            .collect();

        let inner_width = usize::from(area.width.saturating_sub(2));
        let slots = values.len().max(1);
        let bar_width = u16::try_from((inner_width / slots).saturating_sub(1).clamp(1, 8))
            .unwrap_or(1);

        let chart = BarChart::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Array ({} values)", values.len())),
            )
            .bar_width(bar_width)
            .bar_gap(1)
            .data(BarGroup::default().bars(&bars));
        f.render_widget(chart, area);
    }

    fn grid_lines(grid: &Grid, highlight: &Highlight) -> Vec<Line<'static>> {
        let marked: HashSet<Cell> = highlight.cells().iter().copied().collect();
        (0..grid.rows())
            .map(|row| {
                let spans: Vec<Span> = (0..grid.cols())
                    .map(|col| {
                        let cell = Cell::new(row, col);
                        if marked.contains(&cell) {
                            Span::styled(
                                PATH.to_string(),
                                Style::default()
                                    .fg(Color::Yellow)
                                    .add_modifier(Modifier::BOLD),
                            )
                        } else if grid.is_open(cell) {
                            Span::styled(OPEN.to_string(), Style::default().fg(Color::DarkGray))
                        } else {
                            Span::styled(BLOCKED.to_string(), Style::default().fg(Color::Gray))
                        }
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }

    fn render_grid(f: &mut Frame, area: Rect, grid: &Grid, step: &Step) {
        let map = Paragraph::new(grid_lines(grid, step.highlight())).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Grid ({}x{})", grid.rows(), grid.cols())),
        );
        f.render_widget(map, area);
    }

    fn render_controls(f: &mut Frame, area: Rect, app: &ViewerApp) {
        let mode = app.playback.mode();
        let status_color = if app.playback.is_playing() {
            Color::Green
        } else {
            Color::Yellow
        };

        let controls_text = vec![
            Line::from(vec![
                Span::raw("Mode: "),
                Span::styled(mode.to_string(), Style::default().fg(status_color)),
            ]),
            Line::from(format!("Speed: {:.2}x", app.playback.speed())),
            Line::from(format!(
                "Tick: {} ms",
                app.playback.tick_interval().as_millis()
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Controls:",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(" Space  - Play/pause"),
            Line::from(" N / →  - Step"),
            Line::from(" R      - Reset"),
            Line::from(" +/-    - Speed"),
            Line::from(" 1-4    - Speed preset"),
            Line::from(" G      - New input"),
            Line::from(" A      - Next algorithm"),
            Line::from(" Q      - Quit"),
        ];

        let controls = Paragraph::new(controls_text)
            .block(Block::default().borders(Borders::ALL).title("Controls"));

        f.render_widget(controls, area);
    }

    fn render_progress(f: &mut Frame, area: Rect, app: &ViewerApp) {
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Progress"))
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(app.playback.progress().clamp(0.0, 1.0))
            .label(app.playback.frame_label());
        f.render_widget(gauge, area);
    }

    fn render_status_bar(f: &mut Frame, area: Rect, app: &ViewerApp) {
        let (message, style) = if let Some(error) = &app.error {
            (
                error.clone(),
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            )
        } else if let Some(notice) = &app.notice {
            (notice.clone(), Style::default().fg(Color::Green))
        } else {
            (app.status_line(), Style::default().fg(Color::Yellow))
        };

        let status_bar = Paragraph::new(Line::from(vec![
            Span::raw(" "),
            Span::styled(message, style),
        ]))
        .block(Block::default().borders(Borders::ALL));

        f.render_widget(status_bar, area);
    }

}
