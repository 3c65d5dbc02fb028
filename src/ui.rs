// Terminal shell: ratatui rendering, crossterm input, and the timer
// deadlines that drive the recording loop. Everything runs on the one
// event-loop task; tick and clock advances are armed as absolute deadlines
// so an interval change never shortens a delay already in flight.

use crate::models::{Device, LiveRow, Record};
use crate::probe::MetricsProbe;
use crate::recorder::{
    CLOCK_INTERVAL, MAX_TICK_INTERVAL_MS, MIN_TICK_INTERVAL_MS, Presenter, SampleLoop,
};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures_util::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use ratatui::{Frame, Terminal};
use tokio::time::{Instant, sleep_until};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Live,
    History,
}

/// Display state. Implements `Presenter`, so the core renders into it and
/// the draw pass reads it back out.
struct App {
    rows: [Option<LiveRow>; 3],
    clock: String,
    history: Vec<Record>,
    screen: Screen,
    /// Digit buffer for the interval prompt; Some while the prompt is open.
    prompt: Option<String>,
    status: String,
    recording: bool,
}

impl App {
    fn new() -> Self {
        Self {
            rows: [None, None, None],
            clock: String::new(),
            history: Vec::new(),
            screen: Screen::Live,
            prompt: None,
            status: String::new(),
            recording: false,
        }
    }
}

impl Presenter for App {
    fn render_live_row(&mut self, row: LiveRow) {
        let slot = match row.device {
            Device::Cpu => 0,
            Device::Memory => 1,
            Device::Disk => 2,
        };
        self.rows[slot] = Some(row);
    }

    fn render_clock(&mut self, text: &str) {
        self.clock = text.to_string();
    }

    fn render_history(&mut self, records: &[Record]) {
        self.history = records.to_vec();
    }
}

/// Run the shell until the user quits, then release the store. Terminal
/// state is restored before any core error propagates out.
pub async fn run<P: MetricsProbe>(mut recorder: SampleLoop<P>) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut recorder).await;

    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    recorder.shutdown().await;
    result
}

async fn event_loop<P: MetricsProbe>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    recorder: &mut SampleLoop<P>,
) -> anyhow::Result<()> {
    let mut app = App::new();
    let mut events = EventStream::new();
    // Armed while recording; a step that observes the Idle state disarms
    // its own deadline by declining the reschedule.
    let mut next_tick: Option<Instant> = None;
    let mut next_clock: Option<Instant> = None;

    loop {
        app.recording = recorder.is_recording();
        terminal.draw(|f| draw(f, &app))?;

        tokio::select! {
            maybe_event = events.next() => {
                let Some(event) = maybe_event.transpose()? else { break };
                if let Event::Key(key) = event
                    && key.kind == KeyEventKind::Press
                    && handle_key(key, &mut app, recorder, &mut next_tick, &mut next_clock).await?
                {
                    break;
                }
            }
            _ = sleep_until(next_tick.unwrap_or_else(Instant::now)), if next_tick.is_some() => {
                next_tick = if recorder.tick(&mut app).await? {
                    Some(Instant::now() + recorder.tick_interval())
                } else {
                    None
                };
            }
            _ = sleep_until(next_clock.unwrap_or_else(Instant::now)), if next_clock.is_some() => {
                next_clock = if recorder.clock_advance(&mut app) {
                    next_clock.map(|t| t + CLOCK_INTERVAL)
                } else {
                    None
                };
            }
        }
    }
    Ok(())
}

/// Returns Ok(true) when the user asked to quit.
async fn handle_key<P: MetricsProbe>(
    key: KeyEvent,
    app: &mut App,
    recorder: &mut SampleLoop<P>,
    next_tick: &mut Option<Instant>,
    next_clock: &mut Option<Instant>,
) -> anyhow::Result<bool> {
    // An open interval prompt captures all input.
    if let Some(buf) = app.prompt.as_mut() {
        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() && buf.len() < 4 => buf.push(c),
            KeyCode::Backspace => {
                buf.pop();
            }
            KeyCode::Esc => app.prompt = None,
            KeyCode::Enter => {
                let entered = app.prompt.take().unwrap_or_default();
                match entered.parse::<u64>() {
                    Ok(ms) if recorder.set_tick_interval(ms) => {
                        app.status = format!("tick interval set to {ms} ms");
                    }
                    _ => {
                        app.status = format!(
                            "interval must be {MIN_TICK_INTERVAL_MS}..={MAX_TICK_INTERVAL_MS} ms"
                        );
                    }
                }
            }
            _ => {}
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(true),
        KeyCode::Esc if app.screen == Screen::History => app.screen = Screen::Live,
        KeyCode::Char('s') if !recorder.is_recording() => {
            recorder.start();
            app.clock = "00:00".into();
            app.status.clear();
            app.screen = Screen::Live;
            // First tick immediately, first clock advance one second out.
            *next_tick = Some(Instant::now());
            *next_clock = Some(Instant::now() + CLOCK_INTERVAL);
        }
        KeyCode::Char('x') if recorder.is_recording() => {
            // Deadlines stay armed; the pending steps see Idle and disarm.
            recorder.stop();
            app.status = "stopped".into();
        }
        KeyCode::Char('h') if !recorder.is_recording() => {
            recorder.history(app).await?;
            app.screen = Screen::History;
        }
        KeyCode::Char('i') if !recorder.is_recording() => {
            app.prompt = Some(String::new());
        }
        _ => {}
    }
    Ok(false)
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(f.area());

    match app.screen {
        Screen::Live => draw_live(f, app, chunks[0]),
        Screen::History => draw_history(f, app, chunks[0]),
    }
    draw_footer(f, app, chunks[1]);

    if let Some(buf) = &app.prompt {
        let area = centered_rect(44, 3, f.area());
        f.render_widget(Clear, area);
        let prompt = Paragraph::new(format!("{buf}_")).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(
                    "New tick interval ({MIN_TICK_INTERVAL_MS}-{MAX_TICK_INTERVAL_MS} ms)"
                )),
        );
        f.render_widget(prompt, area);
    }
}

fn draw_live(f: &mut Frame, app: &App, area: Rect) {
    let rows: Vec<Row> = app
        .rows
        .iter()
        .flatten()
        .map(|r| {
            Row::new(vec![
                Cell::from(r.device.label()),
                Cell::from(r.free.to_string()),
                Cell::from(r.total.to_string()),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(16),
            Constraint::Length(16),
        ],
    )
    .header(Row::new(["Device", "Free", "Total"]).style(Style::default().add_modifier(Modifier::BOLD)))
    .block(Block::default().borders(Borders::ALL).title("System Monitor"));
    f.render_widget(table, area);
}

fn draw_history(f: &mut Frame, app: &App, area: Rect) {
    let rows: Vec<Row> = app
        .history
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(r.id.to_string()),
                Cell::from(r.sample.cpu_percent.to_string()),
                Cell::from(r.sample.memory_free_kb.to_string()),
                Cell::from(r.sample.memory_total_kb.to_string()),
                Cell::from(r.sample.disk_free_kb.to_string()),
                Cell::from(r.sample.disk_total_kb.to_string()),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(14),
        ],
    )
    .header(
        Row::new([
            "id",
            "CPU(%)",
            "MEM free(KiB)",
            "MEM total(KiB)",
            "DISK free(KiB)",
            "DISK total(KiB)",
        ])
        .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("History (Esc to close)"),
    );
    f.render_widget(table, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints = if app.recording {
        "[x] stop  [q] quit"
    } else {
        "[s] start  [h] history  [i] interval  [q] quit"
    };
    let clock = if app.recording {
        app.clock.as_str()
    } else {
        ""
    };
    let footer = Paragraph::new(format!("{clock:>6}  {hints}  {}", app.status))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}

fn centered_rect(width: u16, height: u16, outer: Rect) -> Rect {
    let w = width.min(outer.width);
    let h = height.min(outer.height);
    Rect {
        x: outer.x + (outer.width - w) / 2,
        y: outer.y + (outer.height - h) / 2,
        width: w,
        height: h,
    }
}
