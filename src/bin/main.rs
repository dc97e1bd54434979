#[macro_use]
extern crate log;

use std::fs::File;
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, bail};
use crossterm::cursor;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use futures::StreamExt as _;
use ratatui::backend::CrosstermBackend;
use regex::Regex;

use linepick::prelude::*;

/// How the query is turned into highlighted ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatcherKind {
    IgnoreCase,
    Regexp,
}

impl MatcherKind {
    fn name(&self) -> &'static str {
        match self {
            MatcherKind::IgnoreCase => "IgnoreCase",
            MatcherKind::Regexp => "Regexp",
        }
    }

    fn next(self) -> Self {
        match self {
            MatcherKind::IgnoreCase => MatcherKind::Regexp,
            MatcherKind::Regexp => MatcherKind::IgnoreCase,
        }
    }

    fn regex(&self, query: &str) -> Option<Regex> {
        let pattern = match self {
            MatcherKind::IgnoreCase => format!("(?i){}", regex::escape(query)),
            MatcherKind::Regexp => query.to_string(),
        };
        Regex::new(&pattern)
            .inspect_err(|e| debug!("Invalid pattern '{pattern}': {e}"))
            .ok()
    }
}

fn filter(lines: &[String], query: &str, kind: MatcherKind) -> Vec<Match> {
    if query.is_empty() {
        return lines.iter().map(|l| Match::new(l.as_str())).collect();
    }
    let Some(re) = kind.regex(query) else {
        return Vec::new();
    };
    lines
        .iter()
        .filter_map(|line| {
            let ranges: Vec<_> = re
                .find_iter(line)
                .filter(|m| !m.is_empty())
                .map(|m| m.range())
                .collect();
            (!ranges.is_empty()).then(|| Match::with_ranges(line.as_str(), ranges))
        })
        .collect()
}

/// What a key press asks the event loop to do
enum Outcome {
    Continue,
    Moved,
    Requery,
    Status(String),
    Accept,
    Cancel,
}

struct Selector {
    lines: Vec<String>,
    results: Vec<Match>,
    kind: MatcherKind,
    ctx: Arc<QueryContext>,
}

impl Selector {
    fn requery(&mut self) {
        self.results = filter(&self.lines, &self.ctx.query(), self.kind);
        self.ctx.set_backing_len(Some(self.results.len()));
        self.ctx.clear_selection();
        trace!("{} results for '{}'", self.results.len(), self.ctx.query());
    }

    fn picked(&self, current_line: usize) -> Vec<String> {
        self.ctx.end_range();
        let selection = self.ctx.selection();
        let lines: Vec<usize> = if selection.is_empty() { vec![current_line] } else { selection };
        lines
            .into_iter()
            .filter_map(|line| self.results.get(line.checked_sub(1)?))
            .map(|m| m.line().to_string())
            .collect()
    }

    fn handle_key<L: Layout>(&mut self, layout: &mut L, current_line: usize, key: KeyEvent) -> Outcome {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => Outcome::Cancel,
            KeyCode::Char('c') if ctrl => Outcome::Cancel,
            KeyCode::Enter => Outcome::Accept,
            KeyCode::Up => {
                layout.move_page(PagingRequest::LineAbove);
                Outcome::Moved
            }
            KeyCode::Down => {
                layout.move_page(PagingRequest::LineBelow);
                Outcome::Moved
            }
            KeyCode::PageUp => {
                layout.move_page(PagingRequest::PageUp);
                Outcome::Moved
            }
            KeyCode::PageDown => {
                layout.move_page(PagingRequest::PageDown);
                Outcome::Moved
            }
            KeyCode::Char(' ') if ctrl => {
                self.ctx.toggle_selection(current_line);
                Outcome::Continue
            }
            KeyCode::Char('v') if ctrl => {
                if self.ctx.is_range_active() {
                    self.ctx.end_range();
                } else {
                    self.ctx.start_range(current_line);
                }
                Outcome::Continue
            }
            KeyCode::Char('r') if ctrl => {
                self.kind = self.kind.next();
                self.ctx.set_matcher_name(self.kind.name());
                self.requery();
                Outcome::Status(format!("Matcher: {}", self.kind.name()))
            }
            KeyCode::Left => {
                self.ctx.move_caret(-1);
                Outcome::Continue
            }
            KeyCode::Right => {
                self.ctx.move_caret(1);
                Outcome::Continue
            }
            KeyCode::Home => {
                self.ctx.set_caret_pos(0);
                Outcome::Continue
            }
            KeyCode::End => {
                self.ctx.move_caret_to_end();
                Outcome::Continue
            }
            KeyCode::Backspace => match self.ctx.delete_backward() {
                Some(_) => Outcome::Requery,
                None => Outcome::Continue,
            },
            KeyCode::Delete => match self.ctx.delete_forward() {
                Some(_) => Outcome::Requery,
                None => Outcome::Continue,
            },
            KeyCode::Char(c) if !ctrl => {
                self.ctx.insert(c);
                Outcome::Requery
            }
            _ => Outcome::Continue,
        }
    }
}

async fn event_loop(options: &LayoutOptions, lines: Vec<String>) -> Result<Option<Vec<String>>> {
    let kind = MatcherKind::IgnoreCase;
    let ctx = Arc::new(QueryContext::new(kind.name()));
    ctx.set_query(&options.query);

    let surface = SharedSurface::new(TerminalSurface::new(CrosstermBackend::new(io::stderr()))?);
    let mut layout = BasicLayout::new(options, ctx.clone(), surface);
    let status_delay = Duration::from_millis(options.status_timeout_ms);

    let mut selector = Selector {
        lines,
        results: Vec::new(),
        kind,
        ctx,
    };
    selector.requery();
    layout.draw_screen(&selector.results);

    let mut events = EventStream::new();
    while let Some(event) = events.next().await {
        let key = match event? {
            Event::Key(key) if key.kind == KeyEventKind::Press => key,
            Event::Resize(width, height) => {
                debug!("Resized to {width}x{height}");
                layout.draw_screen(&selector.results);
                continue;
            }
            _ => continue,
        };

        let current_line = layout.current_line();
        let mut status = None;
        match selector.handle_key(&mut layout, current_line, key) {
            Outcome::Cancel => return Ok(None),
            Outcome::Accept => return Ok(Some(selector.picked(current_line))),
            Outcome::Continue => {}
            Outcome::Moved => {
                if selector.ctx.is_range_active() {
                    selector.ctx.extend_range(layout.current_line());
                }
            }
            Outcome::Requery => {
                selector.requery();
                layout.set_current_line(1);
            }
            Outcome::Status(msg) => {
                layout.set_current_line(1);
                status = Some(msg);
            }
        }

        layout.draw_screen(&selector.results);
        if let Some(msg) = status {
            layout.print_status(&msg, status_delay);
        }
    }
    Ok(None)
}

fn init_logger(options: &LayoutOptions) -> Result<()> {
    // stderr carries the UI, so logs only go to a file
    let Some(path) = &options.log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .format_timestamp_nanos()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn read_lines() -> Result<Vec<String>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        bail!("linepick reads its candidates from stdin, e.g. `ls | linepick`");
    }
    Ok(stdin.lock().lines().collect::<Result<Vec<_>, _>>()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let options = LayoutOptions::parse();
    init_logger(&options)?;

    let lines = read_lines()?;
    info!("Read {} candidate lines", lines.len());

    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(io::stderr(), EnterAlternateScreen, cursor::Hide)?;
    let picked = event_loop(&options, lines).await;
    crossterm::execute!(io::stderr(), LeaveAlternateScreen, cursor::Show)?;
    crossterm::terminal::disable_raw_mode()?;

    match picked? {
        Some(picked) => {
            let mut stdout = io::stdout().lock();
            for line in picked {
                writeln!(stdout, "{line}")?;
            }
            Ok(())
        }
        None => std::process::exit(1),
    }
}
