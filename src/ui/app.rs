//! Main TUI application state and logic

use crate::parser::Language;
use crate::snapshot::Step;
use crate::ui::panes::{
    render_heap_pane, render_source_pane, render_stack_pane, render_status_bar,
    render_terminal_pane, render_variables_pane, HeapScrollState, SourceRenderData,
    SourceScrollState, StackScrollState, StatusRenderData,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Terminal,
    Variables,
    Stack,
    Heap,
}

impl FocusedPane {
    /// Move focus to the next pane (left column top to bottom, then right)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Terminal,
            FocusedPane::Terminal => FocusedPane::Variables,
            FocusedPane::Variables => FocusedPane::Stack,
            FocusedPane::Stack => FocusedPane::Heap,
            FocusedPane::Heap => FocusedPane::Source,
        }
    }
}

/// The trace viewer
pub struct App {
    /// The recorded trace
    pub steps: Vec<Step>,

    /// The traced source
    pub source_code: String,

    pub language: Language,

    /// Index of the step on screen
    pub position: usize,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll state
    pub source_scroll: SourceScrollState,
    pub variables_scroll: usize,
    pub stack_scroll: StackScrollState,
    pub heap_scroll: HeapScrollState,
    pub terminal_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Transient message shown instead of the step description
    pub status_message: Option<String>,

    /// Whether auto-play mode is active
    pub is_playing: bool,

    /// Last time a step was taken in play mode
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,
}

impl App {
    pub fn new(steps: Vec<Step>, source_code: String, language: Language) -> Self {
        let status_message = steps
            .is_empty()
            .then(|| "Nothing to trace: no recognized statements".to_string());
        App {
            steps,
            source_code,
            language,
            position: 0,
            focused_pane: FocusedPane::Source,
            source_scroll: SourceScrollState::default(),
            variables_scroll: 0,
            stack_scroll: StackScrollState::default(),
            heap_scroll: HeapScrollState::default(),
            terminal_scroll: 0,
            should_quit: false,
            status_message,
            is_playing: false,
            last_play_time: Instant::now(),
            last_space_press: Instant::now()
                .checked_sub(Duration::from_secs(1))
                .unwrap_or_else(Instant::now),
        }
    }

    /// Run the TUI event loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= Duration::from_secs(1) {
                if !self.step_forward() {
                    self.is_playing = false;
                    self.status_message = Some("Playback complete".to_string());
                }
                self.last_play_time = Instant::now();
            }

            // Poll with a timeout so auto-play keeps ticking
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// The step on screen
    pub fn current_step(&self) -> Option<&Step> {
        self.steps.get(self.position)
    }

    fn render(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[0]);

        // Left column: Source (top) | Output (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[0]);

        // Right column: Variables | Stack | Heap
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(30),
                Constraint::Percentage(40),
                Constraint::Percentage(30),
            ])
            .split(columns[1]);

        let step = self.steps.get(self.position);
        let current_line = step
            .and_then(|s| usize::try_from(s.source_line).ok())
            .unwrap_or(0);
        let is_error = step.is_some_and(|s| s.error);

        render_source_pane(
            frame,
            left_rows[0],
            SourceRenderData {
                source_code: &self.source_code,
                language: self.language,
                current_line,
                is_error,
            },
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        render_terminal_pane(
            frame,
            left_rows[1],
            step.map_or(&[][..], |s| s.output.as_slice()),
            self.focused_pane == FocusedPane::Terminal,
            &mut self.terminal_scroll,
        );

        render_variables_pane(
            frame,
            right_rows[0],
            step.map_or(&[][..], |s| s.variables.as_slice()),
            self.language,
            self.focused_pane == FocusedPane::Variables,
            &mut self.variables_scroll,
        );

        render_stack_pane(
            frame,
            right_rows[1],
            step.map_or(&[][..], |s| s.stack_frames.as_slice()),
            self.language,
            self.focused_pane == FocusedPane::Stack,
            &mut self.stack_scroll,
        );

        render_heap_pane(
            frame,
            right_rows[2],
            step.map_or(&[][..], |s| s.heap_objects.as_slice()),
            self.language,
            self.focused_pane == FocusedPane::Heap,
            &mut self.heap_scroll,
        );

        let message = match (&self.status_message, step) {
            (Some(message), _) => message.as_str(),
            (None, Some(step)) => step.description.as_str(),
            (None, None) => "",
        };
        render_status_bar(
            frame,
            main_chunks[1],
            StatusRenderData {
                message,
                current_step: self.position,
                total_steps: self.steps.len(),
                is_error,
                is_playing: self.is_playing,
            },
        );
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Left => {
                self.is_playing = false;
                if !self.step_backward() {
                    self.status_message = Some("Already at the first step".to_string());
                }
            }
            KeyCode::Right => {
                self.is_playing = false;
                if !self.step_forward() {
                    self.status_message = Some("Already at the last step".to_string());
                }
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Source => {
                    // Scrolling up makes the current line move down visually
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_add(1));
                    }
                }
                FocusedPane::Variables => {
                    self.variables_scroll = self.variables_scroll.saturating_sub(1);
                }
                FocusedPane::Stack => {
                    self.stack_scroll.offset = self.stack_scroll.offset.saturating_sub(1);
                }
                FocusedPane::Heap => {
                    self.heap_scroll.offset = self.heap_scroll.offset.saturating_sub(1);
                }
                FocusedPane::Terminal => {
                    self.terminal_scroll = self.terminal_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Source => {
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_sub(1));
                    }
                }
                FocusedPane::Variables => {
                    self.variables_scroll = self.variables_scroll.saturating_add(1);
                }
                FocusedPane::Stack => {
                    self.stack_scroll.offset = self.stack_scroll.offset.saturating_add(1);
                }
                FocusedPane::Heap => {
                    self.heap_scroll.offset = self.heap_scroll.offset.saturating_add(1);
                }
                FocusedPane::Terminal => {
                    self.terminal_scroll = self.terminal_scroll.saturating_add(1);
                }
            },
            KeyCode::Char(' ') => {
                // Toggle auto-play (200ms debounce against key repeat)
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.is_playing = !self.is_playing;
                    if self.is_playing {
                        self.last_play_time = Instant::now();
                        self.status_message = None;
                    } else {
                        self.status_message = Some("Paused".to_string());
                    }
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                self.jump_to(self.steps.len().saturating_sub(1));
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.jump_to(0);
            }
            _ => {}
        }
    }

    /// Advance one step; `false` at the end of the trace
    pub fn step_forward(&mut self) -> bool {
        if self.position + 1 >= self.steps.len() {
            return false;
        }
        self.jump_to(self.position + 1);
        true
    }

    /// Go back one step; `false` at the start of the trace
    pub fn step_backward(&mut self) -> bool {
        if self.position == 0 {
            return false;
        }
        self.jump_to(self.position - 1);
        true
    }

    fn jump_to(&mut self, position: usize) {
        self.position = position;
        self.status_message = None;
        // Auto-scroll output to the bottom
        self.terminal_scroll = usize::MAX;
    }
}
