use crate::colony::Colony;
use crate::entities::{ant_to_color, RoomKind};
use crate::error::LemInResult;
use crate::simulation::{Simulation, SimulationState};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, SetForegroundColor},
    terminal::{
        self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::collections::HashMap;
use std::io::{stdout, Write};
use tracing::debug;

const MARGIN: u16 = 2;
// Lines kept free for the header above the colony.
const HEADER: u16 = 3;
const DEFAULT_SIZE: (u16, u16) = (80, 24);

/// Maps every room of the colony onto a `width` x `height` grid of terminal cells.
/// Returns the `(column, row)` of each room.
///
/// Coordinates are scaled between their minimum and maximum, keeping a margin on every side.
/// A dimension where all rooms share the same coordinate is centred.
pub fn layout(colony: &Colony, width: u16, height: u16) -> HashMap<String, (u16, u16)> {
    let rooms = colony.rooms();
    let (min_x, max_x) = bounds(rooms.iter().map(|room| room.x));
    let (min_y, max_y) = bounds(rooms.iter().map(|room| room.y));

    rooms
        .iter()
        .map(|room| {
            let col = scale(room.x, min_x, max_x, width);
            let row = scale(room.y, min_y, max_y, height);
            (room.name.clone(), (col, row))
        })
        .collect()
}

/// Draws the colony and the ants of `state` to the console.
pub fn draw(colony: &Colony, state: &SimulationState) -> LemInResult<()> {
    let (width, height) = terminal::size().unwrap_or(DEFAULT_SIZE);
    let canvas = paint(colony, state, width, height.saturating_sub(HEADER));
    let mut stdout = stdout();

    // Display information about the simulation
    queue!(
        stdout,
        Clear(ClearType::All),
        Hide,
        MoveTo(0, 0),
        Print("Turn: "),
        Print(state.turn.to_string()),
        Print(", Walking = "),
        Print(state.ants.len().to_string()),
        Print(", Waiting = "),
        Print(state.waiting.to_string()),
        Print(", Arrived = "),
        Print(state.arrived.to_string()),
        MoveTo(0, 1),
        Print(if state.finished { "Finished" } else { "" })
    )?;

    // Display the colony
    for (row, cells) in canvas.rows().enumerate() {
        queue!(stdout, MoveTo(0, row as u16 + HEADER))?;
        for &(symbol, color) in cells {
            queue!(stdout, SetForegroundColor(color), Print(symbol))?;
        }
    }
    queue!(stdout, SetForegroundColor(Color::Reset))?;

    stdout.flush()?;
    Ok(())
}

/// Keys understood by the visualizer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    Next,
    Previous,
    Quit,
}

impl Action {
    pub fn from_key(key: KeyEvent) -> Option<Action> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::Quit)
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('j') => Some(Action::Next),
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('k') => Some(Action::Previous),
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            _ => None,
        }
    }
}

/// Steps back and forth through the turns of a simulation in the terminal.
pub struct Visualizer {
    colony: Colony,
    states: Vec<SimulationState>,
    current: usize,
}

impl Visualizer {
    /// Plays the whole simulation up front so turns can be browsed in both directions.
    pub fn new(mut simulation: Simulation) -> LemInResult<Visualizer> {
        let mut state = simulation.start();
        let mut states = vec![state.clone()];

        while !state.finished {
            state = simulation.update()?;
            states.push(state.clone());
        }

        debug!(turns = states.len() - 1, "Prepared visualizer");

        Ok(Visualizer {
            colony: simulation.colony().clone(),
            states,
            current: 0,
        })
    }

    pub fn current(&self) -> &SimulationState {
        &self.states[self.current]
    }

    /// Applies an action. Returns `false` once the visualizer should quit.
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::Next => {
                self.current = (self.current + 1).min(self.states.len() - 1);
            }
            Action::Previous => {
                self.current = self.current.saturating_sub(1);
            }
            Action::Quit => return false,
        }

        true
    }

    /// Runs the interactive loop until the user quits.
    pub fn run(&mut self) -> LemInResult<()> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, Hide)?;

        let result = self.event_loop();

        execute!(stdout(), Show, LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn event_loop(&mut self) -> LemInResult<()> {
        loop {
            draw(&self.colony, self.current())?;

            if let Event::Key(key) = event::read()? {
                if let Some(action) = Action::from_key(key) {
                    if !self.apply(action) {
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// A grid of colored characters.
struct Canvas {
    width: u16,
    cells: Vec<(char, Color)>,
}

impl Canvas {
    fn new(width: u16, height: u16) -> Canvas {
        Canvas {
            width,
            cells: vec![(' ', Color::Reset); width as usize * height as usize],
        }
    }

    fn put(&mut self, col: u16, row: u16, symbol: char, color: Color) {
        if col < self.width {
            let index = row as usize * self.width as usize + col as usize;
            if let Some(cell) = self.cells.get_mut(index) {
                *cell = (symbol, color);
            }
        }
    }

    fn text(&mut self, col: u16, row: u16, text: &str, color: Color) {
        for (offset, symbol) in text.chars().enumerate() {
            self.put(col.saturating_add(offset as u16), row, symbol, color);
        }
    }

    // Tunnels are drawn underneath rooms, so only empty cells are filled.
    fn line(&mut self, from: (u16, u16), to: (u16, u16)) {
        let (dx, dy) = (
            to.0 as i32 - from.0 as i32,
            to.1 as i32 - from.1 as i32,
        );
        let steps = dx.abs().max(dy.abs());

        for step in 1..steps {
            let col = from.0 as i32 + dx * step / steps;
            let row = from.1 as i32 + dy * step / steps;
            let index = row as usize * self.width as usize + col as usize;
            if self.cells.get(index).is_some_and(|cell| cell.0 == ' ') {
                self.put(col as u16, row as u16, '.', Color::DarkGrey);
            }
        }
    }

    fn rows(&self) -> impl Iterator<Item = &[(char, Color)]> {
        self.cells.chunks(self.width.max(1) as usize)
    }
}

fn paint(colony: &Colony, state: &SimulationState, width: u16, height: u16) -> Canvas {
    let positions = layout(colony, width, height);
    let mut canvas = Canvas::new(width, height);

    for (a, b) in colony.tunnels() {
        if let (Some(from), Some(to)) = (positions.get(a), positions.get(b)) {
            canvas.line(*from, *to);
        }
    }

    for room in colony.rooms() {
        if let Some(&(col, row)) = positions.get(&room.name) {
            let kind = colony.kind(&room.name);
            canvas.put(col, row, kind.char(), kind.color());
        }
    }

    // Ants are labelled right of their room, the last ant in a room wins
    for ant in &state.ants {
        let Some(room) = &ant.room else {
            continue;
        };
        if let Some(&(col, row)) = positions.get(room) {
            canvas.text(col.saturating_add(1), row, &ant.id, ant_to_color(ant.number));
        }
    }

    // Arrived ants are counted on the end room
    if state.arrived > 0 {
        if let Some(&(col, row)) = positions.get(colony.end()) {
            canvas.text(
                col.saturating_add(1),
                row,
                &format!("({})", state.arrived),
                RoomKind::End.color(),
            );
        }
    }

    canvas
}

fn bounds(values: impl Iterator<Item = i64>) -> (i64, i64) {
    values.fold((i64::MAX, i64::MIN), |(min, max), value| {
        (min.min(value), max.max(value))
    })
}

fn scale(value: i64, min: i64, max: i64, cells: u16) -> u16 {
    if cells == 0 {
        return 0;
    }

    let last = cells - 1;
    let usable = last.saturating_sub(2 * MARGIN);
    if max <= min || usable == 0 {
        return last / 2;
    }

    // Widened first, the span of two i64 coordinates can exceed i64
    let offset =
        (value as i128 - min as i128) * usable as i128 / (max as i128 - min as i128);
    (MARGIN as i128 + offset) as u16
}
