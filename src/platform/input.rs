//! Input commands
//!
//! Front ends translate their own keys and buttons into `Command`s. No device
//! identifiers reach the game.

use std::collections::{HashSet, VecDeque};

use crate::sim::TickInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    MoveLeft,
    MoveRight,
    AngleUp,
    AngleDown,
    PowerUp,
    PowerDown,
    Fire,
    Restart,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Pressed(Command),
    Released(Command),
}

/// A queue of input events, drained once per tick
pub trait InputSource {
    fn poll(&mut self) -> Vec<InputEvent>;
}

/// Held commands plus one-shot presses not yet consumed by a tick
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Command>,
    fire: bool,
    restart: bool,
    quit: bool,
}

impl InputState {
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::Pressed(command) => {
                // Edge-triggered: only a fresh press fires
                let fresh = self.held.insert(command);
                match command {
                    Command::Fire if fresh => self.fire = true,
                    Command::Restart if fresh => self.restart = true,
                    Command::Quit => self.quit = true,
                    _ => {}
                }
            }
            InputEvent::Released(command) => {
                self.held.remove(&command);
            }
        }
    }

    pub fn apply_all(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        for event in events {
            self.apply(event);
        }
    }

    /// Quit stays requested once seen
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    pub fn is_held(&self, command: Command) -> bool {
        self.held.contains(&command)
    }

    fn axis(&self, negative: Command, positive: Command) -> i32 {
        self.is_held(positive) as i32 - self.is_held(negative) as i32
    }

    /// Input for the next turn tick; one-shot presses are consumed
    pub fn take_tick_input(&mut self) -> TickInput {
        let input = TickInput {
            move_dir: self.axis(Command::MoveLeft, Command::MoveRight),
            angle_dir: self.axis(Command::AngleDown, Command::AngleUp),
            power_dir: self.axis(Command::PowerDown, Command::PowerUp),
            fire: self.fire,
            restart: self.restart,
        };
        self.discard_presses();
        input
    }

    /// Forget one-shot presses made while the game was not reading input
    pub fn discard_presses(&mut self) {
        self.fire = false;
        self.restart = false;
    }
}

/// Input replayed from a prepared script, one batch of events per poll
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<Vec<InputEvent>>,
    quit_when_done: bool,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send `Quit` once the script runs out
    pub fn quit_when_done(mut self) -> Self {
        self.quit_when_done = true;
        self
    }

    /// Poll with nothing happening
    pub fn idle(mut self, polls: usize) -> Self {
        self.frames.extend((0..polls).map(|_| Vec::new()));
        self
    }

    /// Hold a command for `polls` polls, then release it
    pub fn hold(mut self, command: Command, polls: usize) -> Self {
        if polls == 0 {
            return self;
        }
        self.frames.push_back(vec![InputEvent::Pressed(command)]);
        self.frames.extend((1..polls).map(|_| Vec::new()));
        self.frames.push_back(vec![InputEvent::Released(command)]);
        self
    }

    /// Press and release within one poll
    pub fn tap(mut self, command: Command) -> Self {
        self.frames.push_back(vec![
            InputEvent::Pressed(command),
            InputEvent::Released(command),
        ]);
        self
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Vec<InputEvent> {
        match self.frames.pop_front() {
            Some(events) => events,
            None if self.quit_when_done => vec![InputEvent::Pressed(Command::Quit)],
            None => Vec::new(),
        }
    }
}
