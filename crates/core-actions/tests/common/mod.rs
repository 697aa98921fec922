#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_actions::{DispatchResult, KeyTranslator, SelectionController, SessionObserver, dispatch, run_deferred};
use core_config::AssistConfig;
use core_events::{InputEvent, KeyCode, KeyEvent};
use core_grid::{Cell, Coord, Puzzle};
use core_state::Prompt;
use std::cell::RefCell;
use std::rc::Rc;

/// Everything observers saw during a session.
#[derive(Default)]
pub struct Recorded {
    pub written: RefCell<Vec<Coord>>,
    pub prompts: RefCell<Vec<Prompt>>,
    pub completed: RefCell<usize>,
}

struct Recorder(Rc<Recorded>);

impl SessionObserver for Recorder {
    fn on_prompt(&self, prompt: Prompt) {
        self.0.prompts.borrow_mut().push(prompt);
    }
    fn on_cell_written(&self, coord: Coord, _cell: &Cell) {
        self.0.written.borrow_mut().push(coord);
    }
    fn on_completed(&self) {
        *self.0.completed.borrow_mut() += 1;
    }
}

/// Controller + translator + observers, driven the way the runtime loop
/// drives them: translate, dispatch, then flush deferred work.
pub struct Session {
    pub ctl: SelectionController,
    pub translator: KeyTranslator,
    pub observers: Vec<Box<dyn SessionObserver>>,
    pub log: Rc<Recorded>,
}

impl Session {
    pub fn new(rows: &[&str], assist: AssistConfig) -> Self {
        let puzzle = Puzzle::from_rows("itest", rows).expect("fixture puzzle");
        Self::from_puzzle(puzzle, assist)
    }

    pub fn from_puzzle(puzzle: Puzzle, assist: AssistConfig) -> Self {
        let log = Rc::new(Recorded::default());
        Self {
            ctl: SelectionController::new(puzzle, assist),
            translator: KeyTranslator::default(),
            observers: vec![Box::new(Recorder(log.clone()))],
            log,
        }
    }

    pub fn feed(&mut self, input: InputEvent) -> DispatchResult {
        let gate = self.ctl.gate().kind();
        let mut result = match self.translator.translate(gate, &input) {
            Some(action) => dispatch(action, &mut self.ctl, &self.observers),
            None => DispatchResult::clean(),
        };
        let deferred = run_deferred(&mut self.ctl, &self.observers);
        result.dirty |= deferred.dirty;
        result
    }

    pub fn key(&mut self, code: KeyCode) -> DispatchResult {
        self.feed(InputEvent::Key(KeyEvent::plain(code)))
    }

    pub fn shift_key(&mut self, code: KeyCode) -> DispatchResult {
        self.feed(InputEvent::Key(KeyEvent::shifted(code)))
    }

    pub fn click(&mut self, row: usize, col: usize) -> DispatchResult {
        self.feed(InputEvent::Click(Coord::new(row, col)))
    }

    /// One key press per character.
    pub fn type_keys(&mut self, text: &str) {
        for ch in text.chars() {
            self.key(KeyCode::Char(ch));
        }
    }

    pub fn value(&self, row: usize, col: usize) -> String {
        self.ctl
            .grid()
            .cell(Coord::new(row, col))
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    pub fn flags(&self, row: usize, col: usize) -> (bool, bool) {
        self.ctl
            .grid()
            .cell(Coord::new(row, col))
            .map(|c| (c.locked, c.wrong))
            .unwrap_or_default()
    }

    pub fn completions(&self) -> usize {
        *self.log.completed.borrow()
    }
}

pub fn plain_assist() -> AssistConfig {
    AssistConfig {
        smart_skip: false,
        auto_advance_word: false,
        check_as_you_type: false,
    }
}
