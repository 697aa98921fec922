//! Core event types and channel helpers for a crossword session.
//!
//! Everything the runtime feeds into the selection controller is normalized
//! here first: key presses (with modifier bitflags), pointer clicks on cells,
//! clue list selection, external button commands and committed text. The
//! controller itself is synchronous; these types only describe *what*
//! happened.

use core_grid::{Coord, Direction};
use std::fmt;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

// -------------------------------------------------------------------------------------------------
// Channel Policy
// -------------------------------------------------------------------------------------------------
// The event loop uses a bounded mpsc channel sized by `EVENT_CHANNEL_CAP`. Producers await
// `send` and are parked while the channel is full, so no input is dropped. There is a single
// consumer (the session loop) and it processes each event to completion before the next one.
// -------------------------------------------------------------------------------------------------
pub const EVENT_CHANNEL_CAP: usize = 1024;

/// Top-level event enum consumed by the session loop.
#[derive(Debug, Clone)]
pub enum Event {
    Input(InputEvent),
    /// Next turn of the loop; used to run deferred continuations.
    Tick,
    Shutdown,
}

/// Normalized input events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    /// Pointer/touch activation of a grid cell.
    Click(Coord),
    /// Activation of a clue list entry.
    ClueSelect { number: u32, direction: Direction },
    /// Command issued from a toolbar button or dropdown menu.
    Button(ButtonCommand),
    /// One or more grapheme clusters committed by an IME or paste.
    TextCommit(String),
}

/// Granularity of a grid operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpScope {
    Cell,
    Word,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridOp {
    Reveal,
    Check,
    Clear,
}

impl OpScope {
    pub fn as_str(self) -> &'static str {
        match self {
            OpScope::Cell => "cell",
            OpScope::Word => "word",
            OpScope::Grid => "grid",
        }
    }
}

impl GridOp {
    pub fn as_str(self) -> &'static str {
        match self {
            GridOp::Reveal => "reveal",
            GridOp::Check => "check",
            GridOp::Clear => "clear",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonCommand {
    /// Reveal / check / clear. `only_unchecked` restricts `Clear` to cells
    /// that are not locked.
    Apply {
        scope: OpScope,
        op: GridOp,
        only_unchecked: bool,
    },
    ToggleCompound,
    DismissPopup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::empty())
    }

    pub fn shifted(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::SHIFT)
    }
}

/// KeyCode enumerates normalized logical key representations consumed by higher layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Delete,
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
}

impl KeyCode {
    /// Parse a key name as written in input scripts (`Enter`, `ArrowLeft`,
    /// `Space`, a single character, ...). Names are case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Some(KeyCode::Char(c));
        }
        let code = match name.to_ascii_lowercase().as_str() {
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "backspace" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "up" | "arrowup" => KeyCode::Up,
            "down" | "arrowdown" => KeyCode::Down,
            "left" | "arrowleft" => KeyCode::Left,
            "right" | "arrowright" => KeyCode::Right,
            "space" | "spacebar" => KeyCode::Char(' '),
            _ => return None,
        };
        Some(code)
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{:?}", self.code, self.mods)
    }
}

// -------------------------------------------------------------------------------------------------
// Async Event Sources
// -------------------------------------------------------------------------------------------------
// Each source owns its task lifecycle and must stop promptly once `send` fails (consumer dropped).
// The surface is deliberately small (name + spawn).

/// Trait implemented by any async event producer. Implementors usually hold configuration and
/// spawn one background task that pushes `Event`s into the shared channel.
pub trait AsyncEventSource: Send + 'static {
    /// Human-readable stable identifier (used for logging / diagnostics).
    fn name(&self) -> &'static str;
    /// Consume self and spawn the background task, returning a JoinHandle.
    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()>;
}

/// Registry of event sources spawned together at startup.
pub struct EventSourceRegistry {
    sources: Vec<Box<dyn AsyncEventSource>>,
}

impl Default for EventSourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSourceRegistry {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn register<S: AsyncEventSource>(&mut self, src: S) {
        self.sources.push(Box::new(src));
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Spawn all registered sources, returning their JoinHandles. Each source receives its own
    /// clone of `tx`; the registry is drained so a second call spawns nothing.
    ///
    /// During shutdown the caller should drop its final `Sender` clone before awaiting the
    /// returned handles so the sources observe the closed channel and exit.
    pub fn spawn_all(&mut self, tx: &Sender<Event>) -> Vec<JoinHandle<()>> {
        let mut out = Vec::with_capacity(self.sources.len());
        for src in self.sources.drain(..) {
            let name = src.name();
            tracing::info!(target: "runtime.events", source = name, "spawning event source");
            out.push(src.spawn(tx.clone()));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[test]
    fn key_event_display() {
        let k = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::SHIFT);
        let s = format!("{}", k);
        assert!(s.contains("Char"));
        assert!(s.contains("SHIFT"));
    }

    #[test]
    fn key_names_parse() {
        assert_eq!(KeyCode::from_name("ArrowLeft"), Some(KeyCode::Left));
        assert_eq!(KeyCode::from_name("space"), Some(KeyCode::Char(' ')));
        assert_eq!(KeyCode::from_name("q"), Some(KeyCode::Char('q')));
        assert_eq!(KeyCode::from_name("아"), Some(KeyCode::Char('아')));
        assert_eq!(KeyCode::from_name("hyper"), None);
    }

    struct MockOnceSource;

    impl AsyncEventSource for MockOnceSource {
        fn name(&self) -> &'static str {
            "mock_once"
        }
        fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
            tokio::spawn(async move {
                let _ = tx
                    .send(Event::Input(InputEvent::Click(Coord::new(0, 0))))
                    .await;
            })
        }
    }

    #[tokio::test]
    async fn registry_spawns_and_emits() {
        let (tx, mut rx) = mpsc::channel::<Event>(8);
        let mut reg = EventSourceRegistry::new();
        reg.register(MockOnceSource);
        assert_eq!(reg.len(), 1);
        let handles = reg.spawn_all(&tx);
        assert!(reg.is_empty(), "spawn_all drains the registry");
        let ev = tokio::time::timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("source should emit promptly");
        assert!(matches!(
            ev,
            Some(Event::Input(InputEvent::Click(c))) if c == Coord::new(0, 0)
        ));
        drop(tx);
        for handle in handles {
            let _ = tokio::time::timeout(Duration::from_millis(20), handle).await;
        }
    }

    struct MockCloseSource {
        flag: Arc<AtomicBool>,
    }

    impl AsyncEventSource for MockCloseSource {
        fn name(&self) -> &'static str {
            "mock_close"
        }

        fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
            let flag = self.flag;
            tokio::spawn(async move {
                tx.closed().await;
                flag.store(true, Ordering::SeqCst);
            })
        }
    }

    #[tokio::test]
    async fn registry_sources_exit_on_channel_drop() {
        let (tx, rx) = mpsc::channel::<Event>(8);
        let mut reg = EventSourceRegistry::new();
        let flag = Arc::new(AtomicBool::new(false));
        reg.register(MockCloseSource { flag: flag.clone() });
        let handles = reg.spawn_all(&tx);

        drop(tx);
        drop(rx);

        for handle in handles {
            match tokio::time::timeout(Duration::from_millis(50), handle).await {
                Ok(join_res) => join_res.expect("source task should exit cleanly"),
                Err(_) => panic!("source task did not observe channel closure"),
            }
        }

        assert!(flag.load(Ordering::SeqCst));
    }
}
