//! Input scripts: one input event per line.
//!
//! ```text
//! # comments and blank lines are ignored
//! dismiss
//! click 0 0
//! key ArrowRight
//! key Enter shift
//! type cat
//! clue 2 down
//! op word check
//! op grid clear unchecked
//! compound
//! ```

use anyhow::{Context, Result, anyhow, bail};
use core_events::{
    AsyncEventSource, ButtonCommand, Event, GridOp, InputEvent, KeyCode, KeyEvent, KeyModifiers,
    OpScope,
};
use core_grid::{Coord, Direction};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Parse one script line. `Ok(None)` for blank lines and comments.
pub fn parse_line(line: &str) -> Result<Option<InputEvent>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (trimmed, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();
    let event = match verb.to_ascii_lowercase().as_str() {
        "key" => parse_key(&args)?,
        "type" => {
            if rest.is_empty() {
                bail!("type needs text");
            }
            InputEvent::TextCommit(rest.to_string())
        }
        "click" => match args.as_slice() {
            [row, col] => InputEvent::Click(Coord::new(
                row.parse().with_context(|| format!("bad row {row:?}"))?,
                col.parse().with_context(|| format!("bad column {col:?}"))?,
            )),
            _ => bail!("usage: click <row> <col>"),
        },
        "clue" => match args.as_slice() {
            [number, direction] => InputEvent::ClueSelect {
                number: number
                    .parse()
                    .with_context(|| format!("bad clue number {number:?}"))?,
                direction: direction.parse::<Direction>()?,
            },
            _ => bail!("usage: clue <number> <across|down>"),
        },
        "op" => parse_op(&args)?,
        "compound" => InputEvent::Button(ButtonCommand::ToggleCompound),
        "dismiss" => InputEvent::Button(ButtonCommand::DismissPopup),
        other => bail!("unknown command {other:?}"),
    };
    Ok(Some(event))
}

fn parse_key(args: &[&str]) -> Result<InputEvent> {
    let (name, modifiers) = match args {
        [name, mods @ ..] => (*name, mods),
        [] => bail!("usage: key <name|char> [shift|ctrl|alt]"),
    };
    let code = KeyCode::from_name(name).ok_or_else(|| anyhow!("unknown key {name:?}"))?;
    let mut mods = KeyModifiers::empty();
    for m in modifiers {
        mods |= match m.to_ascii_lowercase().as_str() {
            "shift" => KeyModifiers::SHIFT,
            "ctrl" => KeyModifiers::CTRL,
            "alt" => KeyModifiers::ALT,
            other => bail!("unknown modifier {other:?}"),
        };
    }
    Ok(InputEvent::Key(KeyEvent::new(code, mods)))
}

fn parse_op(args: &[&str]) -> Result<InputEvent> {
    let (scope, op, only_unchecked) = match args {
        [scope, op] => (*scope, *op, false),
        [scope, op, flag] if flag.eq_ignore_ascii_case("unchecked") => (*scope, *op, true),
        _ => bail!("usage: op <cell|word|grid> <reveal|check|clear> [unchecked]"),
    };
    let scope = match scope.to_ascii_lowercase().as_str() {
        "cell" => OpScope::Cell,
        "word" => OpScope::Word,
        "grid" => OpScope::Grid,
        other => bail!("unknown scope {other:?}"),
    };
    let op = match op.to_ascii_lowercase().as_str() {
        "reveal" => GridOp::Reveal,
        "check" => GridOp::Check,
        "clear" => GridOp::Clear,
        other => bail!("unknown operation {other:?}"),
    };
    Ok(InputEvent::Button(ButtonCommand::Apply {
        scope,
        op,
        only_unchecked,
    }))
}

/// Parse a whole script up front. Errors carry the 1-based line number.
pub fn parse_script(source: &str) -> Result<Vec<InputEvent>> {
    let mut events = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        if let Some(ev) = parse_line(line).with_context(|| format!("script line {}", idx + 1))? {
            events.push(ev);
        }
    }
    Ok(events)
}

/// Replays a pre-parsed script, then requests shutdown.
pub struct ScriptEventSource {
    events: Vec<InputEvent>,
}

impl ScriptEventSource {
    pub fn new(events: Vec<InputEvent>) -> Self {
        Self { events }
    }
}

impl AsyncEventSource for ScriptEventSource {
    fn name(&self) -> &'static str {
        "script"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        tokio::spawn(async move {
            for ev in self.events {
                if tx.send(Event::Input(ev)).await.is_err() {
                    return;
                }
            }
            let _ = tx.send(Event::Shutdown).await;
        })
    }
}

/// Streams script lines from stdin. Bad lines are logged and skipped.
pub struct StdinScriptSource;

impl AsyncEventSource for StdinScriptSource {
    fn name(&self) -> &'static str {
        "stdin_script"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            let mut number = 0usize;
            loop {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(target: "runtime.events", error = %e, "stdin_read_failed");
                        break;
                    }
                };
                number += 1;
                match parse_line(&line) {
                    Ok(Some(ev)) => {
                        if tx.send(Event::Input(ev)).await.is_err() {
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!(target: "runtime.events", line = number, error = %e, "script_line_skipped")
                    }
                }
            }
            debug!(target: "runtime.events", lines = number, "stdin_script_finished");
            let _ = tx.send(Event::Shutdown).await;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_every_verb() {
        let src = "\
# warm up
dismiss

click 1 2
key ArrowLeft
key Enter shift
key !  shift
type 아이
clue 3 across
op word check
op grid clear unchecked
compound
";
        let events = parse_script(src).unwrap();
        assert_eq!(
            events,
            vec![
                InputEvent::Button(ButtonCommand::DismissPopup),
                InputEvent::Click(Coord::new(1, 2)),
                InputEvent::Key(KeyEvent::plain(KeyCode::Left)),
                InputEvent::Key(KeyEvent::shifted(KeyCode::Enter)),
                InputEvent::Key(KeyEvent::shifted(KeyCode::Char('!'))),
                InputEvent::TextCommit("아이".into()),
                InputEvent::ClueSelect {
                    number: 3,
                    direction: Direction::Across
                },
                InputEvent::Button(ButtonCommand::Apply {
                    scope: OpScope::Word,
                    op: GridOp::Check,
                    only_unchecked: false
                }),
                InputEvent::Button(ButtonCommand::Apply {
                    scope: OpScope::Grid,
                    op: GridOp::Clear,
                    only_unchecked: true
                }),
                InputEvent::Button(ButtonCommand::ToggleCompound),
            ]
        );
    }

    #[test]
    fn errors_name_the_line() {
        let err = parse_script("click 0 0\nclick x 1\n").unwrap_err();
        assert!(format!("{err:#}").contains("script line 2"));
        assert!(parse_line("op row check").is_err());
        assert!(parse_line("key Hyper").is_err());
        assert!(parse_line("clue 1 sideways").is_err());
        assert!(parse_line("fly 1").is_err());
    }

    #[tokio::test]
    async fn script_source_ends_with_shutdown() {
        let (tx, mut rx) = tokio::sync::mpsc::channel(8);
        let src = Box::new(ScriptEventSource::new(vec![InputEvent::Click(Coord::new(
            0, 0,
        ))]));
        let handle = src.spawn(tx);
        assert!(matches!(rx.recv().await, Some(Event::Input(InputEvent::Click(_)))));
        assert!(matches!(rx.recv().await, Some(Event::Shutdown)));
        handle.await.unwrap();
    }
}
