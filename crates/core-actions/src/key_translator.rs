//! KeyTranslator: gate-aware InputEvent -> Action translation.
//!
//! Gate rules:
//! * Idle: the full binding table (letters, Backspace/Delete, arrows, Space,
//!   Escape, Enter / Shift+Enter, Shift+Backspace, Tab / Shift+Tab, the
//!   compound toggle key).
//! * OnloadGate / CompletionGate: only Enter, Escape and the dismiss button
//!   do anything; they close the popup.
//! * CompoundInput: Enter and the toggle key commit with cursor advance,
//!   Escape commits in place, Backspace edits the micro-editor, printable
//!   characters and committed text are appended. Clicks still reach the
//!   controller, which commits before moving.
//!
//! Keys held with Ctrl or Alt are left to the host.

use crate::{Action, ArrowKey};
use core_config::CompoundConfig;
use core_events::{ButtonCommand, GridOp, InputEvent, KeyCode, KeyEvent, KeyModifiers, OpScope};
use core_grid::Heading;
use core_state::GateKind;

#[derive(Debug, Clone)]
pub struct KeyTranslator {
    toggle_key: char,
}

impl Default for KeyTranslator {
    fn default() -> Self {
        Self::new(&CompoundConfig::default())
    }
}

impl KeyTranslator {
    pub fn new(compound: &CompoundConfig) -> Self {
        Self {
            toggle_key: compound.toggle_key,
        }
    }

    pub fn toggle_key(&self) -> char {
        self.toggle_key
    }

    pub fn translate(&self, gate: GateKind, input: &InputEvent) -> Option<Action> {
        let popup = matches!(gate, GateKind::Onload | GateKind::Completion);
        match input {
            InputEvent::Key(key) => self.translate_key(gate, key),
            InputEvent::Click(coord) if !popup => Some(Action::Click(*coord)),
            InputEvent::ClueSelect { number, direction } if !popup => Some(Action::SelectClue {
                number: *number,
                direction: *direction,
            }),
            InputEvent::Button(ButtonCommand::DismissPopup) if popup => Some(Action::DismissPopup),
            InputEvent::Button(ButtonCommand::ToggleCompound) if !popup => {
                Some(Action::ToggleCompound)
            }
            InputEvent::Button(ButtonCommand::Apply {
                scope,
                op,
                only_unchecked,
            }) if !popup => Some(Action::Apply {
                scope: *scope,
                op: *op,
                only_unchecked: *only_unchecked,
            }),
            InputEvent::TextCommit(text) => match gate {
                GateKind::Idle => Some(Action::TypeText(text.clone())),
                GateKind::Compound => Some(Action::CompoundAppend(text.clone())),
                GateKind::Onload | GateKind::Completion => None,
            },
            _ => None,
        }
    }

    pub fn translate_key(&self, gate: GateKind, key: &KeyEvent) -> Option<Action> {
        if key.mods.intersects(KeyModifiers::CTRL | KeyModifiers::ALT) {
            return None;
        }
        match gate {
            GateKind::Onload | GateKind::Completion => match key.code {
                KeyCode::Enter | KeyCode::Esc => Some(Action::DismissPopup),
                _ => None,
            },
            GateKind::Compound => self.translate_compound(key),
            GateKind::Idle => self.translate_idle(key),
        }
    }

    fn translate_compound(&self, key: &KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Enter => Some(Action::CompoundCommit { advance: true }),
            KeyCode::Char(c) if c == self.toggle_key => {
                Some(Action::CompoundCommit { advance: true })
            }
            KeyCode::Esc => Some(Action::CompoundCommit { advance: false }),
            KeyCode::Backspace => Some(Action::CompoundBackspace),
            KeyCode::Char(c) => Some(Action::CompoundAppend(c.to_string())),
            _ => None,
        }
    }

    fn translate_idle(&self, key: &KeyEvent) -> Option<Action> {
        let shift = key.mods.contains(KeyModifiers::SHIFT);
        let act = match key.code {
            KeyCode::Char(c) if c == self.toggle_key => Action::ToggleCompound,
            KeyCode::Char(' ') => Action::Alternate,
            KeyCode::Char(c) => Action::Type(c.to_string()),
            KeyCode::Backspace | KeyCode::Delete if shift => Action::Apply {
                scope: OpScope::Word,
                op: GridOp::Clear,
                only_unchecked: false,
            },
            KeyCode::Backspace | KeyCode::Delete => Action::Erase,
            KeyCode::Enter => Action::Apply {
                scope: OpScope::Word,
                op: if shift { GridOp::Reveal } else { GridOp::Check },
                only_unchecked: false,
            },
            KeyCode::Esc => Action::Deselect,
            KeyCode::Tab if shift => Action::CycleWord(Heading::Backward),
            KeyCode::Tab => Action::CycleWord(Heading::Forward),
            KeyCode::BackTab => Action::CycleWord(Heading::Backward),
            KeyCode::Up => Action::Arrow(ArrowKey::Up),
            KeyCode::Down => Action::Arrow(ArrowKey::Down),
            KeyCode::Left => Action::Arrow(ArrowKey::Left),
            KeyCode::Right => Action::Arrow(ArrowKey::Right),
        };
        Some(act)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_grid::Coord;

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent::plain(code))
    }

    fn shifted(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent::shifted(code))
    }

    #[test]
    fn idle_bindings() {
        let t = KeyTranslator::default();
        let idle = GateKind::Idle;
        assert_eq!(
            t.translate(idle, &key(KeyCode::Char('a'))),
            Some(Action::Type("a".into()))
        );
        assert_eq!(t.translate(idle, &key(KeyCode::Char(' '))), Some(Action::Alternate));
        assert_eq!(
            t.translate(idle, &shifted(KeyCode::Char('!'))),
            Some(Action::ToggleCompound)
        );
        assert_eq!(t.translate(idle, &key(KeyCode::Backspace)), Some(Action::Erase));
        assert_eq!(
            t.translate(idle, &shifted(KeyCode::Backspace)),
            Some(Action::Apply {
                scope: OpScope::Word,
                op: GridOp::Clear,
                only_unchecked: false
            })
        );
        assert_eq!(
            t.translate(idle, &shifted(KeyCode::Enter)),
            Some(Action::Apply {
                scope: OpScope::Word,
                op: GridOp::Reveal,
                only_unchecked: false
            })
        );
        assert_eq!(
            t.translate(idle, &shifted(KeyCode::Tab)),
            Some(Action::CycleWord(Heading::Backward))
        );
        assert_eq!(t.translate(idle, &key(KeyCode::Esc)), Some(Action::Deselect));
        assert_eq!(
            t.translate(
                idle,
                &InputEvent::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CTRL))
            ),
            None
        );
    }

    #[test]
    fn popup_gates_only_dismiss() {
        let t = KeyTranslator::default();
        for gate in [GateKind::Onload, GateKind::Completion] {
            assert_eq!(t.translate(gate, &key(KeyCode::Enter)), Some(Action::DismissPopup));
            assert_eq!(t.translate(gate, &key(KeyCode::Esc)), Some(Action::DismissPopup));
            assert_eq!(t.translate(gate, &key(KeyCode::Char('a'))), None);
            assert_eq!(t.translate(gate, &InputEvent::Click(Coord::new(0, 0))), None);
            assert_eq!(
                t.translate(gate, &InputEvent::Button(ButtonCommand::DismissPopup)),
                Some(Action::DismissPopup)
            );
        }
        assert_eq!(
            t.translate(GateKind::Idle, &InputEvent::Button(ButtonCommand::DismissPopup)),
            None
        );
    }

    #[test]
    fn compound_gate_owns_the_keyboard() {
        let t = KeyTranslator::new(&CompoundConfig { toggle_key: '~' });
        let g = GateKind::Compound;
        assert_eq!(
            t.translate(g, &key(KeyCode::Enter)),
            Some(Action::CompoundCommit { advance: true })
        );
        assert_eq!(
            t.translate(g, &key(KeyCode::Char('~'))),
            Some(Action::CompoundCommit { advance: true })
        );
        assert_eq!(
            t.translate(g, &key(KeyCode::Esc)),
            Some(Action::CompoundCommit { advance: false })
        );
        assert_eq!(t.translate(g, &key(KeyCode::Backspace)), Some(Action::CompoundBackspace));
        assert_eq!(
            t.translate(g, &key(KeyCode::Char('!'))),
            Some(Action::CompoundAppend("!".into()))
        );
        assert_eq!(t.translate(g, &key(KeyCode::Left)), None);
        assert_eq!(
            t.translate(g, &InputEvent::TextCommit("कै".into())),
            Some(Action::CompoundAppend("कै".into()))
        );
        assert_eq!(
            t.translate(g, &InputEvent::Click(Coord::new(1, 1))),
            Some(Action::Click(Coord::new(1, 1)))
        );
    }
}
