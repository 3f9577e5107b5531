//! Keyboard mapping
//!
//! The host feeds raw `KeyboardEvent.key` strings in; once per animation
//! frame it takes a `KeyFrame` (keys pressed since the last frame plus the
//! set currently held), and each player's `ControlScheme` turns that into
//! a `PlayerInput` for the simulation.

use std::collections::HashSet;

use crate::sim::{PlayerInput, ShapeType};

/// A key the game cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Space,
    Enter,
    Escape,
    Digit(u8),
    /// Lowercase letter
    Char(char),
}

impl Key {
    /// Map a `KeyboardEvent.key` value; unmapped keys give `None`
    pub fn parse(key: &str) -> Option<Key> {
        match key {
            "ArrowUp" => Some(Key::ArrowUp),
            "ArrowDown" => Some(Key::ArrowDown),
            "ArrowLeft" => Some(Key::ArrowLeft),
            "ArrowRight" => Some(Key::ArrowRight),
            " " | "Spacebar" => Some(Key::Space),
            "Enter" => Some(Key::Enter),
            "Escape" | "Esc" => Some(Key::Escape),
            _ => {
                let mut chars = key.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                if let Some(d) = c.to_digit(10) {
                    Some(Key::Digit(d as u8))
                } else if c.is_ascii_alphabetic() {
                    Some(Key::Char(c.to_ascii_lowercase()))
                } else {
                    None
                }
            }
        }
    }
}

/// Keys pressed this frame and keys held at the end of it
#[derive(Debug, Clone, Default)]
pub struct KeyFrame {
    /// Key-down events in arrival order (auto-repeat included)
    pub pressed: Vec<Key>,
    pub held: HashSet<Key>,
}

impl KeyFrame {
    pub fn was_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    pub fn press_count(&self, key: Key) -> usize {
        self.pressed.iter().filter(|k| **k == key).count()
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Last digit pressed this frame
    pub fn pressed_digit(&self) -> Option<u8> {
        self.pressed.iter().rev().find_map(|k| match k {
            Key::Digit(d) => Some(*d),
            _ => None,
        })
    }

    /// Same held set with the one-shot presses consumed, for extra substeps
    pub fn held_only(&self) -> KeyFrame {
        KeyFrame {
            pressed: Vec::new(),
            held: self.held.clone(),
        }
    }
}

/// Accumulates key events between frames
#[derive(Debug, Default)]
pub struct Controls {
    held: HashSet<Key>,
    pressed: Vec<Key>,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the key is mapped (so the host can prevent default)
    pub fn key_down(&mut self, key: &str) -> bool {
        let Some(key) = Key::parse(key) else {
            return false;
        };
        self.pressed.push(key);
        self.held.insert(key);
        true
    }

    pub fn key_up(&mut self, key: &str) {
        if let Some(key) = Key::parse(key) {
            self.held.remove(&key);
        }
    }

    /// Forget held keys (focus lost: key-up events will never arrive)
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn take_frame(&mut self) -> KeyFrame {
        KeyFrame {
            pressed: std::mem::take(&mut self.pressed),
            held: self.held.clone(),
        }
    }
}

/// Per-player key bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlScheme {
    /// Arrows step once per key-down, Space fires, 1/2/3 pick a shape
    Single,
    /// Arrows held, Space fires, 1/2/3 pick a shape
    DuelPlayer1,
    /// WASD held, F fires, Z/X/C pick a shape
    DuelPlayer2,
}

impl ControlScheme {
    pub fn resolve(&self, frame: &KeyFrame) -> PlayerInput {
        match self {
            ControlScheme::Single => {
                let steps = |neg: Key, pos: Key| {
                    frame.press_count(pos) as f32 - frame.press_count(neg) as f32
                };
                PlayerInput {
                    dx: steps(Key::ArrowLeft, Key::ArrowRight),
                    dy: steps(Key::ArrowUp, Key::ArrowDown),
                    fire: frame.was_pressed(Key::Space),
                    shape: shape_from_digits(frame),
                }
            }
            ControlScheme::DuelPlayer1 => held_input(
                frame,
                [Key::ArrowLeft, Key::ArrowRight, Key::ArrowUp, Key::ArrowDown],
                Key::Space,
                shape_from_digits(frame),
            ),
            ControlScheme::DuelPlayer2 => {
                let shape = frame.pressed.iter().rev().find_map(|k| match k {
                    Key::Char('z') => Some(ShapeType::Circle),
                    Key::Char('x') => Some(ShapeType::Triangle),
                    Key::Char('c') => Some(ShapeType::Cube),
                    _ => None,
                });
                held_input(
                    frame,
                    [Key::Char('a'), Key::Char('d'), Key::Char('w'), Key::Char('s')],
                    Key::Char('f'),
                    shape,
                )
            }
        }
    }
}

fn shape_from_digits(frame: &KeyFrame) -> Option<ShapeType> {
    match frame.pressed_digit()? {
        1 => Some(ShapeType::Circle),
        2 => Some(ShapeType::Triangle),
        3 => Some(ShapeType::Cube),
        _ => None,
    }
}

/// `dirs` is left, right, up, down
fn held_input(frame: &KeyFrame, dirs: [Key; 4], fire: Key, shape: Option<ShapeType>) -> PlayerInput {
    let axis = |neg: Key, pos: Key| match (frame.is_held(neg), frame.is_held(pos)) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    };
    PlayerInput {
        dx: axis(dirs[0], dirs[1]),
        dy: axis(dirs[2], dirs[3]),
        fire: frame.is_held(fire) || frame.was_pressed(fire),
        shape,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keys() {
        assert_eq!(Key::parse("ArrowLeft"), Some(Key::ArrowLeft));
        assert_eq!(Key::parse(" "), Some(Key::Space));
        assert_eq!(Key::parse("3"), Some(Key::Digit(3)));
        assert_eq!(Key::parse("W"), Some(Key::Char('w')));
        assert_eq!(Key::parse("Shift"), None);
        assert_eq!(Key::parse("+"), None);
        assert_eq!(Key::parse(""), None);
    }

    #[test]
    fn test_unmapped_keys_ignored() {
        let mut controls = Controls::new();
        assert!(!controls.key_down("Tab"));
        assert!(controls.take_frame().pressed.is_empty());
    }

    #[test]
    fn test_single_steps_per_press() {
        let mut controls = Controls::new();
        controls.key_down("ArrowRight");
        controls.key_down("ArrowRight");
        controls.key_down("ArrowUp");
        controls.key_down("2");
        let input = ControlScheme::Single.resolve(&controls.take_frame());
        assert_eq!(input.dx, 2.0);
        assert_eq!(input.dy, -1.0);
        assert_eq!(input.shape, Some(ShapeType::Triangle));

        // Held without a new key-down does not move in single mode
        let input = ControlScheme::Single.resolve(&controls.take_frame());
        assert_eq!(input.dx, 0.0);
    }

    #[test]
    fn test_duel_schemes_are_independent() {
        let mut controls = Controls::new();
        controls.key_down("ArrowLeft");
        controls.key_down("s");
        controls.key_down("f");
        controls.key_down("c");
        let frame = controls.take_frame();

        let p1 = ControlScheme::DuelPlayer1.resolve(&frame);
        assert_eq!((p1.dx, p1.dy), (-1.0, 0.0));
        assert!(!p1.fire);

        let p2 = ControlScheme::DuelPlayer2.resolve(&frame);
        assert_eq!((p2.dx, p2.dy), (0.0, 1.0));
        assert!(p2.fire);
        assert_eq!(p2.shape, Some(ShapeType::Cube));

        // Held keys keep moving on the next frame
        let next = controls.take_frame();
        assert_eq!(ControlScheme::DuelPlayer1.resolve(&next).dx, -1.0);
        controls.key_up("ArrowLeft");
        assert_eq!(ControlScheme::DuelPlayer1.resolve(&controls.take_frame()).dx, 0.0);
    }

    #[test]
    fn test_release_all() {
        let mut controls = Controls::new();
        controls.key_down("w");
        controls.release_all();
        assert!(controls.take_frame().held.is_empty());
    }
}
