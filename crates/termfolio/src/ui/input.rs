//! Decoding of raw terminal input received over the SSH channel.

/// A decoded keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Return or line feed.
    Enter,
    /// Space bar.
    Space,
    /// A lone escape.
    Esc,
    /// Backspace or delete.
    Backspace,
    /// Ctrl+C.
    CtrlC,
    /// Any other printable character.
    Char(char),
}

const ESC: u8 = 0x1b;

/// Decode a chunk of terminal input into keys.
///
/// Unknown escape sequences and control bytes are dropped. A chunk is
/// assumed to hold whole sequences, which holds for interactive typing.
#[must_use]
pub fn parse_keys(bytes: &[u8]) -> Vec<Key> {
    let mut keys = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            ESC => {
                let consumed = escape_sequence(&bytes[i..], &mut keys);
                i += consumed;
                continue;
            }
            b'\r' | b'\n' => keys.push(Key::Enter),
            0x7f | 0x08 => keys.push(Key::Backspace),
            0x03 => keys.push(Key::CtrlC),
            b' ' => keys.push(Key::Space),
            byte if byte < 0x20 => {}
            byte => {
                let width = utf8_width(byte);
                let end = (i + width).min(bytes.len());
                if let Some(ch) = std::str::from_utf8(&bytes[i..end])
                    .ok()
                    .and_then(|s| s.chars().next())
                {
                    keys.push(Key::Char(ch));
                }
                i = end;
                continue;
            }
        }
        i += 1;
    }

    keys
}

/// Decode an escape sequence at the start of `bytes`; returns bytes consumed.
fn escape_sequence(bytes: &[u8], keys: &mut Vec<Key>) -> usize {
    match bytes.get(1) {
        None => {
            keys.push(Key::Esc);
            1
        }
        Some(b'[' | b'O') => {
            // Parameters and intermediates run until a final byte in 0x40..=0x7e.
            let mut end = 2;
            while end < bytes.len() && !(0x40..=0x7e).contains(&bytes[end]) {
                end += 1;
            }
            if end >= bytes.len() {
                return bytes.len();
            }
            let key = match bytes[end] {
                b'A' => Some(Key::Up),
                b'B' => Some(Key::Down),
                b'C' => Some(Key::Right),
                b'D' => Some(Key::Left),
                _ => None,
            };
            keys.extend(key);
            end + 1
        }
        Some(_) => {
            // Alt+key or a doubled escape: emit escape, then decode the rest.
            keys.push(Key::Esc);
            1
        }
    }
}

fn utf8_width(first: u8) -> usize {
    match first {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => 1,
    }
}
