// US keyboard layout
//
// Maps key names ("Enter", "a", "ArrowLeft") to the fields of
// `Input.dispatchKeyEvent`.

/// Key location: standard keys 0, left-hand modifiers 1, keypad 3.
pub(crate) const LOCATION_LEFT: u32 = 1;

struct NamedKey {
    key: &'static str,
    code: &'static str,
    key_code: i64,
    text: Option<&'static str>,
    location: u32,
}

const fn named(key: &'static str, code: &'static str, key_code: i64) -> NamedKey {
    NamedKey {
        key,
        code,
        key_code,
        text: None,
        location: 0,
    }
}

const NAMED_KEYS: &[NamedKey] = &[
    NamedKey {
        text: Some("\r"),
        ..named("Enter", "Enter", 13)
    },
    NamedKey {
        text: Some("\t"),
        ..named("Tab", "Tab", 9)
    },
    NamedKey {
        text: Some(" "),
        ..named(" ", "Space", 32)
    },
    named("Backspace", "Backspace", 8),
    named("Delete", "Delete", 46),
    named("Escape", "Escape", 27),
    named("Insert", "Insert", 45),
    named("Home", "Home", 36),
    named("End", "End", 35),
    named("PageUp", "PageUp", 33),
    named("PageDown", "PageDown", 34),
    named("ArrowLeft", "ArrowLeft", 37),
    named("ArrowUp", "ArrowUp", 38),
    named("ArrowRight", "ArrowRight", 39),
    named("ArrowDown", "ArrowDown", 40),
    named("CapsLock", "CapsLock", 20),
    NamedKey {
        location: LOCATION_LEFT,
        ..named("Shift", "ShiftLeft", 16)
    },
    NamedKey {
        location: LOCATION_LEFT,
        ..named("Control", "ControlLeft", 17)
    },
    NamedKey {
        location: LOCATION_LEFT,
        ..named("Alt", "AltLeft", 18)
    },
    NamedKey {
        location: LOCATION_LEFT,
        ..named("Meta", "MetaLeft", 91)
    },
    named("F1", "F1", 112),
    named("F2", "F2", 113),
    named("F3", "F3", 114),
    named("F4", "F4", 115),
    named("F5", "F5", 116),
    named("F6", "F6", 117),
    named("F7", "F7", 118),
    named("F8", "F8", 119),
    named("F9", "F9", 120),
    named("F10", "F10", 121),
    named("F11", "F11", 122),
    named("F12", "F12", 123),
];

// (unshifted, shifted, code, keyCode)
const PUNCTUATION: &[(char, char, &str, i64)] = &[
    (';', ':', "Semicolon", 186),
    ('=', '+', "Equal", 187),
    (',', '<', "Comma", 188),
    ('-', '_', "Minus", 189),
    ('.', '>', "Period", 190),
    ('/', '?', "Slash", 191),
    ('`', '~', "Backquote", 192),
    ('[', '{', "BracketLeft", 219),
    ('\\', '|', "Backslash", 220),
    (']', '}', "BracketRight", 221),
    ('\'', '"', "Quote", 222),
];

const SHIFTED_DIGITS: [char; 10] = [')', '!', '@', '#', '$', '%', '^', '&', '*', '('];

/// Everything `Input.dispatchKeyEvent` needs for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KeyDescription {
    pub key: String,
    pub code: String,
    pub key_code: i64,
    pub text: Option<String>,
    pub location: u32,
}

/// Looks up a key name or a single printable character.
pub(crate) fn describe_key(key: &str) -> Option<KeyDescription> {
    if let Some(named) = NAMED_KEYS.iter().find(|k| k.key == key) {
        return Some(KeyDescription {
            key: named.key.to_string(),
            code: named.code.to_string(),
            key_code: named.key_code,
            text: named.text.map(str::to_string),
            location: named.location,
        });
    }
    if key == "\r" || key == "\n" {
        return describe_key("Enter");
    }

    let mut chars = key.chars();
    let (Some(ch), None) = (chars.next(), chars.next()) else {
        return None;
    };

    let (code, key_code) = match ch {
        'a'..='z' | 'A'..='Z' => {
            let upper = ch.to_ascii_uppercase();
            (format!("Key{}", upper), upper as i64)
        }
        '0'..='9' => (format!("Digit{}", ch), ch as i64),
        _ => {
            if let Some(digit) = SHIFTED_DIGITS.iter().position(|&c| c == ch) {
                (format!("Digit{}", digit), '0' as i64 + digit as i64)
            } else {
                let (_, _, code, key_code) = PUNCTUATION
                    .iter()
                    .find(|(plain, shifted, _, _)| *plain == ch || *shifted == ch)?;
                (code.to_string(), *key_code)
            }
        }
    };

    Some(KeyDescription {
        key: ch.to_string(),
        code,
        key_code,
        text: Some(ch.to_string()),
        location: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_keys() {
        let enter = describe_key("Enter").unwrap();
        assert_eq!(enter.key_code, 13);
        assert_eq!(enter.text.as_deref(), Some("\r"));

        let delete = describe_key("Delete").unwrap();
        assert_eq!(delete.code, "Delete");
        assert_eq!(delete.text, None);

        let shift = describe_key("Shift").unwrap();
        assert_eq!(shift.location, LOCATION_LEFT);
    }

    #[test]
    fn test_letters_and_digits() {
        let a = describe_key("a").unwrap();
        assert_eq!((a.code.as_str(), a.key_code), ("KeyA", 65));
        assert_eq!(a.text.as_deref(), Some("a"));

        let upper = describe_key("Z").unwrap();
        assert_eq!((upper.code.as_str(), upper.key_code), ("KeyZ", 90));

        let seven = describe_key("7").unwrap();
        assert_eq!((seven.code.as_str(), seven.key_code), ("Digit7", 55));

        let bang = describe_key("!").unwrap();
        assert_eq!((bang.code.as_str(), bang.key_code), ("Digit1", 49));
    }

    #[test]
    fn test_punctuation_and_newline() {
        let quote = describe_key("\"").unwrap();
        assert_eq!(quote.code, "Quote");
        assert_eq!(describe_key("\n").unwrap().key, "Enter");
    }

    #[test]
    fn test_unknown_keys() {
        assert_eq!(describe_key("NotAKey"), None);
        assert_eq!(describe_key("é"), None);
        assert_eq!(describe_key(""), None);
    }
}
