//! Minimal RTF reading and writing for notes
//!
//! Notes are stored as RTF so they stay compatible with rich-text editors.
//! Writing produces a plain document (one font, no formatting). Reading
//! extracts the visible text of any reasonably well-formed RTF file and
//! drops formatting, tables of fonts/colors/styles and embedded objects.
//!
//! `\'hh` byte escapes are decoded as Windows-1252 when the document
//! declares `\ansicpg1252` (or no code page). Bytes in any other code page,
//! such as GBK (`\ansicpg936`), become U+FFFD; editors that write those code
//! pages also write `\uN` escapes, which are decoded exactly.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RtfError {
    #[error("not an RTF document")]
    NotRtf,

    #[error("unbalanced braces in RTF document")]
    UnbalancedBraces,
}

/// Header of every document we write
const HEADER: &str = "{\\rtf1\\ansi\\ansicpg1252\\deff0{\\fonttbl{\\f0\\fnil Segoe UI;}}\n\\f0\\fs28 ";

/// Destination groups whose content is not part of the visible text
const SKIPPED_DESTINATIONS: &[&str] = &[
    "fonttbl",
    "colortbl",
    "stylesheet",
    "info",
    "pict",
    "object",
    "header",
    "footer",
    "headerl",
    "headerr",
    "footerl",
    "footerr",
    "listtable",
    "listoverridetable",
    "rsidtbl",
    "generator",
    "xmlnstbl",
    "themedata",
    "colorschememapping",
    "datastore",
    "latentstyles",
    "filetbl",
    "revtbl",
    "fldinst",
];

/// `\ansicpg` values whose `\'hh` bytes we can decode
const WINDOWS_1252: i32 = 1252;
const LATIN_1: i32 = 28591;

/// Control words that turn on character or paragraph formatting
const FORMATTING_WORDS: &[&str] = &[
    "b", "i", "ul", "uld", "uldb", "ulw", "strike", "striked", "scaps", "caps", "super", "sub",
    "highlight", "cb", "pict", "object", "trowd", "qc", "qr", "qj", "li", "ri", "fi",
];

/// Windows-1252 code points for bytes 0x80..=0x9F; other bytes map to Latin-1
const CP1252_HIGH: [char; 32] = [
    '€', '\u{81}', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', '\u{8d}', 'Ž',
    '\u{8f}', '\u{90}', '‘', '’', '“', '”', '•', '–', '—', '˜', '™', 'š', '›', 'œ', '\u{9d}',
    'ž', 'Ÿ',
];

/// Encode plain text as an RTF document
pub fn encode(text: &str) -> String {
    let mut out = String::with_capacity(HEADER.len() + text.len() + 16);
    out.push_str(HEADER);

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '\r' => {
                if chars.peek() != Some(&'\n') {
                    out.push_str("\\par\n");
                }
            }
            '\n' => out.push_str("\\par\n"),
            '\t' => out.push_str("\\tab "),
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{}?", *unit as i16));
                }
            }
        }
    }

    out.push('}');
    out
}

#[derive(Debug, Clone, Copy)]
struct GroupState {
    skip: bool,
    /// Fallback characters following each \uN
    uc: usize,
}

/// Extract the plain text of an RTF document
pub fn decode(rtf: &str) -> Result<String, RtfError> {
    if !rtf.trim_start().starts_with("{\\rtf") {
        return Err(RtfError::NotRtf);
    }

    let mut out = String::new();
    let mut stack: Vec<GroupState> = Vec::new();
    let mut state = GroupState { skip: false, uc: 1 };
    let mut group_start = false;
    let mut fallback = 0usize;
    let mut high_surrogate: Option<u16> = None;
    let mut code_page = WINDOWS_1252;

    let mut chars = rtf.trim_start().chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' => {
                stack.push(state);
                group_start = true;
                fallback = 0;
                continue;
            }
            '}' => {
                state = stack.pop().ok_or(RtfError::UnbalancedBraces)?;
                fallback = 0;
                if stack.is_empty() {
                    // end of the document group
                    break;
                }
            }
            '\\' => {
                let Some(next) = chars.next() else {
                    break;
                };

                if next.is_ascii_alphabetic() {
                    let mut word = String::from(next);
                    while let Some(&c) = chars.peek() {
                        if c.is_ascii_alphabetic() {
                            word.push(c);
                            chars.next();
                        } else {
                            break;
                        }
                    }

                    let mut digits = String::new();
                    if chars.peek() == Some(&'-') {
                        digits.push('-');
                        chars.next();
                    }
                    while let Some(&c) = chars.peek() {
                        if c.is_ascii_digit() {
                            digits.push(c);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    let param: Option<i32> = digits.parse().ok();

                    if chars.peek() == Some(&' ') {
                        chars.next();
                    }

                    if group_start && SKIPPED_DESTINATIONS.contains(&word.as_str()) {
                        state.skip = true;
                    }
                    group_start = false;

                    if state.skip {
                        continue;
                    }

                    match word.as_str() {
                        "par" | "line" | "row" => out.push('\n'),
                        "tab" | "cell" => out.push('\t'),
                        "uc" => state.uc = param.unwrap_or(1).max(0) as usize,
                        "ansicpg" => code_page = param.unwrap_or(WINDOWS_1252),
                        "u" => {
                            if let Some(value) = param {
                                push_unit(&mut out, &mut high_surrogate, value);
                                fallback = state.uc;
                            }
                        }
                        "emdash" => out.push('—'),
                        "endash" => out.push('–'),
                        "bullet" => out.push('•'),
                        "lquote" => out.push('‘'),
                        "rquote" => out.push('’'),
                        "ldblquote" => out.push('“'),
                        "rdblquote" => out.push('”'),
                        "emspace" | "enspace" | "qmspace" => out.push(' '),
                        _ => {}
                    }
                    continue;
                }

                group_start = false;
                match next {
                    '*' => state.skip = true,
                    '\'' => {
                        let hex: String = chars.by_ref().take(2).collect();
                        if fallback > 0 {
                            fallback -= 1;
                        } else if !state.skip {
                            if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                                out.push(decode_byte(byte, code_page));
                            }
                        }
                    }
                    '\\' | '{' | '}' => push_text(&mut out, &mut fallback, state.skip, next),
                    '~' => push_text(&mut out, &mut fallback, state.skip, '\u{a0}'),
                    '_' => push_text(&mut out, &mut fallback, state.skip, '-'),
                    '\n' | '\r' => {
                        if !state.skip {
                            out.push('\n');
                        }
                    }
                    _ => {}
                }
                continue;
            }
            '\r' | '\n' => continue,
            c => push_text(&mut out, &mut fallback, state.skip, c),
        }
        group_start = false;
    }

    if !stack.is_empty() {
        return Err(RtfError::UnbalancedBraces);
    }
    Ok(out)
}

fn push_text(out: &mut String, fallback: &mut usize, skip: bool, c: char) {
    if *fallback > 0 {
        *fallback -= 1;
    } else if !skip {
        out.push(c);
    }
}

/// Append one UTF-16 code unit given as RTF's signed 16-bit \u parameter
fn push_unit(out: &mut String, high_surrogate: &mut Option<u16>, value: i32) {
    let unit = if value < 0 {
        (value + 0x10000) as u16
    } else {
        value as u16
    };

    match (high_surrogate.take(), unit) {
        (None, 0xD800..=0xDBFF) => *high_surrogate = Some(unit),
        (Some(high), 0xDC00..=0xDFFF) => {
            let code = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(unit) - 0xDC00);
            out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
        }
        (_, unit) => out.push(char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER)),
    }
}

fn decode_byte(byte: u8, code_page: i32) -> char {
    match (byte, code_page) {
        (0x00..=0x7F, _) => char::from(byte),
        (0x80..=0x9F, WINDOWS_1252) => CP1252_HIGH[usize::from(byte - 0x80)],
        (_, WINDOWS_1252 | LATIN_1) => char::from(byte),
        _ => char::REPLACEMENT_CHARACTER,
    }
}

/// Whether a document uses formatting that a plain-text rewrite would drop:
/// bold, italics, underline and similar, colours other than the default,
/// more than one font size, pictures, objects or tables
pub fn has_formatting(rtf: &str) -> bool {
    let mut sizes: Vec<i32> = Vec::new();
    let mut chars = rtf.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            continue;
        }
        match chars.peek() {
            Some(next) if next.is_ascii_alphabetic() => {}
            _ => {
                // escaped symbol such as \\ or \{
                chars.next();
                continue;
            }
        }

        let mut word = String::new();
        while let Some(&c) = chars.peek() {
            if !c.is_ascii_alphabetic() {
                break;
            }
            word.push(c);
            chars.next();
        }
        let mut digits = String::new();
        if chars.peek() == Some(&'-') {
            digits.push('-');
            chars.next();
        }
        while let Some(&c) = chars.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            digits.push(c);
            chars.next();
        }
        let param: Option<i32> = digits.parse().ok();

        match word.as_str() {
            "fs" => {
                let size = param.unwrap_or(24);
                if !sizes.contains(&size) {
                    sizes.push(size);
                }
                if sizes.len() > 1 {
                    return true;
                }
            }
            "cf" if param.unwrap_or(0) != 0 => return true,
            "cf" => {}
            w if FORMATTING_WORDS.contains(&w) && param != Some(0) => return true,
            _ => {}
        }
    }
    false
}
