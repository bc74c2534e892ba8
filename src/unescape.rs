use std::collections::VecDeque;

/// Unescape string.
///
/// Only `\,`, `\;`, `\n`, `\N` and `\\` are recognised. Anything else after a
/// backslash, including a trailing backslash, is left as it was.
pub fn unescape(s: &str) -> String {
    let mut queue: VecDeque<_> = s.chars().collect();
    let mut s = String::with_capacity(queue.len());

    while let Some(c) = queue.pop_front() {
        if c != '\\' {
            s.push(c);
            continue;
        }

        match queue.pop_front() {
            Some('n') | Some('N') => s.push('\n'),
            Some('\\') => s.push('\\'),
            Some(';') => s.push(';'),
            Some(',') => s.push(','),
            Some(c) => {
                s.push('\\');
                s.push(c);
            }
            None => s.push('\\'),
        };
    }

    s
}

/// Escape string, the inverse of [`unescape`].
///
/// A CRLF pair is written as a single `\n`.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' if chars.peek() == Some(&'\n') => {}
            c => out.push(c),
        }
    }

    out
}
