//! Text input cleanup shared by the composer, the room dialog and the login
//! prompt.

/// Sanitize pasted or typed text for single-line fields.
///
/// Tabs become four spaces, carriage returns become newlines and every other
/// control character is dropped. Newlines are kept so callers can decide
/// whether a paste submits the field.
pub fn sanitize_text_input(text: &str) -> String {
    let mut sanitized = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '\t' => sanitized.push_str("    "),
            '\r' => sanitized.push('\n'),
            '\n' => sanitized.push(c),
            _ if !c.is_control() => sanitized.push(c),
            _ => {}
        }
    }

    sanitized
}

/// True when the text contains something other than whitespace.
///
/// The composer and the room dialog both refuse to submit blank input.
pub fn has_visible_text(text: &str) -> bool {
    !text.trim().is_empty()
}
