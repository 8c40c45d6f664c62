use crate::types::Event;

pub const DEFAULT_TITLE: &str = "Crash detected in pod";

/// Markdown summary of an event: pod identity lines, then fenced events and logs.
pub fn event_markdown(ev: &Event) -> String {
    event_markdown_with_breaks(ev, "\n")
}

/// Same layout, with `line_break` between the identity lines and before each
/// section heading. Text inside the fences is left exactly as captured.
pub fn event_markdown_with_breaks(ev: &Event, line_break: &str) -> String {
    format!(
        "**Pod:** {name}{br}\
         **Container:** {container}{br}\
         **Namespace:** {namespace}{br}\
         **Reason:** {reason}{br}\
         **Events:**\n```\n{events}\n```{br}\
         **Logs:**\n```\n{logs}\n```",
        br = line_break,
        name = ev.name,
        container = ev.container,
        namespace = ev.namespace,
        reason = ev.reason,
        events = ev.events_or_default(),
        logs = ev.logs_or_default(),
    )
}

/// At most `max_chars` characters of `s`, cut on a char boundary.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Configured title, or the stock crash headline.
pub fn title_or_default(title: &str) -> &str {
    if title.is_empty() {
        DEFAULT_TITLE
    } else {
        title
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Splits `s` into pieces of at most `max_chars` characters, never inside a
/// UTF-8 sequence. Prefers to cut right after a newline when one is in range.
pub fn chunk_text(s: &str, max_chars: usize) -> Vec<&str> {
    if max_chars == 0 || s.is_empty() {
        return vec![s];
    }
    let mut chunks = Vec::new();
    let mut rest = s;
    while !rest.is_empty() {
        let limit = match rest.char_indices().nth(max_chars) {
            Some((idx, _)) => idx,
            None => {
                chunks.push(rest);
                break;
            }
        };
        let cut = match rest[..limit].rfind('\n') {
            Some(nl) if nl > 0 => nl + 1,
            _ => limit,
        };
        chunks.push(&rest[..cut]);
        rest = &rest[cut..];
    }
    chunks
}
