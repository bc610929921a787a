/// Escape text for Telegram MarkdownV2 (outside of code/link targets).
pub fn escape_markdown_v2(s: &str) -> String {
    const SPECIAL: &[char] = &[
        '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
        '\\',
    ];
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape a URL placed inside a MarkdownV2 `(...)` link target.
pub fn escape_markdown_v2_url(s: &str) -> String {
    s.replace('\\', "\\\\").replace(')', "\\)")
}
