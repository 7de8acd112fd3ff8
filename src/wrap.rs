/// Width the sample passages are wrapped to when nothing else is configured.
pub const DEFAULT_MAX_CHARS: usize = 60;

/// Greedily wraps `text` into display lines of at most `max_chars` characters.
///
/// Words are the tokens between single spaces, so runs of spaces produce empty
/// words that keep their separators. A line only breaks between words: the first
/// word of a line is always placed, even when it is longer than `max_chars` on
/// its own. An empty word that would start a line leaves it empty, so the next
/// word takes its place and a run of spaces falling on a break vanishes:
/// `wrap("a   b", 1)` is `["a", "b"]`. The last line is always emitted, which
/// makes `wrap("", n)` a single empty line.
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split(' ') {
        let word_len = word.chars().count();

        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    lines.push(current);
    lines
}
