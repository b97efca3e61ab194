//! Greedy word-wrap.

use crate::metric::FontMetric;

/// Break `text` into lines no wider than `max_width` pixels.
///
/// Words are whitespace-separated and joined back with a single space. Words
/// are appended to the current line while the measured width of the line
/// including the next word stays within `max_width`. A word that is wider
/// than `max_width` on its own is emitted alone on its line; words are never
/// split. Text with no words yields no lines.
pub fn wrap<M: FontMetric + ?Sized>(text: &str, max_width: u32, metric: &M) -> Vec<String> {
    let mut words = text.split_whitespace().peekable();
    let mut lines = Vec::new();

    while words.peek().is_some() {
        let mut line = String::new();

        while let Some(&word) = words.peek() {
            if line.is_empty() {
                line.push_str(word);
                words.next();
                if metric.text_width(&line) > max_width {
                    // Oversized word; nothing else can join it.
                    break;
                }
                continue;
            }

            let candidate_len = line.len() + 1 + word.len();
            let mut candidate = String::with_capacity(candidate_len);
            candidate.push_str(&line);
            candidate.push(' ');
            candidate.push_str(word);

            if metric.text_width(&candidate) > max_width {
                break;
            }
            line = candidate;
            words.next();
        }

        lines.push(line);
    }

    lines
}
