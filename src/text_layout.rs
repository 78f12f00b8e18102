//! Greedy word wrap for text boxes.

pub const TEXT_PADDING: f32 = 8.0;
pub const LINE_HEIGHT: f32 = 20.0;
pub const FONT_SIZE: f32 = 16.0;

/// Breaks `text` into lines no wider than `box_width - 2 * TEXT_PADDING`,
/// measured with `measure`. A word that alone exceeds the width gets its own
/// line. Explicit newlines always start a new line.
pub fn wrap_text(text: &str, box_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let max_width = (box_width - 2.0 * TEXT_PADDING).max(0.0);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if measure(&candidate) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }
        lines.push(current);
    }

    // A final '\n' ends the last line rather than opening a new one.
    if text.ends_with('\n') && lines.len() > 1 {
        lines.pop();
    }
    lines
}

/// Top offset of each line from the box top; not clipped to the box height.
pub fn line_offsets(line_count: usize) -> impl Iterator<Item = f32> {
    (0..line_count).map(|i| TEXT_PADDING + i as f32 * LINE_HEIGHT)
}

#[cfg(test)]
mod tests {
    use super::{line_offsets, wrap_text, TEXT_PADDING};

    // Every character is 10 px wide.
    fn mono(text: &str) -> f32 {
        text.chars().count() as f32 * 10.0
    }

    #[test]
    fn wraps_greedily() {
        // 100 px box leaves 84 px: eight characters per line.
        let lines = wrap_text("one two three four", 100.0, mono);
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }

    #[test]
    fn exact_fit_stays_on_one_line() {
        let width = 70.0 + 2.0 * TEXT_PADDING;
        assert_eq!(wrap_text("abc def", width, mono), vec!["abc def"]);
    }

    #[test]
    fn long_word_gets_its_own_line() {
        let lines = wrap_text("a enormousword b", 60.0, mono);
        assert_eq!(lines, vec!["a", "enormousword", "b"]);
    }

    #[test]
    fn newlines_split_paragraphs() {
        let lines = wrap_text("first\nsecond\n", 200.0, mono);
        assert_eq!(lines, vec!["first", "second"]);
    }

    #[test]
    fn explicit_blank_line_survives_final_newline() {
        assert_eq!(wrap_text("a\n\n", 200.0, mono), vec!["a", ""]);
        assert_eq!(wrap_text("a\n\nb", 200.0, mono), vec!["a", "", "b"]);
    }

    #[test]
    fn empty_text_yields_single_empty_line() {
        assert_eq!(wrap_text("", 100.0, mono), vec![String::new()]);
    }

    #[test]
    fn lines_advance_by_fixed_height() {
        let offsets: Vec<f32> = line_offsets(3).collect();
        assert_eq!(offsets, vec![8.0, 28.0, 48.0]);
    }
}
