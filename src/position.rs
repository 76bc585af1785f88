use serde::{Deserialize, Serialize};

/// 1-indexed caret location inside SQL text. Column 1 sits before the first
/// character of the line; columns are counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "camelCase")]
#[display("{line_number}:{column}")]
pub struct CaretPosition {
    pub line_number: usize,
    pub column: usize,
}

impl CaretPosition {
    pub const fn new(line_number: usize, column: usize) -> Self {
        Self {
            line_number,
            column,
        }
    }

    /// Byte offset of the caret in `text`.
    ///
    /// Lines outside `1..=line_count` resolve to the end of the text; columns
    /// past the end of their line clamp to the end of that line.
    pub fn to_offset(&self, text: &str) -> usize {
        let Some((line_start, line)) = nth_line(text, self.line_number) else {
            return text.len();
        };
        line_start + char_column_to_byte(line, self.column)
    }

    /// Inverse of [`CaretPosition::to_offset`] for offsets inside `text`.
    pub fn from_offset(text: &str, offset: usize) -> Self {
        let offset = floor_char_boundary(text, offset.min(text.len()));
        let before = &text[..offset];
        let line_number = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = text[line_start..offset].chars().count() + 1;
        Self {
            line_number,
            column,
        }
    }
}

/// Start offset and content of the 1-indexed line `line_number`.
fn nth_line(text: &str, line_number: usize) -> Option<(usize, &str)> {
    if line_number == 0 {
        return None;
    }
    let mut start = 0;
    for (idx, line) in text.split('\n').enumerate() {
        if idx + 1 == line_number {
            return Some((start, line));
        }
        start += line.len() + 1;
    }
    None
}

fn char_column_to_byte(line: &str, column: usize) -> usize {
    let chars = column.max(1) - 1;
    line.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(line.len())
}

fn floor_char_boundary(text: &str, mut offset: usize) -> usize {
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

/// The identifier-or-dot run that ends at `offset`. Empty when the caret
/// follows whitespace or punctuation. Quoted identifiers count when a dot
/// follows them (`"u".na`).
pub fn current_word(text: &str, offset: usize) -> &str {
    let end = floor_char_boundary(text, offset.min(text.len()));
    let mut start = end;
    let mut chars = text[..end].char_indices().rev().peekable();
    loop {
        while let Some(&(i, c)) = chars.peek()
            && is_word_char(c)
        {
            start = i;
            chars.next();
        }
        if !text[start..end].starts_with('.') {
            break;
        }
        let Some(&(_, quote)) = chars.peek().filter(|(_, c)| *c == '"' || *c == '`') else {
            break;
        };
        let mut quoted = chars.clone().skip(1);
        match quoted.find(|(_, c)| *c == quote) {
            Some((open, _)) => {
                start = open;
                chars = text[..open].char_indices().rev().peekable();
            }
            None => break,
        }
    }
    &text[start..end]
}

/// The identifier-or-dot run that starts at `offset`.
pub fn word_after(text: &str, offset: usize) -> &str {
    let start = floor_char_boundary(text, offset.min(text.len()));
    let len = text[start..]
        .char_indices()
        .find(|(_, c)| !is_word_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(text.len() - start);
    &text[start..start + len]
}

/// Full line containing `offset`, without its newline.
pub fn current_line(text: &str, offset: usize) -> &str {
    let offset = floor_char_boundary(text, offset.min(text.len()));
    let start = text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = text[offset..]
        .find('\n')
        .map(|i| offset + i)
        .unwrap_or(text.len());
    &text[start..end]
}

/// Renders `text` with a `|` inserted at the caret. Out-of-range lines leave
/// the text unchanged.
pub fn visualize_cursor(text: &str, position: CaretPosition) -> String {
    if text.is_empty() {
        return String::new();
    }
    match nth_line(text, position.line_number) {
        Some((line_start, line)) => {
            let at = line_start + char_column_to_byte(line, position.column);
            format!("{}|{}", &text[..at], &text[at..])
        }
        None => text.to_string(),
    }
}

/// Renders `text` with 3-wide line numbers and the caret marked on its line.
pub fn format_with_line_numbers(text: &str, position: CaretPosition) -> String {
    if text.is_empty() {
        return String::new();
    }
    text.split('\n')
        .enumerate()
        .map(|(idx, line)| {
            let number = idx + 1;
            if number == position.line_number {
                let at = char_column_to_byte(line, position.column);
                format!("{number:>3} | {}|{}", &line[..at], &line[at..])
            } else {
                format!("{number:>3} | {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("SELECT * FROM users", 1, 1, 0)]
    #[case("SELECT * FROM users", 1, 8, 7)]
    #[case("SELECT * FROM users", 1, 100, 19)]
    #[case("SELECT *\nFROM users", 2, 5, 13)]
    #[case("SELECT *\nFROM users", 2, 0, 9)]
    #[case("SELECT *\nFROM users", 7, 3, 19)]
    #[case("SELECT *\nFROM users", 0, 3, 19)]
    #[case("", 1, 1, 0)]
    fn offsets_clamp(
        #[case] text: &str,
        #[case] line: usize,
        #[case] column: usize,
        #[case] expected: usize,
    ) {
        assert_eq!(CaretPosition::new(line, column).to_offset(text), expected);
    }

    #[test]
    fn offsets_count_characters_not_bytes() {
        let text = "SELECT 'é' FROM t";
        let offset = CaretPosition::new(1, 11).to_offset(text);
        assert_eq!(&text[offset..], " FROM t");
    }

    #[test]
    fn from_offset_round_trips_inside_text() {
        let text = "SELECT *\nFROM users\nWHERE id = 1";
        let position = CaretPosition::new(3, 4);
        let offset = position.to_offset(text);
        assert_eq!(CaretPosition::from_offset(text, offset), position);
    }

    #[rstest]
    #[case("SELECT u.na", 11, "u.na")]
    #[case("SELECT ", 7, "")]
    #[case("SELECT a,b", 10, "b")]
    #[case("SELECT db.tbl.co FROM x", 16, "db.tbl.co")]
    #[case("SELECT (abc", 11, "abc")]
    #[case("", 0, "")]
    #[case(r#"SELECT "u"."#, 11, r#""u"."#)]
    #[case(r#"SELECT "shop"."user s".na"#, 25, r#""shop"."user s".na"#)]
    #[case("SELECT `u`.id", 13, "`u`.id")]
    #[case(r#"SELECT "na"#, 10, "na")]
    fn current_word_scans_backward(#[case] text: &str, #[case] offset: usize, #[case] word: &str) {
        assert_eq!(current_word(text, offset), word);
    }

    #[test]
    fn word_after_scans_forward() {
        assert_eq!(word_after("SELECT na FROM t", 8), "a");
        assert_eq!(word_after("SELECT na FROM t", 9), "");
    }

    #[test]
    fn current_line_is_bounded_by_newlines() {
        let text = "SELECT *\nFROM users\nWHERE";
        assert_eq!(current_line(text, 12), "FROM users");
        assert_eq!(current_line(text, text.len()), "WHERE");
    }

    #[rstest]
    #[case("SELECT * FROM users", 1, 8, "SELECT |* FROM users")]
    #[case("SELECT *\nFROM users\nWHERE id = 1", 2, 5, "SELECT *\nFROM| users\nWHERE id = 1")]
    #[case("SELECT * FROM users", 10, 5, "SELECT * FROM users")]
    #[case("SELECT * FROM users", 1, 100, "SELECT * FROM users|")]
    #[case("", 1, 1, "")]
    fn visualize(
        #[case] text: &str,
        #[case] line: usize,
        #[case] column: usize,
        #[case] expected: &str,
    ) {
        assert_eq!(
            visualize_cursor(text, CaretPosition::new(line, column)),
            expected
        );
    }

    #[rstest]
    #[case(
        "SELECT * FROM users WHERE id = 1",
        1,
        8,
        "  1 | SELECT |* FROM users WHERE id = 1"
    )]
    #[case(
        "SELECT *\nFROM users\nWHERE id = 1",
        2,
        5,
        "  1 | SELECT *\n  2 | FROM| users\n  3 | WHERE id = 1"
    )]
    #[case("", 1, 1, "")]
    fn line_numbers(
        #[case] text: &str,
        #[case] line: usize,
        #[case] column: usize,
        #[case] expected: &str,
    ) {
        assert_eq!(
            format_with_line_numbers(text, CaretPosition::new(line, column)),
            expected
        );
    }
}
