//! Markdown text transforms behind the editor toolbar and shortcuts.
//!
//! Positions are UTF-16 code unit offsets, matching
//! `HTMLTextAreaElement.selectionStart` / `selectionEnd`.

const INDENT_UNIT: &str = "  ";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Selection {
    pub start: u32,
    pub end: u32,
}

impl Selection {
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }
}

/// New document text plus the selection to restore.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TextEdit {
    pub text: String,
    pub selection: Selection,
}

fn utf16_len(s: &str) -> u32 {
    u32::try_from(s.encode_utf16().count()).unwrap_or(u32::MAX)
}

/// Byte index for a UTF-16 offset, clamped to the text and to char boundaries.
fn byte_index(text: &str, offset: u32) -> usize {
    let mut units = 0u32;
    for (i, c) in text.char_indices() {
        if units >= offset {
            return i;
        }
        units += u32::try_from(c.len_utf16()).unwrap_or(2);
    }
    text.len()
}

fn line_start(text: &str, byte: usize) -> usize {
    text[..byte].rfind('\n').map_or(0, |i| i + 1)
}

fn line_starts_in(text: &str, from: usize, to: usize) -> Vec<usize> {
    let mut starts = vec![line_start(text, from)];
    starts.extend(
        text[from..to]
            .match_indices('\n')
            .map(|(i, _)| from + i + 1)
            .filter(|i| *i < to),
    );
    starts
}

/// Surround the selection with `marker` (e.g. `**` for bold).
pub(crate) fn wrap_selection(text: &str, sel: Selection, marker: &str) -> TextEdit {
    let from = byte_index(text, sel.start);
    let to = byte_index(text, sel.end).max(from);
    let wrapped = format!("{marker}{}{marker}", &text[from..to]);
    replace_range(text, from, to, &wrapped)
}

/// Replace the selection, selecting the inserted text.
pub(crate) fn replace_selection(text: &str, sel: Selection, replacement: &str) -> TextEdit {
    let from = byte_index(text, sel.start);
    let to = byte_index(text, sel.end).max(from);
    replace_range(text, from, to, replacement)
}

fn replace_range(text: &str, from: usize, to: usize, insert: &str) -> TextEdit {
    let start = utf16_len(&text[..from]);
    TextEdit {
        text: format!("{}{insert}{}", &text[..from], &text[to..]),
        selection: Selection::new(start, start + utf16_len(insert)),
    }
}

/// Insert `prefix` at the start of the line holding the cursor.
pub(crate) fn prefix_line(text: &str, sel: Selection, prefix: &str) -> TextEdit {
    let at = line_start(text, byte_index(text, sel.start));
    let start = utf16_len(&text[..at]);
    TextEdit {
        text: format!("{}{prefix}{}", &text[..at], &text[at..]),
        selection: Selection::new(start, start + utf16_len(prefix)),
    }
}

pub(crate) fn heading_prefix(level: u8) -> String {
    format!("{} ", "#".repeat(usize::from(level.clamp(1, 6))))
}

/// Indent every line touched by the selection.
pub(crate) fn indent(text: &str, sel: Selection) -> TextEdit {
    let from = byte_index(text, sel.start);
    let to = byte_index(text, sel.end).max(from);
    let starts = line_starts_in(text, from, to);

    let mut out = String::with_capacity(text.len() + starts.len() * INDENT_UNIT.len());
    let mut last = 0;
    for s in &starts {
        out.push_str(&text[last..*s]);
        out.push_str(INDENT_UNIT);
        last = *s;
    }
    out.push_str(&text[last..]);

    let unit = utf16_len(INDENT_UNIT);
    let added = unit * u32::try_from(starts.len()).unwrap_or(u32::MAX / unit);
    TextEdit {
        text: out,
        selection: Selection::new(sel.start + unit, sel.end + added),
    }
}

/// Remove up to one indent unit (or a tab) from every line touched by the selection.
pub(crate) fn deindent(text: &str, sel: Selection) -> TextEdit {
    let from = byte_index(text, sel.start);
    let to = byte_index(text, sel.end).max(from);
    let starts = line_starts_in(text, from, to);

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut removed_first = 0u32;
    let mut removed_total = 0u32;
    for (n, s) in starts.iter().enumerate() {
        out.push_str(&text[last..*s]);
        let strip = removable_indent(&text[*s..]);
        let strip_units = u32::try_from(strip).unwrap_or(0);
        if n == 0 {
            removed_first = strip_units;
        }
        removed_total += strip_units;
        last = *s + strip;
    }
    out.push_str(&text[last..]);

    TextEdit {
        text: out,
        selection: Selection::new(
            sel.start.saturating_sub(removed_first),
            sel.end.saturating_sub(removed_total),
        ),
    }
}

fn removable_indent(line: &str) -> usize {
    if line.starts_with('\t') {
        return 1;
    }
    line.bytes()
        .take(INDENT_UNIT.len())
        .take_while(|b| *b == b' ')
        .count()
}

pub(crate) fn link_markdown(title: &str, url: &str) -> String {
    format!("[{title}]({url})")
}

pub(crate) fn image_markdown(alt: &str, src: &str) -> String {
    format!("![{alt}]({src})")
}

fn table_row(columns: usize, inner: &str) -> String {
    let mut row = format!("|{inner}").repeat(columns);
    row.push_str("|\n");
    row
}

/// Empty GFM table: header row, alignment row, then `rows` body rows.
pub(crate) fn table_markdown(rows: usize, columns: usize) -> String {
    let mut content = table_row(columns, "   ");
    content.push_str(&table_row(columns, ":--"));
    for _ in 0..rows {
        content.push_str(&table_row(columns, "   "));
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wrap_selects_the_wrapped_text() {
        let edit = wrap_selection("make this bold", Selection::new(5, 9), "**");
        assert_eq!(edit.text, "make **this** bold");
        assert_eq!(edit.selection, Selection::new(5, 13));
    }

    #[test]
    fn wrap_empty_selection_inserts_markers() {
        let edit = wrap_selection("ab", Selection::new(1, 1), "*");
        assert_eq!(edit.text, "a**b");
    }

    #[test]
    fn offsets_are_utf16_units() {
        // the emoji is two UTF-16 units
        let text = "😀 hi";
        let edit = wrap_selection(text, Selection::new(3, 5), "*");
        assert_eq!(edit.text, "😀 *hi*");
    }

    #[test]
    fn prefix_goes_to_start_of_cursor_line() {
        let text = "first\nsecond line";
        let edit = prefix_line(text, Selection::new(10, 10), &heading_prefix(2));
        assert_eq!(edit.text, "first\n## second line");
        assert_eq!(edit.selection, Selection::new(6, 9));

        let quote = prefix_line("quote me", Selection::new(3, 3), "> ");
        assert_eq!(quote.text, "> quote me");
    }

    #[test]
    fn heading_level_is_clamped() {
        assert_eq!(heading_prefix(0), "# ");
        assert_eq!(heading_prefix(6), "###### ");
        assert_eq!(heading_prefix(9), "###### ");
    }

    #[test]
    fn indent_and_deindent_touch_selected_lines() {
        let text = "- a\n- b\n- c";
        let indented = indent(text, Selection::new(0, 5));
        assert_eq!(indented.text, "  - a\n  - b\n- c");
        assert_eq!(indented.selection, Selection::new(2, 9));

        let back = deindent(&indented.text, indented.selection);
        assert_eq!(back.text, text);
        assert_eq!(back.selection, Selection::new(0, 5));
    }

    #[test]
    fn deindent_without_indent_is_noop() {
        let edit = deindent("plain", Selection::new(2, 2));
        assert_eq!(edit.text, "plain");
        assert_eq!(edit.selection, Selection::new(2, 2));
    }

    #[test]
    fn replace_selection_selects_insert() {
        let edit = replace_selection("see here", Selection::new(4, 8), "[here](/x)");
        assert_eq!(edit.text, "see [here](/x)");
        assert_eq!(edit.selection, Selection::new(4, 14));
    }

    #[test]
    fn builders() {
        assert_eq!(link_markdown("Note Mark", "https://example.com"), "[Note Mark](https://example.com)");
        assert_eq!(image_markdown("cat", "/cat.png"), "![cat](/cat.png)");
        assert_eq!(
            table_markdown(1, 2),
            "|   |   |\n|:--|:--|\n|   |   |\n"
        );
    }
}
