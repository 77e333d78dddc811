//! Indentation cleanup for block strings and block comments.

/// Trim trailing whitespace after the last newline, then remove the
/// indentation common to every non-blank line.
pub(crate) fn dedent(s: &str) -> String {
    trim_common_indent(&trim_space_after_last_newline(s))
}

/// Trim whitespace at the end of the last line, dropping the line entirely
/// if nothing else is left on it.
pub(crate) fn trim_space_after_last_newline(s: &str) -> String {
    let Some(newline) = s.rfind('\n') else {
        return s.trim_end().to_string();
    };

    let last_line = s[newline + 1..].trim_end();
    if last_line.is_empty() {
        s[..newline].to_string()
    } else {
        format!("{}{last_line}", &s[..=newline])
    }
}

/// Remove the smallest leading indentation shared by all non-blank lines.
///
/// Tabs count as two columns. If any non-empty line is not indented the
/// input is returned unchanged. Whitespace-only lines do not take part in
/// choosing the indentation.
pub(crate) fn trim_common_indent(s: &str) -> String {
    let mut common: Option<usize> = None;
    for line in s.split('\n') {
        if line.is_empty() {
            continue;
        }
        let (indent, rest) = split_leading_indent(line, None);
        if indent == 0 {
            return s.to_string();
        }
        if rest.is_empty() {
            continue;
        }
        if common.is_none_or(|common| indent < common) {
            common = Some(indent);
        }
    }

    match common {
        Some(width) => trim_indent(s, width),
        None => s.to_string(),
    }
}

fn trim_indent(s: &str, width: usize) -> String {
    s.split('\n')
        .map(|line| split_leading_indent(line, Some(width)).1)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split a line into the width of its leading whitespace and the rest.
///
/// With `max` set, stops once at least `max` columns were taken.
fn split_leading_indent(line: &str, max: Option<usize>) -> (usize, &str) {
    let mut width = 0;
    let mut end = 0;
    for (i, c) in line.char_indices() {
        if max.is_some_and(|max| width >= max) || !c.is_whitespace() {
            break;
        }
        width += if c == '\t' { 2 } else { c.len_utf8() };
        end = i + c.len_utf8();
    }
    (width, &line[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_space_after_last_newline() {
        assert_eq!(trim_space_after_last_newline("abc  "), "abc");
        assert_eq!(trim_space_after_last_newline("a\nb  "), "a\nb");
        assert_eq!(trim_space_after_last_newline("a\n   "), "a");
        assert_eq!(trim_space_after_last_newline("a  \n"), "a  ");
    }

    #[test]
    fn test_trim_common_indent() {
        assert_eq!(trim_common_indent("  a\n    b"), "a\n  b");
        assert_eq!(trim_common_indent("  a\n\n  b"), "a\n\nb");
        assert_eq!(trim_common_indent("a\n  b"), "a\n  b");
    }

    #[test]
    fn test_trim_common_indent_tabs_count_two() {
        assert_eq!(trim_common_indent("\ta\n    b"), "a\n  b");
    }

    #[test]
    fn test_trim_common_indent_ignores_blank_lines() {
        assert_eq!(trim_common_indent("    a\n  \n    b"), "a\n\nb");
    }

    #[test]
    fn test_dedent_block() {
        assert_eq!(dedent("  x: 1\n    y: 2\n  "), "x: 1\n  y: 2");
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn block_text_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec("[ \t]{0,4}[a-z ]{0,6}", 0..6).prop_map(|lines| lines.join("\n"))
    }

    fn check_dedent_idempotent(text: &str) -> Result<(), TestCaseError> {
        let once = trim_common_indent(text);
        let twice = trim_common_indent(&once);
        prop_assert_eq!(once, twice);
        Ok(())
    }

    fn check_dedent_keeps_content(text: &str) -> Result<(), TestCaseError> {
        let squash = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
        prop_assert_eq!(squash(&dedent(text)), squash(text));
        Ok(())
    }

    proptest! {
        #[test]
        fn dedent_idempotent(text in block_text_strategy()) {
            check_dedent_idempotent(&text)?;
        }

        #[test]
        fn dedent_keeps_content(text in block_text_strategy()) {
            check_dedent_keeps_content(&text)?;
        }
    }
}
