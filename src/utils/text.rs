//! Source text normalization
//!
//! Raw story source is sliced verbatim from the document and then normalized
//! for its consumer: docs panels want the block dedented, index entries want a
//! single line.

/// Remove the indentation shared by every non-blank line, then trim
///
/// Internal newlines and relative indentation are preserved.
pub fn dedent(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();

    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches(|c: char| c == ' ' || c == '\t').len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                ""
            } else {
                &line[indent..]
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Drop every line break and trim the ends
pub fn collapse_newlines(text: &str) -> String {
    text.replace(|c: char| c == '\n' || c == '\r', "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedent_strips_common_indentation() {
        let text = "\n    <Button>\n      Click\n    </Button>\n  ";
        assert_eq!(dedent(text), "<Button>\n  Click\n</Button>");
    }

    #[test]
    fn test_dedent_keeps_blank_lines_inside() {
        let text = "  <A />\n\n  <B />";
        assert_eq!(dedent(text), "<A />\n\n<B />");
    }

    #[test]
    fn test_dedent_comment_data() {
        assert_eq!(dedent(" A primary button "), "A primary button");
        assert_eq!(
            dedent("\n  Describes the story.\n  Second line.\n"),
            "Describes the story.\nSecond line."
        );
    }

    #[test]
    fn test_dedent_first_line_unindented() {
        // The first line starts right at the slice boundary, so nothing is shared
        assert_eq!(dedent("<A />\n    <B />"), "<A />\n    <B />");
    }

    #[test]
    fn test_collapse_newlines() {
        assert_eq!(
            collapse_newlines("\n  <Button>\r\n    Click\n  </Button>\n"),
            "<Button>    Click  </Button>"
        );
    }
}
