// Comment association for story descriptions

use crate::ast::Comment;
use crate::utils::dedent;

/// Most recent comment seen during a walk
#[derive(Debug, Default)]
pub struct CommentCursor<'a> {
    latest: Option<&'a Comment>,
}

impl<'a> CommentCursor<'a> {
    pub fn track(&mut self, comment: &'a Comment) {
        self.latest = Some(comment);
    }

    /// Description for a marker starting at `marker_start`
    ///
    /// Only a comment ending exactly one character before the marker (a single
    /// line break or space apart) is attached. The cursor is cleared either way.
    pub fn take_adjacent(&mut self, marker_start: usize) -> Option<String> {
        let comment = self.latest.take()?;
        (comment.end + 1 == marker_start).then(|| dedent(&comment.data))
    }

    pub fn clear(&mut self) {
        self.latest = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(start: usize, end: usize, data: &str) -> Comment {
        Comment {
            start,
            end,
            data: data.to_string(),
        }
    }

    #[test]
    fn test_touching_comment_is_attached() {
        let c = comment(0, 20, "\n    Primary button\n    story\n");
        let mut cursor = CommentCursor::default();
        cursor.track(&c);
        assert_eq!(
            cursor.take_adjacent(21).as_deref(),
            Some("Primary button\nstory")
        );
        assert_eq!(cursor.take_adjacent(21), None);
    }

    #[test]
    fn test_blank_line_breaks_association() {
        let c = comment(0, 20, " Primary ");
        let mut cursor = CommentCursor::default();
        cursor.track(&c);
        // "-->\n\n<Story" puts the marker two characters after the comment
        assert_eq!(cursor.take_adjacent(22), None);
        // Cleared even though nothing was attached
        assert_eq!(cursor.take_adjacent(21), None);
    }

    #[test]
    fn test_latest_comment_wins() {
        let first = comment(0, 10, "first");
        let second = comment(11, 30, "second");
        let mut cursor = CommentCursor::default();
        cursor.track(&first);
        cursor.track(&second);
        assert_eq!(cursor.take_adjacent(31).as_deref(), Some("second"));
    }
}
