use crate::{Error, Result};

/// A region of text opened by `start` and closed by the next `end`.
#[derive(Debug, Clone, Copy)]
pub struct Block {
    pub start: &'static str,
    pub end: &'static str,
}

pub const PROPERTY_GROUP: Block = Block {
    start: "<PropertyGroup",
    end: "</PropertyGroup>",
};

/// Text inserted into a block when `marker` does not already appear in it.
#[derive(Debug, Clone, Copy)]
pub struct Insertion {
    pub marker: &'static str,
    pub text: &'static str,
}

const INDENT: &str = "  ";

/// Inserts every missing option right before the end marker of each block.
///
/// Options already present in a block are left alone, so running this twice
/// yields the same text as running it once. Any start marker without an end
/// marker fails the whole call and nothing is changed.
pub fn insert_missing(content: &str, block: &Block, insertions: &[Insertion]) -> Result<String> {
    let mut output = String::with_capacity(content.len());
    let mut copied = 0;
    let mut search = 0;

    while let Some(found) = content[search..].find(block.start) {
        let start = search + found;
        let after_start = start + block.start.len();

        // `<PropertyGroupFoo` is a different element
        match content[after_start..].chars().next() {
            Some(c) if c.is_whitespace() || c == '>' || c == '/' => {}
            _ => {
                search = after_start;
                continue;
            }
        }

        let Some(tag_close) = content[after_start..].find('>') else {
            return Err(Error::UnterminatedBlock {
                marker: block.start,
                offset: start,
            });
        };
        let tag_close = after_start + tag_close;
        if content[..tag_close].ends_with('/') {
            search = tag_close + 1;
            continue;
        }

        let Some(end) = content[tag_close..].find(block.end) else {
            return Err(Error::UnterminatedBlock {
                marker: block.start,
                offset: start,
            });
        };
        let end = tag_close + end;

        let span = &content[start..end];
        let missing = insertions
            .iter()
            .filter(|insertion| !span.contains(insertion.marker))
            .collect::<Vec<_>>();

        if !missing.is_empty() {
            output.push_str(&content[copied..end]);
            match own_line(content, end) {
                Some((indent, newline)) => {
                    for insertion in missing {
                        output.push_str(INDENT);
                        output.push_str(insertion.text);
                        output.push_str(newline);
                        output.push_str(indent);
                    }
                }
                None => missing
                    .iter()
                    .for_each(|insertion| output.push_str(insertion.text)),
            }
            copied = end;
        }

        search = end + block.end.len();
    }

    output.push_str(&content[copied..]);
    Ok(output)
}

/// Indentation and line ending of the line `at` sits on, if only whitespace
/// precedes it on that line.
fn own_line(content: &str, at: usize) -> Option<(&str, &'static str)> {
    let line_start = content[..at].rfind('\n')?;
    let indent = &content[line_start + 1..at];
    if !indent.chars().all(|c| c == ' ' || c == '\t') {
        return None;
    }

    let newline = if content[..line_start].ends_with('\r') {
        "\r\n"
    } else {
        "\n"
    };
    Some((indent, newline))
}

/// Line ending used by most lines of `content`, `\n` on a tie.
pub fn dominant_line_ending(content: &str) -> &'static str {
    let crlf = content.matches("\r\n").count();
    let lf = content.matches('\n').count() - crlf;
    if crlf > lf { "\r\n" } else { "\n" }
}

/// Drops every empty or whitespace-only line, rejoining the rest with the
/// dominant line ending.
pub fn scrub_blank_lines(content: &str) -> String {
    let newline = dominant_line_ending(content);

    let mut output = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join(newline);

    if content.ends_with('\n') && !output.is_empty() {
        output.push_str(newline);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    const LANG: Insertion = Insertion {
        marker: "<LangVersion>",
        text: "<LangVersion>default</LangVersion>",
    };

    #[test]
    fn no_blocks_is_a_no_op() {
        let content = "<Project>\n  <ItemGroup />\n</Project>\n";
        assert_eq!(insert_missing(content, &PROPERTY_GROUP, &[LANG]).unwrap(), content);
        assert_eq!(insert_missing("", &PROPERTY_GROUP, &[LANG]).unwrap(), "");
    }

    #[test]
    fn inserts_before_end_marker_with_matching_indent() {
        let content = "<Project>\n  <PropertyGroup>\n    <Optimize>false</Optimize>\n  </PropertyGroup>\n</Project>\n";
        let patched = insert_missing(content, &PROPERTY_GROUP, &[LANG]).unwrap();
        assert_eq!(
            patched,
            "<Project>\n  <PropertyGroup>\n    <Optimize>false</Optimize>\n    <LangVersion>default</LangVersion>\n  </PropertyGroup>\n</Project>\n"
        );
    }

    #[test]
    fn keeps_crlf_line_endings() {
        let content = "<PropertyGroup>\r\n  <A>1</A>\r\n</PropertyGroup>\r\n";
        let patched = insert_missing(content, &PROPERTY_GROUP, &[LANG]).unwrap();
        assert_eq!(
            patched,
            "<PropertyGroup>\r\n  <A>1</A>\r\n  <LangVersion>default</LangVersion>\r\n</PropertyGroup>\r\n"
        );
    }

    #[test]
    fn inline_blocks_get_inline_insertions() {
        let content = "<PropertyGroup><A>1</A></PropertyGroup>";
        let patched = insert_missing(content, &PROPERTY_GROUP, &[LANG]).unwrap();
        assert_eq!(
            patched,
            "<PropertyGroup><A>1</A><LangVersion>default</LangVersion></PropertyGroup>"
        );
    }

    #[test]
    fn every_block_is_patched_once() {
        let content = "<PropertyGroup Condition=\"a\">\n</PropertyGroup>\n<PropertyGroup>\n  <LangVersion>7.3</LangVersion>\n</PropertyGroup>\n<PropertyGroup>\n</PropertyGroup>\n";
        let patched = insert_missing(content, &PROPERTY_GROUP, &[LANG]).unwrap();
        assert_eq!(patched.matches("<LangVersion>").count(), 3);
        assert_eq!(patched.matches("<LangVersion>default</LangVersion>").count(), 2);
        assert!(patched.contains("<LangVersion>7.3</LangVersion>"));
    }

    #[test]
    fn patching_is_idempotent() {
        let content = "<Project>\n  <PropertyGroup>\n    <A>1</A>\n  </PropertyGroup>\n  <PropertyGroup><B/></PropertyGroup>\n</Project>\n";
        let once = insert_missing(content, &PROPERTY_GROUP, &[LANG]).unwrap();
        let twice = insert_missing(&once, &PROPERTY_GROUP, &[LANG]).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn unterminated_block_is_an_error() {
        let content = "<PropertyGroup>\n</PropertyGroup>\n<PropertyGroup>\n  <A>1</A>\n";
        let err = insert_missing(content, &PROPERTY_GROUP, &[LANG]).unwrap_err();
        assert!(matches!(err, Error::UnterminatedBlock { offset, .. } if offset == 33));
    }

    #[test]
    fn self_closing_and_lookalike_tags_are_skipped() {
        let content = "<PropertyGroup />\n<PropertyGroupExtra>\n</PropertyGroupExtra>\n";
        assert_eq!(insert_missing(content, &PROPERTY_GROUP, &[LANG]).unwrap(), content);
    }

    #[test]
    fn blank_lines_are_removed() {
        assert_eq!(scrub_blank_lines("a\n\n  \n\t\t\nb\n"), "a\nb\n");
        assert_eq!(scrub_blank_lines("a\r\n \r\nb"), "a\r\nb");
        assert_eq!(scrub_blank_lines("\n\n"), "");
    }

    #[test]
    fn mixed_line_endings_follow_the_majority() {
        assert_eq!(scrub_blank_lines("a\nb\nc\nd\r\n"), "a\nb\nc\nd\n");
        assert_eq!(scrub_blank_lines("a\r\nb\r\n\nc\r\n"), "a\r\nb\r\nc\r\n");
        assert_eq!(dominant_line_ending("a\r\nb\n"), "\n");
        assert_eq!(dominant_line_ending("no newline"), "\n");
    }
}
