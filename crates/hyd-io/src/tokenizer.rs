//! Logical-line classification for INP text.
//!
//! Splits raw text into classified lines: section headers, data rows with
//! pre-split fields, comments and blanks. The classifier is a single pass
//! over `str::lines`; calling [`classify`] again on the same text restarts
//! it from scratch; there is no hidden state.
//!
//! Comment lines are returned, never dropped; the model builder attaches
//! them to the following data row or section. Double-quoted substrings stay
//! intact as a single field; an unquoted `;` starts an inline comment and
//! ends the data portion of the line.

/// One classified logical line. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedLine {
    /// `[NAME]` (case-insensitive, surrounding whitespace ignored).
    SectionHeader {
        name: String,
        raw: String,
        line_no: usize,
    },
    /// A data row with its whitespace-split fields.
    DataRow {
        fields: Vec<String>,
        raw: String,
        line_no: usize,
    },
    /// A line whose first non-whitespace character is the comment marker.
    Comment { raw: String, line_no: usize },
    Blank { line_no: usize },
}

/// Classify every line of `text`. Finite and restartable.
pub fn classify(text: &str) -> Vec<ClassifiedLine> {
    text.lines()
        .enumerate()
        .map(|(idx, line)| classify_line(line, idx + 1))
        .collect()
}

fn classify_line(line: &str, line_no: usize) -> ClassifiedLine {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ClassifiedLine::Blank { line_no };
    }
    if trimmed.starts_with(';') {
        return ClassifiedLine::Comment {
            raw: line.to_string(),
            line_no,
        };
    }
    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        let name = trimmed[1..trimmed.len() - 1].trim().to_string();
        return ClassifiedLine::SectionHeader {
            name,
            raw: line.to_string(),
            line_no,
        };
    }
    ClassifiedLine::DataRow {
        fields: split_fields(line),
        raw: line.to_string(),
        line_no,
    }
}

/// Split a data line into fields on runs of whitespace.
///
/// Double-quoted substrings are kept intact (quotes stripped); an unquoted
/// `;` ends the data portion of the line.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            ';' if !in_quotes => break,
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    fields.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        fields.push(current);
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_basic_lines() {
        let lines = classify("[JUNCTIONS]\nJ1  10.0  0.0\n; a comment\n\n");
        assert!(matches!(
            &lines[0],
            ClassifiedLine::SectionHeader { name, .. } if name == "JUNCTIONS"
        ));
        assert!(matches!(
            &lines[1],
            ClassifiedLine::DataRow { fields, .. } if fields == &["J1", "10.0", "0.0"]
        ));
        assert!(matches!(&lines[2], ClassifiedLine::Comment { .. }));
        assert!(matches!(&lines[3], ClassifiedLine::Blank { .. }));
    }

    #[test]
    fn test_header_trimming_and_case() {
        let lines = classify("  [ Junctions ]  ");
        assert!(matches!(
            &lines[0],
            ClassifiedLine::SectionHeader { name, .. } if name == "Junctions"
        ));
    }

    #[test]
    fn test_quoted_fields_kept_intact() {
        let fields = split_fields("T1  \"Main Street gauge\"  1.0");
        assert_eq!(fields, vec!["T1", "Main Street gauge", "1.0"]);
    }

    #[test]
    fn test_inline_comment_ends_data() {
        let fields = split_fields("J1  10.0  ; elevation in ft");
        assert_eq!(fields, vec!["J1", "10.0"]);
    }

    #[test]
    fn test_semicolon_inside_quotes_is_data() {
        let fields = split_fields("L1 \"a;b\" 2");
        assert_eq!(fields, vec!["L1", "a;b", "2"]);
    }

    #[test]
    fn test_tab_delimited() {
        let fields = split_fields("C1\tJ1\tJ2\t120.5");
        assert_eq!(fields, vec!["C1", "J1", "J2", "120.5"]);
    }

    #[test]
    fn test_line_numbers_are_one_based() {
        let lines = classify("a\nb");
        assert!(matches!(&lines[0], ClassifiedLine::DataRow { line_no: 1, .. }));
        assert!(matches!(&lines[1], ClassifiedLine::DataRow { line_no: 2, .. }));
    }
}
