//! Line helpers shared by pipes, validation and code generation

/// Split on `\r\n`, `\r` or `\n`, keeping empty lines.
pub fn split_lines(code: &str) -> Vec<&str> {
    code.split("\r\n")
        .flat_map(|part| part.split(['\r', '\n']))
        .collect()
}

/// True when the text contains any line break.
pub fn has_line_breaks(code: &str) -> bool {
    code.contains(['\r', '\n'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_mixed_separators() {
        assert_eq!(split_lines("a\r\nb\rc\nd"), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_split_keeps_empty_lines() {
        assert_eq!(split_lines("a\n\nb\n"), vec!["a", "", "b", ""]);
        assert_eq!(split_lines(""), vec![""]);
    }
}
