use serde::Serialize;

use crate::error::ScriptError;

/// Rows a script occupies in generated code, 0-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CodePosition {
    start_line: usize,
    end_line: usize,
}

impl CodePosition {
    pub fn new(start_line: usize, end_line: usize) -> Result<Self, ScriptError> {
        if start_line >= end_line {
            return Err(ScriptError::InvalidPosition {
                start: start_line,
                end: end_line,
            });
        }
        Ok(Self {
            start_line,
            end_line,
        })
    }

    pub fn start_line(&self) -> usize {
        self.start_line
    }

    pub fn end_line(&self) -> usize {
        self.end_line
    }

    pub fn total_lines(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_position() {
        let position = CodePosition::new(2, 7).unwrap();
        assert_eq!(position.start_line(), 2);
        assert_eq!(position.end_line(), 7);
        assert_eq!(position.total_lines(), 6);
    }

    #[test]
    fn test_start_must_precede_end() {
        assert_eq!(
            CodePosition::new(4, 4).unwrap_err(),
            ScriptError::InvalidPosition { start: 4, end: 4 }
        );
        assert!(CodePosition::new(5, 1).is_err());
    }
}
