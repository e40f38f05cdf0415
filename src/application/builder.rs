//! Line-oriented code builder for generated scripts
//!
//! Batch files comment with `::`, end lines with `\r\n` and print with
//! `echo` (escaping `&` and `%`). Shell scripts comment with `#`, end lines
//! with `\n` and print single-quoted text.

use script_core::ScriptLanguage;

/// Width of the hyphen banners framing each script.
pub const TOTAL_SEPARATOR_HYPHENS: usize = 58;

#[derive(Debug, Clone)]
pub struct CodeBuilder {
    language: ScriptLanguage,
    lines: Vec<String>,
}

impl CodeBuilder {
    pub fn new(language: ScriptLanguage) -> Self {
        Self {
            language,
            lines: Vec::new(),
        }
    }

    /// Appends each non-empty line of `code`, or one empty line when `code`
    /// is absent or empty.
    pub fn append_line(&mut self, code: Option<&str>) -> &mut Self {
        match code {
            None | Some("") => self.lines.push(String::new()),
            Some(code) => self.lines.extend(
                code.split(['\r', '\n'])
                    .filter(|line| !line.is_empty())
                    .map(str::to_string),
            ),
        }
        self
    }

    pub fn append_empty_line(&mut self) -> &mut Self {
        self.append_line(None)
    }

    pub fn append_comment_line(&mut self, text: &str) -> &mut Self {
        let line = format!("{} {}", self.comment_delimiter(), text);
        self.lines.push(line);
        self
    }

    pub fn append_trailing_hyphens_comment_line(&mut self, total_hyphens: usize) -> &mut Self {
        self.append_comment_line(&"-".repeat(total_hyphens))
    }

    /// Three-line banner with `name` centred between hyphens. Names that do
    /// not fit become a plain comment line.
    pub fn append_comment_line_with_hyphens_around(
        &mut self,
        name: &str,
        total_hyphens: usize,
    ) -> &mut Self {
        if name.is_empty() {
            return self;
        }
        let length = name.chars().count();
        if length >= total_hyphens {
            return self.append_comment_line(name);
        }
        let remaining = total_hyphens - length;
        let before = "-".repeat(remaining / 2);
        let after = "-".repeat(remaining - remaining / 2);
        self.append_trailing_hyphens_comment_line(total_hyphens)
            .append_comment_line(&format!("{}{}{}", before, name, after))
            .append_trailing_hyphens_comment_line(total_hyphens)
    }

    pub fn append_function(&mut self, name: &str, code: &str) -> &mut Self {
        let echo = self.write_standard_out(&format!("--- {}", name));
        self.append_comment_line_with_hyphens_around(name, TOTAL_SEPARATOR_HYPHENS)
            .append_line(Some(&echo))
            .append_line(Some(code))
            .append_trailing_hyphens_comment_line(TOTAL_SEPARATOR_HYPHENS)
    }

    /// Number of lines written so far.
    pub fn current_line(&self) -> usize {
        self.lines.len()
    }

    pub fn language(&self) -> ScriptLanguage {
        self.language
    }

    pub fn build(&self) -> String {
        self.lines.join(self.new_line())
    }

    fn comment_delimiter(&self) -> &'static str {
        match self.language {
            ScriptLanguage::Batchfile => "::",
            ScriptLanguage::Shellscript => "#",
        }
    }

    fn new_line(&self) -> &'static str {
        match self.language {
            ScriptLanguage::Batchfile => "\r\n",
            ScriptLanguage::Shellscript => "\n",
        }
    }

    fn write_standard_out(&self, text: &str) -> String {
        match self.language {
            ScriptLanguage::Batchfile => {
                format!("echo {}", text.replace('&', "^&").replace('%', "%%"))
            }
            ScriptLanguage::Shellscript => format!("echo '{}'", text.replace('\'', "'\\''")),
        }
    }
}
