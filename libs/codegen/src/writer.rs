//! Indentation-aware text buffer for emitting C# source

const INDENT: &str = "    ";

#[derive(Debug, Default)]
pub struct CodeWriter {
    buffer: String,
    level: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one line at the current indentation
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.level {
                self.buffer.push_str(INDENT);
            }
            self.buffer.push_str(text);
        }
        self.buffer.push('\n');
        self
    }

    /// Empty line, never doubled and never directly after an opening brace
    pub fn blank(&mut self) -> &mut Self {
        if !(self.buffer.is_empty() || self.buffer.ends_with("\n\n") || self.buffer.ends_with("{\n")) {
            self.buffer.push('\n');
        }
        self
    }

    /// Write `header` followed by an opening brace and indent
    pub fn open(&mut self, header: impl AsRef<str>) -> &mut Self {
        self.line(header);
        self.line("{");
        self.level += 1;
        self
    }

    /// Dedent and close the innermost brace
    pub fn close(&mut self) -> &mut Self {
        self.level = self.level.saturating_sub(1);
        self.line("}")
    }

    pub fn indent(&mut self) -> &mut Self {
        self.level += 1;
        self
    }

    pub fn dedent(&mut self) -> &mut Self {
        self.level = self.level.saturating_sub(1);
        self
    }

    pub fn finish(self) -> String {
        self.buffer
    }
}
