//! Indented text output.

const INDENT: &str = "  ";

/// Accumulates generated source, one line at a time.
#[derive(Debug, Default)]
pub(crate) struct Writer {
    output: String,
    indent: usize,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a line at the current indentation.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.indent {
                self.output.push_str(INDENT);
            }
            self.output.push_str(text);
        }
        self.output.push('\n');
    }

    /// Writes an empty line, never two in a row and never at the start.
    pub fn blank(&mut self) {
        if !self.output.is_empty() && !self.output.ends_with("\n\n") {
            self.output.push('\n');
        }
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Returns the output, ending in exactly one newline.
    pub fn finish(mut self) -> String {
        while self.output.ends_with("\n\n") {
            self.output.pop();
        }
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation_and_blanks() {
        let mut w = Writer::new();
        w.blank();
        w.line("a {");
        w.indent();
        w.line("b;");
        w.line("");
        w.dedent();
        w.line("}");
        w.blank();
        w.blank();
        assert_eq!(w.finish(), "a {\n  b;\n\n}\n");
    }
}
