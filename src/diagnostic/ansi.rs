use super::{Diagnostic, Severity};

pub struct AnsiRenderer {
    pub use_color: bool,
}

impl AnsiRenderer {
    fn bold(&self, s: &str) -> String {
        if self.use_color { format!("\x1b[1m{s}\x1b[0m") } else { s.to_string() }
    }

    fn bold_red(&self, s: &str) -> String {
        if self.use_color { format!("\x1b[1;31m{s}\x1b[0m") } else { s.to_string() }
    }

    fn yellow(&self, s: &str) -> String {
        if self.use_color { format!("\x1b[1;33m{s}\x1b[0m") } else { s.to_string() }
    }

    fn cyan(&self, s: &str) -> String {
        if self.use_color { format!("\x1b[36m{s}\x1b[0m") } else { s.to_string() }
    }

    fn dim(&self, s: &str) -> String {
        if self.use_color { format!("\x1b[2m{s}\x1b[0m") } else { s.to_string() }
    }

    pub fn render(&self, d: &Diagnostic) -> String {
        let mut out = String::new();

        let severity = match d.severity {
            Severity::Error => self.bold_red("error"),
            Severity::Warning => self.yellow("warning"),
        };
        match d.code {
            Some(code) => out.push_str(&format!("{severity}[{code}]: {}\n", self.bold(&d.message))),
            None => out.push_str(&format!("{severity}: {}\n", self.bold(&d.message))),
        }

        if let Some(label) = &d.label {
            let (line, col) = (label.pos.line, label.pos.col);
            out.push_str(&format!("  {} {line}:{col}\n", self.cyan("-->")));

            // lines are 1-based; a position past the source gets no snippet
            let text = d.source.as_deref().and_then(|s| s.lines().nth(line.checked_sub(1)?));
            if let Some(text) = text {
                let gutter = line.to_string().len();
                let pipe = self.cyan("|");
                let pad = " ".repeat(gutter);
                let indent = " ".repeat(col.saturating_sub(1));

                out.push_str(&format!("{pad} {pipe}\n"));
                let number = self.cyan(&format!("{line:>gutter$}"));
                out.push_str(&format!("{number} {pipe} {text}\n"));
                if label.message.is_empty() {
                    out.push_str(&format!("{pad} {pipe} {indent}{}\n", self.bold_red("^")));
                } else {
                    out.push_str(&format!(
                        "{pad} {pipe} {indent}{} {}\n",
                        self.bold_red("^"),
                        self.bold_red(&label.message)
                    ));
                }
                out.push_str(&format!("{pad} {pipe}\n"));
            }
        }

        for note in &d.notes {
            out.push_str(&format!("  {} note: {note}\n", self.dim("=")));
        }
        if let Some(suggestion) = &d.suggestion {
            out.push_str(&format!("  {} suggestion: {suggestion}\n", self.dim("=")));
        }

        out
    }
}
