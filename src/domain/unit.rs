use crate::error::{GridcastError, Result};

pub const MAX_UNIT_LINES: usize = 2;

/// Smallest deliverable piece of text: one or two lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputUnit {
    lines: Vec<String>,
}

impl OutputUnit {
    pub fn new(lines: Vec<String>) -> Result<Self> {
        if lines.is_empty() {
            return Err(GridcastError::InvalidUnit("unit has no lines".to_string()));
        }
        if lines.len() > MAX_UNIT_LINES {
            return Err(GridcastError::InvalidUnit(format!(
                "unit has {} lines, at most {} allowed",
                lines.len(),
                MAX_UNIT_LINES
            )));
        }
        if let Some(line) = lines.iter().find(|l| l.contains('\n')) {
            return Err(GridcastError::InvalidUnit(format!(
                "line contains a newline: {:?}",
                line
            )));
        }
        Ok(Self { lines })
    }

    pub fn single(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
        }
    }

    pub fn pair(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            lines: vec![first.into(), second.into()],
        }
    }

    /// Build a unit from a formatter text block.
    ///
    /// Blank lines are dropped; lines past the second are folded into it
    /// with `" | "`.
    pub fn from_block(block: &str) -> Result<Self> {
        let mut lines: Vec<String> = block
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect();

        if lines.is_empty() {
            return Err(GridcastError::InvalidUnit("empty text block".to_string()));
        }

        if lines.len() > MAX_UNIT_LINES {
            let folded = lines.split_off(1).join(" | ");
            lines.push(folded);
        }

        Self::new(lines)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Text as handed to the sink
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl std::fmt::Display for OutputUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.lines.join(" / "))
    }
}
