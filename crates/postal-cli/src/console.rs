//! Terminal interaction layer.
//!
//! All prompting goes through [`Console`], which is generic over its
//! reader and writer so the menu flows can be driven by scripted input
//! in tests. EOF on the input stream is surfaced as `None` and treated
//! by callers as "cancel", so piped input never spins a prompt loop.

use std::io::{self, BufRead, IsTerminal, Write};

use owo_colors::OwoColorize;

pub struct Console<R, W> {
    input: R,
    output: W,
    color: bool,
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    /// Console over the process stdio, with color when stdout is a
    /// terminal and `NO_COLOR` is unset.
    pub fn stdio() -> Self {
        let color = io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self {
            input: io::stdin().lock(),
            output: io::stdout(),
            color,
        }
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            color: false,
        }
    }

    fn read_trimmed(&mut self) -> io::Result<Option<String>> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Prompt for a free-form value. `None` means EOF.
    pub fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{text}: ")?;
        self.read_trimmed()
    }

    /// Prompt with a default used when the answer is empty.
    pub fn prompt_default(&mut self, text: &str, default: &str) -> io::Result<Option<String>> {
        write!(self.output, "{text} [{default}]: ")?;
        Ok(self
            .read_trimmed()?
            .map(|answer| if answer.is_empty() { default.to_string() } else { answer }))
    }

    /// Yes/no question. Empty answer takes the default; EOF answers no.
    pub fn confirm(&mut self, text: &str, default: bool) -> io::Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        write!(self.output, "{text} {hint}: ")?;
        let Some(answer) = self.read_trimmed()? else {
            return Ok(false);
        };
        if answer.is_empty() {
            return Ok(default);
        }
        Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    /// Numbered pick list. Entry `n` selects `items[n - 1]`, `0` cancels,
    /// and anything else re-prompts. Returns `None` on cancel or EOF.
    pub fn select<'a, T>(
        &mut self,
        title: &str,
        items: &'a [T],
        label: impl Fn(&T) -> String,
    ) -> io::Result<Option<&'a T>> {
        if items.is_empty() {
            return Ok(None);
        }
        writeln!(self.output, "\n{title}:")?;
        for (i, item) in items.iter().enumerate() {
            writeln!(self.output, "  {}. {}", i + 1, label(item))?;
        }
        writeln!(self.output, "  0. Cancel")?;
        loop {
            write!(self.output, "Select number: ")?;
            let Some(answer) = self.read_trimmed()? else {
                return Ok(None);
            };
            match answer.parse::<usize>() {
                Ok(0) => return Ok(None),
                Ok(n) if n <= items.len() => return Ok(Some(&items[n - 1])),
                Ok(_) => writeln!(self.output, "Invalid choice, try again.")?,
                Err(_) => writeln!(self.output, "Please enter a number.")?,
            }
        }
    }

    pub fn header(&mut self, text: &str) -> io::Result<()> {
        if self.color {
            writeln!(self.output, "\n{}", text.bold())?;
        } else {
            writeln!(self.output, "\n{text}")?;
        }
        writeln!(self.output, "{}", "-".repeat(text.len()))
    }

    pub fn success(&mut self, text: &str) -> io::Result<()> {
        if self.color {
            writeln!(self.output, "{} {text}", "[OK]".green())
        } else {
            writeln!(self.output, "[OK] {text}")
        }
    }

    pub fn error(&mut self, text: &str) -> io::Result<()> {
        if self.color {
            writeln!(self.output, "{} {text}", "[ERROR]".red())
        } else {
            writeln!(self.output, "[ERROR] {text}")
        }
    }

    pub fn info(&mut self, text: &str) -> io::Result<()> {
        if self.color {
            writeln!(self.output, "{} {text}", "[INFO]".cyan())
        } else {
            writeln!(self.output, "[INFO] {text}")
        }
    }

    pub fn plain(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{text}")
    }

    /// Wait for Enter before returning to a menu.
    pub fn pause(&mut self) -> io::Result<()> {
        write!(self.output, "\nPress Enter to continue...")?;
        self.read_trimmed().map(|_| ())
    }

    /// Consume the console and hand back its writer, for transcript
    /// assertions in tests.
    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}
