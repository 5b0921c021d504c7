//! Confirmation gate
//!
//! Every mutating step asks an [`Operator`] first. A console operator reads
//! free-text answers; [`AutoApprove`] answers yes without reading anything,
//! for headless runs.

use std::io::{self, BufRead, Write};

/// Check whether a free-text answer means yes
///
/// `y` and `yes` in any case, surrounding whitespace ignored.
#[must_use]
pub fn is_affirmative(response: &str) -> bool {
    tracing::debug!("checking user response of {}", response.trim());
    let response = response.trim();
    response.eq_ignore_ascii_case("y") || response.eq_ignore_ascii_case("yes")
}

/// Whoever answers confirmation prompts
pub trait Operator {
    /// Show `prompt` and return the answer
    fn ask(&mut self, prompt: &str) -> io::Result<String>;

    /// Show an informational line
    fn say(&mut self, line: &str) -> io::Result<()>;

    /// Automated operators are never asked; every gate proceeds
    fn is_automated(&self) -> bool {
        false
    }
}

/// Operator on a line-oriented console
#[derive(Debug)]
pub struct ConsoleOperator<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleOperator<R, W> {
    /// Create an operator over the given streams
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the output stream
    pub fn into_output(self) -> W {
        self.output
    }
}

impl ConsoleOperator<io::StdinLock<'static>, io::Stdout> {
    /// Operator on the process's stdin/stdout
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Operator for ConsoleOperator<R, W> {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        writeln!(self.output)?;
        Ok(line)
    }

    fn say(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{line}")
    }
}

/// Operator for automated runs
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoApprove;

impl Operator for AutoApprove {
    fn ask(&mut self, _prompt: &str) -> io::Result<String> {
        Ok("y".to_string())
    }

    fn say(&mut self, line: &str) -> io::Result<()> {
        println!("{line}");
        Ok(())
    }

    fn is_automated(&self) -> bool {
        true
    }
}

/// Ask a yes/no question; automated operators proceed without being asked
pub fn confirm<O: Operator + ?Sized>(operator: &mut O, prompt: &str) -> io::Result<bool> {
    if operator.is_automated() {
        tracing::debug!(
            "Automated run proceeds without prompting, assuming a response of y to: {}",
            prompt.trim()
        );
        return Ok(true);
    }

    tracing::debug!("Prompting user: {}", prompt.trim());
    let response = operator.ask(prompt)?;
    Ok(is_affirmative(&response))
}

/// Show a batch summary, offer to list its members, then ask to proceed
///
/// `summary` describes what was found; `items` are listed only if the
/// operator asks for them. Automated operators skip straight to yes.
pub fn review_and_confirm<O: Operator + ?Sized>(
    operator: &mut O,
    summary: &str,
    items: &[String],
    proceed_prompt: &str,
) -> io::Result<bool> {
    if operator.is_automated() {
        return confirm(operator, proceed_prompt);
    }

    tracing::info!("{}", summary);
    operator.say(summary)?;

    if confirm(operator, "Would you like to see their IDs? (y/n): ")? {
        for item in items {
            tracing::info!("{}", item);
            operator.say(item)?;
        }
    }
    operator.say("")?;

    confirm(operator, proceed_prompt)
}
