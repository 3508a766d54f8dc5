use std::io::IsTerminal;
use dialoguer::{theme::ColorfulTheme, Input};
use miette::{IntoDiagnostic, Result};
use std::io::{BufRead, Write};

const INVALID_CHOICE: &str = "not a choice, must be y, n, yes or no";

/// Interpret a yes/no answer. Accepts `y`, `yes`, `n` and `no` in any case.
pub fn parse_answer(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Ask a yes/no question, re-prompting until the answer is a valid choice.
///
/// Uses an interactive prompt on a terminal and plain line reads when stdin
/// is piped.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        let stdin = std::io::stdin();
        return confirm_from(stdin.lock(), std::io::stdout(), prompt);
    }

    let answer: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("{} (y/n/yes/no)", prompt))
        .validate_with(|input: &String| -> Result<(), &'static str> {
            parse_answer(input)
                .map(|_| ())
                .ok_or(INVALID_CHOICE)
        })
        .interact_text()
        .into_diagnostic()?;

    Ok(parse_answer(&answer).unwrap_or(false))
}

/// Line-based prompt loop. End of input counts as "no".
pub fn confirm_from(mut reader: impl BufRead, mut out: impl Write, prompt: &str) -> Result<bool> {
    let mut line = String::new();

    loop {
        write!(out, "{} (y/n/yes/no) ", prompt).into_diagnostic()?;
        out.flush().into_diagnostic()?;

        line.clear();
        if reader.read_line(&mut line).into_diagnostic()? == 0 {
            writeln!(out).into_diagnostic()?;
            return Ok(false);
        }

        match parse_answer(&line) {
            Some(answer) => return Ok(answer),
            None => writeln!(out, "{}", INVALID_CHOICE).into_diagnostic()?,
        }
    }
}
