// src/cli/handlers/commons.rs

// Output and prompt helpers shared by the command handlers.

use anyhow::{Result, anyhow};
use colored::Colorize;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};

use crate::{models::Environment, state::AppContext};

const ERROR_BLOCK_PADDING: usize = 2;

/// `text` between two rules of the same width.
pub fn banner_lines(text: &str) -> [String; 3] {
    let text = text.trim();
    let rule = "-".repeat(text.chars().count());
    [rule.clone(), text.to_string(), rule]
}

pub fn banner(text: &str) {
    let [top, title, bottom] = banner_lines(text);
    println!();
    println!("{}", top.cyan());
    println!("{}", title.cyan().bold());
    println!("{}", bottom.cyan());
    println!();
}

/// Formats `key: value` rows with the values aligned in one column.
pub fn key_value_lines(pairs: &[(&str, String)]) -> Vec<String> {
    let width = pairs
        .iter()
        .map(|(key, _)| key.chars().count())
        .max()
        .unwrap_or(0)
        + 1;
    pairs
        .iter()
        .map(|(key, value)| {
            let padding = " ".repeat(width - key.chars().count());
            format!("{}:{}{}", key.yellow(), padding, value.green())
        })
        .collect()
}

pub fn key_value_list(pairs: &[(&str, String)]) {
    println!();
    for line in key_value_lines(pairs) {
        println!("{}", line);
    }
    println!();
}

/// Lays out an error report: a header, a blank line, then the message lines,
/// all padded to the widest line.
pub fn error_block_lines(message: &str) -> Vec<String> {
    let mut lines = vec![t!("common.error.header").to_string(), String::new()];
    lines.extend(message.lines().map(str::to_string));

    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let pad = " ".repeat(ERROR_BLOCK_PADDING);
    let blank = " ".repeat(width + ERROR_BLOCK_PADDING * 2);

    let mut block = Vec::with_capacity(lines.len() + 2);
    block.push(blank.clone());
    for line in lines {
        let fill = " ".repeat(width - line.chars().count());
        block.push(format!("{pad}{line}{fill}{pad}"));
    }
    block.push(blank);
    block
}

/// Writes an error report to stderr on a red background.
pub fn print_error_block(message: &str) {
    eprintln!();
    for line in error_block_lines(message) {
        eprintln!("{}", line.white().on_red());
    }
    eprintln!();
}

/// Makers write into the source tree, so they only run in development.
pub fn ensure_development(ctx: &AppContext) -> Result<()> {
    if ctx.config.environment == Environment::Development {
        Ok(())
    } else {
        Err(anyhow!(
            t!("maker.error.not_development"),
            environment = ctx.config.environment
        ))
    }
}

/// Asks a yes/no question. Without interaction (or with `assume_yes`) the
/// default is taken.
pub fn confirm(ctx: &AppContext, prompt: &str, default: bool, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    if !ctx.interactive {
        return Ok(default);
    }
    let answer = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(default)
        .interact()?;
    Ok(answer)
}

/// Asks for a value until `validate` accepts it. Fails straight away without
/// interaction, since there is no sensible default.
pub fn ask_until_valid<F>(ctx: &AppContext, prompt: &str, validate: F) -> Result<String>
where
    F: Fn(&str) -> std::result::Result<(), String>,
{
    if !ctx.interactive {
        return Err(anyhow!(t!("common.error.missing_argument"), name = prompt));
    }
    loop {
        let input: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        let input = input.trim().to_string();
        if input.is_empty() {
            println!("{}", t!("common.warning.empty_value").yellow());
            continue;
        }
        match validate(&input) {
            Ok(()) => return Ok(input),
            Err(reason) => println!("{}", reason.yellow()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_value_lines_align_values() {
        colored::control::set_override(false);
        let lines = key_value_lines(&[
            ("Class", "App\\Console\\Command\\Sync".to_string()),
            ("Command", "sync".to_string()),
        ]);
        assert_eq!(
            lines,
            vec![
                "Class:   App\\Console\\Command\\Sync".to_string(),
                "Command: sync".to_string(),
            ]
        );
    }

    #[test]
    fn test_maker_banner_is_framed() {
        let [top, title, bottom] = banner_lines(t!("maker.title"));
        assert_eq!(title, t!("maker.title"));
        assert_eq!(top.chars().count(), title.chars().count());
        assert!(top.chars().all(|c| c == '-'));
        assert_eq!(top, bottom);
    }

    #[test]
    fn test_error_block_is_rectangular() {
        let block = error_block_lines("Invalid class name\n    ↓\nFoo\\9Bar");
        let widths: Vec<usize> = block.iter().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(block.len(), 7);
        assert!(block[1].trim_end().ends_with(t!("common.error.header")));
        assert_eq!(block[4].trim(), "↓");
    }
}
