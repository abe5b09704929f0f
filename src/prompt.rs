use dialoguer::Input;

use rporter::clients::errors::Result;

// Console prompts for the interactive flow. Parsing is separated from the
// prompting so the cancel/reset rules are testable without a terminal.

pub fn select_index(prompt: &str, max: usize) -> Result<Option<usize>> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(parse_index(&input, max))
}

pub fn start_offset(prompt: &str, count: usize) -> Result<usize> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(parse_offset(&input, count))
}

pub fn confirm(prompt: &str) -> Result<bool> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(parse_confirmation(&input))
}

pub fn pause(prompt: &str) -> Result<()> {
    let _: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(())
}

// 1-based selection; non-numeric or out-of-range input cancels the step
fn parse_index(input: &str, max: usize) -> Option<usize> {
    let choice: usize = input.trim().parse().ok()?;
    (1..=max).contains(&choice).then(|| choice - 1)
}

// 1-based offset; empty, non-numeric or out-of-range input restarts from the top
fn parse_offset(input: &str, count: usize) -> usize {
    match input.trim().parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => n - 1,
        _ => 0,
    }
}

// Only a literal yes proceeds
fn parse_confirmation(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_accepts_only_the_listed_range() {
        assert_eq!(parse_index("1", 3), Some(0));
        assert_eq!(parse_index(" 3 ", 3), Some(2));
        assert_eq!(parse_index("0", 3), None);
        assert_eq!(parse_index("4", 3), None);
        assert_eq!(parse_index("abc", 3), None);
        assert_eq!(parse_index("", 3), None);
    }

    #[test]
    fn offset_resets_to_first_track_on_bad_input() {
        assert_eq!(parse_offset("1", 10), 0);
        assert_eq!(parse_offset("7", 10), 6);
        assert_eq!(parse_offset("0", 10), 0);
        assert_eq!(parse_offset("11", 10), 0);
        assert_eq!(parse_offset("", 10), 0);
        assert_eq!(parse_offset("x", 10), 0);
    }

    #[test]
    fn confirmation_requires_literal_yes() {
        assert!(parse_confirmation("yes"));
        assert!(parse_confirmation(" YES "));
        assert!(!parse_confirmation("y"));
        assert!(!parse_confirmation("no"));
        assert!(!parse_confirmation(""));
    }
}
