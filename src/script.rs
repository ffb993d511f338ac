//! Command scripts: one command per line

/// Split a script into commands, skipping blank lines and `//` comments.
pub fn load_commands(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("//"))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_blanks_and_comments() {
        let script = "\
// reference semantics
int x = 3;

   object p = null;   
// done
";
        assert_eq!(load_commands(script), vec!["int x = 3;", "object p = null;"]);
    }

    #[test]
    fn test_empty_script() {
        assert!(load_commands("\n\n// nothing\n").is_empty());
    }
}
