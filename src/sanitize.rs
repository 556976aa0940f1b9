//! Strips markdown and comment artifacts the model wraps around its answer.

const FENCE: &str = "```";

/// Model output reduced to the text the user should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedOutput {
    text: String,
    lines: Vec<String>,
}

impl SanitizedOutput {
    /// The whole cleaned answer, as rendered and copied.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Non-empty trimmed lines, in order, as recorded in history.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

pub fn sanitize(raw: &str) -> SanitizedOutput {
    let text = clean_response(raw);
    let lines = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();
    SanitizedOutput { text, lines }
}

fn clean_response(raw: &str) -> String {
    let mut text = raw.trim();

    if text.starts_with(FENCE) && text.ends_with(FENCE) {
        text = strip_fence(text).trim();
    } else if text.starts_with('`') && text.ends_with('`') {
        // A lone backtick is both the opener and the closer.
        text = text
            .strip_prefix('`')
            .and_then(|inner| inner.strip_suffix('`'))
            .unwrap_or("")
            .trim();
    }

    if let Some(rest) = text.strip_prefix("# ") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix('#') {
        text = rest;
    }

    text.trim().to_string()
}

/// Removes the opening fence line (with optional language tag) and the
/// closing fence. A first line that is only the fence loses exactly three
/// characters instead. Without a newline the first line is the whole text,
/// so a single-line fence leaves nothing.
fn strip_fence(text: &str) -> &str {
    let end = text.len() - FENCE.len();
    let first_line = text.split_once('\n').map_or(text, |(first, _)| first);
    let start = first_line.len().max(FENCE.len());
    if start >= end { "" } else { &text[start..end] }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fence_with_language_tag() {
        let output = sanitize("```bash\nls -la\n```");
        assert_eq!(output.text(), "ls -la");
        assert_eq!(output.lines(), ["ls -la"]);
    }

    #[test]
    fn test_fence_without_language_tag() {
        assert_eq!(sanitize("```\ngit status\n```").text(), "git status");
    }

    #[test]
    fn test_fenced_content_is_recovered_trimmed() {
        let inner = "  find . -name '*.log' -delete  # removes logs\ndu -sh .  ";
        for tag in ["", "sh", "zsh", "powershell"] {
            let wrapped = format!("```{}\n{}\n```", tag, inner);
            assert_eq!(sanitize(&wrapped).text(), inner.trim(), "tag {:?}", tag);
        }
    }

    #[test]
    fn test_surrounding_whitespace_around_fence() {
        assert_eq!(sanitize("\n\n  ```sh\necho hi\n```  \n").text(), "echo hi");
    }

    #[test]
    fn test_single_line_fence_is_taken_as_tag_line() {
        assert!(sanitize("```ls -la```").is_empty());
        assert_eq!(sanitize("```ls -la```").text(), "");
    }

    #[test]
    fn test_lone_fence_is_empty() {
        assert!(sanitize("```").is_empty());
        assert!(sanitize("````").is_empty());
    }

    #[test]
    fn test_inline_code_marker() {
        assert_eq!(sanitize("`docker ps -a`").text(), "docker ps -a");
    }

    #[test]
    fn test_lone_backticks_are_stripped() {
        assert_eq!(sanitize("`").text(), "");
        assert_eq!(sanitize("``").text(), "");
    }

    #[test]
    fn test_leading_comment_marker_with_space() {
        assert_eq!(
            sanitize("# Which directory do you mean?").text(),
            "Which directory do you mean?"
        );
    }

    #[test]
    fn test_bare_leading_comment_marker() {
        assert_eq!(sanitize("#Which branch?").text(), "Which branch?");
    }

    #[test]
    fn test_only_one_comment_prefix_is_removed() {
        assert_eq!(sanitize("## heading").text(), "# heading");
    }

    #[test]
    fn test_trailing_safety_comment_is_preserved() {
        let output = sanitize("```bash\nrm -rf build/ # deletes the build directory\n```");
        assert_eq!(output.text(), "rm -rf build/ # deletes the build directory");
    }

    #[test]
    fn test_sanitizing_clean_command_is_stable() {
        let once = sanitize("```bash\ncargo build --release\n```");
        let twice = sanitize(once.text());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_lines_drop_blanks_and_keep_order() {
        let output = sanitize("```sh\n  cd repo  \n\n   \ngit pull\nmake\n```");
        assert_eq!(output.lines(), ["cd repo", "git pull", "make"]);
        assert_eq!(output.text(), "cd repo  \n\n   \ngit pull\nmake");
    }

    #[test]
    fn test_plain_answer_passes_through() {
        let output = sanitize("  `ls` lists directory contents.\n");
        assert_eq!(output.text(), "`ls` lists directory contents.");
    }
}
