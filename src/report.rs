//! Highlighted failure output on stderr

use colored::Colorize;

use crate::error::TargetError;

/// Render `message` inside a box drawn with box-drawing characters.
pub fn boxed(message: &str) -> String {
    let lines: Vec<&str> = message.lines().collect();
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let rule = "─".repeat(width + 2);

    let mut out = format!("╭{}╮\n", rule);
    for line in &lines {
        let pad = width - line.chars().count();
        out.push_str(&format!("│ {}{} │\n", line, " ".repeat(pad)));
    }
    out.push_str(&format!("╰{}╯", rule));
    out
}

/// Print a per-target failure as a red box on stderr.
pub fn target_failure(error: &TargetError) {
    eprintln!("{}", boxed(&error.to_string()).red().bold());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_wraps_single_line() {
        let rendered = boxed("build failed for x86-linux (exit code 2)");
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("build failed for x86-linux (exit code 2)"));
        assert!(lines[0].starts_with('╭') && lines[0].ends_with('╮'));
        assert!(lines[2].starts_with('╰') && lines[2].ends_with('╯'));
    }

    #[test]
    fn box_lines_share_width() {
        let rendered = boxed("short\na much longer line");
        let widths: Vec<usize> = rendered.lines().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }
}
