//! Built-in knowledge base of common command-line failures
//!
//! Categories are scanned in order and the first match wins, so broader
//! patterns near the top take precedence over narrower ones further down.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// One recognized failure category with its fixes.
#[derive(Debug)]
pub struct ErrorPattern {
    /// Human-readable category name.
    pub name: &'static str,
    patterns: Vec<Regex>,
    /// Ordered fixes, most likely first.
    pub solutions: &'static [&'static str],
    /// Concrete commands illustrating the fixes.
    pub examples: &'static [&'static str],
}

impl ErrorPattern {
    fn new(
        name: &'static str,
        patterns: &[&str],
        solutions: &'static [&'static str],
        examples: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            patterns: patterns
                .iter()
                .map(|p| {
                    RegexBuilder::new(p)
                        .case_insensitive(true)
                        .build()
                        .expect("Valid regex pattern")
                })
                .collect(),
            solutions,
            examples,
        }
    }

    /// Whether any of this category's patterns matches `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }
}

static ERROR_PATTERNS: Lazy<Vec<ErrorPattern>> = Lazy::new(|| {
    vec![
        ErrorPattern::new(
            "Command Not Found",
            &[
                r"command not found",
                // dash and busybox ash say "sh: 1: foo: not found"
                r"sh: (?:\d+: )?.*: not found",
                r"is not recognized as the name of a cmdlet",
                r"'.*?' is not recognized as an internal or external command",
            ],
            &[
                "The command may not be installed. Check if it's in your PATH.",
                "Try installing the missing tool with your package manager (apt, brew, pip, cargo).",
                "Verify the command name is spelled correctly.",
            ],
            &[
                "Check if Python is installed: python --version",
                "Locate an executable: which <command>",
            ],
        ),
        ErrorPattern::new(
            "File or Directory Not Found",
            &[
                r"No such file or directory",
                r"cannot find the path",
                r"Path does not exist",
                r"FileNotFoundError",
            ],
            &[
                "Check if the file/directory path is correct.",
                "Verify the file exists with: ls <path>",
                "Use absolute paths instead of relative paths if possible.",
            ],
            &[
                "List directory contents: ls -la /path/to/folder",
                "Check current directory: pwd",
            ],
        ),
        ErrorPattern::new(
            "Permission Denied",
            &[
                r"Permission denied",
                r"Access is denied",
                r"PermissionError",
                r"You do not have permission",
            ],
            &[
                "Retry with elevated privileges: sudo <command>",
                "Check file permissions with: ls -l <file>",
                "Change permissions if needed: chmod u+rw <file>",
            ],
            &[
                "Check file permissions: ls -l /path/to/file",
                "Make a script executable: chmod +x script.sh",
            ],
        ),
        ErrorPattern::new(
            "Port Already in Use",
            &[
                r"Address already in use",
                r"port .* already in use",
                r"Cannot bind to port",
                r"port is already allocated",
            ],
            &[
                "Find the process using the port and terminate it.",
                "Use a different port if possible.",
                "Wait a moment and retry (port may be in TIME_WAIT state).",
            ],
            &[
                "Find process on port 8000: lsof -i :8000",
                "Kill process: kill <pid>",
                "Use different port: python app.py --port 8001",
            ],
        ),
        ErrorPattern::new(
            "Module or Package Not Found",
            &[
                r"ModuleNotFoundError",
                r"No module named",
                r"cannot find module",
                r"ImportError",
            ],
            &[
                "Install the missing package: pip install <package-name>",
                "Check package name spelling.",
                "Ensure you're using the correct environment/virtual env.",
            ],
            &[
                "Install a package: pip install requests",
                "Install from requirements file: pip install -r requirements.txt",
            ],
        ),
        ErrorPattern::new(
            "Network Connection Error",
            &[
                r"Connection refused",
                r"Connection timeout",
                r"Unable to connect",
                r"network is unreachable",
            ],
            &[
                "Check your internet connection.",
                "Verify the server is running and accessible.",
                "Check firewall settings.",
            ],
            &[
                "Test connection: ping example.com",
                "Check port connectivity: nc -vz localhost 8000",
            ],
        ),
        ErrorPattern::new(
            "Authentication Failed",
            &[
                r"authentication failed",
                r"401 Unauthorized",
                r"invalid credentials",
                r"permission denied \(publickey\)",
            ],
            &[
                "Check your credentials/API keys.",
                "Verify API key or token is valid.",
                "For SSH: ensure the correct private key is loaded (ssh-add).",
            ],
            &[
                "Load SSH key: ssh-add ~/.ssh/id_ed25519",
                "Test Git credentials: git ls-remote https://github.com/user/repo",
            ],
        ),
        ErrorPattern::new(
            "Syntax Error",
            &[
                r"SyntaxError",
                r"syntax error",
                r"unexpected token",
                r"missing closing",
            ],
            &[
                "Check for matching brackets, parentheses, and quotes.",
                "Review the line number indicated in the error.",
                "Check for missing colons after if/for/while statements.",
            ],
            &["Open the file at the reported line and check the syntax."],
        ),
        ErrorPattern::new(
            "Disk Space Error",
            &[
                r"no space left on device",
                r"disk full",
                r"out of space",
                r"insufficient space",
            ],
            &[
                "Check available disk space: df -h",
                "Delete unnecessary files or move large files.",
                "Clean up caches and old logs.",
            ],
            &[
                "Check disk usage: df -h",
                "Find large directories: du -sh * | sort -h",
            ],
        ),
        ErrorPattern::new(
            "Invalid Argument or Option",
            &[
                r"invalid argument",
                r"unrecognized arguments?",
                r"unknown option",
                r"invalid option",
            ],
            &[
                "Check command help: <command> --help or <command> -h",
                "Verify argument syntax and order.",
                "Ensure arguments match expected format.",
            ],
            &[
                "Get help: python script.py --help",
                "Check the command's man page: man <command>",
            ],
        ),
    ]
});

/// All categories in precedence order.
pub fn all_patterns() -> &'static [ErrorPattern] {
    &ERROR_PATTERNS
}

/// First category matching `text`, or `None` when nothing applies.
pub fn find_error_pattern(text: &str) -> Option<&'static ErrorPattern> {
    ERROR_PATTERNS.iter().find(|p| p.matches(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_not_found_matches() {
        let pattern = find_error_pattern("bash: foo: command not found").unwrap();
        assert_eq!(pattern.name, "Command Not Found");
    }

    #[test]
    fn test_file_not_found_matches() {
        let pattern = find_error_pattern("cat: /tmp/missing: No such file or directory").unwrap();
        assert_eq!(pattern.name, "File or Directory Not Found");
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let pattern = find_error_pattern("PERMISSION DENIED while opening file").unwrap();
        assert_eq!(pattern.name, "Permission Denied");
    }

    #[test]
    fn test_first_category_wins() {
        // The publickey message also appears under Authentication Failed,
        // but Permission Denied is scanned first.
        let pattern = find_error_pattern("git@github.com: Permission denied (publickey).").unwrap();
        assert_eq!(pattern.name, "Permission Denied");
    }

    #[test]
    fn test_port_in_use_matches() {
        let pattern =
            find_error_pattern("Error: listen EADDRINUSE: address already in use :::3000")
                .unwrap();
        assert_eq!(pattern.name, "Port Already in Use");
    }

    #[test]
    fn test_unknown_error_matches_nothing() {
        assert!(find_error_pattern("everything is totally fine here").is_none());
    }

    #[test]
    fn test_every_category_has_fixes() {
        let patterns = all_patterns();
        assert_eq!(patterns.len(), 10);
        for pattern in patterns {
            assert!(!pattern.solutions.is_empty(), "{} has no fixes", pattern.name);
        }
    }

    #[test]
    fn test_each_category_detects_a_real_message() {
        let samples = [
            ("zsh: command not found: htop", "Command Not Found"),
            ("ls: cannot access 'x': No such file or directory", "File or Directory Not Found"),
            ("open /etc/shadow: permission denied", "Permission Denied"),
            ("bind: Address already in use", "Port Already in Use"),
            ("ModuleNotFoundError: No module named 'requests'", "Module or Package Not Found"),
            ("curl: (7) Connection refused", "Network Connection Error"),
            ("remote: HTTP Basic: Access denied. authentication failed", "Authentication Failed"),
            ("SyntaxError: invalid syntax at line 3", "Syntax Error"),
            ("write error: no space left on device", "Disk Space Error"),
            ("error: unknown option '--frobnicate'", "Invalid Argument or Option"),
        ];

        for (message, expected) in samples {
            let pattern = find_error_pattern(message)
                .unwrap_or_else(|| panic!("no category matched: {message}"));
            assert_eq!(pattern.name, expected, "wrong category for: {message}");
        }
    }
}
