// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use tracing::warn;

use crate::error::{Error, Result};

const MAX_COMMAND_LENGTH: usize = 16384;

/// Validate a command before it is sent to the remote shell.
pub fn sanitize_command(command: &str) -> Result<String> {
    if command.trim().is_empty() {
        return Err(Error::Configuration("empty command not allowed".to_string()));
    }

    if command.len() > MAX_COMMAND_LENGTH {
        return Err(Error::Configuration(format!(
            "command too long: {} bytes (max: {MAX_COMMAND_LENGTH} bytes)",
            command.len()
        )));
    }

    if command.contains('\0') {
        return Err(Error::Configuration(
            "command contains null bytes".to_string(),
        ));
    }

    for (pattern, description) in [
        ("$(", "command substitution"),
        ("`", "backtick command substitution"),
        ("\n&", "background process after newline"),
        (";\n", "command chaining with newline"),
    ] {
        if command.contains(pattern) {
            warn!(
                "Potentially dangerous pattern detected in command: {} ({})",
                pattern, description
            );
        }
    }

    Ok(command.to_string())
}

/// Single-quote a path for a POSIX shell.
///
/// Embedded single quotes become `'\''`, so the result is always one word.
pub fn shell_quote(path: &str) -> String {
    let mut quoted = String::with_capacity(path.len() + 2);
    quoted.push('\'');
    for c in path.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    quoted
}

/// Command used when a remote directory survives an SFTP `rmdir`.
pub fn force_remove_command(path: &str) -> Result<String> {
    let trimmed = path.trim();
    if trimmed.is_empty() || trimmed.trim_end_matches('/').is_empty() {
        return Err(Error::Configuration(format!(
            "refusing to force-remove '{path}'"
        )));
    }
    sanitize_command(&format!("rm -rf -- {}", shell_quote(path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_command_valid() {
        assert!(sanitize_command("ls -la").is_ok());
        assert!(sanitize_command("echo 'hello world'").is_ok());
    }

    #[test]
    fn test_sanitize_command_rejects() {
        assert!(sanitize_command("").is_err());
        assert!(sanitize_command("   ").is_err());
        assert!(sanitize_command("echo\0test").is_err());
        assert!(sanitize_command(&"x".repeat(MAX_COMMAND_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("/tmp/a b"), "'/tmp/a b'");
        assert_eq!(shell_quote("/tmp/it's"), "'/tmp/it'\\''s'");
        assert_eq!(shell_quote("$(reboot)"), "'$(reboot)'");
    }

    #[test]
    fn test_force_remove_command() {
        assert_eq!(
            force_remove_command("/tmp/work dir").unwrap(),
            "rm -rf -- '/tmp/work dir'"
        );
        assert!(force_remove_command("/").is_err());
        assert!(force_remove_command("///").is_err());
        assert!(force_remove_command("").is_err());
    }
}
