//! Validator: runs the external pantherlog binary against the emitted files.
//!
//! The binary is an opaque collaborator. One synchronous invocation, no
//! timeout, no retry; exit status is the verdict and the captured text is
//! forwarded to the caller untouched.

use std::path::Path;
use std::process::Command;

use crate::errors::ValidationError;

/// Outcome of a single `pantherlog test` run.
#[derive(Debug)]
pub struct Validation {
    pub passed: bool,
    /// Combined stdout + stderr.
    pub output: String,
}

/// Run `<binary> test <schema_file> <test_file>` and capture the result.
pub fn test_schema(
    binary: &Path,
    schema_file: &Path,
    test_file: &Path,
) -> Result<Validation, ValidationError> {
    if !binary.is_file() {
        return Err(ValidationError::BinaryMissing {
            path: binary.to_path_buf(),
        });
    }

    let result = Command::new(binary)
        .arg("test")
        .arg(schema_file)
        .arg(test_file)
        .output()
        .map_err(|source| ValidationError::Launch { source })?;

    let mut output = String::from_utf8_lossy(&result.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&result.stderr);
    if !stderr.trim().is_empty() {
        if !output.is_empty() && !output.ends_with('\n') {
            output.push('\n');
        }
        output.push_str(&stderr);
    }

    Ok(Validation {
        passed: result.status.success(),
        output,
    })
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    fn stub_binary(dir: &Path, script: &str) -> PathBuf {
        let path = dir.join("pantherlog");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(script.as_bytes()).unwrap();
        let mut perms = file.metadata().unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[test]
    fn zero_exit_is_a_pass_with_captured_output() {
        let dir = tempfile::tempdir().unwrap();
        let binary = stub_binary(dir.path(), "#!/bin/sh\necho PASS: $1 $2\nexit 0\n");
        let validation = test_schema(
            &binary,
            Path::new("vpn.yml"),
            Path::new("vpn_tests.yml"),
        )
        .unwrap();
        assert!(validation.passed);
        assert!(validation.output.contains("PASS: test vpn.yml"));
    }

    #[test]
    fn nonzero_exit_is_a_fail_and_stderr_is_captured() {
        let dir = tempfile::tempdir().unwrap();
        let binary = stub_binary(dir.path(), "#!/bin/sh\necho 'parse error' >&2\nexit 1\n");
        let validation = test_schema(
            &binary,
            Path::new("vpn.yml"),
            Path::new("vpn_tests.yml"),
        )
        .unwrap();
        assert!(!validation.passed);
        assert!(validation.output.contains("parse error"));
    }

    #[test]
    fn missing_binary_is_reported_before_launch() {
        let err = test_schema(
            Path::new("/no/such/pantherlog"),
            Path::new("vpn.yml"),
            Path::new("vpn_tests.yml"),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::BinaryMissing { .. }));
    }
}
