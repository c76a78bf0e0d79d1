//! Human-readable descriptions of autopkgtest exit codes.

/// Describe an autopkgtest exit code. Never fails; unknown codes get a
/// fallback description naming the code.
pub fn describe(code: i64) -> String {
    let known = match code {
        0 => "all tests passed",
        2 => "at least one test was skipped (or at least one flaky test failed)",
        4 => "at least one test failed",
        6 => "at least one test failed and at least one test skipped",
        8 => "no tests in this package, or all non-superficial tests were skipped",
        12 => "erroneous package",
        14 => "erroneous package and at least one test skipped",
        16 => "testbed failure",
        20 => "other unexpected failures including bad usage",
        _ => return format!("unknown exit code {code}"),
    };
    known.to_string()
}
