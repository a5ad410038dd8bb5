// Unit tests for holder module private functions
// Integration tests for find_port_holder are in integration_tests/listen/holder.rs

use crate::listen::holder::{format_command, with_process};

/// **VALUE**: Tests that `with_process()` + `format_command()` read our own process.
///
/// **WHY THIS MATTERS**: The lock-conflict report names the holder's command line. If reading
/// a live process fails, the report silently loses its most useful detail.
///
/// **BUG THIS CATCHES**: Would catch if the targeted process refresh stops loading the
/// command line.
#[test]
fn given_own_pid_when_format_command_called_then_returns_command_string() {
    // GIVEN: Our own PID
    let our_pid = std::process::id();

    // WHEN: Formatting its command
    let result = with_process(our_pid, format_command);

    // THEN: Should find the process with a non-empty command line
    let cmd = result.expect("Should find our own process");
    assert!(!cmd.is_empty(), "Command string should not be empty");

    // AND: It names the running test binary
    let exe = std::env::current_exe().expect("current exe");
    let exe_name = exe
        .file_name()
        .expect("exe file name")
        .to_string_lossy()
        .to_string();
    assert!(cmd.contains(&exe_name), "Expected {exe_name} in {cmd}");
}

/// **VALUE**: Tests that `with_process()` handles non-existent PIDs.
///
/// **WHY THIS MATTERS**: The holder can exit between the socket scan and the process read.
///
/// **BUG THIS CATCHES**: Would catch a panic or error instead of `None`.
#[test]
fn given_nonexistent_pid_when_with_process_called_then_returns_none() {
    // GIVEN: A PID that doesn't exist
    let fake_pid = u32::MAX;

    // WHEN: Calling with_process
    let result = with_process(fake_pid, |_| true);

    // THEN: Should return None
    assert!(result.is_none(), "Should return None for non-existent PID");
}
