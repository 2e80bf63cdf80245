use core::fmt::Display;
use std::io::Write;

/// Where a command sends its report, its diagnostics, and its exit status.
///
/// Commands never touch the process streams directly so the whole CLI can run
/// against in-memory buffers.
pub trait Host: Send + Sync {
    /// Receives the decoded directive or the resolved targets.
    fn output(&mut self) -> impl Write;

    /// Receives diagnostics.
    fn error(&mut self) -> impl Write;

    /// Ends the run with `code`.
    fn exit(&mut self, code: i32);

    /// Write a single-line diagnostic.
    fn diagnose(&mut self, message: impl Display) {
        let _ = writeln!(self.error(), "❌ {message}");
    }

    /// Write a diagnostic and end the run with status 1.
    fn fail(&mut self, message: impl Display) {
        self.diagnose(message);
        self.exit(1);
    }
}

/// Captures everything a command reports.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct TestHost {
    pub output_buf: Vec<u8>,
    pub error_buf: Vec<u8>,
    pub exit_code: Option<i32>,
}

#[cfg(test)]
impl TestHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output_buf).into_owned()
    }

    pub fn error_str(&self) -> String {
        String::from_utf8_lossy(&self.error_buf).into_owned()
    }
}

#[cfg(test)]
impl Host for TestHost {
    fn output(&mut self) -> impl Write {
        &mut self.output_buf
    }

    fn error(&mut self) -> impl Write {
        &mut self.error_buf
    }

    fn exit(&mut self, code: i32) {
        self.exit_code = Some(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_go_to_the_error_stream() {
        let mut host = TestHost::new();
        host.diagnose("com.acme.Service.run(): no such argument");

        assert_eq!(host.error_str(), "❌ com.acme.Service.run(): no such argument\n");
        assert!(host.output_str().is_empty());
        assert_eq!(host.exit_code, None);
    }

    #[test]
    fn fail_exits_with_status_one() {
        let mut host = TestHost::new();
        host.fail(format_args!("directive is missing its {}", "template"));

        assert_eq!(host.error_str(), "❌ directive is missing its template\n");
        assert_eq!(host.exit_code, Some(1));
    }
}
