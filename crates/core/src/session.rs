//! Interactive read-eval-print loop

use anyhow::Result;
use std::io::{BufRead, Write};

use crate::router::Router;
use crate::transcript::Transcript;
use crate::types::LogRecord;

/// True for the command that ends a session
pub fn is_exit_command(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("exit")
}

pub struct Session<'a> {
    router: &'a Router<'a>,
    transcript: &'a Transcript,
}

impl<'a> Session<'a> {
    pub fn new(router: &'a Router<'a>, transcript: &'a Transcript) -> Self {
        Self { router, transcript }
    }

    /// Run until `exit` or end of input.
    ///
    /// Only I/O errors on `input`/`output` end the loop early; transcript
    /// failures are reported and skipped. Invalid UTF-8 in a line is
    /// replaced with U+FFFD rather than ending the session.
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> Result<()> {
        writeln!(output, "{}", self.router.settings().variant.banner())?;
        writeln!(output, "Type 'exit' to quit.\n")?;

        let mut buf = Vec::new();
        loop {
            write!(output, "You: ")?;
            output.flush()?;

            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                writeln!(output)?;
                break;
            }

            let line = String::from_utf8_lossy(&buf);
            let user_input = line.trim_end_matches(['\r', '\n']);
            if is_exit_command(user_input) {
                break;
            }

            let response = self.router.respond(user_input).text();
            writeln!(output, "Assistant:\n{}\n", response)?;

            if let Err(e) = self.transcript.append(&LogRecord::now(user_input, &response)) {
                tracing::warn!("Logging error: {:#}", e);
            }
        }

        tracing::debug!(transcript = %self.transcript.path().display(), "Session ended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::Calculator;
    use crate::llm::LanguageModel;
    use crate::router::RouterSettings;
    use crate::translation::Translator;
    use crate::types::{ServiceError, Variant};
    use std::fs;
    use std::io::Cursor;

    struct EchoModel;

    impl LanguageModel for EchoModel {
        fn generate(&self, _prompt: &str) -> std::result::Result<String, ServiceError> {
            Ok("model reply".to_string())
        }
    }

    struct NoTranslator;

    impl Translator for NoTranslator {
        fn translate(&self, _phrase: &str) -> std::result::Result<String, ServiceError> {
            Err(ServiceError::EmptyResponse)
        }
    }

    fn run_session(script: &str, transcript: &Transcript) -> String {
        let router = Router::new(
            RouterSettings::for_variant(Variant::Agent),
            &Calculator,
            &NoTranslator,
            &EchoModel,
        );
        let session = Session::new(&router, transcript);

        let mut output = Vec::new();
        session.run(Cursor::new(script), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_exit_command() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("  EXIT \n"));
        assert!(is_exit_command("Exit"));
        assert!(!is_exit_command("exit now"));
        assert!(!is_exit_command(""));
    }

    #[test]
    fn test_session_round_trip() {
        let path = std::env::temp_dir().join("agent_router_session_test.txt");
        fs::remove_file(&path).ok();
        let transcript = Transcript::new(&path);

        let output = run_session("add 45 and 30\nhello\nEXIT\nnever read\n", &transcript);

        assert!(output.starts_with("🔴 Gemini Agentic Assistant (Level 3)\nType 'exit' to quit.\n\n"));
        assert!(output.contains("You: Assistant:\n45 + 30 = 75\n\n"));
        assert!(output.contains("Assistant:\nmodel reply\n\n"));
        assert!(!output.contains("never read"));

        let logged = fs::read_to_string(&path).unwrap();
        assert!(logged.contains("You: add 45 and 30\nAssistant: 45 + 30 = 75\n"));
        assert!(logged.contains("You: hello\nAssistant: model reply\n"));
        assert_eq!(logged.matches("You: ").count(), 2);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_session_ends_on_eof() {
        let path = std::env::temp_dir().join("agent_router_session_eof_test.txt");
        fs::remove_file(&path).ok();
        let transcript = Transcript::new(&path);

        let output = run_session("1+1", &transcript);
        assert!(output.contains("1+1 = 2"));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_invalid_utf8_line_does_not_end_session() {
        let path = std::env::temp_dir().join("agent_router_session_utf8_test.txt");
        fs::remove_file(&path).ok();
        let transcript = Transcript::new(&path);
        let router = Router::new(
            RouterSettings::for_variant(Variant::Agent),
            &Calculator,
            &NoTranslator,
            &EchoModel,
        );

        let mut output = Vec::new();
        let result = Session::new(&router, &transcript)
            .run(Cursor::new(&b"caf\xe9\n2+2\nexit\n"[..]), &mut output);
        assert!(result.is_ok());

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Assistant:\nmodel reply\n"));
        assert!(output.contains("2+2 = 4"));

        let logged = fs::read_to_string(&path).unwrap();
        assert!(logged.contains("You: caf\u{FFFD}\n"));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_transcript_failure_does_not_stop_session() {
        let transcript = Transcript::new(
            std::env::temp_dir()
                .join("agent_router_missing_dir")
                .join("log.txt"),
        );

        let output = run_session("2*3\n4*5\nexit\n", &transcript);
        assert!(output.contains("2*3 = 6"));
        assert!(output.contains("4*5 = 20"));
    }
}
