//! Child-process session backed by tokio.

use std::io::Write;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use log::{debug, trace, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tokio::time;

use super::buffer::OutputBuffer;
use super::config::SpawnConfig;
use super::patterns::PromptSet;
use super::{Session, Wait};
use crate::error::{Result, SessionError};

/// A live interactive session with a spawned child process.
///
/// stdout and stderr are drained concurrently into one channel, so the
/// session sees a single combined output stream and neither pipe can fill
/// up and stall the child. The child is killed on drop, so no error path
/// leaks a running process.
pub struct ProcessSession {
    child: Child,
    stdin: Option<ChildStdin>,
    output: mpsc::Receiver<std::io::Result<Vec<u8>>>,
    buffer: OutputBuffer,
    echo: bool,
    eof: bool,
}

impl ProcessSession {
    /// Spawn the configured command and attach to its streams.
    pub fn spawn(config: &SpawnConfig) -> Result<Self> {
        let mut cmd = Command::new(&config.program);
        cmd.args(&config.args)
            .current_dir(&config.current_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in &config.env {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn().map_err(|source| SessionError::Spawn {
            program: config.program.clone(),
            source,
        })?;
        debug!("Spawned '{}' in {}", config.command_line(), config.dir().display());

        let stdin = child
            .stdin
            .take()
            .ok_or(SessionError::PipeUnavailable { stream: "stdin" })?;
        let stdout = child
            .stdout
            .take()
            .ok_or(SessionError::PipeUnavailable { stream: "stdout" })?;
        let stderr = child
            .stderr
            .take()
            .ok_or(SessionError::PipeUnavailable { stream: "stderr" })?;

        let (tx, output) = mpsc::channel(32);
        tokio::spawn(pump(stdout, tx.clone()));
        tokio::spawn(pump(stderr, tx));

        Ok(Self {
            child,
            stdin: Some(stdin),
            output,
            buffer: OutputBuffer::default(),
            echo: config.echo,
            eof: false,
        })
    }

    /// Mirror a raw chunk to our stdout, before ANSI stripping, so the
    /// operator sees the tool's own rendering.
    fn echo_chunk(&self, chunk: &[u8]) {
        if !self.echo {
            return;
        }
        let mut stdout = std::io::stdout().lock();
        if let Err(err) = stdout.write_all(chunk).and_then(|()| stdout.flush()) {
            warn!("Failed to mirror child output: {err}");
        }
    }
}

impl Session for ProcessSession {
    async fn expect(&mut self, prompts: &PromptSet, timeout: Duration) -> Result<Wait> {
        let deadline = time::Instant::now() + timeout;

        loop {
            if let Some(m) = prompts.find_earliest(self.buffer.as_slice()) {
                let text =
                    String::from_utf8_lossy(&self.buffer.as_slice()[m.start..m.end]).into_owned();
                self.buffer.consume(m.end);
                trace!("Pattern {} matched: {text:?}", m.index);
                return Ok(Wait::Matched {
                    index: m.index,
                    text,
                });
            }
            self.buffer.trim();

            if self.eof {
                return Ok(Wait::Eof);
            }

            let received = time::timeout_at(deadline, self.output.recv()).await;
            match received {
                Err(_) => return Ok(Wait::TimedOut),
                Ok(None) => {
                    debug!("Child closed its output streams");
                    self.eof = true;
                }
                Ok(Some(Ok(chunk))) => {
                    self.echo_chunk(&chunk);
                    self.buffer.push(&chunk);
                }
                Ok(Some(Err(err))) => return Err(SessionError::Io(err).into()),
            }
        }
    }

    async fn send_line(&mut self, line: &str) -> Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or(SessionError::PipeUnavailable { stream: "stdin" })?;
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(SessionError::Io)?;
        stdin.write_all(b"\n").await.map_err(SessionError::Io)?;
        stdin.flush().await.map_err(SessionError::Io)?;
        Ok(())
    }

    async fn close(&mut self, timeout: Duration) -> Result<ExitStatus> {
        // EOF on stdin, so a child still blocked on input can finish.
        drop(self.stdin.take());

        match time::timeout(timeout, self.child.wait()).await {
            Ok(status) => Ok(status.map_err(SessionError::Io)?),
            Err(_) => {
                warn!("Child still running after {timeout:?}, killing it");
                if let Err(err) = self.child.start_kill() {
                    debug!("Kill after exit timeout failed: {err}");
                }
                let _ = self.child.wait().await;
                Err(SessionError::ExitTimeout(timeout).into())
            }
        }
    }

    async fn terminate(&mut self) -> Result<()> {
        match self.child.start_kill() {
            Ok(()) => {}
            // Already exited; nothing to kill.
            Err(err) if err.kind() == std::io::ErrorKind::InvalidInput => {}
            Err(err) => return Err(SessionError::Io(err).into()),
        }
        self.child.wait().await.map_err(SessionError::Io)?;
        Ok(())
    }
}

/// Drain one child stream into the combined output channel.
async fn pump<R: AsyncRead + Unpin>(mut reader: R, tx: mpsc::Sender<std::io::Result<Vec<u8>>>) {
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                if tx.send(Ok(chunk[..n].to_vec())).await.is_err() {
                    break;
                }
            }
            Err(err) => {
                let _ = tx.send(Err(err)).await;
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tokio_test::assert_ok;

    fn sh(script: &str) -> SpawnConfig {
        SpawnConfig::new("sh").args(["-c", script]).echo(false)
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let config = SpawnConfig::new("definitely-not-a-real-binary").echo(false);
        let err = match ProcessSession::spawn(&config) {
            Ok(_) => panic!("spawn unexpectedly succeeded"),
            Err(err) => err,
        };
        match err {
            Error::Session(SessionError::Spawn { program, .. }) => {
                assert_eq!(program, "definitely-not-a-real-binary");
            }
            other => panic!("expected spawn error, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_prompt_round_trip() {
        let mut session = ProcessSession::spawn(&sh(
            r#"echo 'table "users" created or renamed'; read answer; echo done"#,
        ))
        .unwrap();
        let prompts = PromptSet::compile(&["table .*created or renamed"]).unwrap();

        let wait = session
            .expect(&prompts, Duration::from_secs(5))
            .await
            .unwrap();
        match wait {
            Wait::Matched { index, ref text } => {
                assert_eq!(index, 0);
                assert!(text.contains("users"));
            }
            other => panic!("expected match, got {other:?}"),
        }

        assert_ok!(session.send_line("").await);
        let wait = session
            .expect(&PromptSet::empty(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(wait, Wait::Eof);

        let status = session.close(Duration::from_secs(5)).await.unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn test_env_overlay_reaches_child() {
        let mut session = ProcessSession::spawn(
            &sh("echo \"mode=$APP_MODE\"").env("APP_MODE", "production"),
        )
        .unwrap();
        let prompts = PromptSet::compile(&["mode=production"]).unwrap();

        let wait = session
            .expect(&prompts, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(matches!(wait, Wait::Matched { index: 0, .. }));

        session.close(Duration::from_secs(5)).await.unwrap();
    }

    #[tokio::test]
    async fn test_nonzero_exit_status() {
        let mut session = ProcessSession::spawn(&sh("exit 3")).unwrap();

        let wait = session
            .expect(&PromptSet::empty(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(wait, Wait::Eof);

        let status = session.close(Duration::from_secs(5)).await.unwrap();
        assert_eq!(status.code(), Some(3));
    }

    #[tokio::test]
    async fn test_silent_child_times_out() {
        let mut session = ProcessSession::spawn(&sh("sleep 5")).unwrap();

        let wait = session
            .expect(&PromptSet::empty(), Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(wait, Wait::TimedOut);

        assert_ok!(session.terminate().await);
    }

    #[tokio::test]
    async fn test_stderr_merged_into_stream() {
        let mut session = ProcessSession::spawn(&sh("echo oops >&2")).unwrap();
        let prompts = PromptSet::compile(&["oops"]).unwrap();

        let wait = session
            .expect(&prompts, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(matches!(wait, Wait::Matched { index: 0, .. }));

        session.close(Duration::from_secs(5)).await.unwrap();
    }
}
