//! # Command Execution Module / 命令执行模块
//!
//! Spawning external processes and capturing their output, with an optional
//! deadline and cooperative cancellation.
//!
//! 派生外部进程并捕获其输出，支持可选的截止时间和协作式取消。

use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::infra::t;

/// How long the output readers may keep draining after the process was killed.
/// A grandchild still holding the pipes would otherwise block forever.
const KILL_DRAIN_GRACE: Duration = Duration::from_secs(2);

/// How a spawned process came to an end.
/// 派生进程的结束方式。
#[derive(Debug)]
pub enum ProcessEnd {
    /// The process exited on its own / 进程自行退出
    Exited(ExitStatus),
    /// The deadline passed and the process was killed / 超过截止时间，进程被终止
    TimedOut,
    /// The cancellation token fired and the process was killed / 取消令牌触发，进程被终止
    Cancelled,
    /// The process could not be started or waited on / 进程无法启动或等待
    Failed(std::io::Error),
}

/// Everything observed from one finished process.
/// 从一个已结束进程中观察到的全部内容。
#[derive(Debug)]
pub struct CapturedOutput {
    pub end: ProcessEnd,
    /// Output captured up to the end, also when the process was killed.
    /// 截至结束时捕获的输出，进程被终止时同样保留。
    pub stdout: String,
    pub stderr: String,
}

type SharedBuffer = Arc<Mutex<String>>;

/// Reads a pipe line by line into `buffer` until it is closed.
async fn read_lines<R: AsyncRead + Unpin>(pipe: R, buffer: SharedBuffer) {
    let mut lines = BufReader::new(pipe).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if let Ok(mut output) = buffer.lock() {
            output.push_str(&line);
            output.push('\n');
        }
    }
}

fn take(buffer: &SharedBuffer) -> String {
    buffer.lock().map(|mut output| std::mem::take(&mut *output)).unwrap_or_default()
}

/// Waits for a reader task; after a kill only for a short grace period.
async fn drain(handle: JoinHandle<()>, killed: bool) {
    if killed {
        let abort = handle.abort_handle();
        if tokio::time::timeout(KILL_DRAIN_GRACE, handle).await.is_err() {
            abort.abort();
        }
    } else {
        let _ = handle.await;
    }
}

/// Spawns a command and captures its stdout and stderr separately.
/// The output streams are drained concurrently while waiting for the process.
///
/// # Arguments
/// * `cmd` - The `tokio::process::Command` to execute
/// * `timeout` - Deadline after which the process is killed
/// * `cancel` - Token that kills the process when cancelled
///
/// Output printed before a timeout or a cancellation is kept.
///
/// 派生一个命令，分别捕获其 stdout 和 stderr。
/// 在等待进程的同时并发地读取输出流。超时或取消前打印的输出会被保留。
pub async fn spawn_and_capture(
    mut cmd: tokio::process::Command,
    timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> CapturedOutput {
    let mut child = match cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            return CapturedOutput {
                end: ProcessEnd::Failed(e),
                stdout: String::new(),
                stderr: String::new(),
            };
        }
    };

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return CapturedOutput {
            end: ProcessEnd::Failed(std::io::Error::other(t!("run.capture_failed").to_string())),
            stdout: String::new(),
            stderr: String::new(),
        };
    };

    let stdout_buffer = SharedBuffer::default();
    let stderr_buffer = SharedBuffer::default();
    let stdout_handle = tokio::spawn(read_lines(stdout, stdout_buffer.clone()));
    let stderr_handle = tokio::spawn(read_lines(stderr, stderr_buffer.clone()));

    let deadline = async {
        match timeout {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending().await,
        }
    };

    let end = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            let _ = child.kill().await;
            ProcessEnd::Cancelled
        }
        _ = deadline => {
            let _ = child.kill().await;
            ProcessEnd::TimedOut
        }
        status = child.wait() => match status {
            Ok(status) => ProcessEnd::Exited(status),
            Err(e) => ProcessEnd::Failed(e),
        },
    };

    // Wait for both readers so that all output is captured.
    // 等待两个读取任务完成，以确保所有输出都被捕获。
    let killed = !matches!(end, ProcessEnd::Exited(_));
    drain(stdout_handle, killed).await;
    drain(stderr_handle, killed).await;

    CapturedOutput {
        end,
        stdout: take(&stdout_buffer),
        stderr: take(&stderr_buffer),
    }
}

/// Keeps at most the last `max_lines` lines of `output`, for console details.
/// 最多保留 `output` 的最后 `max_lines` 行，用于控制台详情。
pub fn tail_lines(output: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}
