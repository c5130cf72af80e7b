//! Line feeder: reads log input and forwards each line to the collector.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use pgerr_collector::LogEntry;

/// Boxed line source: a file or stdin.
pub type LineReader = Box<dyn AsyncBufRead + Unpin + Send>;

/// Open the configured input. `-` means stdin.
pub async fn open(path: &str) -> anyhow::Result<LineReader> {
    if path == "-" {
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }
    let file = tokio::fs::File::open(path).await?;
    Ok(Box::new(BufReader::new(file)))
}

/// Forward every line of `reader` into `sender`, in order.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, so a
/// stray LATIN1 statement does not end ingestion. Returns the number of
/// lines forwarded once the input is exhausted, a read fails, or the
/// collector side has gone away. Waits when the collector's buffer is full.
pub async fn run<R>(mut reader: R, sender: mpsc::Sender<LogEntry>) -> u64
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut forwarded = 0;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(trim_newline(&buf)).into_owned();
                if sender.send(LogEntry::new(line)).await.is_err() {
                    tracing::warn!("collector channel closed, stopping input");
                    break;
                }
                forwarded += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read log input");
                break;
            }
        }
    }

    tracing::debug!(lines = forwarded, "log input exhausted");
    forwarded
}

/// Strip a trailing `\n` or `\r\n`.
fn trim_newline(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
