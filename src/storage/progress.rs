/// Byte-counting reader for upload progress
///
/// Wraps the file being uploaded and reports the transferred fraction as the
/// storage client pulls bytes: `100 * transferred / total`, rounded down,
/// emitted only when the integer percent changes.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

use super::client::ProgressFn;

pub struct ProgressReader<R> {
    inner: R,
    total: u64,
    transferred: u64,
    last_emitted: Option<u8>,
    on_progress: ProgressFn,
}

impl<R> ProgressReader<R> {
    pub fn new(inner: R, total: u64, on_progress: ProgressFn) -> Self {
        Self {
            inner,
            total,
            transferred: 0,
            last_emitted: None,
            on_progress,
        }
    }

    fn emit(&mut self) {
        let percent = if self.total == 0 {
            // an empty upload has nothing to count, it is simply done
            100
        } else {
            (self.transferred.saturating_mul(100) / self.total).min(100) as u8
        };

        if self.last_emitted != Some(percent) {
            self.last_emitted = Some(percent);
            (self.on_progress)(percent);
        }
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ProgressReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();

        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(Ok(())) => {
                let read = buf.filled().len() - before;
                if read > 0 {
                    this.transferred += read as u64;
                    this.emit();
                } else if this.total == 0 {
                    this.emit();
                }
                Poll::Ready(Ok(()))
            }
            other => other,
        }
    }
}
