use super::*;

const FRAMES: [&str; 8] = ["⣷", "⣯", "⣟", "⡿", "⢿", "⣻", "⣽", "⣾"];
const FRAME_INTERVAL: Duration = Duration::from_millis(200);

pub(crate) trait StatusLine {
    fn status_line(&self) -> String;
}

struct Anchor;

impl Anchor {
    fn new() -> io::Result<Self> {
        let mut out = io::stdout();
        writeln!(out)?;
        write!(out, "\x1b[s")?;
        out.flush()?;
        Ok(Self)
    }

    fn redraw(&self, line: &str) -> io::Result<()> {
        let mut out = io::stdout();
        write!(out, "\x1b[u\x1b[2K\r{line}")?;
        out.flush()
    }
}

impl Drop for Anchor {
    fn drop(&mut self) {
        let _ = write!(io::stdout(), "\x1b[u\x1b[2K\r\n");
        let _ = io::stdout().flush();
    }
}

/// Reports `source` until cancelled: an animated status line when stdout is a
/// terminal, otherwise an `info!` line every `log_interval`.
pub(crate) fn spawn_status<F, T>(
    source: F,
    log_interval: Duration,
    cancel: CancellationToken,
    tasks: &mut JoinSet<()>,
) where
    F: Fn() -> T + Send + 'static,
    T: StatusLine,
{
    tasks.spawn(async move {
        let anchor = if io::stdout().is_terminal() {
            match Anchor::new() {
                Ok(anchor) => Some(anchor),
                Err(err) => {
                    warn!("Status line unavailable: {err}");
                    None
                }
            }
        } else {
            None
        };

        let mut ticker = interval(if anchor.is_some() {
            FRAME_INTERVAL
        } else {
            log_interval
        });
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;

        let mut frame = 0;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let line = source().status_line();

                    match &anchor {
                        Some(anchor) => {
                            let throbber = FRAMES[frame % FRAMES.len()];
                            frame = frame.wrapping_add(1);

                            if let Err(err) = anchor.redraw(&format!(" {throbber}  {line}")) {
                                debug!("Status redraw failed: {err}");
                            }
                        }
                        None => info!("{line}"),
                    }
                }
            }
        }
    });
}
