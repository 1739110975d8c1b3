use crossterm::{
    cursor::MoveToColumn,
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use log::debug;
use std::io::{stdout, Write};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Number of cells in the bar
pub const BAR_WIDTH: usize = 20;

/// Delay between repaints
pub const FRAME_INTERVAL: Duration = Duration::from_millis(80);

/// A single marker bouncing between the two ends of a fixed-width bar.
#[derive(Debug, Clone)]
pub struct BounceBar {
    width: usize,
    pos: usize,
    forward: bool,
}

impl BounceBar {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            pos: 0,
            forward: true,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// The bar contents for the current position, without brackets
    pub fn frame(&self) -> String {
        (0..self.width)
            .map(|i| if i == self.pos { '#' } else { ' ' })
            .collect()
    }

    /// Move the marker one cell, turning around at either end
    pub fn advance(&mut self) {
        if self.width == 1 {
            return;
        }
        if self.forward {
            self.pos += 1;
        } else {
            self.pos -= 1;
        }
        if self.pos == 0 || self.pos == self.width - 1 {
            self.forward = !self.forward;
        }
    }
}

/// Liveness indicator animated on its own task while a captured command runs.
///
/// It only ever writes to the terminal; the child's stdout is piped elsewhere.
/// [`Indicator::stop`] must be awaited before the captured output is used.
pub struct Indicator {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl Indicator {
    pub fn start(label: &str) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let label = label.to_string();

        let handle = tokio::spawn(async move {
            let mut bar = BounceBar::new(BAR_WIDTH);
            let mut out = stdout();
            loop {
                let _ = queue!(
                    out,
                    MoveToColumn(0),
                    Print(format!("{} [{}]", label, bar.frame()))
                );
                let _ = out.flush();
                bar.advance();

                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = tokio::time::sleep(FRAME_INTERVAL) => {}
                }
            }
            let _ = queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine));
            let _ = out.flush();
        });

        debug!("Indicator started");
        Self { stop_tx, handle }
    }

    /// Signal the task to stop and wait until the line has been cleared
    pub async fn stop(self) {
        let _ = self.stop_tx.send(());
        if let Err(e) = self.handle.await {
            debug!("Indicator task ended abnormally: {}", e);
        }
        debug!("Indicator stopped");
    }
}
