// Path: crates/node/src/signals.rs
use std::fmt;
use std::future::Future;

/// A process termination request. Both kinds are handled identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    /// `SIGINT`, or Ctrl-C.
    Interrupt,
    /// `SIGTERM`.
    Terminate,
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => f.write_str("SIGINT"),
            Self::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Somewhere termination requests come from.
pub trait TerminationSource {
    /// Resolves with the next termination request. Dropping the future
    /// before it resolves loses no request.
    fn next_signal(&mut self) -> impl Future<Output = TerminationSignal>;
}

/// Listens for `SIGINT` and `SIGTERM`.
///
/// Handlers are installed by [`TerminationSignals::install`], so a signal
/// that arrives before [`recv`](TerminationSignals::recv) is awaited is
/// still delivered.
pub struct TerminationSignals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl TerminationSignals {
    /// Installs the handlers.
    #[cfg(unix)]
    pub fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Installs the handlers.
    #[cfg(not(unix))]
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {})
    }

    /// Waits for the next termination request.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> TerminationSignal {
        tokio::select! {
            _ = self.interrupt.recv() => TerminationSignal::Interrupt,
            _ = self.terminate.recv() => TerminationSignal::Terminate,
        }
    }

    /// Waits for the next termination request.
    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> TerminationSignal {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
        TerminationSignal::Interrupt
    }
}

impl TerminationSource for TerminationSignals {
    fn next_signal(&mut self) -> impl Future<Output = TerminationSignal> {
        self.recv()
    }
}
