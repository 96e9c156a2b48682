//! Level-based stream splitting
//!
//! [`StreamRouter`] is a [`MakeWriter`] that hands out one of two writers per
//! record depending on its level. Error-tier records go to the error stream
//! (stderr by default), everything else to the normal stream (stdout by
//! default). The formatter in front of it is shared, so both streams receive
//! identically encoded records.
//!
//! When the router is active it replaces the configured output paths
//! entirely.

use std::io::{self, Stderr, Stdout};
use std::sync::Mutex;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::{MakeWriter, writer::EitherWriter};

/// Routing bucket for a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Below the error threshold
    Normal,
    /// At or above the error threshold
    Error,
}

impl Tier {
    /// Classify `level` against `threshold`.
    ///
    /// A record exactly at the threshold is error-tier.
    #[must_use]
    pub fn classify(level: Level, threshold: Level) -> Self {
        // tracing orders levels by verbosity: ERROR < WARN < ... < TRACE
        if level <= threshold {
            Self::Error
        } else {
            Self::Normal
        }
    }
}

/// Writer factory that sends each record to one of two streams
#[derive(Debug)]
pub struct StreamRouter<N, E> {
    normal: N,
    error: E,
    threshold: Level,
}

impl StreamRouter<Mutex<Stdout>, Mutex<Stderr>> {
    /// Route to the process's stdout and stderr
    #[must_use]
    pub fn stdio() -> Self {
        Self::locked(io::stdout(), io::stderr())
    }
}

impl<N, E> StreamRouter<Mutex<N>, Mutex<E>>
where
    N: io::Write,
    E: io::Write,
{
    /// Route to two plain writers, each behind its own lock.
    ///
    /// A record holds its stream's lock for the whole write, so concurrent
    /// callers never interleave within a record.
    pub fn locked(normal: N, error: E) -> Self {
        Self::new(Mutex::new(normal), Mutex::new(error))
    }
}

impl<N, E> StreamRouter<N, E> {
    /// Route between two writer factories with the default `ERROR` threshold
    pub fn new(normal: N, error: E) -> Self {
        Self {
            normal,
            error,
            threshold: Level::ERROR,
        }
    }

    /// Change the level at which records move to the error stream
    #[must_use]
    pub fn with_threshold(mut self, threshold: Level) -> Self {
        self.threshold = threshold;
        self
    }

    /// Current error threshold
    pub fn threshold(&self) -> Level {
        self.threshold
    }
}

impl<'a, N, E> MakeWriter<'a> for StreamRouter<N, E>
where
    N: MakeWriter<'a>,
    E: MakeWriter<'a>,
{
    type Writer = EitherWriter<N::Writer, E::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        EitherWriter::A(self.normal.make_writer())
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        match Tier::classify(*meta.level(), self.threshold) {
            Tier::Normal => EitherWriter::A(self.normal.make_writer_for(meta)),
            Tier::Error => EitherWriter::B(self.error.make_writer_for(meta)),
        }
    }
}
