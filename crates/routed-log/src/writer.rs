//! Writer implementations for output paths

// Standard library
use std::io;
use std::path::Path;
use std::sync::Mutex;

// External dependencies
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{MakeWriter, writer::BoxMakeWriter, writer::MakeWriterExt};

// Internal crates
use crate::core::{LogError, LogResult};

/// Create one writer that tees every record to all `paths`.
///
/// `"stdout"` and `"stderr"` name the process streams; anything else is a file
/// opened in append mode and created if missing. An empty list discards
/// output.
pub fn make_writer(paths: &[String]) -> LogResult<BoxMakeWriter> {
    let mut writers = paths.iter().map(|path| destination(path));

    let Some(first) = writers.next().transpose()? else {
        return Ok(BoxMakeWriter::new(io::sink));
    };

    writers.try_fold(first, |tee, next| -> LogResult<BoxMakeWriter> {
        Ok(BoxMakeWriter::new(tee.and(next?)))
    })
}

fn destination(path: &str) -> LogResult<BoxMakeWriter> {
    match path {
        "stdout" => Ok(BoxMakeWriter::new(Mutex::new(io::stdout()))),
        "stderr" => Ok(BoxMakeWriter::new(Mutex::new(io::stderr()))),
        _ => open_file(Path::new(path))
            .map(BoxMakeWriter::new)
            .map_err(|e| LogError::backend(path, e)),
    }
}

fn open_file(path: &Path) -> io::Result<impl for<'a> MakeWriter<'a> + Send + Sync + 'static> {
    let prefix = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "output path has no file name")
    })?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(prefix.to_string_lossy())
        .build(dir)
        .map_err(io::Error::other)
}
