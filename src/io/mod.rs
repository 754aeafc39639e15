//! Where solver progress output is written.

use std::fs::File;
use std::io::{Error, ErrorKind, Result, Write};

/// Destination for the iteration log
#[derive(Default)]
pub(crate) enum PrintTarget {
    #[default]
    Stdout,
    File(File),
    Buffer(Vec<u8>),
    Stream(Box<dyn Write + Send + Sync>),
}

impl PrintTarget {
    fn name(&self) -> &'static str {
        match self {
            Self::Stdout => "Stdout",
            Self::File(_) => "File",
            Self::Buffer(_) => "Buffer",
            Self::Stream(_) => "Stream",
        }
    }

    // the writer behind everything except the in-memory buffer
    fn writer(&mut self) -> Option<Box<dyn Write + '_>> {
        match self {
            Self::Stdout => Some(Box::new(std::io::stdout())),
            Self::File(file) => Some(Box::new(file)),
            Self::Stream(stream) => Some(Box::new(stream)),
            Self::Buffer(_) => None,
        }
    }
}

impl std::fmt::Debug for PrintTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrintTarget::{}", self.name())
    }
}

impl Write for PrintTarget {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if let Self::Buffer(buffer) = self {
            buffer.extend_from_slice(buf);
            return Ok(buf.len());
        }
        match self.writer() {
            Some(mut w) => w.write(buf),
            None => Ok(0),
        }
    }

    fn flush(&mut self) -> Result<()> {
        match self.writer() {
            Some(mut w) => w.flush(),
            None => Ok(()),
        }
    }
}

/// Redirection of a solver's log output
pub trait ConfigurablePrintTarget {
    fn print_to_stdout(&mut self);
    fn print_to_file(&mut self, file: File);
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>);
    /// Collect output in memory, to be read with
    /// [`get_print_buffer`](Self::get_print_buffer)
    fn print_to_buffer(&mut self);
    /// Everything written since [`print_to_buffer`](Self::print_to_buffer)
    fn get_print_buffer(&mut self) -> Result<String>;
}

impl ConfigurablePrintTarget for PrintTarget {
    fn print_to_stdout(&mut self) {
        *self = Self::Stdout;
    }

    fn print_to_file(&mut self, file: File) {
        *self = Self::File(file);
    }

    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        *self = Self::Stream(stream);
    }

    fn print_to_buffer(&mut self) {
        *self = Self::Buffer(Vec::new());
    }

    fn get_print_buffer(&mut self) -> Result<String> {
        match self {
            Self::Buffer(buffer) => Ok(String::from_utf8_lossy(buffer).into_owned()),
            other => Err(Error::new(
                ErrorKind::Other,
                format!("output is going to {}, not a buffer", other.name()),
            )),
        }
    }
}
