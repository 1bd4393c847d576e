//! Log lines written while the tick progress bar is drawn would otherwise leave pieces of the
//! bar behind on the same line.

use log::Record;
use log4rs::encode::{Encode, Write};

/// Wraps another encoder and clears the current console line before each record.
#[derive(Debug)]
pub struct PBWrapperEncoder {
    inner: Box<dyn Encode>,
}

impl PBWrapperEncoder {
    pub fn new(inner: Box<dyn Encode>) -> Self {
        Self { inner }
    }
}

impl Encode for PBWrapperEncoder {
    fn encode(&self, w: &mut dyn Write, record: &Record) -> Result<(), anyhow::Error> {
        // Erase the line, return the cursor to column zero.
        w.write_all(b"\x1B[2K\r")?;
        self.inner.encode(w, record)
    }
}
