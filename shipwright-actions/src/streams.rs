//! Standard streams handed to a step

use std::io::{self, Read, Write};
use std::process::ChildStdin;

/// stdin/stdout/stderr of a step invocation
///
/// The executor passes streams through untouched. `inherited` tells
/// subprocess-backed steps they may attach the child directly to the
/// terminal instead of copying through the boxed handles; otherwise they
/// feed `stdin` to the child with [`pipe_input`].
pub struct Streams {
    pub stdin: Box<dyn Read + Send>,
    pub stdout: Box<dyn Write + Send>,
    pub stderr: Box<dyn Write + Send>,
    inherited: bool,
}

impl Streams {
    /// The process's own standard streams
    pub fn inherit() -> Self {
        Self {
            stdin: Box::new(io::stdin()),
            stdout: Box::new(io::stdout()),
            stderr: Box::new(io::stderr()),
            inherited: true,
        }
    }

    /// Custom streams, e.g. buffers in tests
    pub fn new(
        stdin: Box<dyn Read + Send>,
        stdout: Box<dyn Write + Send>,
        stderr: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            stdin,
            stdout,
            stderr,
            inherited: false,
        }
    }

    /// Empty input, discarded output
    pub fn null() -> Self {
        Self::new(
            Box::new(io::empty()),
            Box::new(io::sink()),
            Box::new(io::sink()),
        )
    }

    pub fn is_inherited(&self) -> bool {
        self.inherited
    }
}

/// Copies `input` into a child's stdin, closing it at end of input
///
/// A child that exits without reading everything is not an error.
pub fn pipe_input<R: Read>(input: &mut R, child: Option<ChildStdin>) -> io::Result<()> {
    let Some(mut child) = child else {
        return Ok(());
    };

    match io::copy(input, &mut child) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Err(e) => Err(e),
    }
}

impl std::fmt::Debug for Streams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Streams")
            .field("inherited", &self.inherited)
            .finish_non_exhaustive()
    }
}
