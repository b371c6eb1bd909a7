//! Pluggable output streams.
//!
//! An [`App`](crate::App) writes through two [`Stream`]s, one for regular
//! output and one for errors. They default to the process's stdout and
//! stderr; tests swap in a [`Buffer`] to capture what was written.

use std::cell::{RefCell, RefMut};
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};

/// A shared, writable output handle.
#[derive(Clone)]
pub struct Stream(Rc<RefCell<Box<dyn Write>>>);

impl Stream {
    pub fn new<W: Write + 'static>(writer: W) -> Self {
        Self(Rc::new(RefCell::new(Box::new(writer))))
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Borrows the underlying writer until the guard is dropped.
    ///
    /// Writing through the `Stream` itself borrows only per call; prefer it
    /// whenever the handle may outlive a nested dispatch.
    ///
    /// # Panics
    ///
    /// Panics if the writer is already borrowed, i.e. when called while a
    /// previous handle from `lock` is still alive.
    pub fn lock(&self) -> RefMut<'_, Box<dyn Write>> {
        self.0.borrow_mut()
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().flush()
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream").finish_non_exhaustive()
    }
}

/// In-memory sink that keeps everything written to it.
///
/// Clones share the same bytes, so one clone can be handed to an app (or to a
/// tracing subscriber) while another is kept to read the output back.
///
/// ```rust
/// use std::io::Write;
/// use sprout::Buffer;
///
/// let buffer = Buffer::new();
/// let mut writer = buffer.clone();
/// write!(writer, "hello").unwrap();
/// assert_eq!(buffer.contents(), "hello");
/// ```
#[derive(Clone, Default)]
pub struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Buffer").field(&self.contents()).finish()
    }
}
