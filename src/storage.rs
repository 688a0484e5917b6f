//! Persistent-storage collaborator seam.
//!
//! The filesystem (FatFs on SD over SSI on the original board) lives
//! outside this crate. Sessions drive an open file through [`StorageFile`];
//! the transfer unit is one slot's worth of bytes (1024) per call, plus the
//! 44-byte container header.

/// An open file on the storage collaborator.
///
/// Short reads/writes are allowed; the sessions loop until satisfied. Errors
/// abort the current file operation and propagate upward.
pub trait StorageFile {
    /// Error surfaced by the storage driver.
    type Error;

    /// Read up to `buf.len()` bytes from the current position. Returns the
    /// number of bytes read; 0 means end of file.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write up to `buf.len()` bytes at the current position. Returns the
    /// number of bytes written.
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;

    /// Move the current position to an absolute byte offset.
    fn seek(&mut self, pos: u32) -> Result<(), Self::Error>;
}

/// Fixed-capacity in-memory file used by the session and pipeline tests.
#[cfg(test)]
pub(crate) struct MemFile<const CAP: usize> {
    pub data: [u8; CAP],
    pub len: usize,
    pos: usize,
}

#[cfg(test)]
impl<const CAP: usize> MemFile<CAP> {
    pub fn new() -> Self {
        MemFile {
            data: [0; CAP],
            len: 0,
            pos: 0,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut file = MemFile::new();
        file.data[..bytes.len()].copy_from_slice(bytes);
        file.len = bytes.len();
        file
    }

    pub fn contents(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

#[cfg(test)]
impl<const CAP: usize> StorageFile for MemFile<CAP> {
    type Error = core::convert::Infallible;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let available = self.len.saturating_sub(self.pos);
        let n = available.min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(CAP - self.pos);
        self.data[self.pos..self.pos + n].copy_from_slice(&buf[..n]);
        self.pos += n;
        self.len = self.len.max(self.pos);
        Ok(n)
    }

    fn seek(&mut self, pos: u32) -> Result<(), Self::Error> {
        self.pos = (pos as usize).min(CAP);
        Ok(())
    }
}
