//! MONO bitmap row packer.
//!
//! Packs rows of 0/1 pixel values MSB-first into bytes, as used for font and
//! glyph bitmaps sent to [`PixelFormat::Mono`](crate::PixelFormat::Mono)
//! screens. The output is byte-compatible with the existing bitmap tooling,
//! including how it decides whether a row needs a trailing partial byte:
//!
//! - The packer keeps one `written` flag for its whole lifetime. It is cleared
//!   after every bit and set when that bit completes a byte.
//! - At the end of a row a partial byte is emitted only if the flag is clear.
//!   A row whose length is a multiple of 8 therefore gets no padding byte,
//!   while any other non-empty row gets exactly one.
//! - An empty row does not touch the flag, so it inherits the previous row's
//!   decision: it emits a single `0x00` after a padded row and nothing after a
//!   byte-aligned one. An empty first row has no flag to inherit and fails
//!   with [`PackError::UnsetWrittenFlag`].
//!
//! # Example
//!
//! ```
//! use vlcd_pixelbuffer::MonoRowPacker;
//!
//! let mut packer = MonoRowPacker::new();
//! packer.push_row(&[1, 0, 1, 0, 1, 0, 1, 0, 1]).unwrap();
//! assert_eq!(packer.finish(), vec![0xAA, 0x80]);
//! ```

/// Errors raised while packing rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PackError {
    /// An empty row was packed before any bit set the row-padding flag.
    #[error("empty first row: row padding flag was never set")]
    UnsetWrittenFlag,
}

/// Incremental MSB-first packer for rows of single-bit pixels.
#[derive(Debug, Clone, Default)]
pub struct MonoRowPacker {
    out: Vec<u8>,
    written: Option<bool>,
}

impl MonoRowPacker {
    /// Creates an empty packer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Packs one row. Any non-zero value is a set bit.
    pub fn push_row(&mut self, row: &[u8]) -> Result<(), PackError> {
        let mut value = 0u8;
        let mut remaining = 8u32;

        for &bit in row {
            remaining -= 1;
            if bit != 0 {
                value |= 1 << remaining;
            }
            self.written = Some(false);
            if remaining == 0 {
                self.out.push(value);
                self.written = Some(true);
                value = 0;
                remaining = 8;
            }
        }

        match self.written {
            Some(false) => self.out.push(value),
            Some(true) => {}
            None => return Err(PackError::UnsetWrittenFlag),
        }
        Ok(())
    }

    /// Packs every row of a bitmap in order.
    pub fn push_rows<'a, I>(&mut self, rows: I) -> Result<(), PackError>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        rows.into_iter().try_for_each(|row| self.push_row(row))
    }

    /// Bytes packed so far.
    pub fn bytes(&self) -> &[u8] {
        &self.out
    }

    /// Consumes the packer, returning the packed bytes.
    pub fn finish(self) -> Vec<u8> {
        self.out
    }
}
