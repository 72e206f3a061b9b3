//! Field-level encoding shared by the per-kind node codecs.
//!
//! Every node blob is `version` followed by a fixed list of fields. Child
//! nodes are embedded as length-prefixed blobs of their own, each carrying its
//! own version tag.

mod block;
mod dir;
mod file;

pub use block::{decode_block, encode_block};
pub use dir::{MAX_DIR_DEPTH, decode_dir, decode_dir_into, encode_dir};
pub use file::{decode_file, decode_file_into, encode_file};

use checksums::{STRONG_LEN, StrongSum};

use crate::error::CodecError;
use crate::varint::{
    VARLONG_MIN_BYTES, decode_varint, decode_varlong, encode_varint_to_vec, encode_varlong_to_vec,
};
use crate::version::{NODE_FORMAT_VERSION, check_version};

/// Appends fields to a node blob.
#[derive(Debug, Default)]
pub(crate) struct FieldWriter {
    out: Vec<u8>,
}

impl FieldWriter {
    /// Starts a blob with the version tag.
    pub(crate) fn versioned() -> Self {
        let mut writer = Self::default();
        encode_varint_to_vec(NODE_FORMAT_VERSION, &mut writer.out);
        writer
    }

    pub(crate) fn count(&mut self, len: usize) -> Result<(), CodecError> {
        let value = i32::try_from(len).map_err(|_| CodecError::LengthOverflow {
            len: i64::try_from(len).unwrap_or(i64::MAX),
        })?;
        encode_varint_to_vec(value, &mut self.out);
        Ok(())
    }

    pub(crate) fn u64(&mut self, value: u64) -> Result<(), CodecError> {
        let value = i64::try_from(value).map_err(|_| CodecError::LengthOverflow { len: i64::MAX })?;
        encode_varlong_to_vec(value, VARLONG_MIN_BYTES, &mut self.out);
        Ok(())
    }

    pub(crate) fn u32(&mut self, value: u32) {
        self.out.extend_from_slice(&value.to_le_bytes());
    }

    pub(crate) fn bytes(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        self.count(bytes.len())?;
        self.out.extend_from_slice(bytes);
        Ok(())
    }

    pub(crate) fn name(&mut self, name: &str) -> Result<(), CodecError> {
        self.bytes(name.as_bytes())
    }

    pub(crate) fn strong(&mut self, strong: &StrongSum) -> Result<(), CodecError> {
        self.bytes(strong.as_bytes())
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.out
    }
}

/// Consumes fields from the front of a node blob.
#[derive(Debug)]
pub(crate) struct FieldReader<'a> {
    input: &'a [u8],
}

impl<'a> FieldReader<'a> {
    /// Reads and checks the version tag before anything else.
    pub(crate) fn versioned(input: &'a [u8]) -> Result<Self, CodecError> {
        let mut reader = Self { input };
        let (version, rest) = decode_varint(reader.input)?;
        reader.input = rest;
        check_version(version)?;
        Ok(reader)
    }

    pub(crate) fn count(&mut self) -> Result<usize, CodecError> {
        let (value, rest) = decode_varint(self.input)?;
        self.input = rest;
        usize::try_from(value).map_err(|_| CodecError::LengthOverflow {
            len: i64::from(value),
        })
    }

    pub(crate) fn u64(&mut self) -> Result<u64, CodecError> {
        let (value, rest) = decode_varlong(self.input, VARLONG_MIN_BYTES)?;
        self.input = rest;
        u64::try_from(value).map_err(|_| CodecError::LengthOverflow { len: value })
    }

    pub(crate) fn u32(&mut self) -> Result<u32, CodecError> {
        let Some((field, rest)) = self.input.split_first_chunk::<4>() else {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
        };
        self.input = rest;
        Ok(u32::from_le_bytes(*field))
    }

    pub(crate) fn bytes(&mut self) -> Result<&'a [u8], CodecError> {
        let len = self.count()?;
        self.take(len)
    }

    pub(crate) fn name(&mut self) -> Result<&'a str, CodecError> {
        std::str::from_utf8(self.bytes()?).map_err(CodecError::InvalidName)
    }

    pub(crate) fn strong(&mut self) -> Result<StrongSum, CodecError> {
        let bytes = self.bytes()?;
        StrongSum::from_slice(bytes).ok_or(CodecError::InvalidStrongLength {
            expected: STRONG_LEN,
            len: bytes.len(),
        })
    }

    /// Fails unless every byte has been consumed.
    pub(crate) fn finish(self) -> Result<(), CodecError> {
        if self.input.is_empty() {
            Ok(())
        } else {
            Err(CodecError::TrailingBytes {
                count: self.input.len(),
            })
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        if len > self.input.len() {
            return Err(CodecError::LengthOverflow {
                len: i64::try_from(len).unwrap_or(i64::MAX),
            });
        }
        let (field, rest) = self.input.split_at(len);
        self.input = rest;
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checksums::strong::Sha1;

    #[test]
    fn fields_read_back_in_order() {
        let strong = Sha1::digest(b"abc");
        let mut writer = FieldWriter::versioned();
        writer.name("docs").expect("name");
        writer.u32(0o755);
        writer.strong(&strong).expect("strong");
        writer.u64(10_000).expect("size");
        let blob = writer.finish();

        let mut reader = FieldReader::versioned(&blob).expect("version");
        assert_eq!(reader.name().expect("name"), "docs");
        assert_eq!(reader.u32().expect("mode"), 0o755);
        assert_eq!(reader.strong().expect("strong"), strong);
        assert_eq!(reader.u64().expect("size"), 10_000);
        reader.finish().expect("fully consumed");
    }

    #[test]
    fn short_strong_is_rejected() {
        let mut writer = FieldWriter::versioned();
        writer.bytes(&[1, 2, 3]).expect("bytes");
        let blob = writer.finish();

        let mut reader = FieldReader::versioned(&blob).expect("version");
        assert!(matches!(
            reader.strong(),
            Err(CodecError::InvalidStrongLength { len: 3, .. })
        ));
    }

    #[test]
    fn overlong_field_is_rejected() {
        let mut blob = Vec::new();
        encode_varint_to_vec(NODE_FORMAT_VERSION, &mut blob);
        encode_varint_to_vec(50, &mut blob);
        blob.extend_from_slice(b"short");

        let mut reader = FieldReader::versioned(&blob).expect("version");
        assert!(matches!(reader.name(), Err(CodecError::LengthOverflow { len: 50 })));
    }

    #[test]
    fn negative_length_is_rejected() {
        let mut blob = Vec::new();
        encode_varint_to_vec(NODE_FORMAT_VERSION, &mut blob);
        encode_varint_to_vec(-4, &mut blob);

        let mut reader = FieldReader::versioned(&blob).expect("version");
        assert!(matches!(reader.count(), Err(CodecError::LengthOverflow { len: -4 })));
    }

    #[test]
    fn invalid_utf8_name_is_rejected() {
        let mut writer = FieldWriter::versioned();
        writer.bytes(&[0xff, 0xfe]).expect("bytes");
        let blob = writer.finish();

        let mut reader = FieldReader::versioned(&blob).expect("version");
        assert!(matches!(reader.name(), Err(CodecError::InvalidName(_))));
    }

    #[test]
    fn trailing_bytes_are_reported() {
        let mut writer = FieldWriter::versioned();
        writer.u32(1);
        let blob = writer.finish();

        let reader = FieldReader::versioned(&blob).expect("version");
        assert!(matches!(reader.finish(), Err(CodecError::TrailingBytes { count: 4 })));
    }
}
