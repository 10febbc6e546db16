pub mod format;
pub mod math;

pub use format::game::{mtrl, stm, stain, Mtrl, StainingTemplateFile, TemplateType};
pub use math::{half_float::Half, tile_matrix::TileTransform};

// ----------

trait NullReader {
	fn null_terminated(&self) -> String;
}

impl NullReader for [u8] {
	// invalid utf8 is replaced rather than rejected, paths in the wild aren't always clean
	fn null_terminated(&self) -> String {
		let end = self.iter().position(|v| *v == 0).unwrap_or(self.len());
		String::from_utf8_lossy(&self[..end]).into_owned()
	}
}

// ----------

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0:?}")] Io(#[from] std::io::Error),
	#[error("Invalid signature, expected {expected:#x} but found {found:#x}")] InvalidSignature{expected: u32, found: u32},
	#[error("Data ended unexpectedly while reading {0}")] TruncatedData(&'static str),
	#[error("Unexpected colorset data size {0}")] UnexpectedColorsetSize(u16),
	#[error("Can't determine staining template format from a {0} byte file")] AmbiguousFormatDetection(usize),
	#[error("{0:?}")] Binrw(binrw::Error),
}

impl From<binrw::Error> for Error {
	fn from(err: binrw::Error) -> Self {
		match err {
			err if err.is_eof() => Self::TruncatedData("file"),
			err => Self::Binrw(err),
		}
	}
}

/// Attaches what was being read to binrw failures, eof becomes [`Error::TruncatedData`]
trait Context<T> {
	fn context(self, what: &'static str) -> Result<T, Error>;
}

impl<T> Context<T> for binrw::BinResult<T> {
	fn context(self, what: &'static str) -> Result<T, Error> {
		self.map_err(|err| match Error::from(err) {
			Error::TruncatedData(_) => Error::TruncatedData(what),
			err => err,
		})
	}
}
