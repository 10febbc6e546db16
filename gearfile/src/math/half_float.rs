use binrw::BinRead;
use serde::Serialize;

/// A 16 bit float exactly as stored on disk, sign(1) exponent(5) mantissa(10)
#[derive(BinRead, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "f64")]
pub struct Half(pub u16);

impl Half {
	pub const ZERO: Half = Half(0);
	
	pub fn to_f64(self) -> f64 {
		decode(self.0)
	}
	
	/// Rounds to the nearest representable value
	pub fn from_f64(value: f64) -> Self {
		Self(half::f16::from_f64(value).to_bits())
	}
}

impl From<Half> for f64 {
	fn from(value: Half) -> Self {
		value.to_f64()
	}
}

/// Never fails, subnormals, signed zero, infinities and nan all map onto their f64 counterpart
pub fn decode(raw: u16) -> f64 {
	half::f16::from_bits(raw).to_f64()
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	
	// straight from the bit layout, used to check every pattern
	fn reference(raw: u16) -> f64 {
		let sign = if raw >> 15 == 1 {-1.0} else {1.0};
		let exponent = (raw >> 10 & 0x1F) as i32;
		let mantissa = (raw & 0x3FF) as f64;
		match (exponent, mantissa == 0.0) {
			(0, true) => sign * 0.0,
			(0, false) => sign * (mantissa / 1024.0) * 2f64.powi(-14),
			(31, true) => sign * f64::INFINITY,
			(31, false) => f64::NAN,
			_ => sign * (1.0 + mantissa / 1024.0) * 2f64.powi(exponent - 15),
		}
	}
	
	#[rstest]
	#[case(0x3C00, 1.0)]
	#[case(0xC000, -2.0)]
	#[case(0x3800, 0.5)]
	#[case(0x7BFF, 65504.0)]
	#[case(0x0001, 2f64.powi(-24))]
	#[case(0x03FF, 1023.0 / 1024.0 * 2f64.powi(-14))]
	#[case(0x7C00, f64::INFINITY)]
	#[case(0xFC00, f64::NEG_INFINITY)]
	fn decodes_known_patterns(#[case] raw: u16, #[case] expected: f64) {
		assert_eq!(decode(raw), expected);
	}
	
	#[test]
	fn signed_zero() {
		assert_eq!(decode(0x0000), 0.0);
		assert!(decode(0x0000).is_sign_positive());
		assert_eq!(decode(0x8000), 0.0);
		assert!(decode(0x8000).is_sign_negative());
	}
	
	#[test]
	fn nan() {
		assert!(decode(0x7C01).is_nan());
		assert!(decode(0xFE00).is_nan());
	}
	
	#[test]
	fn matches_bit_layout_for_every_pattern() {
		for raw in 0..=u16::MAX {
			let (a, b) = (decode(raw), reference(raw));
			if b.is_nan() {
				assert!(a.is_nan(), "{raw:#06x}");
			} else {
				assert_eq!(a.to_bits(), b.to_bits(), "{raw:#06x}");
			}
		}
	}
	
	#[test]
	fn reads_little_endian() {
		let half = Half::read_le(&mut std::io::Cursor::new([0x00, 0x3C])).unwrap();
		assert_eq!(half, Half(0x3C00));
		assert_eq!(half.to_f64(), 1.0);
	}
}
