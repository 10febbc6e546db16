use glam::DMat2;
use serde::Serialize;

const COLUMN_EPSILON: f64 = 1e-9;
const SHEAR_EPSILON: f64 = 1e-6;

/// The raw 2x2 tile matrix, row major
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TileMatrix {
	pub uu: f64,
	pub uv: f64,
	pub vu: f64,
	pub vv: f64,
}

impl TileMatrix {
	pub fn decompose(&self) -> TileTransform {
		decompose(self.uu, self.uv, self.vu, self.vv)
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TileTransform {
	pub scale_x: f64,
	pub scale_y: f64,
	pub rotation_deg: f64,
	pub shear_deg: f64,
}

/// Splits `[[uu, uv], [vu, vv]]` into rotation, scale and shear.
/// 
/// Degenerate matrices don't fail, the components that can't be recovered are left at 0.
/// Shear is negated so positive values match what mod tools display.
pub fn decompose(uu: f64, uv: f64, vu: f64, vv: f64) -> TileTransform {
	let rotation = if uu.abs() < COLUMN_EPSILON && vu.abs() < COLUMN_EPSILON {
		log::warn!("Tile matrix has a near zero first column ({uu}, {vu}), rotation assumed to be 0");
		0.0
	} else {
		vu.atan2(uu)
	};
	
	// glam is column major, columns are (uu, vu) and (uv, vv)
	let m = DMat2::from_cols_array(&[uu, vu, uv, vv]);
	let unrotated = DMat2::from_angle(-rotation) * m;
	let scale_x = unrotated.x_axis.x;
	let scale_y = unrotated.y_axis.y;
	let skew = unrotated.y_axis.x;
	
	let shear = if scale_y.abs() > SHEAR_EPSILON && skew.abs() > SHEAR_EPSILON {
		(skew / scale_y).atan()
	} else {
		if skew.abs() > SHEAR_EPSILON {
			log::warn!("Near zero tile scale_y ({scale_y:.4}) with shear component {skew:.4}, shear skipped");
		}
		0.0
	};
	
	TileTransform {
		scale_x,
		scale_y,
		rotation_deg: rotation.to_degrees(),
		shear_deg: -shear.to_degrees(),
	}
}
