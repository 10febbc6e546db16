use std::io::{Cursor, Read, Seek, SeekFrom};
use binrw::{BinRead, Endian};
use serde::Serialize;
use crate::{math::{half_float::Half, tile_matrix::{TileMatrix, TileTransform}}, Context, Error, NullReader};

pub const SIGNATURE: u32 = 16973824;

const ROW_SIZE: usize = 64;
const DYE_ROW_SIZE: usize = 4;
const FLAGS_PADDING: u64 = 6;

bitflags::bitflags! {
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
	pub struct MaterialFlags: u32 {
		const HIDE_BACKFACES = 0x1;
		const ENABLE_TRANSLUCENCY = 0x10;
		
		const _ = !0;
	}
}

bitflags::bitflags! {
	/// Which colorset values a dye is allowed to replace, bit n of the little endian u16 made by the first 2 bytes
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
	pub struct DyeFlags: u16 {
		const DIFFUSE = 1 << 0;
		const SPECULAR = 1 << 1;
		const EMISSIVE = 1 << 2;
		const EMISSIVE_UNKNOWN = 1 << 3;
		const METALLIC = 1 << 4;
		const ROUGHNESS = 1 << 5;
		const SHEEN_RATE = 1 << 6;
		const SHEEN_APERTURE = 1 << 7;
		const SHEEN_TINT_RATE = 1 << 8;
		const ANISOTROPY = 1 << 9;
		const SPHERE_MAP_ID = 1 << 10;
		const SPHERE_MAP_OPACITY = 1 << 11;
	}
}

impl DyeFlags {
	/// The flag guarding a colorset property, only these properties ever take dye values
	pub fn for_property(name: &str) -> Option<Self> {
		Some(match name {
			"diffuse" => Self::DIFFUSE,
			"specular" => Self::SPECULAR,
			"emissive" => Self::EMISSIVE,
			"roughness" => Self::ROUGHNESS,
			"metalness" => Self::METALLIC,
			_ => return None,
		})
	}
}

// ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColorsetType {
	Endwalker,
	Dawntrail,
}

impl ColorsetType {
	pub fn from_size(size: u16) -> Result<Option<Self>, Error> {
		match size {
			0 => Ok(None),
			2048..=u16::MAX => Ok(Some(Self::Dawntrail)),
			512..=2047 => Ok(Some(Self::Endwalker)),
			_ => Err(Error::UnexpectedColorsetSize(size)),
		}
	}
	
	pub fn row_count(&self) -> usize {
		match self {
			Self::Endwalker => 16,
			Self::Dawntrail => 32,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RowGroup {
	A,
	B,
}

impl RowGroup {
	pub fn from_index(index: usize) -> Self {
		if index % 2 == 0 {Self::A} else {Self::B}
	}
}

impl std::fmt::Display for RowGroup {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::A => "A",
			Self::B => "B",
		})
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextureRole {
	Diffuse,
	Mask,
	Normal,
	Id,
}

impl TextureRole {
	/// Guesses the role from the file stem suffix (`_d`, `_mask`, `_n`, ...)
	pub fn from_path(path: &str) -> Option<Self> {
		let name = path.rsplit(&['/', '\\'][..]).next().unwrap_or(path);
		let stem = name.split('.').next().unwrap_or(name);
		let (_, suffix) = stem.rsplit_once('_')?;
		Some(match suffix {
			"diff" | "d" => Self::Diffuse,
			"mask" | "m" => Self::Mask,
			"norm" | "n" => Self::Normal,
			"id" => Self::Id,
			_ => return None,
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Texture {
	pub path: String,
	pub flags: u16,
}

impl Texture {
	pub fn role(&self) -> Option<TextureRole> {
		TextureRole::from_path(&self.path)
	}
}

// ----------

#[derive(Debug, Clone, Serialize)]
pub struct Mtrl {
	pub shader: String,
	pub textures: Vec<Texture>,
	pub flags: MaterialFlags,
	pub colorset_type: Option<ColorsetType>,
	pub rows: Vec<ColorRow>,
}

impl Mtrl {
	pub fn read<R: Read>(reader: &mut R) -> Result<Self, Error> {
		let mut data = Vec::new();
		reader.read_to_end(&mut data)?;
		Self::from_bytes(&data)
	}
	
	/// Decodes a whole material, any failure discards everything read so far
	pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
		let mut reader = Cursor::new(data);
		
		let signature = u32::read_le(&mut reader).context("signature")?;
		if signature != SIGNATURE {
			return Err(Error::InvalidSignature{expected: SIGNATURE, found: signature});
		}
		
		let header = MtrlHeader::read_le(&mut reader).context("header")?;
		reader.seek(SeekFrom::Current((header.map_count as i64 + header.colorset_count as i64) * 4))?;
		let strings_start = reader.position();
		
		let mut textures = Vec::with_capacity(header.textures.len());
		for (i, info) in header.textures.iter().enumerate() {
			let pos = strings_start as usize + info.offset as usize;
			let Some(bytes) = data.get(pos..).filter(|v| !v.is_empty()) else {
				log::warn!("Texture {i} offset {} points outside the file ({pos}), skipping", info.offset);
				continue;
			};
			
			textures.push(Texture {
				path: bytes.null_terminated(),
				flags: info.flags,
			});
		}
		
		let shader = data
			.get(strings_start as usize + header.shader_name_offset as usize..)
			.map(|v| v.null_terminated())
			.unwrap_or_default();
		
		let colorset_start = strings_start + header.strings_size as u64 + header.extra_data_size as u64;
		let colorset_type = ColorsetType::from_size(header.colorset_size)?;
		let mut rows = Vec::new();
		if let Some(colorset_type) = colorset_type {
			reader.seek(SeekFrom::Start(colorset_start))?;
			let row_count = colorset_type.row_count();
			rows.reserve_exact(row_count);
			for i in 0..row_count {
				rows.push(ColorRow::read_options(&mut reader, Endian::Little, (i,)).context("colorset rows")?);
			}
			
			let remaining = header.colorset_size as i64 - (row_count * ROW_SIZE) as i64;
			let expected = (row_count * DYE_ROW_SIZE) as i64;
			if remaining == expected {
				for row in rows.iter_mut() {
					row.dye = Some(DyeInfo::from_bytes(<[u8; 4]>::read_le(&mut reader).context("dye rows")?));
				}
			} else if remaining > 0 {
				log::warn!("Remaining colorset data ({remaining}) doesn't match the expected dye data size ({expected}), skipping dyes");
			}
		}
		
		reader.seek(SeekFrom::Start(colorset_start + header.colorset_size as u64 + FLAGS_PADDING))?;
		let flags = MaterialFlags::from_bits_retain(u32::read_le(&mut reader).context("material flags")?);
		
		Ok(Self {
			shader,
			textures,
			flags,
			colorset_type,
			rows,
		})
	}
	
	pub fn rows_in_group(&self, group: RowGroup) -> impl Iterator<Item = &ColorRow> {
		self.rows.iter().filter(move |v| v.group == group)
	}
}

// ----------

/// A single colorset value, colors are the 3 channels without their unknown 4th
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowField {
	Scalar(f64),
	Vector([f64; 3]),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorRow {
	/// 1 based
	pub row_number: u8,
	pub group: RowGroup,
	pub diffuse: [f64; 3],
	pub diffuse_unknown: f64,
	pub specular: [f64; 3],
	pub specular_unknown: f64,
	pub emissive: [f64; 3],
	pub emissive_unknown: f64,
	pub sheen_rate: f64,
	pub sheen_tint_rate: f64,
	pub sheen_aperture: f64,
	pub sheen_unknown: f64,
	pub roughness: f64,
	pub pbr_unknown: f64,
	pub metalness: f64,
	pub anisotropy_blending: f64,
	pub effect_unknown_r: f64,
	pub sphere_map_opacity: f64,
	pub effect_unknown_b: f64,
	pub effect_unknown_a: f64,
	pub shader_template_id: f64,
	pub tile_map_id: u16,
	pub tile_map_opacity: f64,
	pub sphere_map_id: f64,
	pub tile_transform: TileTransform,
	pub tile_matrix: TileMatrix,
	pub dye: Option<DyeInfo>,
}

impl ColorRow {
	/// `index` is the 0 based position in the colorset
	pub fn from_halfs(index: usize, halfs: &[Half; 32]) -> Self {
		let h = |i: usize| halfs[i].to_f64();
		
		let tile_matrix = TileMatrix {uu: h(28), uv: h(29), vu: h(30), vv: h(31)};
		
		Self {
			row_number: index as u8 + 1,
			group: RowGroup::from_index(index),
			diffuse: [h(0), h(1), h(2)],
			diffuse_unknown: h(3),
			specular: [h(4), h(5), h(6)],
			specular_unknown: h(7),
			emissive: [h(8), h(9), h(10)],
			emissive_unknown: h(11),
			sheen_rate: h(12),
			sheen_tint_rate: h(13),
			sheen_aperture: h(14),
			sheen_unknown: h(15),
			roughness: h(16),
			pbr_unknown: h(17),
			metalness: h(18),
			anisotropy_blending: h(19),
			effect_unknown_r: h(20),
			sphere_map_opacity: h(21),
			effect_unknown_b: h(22),
			effect_unknown_a: h(23),
			shader_template_id: h(24),
			tile_map_id: (h(25) * 64.0).round_ties_even() as u16,
			tile_map_opacity: h(26),
			sphere_map_id: h(27),
			tile_transform: tile_matrix.decompose(),
			tile_matrix,
			dye: None,
		}
	}
	
	pub fn field(&self, name: &str) -> Option<RowField> {
		use RowField::*;
		
		Some(match name {
			"row_number" => Scalar(self.row_number as f64),
			"diffuse" => Vector(self.diffuse),
			"diffuse_unknown" => Scalar(self.diffuse_unknown),
			"specular" => Vector(self.specular),
			"specular_unknown" => Scalar(self.specular_unknown),
			"emissive" => Vector(self.emissive),
			"emissive_unknown" => Scalar(self.emissive_unknown),
			"sheen_rate" => Scalar(self.sheen_rate),
			"sheen_tint_rate" => Scalar(self.sheen_tint_rate),
			"sheen_aperture" => Scalar(self.sheen_aperture),
			"sheen_unknown" => Scalar(self.sheen_unknown),
			"roughness" => Scalar(self.roughness),
			"pbr_unknown" => Scalar(self.pbr_unknown),
			"metalness" => Scalar(self.metalness),
			"anisotropy_blending" => Scalar(self.anisotropy_blending),
			"effect_unknown_r" => Scalar(self.effect_unknown_r),
			"sphere_map_opacity" => Scalar(self.sphere_map_opacity),
			"effect_unknown_b" => Scalar(self.effect_unknown_b),
			"effect_unknown_a" => Scalar(self.effect_unknown_a),
			"shader_template_id" => Scalar(self.shader_template_id),
			"tile_map_id" => Scalar(self.tile_map_id as f64),
			"tile_map_opacity" => Scalar(self.tile_map_opacity),
			"sphere_map_id" => Scalar(self.sphere_map_id),
			"tile_scale_x" => Scalar(self.tile_transform.scale_x),
			"tile_scale_y" => Scalar(self.tile_transform.scale_y),
			"tile_rotation_deg" => Scalar(self.tile_transform.rotation_deg),
			"tile_shear_deg" => Scalar(self.tile_transform.shear_deg),
			_ => return None,
		})
	}
}

impl BinRead for ColorRow {
	type Args<'a> = (usize,);
	
	fn read_options<R: Read + Seek>(reader: &mut R, endian: Endian, (index,): Self::Args<'_>) -> binrw::BinResult<Self> {
		Ok(Self::from_halfs(index, &<[Half; 32]>::read_options(reader, endian, ())?))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DyeInfo {
	/// 1 or 2
	pub channel: u8,
	pub template: u16,
	pub flags: DyeFlags,
	pub raw: [u8; 4],
}

impl DyeInfo {
	pub fn from_bytes(raw: [u8; 4]) -> Self {
		let [b1, b2, b3, b4] = raw;
		
		Self {
			channel: (b4 >> 3 & 0b11) + 1,
			template: u16::from_le_bytes([b3, b4 & 0b11100111]),
			flags: DyeFlags::from_bits_truncate(u16::from_le_bytes([b1, b2])),
			raw,
		}
	}
	
	pub fn applies_to(&self, property: &str) -> bool {
		DyeFlags::for_property(property).is_some_and(|flag| self.flags.contains(flag))
	}
}

// ----------

#[derive(BinRead, Debug)]
struct MtrlHeader {
	_file_size: u16,
	colorset_size: u16,
	strings_size: u16,
	shader_name_offset: u16,
	texture_count: u8,
	map_count: u8,
	colorset_count: u8,
	extra_data_size: u8,
	#[br(count = texture_count)]
	textures: Vec<TextureInfo>,
}

#[derive(BinRead, Debug)]
struct TextureInfo {
	offset: u16,
	flags: u16,
}
