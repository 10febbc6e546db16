use std::{collections::BTreeMap, io::{Cursor, Read, Seek}};
use binrw::{BinRead, BinResult};
use serde::Serialize;
use crate::{math::half_float::Half, Context, Error};

const HEADER_SIZE: usize = 8;
const DEFAULT: [Half; 3] = [Half::ZERO; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TemplateType {
	Endwalker,
	Dawntrail,
}

impl TemplateType {
	pub fn item_count(&self) -> usize {
		match self {
			Self::Endwalker => 5,
			Self::Dawntrail => 12,
		}
	}
	
	/// Property names in file order, the first 3 are colors
	pub fn property_names(&self) -> &'static [&'static str] {
		const NAMES: [&'static str; 12] = [
			"diffuse",
			"specular",
			"emissive",
			"specular_power",
			"metalness",
			"roughness",
			"sheen_rate",
			"sheen_tint_rate",
			"sheen_aperture",
			"unknown_9",
			"unknown_10",
			"unknown_11",
		];
		
		&NAMES[..self.item_count()]
	}
	
	pub fn property_index(&self, name: &str) -> Option<usize> {
		self.property_names().iter().position(|v| *v == name)
	}
	
	pub fn file_name(&self) -> &'static str {
		match self {
			Self::Endwalker => "bucket_of_paint.dyes",
			Self::Dawntrail => "bucket_of_newer_paint.dyes",
		}
	}
}

impl std::fmt::Display for TemplateType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::Endwalker => "Endwalker",
			Self::Dawntrail => "Dawntrail",
		})
	}
}

/// Element count of a property, colors take 3 halfs per dye
pub fn stride(property: usize) -> usize {
	if property < 3 {3} else {1}
}

// ----------

/// Width of the template table fields and the amount of dyes, decided once from the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StmFormat {
	/// 128 dyes, u16 ids and offsets
	Old,
	/// 254 dyes, u32 ids and offsets
	New,
}

impl StmFormat {
	fn detect(data: &[u8], header: &StmHeader, requested: TemplateType) -> Result<Self, Error> {
		match requested {
			TemplateType::Dawntrail if header.version < 0x201 => Ok(Self::Old),
			TemplateType::Dawntrail => Ok(Self::New),
			TemplateType::Endwalker => match data.get(10..12) {
				Some([0, 0]) => Ok(Self::New),
				Some(_) => Ok(Self::Old),
				// the heuristic can't tell the formats apart when the table is this short
				None if header.entry_count > 0 => Err(Error::AmbiguousFormatDetection(data.len())),
				None => Ok(Self::New),
			},
		}
	}
	
	pub fn dye_count(&self) -> usize {
		match self {
			Self::Old => 128,
			Self::New => 254,
		}
	}
	
	pub fn field_width(&self) -> usize {
		match self {
			Self::Old => 2,
			Self::New => 4,
		}
	}
	
	fn read_field<R: Read + Seek>(&self, reader: &mut R) -> BinResult<u32> {
		match self {
			Self::Old => u16::read_le(reader).map(|v| v as u32),
			Self::New => u32::read_le(reader),
		}
	}
}

// ----------

#[derive(Debug, Clone)]
pub struct StainingTemplateFile {
	pub template_type: TemplateType,
	pub format: StmFormat,
	pub templates: BTreeMap<u32, StainingTemplateEntry>,
}

impl StainingTemplateFile {
	pub fn read(data: &[u8], requested: TemplateType) -> Result<Self, Error> {
		let mut reader = Cursor::new(data);
		let header = StmHeader::read_le(&mut reader).context("header")?;
		let format = StmFormat::detect(data, &header, requested)?;
		log::debug!("Reading {} {requested} templates in the {format:?} format (version {:#x})", header.entry_count, header.version);
		
		let count = header.entry_count as usize;
		let mut ids = Vec::with_capacity(count);
		for _ in 0..count {
			ids.push(format.read_field(&mut reader).context("template ids")?);
		}
		
		let end_of_header = HEADER_SIZE + count * format.field_width() * 2;
		let mut templates = BTreeMap::new();
		for id in ids {
			let offset = format.read_field(&mut reader).context("template offsets")? as usize * 2 + end_of_header;
			templates.insert(id, StainingTemplateEntry::read(data, offset, requested, format));
		}
		
		Ok(Self {
			template_type: requested,
			format,
			templates,
		})
	}
	
	pub fn get(&self, template: u32) -> Option<&StainingTemplateEntry> {
		self.templates.get(&template)
	}
	
	pub fn property_names(&self) -> &'static [&'static str] {
		self.template_type.property_names()
	}
}

// ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArrayKind {
	/// No data, or data that couldn't be read, every dye gets the default
	Empty,
	Singleton,
	Indexed,
	OneToOne,
}

#[derive(Debug, Clone)]
pub struct TemplateProperty {
	pub kind: ArrayKind,
	pub stride: usize,
	/// Exactly dye_count * stride long
	values: Vec<Half>,
}

impl TemplateProperty {
	fn defaults(stride: usize, dye_count: usize) -> Self {
		Self {
			kind: ArrayKind::Empty,
			stride,
			values: vec![Half::ZERO; stride * dye_count],
		}
	}
	
	pub fn get(&self, dye: usize) -> Option<&[Half]> {
		let start = dye.checked_mul(self.stride)?;
		self.values.get(start..start.checked_add(self.stride)?)
	}
	
	pub fn len(&self) -> usize {
		self.values.len() / self.stride
	}
}

#[derive(Debug, Clone)]
pub struct StainingTemplateEntry {
	pub properties: Vec<TemplateProperty>,
}

impl StainingTemplateEntry {
	fn read(data: &[u8], start: usize, template_type: TemplateType, format: StmFormat) -> Self {
		let item_count = template_type.item_count();
		let dye_count = format.dye_count();
		let header_size = item_count * 2;
		
		let mut properties = Vec::with_capacity(item_count);
		let mut last = 0;
		for x in 0..item_count {
			let stride = stride(x);
			let end = match data.get(start + x * 2..start + x * 2 + 2) {
				Some(v) => u16::from_le_bytes([v[0], v[1]]) as usize,
				None => {
					log::error!("Array end of property {x} at {} lies outside the file ({})", start + x * 2, data.len());
					0
				}
			};
			
			let property = if end < last {
				log::warn!("Array end of property {x} ({end}) is before its start ({last}), treating as empty");
				TemplateProperty::defaults(stride, dye_count)
			} else {
				read_property(data, start + header_size + last * 2, end - last, x, dye_count)
			};
			
			properties.push(property);
			last = end;
		}
		
		Self {properties}
	}
	
	/// Values of a property for a dye, zeros of the right arity if either is out of range
	pub fn get(&self, property: usize, dye: usize) -> &[Half] {
		match self.properties.get(property) {
			Some(prop) => match prop.get(dye) {
				Some(v) => v,
				None => {
					log::warn!("Dye {dye} is out of range for property {property} ({} dyes)", prop.len());
					&DEFAULT[..prop.stride]
				}
			},
			None => {
				log::warn!("Property {property} is out of range ({} properties)", self.properties.len());
				&DEFAULT[..stride(property)]
			}
		}
	}
}

/// `span` is the length of the property data in halfs
fn read_property(data: &[u8], base: usize, span: usize, x: usize, dye_count: usize) -> TemplateProperty {
	let stride = stride(x);
	let array_size = span / stride;
	
	let (kind, mut values) = match array_size {
		0 => return TemplateProperty::defaults(stride, dye_count),
		1 => match read_halfs(data, base, stride) {
			Some(v) => (ArrayKind::Singleton, v.repeat(dye_count)),
			None => {
				log::error!("Singleton data of property {x} at {base} lies outside the file ({})", data.len());
				return TemplateProperty::defaults(stride, dye_count);
			}
		},
		_ => {
			let rem = (span * 2) as isize - dye_count as isize;
			if rem >= (stride * 2) as isize && rem as usize / 2 / stride > 0 {
				let rem = rem as usize;
				let unique_count = rem / 2 / stride;
				let index_start = base + rem;
				let (Some(unique), Some(indices)) = (read_halfs(data, base, unique_count * stride), data.get(index_start..index_start + dye_count)) else {
					log::error!("Indexed data of property {x} at {base} lies outside the file ({})", data.len());
					return TemplateProperty::defaults(stride, dye_count);
				};
				
				let mut values = Vec::with_capacity(dye_count * stride);
				for (dye, &index) in indices.iter().enumerate() {
					let index = index as usize;
					match index {
						0 | 255 => values.extend_from_slice(&DEFAULT[..stride]),
						i if i <= unique_count => values.extend_from_slice(&unique[(i - 1) * stride..i * stride]),
						i => {
							log::warn!("Invalid index {i} for dye {dye} of property {x}, only {unique_count} unique values");
							values.extend_from_slice(&DEFAULT[..stride]);
						}
					}
				}
				
				(ArrayKind::Indexed, values)
			} else {
				match read_halfs(data, base, array_size * stride) {
					Some(v) => (ArrayKind::OneToOne, v),
					None => {
						log::error!("Data of property {x} at {base} lies outside the file ({})", data.len());
						return TemplateProperty::defaults(stride, dye_count);
					}
				}
			}
		}
	};
	
	let len = values.len() / stride;
	if len < dye_count {
		log::debug!("Property {x} has {len} entries, padding to {dye_count}");
		values.resize(dye_count * stride, Half::ZERO);
	} else if len > dye_count {
		log::warn!("Property {x} has {len} entries, truncating to {dye_count}");
		values.truncate(dye_count * stride);
	}
	
	TemplateProperty {kind, stride, values}
}

fn read_halfs(data: &[u8], pos: usize, count: usize) -> Option<Vec<Half>> {
	let bytes = data.get(pos..pos.checked_add(count * 2)?)?;
	Some(bytes.chunks_exact(2).map(|v| Half(u16::from_le_bytes([v[0], v[1]]))).collect())
}

#[derive(BinRead, Debug)]
struct StmHeader {
	_reserved: u16,
	version: u16,
	entry_count: u16,
	_reserved2: u16,
}
