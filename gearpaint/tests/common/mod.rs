#![allow(dead_code)]

use gearpaint::gearfile::{mtrl::SIGNATURE, Half};

pub fn half(v: f64) -> u16 {
	Half::from_f64(v).0
}

pub fn halfs(values: &[f64]) -> Vec<u8> {
	values.iter().flat_map(|v| half(*v).to_le_bytes()).collect()
}

/// A dye record as stored after the colorset rows
pub fn dye_record(channel: u8, template: u16, flags: u16) -> [u8; 4] {
	let [b1, b2] = flags.to_le_bytes();
	let [b3, b4] = template.to_le_bytes();
	[b1, b2, b3, b4 | (channel - 1) << 3]
}

pub struct MtrlBuilder {
	pub shader: String,
	pub textures: Vec<String>,
	pub rows: Vec<[u16; 32]>,
	pub dyes: Option<Vec<[u8; 4]>>,
	pub flags: u32,
}

impl MtrlBuilder {
	/// Rows with a 1:1 tile matrix and nothing else set
	pub fn new(shader: &str, row_count: usize) -> Self {
		let mut row = [0u16; 32];
		row[28] = half(1.0);
		row[31] = half(1.0);
		
		Self {
			shader: shader.to_string(),
			textures: vec!["chara/equipment/e0001/texture/v01_c0101e0001_top_norm.tex".to_string()],
			rows: vec![row; row_count],
			dyes: None,
			flags: 0,
		}
	}
	
	pub fn set(mut self, row: usize, field: usize, value: f64) -> Self {
		self.rows[row][field] = half(value);
		self
	}
	
	pub fn dye(mut self, row: usize, record: [u8; 4]) -> Self {
		let count = self.rows.len();
		self.dyes.get_or_insert_with(|| vec![[0; 4]; count])[row] = record;
		self
	}
	
	pub fn build(&self) -> Vec<u8> {
		let mut strings = Vec::new();
		let mut offsets = Vec::new();
		for path in &self.textures {
			offsets.push(strings.len() as u16);
			strings.extend_from_slice(path.as_bytes());
			strings.push(0);
		}
		let shader_offset = strings.len() as u16;
		strings.extend_from_slice(self.shader.as_bytes());
		strings.push(0);
		
		let mut colorset = Vec::new();
		self.rows.iter().flatten().for_each(|v| colorset.extend_from_slice(&v.to_le_bytes()));
		self.dyes.iter().flatten().for_each(|v| colorset.extend_from_slice(v));
		let colorset_size = colorset.len() as u16;
		colorset.extend_from_slice(&[0; 6]);
		colorset.extend_from_slice(&self.flags.to_le_bytes());
		
		let mut data = Vec::new();
		data.extend_from_slice(&SIGNATURE.to_le_bytes());
		data.extend_from_slice(&0u16.to_le_bytes());
		data.extend_from_slice(&colorset_size.to_le_bytes());
		data.extend_from_slice(&(strings.len() as u16).to_le_bytes());
		data.extend_from_slice(&shader_offset.to_le_bytes());
		data.extend_from_slice(&[self.textures.len() as u8, 0, 0, 0]);
		for offset in offsets {
			data.extend_from_slice(&offset.to_le_bytes());
			data.extend_from_slice(&0u16.to_le_bytes());
		}
		data.extend_from_slice(&strings);
		data.extend_from_slice(&colorset);
		data
	}
}

/// A new format staining template file, every entry made of raw per property payloads
pub fn stm(version: u16, entries: &[(u32, Vec<Vec<u8>>)]) -> Vec<u8> {
	let mut bodies = Vec::new();
	let mut offsets = Vec::new();
	for (_, properties) in entries {
		offsets.push(bodies.len() as u32 / 2);
		let mut end = 0u16;
		for prop in properties {
			end += prop.len() as u16 / 2;
			bodies.extend_from_slice(&end.to_le_bytes());
		}
		properties.iter().for_each(|v| bodies.extend_from_slice(v));
		if bodies.len() % 2 == 1 {
			bodies.push(0);
		}
	}
	
	let mut data = Vec::new();
	for v in [0, version, entries.len() as u16, 0] {
		data.extend_from_slice(&v.to_le_bytes());
	}
	entries.iter().for_each(|(id, _)| data.extend_from_slice(&id.to_le_bytes()));
	offsets.iter().for_each(|v| data.extend_from_slice(&v.to_le_bytes()));
	data.extend_from_slice(&bodies);
	data
}

/// Unique values followed by one index byte per dye
pub fn indexed(unique: &[f64], indices: impl Fn(usize) -> u8, dye_count: usize) -> Vec<u8> {
	let mut data = halfs(unique);
	data.extend((0..dye_count).map(indices));
	data
}
