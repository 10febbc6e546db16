use std::{collections::HashMap, io, path::PathBuf};
use serde::{ser::SerializeMap, Serialize};
use gearfile::{Half, StainingTemplateFile, TemplateType};
use crate::resolve::ResolveError;

#[derive(Debug, thiserror::Error)]
pub enum StmError {
	#[error("{0:?}")] Io(#[from] io::Error),
	#[error(transparent)] Decode(#[from] gearfile::Error),
}

/// Where the raw staining template files come from
pub trait StmSource {
	fn read(&self, template_type: TemplateType) -> io::Result<Vec<u8>>;
}

/// A directory holding `bucket_of_paint.dyes` and `bucket_of_newer_paint.dyes`
pub struct StmDirectory {
	pub root: PathBuf,
}

impl StmDirectory {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self {root: root.into()}
	}
}

impl StmSource for StmDirectory {
	fn read(&self, template_type: TemplateType) -> io::Result<Vec<u8>> {
		std::fs::read(self.root.join(template_type.file_name()))
	}
}

#[derive(Debug, Clone, Default)]
pub struct StmBytes {
	files: HashMap<TemplateType, Vec<u8>>,
}

impl StmBytes {
	pub fn new() -> Self {
		Self::default()
	}
	
	pub fn with(mut self, template_type: TemplateType, data: Vec<u8>) -> Self {
		self.files.insert(template_type, data);
		self
	}
}

impl StmSource for StmBytes {
	fn read(&self, template_type: TemplateType) -> io::Result<Vec<u8>> {
		self.files.get(&template_type).cloned().ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no {template_type} staining templates")))
	}
}

// ----------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TemplateValue {
	Color([f64; 3]),
	Scalar(f64),
}

impl TemplateValue {
	fn from_halfs(halfs: &[Half]) -> Self {
		match halfs {
			[r, g, b] => Self::Color([r.to_f64(), g.to_f64(), b.to_f64()]),
			[v, ..] => Self::Scalar(v.to_f64()),
			[] => Self::Scalar(0.0),
		}
	}
	
	/// Scalars ignore the index, colors fall back to their first channel
	pub fn component(&self, index: usize) -> f64 {
		match self {
			Self::Color(v) => v.get(index).copied().unwrap_or(v[0]),
			Self::Scalar(v) => *v,
		}
	}
}

/// Every property of a template for a single dye, in file order
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateValues(Vec<(&'static str, TemplateValue)>);

impl TemplateValues {
	pub fn get(&self, property: &str) -> Option<TemplateValue> {
		self.0.iter().find(|(name, _)| *name == property).map(|(_, v)| *v)
	}
	
	pub fn iter(&self) -> impl Iterator<Item = &(&'static str, TemplateValue)> {
		self.0.iter()
	}
}

impl Serialize for TemplateValues {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.0.len()))?;
		for (name, value) in &self.0 {
			map.serialize_entry(name, value)?;
		}
		map.end()
	}
}

// ----------

/// Parsed staining template files by type and the value sets derived from them.
/// Both are only ever dropped together.
pub struct StainingCache<S> {
	source: S,
	files: HashMap<TemplateType, StainingTemplateFile>,
	values: HashMap<(TemplateType, u32, u32), TemplateValues>,
}

impl<S: StmSource> StainingCache<S> {
	pub fn new(source: S) -> Self {
		Self {
			source,
			files: HashMap::new(),
			values: HashMap::new(),
		}
	}
	
	pub fn source(&self) -> &S {
		&self.source
	}
	
	/// Reads and parses the file on first use, failures aren't remembered so the next call tries again
	pub fn load(&mut self, template_type: TemplateType) -> Result<&StainingTemplateFile, StmError> {
		if !self.files.contains_key(&template_type) {
			let data = self.source.read(template_type)?;
			let file = StainingTemplateFile::read(&data, template_type)?;
			log::debug!("Loaded {} {template_type} staining templates ({:?} format)", file.templates.len(), file.format);
			self.files.insert(template_type, file);
		}
		
		Ok(&self.files[&template_type])
	}
	
	pub fn get(&self, template_type: TemplateType) -> Option<&StainingTemplateFile> {
		self.files.get(&template_type)
	}
	
	pub fn template_values(&mut self, template_type: TemplateType, template: u32, dye: u32) -> Result<&TemplateValues, ResolveError> {
		let key = (template_type, template, dye);
		if !self.values.contains_key(&key) {
			let file = self.load(template_type)?;
			let entry = file.get(template).ok_or(ResolveError::MissingTemplate{template, template_type})?;
			let count = file.format.dye_count();
			if dye as usize >= count {
				return Err(ResolveError::MissingDye{dye, count});
			}
			
			let values = file.property_names()
				.iter()
				.enumerate()
				.map(|(i, name)| (*name, TemplateValue::from_halfs(entry.get(i, dye as usize))))
				.collect();
			self.values.insert(key, TemplateValues(values));
		}
		
		Ok(&self.values[&key])
	}
	
	pub fn clear(&mut self) {
		self.files.clear();
		self.values.clear();
	}
}
