use std::path::PathBuf;
use gearfile::{mtrl::ColorsetType, Mtrl, TemplateType};

pub mod config;
pub mod cache;
pub mod channel;
pub mod resolve;
pub mod ramp;

pub use gearfile;
pub use cache::{StainingCache, StmBytes, StmDirectory, StmError, StmSource, TemplateValue, TemplateValues};
pub use resolve::{resolve, ActiveDyes, DyeSource, ResolveError};
pub use ramp::{build_ramps, Ramp, RampStop};

pub fn default_config_path() -> Option<PathBuf> {
	dirs::config_dir().map(|v| v.join("gearpaint").join("config.json"))
}

pub fn json_pretty<T: serde::Serialize>(data: &T) -> Result<String, serde_json::Error> {
	let mut serializer = serde_json::Serializer::with_formatter(Vec::new(), serde_json::ser::PrettyFormatter::with_indent(b"\t"));
	data.serialize(&mut serializer)?;
	Ok(String::from_utf8_lossy(&serializer.into_inner()).into_owned())
}

/// Which staining templates dye a material. Legacy shaders always use the old templates
pub fn template_type_for(mtrl: &Mtrl, legacy_shader: &str) -> TemplateType {
	if mtrl.shader == legacy_shader {
		return TemplateType::Endwalker;
	}
	
	match mtrl.colorset_type {
		Some(ColorsetType::Endwalker) => TemplateType::Endwalker,
		_ => TemplateType::Dawntrail,
	}
}

/// Material names that only differ by one letter are variants of each other (`..._a.mtrl`, `..._b.mtrl`)
pub fn is_variant_name(a: &str, b: &str) -> bool {
	let a = a.chars().collect::<Vec<_>>();
	let b = b.chars().collect::<Vec<_>>();
	if a.len() != b.len() {
		return false;
	}
	
	let mut diff = a.iter().zip(&b).filter(|(a, b)| a != b);
	match (diff.next(), diff.next()) {
		(Some((a, b)), None) => a.is_ascii_alphabetic() && b.is_ascii_alphabetic(),
		_ => false,
	}
}
