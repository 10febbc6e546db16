use std::{fs::File, path::{PathBuf, Path}, io::{Write, Read}};
use serde::{Deserialize, Serialize};
use crate::resolve::ActiveDyes;

/// Stop positions lining up with the row boundaries of the id texture
pub const RAMP_POSITIONS: [f64; 16] = [0.0, 0.0703, 0.1328, 0.2031, 0.2656, 0.3359, 0.3984, 0.4687, 0.5312, 0.5976, 0.6640, 0.7304, 0.7968, 0.8632, 0.9296, 1.0];

pub struct ConfigManager {
	pub config: Config,
	save_check: Option<Config>,
	path: PathBuf,
}

impl ConfigManager {
	pub fn load(path: &Path) -> Self {
		Self {
			config: 's: {
				if let Ok(mut f) = File::open(path) {
					let mut buf = Vec::new();
					if f.read_to_end(&mut buf).is_ok() {
						match serde_json::from_slice(&buf) {
							Ok(c) => break 's c,
							Err(err) => log::warn!("Config at {path:?} is malformed, using defaults ({err})"),
						}
					}
				}
				
				Config::default()
			},
			save_check: None,
			path: path.to_owned(),
		}
	}
	
	pub fn path(&self) -> &Path {
		&self.path
	}
	
	pub fn mark_for_changes(&mut self) {
		self.save_check = Some(self.config.clone());
	}
	
	pub fn save(&mut self) -> std::io::Result<()> {
		if let Some(save_check) = self.save_check.take() {
			if self.config != save_check {
				self.save_forced()?;
			}
		}
		
		Ok(())
	}
	
	pub fn save_forced(&self) -> std::io::Result<()> {
		if let Some(parent) = self.path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		
		File::create(&self.path)?.write_all(crate::json_pretty(&self.config)?.as_bytes())?;
		
		Ok(())
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
	/// Directory holding the dumped `.dyes` staining template files
	pub stm_directory: Option<PathBuf>,
	pub dye_1: u32,
	pub dye_2: u32,
	pub ramp_positions: Vec<f64>,
	pub legacy_shader: String,
}

impl Config {
	pub fn active_dyes(&self) -> ActiveDyes {
		ActiveDyes {
			channel_1: self.dye_1,
			channel_2: self.dye_2,
		}
	}
}

impl Default for Config {
	fn default() -> Self {
		Self {
			stm_directory: None,
			dye_1: 0,
			dye_2: 0,
			ramp_positions: RAMP_POSITIONS.to_vec(),
			legacy_shader: "characterlegacy.shpk".to_string(),
		}
	}
}
