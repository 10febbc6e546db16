use serde::{Deserialize, Serialize};
use gearfile::{mtrl::ColorRow, TemplateType};
use crate::{cache::{StainingCache, StmError, StmSource, TemplateValue}, channel::{lookup, split_key, ChannelDef, ForcedValue, NamedExpr}};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
	#[error("Template {template} doesn't exist in the {template_type} staining templates")] MissingTemplate{template: u32, template_type: TemplateType},
	#[error("Dye {dye} is outside the {count} dyes of the staining templates")] MissingDye{dye: u32, count: usize},
	#[error("Staining templates have no {0} property")] MissingProperty(String),
	#[error("Row has no value for key {0:?}")] UnknownKey(String),
	#[error("Expression {expr:?} turned {input} into {value}")] Expression{expr: NamedExpr, input: f64, value: f64},
	#[error("Failed loading staining templates: {0}")] Stm(#[from] StmError),
}

/// The selected dye id of both dye channels, 0 is undyed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ActiveDyes {
	pub channel_1: u32,
	pub channel_2: u32,
}

impl ActiveDyes {
	pub fn channels(&self) -> [(u8, u32); 2] {
		[(1, self.channel_1), (2, self.channel_2)]
	}
}

/// Supplies staining template values for a property of a dye
pub trait DyeSource {
	fn dye_value(&mut self, template_type: TemplateType, template: u16, dye: u32, property: &str) -> Result<TemplateValue, ResolveError>;
}

impl<S: StmSource> DyeSource for StainingCache<S> {
	fn dye_value(&mut self, template_type: TemplateType, template: u16, dye: u32, property: &str) -> Result<TemplateValue, ResolveError> {
		self.template_values(template_type, template as u32, dye)?
			.get(property)
			.ok_or_else(|| ResolveError::MissingProperty(property.to_string()))
	}
}

/// Final value of a single ramp channel for a row. Never fails, anything that goes wrong
/// is logged and the value from before that step is kept.
pub fn resolve<D: DyeSource + ?Sized>(row: &ColorRow, channel: &ChannelDef, template_type: TemplateType, dyes: ActiveDyes, source: &mut D) -> f64 {
	let rules = channel.rules(template_type);
	let key = rules.change_key.unwrap_or(channel.key);
	
	match rules.force_value {
		Some(ForcedValue::Constant(v)) => return v,
		Some(ForcedValue::Key(forced)) => return row_value(row, forced, channel.default),
		None => {}
	}
	
	let mut value = row_value(row, key, channel.default);
	
	if let Some(dye) = row.dye.filter(|v| channel.dyeable && v.template != 0) {
		// dye flags and templates know the property by its own name, not whatever the rules swapped in
		let (property, _) = split_key(channel.key);
		let (_, index) = split_key(key);
		for (number, id) in dyes.channels() {
			if id == 0 || dye.channel != number || !dye.applies_to(property) {continue}
			
			match source.dye_value(template_type, dye.template, id, property) {
				Ok(v) => value = v.component(index.unwrap_or(0)),
				Err(err) => log::warn!("Dye {id} not applied to {key} of row {}: {err}", row.row_number),
			}
		}
	}
	
	for transform in rules.transforms() {
		match transform.apply(value) {
			Ok(v) => value = v,
			Err(err) => log::warn!("{transform:?} failed for {key} of row {} (dyes {}, {}): {err}", row.row_number, dyes.channel_1, dyes.channel_2),
		}
	}
	
	value
}

fn row_value(row: &ColorRow, key: &str, default: f64) -> f64 {
	if key.is_empty() {
		return default;
	}
	
	match lookup(row, key) {
		Ok(v) => v,
		Err(err) => {
			log::warn!("{err} in row {}, using {default}", row.row_number);
			default
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use gearfile::{mtrl::{DyeFlags, DyeInfo}, Half};
	use crate::channel::{RuleSet, RAMP_PROPERTIES};
	
	const DIFFUSE_R: ChannelDef = ChannelDef::new("diffuse[0]").dyeable();
	const DIFFUSE_B: ChannelDef = ChannelDef::new("diffuse[2]").dyeable();
	
	fn row_with(values: &[(usize, f64)]) -> ColorRow {
		let mut halfs = [Half::ZERO; 32];
		for (i, v) in values {
			halfs[*i] = Half::from_f64(*v);
		}
		ColorRow::from_halfs(2, &halfs)
	}
	
	fn dyed(mut row: ColorRow, channel: u8, flags: DyeFlags) -> ColorRow {
		row.dye = Some(DyeInfo {channel, template: 500, flags, raw: [0; 4]});
		row
	}
	
	/// Hands out fixed values and remembers every query
	#[derive(Default)]
	struct Fixed {
		queries: Vec<(TemplateType, u16, u32, String)>,
	}
	
	impl DyeSource for Fixed {
		fn dye_value(&mut self, template_type: TemplateType, template: u16, dye: u32, property: &str) -> Result<TemplateValue, ResolveError> {
			self.queries.push((template_type, template, dye, property.to_string()));
			match property {
				"diffuse" => Ok(TemplateValue::Color([0.25, 0.5, 0.75])),
				"metalness" => Ok(TemplateValue::Scalar(dye as f64 / 256.0)),
				_ => Err(ResolveError::MissingProperty(property.to_string())),
			}
		}
	}
	
	const DYES: ActiveDyes = ActiveDyes {channel_1: 36, channel_2: 0};
	
	#[test]
	fn plain_row_values() {
		let row = row_with(&[(0, 0.5), (2, 2.0), (16, 0.25)]);
		let mut source = Fixed::default();
		
		assert_eq!(resolve(&row, &DIFFUSE_R, TemplateType::Dawntrail, DYES, &mut source), 0.5);
		assert_eq!(resolve(&row, &DIFFUSE_B, TemplateType::Dawntrail, DYES, &mut source), 2.0);
		assert_eq!(resolve(&row, &ChannelDef::new("roughness"), TemplateType::Dawntrail, DYES, &mut source), 0.25);
		assert_eq!(resolve(&row, &ChannelDef::new("").default(1.0), TemplateType::Dawntrail, DYES, &mut source), 1.0);
		assert_eq!(resolve(&row, &ChannelDef::new("nonsense").default(0.5), TemplateType::Dawntrail, DYES, &mut source), 0.5);
		assert_eq!(resolve(&row, &ChannelDef::new("diffuse[7]").default(0.5), TemplateType::Dawntrail, DYES, &mut source), 0.5);
		assert!(source.queries.is_empty());
	}
	
	#[test]
	fn dye_replaces_component() {
		let row = dyed(row_with(&[(0, 0.5)]), 1, DyeFlags::DIFFUSE);
		let mut source = Fixed::default();
		
		assert_eq!(resolve(&row, &DIFFUSE_R, TemplateType::Dawntrail, DYES, &mut source), 0.25);
		assert_eq!(resolve(&row, &DIFFUSE_B, TemplateType::Dawntrail, DYES, &mut source), 0.75);
		assert_eq!(source.queries, vec![(TemplateType::Dawntrail, 500, 36, "diffuse".to_string()); 2]);
	}
	
	#[test]
	fn non_dyeable_never_queries() {
		let row = dyed(row_with(&[(0, 0.5)]), 1, DyeFlags::all());
		let mut source = Fixed::default();
		
		assert_eq!(resolve(&row, &ChannelDef::new("diffuse[0]"), TemplateType::Dawntrail, DYES, &mut source), 0.5);
		for property in &RAMP_PROPERTIES {
			for channel in property.channels.iter().filter(|v| !v.dyeable) {
				resolve(&row, channel, TemplateType::Dawntrail, DYES, &mut source);
				resolve(&row, channel, TemplateType::Endwalker, DYES, &mut source);
			}
		}
		assert!(source.queries.is_empty());
	}
	
	#[test]
	fn dye_needs_matching_channel_flag_and_template() {
		let mut source = Fixed::default();
		let base = row_with(&[(0, 0.5)]);
		
		// dye on channel 2 but only channel 1 has a dye selected
		assert_eq!(resolve(&dyed(base.clone(), 2, DyeFlags::DIFFUSE), &DIFFUSE_R, TemplateType::Dawntrail, DYES, &mut source), 0.5);
		// flag for a different property
		assert_eq!(resolve(&dyed(base.clone(), 1, DyeFlags::SPECULAR), &DIFFUSE_R, TemplateType::Dawntrail, DYES, &mut source), 0.5);
		// undyed
		assert_eq!(resolve(&dyed(base.clone(), 1, DyeFlags::DIFFUSE), &DIFFUSE_R, TemplateType::Dawntrail, ActiveDyes::default(), &mut source), 0.5);
		
		let mut no_template = dyed(base.clone(), 1, DyeFlags::DIFFUSE);
		if let Some(dye) = no_template.dye.as_mut() {
			dye.template = 0;
		}
		assert_eq!(resolve(&no_template, &DIFFUSE_R, TemplateType::Dawntrail, DYES, &mut source), 0.5);
		assert!(source.queries.is_empty());
		
		let second = ActiveDyes {channel_1: 0, channel_2: 12};
		assert_eq!(resolve(&dyed(base, 2, DyeFlags::DIFFUSE), &DIFFUSE_R, TemplateType::Dawntrail, second, &mut source), 0.25);
		assert_eq!(source.queries.len(), 1);
	}
	
	#[test]
	fn failed_dye_keeps_row_value() {
		let row = dyed(row_with(&[(16, 0.25)]), 1, DyeFlags::ROUGHNESS);
		let mut source = Fixed::default();
		
		assert_eq!(resolve(&row, &ChannelDef::new("roughness").dyeable(), TemplateType::Dawntrail, DYES, &mut source), 0.25);
		assert_eq!(source.queries.len(), 1);
	}
	
	#[test]
	fn add_then_clamp() {
		let channel = ChannelDef::new("metalness").dyeable().dawntrail(RuleSet {add: Some(0.75), max: Some(1.0), ..RuleSet::NONE});
		let mut source = Fixed::default();
		
		for value in [0.0, 0.25, 0.5, 0.9] {
			let row = row_with(&[(18, value)]);
			let resolved = resolve(&row, &channel, TemplateType::Dawntrail, DYES, &mut source);
			assert!(resolved <= 1.0);
			assert_eq!(resolved, (row.metalness + 0.75).min(1.0));
		}
		
		let row = dyed(row_with(&[(18, 0.0)]), 1, DyeFlags::METALLIC);
		let dyes = ActiveDyes {channel_1: 255, channel_2: 0};
		assert_eq!(resolve(&row, &channel, TemplateType::Dawntrail, dyes, &mut source), 1.0);
	}
	
	#[test]
	fn forced_values() {
		let row = dyed(row_with(&[(7, 12.0), (12, 0.5), (13, 0.25)]), 1, DyeFlags::all());
		let sheen_rate = &RAMP_PROPERTIES[1].channels[3];
		let sheen_tint = &RAMP_PROPERTIES[2].channels[3];
		let mut source = Fixed::default();
		
		assert_eq!(resolve(&row, sheen_rate, TemplateType::Endwalker, DYES, &mut source), 12.0);
		assert_eq!(resolve(&row, sheen_rate, TemplateType::Dawntrail, DYES, &mut source), 0.5);
		assert_eq!(resolve(&row, sheen_tint, TemplateType::Endwalker, DYES, &mut source), 0.98);
		assert_eq!(resolve(&row, sheen_tint, TemplateType::Dawntrail, DYES, &mut source), 0.25);
		
		let missing = ChannelDef::new("sheen_rate").default(0.125).endwalker(RuleSet {force_value: Some(ForcedValue::Key("nonsense")), ..RuleSet::NONE});
		assert_eq!(resolve(&row, &missing, TemplateType::Endwalker, DYES, &mut source), 0.125);
		assert!(source.queries.is_empty());
	}
	
	#[test]
	fn changed_key_with_expression() {
		let row = dyed(row_with(&[(3, 15.0), (16, 0.25)]), 1, DyeFlags::ROUGHNESS);
		let roughness = &RAMP_PROPERTIES[3].channels[0];
		let mut source = Fixed::default();
		
		assert!((resolve(&row, roughness, TemplateType::Endwalker, DYES, &mut source) - 0.45).abs() < 1e-9);
		assert_eq!(resolve(&row, roughness, TemplateType::Dawntrail, ActiveDyes::default(), &mut source), 0.25);
		// the dye is looked up under the base property
		assert_eq!(source.queries, vec![(TemplateType::Endwalker, 500, 36, "roughness".to_string())]);
		
		let shiny = row_with(&[(3, 40.0)]);
		assert_eq!(resolve(&shiny, roughness, TemplateType::Endwalker, DYES, &mut source), 0.0);
	}
	
	#[test]
	fn idempotent() {
		let row = dyed(row_with(&[(0, 0.5), (18, 0.5), (3, 9.0)]), 1, DyeFlags::all());
		let mut source = Fixed::default();
		
		for property in &RAMP_PROPERTIES {
			for channel in &property.channels {
				for template_type in [TemplateType::Endwalker, TemplateType::Dawntrail] {
					for dye in [0, 1, 36, 125] {
						let dyes = ActiveDyes {channel_1: dye, channel_2: dye};
						let first = resolve(&row, channel, template_type, dyes, &mut source);
						let second = resolve(&row, channel, template_type, dyes, &mut source);
						assert_eq!(first.to_bits(), second.to_bits());
					}
				}
			}
		}
	}
}
