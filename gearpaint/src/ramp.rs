use serde::Serialize;
use gearfile::{mtrl::RowGroup, Mtrl, TemplateType};
use crate::{channel::{RampProperty, RAMP_PROPERTIES}, resolve::{resolve, ActiveDyes, DyeSource}};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RampStop {
	pub position: f64,
	pub row_number: u8,
	pub color: [f64; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ramp {
	pub property: &'static str,
	pub label: &'static str,
	pub group: RowGroup,
	pub stops: Vec<RampStop>,
}

impl Ramp {
	/// `Ramp 1 (Group A)`
	pub fn node_label(&self) -> String {
		format!("{} (Group {})", self.label, self.group)
	}
}

/// Position of stop `index` out of `count`, the custom positions only apply when there is one for every row
pub fn stop_position(index: usize, count: usize, positions: &[f64]) -> f64 {
	if count == positions.len() {
		if let Some(position) = positions.get(index) {
			return *position;
		}
	}
	
	match count {
		0 | 1 => 0.0,
		_ => index as f64 / (count - 1) as f64,
	}
}

/// One ramp per property and row group, groups without rows get none
pub fn build_ramps<D: DyeSource + ?Sized>(mtrl: &Mtrl, template_type: TemplateType, dyes: ActiveDyes, source: &mut D, positions: &[f64]) -> Vec<Ramp> {
	let mut ramps = Vec::with_capacity(RAMP_PROPERTIES.len() * 2);
	for property in &RAMP_PROPERTIES {
		for group in [RowGroup::A, RowGroup::B] {
			match build_ramp(mtrl, property, group, template_type, dyes, source, positions) {
				Some(ramp) => ramps.push(ramp),
				None => log::debug!("No rows in group {group} for {}", property.label),
			}
		}
	}
	
	ramps
}

fn build_ramp<D: DyeSource + ?Sized>(mtrl: &Mtrl, property: &RampProperty, group: RowGroup, template_type: TemplateType, dyes: ActiveDyes, source: &mut D, positions: &[f64]) -> Option<Ramp> {
	let rows = mtrl.rows_in_group(group).collect::<Vec<_>>();
	if rows.is_empty() {
		return None;
	}
	
	let stops = rows.iter().enumerate().map(|(i, row)| {
		let mut color = [0.0; 4];
		for (value, channel) in color.iter_mut().zip(&property.channels) {
			*value = resolve(row, channel, template_type, dyes, source);
		}
		
		RampStop {
			position: stop_position(i, rows.len(), positions),
			row_number: row.row_number,
			color,
		}
	}).collect();
	
	Some(Ramp {
		property: property.name,
		label: property.label,
		group,
		stops,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use crate::config::RAMP_POSITIONS;
	
	#[rstest]
	#[case(0, 16, 0.0)]
	#[case(1, 16, 0.0703)]
	#[case(15, 16, 1.0)]
	#[case(0, 1, 0.0)]
	#[case(1, 3, 0.5)]
	#[case(4, 8, 4.0 / 7.0)]
	fn positions(#[case] index: usize, #[case] count: usize, #[case] expected: f64) {
		assert_eq!(stop_position(index, count, &RAMP_POSITIONS), expected);
	}
	
	#[test]
	fn custom_positions_need_exact_count() {
		assert_eq!(stop_position(1, 2, &[0.0, 0.25]), 0.25);
		assert_eq!(stop_position(1, 2, &[0.0, 0.25, 1.0]), 1.0);
		assert_eq!(stop_position(0, 0, &[]), 0.0);
	}
}
