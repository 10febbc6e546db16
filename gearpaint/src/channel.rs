use serde::Serialize;
use gearfile::{mtrl::{ColorRow, RowField}, TemplateType};
use crate::resolve::ResolveError;

/// Replaces a channel value outright, resolution stops once one applies
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ForcedValue {
	Constant(f64),
	/// Another row key, read without any dyeing or transforms
	Key(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NamedExpr {
	/// Legacy gloss (5 dull ..= 25 shiny) to roughness (0.9 ..= 0)
	GlossToRoughness,
}

impl NamedExpr {
	pub fn eval(&self, x: f64) -> Result<f64, ResolveError> {
		let value = match self {
			Self::GlossToRoughness => 0.9 * (1.0 - (x - 5.0) / 20.0),
		};
		
		if !value.is_finite() {
			return Err(ResolveError::Expression{expr: *self, input: x, value});
		}
		
		Ok(value)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Transform {
	Add(f64),
	Subtract(f64),
	Expr(NamedExpr),
	Scale(f64),
	ClampMin(f64),
	ClampMax(f64),
}

impl Transform {
	pub fn apply(&self, value: f64) -> Result<f64, ResolveError> {
		Ok(match self {
			Self::Add(v) => value + v,
			Self::Subtract(v) => value - v,
			Self::Expr(expr) => expr.eval(value)?,
			Self::Scale(v) => value * v,
			Self::ClampMin(v) => value.max(*v),
			Self::ClampMax(v) => value.min(*v),
		})
	}
}

/// Template specific overrides of a channel. The transforms have no order of their own,
/// they always run as add, subtract, expression, scale, min, max.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RuleSet {
	pub change_key: Option<&'static str>,
	pub force_value: Option<ForcedValue>,
	pub add: Option<f64>,
	pub subtract: Option<f64>,
	pub expr: Option<NamedExpr>,
	pub scale: Option<f64>,
	pub min: Option<f64>,
	pub max: Option<f64>,
}

impl RuleSet {
	pub const NONE: Self = Self {
		change_key: None,
		force_value: None,
		add: None,
		subtract: None,
		expr: None,
		scale: None,
		min: None,
		max: None,
	};
	
	pub fn transforms(&self) -> impl Iterator<Item = Transform> {
		[
			self.add.map(Transform::Add),
			self.subtract.map(Transform::Subtract),
			self.expr.map(Transform::Expr),
			self.scale.map(Transform::Scale),
			self.min.map(Transform::ClampMin),
			self.max.map(Transform::ClampMax),
		].into_iter().flatten()
	}
}

impl Default for RuleSet {
	fn default() -> Self {
		Self::NONE
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelDef {
	/// Row key, `name[i]` picks a component of a color, empty always yields the default
	pub key: &'static str,
	pub default: f64,
	pub dyeable: bool,
	pub endwalker: RuleSet,
	pub dawntrail: RuleSet,
}

impl ChannelDef {
	pub const fn new(key: &'static str) -> Self {
		Self {
			key,
			default: 0.0,
			dyeable: false,
			endwalker: RuleSet::NONE,
			dawntrail: RuleSet::NONE,
		}
	}
	
	pub const fn dyeable(mut self) -> Self {
		self.dyeable = true;
		self
	}
	
	pub const fn default(mut self, default: f64) -> Self {
		self.default = default;
		self
	}
	
	pub const fn endwalker(mut self, rules: RuleSet) -> Self {
		self.endwalker = rules;
		self
	}
	
	pub const fn dawntrail(mut self, rules: RuleSet) -> Self {
		self.dawntrail = rules;
		self
	}
	
	pub fn rules(&self, template_type: TemplateType) -> &RuleSet {
		match template_type {
			TemplateType::Endwalker => &self.endwalker,
			TemplateType::Dawntrail => &self.dawntrail,
		}
	}
}

/// One color ramp per row group, its rgba channels filled from the rows
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RampProperty {
	pub name: &'static str,
	pub label: &'static str,
	pub channels: [ChannelDef; 4],
}

// angles can be negative, ramps can't
const ADD_1000: RuleSet = RuleSet {add: Some(1000.0), ..RuleSet::NONE};

pub static RAMP_PROPERTIES: [RampProperty; 6] = [
	RampProperty {
		name: "Diffuse Colors",
		label: "Ramp 1",
		channels: [
			ChannelDef::new("diffuse[0]").dyeable(),
			ChannelDef::new("diffuse[1]").dyeable(),
			ChannelDef::new("diffuse[2]").dyeable(),
			ChannelDef::new("").default(1.0),
		],
	},
	RampProperty {
		name: "Specular & Sheen Rate",
		label: "Ramp 2",
		channels: [
			ChannelDef::new("specular[0]").dyeable(),
			ChannelDef::new("specular[1]").dyeable(),
			ChannelDef::new("specular[2]").dyeable(),
			ChannelDef::new("sheen_rate").dyeable().endwalker(RuleSet {force_value: Some(ForcedValue::Key("specular_unknown")), ..RuleSet::NONE}),
		],
	},
	RampProperty {
		name: "Emissive & Sheen Tint",
		label: "Ramp 3",
		channels: [
			ChannelDef::new("emissive[0]").dyeable(),
			ChannelDef::new("emissive[1]").dyeable(),
			ChannelDef::new("emissive[2]").dyeable(),
			ChannelDef::new("sheen_tint_rate").dyeable().endwalker(RuleSet {force_value: Some(ForcedValue::Constant(0.98)), ..RuleSet::NONE}),
		],
	},
	RampProperty {
		name: "PBR & Tiles",
		label: "Ramp 4",
		channels: [
			ChannelDef::new("roughness").dyeable().endwalker(RuleSet {
				change_key: Some("diffuse_unknown"),
				expr: Some(NamedExpr::GlossToRoughness),
				min: Some(0.0),
				max: Some(1.0),
				..RuleSet::NONE
			}),
			ChannelDef::new("metalness").dyeable(),
			ChannelDef::new("tile_map_id"),
			ChannelDef::new("tile_map_opacity"),
		],
	},
	RampProperty {
		name: "Tile Transforms",
		label: "Ramp 5",
		channels: [
			ChannelDef::new("tile_scale_x"),
			ChannelDef::new("tile_scale_y"),
			ChannelDef::new("tile_rotation_deg").endwalker(ADD_1000).dawntrail(ADD_1000),
			ChannelDef::new("tile_shear_deg").endwalker(ADD_1000).dawntrail(ADD_1000),
		],
	},
	RampProperty {
		name: "Sphere Map",
		label: "Ramp 6",
		channels: [
			ChannelDef::new("sphere_map_id").dyeable().default(1.0),
			ChannelDef::new("sphere_map_opacity").dyeable(),
			ChannelDef::new(""),
			ChannelDef::new(""),
		],
	},
];

// ----------

/// Splits `name[i]` into its base and index
pub fn split_key(key: &str) -> (&str, Option<usize>) {
	match key.split_once('[') {
		Some((base, rest)) => (base, rest.strip_suffix(']').and_then(|v| v.parse().ok())),
		None => (key, None),
	}
}

pub fn lookup(row: &ColorRow, key: &str) -> Result<f64, ResolveError> {
	let (base, index) = split_key(key);
	let unknown = || ResolveError::UnknownKey(key.to_string());
	if key.contains('[') && index.is_none() {
		return Err(unknown());
	}
	
	match (row.field(base).ok_or_else(unknown)?, index) {
		(RowField::Scalar(v), None) => Ok(v),
		(RowField::Vector(v), Some(i)) => v.get(i).copied().ok_or_else(unknown),
		_ => Err(unknown()),
	}
}
