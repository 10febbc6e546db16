/// Dye names by stain id, 0 is the undyed state
pub const DYE_NAMES: [&'static str; 126] = [
	"No Color",
	"Snow White",
	"Ash Grey",
	"Goobbue Grey",
	"Slate Grey",
	"Charcoal Grey",
	"Soot Black",
	"Rose Pink",
	"Lilac Purple",
	"Rolanberry Red",
	"Dalamud Red",
	"Rust Red",
	"Wine Red",
	"Coral Pink",
	"Blood Red",
	"Salmon Pink",
	"Sunset Orange",
	"Mesa Red",
	"Bark Brown",
	"Chocolate Brown",
	"Russet Brown",
	"Kobold Brown",
	"Cork Brown",
	"Qiqirn Brown",
	"Opo-opo Brown",
	"Aldgoat Brown",
	"Pumpkin Orange",
	"Acorn Brown",
	"Orchard Brown",
	"Chestnut Brown",
	"Gobbiebag Brown",
	"Shale Brown",
	"Mole Brown",
	"Loam Brown",
	"Bone White",
	"Ul Brown",
	"Desert Yellow",
	"Honey Yellow",
	"Millioncorn Yellow",
	"Coeurl Yellow",
	"Cream Yellow",
	"Halatali Yellow",
	"Raisin Brown",
	"Mud Green",
	"Sylph Green",
	"Lime Green",
	"Moss Green",
	"Meadow Green",
	"Olive Green",
	"Marsh Green",
	"Apple Green",
	"Cactuar Green",
	"Hunter Green",
	"Ochu Green",
	"Adamantoise Green",
	"Nophica Green",
	"Deepwood Green",
	"Celeste Green",
	"Turquoise Green",
	"Morbol Green",
	"Ice Blue",
	"Sky Blue",
	"Seafog Blue",
	"Peacock Blue",
	"Rhotano Blue",
	"Corpse Blue",
	"Ceruleum Blue",
	"Woad Blue",
	"Ink Blue",
	"Raptor Blue",
	"Othard Blue",
	"Storm Blue",
	"Void Blue",
	"Royal Blue",
	"Midnight Blue",
	"Shadow Blue",
	"Abyssal Blue",
	"Lavender Purple",
	"Gloom Purple",
	"Currant Purple",
	"Iris Purple",
	"Grape Purple",
	"Lotus Pink",
	"Colibri Pink",
	"Plum Purple",
	"Regal Purple",
	"Ruby Red",
	"Cherry Pink",
	"Canary Yellow",
	"Vanilla Yellow",
	"Dragoon Blue",
	"Turquoise Blue",
	"Gunmetal Black",
	"Pearl White",
	"Metallic Brass",
	"Carmine Red",
	"Neon Pink",
	"Bright Orange",
	"Neon Yellow",
	"Neon Green",
	"Azure Blue",
	"Pure White",
	"Jet Black",
	"Pastel Pink",
	"Dark Red",
	"Dark Brown",
	"Pastel Green",
	"Dark Green",
	"Pastel Blue",
	"Dark Blue",
	"Pastel Purple",
	"Dark Purple",
	"Metallic Silver",
	"Metallic Gold",
	"Metallic Red",
	"Metallic Orange",
	"Metallic Yellow",
	"Metallic Green",
	"Metallic Sky Blue",
	"Metallic Blue",
	"Metallic Purple",
	"Violet Purple",
	"Metallic Pink",
	"Metallic Ruby Red",
	"Metallic Cobalt Green",
	"Metallic Dark Blue",
];

pub fn dye_name(id: u32) -> Option<&'static str> {
	DYE_NAMES.get(id as usize).copied()
}

pub fn dyes() -> impl Iterator<Item = (u32, &'static str)> {
	DYE_NAMES.iter().enumerate().skip(1).map(|(i, v)| (i as u32, *v))
}
