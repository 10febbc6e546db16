pub mod game {
	pub mod mtrl;
	pub use mtrl::Mtrl;
	pub mod stm;
	pub use stm::{StainingTemplateFile, TemplateType};
	pub mod stain;
}
