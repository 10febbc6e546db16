pub mod half_float;
pub mod tile_matrix;
