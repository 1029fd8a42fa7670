pub mod archive;
pub mod id;
pub mod sanitize;
pub mod temp_dir;
