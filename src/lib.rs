pub mod ai;
pub mod analyze;
pub mod audio;
pub mod decode;
pub mod encode;
pub mod error;
pub mod overlay;
pub mod script;
pub mod synthesize;
