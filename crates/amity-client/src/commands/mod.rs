// Commands are grouped by concern; each file adds an `impl Client` block.

pub mod friends;
pub mod messaging;
pub mod mood;
pub mod profile;
pub mod session;
