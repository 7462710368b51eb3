//! Command tokens registered by the host itself.

pub const HELP: &str = "/xlhelp";
pub const PLUGINS: &str = "/xlplugins";
pub const RELOAD: &str = "/xlreload";
pub const UNLOAD: &str = "/xlunload";

pub const MUTE: &str = "/xlmute";
pub const UNMUTE: &str = "/xlunmute";
pub const MUTE_LIST: &str = "/xlmutelist";
pub const WATCH: &str = "/xlwatch";
pub const FLAGS: &str = "/xlflags";

/// File name of an extension manifest inside an extension directory.
pub const MANIFEST_FILE: &str = "extension.json";
