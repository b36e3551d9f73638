// Fundamental configuration constants
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const WS_PATH: &str = "ws";

// Identity defaults applied when a join carries no username or avatar
pub const DEFAULT_USERNAME: &str = "Anonymous";
pub const DEFAULT_AVATAR: &str = "https://via.placeholder.com/100/CCCCCC/FFFFFF?text=Default";

// How long a typing indicator stays alive without being re-armed
pub const DEFAULT_TYPING_WINDOW_MS: u64 = 1000;
