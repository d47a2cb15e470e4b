//! Engine-wide constants
//!
//! Defaults for the thresholds in `EngineConfig`. All distances are in
//! logical pixels measured from the newest end of the inverted list.

/// Scroll offset under which newly arriving messages count as "in view".
pub const MSG_VISIBLE_THRESHOLD: f64 = 250.0;

/// Scroll offset over which the floating "new messages" counter appears.
pub const VERTICAL_OFFSET_THRESHOLD: f64 = 200.0;

/// Scroll offset under which the list follows new messages to the bottom.
pub const AUTOSCROLL_TO_TOP_THRESHOLD: f64 = 250.0;

/// Linked-comment loads start with this many messages. The "scroll to newer"
/// affordance stays hidden until more than this are loaded.
pub const MIN_MESSAGES_FOR_NEWER_AFFORDANCE: usize = 25;

/// Offset applied by "mark as unread" so the marker sits strictly before the
/// chosen message.
pub const MARK_UNREAD_EPSILON_MS: i64 = 1;

/// Environment variable naming an extra log file
pub const LOG_FILE_ENV: &str = "LEDGERCHAT_LOG_FILE";
