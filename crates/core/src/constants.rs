/// Key under which the sync queue is persisted in the key-value store.
pub const SYNC_QUEUE_KEY: &str = "syncQueue";

/// Key holding the remote session token.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Key holding the JSON-encoded current user.
pub const AUTH_USER_KEY: &str = "user_data";

/// Label used for transactions whose category could not be resolved.
pub const UNASSIGNED_CATEGORY: &str = "Non classé";

/// Default page size for transaction listings.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Default timeout applied to a single remote transmit during a flush.
pub const DEFAULT_TRANSMIT_TIMEOUT_SECS: u64 = 30;

/// Locale assigned to users created offline.
pub const DEFAULT_LOCALE: &str = "fr";

/// Notification type emitted when a goal reaches its target.
pub const GOAL_COMPLETED_NOTIFICATION: &str = "goal_completed";
