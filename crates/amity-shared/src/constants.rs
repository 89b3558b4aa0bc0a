/// Application name
pub const APP_NAME: &str = "Amity";

/// Separator placed between the two sorted actor ids of a conversation channel.
/// Actor ids must not contain it.
pub const CONVERSATION_SEPARATOR: &str = "--";

/// Well-known broadcast channel every profile record is published to
pub const PROFILE_CHANNEL: &str = "amity:profiles";

/// Prefix of every object url minted by the bundled stores
pub const OBJECT_URL_PREFIX: &str = "amity:object:";

/// Activity value of a friend request / acceptance record
pub const ACTIVITY_FRIEND: &str = "friend";

/// Activity value of a friend revocation record
pub const ACTIVITY_FRIEND_CANCEL: &str = "friend_cancel";

/// Default database file name inside the data directory
pub const DEFAULT_DB_FILE: &str = "amity.db";
