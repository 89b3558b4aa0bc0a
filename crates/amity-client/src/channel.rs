//! Conversation channel ids.

use amity_shared::constants::CONVERSATION_SEPARATOR;
use amity_shared::{Actor, ChannelName};

/// Channel shared by the conversation between `a` and `b`: both ids sorted
/// and joined with [`CONVERSATION_SEPARATOR`]. Commutative and deterministic.
///
/// Actor ids must not contain the separator; this is not validated outside
/// debug builds.
pub fn conversation_channel(a: &Actor, b: &Actor) -> ChannelName {
    debug_assert!(
        !a.as_str().contains(CONVERSATION_SEPARATOR) && !b.as_str().contains(CONVERSATION_SEPARATOR),
        "actor ids must not contain the conversation separator"
    );

    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    ChannelName(format!("{first}{CONVERSATION_SEPARATOR}{second}"))
}
