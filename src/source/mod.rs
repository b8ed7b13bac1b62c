//! Input collaborators: session logs, skill evidence, the chat-service
//! export and hosted repository metadata.

pub(crate) mod chat_export;
pub(crate) mod events;
pub(crate) mod evidence;
pub(crate) mod repos;
pub(crate) mod sessions;
