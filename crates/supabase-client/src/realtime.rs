/// Placeholder for the realtime collaborator.
///
/// The type has no values: [`SupabaseClient::realtime`](crate::SupabaseClient::realtime)
/// always returns `None`. Only the endpoint
/// ([`SupabaseClient::realtime_url`](crate::SupabaseClient::realtime_url)) is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealtimeClient {}
