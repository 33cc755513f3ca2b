pub const SUCCESS: i32 = 0;
pub const ERR_GENERIC: i32 = 1;
/// The remote aggregation service could not be reached or rejected the
/// request outright.
pub const ERR_API: i32 = 102;
