use uuid::Uuid;

/// Length of a generated session id.
pub const SESSION_ID_LEN: usize = 8;

/// Short random id used to scope a roster in a shared remote table.
pub fn generate_session_id() -> String {
    Uuid::new_v4().simple().to_string()[..SESSION_ID_LEN].to_string()
}
