/// Database row types.
/// These correspond 1:1 to the SQLite schema defined in migrations.rs.

/// User record in the users table. The password hash is kept out of this
/// struct on purpose: reads use the safe projection and never select it.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub mobile_no: String,
    pub email_id: String,
    pub login_id: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// "firstName lastName", as shown in live-presence broadcasts.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
