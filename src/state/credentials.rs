use secrecy::SecretString;

/// Basic-auth credentials shared read-only by every fetch in a run
///
/// The password stays wrapped in [`SecretString`] so it never shows up in
/// `Debug` output or logs.
#[derive(Debug)]
pub struct Credentials {
    username: String,
    password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }
}
