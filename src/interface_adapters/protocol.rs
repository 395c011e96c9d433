use serde::Serialize;

// Form body of the login endpoint (application/x-www-form-urlencoded).
#[derive(Serialize)]
pub struct LoginForm<'a> {
    pub username: &'a str,
    pub password: &'a str,
}
