use super::{FormData, FormErrors, REQUIRED};

const USERNAME_MAX: usize = 150;
const PASSWORD_MIN: usize = 8;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignUpForm {
    pub username: String,
    pub password1: String,
    pub password2: String,
    pub errors: FormErrors,
}

/// Fields that passed signup validation; the password is still in clear text.
#[derive(Debug, Clone, PartialEq)]
pub struct SignUp {
    pub username: String,
    pub password: String,
}

impl SignUpForm {
    pub fn bind(data: &FormData) -> Self {
        Self {
            username: data.text("username"),
            password1: data.raw("password1"),
            password2: data.raw("password2"),
            errors: FormErrors::default(),
        }
    }

    /// Validates everything except username uniqueness, which needs the database.
    pub fn clean(&mut self) -> Option<SignUp> {
        let mut errors = FormErrors::default();

        if self.username.is_empty() {
            errors.add("username", REQUIRED);
        } else if self.username.chars().count() > USERNAME_MAX {
            errors.add(
                "username",
                format!("Ensure this value has at most {USERNAME_MAX} characters."),
            );
        } else if !self
            .username
            .chars()
            .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
        {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if self.password1 != self.password2 {
            errors.add("password2", "The two password fields didn’t match.");
        } else {
            if self.password2.chars().count() < PASSWORD_MIN {
                errors.add(
                    "password2",
                    format!("This password is too short. It must contain at least {PASSWORD_MIN} characters."),
                );
            }
            if self.password2.chars().all(|c| c.is_ascii_digit()) {
                errors.add("password2", "This password is entirely numeric.");
            }
        }

        self.errors = errors;
        if !self.errors.is_empty() {
            return None;
        }
        Some(SignUp {
            username: self.username.clone(),
            password: self.password1.clone(),
        })
    }

    pub fn reject_taken_username(&mut self) {
        self.errors
            .add("username", "A user with that username already exists.");
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub errors: FormErrors,
}

impl LoginForm {
    pub fn bind(data: &FormData) -> Self {
        Self {
            username: data.text("username"),
            password: data.raw("password"),
            errors: FormErrors::default(),
        }
    }

    pub fn clean(&mut self) -> bool {
        let mut errors = FormErrors::default();
        if self.username.is_empty() {
            errors.add("username", REQUIRED);
        }
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        self.errors = errors;
        self.errors.is_empty()
    }

    pub fn reject_credentials(&mut self) {
        self.password.clear();
        self.errors.add_non_field(
            "Please enter a correct username and password. Note that both fields may be case-sensitive.",
        );
    }
}

/// Only same-site absolute paths are followed after login.
///
/// Browsers drop tabs and newlines from URLs, so any control or whitespace
/// character disqualifies the path before the `//` check.
pub fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(|c| c.is_control() || c.is_whitespace()) =>
        {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> FormData {
        FormData::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn signup_accepts_matching_strong_passwords() {
        let mut form = SignUpForm::bind(&data(&[
            ("username", "glam.queen"),
            ("password1", "demo12345"),
            ("password2", "demo12345"),
        ]));
        let signup = form.clean().unwrap();
        assert_eq!(signup.username, "glam.queen");
    }

    #[test]
    fn signup_rejects_weak_or_mismatched_passwords() {
        let mut form = SignUpForm::bind(&data(&[
            ("username", "bad name!"),
            ("password1", "12345678"),
            ("password2", "12345678"),
        ]));
        assert!(form.clean().is_none());
        assert!(form.errors.has("username"));
        assert_eq!(
            form.errors.field("password2"),
            vec!["This password is entirely numeric.".to_string()]
        );

        let mut form = SignUpForm::bind(&data(&[
            ("username", "ok"),
            ("password1", "demo12345"),
            ("password2", "demo12346"),
        ]));
        assert!(form.clean().is_none());
        assert!(form.errors.has("password2"));
    }

    #[test]
    fn next_must_stay_on_site() {
        assert_eq!(safe_next(Some("/trends/?days=7")), "/trends/?days=7");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(Some("/\t/evil.example/")), "/");
        assert_eq!(safe_next(Some("/\r\n/evil.example/")), "/");
        assert_eq!(safe_next(Some("/ /evil.example/")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
