//! Field validation for credential submissions.

use std::sync::LazyLock;

use regex::Regex;

use ecomm_core::ErrorMessage;

use crate::model::LoginRequest;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .expect("email regex")
});

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{5,8}$").expect("username regex"));

static PASSWORD_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9@_-]{8,20}$").expect("password regex"));

static TELEPHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9+]+$").expect("telephone regex"));

/// A validation rule. Each rule has exactly one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    Email,
    /// 5 to 8 ASCII letters and digits.
    Username,
    /// 8 to 20 of `[A-Za-z0-9@_-]` with at least one uppercase, one
    /// lowercase and one digit.
    Password,
    /// Digits and `+` only.
    Telephone,
    /// At least `n` characters.
    Gte(usize),
}

impl Rule {
    pub fn message(&self) -> String {
        match self {
            Rule::Required => "is required".to_string(),
            Rule::Email => "please input a correct email format".to_string(),
            Rule::Username => {
                "please use only uppercase and lowercase letter and number and min 5 and max 8 alphanumeric"
                    .to_string()
            }
            Rule::Password => {
                "please use only uppercase, lowercase, number and must have 1 uppercase. lowercase, number, @, _, -, min 8 and max 20"
                    .to_string()
            }
            Rule::Telephone => "please use only number and +".to_string(),
            Rule::Gte(n) => format!("please input greater than equal to {}", n),
        }
    }

    /// Whether `value` satisfies the rule. Format rules pass on empty
    /// input; emptiness is `Required`'s concern.
    pub fn check(&self, value: &str) -> bool {
        match self {
            Rule::Required => !value.is_empty(),
            _ if value.is_empty() => true,
            Rule::Email => EMAIL_RE.is_match(value),
            Rule::Username => USERNAME_RE.is_match(value),
            Rule::Password => {
                PASSWORD_CHARS_RE.is_match(value)
                    && value.chars().any(|c| c.is_ascii_uppercase())
                    && value.chars().any(|c| c.is_ascii_lowercase())
                    && value.chars().any(|c| c.is_ascii_digit())
            }
            Rule::Telephone => TELEPHONE_RE.is_match(value),
            Rule::Gte(n) => value.chars().count() >= *n,
        }
    }
}

/// Ordered per-field rules for a login submission.
///
/// Fields are checked in declaration order and, within a field, the first
/// failing rule produces that field's only violation.
#[derive(Debug, Clone)]
pub struct LoginValidator {
    email: Vec<Rule>,
    password: Vec<Rule>,
}

impl Default for LoginValidator {
    fn default() -> Self {
        Self {
            email: vec![Rule::Required, Rule::Email],
            password: vec![Rule::Required],
        }
    }
}

impl LoginValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule to a field. Unknown field names are ignored.
    pub fn with_rule(mut self, field: &str, rule: Rule) -> Self {
        match field {
            "email" => self.email.push(rule),
            "password" => self.password.push(rule),
            other => tracing::warn!(field = other, "validator: no such field"),
        }
        self
    }

    pub fn validate(&self, req: &LoginRequest) -> Vec<ErrorMessage> {
        [("email", &req.email, &self.email), ("password", &req.password, &self.password)]
            .into_iter()
            .filter_map(|(field, value, rules)| {
                rules
                    .iter()
                    .find(|r| !r.check(value))
                    .map(|r| ErrorMessage::new(field, r.message()))
            })
            .collect()
    }
}
