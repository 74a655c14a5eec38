//! Declarative user specification and derived directory identity.
//!
//! A [`UserSpec`] is rebuilt by the host on every lifecycle call; nothing here
//! is cached. The derived distinguished name is the object's durable identity
//! once a create succeeds, which is why every field is immutable after create.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use tracing::debug;
use validator::Validate;

use crate::dn::DistinguishedName;
use crate::Result;
use adprov_core::error::Error;

/// Sentinel for the `pwdLastSet` attribute meaning "password already set",
/// which suppresses the change-password prompt at next logon.
const PWD_LAST_SET_ALREADY: &str = "-1";

/// Object classes assigned to every created user entry.
pub(crate) const USER_OBJECT_CLASSES: &[&str] = &["organizationalPerson", "person", "top", "user"];

/// Password policy options for a new account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountOptions {
    /// Whether the user must change the password at next logon.
    pub must_change_password: bool,
    /// Whether the user is barred from changing the password.
    pub cannot_change_password: bool,
    /// Whether the password is exempt from expiry.
    pub password_never_expires: bool,
}

impl AccountOptions {
    /// Creates the default options (password change required at next logon).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            must_change_password: true,
            cannot_change_password: false,
            password_never_expires: false,
        }
    }

    /// Sets whether the password must be changed at next logon.
    #[must_use]
    pub const fn with_must_change_password(mut self, must_change: bool) -> Self {
        self.must_change_password = must_change;
        self
    }

    /// Sets whether the user is barred from changing the password.
    #[must_use]
    pub const fn with_cannot_change_password(mut self, cannot_change: bool) -> Self {
        self.cannot_change_password = cannot_change;
        self
    }

    /// Sets whether the password is exempt from expiry.
    #[must_use]
    pub const fn with_password_never_expires(mut self, never_expires: bool) -> Self {
        self.password_never_expires = never_expires;
        self
    }
}

impl Default for AccountOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// The `userAccountControl` bitmask for a new account.
///
/// The base value enables the account as a normal user; the two option bits
/// are independent, so the final value is always the base plus zero, one or
/// both deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserAccountControl(u32);

impl UserAccountControl {
    /// No password required.
    pub const PASSWD_NOTREQD: u32 = 0x0020;
    /// User cannot change own password.
    pub const PASSWD_CANT_CHANGE: u32 = 0x0040;
    /// Standard enabled user account.
    pub const NORMAL_ACCOUNT: u32 = 0x0200;
    /// Password never expires.
    pub const DONT_EXPIRE_PASSWORD: u32 = 0x0001_0000;

    /// Computes the bitmask for the given account options.
    #[must_use]
    pub const fn for_options(options: AccountOptions) -> Self {
        let mut value = Self::NORMAL_ACCOUNT | Self::PASSWD_NOTREQD;
        if options.cannot_change_password {
            value |= Self::PASSWD_CANT_CHANGE;
        }
        if options.password_never_expires {
            value |= Self::DONT_EXPIRE_PASSWORD;
        }
        Self(value)
    }

    /// Returns the numeric bitmask value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for UserAccountControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declarative specification of a directory user object.
#[derive(Debug, Clone, Validate)]
pub struct UserSpec {
    /// Given name, used only to compute the display name.
    #[validate(length(min = 1, message = "first_name must not be empty"))]
    pub first_name: String,
    /// Surname, written as the `sn` attribute.
    #[validate(length(min = 1, message = "last_name must not be empty"))]
    pub last_name: String,
    /// Domain suffix of the user principal name.
    #[validate(length(min = 1, message = "domain must not be empty"))]
    pub domain: String,
    /// Distinguished name of the organizational unit the object lives under.
    #[validate(length(min = 1, message = "ou_distinguished_name must not be empty"))]
    pub ou_distinguished_name: String,
    /// Short account name (`sAMAccountName`).
    #[validate(length(min = 1, message = "logon_name must not be empty"))]
    pub logon_name: String,
    /// Initial password; hashing is delegated to the directory server.
    pub password: SecretString,
    /// Optional description attribute; omitted entirely when empty.
    pub description: Option<String>,
    /// Password policy options.
    pub options: AccountOptions,
}

impl UserSpec {
    /// Creates a builder with the required fields.
    #[must_use]
    pub fn builder(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        domain: impl Into<String>,
        ou_distinguished_name: impl Into<String>,
        logon_name: impl Into<String>,
        password: impl Into<String>,
    ) -> UserSpecBuilder {
        UserSpecBuilder {
            first_name: first_name.into(),
            last_name: last_name.into(),
            domain: domain.into(),
            ou_distinguished_name: ou_distinguished_name.into(),
            logon_name: logon_name.into(),
            password: SecretString::from(password.into()),
            description: None,
            options: AccountOptions::new(),
        }
    }

    /// Validates the required fields before any directory call is made.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when a required field is empty or the
    /// organizational-unit path is not a well-formed distinguished name.
    pub fn validate_fields(&self) -> Result<()> {
        Validate::validate(self)?;
        if self.password.expose_secret().is_empty() {
            return Err(Error::Validation("password must not be empty".to_string()));
        }
        DistinguishedName::parse(&self.ou_distinguished_name).map_err(|err| {
            Error::Validation(format!("ou_distinguished_name is malformed: {err}"))
        })?;
        Ok(())
    }

    /// Display name of the object (`firstName lastName`).
    #[must_use]
    pub fn common_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Distinguished name the object is created under.
    ///
    /// This is the resource's durable identity: `CN=<common name>,<ou>`,
    /// character-for-character.
    #[must_use]
    pub fn distinguished_name(&self) -> String {
        format!("CN={},{}", self.common_name(), self.ou_distinguished_name)
    }

    /// Login identifier of the form `logon@domain`.
    #[must_use]
    pub fn user_principal_name(&self) -> String {
        format!("{}@{}", self.logon_name, self.domain)
    }

    /// The `userAccountControl` bitmask derived from the account options.
    #[must_use]
    pub const fn account_control(&self) -> UserAccountControl {
        UserAccountControl::for_options(self.options)
    }

    /// Builds the attribute set submitted with the add operation.
    #[must_use]
    pub fn add_attributes(&self) -> Vec<(String, Vec<String>)> {
        if self.options.cannot_change_password {
            debug!("account control: barring password change");
        }
        if self.options.password_never_expires {
            debug!("account control: exempting password from expiry");
        }

        let mut attributes = vec![
            (
                "objectClass".to_string(),
                USER_OBJECT_CLASSES
                    .iter()
                    .map(|class| (*class).to_string())
                    .collect(),
            ),
            ("sAMAccountName".to_string(), vec![self.logon_name.clone()]),
            (
                "userPrincipalName".to_string(),
                vec![self.user_principal_name()],
            ),
            ("name".to_string(), vec![self.common_name()]),
            ("sn".to_string(), vec![self.last_name.clone()]),
            (
                "userPassword".to_string(),
                vec![self.password.expose_secret().to_string()],
            ),
            (
                "userAccountControl".to_string(),
                vec![self.account_control().to_string()],
            ),
        ];

        if !self.options.must_change_password {
            debug!("suppressing change-password prompt at next logon");
            attributes.push((
                "pwdLastSet".to_string(),
                vec![PWD_LAST_SET_ALREADY.to_string()],
            ));
        }

        if let Some(description) = self.description.as_deref() {
            if !description.is_empty() {
                debug!(description = %description, "setting description attribute");
                attributes.push(("description".to_string(), vec![description.to_string()]));
            }
        }

        attributes
    }
}

/// Builder for [`UserSpec`].
#[derive(Debug)]
pub struct UserSpecBuilder {
    first_name: String,
    last_name: String,
    domain: String,
    ou_distinguished_name: String,
    logon_name: String,
    password: SecretString,
    description: Option<String>,
    options: AccountOptions,
}

impl UserSpecBuilder {
    /// Sets the description attribute.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Overrides the password policy options.
    #[must_use]
    pub fn options(mut self, options: AccountOptions) -> Self {
        self.options = options;
        self
    }

    /// Finalises the builder and returns the [`UserSpec`].
    #[must_use]
    pub fn build(self) -> UserSpec {
        UserSpec {
            first_name: self.first_name,
            last_name: self.last_name,
            domain: self.domain,
            ou_distinguished_name: self.ou_distinguished_name,
            logon_name: self.logon_name,
            password: self.password,
            description: self.description,
            options: self.options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_spec() -> UserSpec {
        UserSpec::builder(
            "Jane",
            "Doe",
            "example.com",
            "OU=Users,DC=example,DC=com",
            "jdoe",
            "P@ss1",
        )
        .build()
    }

    fn attribute<'a>(
        attributes: &'a [(String, Vec<String>)],
        name: &str,
    ) -> Option<&'a Vec<String>> {
        attributes
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, values)| values)
    }

    #[test]
    fn distinguished_name_is_exact_concatenation() {
        let spec = sample_spec();
        assert_eq!(spec.common_name(), "Jane Doe");
        assert_eq!(
            spec.distinguished_name(),
            "CN=Jane Doe,OU=Users,DC=example,DC=com"
        );
    }

    #[test]
    fn user_principal_name_joins_logon_and_domain() {
        assert_eq!(sample_spec().user_principal_name(), "jdoe@example.com");
    }

    #[test]
    fn account_control_covers_all_flag_combinations() {
        let cases = [
            (false, false, 544),
            (true, false, 608),
            (false, true, 66080),
            (true, true, 66144),
        ];
        for (cannot_change, never_expires, expected) in cases {
            let options = AccountOptions::new()
                .with_cannot_change_password(cannot_change)
                .with_password_never_expires(never_expires);
            assert_eq!(
                UserAccountControl::for_options(options).value(),
                expected,
                "cannot_change={cannot_change} never_expires={never_expires}"
            );
        }
    }

    #[test]
    fn account_control_renders_as_decimal() {
        let options = AccountOptions::new().with_password_never_expires(true);
        assert_eq!(UserAccountControl::for_options(options).to_string(), "66080");
    }

    #[test]
    fn must_change_password_true_omits_pwd_last_set() {
        let attributes = sample_spec().add_attributes();
        assert!(attribute(&attributes, "pwdLastSet").is_none());
    }

    #[test]
    fn must_change_password_false_adds_single_sentinel() {
        let mut spec = sample_spec();
        spec.options = AccountOptions::new().with_must_change_password(false);
        let attributes = spec.add_attributes();
        assert_eq!(
            attribute(&attributes, "pwdLastSet"),
            Some(&vec!["-1".to_string()])
        );
        let sentinel_count = attributes
            .iter()
            .filter(|(attr, _)| attr == "pwdLastSet")
            .count();
        assert_eq!(sentinel_count, 1);
    }

    #[test]
    fn empty_description_is_omitted() {
        let mut spec = sample_spec();
        spec.description = Some(String::new());
        assert!(attribute(&spec.add_attributes(), "description").is_none());

        spec.description = None;
        assert!(attribute(&spec.add_attributes(), "description").is_none());
    }

    #[test]
    fn non_empty_description_is_included_unchanged() {
        let spec = UserSpec::builder(
            "Jane",
            "Doe",
            "example.com",
            "OU=Users,DC=example,DC=com",
            "jdoe",
            "P@ss1",
        )
        .description("service account")
        .build();
        assert_eq!(
            attribute(&spec.add_attributes(), "description"),
            Some(&vec!["service account".to_string()])
        );
    }

    #[test]
    fn add_attributes_carry_core_identity() {
        let attributes = sample_spec().add_attributes();
        assert_eq!(
            attribute(&attributes, "objectClass"),
            Some(&vec![
                "organizationalPerson".to_string(),
                "person".to_string(),
                "top".to_string(),
                "user".to_string(),
            ])
        );
        assert_eq!(
            attribute(&attributes, "sAMAccountName"),
            Some(&vec!["jdoe".to_string()])
        );
        assert_eq!(
            attribute(&attributes, "userPrincipalName"),
            Some(&vec!["jdoe@example.com".to_string()])
        );
        assert_eq!(
            attribute(&attributes, "name"),
            Some(&vec!["Jane Doe".to_string()])
        );
        assert_eq!(attribute(&attributes, "sn"), Some(&vec!["Doe".to_string()]));
        assert_eq!(
            attribute(&attributes, "userAccountControl"),
            Some(&vec!["544".to_string()])
        );
    }

    #[test]
    fn validation_rejects_empty_required_fields() {
        let mut spec = sample_spec();
        spec.first_name = String::new();
        assert!(matches!(
            spec.validate_fields(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn validation_rejects_empty_password() {
        let mut spec = sample_spec();
        spec.password = SecretString::from(String::new());
        assert!(matches!(
            spec.validate_fields(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn validation_rejects_malformed_ou() {
        let mut spec = sample_spec();
        spec.ou_distinguished_name = "not a dn".to_string();
        assert!(matches!(
            spec.validate_fields(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn validation_accepts_complete_spec() {
        assert!(sample_spec().validate_fields().is_ok());
    }

    #[test]
    fn debug_output_redacts_password() {
        let rendered = format!("{:?}", sample_spec());
        assert!(!rendered.contains("P@ss1"));
    }
}
