//! Field validation for fetched profiles.
//!
//! Remote services are user-operated and serve whatever they like; nothing
//! reaches the reconciler without passing these checks. Validation stops at
//! the first violation.

use idsync_types::ProfileRecord;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("phone must contain only digits")]
    PhoneNotNumeric,

    #[error("email is not well-formed: {0}")]
    BadEmail(String),

    #[error("years of experience cannot be negative: {0}")]
    NegativeYoe(i64),

    #[error("website is not a valid http(s) URL: {0}")]
    BadWebsite(String),
}

/// Check a fetched profile before reconciliation.
///
/// Required: first/last name, phone (digits only), email, company,
/// designation, github and linkedin handles. `yoe` must be non-negative.
/// `website` is optional but must be an absolute http(s) URL when present.
pub fn validate_profile(profile: &ProfileRecord) -> Result<(), ValidationError> {
    require(&profile.first_name, "first_name")?;
    require(&profile.last_name, "last_name")?;

    require(&profile.phone, "phone")?;
    if !profile.phone.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::PhoneNotNumeric);
    }

    require(&profile.email, "email")?;
    if !is_well_formed_email(&profile.email) {
        return Err(ValidationError::BadEmail(profile.email.clone()));
    }

    if profile.yoe < 0 {
        return Err(ValidationError::NegativeYoe(profile.yoe));
    }

    require(&profile.company, "company")?;
    require(&profile.designation, "designation")?;
    require(&profile.github_id, "github_id")?;
    require(&profile.linkedin_id, "linkedin_id")?;

    if !profile.website.is_empty() && !is_http_url(&profile.website) {
        return Err(ValidationError::BadWebsite(profile.website.clone()));
    }

    Ok(())
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

/// `local@domain` with a non-empty local part and a dotted domain. Anything
/// fancier belongs to the address's own mail server.
fn is_well_formed_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || email.contains(' ') {
        return false;
    }
    let Some((head, tail)) = domain.rsplit_once('.') else {
        return false;
    };
    !head.is_empty() && !tail.is_empty()
}

fn is_http_url(website: &str) -> bool {
    match url::Url::parse(website) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ProfileRecord {
        ProfileRecord {
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john@x.com".into(),
            phone: "1234567890".into(),
            yoe: 5,
            company: "Acme".into(),
            designation: "Eng".into(),
            github_id: "jd".into(),
            linkedin_id: "jd".into(),
            twitter_id: String::new(),
            instagram_id: String::new(),
            website: "https://jd.dev".into(),
        }
    }

    #[test]
    fn fully_populated_profile_passes() {
        validate_profile(&valid()).unwrap();
    }

    #[test]
    fn optional_handles_and_website_may_be_empty() {
        let mut profile = valid();
        profile.twitter_id = String::new();
        profile.instagram_id = String::new();
        profile.website = String::new();
        validate_profile(&profile).unwrap();
    }

    #[test]
    fn each_required_field_is_enforced() {
        let required: &[(&str, fn(&mut ProfileRecord))] = &[
            ("first_name", |p| p.first_name.clear()),
            ("last_name", |p| p.last_name.clear()),
            ("phone", |p| p.phone.clear()),
            ("email", |p| p.email.clear()),
            ("company", |p| p.company.clear()),
            ("designation", |p| p.designation.clear()),
            ("github_id", |p| p.github_id.clear()),
            ("linkedin_id", |p| p.linkedin_id.clear()),
        ];
        for (field, clear) in required {
            let mut profile = valid();
            clear(&mut profile);
            let err = validate_profile(&profile)
                .expect_err(&format!("empty {field} must be rejected"));
            assert_eq!(err, ValidationError::MissingField(field));
        }
    }

    #[test]
    fn phone_must_be_all_digits() {
        let mut profile = valid();
        profile.phone = "+1 555 0100".into();
        assert_eq!(
            validate_profile(&profile),
            Err(ValidationError::PhoneNotNumeric)
        );
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for bad in ["john", "john@", "@x.com", "john@x", "john doe@x.com", "john@x."] {
            let mut profile = valid();
            profile.email = bad.into();
            assert!(
                matches!(validate_profile(&profile), Err(ValidationError::BadEmail(_))),
                "{bad} must be rejected"
            );
        }
    }

    #[test]
    fn negative_yoe_is_rejected() {
        let mut profile = valid();
        profile.yoe = -1;
        assert_eq!(
            validate_profile(&profile),
            Err(ValidationError::NegativeYoe(-1))
        );
    }

    #[test]
    fn website_must_be_http_when_present() {
        let mut profile = valid();
        profile.website = "not a url".into();
        assert!(matches!(
            validate_profile(&profile),
            Err(ValidationError::BadWebsite(_))
        ));

        profile.website = "ftp://jd.dev".into();
        assert!(matches!(
            validate_profile(&profile),
            Err(ValidationError::BadWebsite(_))
        ));

        profile.website = "http://jd.dev".into();
        validate_profile(&profile).unwrap();
    }
}
