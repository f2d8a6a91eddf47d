//! The self-reported profile record.

use serde::{Deserialize, Serialize};

/// A user's self-reported profile, as served by their own profile service
/// and as stored canonically on their account.
///
/// Field names double as the JSON wire names of the remote `/profile`
/// contract. Missing wire fields deserialize to their zero value, so a
/// partial response still yields a comparable record.
///
/// Equality is derived and exact. Any single-field change, including
/// whitespace, makes two records unequal and puts a new diff in front of a
/// reviewer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// Years of experience. Signed so an out-of-range wire value reaches
    /// validation instead of failing deserialization.
    pub yoe: i64,
    pub company: String,
    pub designation: String,
    pub github_id: String,
    pub linkedin_id: String,
    pub twitter_id: String,
    pub instagram_id: String,
    pub website: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProfileRecord {
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
            twitter_id: "jd".into(),
            instagram_id: "jd".into(),
            website: "https://jd.dev".into(),
        }
    }

    #[test]
    fn equality_is_exact() {
        let a = sample();
        let mut b = sample();
        assert_eq!(a, b);

        b.designation = "Eng ".into();
        assert_ne!(a, b, "trailing whitespace must break equality");
    }

    #[test]
    fn missing_wire_fields_default() {
        let record: ProfileRecord =
            serde_json::from_str(r#"{"first_name":"John","yoe":3}"#).unwrap();
        assert_eq!(record.first_name, "John");
        assert_eq!(record.yoe, 3);
        assert_eq!(record.last_name, "");
        assert_eq!(record.website, "");
    }

    #[test]
    fn negative_yoe_still_deserializes() {
        let record: ProfileRecord = serde_json::from_str(r#"{"yoe":-2}"#).unwrap();
        assert_eq!(record.yoe, -2);
    }

    #[test]
    fn wire_names_are_snake_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("github_id").is_some());
        assert!(json.get("linkedin_id").is_some());
        assert!(json.get("githubId").is_none());
    }
}
