use proptest::prelude::*;

use idsync_types::{ProfileRecord, Timestamp};

fn profile_strategy() -> impl Strategy<Value = ProfileRecord> {
    (
        "[a-zA-Z ]{0,12}",
        "[a-zA-Z ]{0,12}",
        "[a-z0-9@.]{0,16}",
        "[0-9]{0,12}",
        0i64..60,
        "[a-zA-Z ]{0,12}",
        "[a-zA-Z ]{0,12}",
        "[a-z0-9-]{0,12}",
        "[a-z0-9-]{0,12}",
    )
        .prop_map(
            |(
                first_name,
                last_name,
                email,
                phone,
                yoe,
                company,
                designation,
                github_id,
                linkedin_id,
            )| ProfileRecord {
                first_name,
                last_name,
                email,
                phone,
                yoe,
                company,
                designation,
                github_id,
                linkedin_id,
                ..ProfileRecord::default()
            },
        )
}

proptest! {
    /// Profile equality is reflexive over arbitrary field contents.
    #[test]
    fn profile_equality_reflexive(profile in profile_strategy()) {
        prop_assert_eq!(profile.clone(), profile);
    }

    /// Appending a single character to any text field breaks equality.
    #[test]
    fn single_char_change_breaks_equality(profile in profile_strategy()) {
        let mut changed = profile.clone();
        changed.designation.push('x');
        prop_assert_ne!(&changed, &profile);

        let mut changed = profile.clone();
        changed.website.push(' ');
        prop_assert_ne!(&changed, &profile);
    }

    /// Changing years of experience alone breaks equality.
    #[test]
    fn yoe_change_breaks_equality(profile in profile_strategy(), bump in 1i64..50) {
        let mut changed = profile.clone();
        changed.yoe += bump;
        prop_assert_ne!(changed, profile);
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// Timestamp elapsed_since: elapsed_since(now) = now - self (saturating).
    #[test]
    fn timestamp_elapsed_since(base in 0u64..1_000_000, offset in 0u64..1_000_000) {
        let t = Timestamp::new(base);
        let now = Timestamp::new(base + offset);
        prop_assert_eq!(t.elapsed_since(now), offset);
    }

    /// Timestamp elapsed_since saturates to 0 when now < self.
    #[test]
    fn timestamp_elapsed_since_saturates(
        base in 1u64..1_000_000,
        deficit in 1u64..1_000_000,
    ) {
        let later = Timestamp::new(base + deficit);
        let earlier = Timestamp::new(base);
        prop_assert_eq!(later.elapsed_since(earlier), 0);
    }
}
