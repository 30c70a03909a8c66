use chrono::{TimeZone, Utc};
use herald_core::{Post, PostSearchPage, User};

fn user(id: &str, username: &str, name: &str, bio: &str, location: &str, followers: u64, verified: bool) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        name: name.to_string(),
        bio: bio.to_string(),
        location: location.to_string(),
        followers_count: followers,
        verified,
    }
}

fn post(id: &str, author_id: &str, text: &str) -> Post {
    Post {
        id: id.to_string(),
        text: text.to_string(),
        author_id: author_id.to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 9, 10, 12, 0, 0).single(),
    }
}

/// Posts about "`RustConf` 2024".
///
/// - `ada` (verified, 5200 followers, long bio, located): relevant by event name.
/// - `linus` (2500 followers, located): relevant by event name.
/// - `grace` (no signals): relevant by attendance phrase only.
/// - `spammer`: irrelevant.
/// - one post whose author is missing from `users`.
#[must_use]
pub fn conference_page() -> PostSearchPage {
    PostSearchPage {
        posts: vec![
            post("1001", "u-grace", "See you at the venue tomorrow!"),
            post("1002", "u-ada", "Can't wait for the RustConf keynotes"),
            post("1003", "u-spam", "Cheap sunglasses, today only"),
            post("1004", "u-linus", "Heading to RustConf this week"),
            post("1005", "u-ghost", "RustConf was great"),
        ],
        users: vec![
            user("u-ada", "ada", "Ada Lovelace", "Compiler engineer and conference speaker", "London", 5_200, true),
            user("u-grace", "grace", "Grace H", "Rustacean", "", 150, false),
            user("u-linus", "linus", "Linus T", "", "Portland", 2_500, false),
            user("u-spam", "spammer", "Deals", "Best deals", "", 12, false),
        ],
    }
}

/// A page with no posts.
#[must_use]
pub fn empty_page() -> PostSearchPage {
    PostSearchPage::default()
}
