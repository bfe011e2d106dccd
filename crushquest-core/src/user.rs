use serde::{Deserialize, Serialize};

/// A registered student account as stored in the mock data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub gender: String,
    pub interested_in: String,
    pub department: String,
    pub year: String,
    #[serde(default)]
    pub profile_pic: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub banned: bool,
    #[serde(default)]
    pub my_posts: Vec<String>,
    #[serde(default)]
    pub matches: Vec<String>,
}

/// The logged-in user record kept by a session store. Never carries the
/// password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub gender: String,
    pub interested_in: String,
    pub department: String,
    pub year: String,
    #[serde(default)]
    pub profile_pic: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub banned: bool,
    #[serde(default)]
    pub my_posts: Vec<String>,
    #[serde(default)]
    pub matches: Vec<String>,
}

impl From<User> for SessionUser {
    fn from(user: User) -> Self {
        Self {
            uid: user.uid,
            name: user.name,
            email: user.email,
            gender: user.gender,
            interested_in: user.interested_in,
            department: user.department,
            year: user.year,
            profile_pic: user.profile_pic,
            verified: user.verified,
            paid: user.paid,
            banned: user.banned,
            my_posts: user.my_posts,
            matches: user.matches,
        }
    }
}

impl SessionUser {
    #[must_use]
    pub const fn verification_label(&self) -> &'static str {
        if self.verified { "Verified" } else { "Not Verified" }
    }

    #[must_use]
    pub const fn membership_label(&self) -> &'static str {
        if self.paid { "Premium Member" } else { "Free Member" }
    }

    /// `CSE • 3rd Year`
    #[must_use]
    pub fn headline(&self) -> String {
        format!("{} • {} Year", self.department, self.year)
    }

    #[must_use]
    pub fn interest_label(&self) -> String {
        capitalize(&self.interested_in)
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
