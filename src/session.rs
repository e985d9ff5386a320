use crate::config::Config;
use serde::Serialize;
use uuid::Uuid;

/// Which table-set the session reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Environment {
    Production,
    Test,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }

    pub fn db_file_name(self) -> &'static str {
        match self {
            Environment::Production => "pulsecheck.sqlite3",
            Environment::Test => "pulsecheck-test.sqlite3",
        }
    }

    pub fn is_test(self) -> bool {
        self == Environment::Test
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub environment: Environment,
}

/// Matches `code` against the configured access codes. `None` means no match.
pub fn unlock(config: &Config, code: &str) -> Option<Session> {
    let environment = if code == config.access_code {
        Environment::Production
    } else if code == config.test_access_code {
        Environment::Test
    } else {
        return None;
    };
    Some(Session {
        id: Uuid::new_v4(),
        environment,
    })
}
