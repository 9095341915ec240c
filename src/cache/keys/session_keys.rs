/// 会话列表缓存名
pub const SESSION_LIST_CACHE: &str = "sessionList";

/// 键分隔符
const SEPARATOR: &str = "::";

/// Identity of one cached page of a user's session listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionListKey {
    pub user_id: String,
    pub favorite: Option<bool>,
    pub page: u32,
    pub size: u32,
}

impl SessionListKey {
    pub fn new(user_id: impl Into<String>, favorite: Option<bool>, page: u32, size: u32) -> Self {
        Self {
            user_id: user_id.into(),
            favorite,
            page,
            size,
        }
    }

    /// `sessionList::<user>::<true|false|all>::<page>::<size>`
    pub fn cache_key(&self) -> String {
        let filter = match self.favorite {
            Some(true) => "true",
            Some(false) => "false",
            None => "all",
        };
        format!(
            "{}{}{SEPARATOR}{}{SEPARATOR}{}",
            session_list_user_prefix(&self.user_id),
            filter,
            self.page,
            self.size
        )
    }
}

/// 生成用户会话列表缓存键前缀（失效范围）
pub fn session_list_user_prefix(user_id: &str) -> String {
    format!(
        "{SESSION_LIST_CACHE}{SEPARATOR}{}{SEPARATOR}",
        encode_segment(user_id)
    )
}

/// `%` and `:` are escaped so a user id can never contain the separator.
fn encode_segment(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '%' => encoded.push_str("%25"),
            ':' => encoded.push_str("%3A"),
            _ => encoded.push(ch),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_layout_is_stable() {
        assert_eq!(
            SessionListKey::new("u1", None, 0, 20).cache_key(),
            "sessionList::u1::all::0::20"
        );
        assert_eq!(
            SessionListKey::new("u1", Some(true), 2, 10).cache_key(),
            "sessionList::u1::true::2::10"
        );
        assert_eq!(
            SessionListKey::new("u1", Some(false), 0, 20).cache_key(),
            "sessionList::u1::false::0::20"
        );
    }

    #[test]
    fn distinct_requests_never_collide() {
        let keys = [
            SessionListKey::new("u1", None, 0, 20),
            SessionListKey::new("u1", Some(true), 0, 20),
            SessionListKey::new("u1", None, 1, 20),
            SessionListKey::new("u1", None, 0, 10),
            SessionListKey::new("u2", None, 0, 20),
        ];
        for (i, a) in keys.iter().enumerate() {
            for b in keys.iter().skip(i + 1) {
                assert_ne!(a.cache_key(), b.cache_key());
            }
        }
    }

    #[test]
    fn user_ids_cannot_forge_another_users_prefix() {
        let victim_prefix = session_list_user_prefix("u1");
        let forged = SessionListKey::new("u1::all", None, 0, 20).cache_key();
        assert!(!forged.starts_with(&victim_prefix));
        assert_eq!(forged, "sessionList::u1%3A%3Aall::all::0::20");
    }

    #[test]
    fn every_key_sits_under_its_user_prefix() {
        let key = SessionListKey::new("team:42", Some(false), 3, 5);
        assert!(key.cache_key().starts_with(&session_list_user_prefix("team:42")));
    }
}
