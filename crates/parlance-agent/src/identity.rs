//! Participant identity resolution.
//!
//! Callers hand over a mixed bag of identifiers: user ids, guest ids, and
//! email addresses. Each raw value is classified once at the boundary and
//! emails are resolved through the user index. Values that cannot be
//! resolved are dropped with a warning rather than failing the request, so
//! one stale email never blocks a whole group snippet.

use parlance_db::{get_user_id_by_email, is_email};
use parlance_types::Participant;
use rusqlite::Connection;

/// Classifies one raw participant value. Blank input is unclassifiable.
pub fn classify_participant(raw: &str) -> Option<Participant> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if is_email(trimmed) {
        Some(Participant::Email(trimmed.to_string()))
    } else {
        Some(Participant::RawId(trimmed.to_string()))
    }
}

/// Resolves raw participant values into user ids, de-duplicated and in
/// first-seen order. An empty result means the caller should fall back to
/// the session guest identity.
pub fn resolve_participants(conn: &Connection, raw_values: &[String]) -> Vec<String> {
    let mut resolved = Vec::new();
    for raw in raw_values {
        let participant = match classify_participant(raw) {
            Some(p) => p,
            None => {
                tracing::warn!("dropping blank participant value");
                continue;
            }
        };
        let id = match &participant {
            Participant::RawId(id) => id.clone(),
            Participant::Email(email) => match get_user_id_by_email(conn, email) {
                Ok(id) => id,
                Err(err) => {
                    tracing::warn!(email = %email, error = %err, "dropping unresolvable participant");
                    continue;
                }
            },
        };
        if !resolved.contains(&id) {
            resolved.push(id);
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlance_db::{register_user, run_migrations};

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn classifies_emails_and_raw_ids() {
        assert_eq!(
            classify_participant("anna@example.com"),
            Some(Participant::Email("anna@example.com".to_string()))
        );
        assert_eq!(
            classify_participant(" user-123 "),
            Some(Participant::RawId("user-123".to_string()))
        );
        assert_eq!(classify_participant("   "), None);
    }

    #[test]
    fn resolves_emails_through_user_index() {
        let conn = test_conn();
        let id = register_user(&conn, "anna@example.com", "hemligt").unwrap();

        let resolved = resolve_participants(
            &conn,
            &["anna@example.com".to_string(), "Guest-3".to_string()],
        );
        assert_eq!(resolved, vec![id, "Guest-3".to_string()]);
    }

    #[test]
    fn drops_unknown_emails_and_blanks() {
        let conn = test_conn();
        let resolved = resolve_participants(
            &conn,
            &[
                "nobody@example.com".to_string(),
                "".to_string(),
                "user-1".to_string(),
            ],
        );
        assert_eq!(resolved, vec!["user-1".to_string()]);
    }

    #[test]
    fn deduplicates_preserving_first_seen_order() {
        let conn = test_conn();
        let id = register_user(&conn, "anna@example.com", "hemligt").unwrap();

        let resolved = resolve_participants(
            &conn,
            &[
                "user-1".to_string(),
                "anna@example.com".to_string(),
                id.clone(),
                "user-1".to_string(),
            ],
        );
        assert_eq!(resolved, vec!["user-1".to_string(), id]);
    }
}
